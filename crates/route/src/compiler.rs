use crate::dsl::{compile_from_content, pre_process, CompilerOptions};
use crate::error::CompileError;
use crate::table::RouteTable;
use std::path::Path;
use tracing::info;

/// Wires include expansion, tokenizing and persistence together.
#[derive(Debug, Clone, Default)]
pub struct RouteCompiler {
    options: CompilerOptions,
}

impl RouteCompiler {
    pub fn new(options: CompilerOptions) -> Self {
        Self { options }
    }

    /// Compiles the `.router` file at `source` and everything it includes.
    pub fn compile<P: AsRef<Path>>(&self, source: P) -> Result<RouteTable, CompileError> {
        let source = source.as_ref();
        let content = pre_process(source, &[])?;
        let table = compile_from_content(&content, &self.options)?;

        info!(source = %source.display(), routes = table.len(), assets = ?table.assets_path(), "compiled route table");
        Ok(table)
    }

    /// Compiles `source` and persists the result at `dest`.
    pub fn compile_to<S: AsRef<Path>, D: AsRef<Path>>(&self, source: S, dest: D) -> Result<RouteTable, CompileError> {
        let table = self.compile(source)?;
        table.save(dest.as_ref())?;

        info!(dest = %dest.as_ref().display(), "persisted route table");
        Ok(table)
    }
}
