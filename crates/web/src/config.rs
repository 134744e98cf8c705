//! Settings for wiring a router into an application.

use micro_route::dsl::CompilerOptions;
use micro_route::{CompileError, RouteCompiler, RouteTable};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Read access to an application's configuration.
///
/// Keys are dot paths into nested sections, `router.source` reads `source` inside `router`.
/// A missing key or a value of the wrong shape yields `default`.
pub trait ConfigLookup {
    fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T;
}

impl ConfigLookup for Value {
    fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let Some(value) = key.split('.').try_fold(self, |node, part| node.get(part)) else {
            return default;
        };

        match T::deserialize(value) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, cause = %e, "config value has the wrong type, using default");
                default
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterSettings {
    /// Root `.router` file.
    pub source: PathBuf,
    /// Where the compiled table is persisted.
    pub compiled: PathBuf,
    /// Directory the assets prefix is resolved against.
    pub document_root: PathBuf,
    /// Entry of the synthetic `/404` record.
    pub not_found_entry: String,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            source: PathBuf::from("routes.router"),
            compiled: PathBuf::from("routes.json"),
            document_root: PathBuf::from("."),
            not_found_entry: String::from("404"),
        }
    }
}

impl RouterSettings {
    /// Reads the `router.*` keys, falling back to defaults key by key.
    pub fn from_config<C: ConfigLookup>(config: &C) -> Self {
        let defaults = Self::default();
        Self {
            source: config.get("router.source", defaults.source),
            compiled: config.get("router.compiled", defaults.compiled),
            document_root: config.get("router.document_root", defaults.document_root),
            not_found_entry: config.get("router.not_found_entry", defaults.not_found_entry),
        }
    }

    pub fn document_root(&self) -> &Path {
        &self.document_root
    }

    pub fn compiler(&self) -> RouteCompiler {
        RouteCompiler::new(CompilerOptions::new(self.not_found_entry.clone()))
    }

    /// Compiles `source` and persists it at `compiled`, replacing any earlier table.
    pub fn compile(&self) -> Result<RouteTable, CompileError> {
        self.compiler().compile_to(&self.source, &self.compiled)
    }

    /// Loads the persisted table, compiling it first if it does not exist yet.
    pub fn load_or_compile(&self) -> Result<RouteTable, CompileError> {
        if self.compiled.is_file() {
            info!(compiled = %self.compiled.display(), "loading compiled route table");
            return RouteTable::load(&self.compiled);
        }
        self.compile()
    }
}
