use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while turning `.router` sources into a [`RouteTable`](crate::RouteTable).
///
/// Every variant is fatal: a compile either produces a complete table or nothing.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("failed to read route source {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("included file {include} not found (referenced from {referenced_by})")]
    MissingInclude { include: PathBuf, referenced_by: PathBuf },

    #[error("circular include detected: {chain}")]
    CircularInclude { chain: String },

    #[error("<assets> must be declared before any other content (line {line})")]
    MisplacedAssets { line: usize },

    #[error("<assets> declared more than once (line {line})")]
    DuplicateAssets { line: usize },

    #[error("malformed <assets> directive at line {line}: {reason}")]
    MalformedAssets { line: usize, reason: String },

    #[error("invalid assets path '{path}': it must not normalize to '/'")]
    InvalidAssetsPath { path: String },

    #[error("failed to persist route table to {path}: {source}")]
    Persist { path: PathBuf, source: io::Error },

    #[error("route table serialization error: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
}

impl CompileError {
    pub fn io<P: AsRef<Path>>(path: P, source: io::Error) -> Self {
        Self::Io { path: path.as_ref().to_path_buf(), source }
    }

    pub fn missing_include<P: AsRef<Path>, R: AsRef<Path>>(include: P, referenced_by: R) -> Self {
        Self::MissingInclude { include: include.as_ref().to_path_buf(), referenced_by: referenced_by.as_ref().to_path_buf() }
    }

    pub fn circular_include(chain: &[PathBuf]) -> Self {
        let chain = chain.iter().map(|path| path.display().to_string()).collect::<Vec<_>>().join(" -> ");
        Self::CircularInclude { chain }
    }

    pub fn malformed_assets<S: ToString>(line: usize, reason: S) -> Self {
        Self::MalformedAssets { line, reason: reason.to_string() }
    }

    pub fn persist<P: AsRef<Path>>(path: P, source: io::Error) -> Self {
        Self::Persist { path: path.as_ref().to_path_buf(), source }
    }
}

/// Errors that indicate a broken compiled table rather than a routing outcome.
///
/// A request that simply matches nothing is a 404 [`MatchResult`](crate::MatchResult), not an error.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("route table is empty, no fallback record available")]
    EmptyTable,

    #[error("matched route {path:?} has no entry")]
    MissingEntry { path: Option<String> },
}

/// Errors raised by named-route URL generation.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ReverseError {
    #[error("route '{name}' is not defined")]
    UndefinedRoute { name: String },

    #[error("route '{name}' is missing parameter at index {index}")]
    MissingParam { name: String, index: usize },

    #[error("route '{name}' expects {expected} parameters, {given} given")]
    TooManyParams { name: String, expected: usize, given: usize },

    #[error("route '{name}' takes no parameters, {given} given")]
    UnexpectedParams { name: String, given: usize },

    #[error("route '{name}' parameter at index {index} is null")]
    NullParam { name: String, index: usize },
}

impl ReverseError {
    pub fn undefined_route<S: ToString>(name: S) -> Self {
        Self::UndefinedRoute { name: name.to_string() }
    }
}
