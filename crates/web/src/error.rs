use micro_route::DispatchError;
use std::error::Error;
use std::io;
use thiserror::Error;

/// Errors that abort rendering of a single request.
///
/// 404 and 405 are not errors; these are broken tables, failing resolvers and I/O.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("dispatch error: {source}")]
    Dispatch {
        #[from]
        source: DispatchError,
    },

    #[error("entry '{entry}' failed to render: {source}")]
    Resolve { entry: String, source: Box<dyn Error + Send + Sync> },

    #[error("invalid response: {source}")]
    Http {
        #[from]
        source: http::Error,
    },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl RenderError {
    pub fn resolve<S: ToString>(entry: S, source: Box<dyn Error + Send + Sync>) -> Self {
        Self::Resolve { entry: entry.to_string(), source }
    }
}

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("route table must be set")]
    MissingTable,
    #[error("entry resolver must be set")]
    MissingResolver,
}
