//! Request-time half of micro-route: serves assets, dispatches matched routes to an
//! [`EntryResolver`] and answers 405 on its own.
//!
//! ```no_run
//! use http::{Method, Response};
//! use micro_route_web::{resolver_fn, Dispatcher, ResponseBody, RouteRequest, RouterSettings};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = RouterSettings::default();
//! let dispatcher = Dispatcher::builder()
//!     .table(settings.load_or_compile()?)
//!     .document_root(settings.document_root())
//!     .resolver(resolver_fn(|entry, _matched| Ok(Response::new(ResponseBody::from(entry.to_string())))))
//!     .build()?;
//!
//! let response = dispatcher.render(&RouteRequest::new(Method::GET, "/posts/42?page=2")?)?;
//! # let _ = response;
//! # Ok(())
//! # }
//! ```

mod accept;
mod assets;
mod body;
mod config;
mod dispatcher;
mod error;
mod request;
mod resolver;

pub use accept::prefers_json;
pub use assets::content_type_for;
pub use assets::Asset;
pub use assets::AssetServer;
pub use body::ResponseBody;
pub use config::ConfigLookup;
pub use config::RouterSettings;
pub use dispatcher::Dispatcher;
pub use dispatcher::DispatcherBuilder;
pub use error::BuildError;
pub use error::RenderError;
pub use request::RouteRequest;
pub use resolver::resolver_fn;
pub use resolver::EntryResolver;
pub use resolver::FnResolver;

pub use micro_route::{MatchResult, MatchStatus, RouteParam, RouteTable};
