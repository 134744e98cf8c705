//! A file-based routing core.
//!
//! Routes are declared in `.router` files, a small line-oriented language:
//!
//! ```text
//! <assets>/assets</assets>
//! #include "admin.router"
//! <route>
//!   path: /posts/$
//!   method: GET
//!   name: posts.show
//!   entry: pages/post
//! </route>
//! ```
//!
//! The [`RouteCompiler`] expands includes and turns the source into a [`RouteTable`], always
//! ending with a synthetic `GET /404` record. At request time [`RouteTable::match_request`]
//! finds the first route whose path shape and method fit, capturing each `$` segment, and
//! reports 404 / 405 outcomes as a [`MatchResult`] rather than as errors.
//! [`RouteTable::route`] goes the other way and builds a URL from a route name.
//!
//! # Example
//!
//! ```
//! use micro_route::dsl::{compile_from_content, CompilerOptions};
//! use micro_route::MatchStatus;
//!
//! let source = "<route>\npath: /posts/$\nmethod: GET\nname: posts.show\nentry: post\n</route>";
//! let table = compile_from_content(source, &CompilerOptions::default()).unwrap();
//!
//! let result = table.match_request("GET", "/posts/42?page=2").unwrap();
//! assert_eq!(result.status(), MatchStatus::Found);
//! assert_eq!(result.segment(0), Some("42"));
//! assert_eq!(result.query().get_str("page"), Some("2"));
//!
//! let result = table.match_request("POST", "/posts/42").unwrap();
//! assert_eq!(result.status_code(), Some(405));
//! assert_eq!(result.allowed_methods(), ["GET"]);
//!
//! assert_eq!(table.route("posts.show", &["42".into()]).unwrap(), "/posts/42");
//! ```
//!
//! # Concurrency
//!
//! A compiled table is never mutated. Compile once, wrap it in an `Arc` and match from as many
//! threads as needed; swap in a new table to reload.

pub mod dsl;

mod compiler;
mod error;
mod matcher;
mod query;
mod reverse;
mod table;

pub use compiler::RouteCompiler;
pub use error::CompileError;
pub use error::DispatchError;
pub use error::ReverseError;
pub use matcher::MatchResult;
pub use matcher::MatchStatus;
pub use query::Query;
pub use reverse::RouteParam;
pub use table::RouteRecord;
pub use table::RouteTable;
pub use table::NOT_FOUND_PATH;
pub use table::WILDCARD;
