//! Per-request dispatch: assets first, then route matching, then the entry resolver.
//!
//! The dispatcher holds the compiled table behind an [`ArcSwap`], so it can be shared across
//! threads without locking and [`reload`](Dispatcher::reload)ed without disturbing requests that
//! are already running against the previous table.

use crate::accept::prefers_json;
use crate::assets::AssetServer;
use crate::body::ResponseBody;
use crate::error::{BuildError, RenderError};
use crate::request::RouteRequest;
use crate::resolver::EntryResolver;
use arc_swap::ArcSwap;
use http::header::{ALLOW, CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderMap, Response, StatusCode};
use micro_route::{DispatchError, MatchResult, MatchStatus, ReverseError, RouteParam, RouteTable};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A table together with the asset server derived from its assets prefix.
struct Routing {
    table: Arc<RouteTable>,
    assets: Option<AssetServer>,
}

impl Routing {
    fn new(table: RouteTable, document_root: Option<&Path>) -> Self {
        let assets = table.assets_path().and_then(|prefix| asset_server(prefix, document_root));
        Self { table: Arc::new(table), assets }
    }
}

fn asset_server(prefix: &str, document_root: Option<&Path>) -> Option<AssetServer> {
    let Some(document_root) = document_root else {
        warn!(prefix, "route table declares assets but no document root is configured, assets disabled");
        return None;
    };

    let dir = document_root.join(prefix.trim_start_matches('/'));
    match AssetServer::new(prefix, &dir) {
        Ok(server) => Some(server),
        Err(e) => {
            warn!(cause = %e, dir = %dir.display(), "asset directory unavailable, assets disabled");
            None
        }
    }
}

pub struct DispatcherBuilder {
    table: Option<RouteTable>,
    document_root: Option<PathBuf>,
    resolver: Option<Box<dyn EntryResolver>>,
}

impl DispatcherBuilder {
    fn new() -> Self {
        Self { table: None, document_root: None, resolver: None }
    }

    pub fn table(mut self, table: RouteTable) -> Self {
        self.table = Some(table);
        self
    }

    /// Directory the assets prefix is resolved against: `/assets` maps to `<root>/assets`.
    pub fn document_root<P: Into<PathBuf>>(mut self, document_root: P) -> Self {
        self.document_root = Some(document_root.into());
        self
    }

    pub fn resolver(mut self, resolver: impl EntryResolver + 'static) -> Self {
        self.resolver = Some(Box::new(resolver));
        self
    }

    pub fn build(self) -> Result<Dispatcher, BuildError> {
        let table = self.table.ok_or(BuildError::MissingTable)?;
        let resolver = self.resolver.ok_or(BuildError::MissingResolver)?;

        let routing = Routing::new(table, self.document_root.as_deref());
        Ok(Dispatcher { routing: ArcSwap::from_pointee(routing), document_root: self.document_root, resolver })
    }
}

impl fmt::Debug for DispatcherBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatcherBuilder")
            .field("table", &self.table)
            .field("document_root", &self.document_root)
            .field("resolver", &self.resolver.is_some())
            .finish()
    }
}

/// Renders requests against a compiled [`RouteTable`].
pub struct Dispatcher {
    routing: ArcSwap<Routing>,
    document_root: Option<PathBuf>,
    resolver: Box<dyn EntryResolver>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let routing = self.routing.load();
        f.debug_struct("Dispatcher")
            .field("routes", &routing.table.len())
            .field("assets", &routing.assets)
            .field("document_root", &self.document_root)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    /// The table currently in use.
    pub fn table(&self) -> Arc<RouteTable> {
        Arc::clone(&self.routing.load().table)
    }

    /// Atomically replaces the table; requests already in flight finish on the old one.
    pub fn reload(&self, table: RouteTable) {
        info!(routes = table.len(), assets = ?table.assets_path(), "reloading route table");
        self.routing.store(Arc::new(Routing::new(table, self.document_root.as_deref())));
    }

    /// Matches without rendering.
    pub fn match_request(&self, request: &RouteRequest) -> Result<MatchResult, DispatchError> {
        self.routing.load().table.match_request(request.method().as_str(), request.path_and_query())
    }

    /// Builds the URL of a named route, see [`RouteTable::route`].
    pub fn route(&self, name: &str, params: &[RouteParam]) -> Result<String, ReverseError> {
        self.routing.load().table.route(name, params)
    }

    /// Renders one request.
    ///
    /// Files under the assets prefix are served directly and skip routing entirely. Otherwise a
    /// 405 is answered here with an `Allow` header, and everything else, 404 included, goes to
    /// the entry resolver.
    pub fn render(&self, request: &RouteRequest) -> Result<Response<ResponseBody>, RenderError> {
        let routing = self.routing.load();

        if let Some(asset) = routing.assets.as_ref().and_then(|assets| assets.resolve(request.path())) {
            debug!(path = request.path(), "serving asset");
            return asset.into_response();
        }

        let matched = routing.table.match_request(request.method().as_str(), request.path_and_query())?;

        if matched.status() == MatchStatus::MethodNotAllowed {
            return method_not_allowed(&matched, request.headers());
        }

        let entry = matched
            .route()
            .entry()
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .ok_or_else(|| DispatchError::MissingEntry { path: matched.route().path().map(str::to_string) })?;

        let mut response =
            self.resolver.resolve_and_render(entry, &matched).map_err(|e| RenderError::resolve(entry, e))?;

        if matched.status() == MatchStatus::NotFound && response.status() == StatusCode::OK {
            *response.status_mut() = StatusCode::NOT_FOUND;
        }

        Ok(response)
    }
}

fn method_not_allowed(matched: &MatchResult, headers: &HeaderMap) -> Result<Response<ResponseBody>, RenderError> {
    let allowed = matched.allowed_methods();
    let allow = allowed.join(", ");

    let (content_type, body) = if prefers_json(headers) {
        let body = serde_json::json!({
            "status": StatusCode::METHOD_NOT_ALLOWED.as_u16(),
            "error": "Method Not Allowed",
            "allowed": allowed,
        });
        (mime::APPLICATION_JSON, body.to_string())
    } else {
        (mime::TEXT_PLAIN_UTF_8, format!("405 Method Not Allowed\nAllowed: {allow}\n"))
    };

    let response = Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header(ALLOW, allow)
        .header(CONTENT_TYPE, content_type.as_ref())
        .header(CONTENT_LENGTH, body.len())
        .body(ResponseBody::from(body))?;

    Ok(response)
}
