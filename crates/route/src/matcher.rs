//! Request matching against a [`RouteTable`].
//!
//! Matching is a single pass in declaration order. A route matches structurally when it has the
//! same number of segments as the request and every literal segment is equal; each `$` segment
//! captures the request segment at its position. The first structural match whose method fits
//! wins. Structural matches rejected by method are collected, and if nothing wins they turn the
//! outcome into a 405 instead of a 404.
//!
//! Both outcomes reuse the last record of the table as the route.

use crate::error::DispatchError;
use crate::query::Query;
use crate::table::{RouteRecord, RouteTable, WILDCARD};
use serde_json::Value;
use tracing::debug;

/// How a request was resolved against the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    /// A declared route matched path and method.
    Found,
    /// Nothing matched the path.
    NotFound,
    /// Routes matched the path, but none accepted the method.
    MethodNotAllowed,
}

/// The outcome of matching one request. Created per request, never shared.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    route: RouteRecord,
    segments: Vec<String>,
    query: Query,
    status: MatchStatus,
    allowed_methods: Vec<String>,
}

impl MatchResult {
    fn found(route: &RouteRecord, segments: Vec<String>, query: Query) -> Self {
        Self { route: route.clone(), segments, query, status: MatchStatus::Found, allowed_methods: vec![] }
    }

    fn not_found(fallback: &RouteRecord, query: Query) -> Self {
        Self { route: fallback.clone(), segments: vec![], query, status: MatchStatus::NotFound, allowed_methods: vec![] }
    }

    fn method_not_allowed(fallback: &RouteRecord, query: Query, allowed_methods: Vec<String>) -> Self {
        Self { route: fallback.clone(), segments: vec![], query, status: MatchStatus::MethodNotAllowed, allowed_methods }
    }

    /// The matched record, or the terminal record for 404 and 405 outcomes.
    pub fn route(&self) -> &RouteRecord {
        &self.route
    }

    pub fn route_name(&self) -> Option<&str> {
        self.route.name()
    }

    /// Returns true if the matched record is named `name`.
    pub fn is_route(&self, name: &str) -> bool {
        self.route.name() == Some(name)
    }

    /// Captured wildcard values, left to right.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn segment(&self, index: usize) -> Option<&str> {
        self.segments.get(index).map(String::as_str)
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Dot-path lookup into the query, see [`Query::get`].
    pub fn query_value(&self, path: &str) -> Option<&Value> {
        self.query.get(path)
    }

    pub fn status(&self) -> MatchStatus {
        self.status
    }

    /// `Some(405)` for a method mismatch, `None` otherwise.
    pub fn status_code(&self) -> Option<u16> {
        match self.status {
            MatchStatus::MethodNotAllowed => Some(405),
            MatchStatus::Found | MatchStatus::NotFound => None,
        }
    }

    /// Methods declared at the requested path, deduplicated, in declaration order.
    ///
    /// Only populated for [`MatchStatus::MethodNotAllowed`].
    pub fn allowed_methods(&self) -> &[String] {
        &self.allowed_methods
    }
}

impl RouteTable {
    /// Matches a request given its method and raw path-and-query, e.g. `/posts/42?page=2`.
    ///
    /// Fails only when the table has no records at all.
    pub fn match_request(&self, method: &str, raw_uri: &str) -> Result<MatchResult, DispatchError> {
        let fallback = self.fallback().ok_or(DispatchError::EmptyTable)?;

        let (path, raw_query) = split_uri(raw_uri);
        let query = raw_query.map(Query::parse).unwrap_or_default();
        let request_segments = split_path(path);

        let mut allowed_methods: Vec<String> = Vec::new();

        for route in self.routes() {
            let Some(segments) = capture(route, &request_segments) else {
                continue;
            };

            if route.allows_method(method) {
                debug!(method, path, route = ?route.path(), "route matched");
                return Ok(MatchResult::found(route, segments, query));
            }

            if let Some(route_method) = route.method() {
                if !allowed_methods.iter().any(|allowed| allowed == route_method) {
                    allowed_methods.push(route_method.to_string());
                }
            }
        }

        if allowed_methods.is_empty() {
            debug!(method, path, "no route matched");
            Ok(MatchResult::not_found(fallback, query))
        } else {
            debug!(method, path, allowed = ?allowed_methods, "method not allowed");
            Ok(MatchResult::method_not_allowed(fallback, query, allowed_methods))
        }
    }
}

/// Splits off the query and drops any fragment.
pub(crate) fn split_uri(raw_uri: &str) -> (&str, Option<&str>) {
    let without_fragment = raw_uri.split_once('#').map_or(raw_uri, |(before, _)| before);
    match without_fragment.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (without_fragment, None),
    }
}

/// `/a/b/` -> `["a", "b"]`, `/` -> `[]`. Empty interior segments are kept.
pub(crate) fn split_path(path: &str) -> Vec<&str> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return vec![];
    }
    trimmed.split('/').collect()
}

fn capture(route: &RouteRecord, request_segments: &[&str]) -> Option<Vec<String>> {
    let route_segments = split_path(route.path()?);
    if route_segments.len() != request_segments.len() {
        return None;
    }

    let mut captured = Vec::new();
    for (route_segment, request_segment) in route_segments.iter().zip(request_segments) {
        if *route_segment == WILDCARD {
            captured.push((*request_segment).to_string());
        } else if route_segment != request_segment {
            return None;
        }
    }

    Some(captured)
}
