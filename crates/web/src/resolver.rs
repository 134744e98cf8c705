//! The seam between routing and whatever renders a matched entry.

use crate::body::ResponseBody;
use http::Response;
use micro_route::MatchResult;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// Locates and renders the resource behind a route's `entry` identifier.
///
/// `matched` carries the record, captured segments and parsed query. For 404 outcomes it holds
/// the terminal record; the dispatcher sets the 404 status if the resolver leaves it at 200.
#[cfg_attr(test, mockall::automock)]
pub trait EntryResolver: Send + Sync {
    fn resolve_and_render(
        &self,
        entry: &str,
        matched: &MatchResult,
    ) -> Result<Response<ResponseBody>, Box<dyn Error + Send + Sync>>;
}

/// An [`EntryResolver`] backed by a closure.
pub struct FnResolver<F> {
    f: F,
}

impl<F> fmt::Debug for FnResolver<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnResolver").finish_non_exhaustive()
    }
}

/// Wraps a closure as an [`EntryResolver`].
pub fn resolver_fn<F>(f: F) -> FnResolver<F>
where
    F: Fn(&str, &MatchResult) -> Result<Response<ResponseBody>, Box<dyn Error + Send + Sync>> + Send + Sync,
{
    FnResolver { f }
}

impl<F> EntryResolver for FnResolver<F>
where
    F: Fn(&str, &MatchResult) -> Result<Response<ResponseBody>, Box<dyn Error + Send + Sync>> + Send + Sync,
{
    fn resolve_and_render(
        &self,
        entry: &str,
        matched: &MatchResult,
    ) -> Result<Response<ResponseBody>, Box<dyn Error + Send + Sync>> {
        (self.f)(entry, matched)
    }
}

impl<R: EntryResolver + ?Sized> EntryResolver for Box<R> {
    fn resolve_and_render(
        &self,
        entry: &str,
        matched: &MatchResult,
    ) -> Result<Response<ResponseBody>, Box<dyn Error + Send + Sync>> {
        (**self).resolve_and_render(entry, matched)
    }
}

impl<R: EntryResolver + ?Sized> EntryResolver for Arc<R> {
    fn resolve_and_render(
        &self,
        entry: &str,
        matched: &MatchResult,
    ) -> Result<Response<ResponseBody>, Box<dyn Error + Send + Sync>> {
        (**self).resolve_and_render(entry, matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use micro_route::RouteTable;
    use micro_route::dsl::{compile_from_content, CompilerOptions};

    fn assert_is_resolver<R: EntryResolver>(_resolver: &R) {
        // no op
    }

    #[test]
    fn closure_is_resolver() {
        let resolver = resolver_fn(|entry, matched| {
            let body = format!("{entry}:{}", matched.segments().join(","));
            Ok(Response::new(ResponseBody::from(body)))
        });
        assert_is_resolver(&resolver);

        let table: RouteTable = compile_from_content("<route>\npath: /p/$\nentry: page\n</route>", &CompilerOptions::default()).unwrap();
        let matched = table.match_request("GET", "/p/7").unwrap();

        let boxed: Box<dyn EntryResolver> = Box::new(resolver);
        assert_is_resolver(&boxed);

        let response = boxed.resolve_and_render("page", &matched).unwrap();
        assert_eq!(&response.into_body().into_bytes().unwrap()[..], b"page:7");
    }
}
