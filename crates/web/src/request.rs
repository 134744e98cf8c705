//! The inbound side of a dispatch.
//!
//! [`RouteRequest`] wraps a bodyless `http::Request<()>`: routing only ever needs the method, the
//! path-and-query and the headers.

use http::request::Parts;
use http::{HeaderMap, HeaderValue, Method, Request, Uri};

/// One inbound request as seen by the [`Dispatcher`](crate::Dispatcher).
#[derive(Debug)]
pub struct RouteRequest {
    inner: Request<()>,
}

impl RouteRequest {
    /// Builds a request from a method and a raw path-and-query such as `/posts/42?page=2`.
    pub fn new<M, U>(method: M, raw_path_and_query: U) -> Result<Self, http::Error>
    where
        Method: TryFrom<M>,
        <Method as TryFrom<M>>::Error: Into<http::Error>,
        Uri: TryFrom<U>,
        <Uri as TryFrom<U>>::Error: Into<http::Error>,
    {
        let inner = Request::builder().method(method).uri(raw_path_and_query).body(())?;
        Ok(Self { inner })
    }

    /// Adds a header, replacing any previous value.
    #[must_use]
    pub fn with_header(mut self, name: http::header::HeaderName, value: HeaderValue) -> Self {
        self.inner.headers_mut().insert(name, value);
        self
    }

    pub fn method(&self) -> &Method {
        self.inner.method()
    }

    pub fn uri(&self) -> &Uri {
        self.inner.uri()
    }

    /// The raw request path, not percent-decoded, e.g. `/posts/42`.
    pub fn path(&self) -> &str {
        self.inner.uri().path()
    }

    /// Path plus `?query` when present, as handed to the matcher.
    pub fn path_and_query(&self) -> &str {
        self.inner.uri().path_and_query().map_or_else(|| self.path(), |pq| pq.as_str())
    }

    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    pub fn into_inner(self) -> Request<()> {
        self.inner
    }
}

impl From<Parts> for RouteRequest {
    #[inline]
    fn from(parts: Parts) -> Self {
        Self { inner: Request::from_parts(parts, ()) }
    }
}

impl From<Request<()>> for RouteRequest {
    #[inline]
    fn from(inner: Request<()>) -> Self {
        Self { inner }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_method_and_uri() {
        let request = RouteRequest::new("POST", "/posts/42?page=2&sort=asc").unwrap();

        assert_eq!(request.method(), &Method::POST);
        assert_eq!(request.path(), "/posts/42");
        assert_eq!(request.path_and_query(), "/posts/42?page=2&sort=asc");
        assert_eq!(request.uri().query(), Some("page=2&sort=asc"));
    }

    #[test]
    fn from_parts() {
        let (parts, _body) = Request::builder()
            .method(Method::GET)
            .uri("http://127.0.0.1:8080/index.html")
            .header(http::header::ACCEPT, "*/*")
            .body("ignored")
            .unwrap()
            .into_parts();

        let request = RouteRequest::from(parts);

        assert_eq!(request.path_and_query(), "/index.html");
        assert_eq!(request.headers().get(http::header::ACCEPT), Some(&HeaderValue::from_static("*/*")));
    }

    #[test]
    fn with_header() {
        let request = RouteRequest::new(Method::GET, "/")
            .unwrap()
            .with_header(http::header::ACCEPT, HeaderValue::from_static("application/json"));

        assert_eq!(request.headers().len(), 1);
    }

    #[test]
    fn invalid_uri() {
        assert!(RouteRequest::new("GET", "/has space").is_err());
        assert!(RouteRequest::new("BAD METHOD", "/").is_err());
    }
}
