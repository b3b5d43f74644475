//! Incoming HTTP request type.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use http::HeaderMap;

use crate::method::Method;
use crate::router::Router;
use crate::urls::{UrlGenerator, UrlRoot};

/// An incoming HTTP request, with its body fully read.
///
/// Besides the usual accessors, a request knows the router that matched it
/// and the public URL root it was addressed to, so handlers can resolve
/// [`Link`](crate::Link)s through [`Request::urls`].
pub struct Request {
    method: Method,
    path: String,
    headers: HeaderMap,
    body: Bytes,
    params: HashMap<String, String>,
    router: Arc<Router>,
    url_root: UrlRoot,
}

impl Request {
    pub(crate) fn new(
        method: Method,
        path: String,
        headers: HeaderMap,
        body: Bytes,
        params: HashMap<String, String>,
        router: Arc<Router>,
        url_root: UrlRoot,
    ) -> Self {
        Self { method, path, headers, body, params, router, url_root }
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup. Values that are not visible ASCII are skipped.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// The scheme and host clients used to reach this service.
    pub fn url_root(&self) -> &UrlRoot { &self.url_root }

    /// Resolver for links built while handling this request.
    pub fn urls(&self) -> UrlGenerator<'_> {
        self.router.urls(self.url_root.clone())
    }
}
