//! Public URL root and the request-scoped URL generator.
//!
//! Behind a reverse proxy the server never sees the address clients used.
//! [`UrlRoot`] is either pinned at startup with
//! [`Server::public_url`](crate::Server::public_url) or rebuilt per request from
//! the headers the proxy forwards:
//!
//! | Header | Used for | Fallback |
//! |---|---|---|
//! | `x-forwarded-proto` | scheme | `http` |
//! | `x-forwarded-host` | host | `host`, then `localhost` |
//!
//! These headers are taken as sent. The proxy in front must overwrite or strip
//! any client-supplied `x-forwarded-*` values; where it does not, pin the
//! origin with `Server::public_url`.

use std::fmt;

use http::HeaderMap;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::link::{RouteParameters, RouteResolver};
use crate::method::Method;
use crate::router::Router;

// ── UrlRoot ───────────────────────────────────────────────────────────────────

/// Scheme, host and port that absolute URLs start with.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UrlRoot(Url);

impl UrlRoot {
    /// Parses an `http` or `https` origin such as `https://api.example.test:8443`.
    ///
    /// A trailing `/` is accepted; any other path, a query, a fragment or
    /// credentials are rejected with [`Error::InvalidUrlRoot`].
    pub fn parse(root: &str) -> Result<Self, Error> {
        let invalid = |reason: &str| Error::InvalidUrlRoot {
            root: root.to_owned(),
            reason: reason.to_owned(),
        };

        let url = Url::parse(root).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(invalid("missing host"));
        }
        if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
            return Err(invalid("must not carry a path, query or fragment"));
        }
        if !url.username().is_empty() || url.password().is_some() {
            return Err(invalid("must not carry credentials"));
        }
        Ok(Self(url))
    }

    /// Rebuilds the root from proxy headers. Never fails: anything unusable
    /// falls back to `http://localhost`.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let scheme = first_value(headers, "x-forwarded-proto").unwrap_or("http");
        let host = first_value(headers, "x-forwarded-host")
            .or_else(|| first_value(headers, "host"))
            .unwrap_or("localhost");

        Self::parse(&format!("{scheme}://{host}")).unwrap_or_else(|e| {
            debug!(error = %e, "unusable forwarded url root, using localhost");
            Self::default()
        })
    }

    pub fn scheme(&self) -> &str { self.0.scheme() }

    pub fn host(&self) -> &str { self.0.host_str().unwrap_or_default() }

    /// Explicit port, if it differs from the scheme's default.
    pub fn port(&self) -> Option<u16> { self.0.port() }
}

impl Default for UrlRoot {
    fn default() -> Self {
        Self(Url::parse("http://localhost").expect("static url root is valid"))
    }
}

/// `scheme://host[:port]`, without a trailing slash.
impl fmt::Display for UrlRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.origin().ascii_serialization())
    }
}

/// First entry of a possibly comma-separated header, trimmed. Proxies append
/// to these lists, so the client-facing value comes first.
fn first_value<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers
        .get(name)?
        .to_str()
        .ok()?
        .split(',')
        .next()
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

// ── UrlGenerator ──────────────────────────────────────────────────────────────

/// A [`Router`] paired with the [`UrlRoot`] of the current request.
///
/// This is the [`RouteResolver`] handlers pass to
/// [`Link`](crate::Link) accessors. Obtain one from
/// [`Request::urls`](crate::Request::urls) or [`Router::urls`].
#[derive(Clone, Debug)]
pub struct UrlGenerator<'a> {
    router: &'a Router,
    root: UrlRoot,
}

impl<'a> UrlGenerator<'a> {
    pub(crate) fn new(router: &'a Router, root: UrlRoot) -> Self {
        Self { router, root }
    }

    pub fn root(&self) -> &UrlRoot { &self.root }

    /// Absolute URL of a named route.
    pub fn route(
        &self,
        route_name: &str,
        parameters: impl Into<RouteParameters>,
    ) -> Result<String, Error> {
        self.url(route_name, &parameters.into(), true)
    }
}

impl RouteResolver for UrlGenerator<'_> {
    fn methods(&self, route_name: &str) -> Result<Vec<Method>, Error> {
        match self.router.methods(route_name) {
            Ok(methods) => Ok(methods.to_vec()),
            Err(e) => {
                debug!(route = route_name, error = %e, "route methods lookup failed");
                Err(e)
            }
        }
    }

    fn url(
        &self,
        route_name: &str,
        parameters: &RouteParameters,
        absolute: bool,
    ) -> Result<String, Error> {
        let root = absolute.then_some(&self.root);
        match self.router.url_for(route_name, parameters, root) {
            Ok(url) => {
                debug!(route = route_name, %url, "resolved route url");
                Ok(url)
            }
            Err(e) => {
                debug!(route = route_name, error = %e, "route url resolution failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use http::HeaderValue;

    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(*name, HeaderValue::from_static(*value));
        }
        map
    }

    #[test]
    fn parses_origins() {
        let root = UrlRoot::parse("https://api.example.test:8443/").unwrap();
        assert_eq!(root.scheme(), "https");
        assert_eq!(root.host(), "api.example.test");
        assert_eq!(root.port(), Some(8443));
        assert_eq!(root.to_string(), "https://api.example.test:8443");

        assert_eq!(UrlRoot::parse("http://example.test:80").unwrap().to_string(), "http://example.test");
    }

    #[test]
    fn rejects_roots_that_are_not_origins() {
        for root in [
            "example.test",
            "ftp://example.test",
            "https://example.test/api",
            "https://example.test/?a=1",
            "https://user:pw@example.test",
        ] {
            assert!(
                matches!(UrlRoot::parse(root), Err(Error::InvalidUrlRoot { .. })),
                "{root} should be rejected"
            );
        }
    }

    #[test]
    fn prefers_forwarded_headers() {
        let root = UrlRoot::from_headers(&headers(&[
            ("host", "10.0.0.7:3000"),
            ("x-forwarded-host", "shop.example.test, proxy.internal"),
            ("x-forwarded-proto", "https,http"),
        ]));
        assert_eq!(root.to_string(), "https://shop.example.test");
    }

    #[test]
    fn falls_back_to_host_then_localhost() {
        let root = UrlRoot::from_headers(&headers(&[("host", "example.test:3000")]));
        assert_eq!(root.to_string(), "http://example.test:3000");

        assert_eq!(UrlRoot::from_headers(&HeaderMap::new()), UrlRoot::default());
        assert_eq!(UrlRoot::default().to_string(), "http://localhost");
    }

    #[test]
    fn garbage_headers_fall_back_to_localhost() {
        let root = UrlRoot::from_headers(&headers(&[("x-forwarded-host", "evil.test/../admin")]));
        assert_eq!(root, UrlRoot::default());
    }
}
