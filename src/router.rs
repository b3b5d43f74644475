//! Radix-tree request router with named routes.
//!
//! One tree per HTTP method. O(path-length) lookup. A route may also be given
//! a name; named routes are what [`Link`](crate::Link)s point at, and the
//! router turns a name plus parameters back into a URL.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use matchit::Router as MatchitRouter;
use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use url::form_urlencoded;

use crate::error::Error;
use crate::handler::{BoxedHandler, Handler};
use crate::link::RouteParameters;
use crate::method::Method;
use crate::urls::{UrlGenerator, UrlRoot};

/// Bytes escaped inside one path segment, `/` and `%` included.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ').add(b'"').add(b'#').add(b'<').add(b'>').add(b'?')
    .add(b'`').add(b'{').add(b'}').add(b'/').add(b'%');

/// Path template and accepted methods of a named route.
struct NamedRoute {
    template: String,
    methods: Vec<Method>,
}

/// The application router.
///
/// One radix tree per HTTP method. Build it once at startup; pass it to
/// [`Server::serve`](crate::Server::serve). Each registration returns `self`
/// so registrations chain naturally.
///
/// Every `GET` route also answers `HEAD` unless a `HEAD` handler is registered
/// for the same path.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
    names: HashMap<String, NamedRoute>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new(), names: HashMap::new() }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax, catch-all parameters `{*name}`.
    ///
    /// # Panics
    ///
    /// Panics if the path is not a valid template or conflicts with a route
    /// already registered for the same method.
    pub fn on(self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.add(method, path, handler)
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Get, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Post, path, handler)
    }

    pub fn put(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Put, path, handler)
    }

    pub fn patch(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Patch, path, handler)
    }

    pub fn delete(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Delete, path, handler)
    }

    /// Register a handler and name the route so links can point at it.
    ///
    /// Naming a route a second time with the same path adds a method to it:
    ///
    /// ```rust,no_run
    /// # use hateoas::{Method, Request, Response, Router};
    /// # async fn update_user(_: Request) -> Response { Response::text("") }
    /// Router::new()
    ///     .named("users.update", Method::Put,   "/users/{id}", update_user)
    ///     .named("users.update", Method::Patch, "/users/{id}", update_user);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the name is empty, if the name is already used for a
    /// different path, or for any reason [`Router::on`] would.
    pub fn named(mut self, name: &str, method: Method, path: &str, handler: impl Handler) -> Self {
        if name.trim().is_empty() {
            panic!("route name for `{path}` must not be empty");
        }

        let route = self.names.entry(name.to_owned()).or_insert_with(|| NamedRoute {
            template: path.to_owned(),
            methods: Vec::new(),
        });
        if route.template != path {
            panic!("route name `{name}` is already used for `{}`", route.template);
        }

        let implied: &[Method] = if method == Method::Get { &[Method::Get, Method::Head] } else { &[method] };
        for m in implied {
            if !route.methods.contains(m) {
                route.methods.push(*m);
            }
        }

        self.add(method, path, handler)
    }

    fn add(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    /// Binds the router to a URL root for link resolution.
    pub fn urls(&self, root: UrlRoot) -> UrlGenerator<'_> {
        UrlGenerator::new(self, root)
    }

    /// Methods accepted by a named route, in registration order.
    pub fn methods(&self, name: &str) -> Result<&[Method], Error> {
        self.names
            .get(name)
            .map(|route| route.methods.as_slice())
            .ok_or_else(|| Error::route_not_found(name))
    }

    /// Builds the URL of a named route.
    ///
    /// `{param}` segments are filled from `parameters` and percent-encoded;
    /// parameters the template does not use become the query string, in the
    /// order they were given. With a `root` the result is absolute, otherwise
    /// it starts at `/`.
    ///
    /// An empty value counts as missing. Values `.` and `..` are written as
    /// `%2E` and `%2E%2E` so they cannot climb out of the route's path.
    pub fn url_for(
        &self,
        name: &str,
        parameters: &RouteParameters,
        root: Option<&UrlRoot>,
    ) -> Result<String, Error> {
        let route = self.names.get(name).ok_or_else(|| Error::route_not_found(name))?;

        let mut used = BTreeSet::new();
        let segments = fill_template(name, &route.template, parameters, &mut used)?;

        let mut url = root.map(ToString::to_string).unwrap_or_default();
        if segments.is_empty() {
            url.push('/');
        }
        for segment in &segments {
            url.push('/');
            match segment.as_str() {
                "." => url.push_str("%2E"),
                ".." => url.push_str("%2E%2E"),
                other => url.extend(utf8_percent_encode(other, PATH_SEGMENT)),
            }
        }

        let extra: Vec<_> = parameters.iter().filter(|(k, _)| !used.contains(*k)).collect();
        if !extra.is_empty() {
            url.push('?');
            url.push_str(&form_urlencoded::Serializer::new(String::new()).extend_pairs(extra).finish());
        }

        Ok(url)
    }

    pub(crate) fn lookup(
        &self,
        method: Method,
        path: &str,
    ) -> Option<(BoxedHandler, HashMap<String, String>)> {
        self.find(method, path)
            .or_else(|| if method.is_head() { self.find(Method::Get, path) } else { None })
    }

    /// Captured values are percent-decoded; a capture that does not decode
    /// to UTF-8 matches nothing.
    fn find(&self, method: Method, path: &str) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(&method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| {
                let value = percent_decode_str(v).decode_utf8().ok()?;
                Some((k.to_owned(), value.into_owned()))
            })
            .collect::<Option<_>>()?;
        Some((handler, params))
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.names.keys().collect();
        names.sort();
        f.debug_struct("Router").field("named_routes", &names).finish_non_exhaustive()
    }
}

/// Splits `template` into unencoded path segments with every `{param}`
/// replaced by its value. Names of the consumed parameters go into `used`.
fn fill_template(
    route: &str,
    template: &str,
    parameters: &RouteParameters,
    used: &mut BTreeSet<String>,
) -> Result<Vec<String>, Error> {
    let mut value_of = |name: &str| {
        used.insert(name.to_owned());
        parameters.get(name).filter(|v| !v.is_empty()).ok_or_else(|| Error::MissingRouteParameter {
            route: route.to_owned(),
            parameter: name.to_owned(),
        })
    };

    let trimmed = template.strip_prefix('/').unwrap_or(template);
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let mut segments = Vec::new();
    for raw in trimmed.split('/') {
        if let Some(name) = raw.strip_prefix("{*").and_then(|r| r.strip_suffix('}')) {
            let value = value_of(name)?;
            segments.extend(value.trim_start_matches('/').split('/').map(str::to_owned));
            continue;
        }

        let mut segment = String::new();
        let mut rest = raw;
        while let Some(open) = rest.find('{') {
            segment.push_str(&rest[..open]);
            let Some(close) = rest[open..].find('}') else { break };
            segment.push_str(value_of(&rest[open + 1..open + close])?);
            rest = &rest[open + close + 1..];
        }
        segment.push_str(rest);
        segments.push(segment);
    }
    Ok(segments)
}
