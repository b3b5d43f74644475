//! Hypermedia links derived from named routes.
//!
//! A [`Link`] names a route and carries the parameters its path template
//! needs. It does not know where the route lives: the HTTP method, path and
//! absolute URL are asked of a [`RouteResolver`] the first time they are read
//! and kept for the life of the link.
//!
//! ```rust
//! use hateoas::{Link, Method, Router, UrlRoot};
//! # use hateoas::{Request, Response};
//! # async fn show_user(_: Request) -> Response { Response::text("") }
//!
//! let router = Router::new().named("users.show", Method::Get, "/users/{id}", show_user);
//! let urls = router.urls(UrlRoot::parse("https://example.test").unwrap());
//!
//! let link = Link::new("users.show", [("id", 42)]).unwrap().as_name("self").unwrap();
//!
//! assert_eq!(link.name(), "self");
//! assert_eq!(link.method(&urls).unwrap(), Method::Get);
//! assert_eq!(link.path(&urls).unwrap(), "/users/42");
//! assert_eq!(link.url(&urls).unwrap(), "https://example.test/users/42");
//! ```

use std::cell::OnceCell;
use std::fmt;

use crate::error::Error;
use crate::method::Method;

// ── RouteResolver ─────────────────────────────────────────────────────────────

/// What a [`Link`] needs to know about routes.
///
/// [`UrlGenerator`](crate::UrlGenerator) is the implementation backed by a
/// [`Router`](crate::Router); tests can swap in anything that answers the two
/// questions.
pub trait RouteResolver {
    /// Methods the named route accepts, in registration order.
    fn methods(&self, route_name: &str) -> Result<Vec<Method>, Error>;

    /// The route's URL with `parameters` substituted. `absolute` selects
    /// `scheme://host/path` over a root-relative `/path`.
    fn url(
        &self,
        route_name: &str,
        parameters: &RouteParameters,
        absolute: bool,
    ) -> Result<String, Error>;
}

impl<R: RouteResolver + ?Sized> RouteResolver for &R {
    fn methods(&self, route_name: &str) -> Result<Vec<Method>, Error> {
        (**self).methods(route_name)
    }

    fn url(
        &self,
        route_name: &str,
        parameters: &RouteParameters,
        absolute: bool,
    ) -> Result<String, Error> {
        (**self).url(route_name, parameters, absolute)
    }
}

// ── RouteParameters ───────────────────────────────────────────────────────────

/// Values substituted into a route's path template, keyed by parameter name.
///
/// Values are stored in their string form, so anything `ToString` goes.
/// Order is the order keys were first given; it decides the order of the
/// query string built from parameters a route's path does not use.
///
/// ```rust
/// use hateoas::RouteParameters;
///
/// let params = RouteParameters::from([("id", 42)]).with("page", 2);
/// assert_eq!(params.get("id"), Some("42"));
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RouteParameters(Vec<(String, String)>);

impl RouteParameters {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Adds a parameter, or replaces its value in place. Returns `self` for chaining.
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.insert(key.into(), value.to_string());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    fn insert(&mut self, key: String, value: String) {
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    /// Iterates in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for RouteParameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (k, v) in iter {
            params.insert(k.into(), v.to_string());
        }
        params
    }
}

impl<K: Into<String>, V: ToString, const N: usize> From<[(K, V); N]> for RouteParameters {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

// ── Link ──────────────────────────────────────────────────────────────────────

/// A hypermedia link to a named route.
///
/// `method`, `path` and `url` are each resolved at most once per link. A
/// failed resolution is not cached, so a later call tries again. Renaming with
/// [`as_name`](Link::as_name) never touches the cached values.
///
/// The caches are plain [`OnceCell`]s: a `Link` can move between threads but
/// cannot be shared by them.
pub struct Link {
    name: String,
    route_name: String,
    route_parameters: RouteParameters,
    method: OnceCell<Method>,
    path: OnceCell<String>,
    url: OnceCell<String>,
}

impl Link {
    /// Creates a link to `route_name`. The link's name starts out as the route name.
    ///
    /// Fails with [`Error::InvalidArgument`] if `route_name` is blank.
    pub fn new(
        route_name: impl Into<String>,
        route_parameters: impl Into<RouteParameters>,
    ) -> Result<Self, Error> {
        let route_name = route_name.into();
        if route_name.trim().is_empty() {
            return Err(Error::InvalidArgument("route name must not be empty".to_owned()));
        }
        Ok(Self {
            name: route_name.clone(),
            route_name,
            route_parameters: route_parameters.into(),
            method: OnceCell::new(),
            path: OnceCell::new(),
            url: OnceCell::new(),
        })
    }

    /// Same as [`Link::new`]; reads better at the call site of a list of links.
    pub fn make(
        route_name: impl Into<String>,
        route_parameters: impl Into<RouteParameters>,
    ) -> Result<Self, Error> {
        Self::new(route_name, route_parameters)
    }

    /// A link to a route that takes no parameters.
    pub fn to(route_name: impl Into<String>) -> Result<Self, Error> {
        Self::new(route_name, RouteParameters::new())
    }

    /// Renames the link. Returns `self` for chaining.
    pub fn as_name(mut self, name: impl Into<String>) -> Result<Self, Error> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::InvalidArgument("link name must not be empty".to_owned()));
        }
        self.name = name;
        Ok(self)
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn route_name(&self) -> &str { &self.route_name }
    pub fn route_parameters(&self) -> &RouteParameters { &self.route_parameters }

    /// The method a client should use to follow the link.
    ///
    /// This is the first method the route accepts other than `HEAD`, which
    /// the router adds on its own to every `GET` route. A route that accepts
    /// only `HEAD` yields `HEAD`.
    pub fn method<R: RouteResolver + ?Sized>(&self, resolver: &R) -> Result<Method, Error> {
        memoize(&self.method, || {
            let methods = resolver.methods(&self.route_name)?;
            methods
                .iter()
                .copied()
                .find(|m| !m.is_head())
                .or_else(|| methods.first().copied())
                .ok_or_else(|| Error::route_not_found(&self.route_name))
        })
        .copied()
    }

    /// Root-relative path, e.g. `/users/42`.
    pub fn path<R: RouteResolver + ?Sized>(&self, resolver: &R) -> Result<&str, Error> {
        memoize(&self.path, || resolver.url(&self.route_name, &self.route_parameters, false))
            .map(String::as_str)
    }

    /// Absolute URL, e.g. `https://example.test/users/42`.
    pub fn url<R: RouteResolver + ?Sized>(&self, resolver: &R) -> Result<&str, Error> {
        memoize(&self.url, || resolver.url(&self.route_name, &self.route_parameters, true))
            .map(String::as_str)
    }
}

fn memoize<T>(
    cell: &OnceCell<T>,
    resolve: impl FnOnce() -> Result<T, Error>,
) -> Result<&T, Error> {
    if let Some(value) = cell.get() {
        return Ok(value);
    }
    let value = resolve()?;
    Ok(cell.get_or_init(|| value))
}

/// Clones start with empty caches.
impl Clone for Link {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            route_name: self.route_name.clone(),
            route_parameters: self.route_parameters.clone(),
            method: OnceCell::new(),
            path: OnceCell::new(),
            url: OnceCell::new(),
        }
    }
}

impl fmt::Debug for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Link")
            .field("name", &self.name)
            .field("route_name", &self.route_name)
            .field("route_parameters", &self.route_parameters)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    use super::*;

    /// In-memory resolver that counts how often it is asked.
    #[derive(Default)]
    struct FakeRoutes {
        routes: RefCell<HashMap<String, (Vec<Method>, String)>>,
        method_calls: Cell<usize>,
        url_calls: Cell<usize>,
    }

    impl FakeRoutes {
        fn with(self, name: &str, methods: &[Method], template: &str) -> Self {
            self.register(name, methods, template);
            self
        }

        fn register(&self, name: &str, methods: &[Method], template: &str) {
            self.routes
                .borrow_mut()
                .insert(name.to_owned(), (methods.to_vec(), template.to_owned()));
        }
    }

    impl RouteResolver for FakeRoutes {
        fn methods(&self, route_name: &str) -> Result<Vec<Method>, Error> {
            self.method_calls.set(self.method_calls.get() + 1);
            self.routes
                .borrow()
                .get(route_name)
                .map(|(methods, _)| methods.clone())
                .ok_or_else(|| Error::route_not_found(route_name))
        }

        fn url(
            &self,
            route_name: &str,
            parameters: &RouteParameters,
            absolute: bool,
        ) -> Result<String, Error> {
            self.url_calls.set(self.url_calls.get() + 1);
            let routes = self.routes.borrow();
            let (_, template) = routes
                .get(route_name)
                .ok_or_else(|| Error::route_not_found(route_name))?;
            let mut path = template.clone();
            if path.contains("{id}") {
                let id = parameters.get("id").ok_or_else(|| Error::MissingRouteParameter {
                    route: route_name.to_owned(),
                    parameter: "id".to_owned(),
                })?;
                path = path.replace("{id}", id);
            }
            Ok(if absolute { format!("https://example.test{path}") } else { path })
        }
    }

    fn users() -> FakeRoutes {
        FakeRoutes::default()
            .with("users.show", &[Method::Get, Method::Head], "/users/{id}")
            .with("users.store", &[Method::Post, Method::Head], "/users")
    }

    #[test]
    fn name_defaults_to_route_name() {
        let link = Link::to("users.show").unwrap();
        assert_eq!(link.name(), "users.show");
        assert_eq!(link.route_name(), "users.show");
        assert!(link.route_parameters().is_empty());
    }

    #[test]
    fn blank_route_name_is_rejected() {
        assert!(matches!(Link::to(""), Err(Error::InvalidArgument(_))));
        assert!(matches!(Link::make("  ", [("id", 1)]), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn blank_link_name_is_rejected() {
        let link = Link::to("users.show").unwrap();
        assert!(matches!(link.as_name(""), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn rename_keeps_the_last_name() {
        let link = Link::to("users.show")
            .unwrap()
            .as_name("self")
            .unwrap()
            .as_name("user")
            .unwrap();
        assert_eq!(link.name(), "user");
        assert_eq!(link.route_name(), "users.show");
    }

    #[test]
    fn method_skips_head() {
        let routes = users();
        assert_eq!(Link::to("users.show").unwrap().method(&routes).unwrap(), Method::Get);
        assert_eq!(Link::to("users.store").unwrap().method(&routes).unwrap(), Method::Post);
    }

    #[test]
    fn method_skips_head_even_when_listed_first() {
        let routes = FakeRoutes::default().with("ping", &[Method::Head, Method::Get], "/ping");
        assert_eq!(Link::to("ping").unwrap().method(&routes).unwrap(), Method::Get);
    }

    #[test]
    fn head_only_route_yields_head() {
        let routes = FakeRoutes::default().with("ping", &[Method::Head], "/ping");
        assert_eq!(Link::to("ping").unwrap().method(&routes).unwrap(), Method::Head);
    }

    #[test]
    fn route_without_methods_is_not_found() {
        let routes = FakeRoutes::default().with("ghost", &[], "/ghost");
        let err = Link::to("ghost").unwrap().method(&routes).unwrap_err();
        assert!(matches!(err, Error::RouteNotFound { route } if route == "ghost"));
    }

    #[test]
    fn every_accessor_queries_the_resolver_once() {
        let routes = users();
        let link = Link::new("users.show", [("id", 42)]).unwrap();

        assert_eq!(link.method(&routes).unwrap(), link.method(&routes).unwrap());
        assert_eq!(routes.method_calls.get(), 1);

        assert_eq!(link.path(&routes).unwrap(), "/users/42");
        assert_eq!(link.path(&routes).unwrap(), "/users/42");
        assert_eq!(link.url(&routes).unwrap(), "https://example.test/users/42");
        assert_eq!(link.url(&routes).unwrap(), "https://example.test/users/42");
        assert_eq!(routes.url_calls.get(), 2);
    }

    #[test]
    fn cached_values_survive_route_changes() {
        let routes = users();
        let link = Link::new("users.show", [("id", 7)]).unwrap();
        assert_eq!(link.path(&routes).unwrap(), "/users/7");

        routes.register("users.show", &[Method::Put], "/people/{id}");
        assert_eq!(link.path(&routes).unwrap(), "/users/7");
        assert_eq!(link.method(&routes).unwrap(), Method::Put);
    }

    #[test]
    fn rename_after_resolution_keeps_the_cached_path() {
        let routes = users();
        let link = Link::new("users.show", [("id", 1)]).unwrap();
        let before = link.path(&routes).unwrap().to_owned();

        let link = link.as_name("foo").unwrap();
        assert_eq!(link.name(), "foo");
        assert_eq!(link.path(&routes).unwrap(), before);
        assert_eq!(routes.url_calls.get(), 1);
    }

    #[test]
    fn not_found_is_not_cached() {
        let routes = FakeRoutes::default();
        let link = Link::to("nonexistent.route").unwrap();

        let err = link.method(&routes).unwrap_err();
        assert!(matches!(err, Error::RouteNotFound { ref route } if route == "nonexistent.route"));
        assert!(link.url(&routes).is_err());

        routes.register("nonexistent.route", &[Method::Delete], "/later");
        assert_eq!(link.method(&routes).unwrap(), Method::Delete);
        assert_eq!(link.url(&routes).unwrap(), "https://example.test/later");
        assert_eq!(routes.method_calls.get(), 2);

        link.method(&routes).unwrap();
        assert_eq!(routes.method_calls.get(), 2);
    }

    #[test]
    fn missing_parameter_propagates() {
        let routes = users();
        let err = Link::to("users.show").unwrap().path(&routes).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingRouteParameter { ref route, ref parameter }
                if route == "users.show" && parameter == "id"
        ));
    }

    #[test]
    fn clone_starts_with_empty_caches() {
        let routes = users();
        let link = Link::new("users.show", [("id", 3)]).unwrap().as_name("self").unwrap();
        link.path(&routes).unwrap();

        let copy = link.clone();
        assert_eq!(copy.name(), "self");
        assert_eq!(copy.path(&routes).unwrap(), "/users/3");
        assert_eq!(routes.url_calls.get(), 2);
    }

    #[test]
    fn parameters_accept_any_display_value() {
        let params: RouteParameters = vec![("id", 42)].into_iter().collect();
        let params = params.with("slug", "hello-world");
        assert_eq!(params.len(), 2);
        assert_eq!(params.iter().collect::<Vec<_>>(), [("id", "42"), ("slug", "hello-world")]);
    }

    #[test]
    fn parameters_keep_first_insertion_order() {
        let params = RouteParameters::from([("sort", "name"), ("page", "2")]).with("sort", "email");
        assert_eq!(params.iter().collect::<Vec<_>>(), [("sort", "email"), ("page", "2")]);
        assert_eq!(params.len(), 2);
    }
}
