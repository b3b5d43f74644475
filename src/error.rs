//! Unified error type.

use thiserror::Error;

/// The error type returned by hateoas's fallible operations.
///
/// Application-level errors (404, 422, etc.) are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s. This type surfaces
/// link construction and resolution failures, plus infrastructure failures:
/// binding to a port or accepting a connection.
#[derive(Debug, Error)]
pub enum Error {
    /// A caller-supplied value was rejected before any lookup happened.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No route is registered under this name.
    #[error("route `{route}` is not defined")]
    RouteNotFound { route: String },

    /// The route's path template needs a parameter the caller did not supply.
    #[error("missing parameter `{parameter}` for route `{route}`")]
    MissingRouteParameter { route: String, parameter: String },

    /// The configured public URL cannot serve as a root for absolute URLs.
    #[error("invalid url root `{root}`: {reason}")]
    InvalidUrlRoot { root: String, reason: String },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn route_not_found(route: &str) -> Self {
        Self::RouteNotFound { route: route.to_owned() }
    }
}
