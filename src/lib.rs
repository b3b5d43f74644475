//! # hateoas
//!
//! Hypermedia links to named routes, on a minimal HTTP framework for Rust
//! services behind a reverse proxy.
//!
//! ## The contract
//!
//! A [`Link`] points at a route *name* with the parameters its path needs.
//! Where that route lives is the [`Router`]'s business: the link asks once
//! for the method, the path and the absolute URL, and keeps the answers.
//!
//! - Named routes: `router.named("users.show", Method::Get, "/users/{id}", …)`
//! - Links: `Link::new("users.show", [("id", 42)])?.as_name("self")?`
//! - Resolution: `link.url(&req.urls())?` gives `https://api.example.test/users/42`
//!
//! nginx handles TLS, rate limiting, slow clients, and body-size limits. The
//! public scheme and host come from `x-forwarded-*` headers unless pinned with
//! [`Server::public_url`].
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use hateoas::{Error, Link, Method, Request, Response, Router, Server, StatusCode};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Error> {
//!     let app = Router::new()
//!         .named("users.show",  Method::Get,  "/users/{id}", get_user)
//!         .named("users.store", Method::Post, "/users",      create_user);
//!
//!     Server::bind("0.0.0.0:3000")?.serve(app).await
//! }
//!
//! async fn get_user(req: Request) -> Result<Response, Error> {
//!     let id = req.param("id").unwrap_or("unknown");
//!     let urls = req.urls();
//!     let me = Link::new("users.show", [("id", id)])?.as_name("self")?;
//!     let body = format!(
//!         r#"{{"id":"{id}","_links":{{"{}":{{"href":"{}","method":"{}"}}}}}}"#,
//!         me.name(),
//!         me.url(&urls)?,
//!         me.method(&urls)?,
//!     );
//!     Ok(Response::json(body))
//! }
//!
//! async fn create_user(req: Request) -> Result<Response, Error> {
//!     if req.body().is_empty() {
//!         return Ok(Response::status(StatusCode::BAD_REQUEST));
//!     }
//!     Ok(Response::builder()
//!         .status(StatusCode::CREATED)
//!         .location(&Link::new("users.show", [("id", 99)])?, &req.urls())?
//!         .no_body())
//! }
//! ```

mod error;
mod handler;
mod link;
mod method;
mod request;
mod response;
mod router;
mod server;
mod urls;

pub use error::Error;
pub use handler::Handler;
pub use http::StatusCode;
pub use link::{Link, RouteParameters, RouteResolver};
pub use method::Method;
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
pub use urls::{UrlGenerator, UrlRoot};
