//! Minimal hateoas example: a user resource that links to its neighbours.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/users/42
//!   curl -H 'x-forwarded-proto: https' -H 'x-forwarded-host: api.example.test' \
//!        http://localhost:3000/users/42
//!   curl -i -X POST http://localhost:3000/users -d '{"name":"alice"}'

use hateoas::{Error, Link, Method, Request, Response, Router, Server, StatusCode};
use serde_json::{Map, Value, json};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt::init();

    let app = Router::new()
        .named("users.index",   Method::Get,    "/users",      list_users)
        .named("users.store",   Method::Post,   "/users",      create_user)
        .named("users.show",    Method::Get,    "/users/{id}", get_user)
        .named("users.destroy", Method::Delete, "/users/{id}", delete_user);

    Server::bind("0.0.0.0:3000")?.serve(app).await
}

/// Renders `links` as a `{"name":{"href":…,"method":…}}` object.
fn links_json(req: &Request, links: &[Link]) -> Result<Value, Error> {
    let urls = req.urls();
    let mut rendered = Map::new();
    for link in links {
        rendered.insert(
            link.name().to_owned(),
            json!({ "href": link.url(&urls)?, "method": link.method(&urls)?.as_str() }),
        );
    }
    Ok(Value::Object(rendered))
}

// GET /users
async fn list_users(req: Request) -> Result<Response, Error> {
    let links = [
        Link::to("users.index")?.as_name("self")?,
        Link::to("users.store")?.as_name("create")?,
        Link::make("users.index", [("page", 2)])?.as_name("next")?,
    ];
    let body = json!({ "data": [], "_links": links_json(&req, &links)? });
    Ok(Response::json(body.to_string()))
}

// GET /users/{id}
async fn get_user(req: Request) -> Result<Response, Error> {
    let id = req.param("id").unwrap_or("unknown").to_owned();
    let links = [
        Link::make("users.show", [("id", &id)])?.as_name("self")?,
        Link::make("users.destroy", [("id", &id)])?.as_name("delete")?,
        Link::to("users.index")?.as_name("collection")?,
    ];
    let body = json!({ "id": id, "name": "alice", "_links": links_json(&req, &links)? });
    Ok(Response::json(body.to_string()))
}

// POST /users → 201 Created, Location points at the new user
async fn create_user(req: Request) -> Result<Response, Error> {
    if req.body().is_empty() {
        return Ok(Response::status(StatusCode::BAD_REQUEST));
    }
    Ok(Response::builder()
        .status(StatusCode::CREATED)
        .location(&Link::make("users.show", [("id", 99)])?, &req.urls())?
        .json(r#"{"id":"99","name":"new_user"}"#))
}

// DELETE /users/{id} → 204 No Content
async fn delete_user(_req: Request) -> Response {
    Response::status(StatusCode::NO_CONTENT)
}
