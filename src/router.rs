//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. The router is itself a
//! [`Middleware`]: a matched route answers the request, anything else is
//! passed to the next stage of the pipeline.

use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use matchit::Router as MatchitRouter;

use crate::handler::{BoxFuture, BoxedHandler, Handler};
use crate::middleware::{Middleware, Next};
use crate::request::Request;

/// The application router.
///
/// Build it once at startup and pipe it into a
/// [`Pipeline`](crate::middleware::Pipeline). Each registration returns
/// `self` so calls chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or conflicts with one already
    /// registered for `method`.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::GET, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::POST, path, handler)
    }

    pub fn put(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::PUT, path, handler)
    }

    pub fn delete(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::DELETE, path, handler)
    }

    pub(crate) fn lookup(
        &self,
        method: &Method,
        path: &str,
    ) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

impl Middleware for Router {
    fn process<'a>(&'a self, req: Request, next: Next<'a>) -> BoxFuture<'a> {
        match self.lookup(req.method(), req.uri().path()) {
            Some((handler, params)) => handler.call(req.with_params(params)),
            None => next.run(req),
        }
    }
}

#[cfg(test)]
mod tests {
    use http::{StatusCode, Uri};

    use super::*;
    use crate::middleware::Pipeline;
    use crate::response::Response;

    async fn user(req: Request) -> Response {
        Response::text(format!("user {}", req.param("id").unwrap_or("?")))
    }

    async fn created(_req: Request) -> StatusCode {
        StatusCode::CREATED
    }

    fn request(method: Method, uri: &'static str) -> Request {
        Request::new(method, Uri::from_static(uri))
    }

    #[tokio::test]
    async fn routes_by_method_and_path() {
        let pipeline = Pipeline::new().pipe(
            Router::new().get("/users/{id}", user).post("/users", created),
        );

        let got = pipeline.handle(request(Method::GET, "http://localhost/users/42")).await;
        assert_eq!(got.body(), b"user 42");

        let posted = pipeline.handle(request(Method::POST, "/users")).await;
        assert_eq!(posted.status_code(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn unmatched_falls_through_to_next() {
        let pipeline = Pipeline::new().pipe(Router::new().get("/users/{id}", user));

        let wrong_method = pipeline.handle(request(Method::DELETE, "/users/42")).await;
        let wrong_path = pipeline.handle(request(Method::GET, "/teams")).await;

        assert_eq!(wrong_method.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(wrong_path.body(), b"Cannot GET /teams");
    }

    #[test]
    #[should_panic(expected = "invalid route")]
    fn conflicting_routes_panic() {
        let _ = Router::new().get("/users/{id}", user).get("/users/{name}", user);
    }
}
