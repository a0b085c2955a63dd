//! Middleware layer.
//!
//! Middleware intercepts requests on their way to the router and responses on
//! their way back. A [`Pipeline`] runs its middleware in the order they were
//! piped; each one decides whether to answer itself or call [`Next::run`].
//!
//! ```text
//! Pipeline [ Trace, Router, NotFoundMiddleware ]
//!    Trace ──next──▶ Router ──no route──▶ NotFoundMiddleware ──▶ 404
//!                      │
//!                      └── matched ──▶ handler
//! ```
//!
//! Running off the end of the pipeline yields a plain-text 404.

mod not_found;
mod trace;

use std::sync::Arc;

use http::StatusCode;

use crate::handler::BoxFuture;
use crate::not_found::plain_text;
use crate::request::Request;
use crate::response::Response;

pub use not_found::NotFoundMiddleware;
pub use trace::Trace;

/// One stage of a [`Pipeline`].
pub trait Middleware: Send + Sync + 'static {
    fn process<'a>(&'a self, req: Request, next: Next<'a>) -> BoxFuture<'a>;
}

/// The rest of the pipeline after the current middleware.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    chain: &'a [Arc<dyn Middleware>],
}

impl<'a> Next<'a> {
    pub fn run(self, req: Request) -> BoxFuture<'a> {
        match self.chain.split_first() {
            Some((head, rest)) => head.process(req, Next { chain: rest }),
            None => {
                let response = plain_text(&Response::status(StatusCode::OK), &req);
                Box::pin(async move { response })
            }
        }
    }
}

/// An ordered list of middleware.
#[derive(Clone, Default)]
pub struct Pipeline {
    chain: Vec<Arc<dyn Middleware>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self { chain: Vec::new() }
    }

    /// Appends `middleware`; it runs after everything piped before it.
    pub fn pipe(mut self, middleware: impl Middleware) -> Self {
        self.chain.push(Arc::new(middleware));
        self
    }

    pub fn len(&self) -> usize { self.chain.len() }
    pub fn is_empty(&self) -> bool { self.chain.is_empty() }

    /// Runs `req` through the pipeline.
    pub fn handle(&self, req: Request) -> BoxFuture<'_> {
        Next { chain: &self.chain }.run(req)
    }
}
