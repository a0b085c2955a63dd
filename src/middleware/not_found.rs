use std::sync::Arc;

use tracing::error;

use crate::error_response::ErrorResponseGenerator;
use crate::handler::BoxFuture;
use crate::not_found::NotFoundHandler;
use crate::request::Request;

use super::{Middleware, Next};

/// Answers every request it sees with the [`NotFoundHandler`]'s response.
///
/// Pipe it last: it never calls the rest of the pipeline. A renderer failure
/// becomes a 500 built by the [`ErrorResponseGenerator`].
pub struct NotFoundMiddleware {
    handler: Arc<NotFoundHandler>,
    errors: ErrorResponseGenerator,
}

impl NotFoundMiddleware {
    pub fn new(handler: Arc<NotFoundHandler>) -> Self {
        Self { handler, errors: ErrorResponseGenerator::default() }
    }

    pub fn with_errors(mut self, errors: ErrorResponseGenerator) -> Self {
        self.errors = errors;
        self
    }
}

impl Middleware for NotFoundMiddleware {
    fn process<'a>(&'a self, req: Request, _next: Next<'a>) -> BoxFuture<'a> {
        let response = match self.handler.handle(&req) {
            Ok(response) => response,
            Err(e) => {
                error!(method = %req.method(), uri = %req.uri(), "not-found page failed: {e}");
                self.errors.generate(&e, &req)
            }
        };
        Box::pin(async move { response })
    }
}
