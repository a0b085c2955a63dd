use std::time::Instant;

use tracing::info;

use crate::handler::BoxFuture;
use crate::request::Request;

use super::{Middleware, Next};

/// Logs one `info` event per request: method, URI, status and latency.
#[derive(Clone, Copy, Debug, Default)]
pub struct Trace;

impl Middleware for Trace {
    fn process<'a>(&'a self, req: Request, next: Next<'a>) -> BoxFuture<'a> {
        Box::pin(async move {
            let method = req.method().clone();
            let uri = req.uri().clone();
            let started = Instant::now();

            let response = next.run(req).await;

            info!(
                %method,
                %uri,
                status = response.status_code().as_u16(),
                latency_us = started.elapsed().as_micros() as u64,
                "request served"
            );
            response
        })
    }
}
