//! Runs one request through an application and emits the response.
//!
//! For transports that hand over a request and expect the answer written
//! to a stream (CGI-style gateways, tests, batch replays) rather than
//! returned to a connection handler.

use std::sync::Arc;

use tracing::warn;

use crate::app::Application;
use crate::emitter::{Emission, Emitter, EmitterStack};
use crate::error::Error;
use crate::request::Request;

pub struct Runner {
    app: Arc<Application>,
    emitters: EmitterStack,
}

impl Runner {
    pub fn new(app: Arc<Application>, emitters: EmitterStack) -> Self {
        Self { app, emitters }
    }

    /// Dispatches `request` and hands the response to the emitter stack.
    ///
    /// [`Emission::Declined`] means nothing was written; the caller decides
    /// what to fall back to.
    pub async fn run(&self, request: Request) -> Result<Emission, Error> {
        let method = request.method().clone();
        let uri = request.uri().clone();
        let response = self.app.handle(request).await;

        let outcome = self.emitters.emit(&response)?;
        if outcome == Emission::Declined {
            warn!(
                %method,
                %uri,
                status = response.status_code().as_u16(),
                emitters = self.emitters.len(),
                "no emitter accepted the response"
            );
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use http::{Method, Uri};

    use super::*;
    use crate::emitter::{ContentRangeEmitter, WireEmitter};
    use crate::middleware::Pipeline;
    use crate::response::Response;
    use crate::router::Router;

    async fn hello(_req: Request) -> Response {
        Response::text("hello")
    }

    fn app() -> Arc<Application> {
        Arc::new(Application::new(Pipeline::new().pipe(Router::new().get("/", hello))))
    }

    fn get(uri: &'static str) -> Request {
        Request::new(Method::GET, Uri::from_static(uri))
    }

    #[tokio::test]
    async fn emits_through_stack() {
        let out = Arc::new(Mutex::new(Vec::new()));
        let mut stack = EmitterStack::new();
        stack.push(ContentRangeEmitter::new(out.clone()));
        stack.push(WireEmitter::new(out.clone()));

        let outcome = Runner::new(app(), stack).run(get("/")).await.unwrap();

        assert_eq!(outcome, Emission::Handled);
        let written = String::from_utf8(out.lock().unwrap().clone()).unwrap();
        assert!(written.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(written.ends_with("hello"));
    }

    #[tokio::test]
    async fn reports_declined_when_nothing_emits() {
        let out: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));
        let mut stack = EmitterStack::new();
        stack.push(ContentRangeEmitter::new(out.clone()));

        let outcome = Runner::new(app(), stack).run(get("/missing")).await.unwrap();

        assert_eq!(outcome, Emission::Declined);
        assert!(out.lock().unwrap().is_empty());
    }
}
