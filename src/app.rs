//! Application wiring: pipeline plus request factory.

use std::sync::Arc;

use tracing::debug;

use crate::config::AppConfig;
use crate::error::Error;
use crate::error_response::ErrorResponseGenerator;
use crate::filter::XForwardedFilter;
use crate::handler::BoxFuture;
use crate::middleware::{NotFoundMiddleware, Pipeline, Trace};
use crate::not_found::NotFoundHandler;
use crate::request::Request;
use crate::router::Router;
use crate::server_request::ServerRequestFactory;
use crate::template::TemplateRenderer;

/// Everything needed to turn transport input into a response.
#[derive(Clone, Default)]
pub struct Application {
    pipeline: Pipeline,
    requests: ServerRequestFactory,
}

impl Application {
    /// An application that does not rewrite incoming requests.
    pub fn new(pipeline: Pipeline) -> Self {
        Self { pipeline, requests: ServerRequestFactory::default() }
    }

    pub fn with_request_factory(mut self, requests: ServerRequestFactory) -> Self {
        self.requests = requests;
        self
    }

    /// Wires `router` the standard way:
    ///
    /// ```text
    /// [forwarded] → XForwardedFilter → ServerRequestFactory
    /// Pipeline [ Trace, router, NotFoundMiddleware(not_found, error_reporting) ]
    /// ```
    ///
    /// Fails on the same configuration errors as [`AppConfig::validate`].
    pub fn from_config(
        config: &AppConfig,
        router: Router,
        renderer: Option<Arc<dyn TemplateRenderer>>,
    ) -> Result<Self, Error> {
        let filter = XForwardedFilter::from_config(&config.forwarded)?;
        debug!(
            proxies = config.forwarded.trusted_proxies.len(),
            headers = ?filter.trusted_headers(),
            "forwarded-header filter ready"
        );

        let not_found = NotFoundHandler::from_config(&config.not_found, renderer);
        let errors = ErrorResponseGenerator::new(config.error_reporting.json_exceptions);
        let pipeline = Pipeline::new()
            .pipe(Trace)
            .pipe(router)
            .pipe(NotFoundMiddleware::new(Arc::new(not_found)).with_errors(errors));

        Ok(Self { pipeline, requests: ServerRequestFactory::new(filter) })
    }

    pub fn requests(&self) -> &ServerRequestFactory {
        &self.requests
    }

    pub fn handle(&self, req: Request) -> BoxFuture<'_> {
        self.pipeline.handle(req)
    }
}
