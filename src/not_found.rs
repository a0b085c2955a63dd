//! Terminal 404 handler.
//!
//! Runs when nothing else in the pipeline answered a request. Without a
//! renderer it writes `Cannot <METHOD> <URI>` as plain text; with one it
//! renders the configured template, binding `request` and `layout`.

use std::fmt;
use std::sync::Arc;

use http::StatusCode;

use crate::config::NotFoundConfig;
use crate::error::Error;
use crate::request::Request;
use crate::response::{ContentType, Response};
use crate::template::{TemplateParams, TemplateRenderer, TemplateValue};

pub const TEMPLATE_DEFAULT: &str = "error::404";
pub const LAYOUT_DEFAULT: &str = "layout::default";

/// Produces the 404 response. Never delegates further.
#[derive(Clone)]
pub struct NotFoundHandler {
    renderer: Option<Arc<dyn TemplateRenderer>>,
    template: String,
    layout: String,
    prototype: Response,
}

impl NotFoundHandler {
    /// A plain-text handler deriving its responses from `prototype`.
    pub fn new(prototype: Response) -> Self {
        Self {
            renderer: None,
            template: TEMPLATE_DEFAULT.to_owned(),
            layout: LAYOUT_DEFAULT.to_owned(),
            prototype,
        }
    }

    pub fn from_config(
        config: &NotFoundConfig,
        renderer: Option<Arc<dyn TemplateRenderer>>,
    ) -> Self {
        Self {
            renderer,
            template: config.template.clone(),
            layout: config.layout.clone(),
            prototype: Response::status(StatusCode::OK),
        }
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn TemplateRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    pub fn with_layout(mut self, layout: impl Into<String>) -> Self {
        self.layout = layout.into();
        self
    }

    /// Creates the 404 response for `request`.
    ///
    /// Renderer failures are returned as-is.
    pub fn handle(&self, request: &Request) -> Result<Response, Error> {
        match &self.renderer {
            None => Ok(plain_text(&self.prototype, request)),
            Some(renderer) => self.templated(renderer.as_ref(), request),
        }
    }

    fn templated(
        &self,
        renderer: &dyn TemplateRenderer,
        request: &Request,
    ) -> Result<Response, Error> {
        let params = TemplateParams::new()
            .bind("request", TemplateValue::Request(request))
            .bind("layout", TemplateValue::Text(&self.layout));
        let body = renderer.render(&self.template, &params)?;

        Ok(self.prototype
            .with_status(StatusCode::NOT_FOUND)
            .with_body(ContentType::Html, body))
    }
}

impl Default for NotFoundHandler {
    fn default() -> Self {
        Self::new(Response::status(StatusCode::OK))
    }
}

impl fmt::Debug for NotFoundHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotFoundHandler")
            .field("renderer", &self.renderer.is_some())
            .field("template", &self.template)
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

/// `404` with body `Cannot <METHOD> <URI>`, derived from `prototype`.
pub(crate) fn plain_text(prototype: &Response, request: &Request) -> Response {
    prototype
        .with_status(StatusCode::NOT_FOUND)
        .with_body(
            ContentType::Text,
            format!("Cannot {} {}", request.method(), request.uri()),
        )
}
