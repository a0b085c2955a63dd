//! Turns failures raised while answering a request into a 500 response.

use http::StatusCode;
use serde::Serialize;

use crate::config::JsonExceptionsConfig;
use crate::request::Request;
use crate::response::{ContentType, Response};

/// Builds the `500 Internal Server Error` response for a failed request.
///
/// Plain text unless `json_exceptions.display` is on, in which case the body
/// is `{"message": …}` plus the error's source chain as `trace` when
/// `show_trace` is set. With `ajax_only`, JSON is reserved for requests
/// sending `X-Requested-With: XMLHttpRequest`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ErrorResponseGenerator {
    json: JsonExceptionsConfig,
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace: Option<Vec<String>>,
}

impl ErrorResponseGenerator {
    pub fn new(json: JsonExceptionsConfig) -> Self {
        Self { json }
    }

    pub fn generate(
        &self,
        error: &(dyn std::error::Error + 'static),
        request: &Request,
    ) -> Response {
        if !self.wants_json(request) {
            return Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .text("Internal Server Error");
        }

        let trace = self.json.show_trace.then(|| {
            std::iter::successors(error.source(), |e| e.source())
                .map(ToString::to_string)
                .collect()
        });
        let body = ErrorBody { message: error.to_string(), trace };

        Response::builder()
            .status(StatusCode::INTERNAL_SERVER_ERROR)
            .bytes(ContentType::Json, serde_json::to_vec(&body).unwrap_or_default())
    }

    fn wants_json(&self, request: &Request) -> bool {
        if !self.json.display {
            return false;
        }
        !self.json.ajax_only || is_ajax(request)
    }
}

fn is_ajax(request: &Request) -> bool {
    request
        .header("x-requested-with")
        .is_some_and(|v| v.eq_ignore_ascii_case("xmlhttprequest"))
}
