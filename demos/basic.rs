//! Minimal waypost service behind a proxy.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/whoami
//!   curl http://localhost:3000/whoami -H 'x-forwarded-host: api.example.com' \
//!        -H 'x-forwarded-proto: https'
//!   curl http://localhost:3000/nope

use std::sync::Arc;

use waypost::template::{TemplateParams, TemplateRenderer};
use waypost::{AppConfig, Application, Error, Request, Response, Router, Server};

const CONFIG: &str = r#"
[server]
bind_address = "0.0.0.0:3000"

[forwarded]
trusted_proxies = ["127.0.0.0/8", "::1"]

[error_reporting.json_exceptions]
display = true
"#;

/// Stand-in for a real template engine.
struct Pages;

impl TemplateRenderer for Pages {
    fn render(&self, template: &str, params: &TemplateParams<'_>) -> Result<String, Error> {
        let path = params.request("request").map(|r| r.uri().path()).unwrap_or("/");
        let layout = params.text("layout").unwrap_or("none");
        Ok(format!("<!-- {layout} --><h1>{template}</h1><p>No page at {path}</p>"))
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_toml(CONFIG).expect("invalid config");
    let router = Router::new().get("/whoami", whoami);
    let app = Application::from_config(&config, router, Some(Arc::new(Pages)))
        .expect("invalid application");

    Server::bind(&config.server.bind_address)
        .serve(app)
        .await
        .expect("server error");
}

// GET /whoami echoes the URI after forwarded headers were applied.
async fn whoami(req: Request) -> Response {
    Response::text(req.uri().to_string())
}
