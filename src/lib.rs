//! # waypost
//!
//! Middleware dispatch for small HTTP services that sit behind a reverse
//! proxy.
//!
//! A request travels:
//!
//! ```text
//! hyper ─▶ ServerRequestFactory ─▶ XForwardedFilter ─▶ Pipeline ─▶ Router ─▶ handler
//!                                                         │
//!                                                         └─▶ NotFoundMiddleware ─▶ 404
//! ```
//!
//! Transports that write the response themselves use a [`Runner`], which
//! hands the finished response to an [`EmitterStack`]: the first emitter that
//! can send it does, the rest are skipped.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use waypost::{AppConfig, Application, Request, Response, Router, Server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::from_toml(r#"
//!         [forwarded]
//!         trusted_proxies = ["10.0.0.0/8"]
//!     "#).unwrap();
//!
//!     let router = Router::new().get("/users/{id}", get_user);
//!     let app = Application::from_config(&config, router, None).unwrap();
//!
//!     Server::bind(&config.server.bind_address).serve(app).await.unwrap();
//! }
//!
//! async fn get_user(req: Request) -> Response {
//!     let id = req.param("id").unwrap_or("unknown");
//!     Response::json(format!(r#"{{"id":"{id}"}}"#))
//! }
//! ```

mod app;
mod error;
mod error_response;
mod handler;
mod not_found;
mod request;
mod response;
mod router;
mod runner;
mod server;
mod server_request;

pub mod config;
pub mod emitter;
pub mod filter;
pub mod middleware;
pub mod template;

pub use app::Application;
pub use config::AppConfig;
pub use emitter::{Emission, Emitter, EmitterStack};
pub use error::Error;
pub use error_response::ErrorResponseGenerator;
pub use handler::{BoxFuture, Handler};
pub use not_found::{LAYOUT_DEFAULT, NotFoundHandler, TEMPLATE_DEFAULT};
pub use request::Request;
pub use response::{ContentType, IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use runner::Runner;
pub use server::Server;
pub use server_request::ServerRequestFactory;
