//! Application configuration.
//!
//! ```text
//! waypost.toml
//!     → AppConfig::from_toml / load_config (serde + toml)
//!     → AppConfig::validate (builds the typed components once)
//!     → Application::from_config
//! ```
//!
//! Every section is optional. A missing `[forwarded]` section trusts no
//! proxy at all.
//!
//! ```toml
//! [server]
//! bind_address = "0.0.0.0:3000"
//!
//! [forwarded]
//! trusted_proxies = ["10.0.0.0/8", "192.168.1.1"]
//! trusted_headers = ["X-Forwarded-Host", "X-Forwarded-Proto"]
//!
//! [not_found]
//! template = "error::404"
//! layout = "layout::default"
//!
//! [error_reporting.json_exceptions]
//! display = true
//! show_trace = false
//! ajax_only = true
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::error::Error;
use crate::filter::XForwardedFilter;
use crate::not_found::{LAYOUT_DEFAULT, TEMPLATE_DEFAULT};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config: {0}")]
    Io(#[from] std::io::Error),

    #[error("parsing config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(#[from] Error),
}

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub forwarded: ForwardedConfig,
    pub not_found: NotFoundConfig,
    pub error_reporting: ErrorReportingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g. `"0.0.0.0:3000"`).
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_address: "0.0.0.0:3000".to_owned() }
    }
}

/// Which peers may rewrite the request URI through `X-Forwarded-*` headers.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ForwardedConfig {
    /// IP addresses, CIDR networks, or `"*"` for any peer. Empty trusts none.
    pub trusted_proxies: Vec<String>,

    /// Header names honoured from trusted proxies. `None` (key absent)
    /// honours all of `X-Forwarded-Host`, `-Proto` and `-Port`; an empty
    /// list honours none.
    pub trusted_headers: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotFoundConfig {
    pub template: String,
    pub layout: String,
}

impl Default for NotFoundConfig {
    fn default() -> Self {
        Self {
            template: TEMPLATE_DEFAULT.to_owned(),
            layout: LAYOUT_DEFAULT.to_owned(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ErrorReportingConfig {
    pub json_exceptions: JsonExceptionsConfig,
}

/// Controls JSON error bodies for failed requests.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct JsonExceptionsConfig {
    /// Emit JSON error bodies at all.
    pub display: bool,
    /// Include the error's source chain as `trace`.
    pub show_trace: bool,
    /// Only answer in JSON when the request says it is an XHR.
    pub ajax_only: bool,
}

impl AppConfig {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Semantic checks serde cannot express: proxy entries must parse and
    /// forwarded header names must be recognised.
    pub fn validate(&self) -> Result<(), ConfigError> {
        XForwardedFilter::from_config(&self.forwarded)?;
        Ok(())
    }
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    AppConfig::from_toml(&content)
}
