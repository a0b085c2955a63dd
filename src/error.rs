//! Unified error type.

use thiserror::Error;

/// The error type returned by waypost's fallible operations.
///
/// Application-level outcomes (404, 500, etc.) are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s. This type surfaces
/// wiring mistakes, template failures and transport I/O.
#[derive(Debug, Error)]
pub enum Error {
    /// A caller passed a value the operation cannot accept. Nothing was
    /// mutated.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration rejected while building a component at startup.
    #[error("configuration: {0}")]
    Config(String),

    /// A template renderer could not produce output.
    #[error("template `{template}` failed to render: {message}")]
    Render { template: String, message: String },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
