use std::io::Write;
use std::sync::{Arc, Mutex};

use http::header::{HeaderName, HeaderValue};
use http::StatusCode;

use crate::error::Error;
use crate::response::Response;

use super::{Emission, Emitter, lock};

/// Writes the whole response as an HTTP/1.1 message.
///
/// Always handles the response, which makes it the usual last entry of an
/// [`EmitterStack`](super::EmitterStack). The transport is shared so that
/// several emitters can write to the same sink.
pub struct WireEmitter<W> {
    out: Arc<Mutex<W>>,
}

impl<W: Write + Send> WireEmitter<W> {
    pub fn new(out: Arc<Mutex<W>>) -> Self {
        Self { out }
    }
}

impl<W: Write + Send> Emitter for WireEmitter<W> {
    fn emit(&self, response: &Response) -> Result<Emission, Error> {
        let mut out = lock(&self.out)?;
        write_head(&mut *out, response.status_code(), response.headers(), response.body().len())?;
        out.write_all(response.body())?;
        out.flush()?;
        Ok(Emission::Handled)
    }
}

/// Status line, `content-length`, then the response headers.
///
/// A `content-length` carried by the response is replaced by the length of
/// what is actually written. Every header is checked before the first byte
/// goes out, so a name or value that would break message framing (a CR or LF
/// in a value, for one) fails with [`Error::InvalidArgument`] and leaves the
/// transport untouched.
pub(super) fn write_head<W: Write + ?Sized>(
    writer: &mut W,
    status: StatusCode,
    headers: &[(String, String)],
    content_length: usize,
) -> Result<(), Error> {
    for (name, value) in headers {
        check_header(name, value)?;
    }

    write!(
        writer,
        "HTTP/1.1 {} {}\r\n",
        status.as_u16(),
        status.canonical_reason().unwrap_or(""),
    )?;
    write!(writer, "content-length: {content_length}\r\n")?;
    for (name, value) in headers {
        if name.eq_ignore_ascii_case("content-length") {
            continue;
        }
        write!(writer, "{name}: {value}\r\n")?;
    }
    writer.write_all(b"\r\n")?;
    Ok(())
}

fn check_header(name: &str, value: &str) -> Result<(), Error> {
    HeaderName::try_from(name).map_err(|e| {
        Error::InvalidArgument(format!("header name `{}`: {e}", name.escape_debug()))
    })?;
    HeaderValue::try_from(value)
        .map_err(|e| Error::InvalidArgument(format!("value of `{name}`: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_full_message() {
        let out = Arc::new(Mutex::new(Vec::new()));
        let emitter = WireEmitter::new(out.clone());

        let outcome = emitter.emit(&Response::text("hello")).unwrap();

        assert_eq!(outcome, Emission::Handled);
        let written = String::from_utf8(out.lock().unwrap().clone()).unwrap();
        assert_eq!(
            written,
            "HTTP/1.1 200 OK\r\n\
             content-length: 5\r\n\
             content-type: text/plain; charset=utf-8\r\n\
             \r\n\
             hello"
        );
    }

    #[test]
    fn stale_content_length_is_replaced() {
        let out = Arc::new(Mutex::new(Vec::new()));
        let emitter = WireEmitter::new(out.clone());
        let response = Response::builder()
            .status(StatusCode::NOT_FOUND)
            .header("content-length", "999")
            .text("gone");

        emitter.emit(&response).unwrap();

        let written = String::from_utf8(out.lock().unwrap().clone()).unwrap();
        assert!(written.starts_with("HTTP/1.1 404 Not Found\r\ncontent-length: 4\r\n"));
        assert!(!written.contains("999"));
    }

    #[test]
    fn header_with_line_break_is_rejected_before_writing() {
        let out = Arc::new(Mutex::new(Vec::new()));
        let emitter = WireEmitter::new(out.clone());
        let response = Response::builder()
            .status(StatusCode::FOUND)
            .header("location", "/next\r\nset-cookie: session=evil")
            .text("ok");

        let err = emitter.emit(&response).unwrap_err();

        assert!(matches!(err, Error::InvalidArgument(_)), "{err}");
        assert!(out.lock().unwrap().is_empty());
    }

    #[test]
    fn invalid_header_name_is_rejected() {
        let out = Arc::new(Mutex::new(Vec::new()));
        let emitter = WireEmitter::new(out.clone());
        let response = Response::builder().header("bad name", "x").no_body();

        assert!(matches!(emitter.emit(&response), Err(Error::InvalidArgument(_))));
        assert!(out.lock().unwrap().is_empty());
    }
}
