use std::io::Write;
use std::sync::{Arc, Mutex};

use crate::error::Error;
use crate::response::Response;

use super::wire::write_head;
use super::{Emission, Emitter, lock};

/// Writes only the byte range named by the response's `Content-Range`
/// header, treating the body as the complete representation.
///
/// Declines responses without a usable `bytes` range so that a
/// [`WireEmitter`](super::WireEmitter) further down the stack sends them whole.
pub struct ContentRangeEmitter<W> {
    out: Arc<Mutex<W>>,
}

impl<W: Write + Send> ContentRangeEmitter<W> {
    pub fn new(out: Arc<Mutex<W>>) -> Self {
        Self { out }
    }
}

impl<W: Write + Send> Emitter for ContentRangeEmitter<W> {
    fn emit(&self, response: &Response) -> Result<Emission, Error> {
        let Some((first, last)) = response.header("content-range").and_then(parse_content_range)
        else {
            return Ok(Emission::Declined);
        };
        let body = response.body();
        if first > last || first >= body.len() {
            return Ok(Emission::Declined);
        }
        let slice = &body[first..=last.min(body.len() - 1)];

        let mut out = lock(&self.out)?;
        write_head(&mut *out, response.status_code(), response.headers(), slice.len())?;
        out.write_all(slice)?;
        out.flush()?;
        Ok(Emission::Handled)
    }
}

/// Parses `bytes <first>-<last>/<size|*>` into inclusive offsets.
fn parse_content_range(value: &str) -> Option<(usize, usize)> {
    let (unit, rest) = value.trim().split_once(' ')?;
    if !unit.eq_ignore_ascii_case("bytes") {
        return None;
    }
    let (range, _size) = rest.trim().split_once('/')?;
    let (first, last) = range.split_once('-')?;
    Some((first.trim().parse().ok()?, last.trim().parse().ok()?))
}
