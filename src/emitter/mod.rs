//! Response emitters.
//!
//! An [`Emitter`] sends one finished [`Response`] to a transport. Emitters
//! that cannot handle a particular response say so with
//! [`Emission::Declined`] instead of failing, which lets an
//! [`EmitterStack`] try the next one:
//!
//! ```text
//! EmitterStack [ ContentRangeEmitter, WireEmitter ]
//!        │
//!        ├─ ContentRangeEmitter: no Content-Range header → Declined
//!        └─ WireEmitter: writes the full message       → Handled (stop)
//! ```
//!
//! Transport failures are errors, not declines.

mod range;
mod stack;
mod wire;

use std::io;
use std::sync::{Mutex, MutexGuard};

use crate::error::Error;
use crate::response::Response;

pub use range::ContentRangeEmitter;
pub use stack::EmitterStack;
pub use wire::WireEmitter;

/// Outcome of a single emit attempt.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Emission {
    /// The response was written; nothing else should try.
    Handled,
    /// This emitter cannot send the response; nothing was written.
    Declined,
}

/// Sends a response to a transport.
pub trait Emitter: Send + Sync {
    fn emit(&self, response: &Response) -> Result<Emission, Error>;
}

impl<E: Emitter + ?Sized> Emitter for Box<E> {
    fn emit(&self, response: &Response) -> Result<Emission, Error> {
        (**self).emit(response)
    }
}

fn lock<W>(out: &Mutex<W>) -> Result<MutexGuard<'_, W>, Error> {
    out.lock()
        .map_err(|_| Error::Io(io::Error::other("emitter transport lock poisoned")))
}
