use std::collections::VecDeque;

use crate::error::Error;
use crate::response::Response;

use super::{Emission, Emitter};

/// An ordered list of emitters that is itself an [`Emitter`].
///
/// `emit` walks the emitters front to back and stops at the first one that
/// returns [`Emission::Handled`]. When every emitter declines (or there are
/// none) the stack declines too, and the caller picks a fallback.
///
/// The stack is built during wiring; mutation takes `&mut self`, so sharing
/// it across request tasks requires no further locking.
#[derive(Default)]
pub struct EmitterStack {
    emitters: VecDeque<Box<dyn Emitter>>,
}

impl EmitterStack {
    pub fn new() -> Self {
        Self { emitters: VecDeque::new() }
    }

    /// Appends an emitter; it is tried after every emitter already present.
    pub fn push(&mut self, emitter: impl Emitter + 'static) {
        self.emitters.push_back(Box::new(emitter));
    }

    /// Inserts an emitter at the front; it is tried first.
    pub fn unshift(&mut self, emitter: impl Emitter + 'static) {
        self.emitters.push_front(Box::new(emitter));
    }

    /// Replaces the emitter at `index`.
    ///
    /// Fails with [`Error::InvalidArgument`] when `index` does not name an
    /// existing slot; the stack is unchanged in that case.
    pub fn set(&mut self, index: usize, emitter: impl Emitter + 'static) -> Result<(), Error> {
        let len = self.emitters.len();
        let slot = self.emitters.get_mut(index).ok_or_else(|| {
            Error::InvalidArgument(format!(
                "EmitterStack has no emitter at index {index} (len {len})"
            ))
        })?;
        *slot = Box::new(emitter);
        Ok(())
    }

    pub fn len(&self) -> usize { self.emitters.len() }
    pub fn is_empty(&self) -> bool { self.emitters.is_empty() }
}

impl Emitter for EmitterStack {
    fn emit(&self, response: &Response) -> Result<Emission, Error> {
        for emitter in &self.emitters {
            if emitter.emit(response)? == Emission::Handled {
                return Ok(Emission::Handled);
            }
        }
        Ok(Emission::Declined)
    }
}
