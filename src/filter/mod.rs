//! Request filters applied once per request, before the pipeline runs.

mod forwarded;
mod network;

use std::borrow::Cow;

use crate::request::Request;

pub use forwarded::{ForwardedHeader, XForwardedFilter};
pub use network::ProxyNetwork;

/// Rewrites a request before dispatch, copy-on-write.
///
/// Returning [`Cow::Borrowed`] means "no rewrite"; callers may rely on it to
/// skip work.
pub trait RequestFilter: Send + Sync {
    fn filter<'a>(&self, request: &'a Request) -> Cow<'a, Request>;
}

/// Passes every request through untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoFilter;

impl RequestFilter for NoFilter {
    fn filter<'a>(&self, request: &'a Request) -> Cow<'a, Request> {
        Cow::Borrowed(request)
    }
}
