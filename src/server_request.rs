//! Builds [`Request`] values from what the transport hands over.

use std::borrow::Cow;
use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::header::HOST;
use http::request::Parts;
use http::Uri;

use crate::error::Error;
use crate::filter::{NoFilter, RequestFilter};
use crate::request::Request;

/// Turns transport-level request parts into a [`Request`] and runs the
/// configured [`RequestFilter`] over it.
///
/// The resulting URI is always absolute. Origin-form targets (`/path`) take
/// their authority from the `Host` header, falling back to `localhost`, and
/// scheme `http`; a trusted-proxy filter may then correct both.
#[derive(Clone)]
pub struct ServerRequestFactory {
    filter: Arc<dyn RequestFilter>,
}

impl ServerRequestFactory {
    pub fn new(filter: impl RequestFilter + 'static) -> Self {
        Self { filter: Arc::new(filter) }
    }

    pub fn from_parts(
        &self,
        parts: Parts,
        body: Bytes,
        remote_addr: Option<IpAddr>,
    ) -> Result<Request, Error> {
        let uri = absolute_uri(&parts)?;
        let request = Request::from_parts(parts.method, uri, parts.headers, body)
            .with_remote_addr(remote_addr);

        // A borrowed result is `request` itself; only a rewrite replaces it.
        if let Cow::Owned(rewritten) = self.filter.filter(&request) {
            return Ok(rewritten);
        }
        Ok(request)
    }
}

impl Default for ServerRequestFactory {
    fn default() -> Self {
        Self::new(NoFilter)
    }
}

impl fmt::Debug for ServerRequestFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerRequestFactory").finish_non_exhaustive()
    }
}

fn absolute_uri(parts: &Parts) -> Result<Uri, Error> {
    if parts.uri.scheme().is_some() && parts.uri.authority().is_some() {
        return Ok(parts.uri.clone());
    }
    let authority = parts
        .uri
        .authority()
        .map(|a| a.as_str())
        .or_else(|| parts.headers.get(HOST).and_then(|h| h.to_str().ok()))
        .filter(|a| !a.is_empty())
        .unwrap_or("localhost");
    let path = parts.uri.path_and_query().map_or("/", |pq| pq.as_str());

    Uri::builder()
        .scheme("http")
        .authority(authority)
        .path_and_query(path)
        .build()
        .map_err(|e| Error::InvalidArgument(format!("cannot build request URI: {e}")))
}

#[cfg(test)]
mod tests {
    use http::Method;

    use super::*;
    use crate::filter::{ForwardedHeader, XForwardedFilter};

    fn parts(uri: &str, headers: &[(&str, &str)]) -> Parts {
        let mut builder = http::Request::builder().method(Method::GET).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn origin_form_uses_host_header() {
        let factory = ServerRequestFactory::default();

        let parts = parts("/foo?bar=1", &[("host", "example.com:8080")]);

        let request = factory.from_parts(parts, Bytes::new(), Some(ip("10.0.0.1"))).unwrap();

        assert_eq!(request.uri().to_string(), "http://example.com:8080/foo?bar=1");
        assert_eq!(request.remote_addr(), Some(ip("10.0.0.1")));
    }

    #[test]
    fn missing_host_falls_back_to_localhost() {
        let factory = ServerRequestFactory::default();

        let request = factory.from_parts(parts("/", &[]), Bytes::new(), None).unwrap();

        assert_eq!(request.uri().to_string(), "http://localhost/");
    }

    #[test]
    fn absolute_form_is_kept() {
        let factory = ServerRequestFactory::default();

        let parts = parts("https://api.example.com/x", &[("host", "other")]);

        let request = factory.from_parts(parts, Bytes::new(), None).unwrap();

        assert_eq!(request.uri().to_string(), "https://api.example.com/x");
    }

    #[test]
    fn applies_filter() {
        let factory = ServerRequestFactory::new(XForwardedFilter::trust_any(&ForwardedHeader::ALL));

        let request = factory
            .from_parts(
                parts("/foo", &[("host", "localhost"), ("x-forwarded-proto", "https")]),
                Bytes::from_static(b"payload"),
                Some(ip("192.168.1.1")),
            )
            .unwrap();

        assert_eq!(request.uri().to_string(), "https://localhost/foo");
        assert_eq!(request.body(), b"payload");
    }

    #[test]
    fn bad_host_header_is_rejected() {
        let factory = ServerRequestFactory::default();

        let err = factory
            .from_parts(parts("/", &[("host", "a b")]), Bytes::new(), None)
            .unwrap_err();

        assert!(matches!(err, Error::InvalidArgument(_)));
    }
}
