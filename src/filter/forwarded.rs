//! `X-Forwarded-*` rewriting for requests that arrive through trusted proxies.
//!
//! Behind a reverse proxy the request URI describes the hop between proxy
//! and application, not what the client asked for. Proxies report the
//! client-facing host, scheme and port in forwarding headers; those headers
//! are only believed when the connection comes from a configured proxy.
//!
//! | Header | URI component |
//! |---|---|
//! | `X-Forwarded-Host` | host (a `:port` suffix is ignored) |
//! | `X-Forwarded-Proto` | scheme (`http` or `https`) |
//! | `X-Forwarded-Port` | port |
//!
//! Each component is overridden independently. Unparseable values leave
//! their component as it was.

use std::borrow::Cow;
use std::net::IpAddr;
use std::str::FromStr;

use http::Uri;
use http::uri::Authority;

use crate::config::ForwardedConfig;
use crate::error::Error;
use crate::request::Request;

use super::RequestFilter;
use super::network::ProxyNetwork;

/// A forwarding header the filter knows how to apply.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ForwardedHeader {
    Host,
    Proto,
    Port,
}

impl ForwardedHeader {
    pub const ALL: [Self; 3] = [Self::Host, Self::Proto, Self::Port];

    pub fn name(self) -> &'static str {
        match self {
            Self::Host  => "x-forwarded-host",
            Self::Proto => "x-forwarded-proto",
            Self::Port  => "x-forwarded-port",
        }
    }
}

/// Case-insensitive, e.g. `"X-Forwarded-Host"`.
impl FromStr for ForwardedHeader {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|h| h.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::Config(format!("`{s}` is not a recognised forwarding header")))
    }
}

#[derive(Clone, Debug)]
enum TrustedProxies {
    Any,
    Networks(Vec<ProxyNetwork>),
}

/// Rewrites the request URI from forwarding headers sent by trusted proxies.
///
/// Requests from untrusted peers, and requests that carry nothing to apply,
/// come back as [`Cow::Borrowed`], the very value that went in.
#[derive(Clone, Debug)]
pub struct XForwardedFilter {
    proxies: TrustedProxies,
    headers: Vec<ForwardedHeader>,
}

impl XForwardedFilter {
    /// Trusts no peer, and so no header.
    pub fn trust_none() -> Self {
        Self { proxies: TrustedProxies::Networks(Vec::new()), headers: Vec::new() }
    }

    /// Trusts every peer for `headers`.
    pub fn trust_any(headers: &[ForwardedHeader]) -> Self {
        Self { proxies: TrustedProxies::Any, headers: dedup(headers) }
    }

    /// Trusts peers inside any of `networks` for `headers`.
    pub fn trust_networks(networks: Vec<ProxyNetwork>, headers: &[ForwardedHeader]) -> Self {
        Self { proxies: TrustedProxies::Networks(networks), headers: dedup(headers) }
    }

    /// Builds the filter from configuration, rejecting malformed proxy
    /// entries and unknown header names.
    ///
    /// `"*"` anywhere in `trusted_proxies` trusts every peer. A missing
    /// `trusted_headers` list trusts all forwarding headers; an empty one
    /// trusts none.
    pub fn from_config(config: &ForwardedConfig) -> Result<Self, Error> {
        let headers = match &config.trusted_headers {
            None => ForwardedHeader::ALL.to_vec(),
            Some(names) => names
                .iter()
                .map(|n| n.parse())
                .collect::<Result<Vec<ForwardedHeader>, Error>>()?,
        };

        if config.trusted_proxies.is_empty() {
            return Ok(Self::trust_none());
        }
        if config.trusted_proxies.iter().any(|p| p.trim() == "*") {
            return Ok(Self::trust_any(&headers));
        }
        let networks = config
            .trusted_proxies
            .iter()
            .map(|p| p.parse())
            .collect::<Result<Vec<ProxyNetwork>, Error>>()?;
        Ok(Self::trust_networks(networks, &headers))
    }

    /// Whether forwarding headers from `addr` are believed.
    pub fn is_trusted(&self, addr: IpAddr) -> bool {
        match &self.proxies {
            TrustedProxies::Any => true,
            TrustedProxies::Networks(networks) => networks.iter().any(|n| n.contains(addr)),
        }
    }

    pub fn trusted_headers(&self) -> &[ForwardedHeader] {
        &self.headers
    }

    fn collect_overrides(&self, request: &Request) -> Overrides {
        let mut overrides = Overrides::default();
        for header in &self.headers {
            let Some(value) = request.header(header.name()).and_then(leftmost) else {
                continue;
            };
            match header {
                ForwardedHeader::Host => {
                    if let Some(host) = host_part(value) {
                        overrides.host = Some(host.to_owned());
                    }
                }
                ForwardedHeader::Proto => {
                    if let Some(scheme) = parse_scheme(value) {
                        overrides.scheme = Some(scheme);
                    }
                }
                ForwardedHeader::Port => {
                    if let Ok(port) = value.parse::<u16>() {
                        overrides.port = Some(port);
                    }
                }
            }
        }
        overrides
    }
}

impl RequestFilter for XForwardedFilter {
    fn filter<'a>(&self, request: &'a Request) -> Cow<'a, Request> {
        let Some(addr) = request.remote_addr() else {
            return Cow::Borrowed(request);
        };
        if self.headers.is_empty() || !self.is_trusted(addr) {
            return Cow::Borrowed(request);
        }

        let overrides = self.collect_overrides(request);
        if overrides.is_empty() {
            return Cow::Borrowed(request);
        }
        match overrides.apply(request.uri()) {
            Some(uri) => Cow::Owned(request.clone().with_uri(uri)),
            None => Cow::Borrowed(request),
        }
    }
}

#[derive(Debug, Default)]
struct Overrides {
    host: Option<String>,
    scheme: Option<&'static str>,
    port: Option<u16>,
}

impl Overrides {
    fn is_empty(&self) -> bool {
        self.host.is_none() && self.scheme.is_none() && self.port.is_none()
    }

    /// Rebuilds `uri` with the overridden components.
    ///
    /// The original port is kept as written, even when it is the scheme
    /// default. Only a forwarded port that differs from it is dropped when
    /// it equals the default.
    fn apply(&self, uri: &Uri) -> Option<Uri> {
        let scheme = self.scheme.or(uri.scheme_str()).unwrap_or("http");
        let host = self.host.as_deref().or(uri.host())?;
        let original = uri.port_u16();
        let authority = match self.port.or(original) {
            Some(port) if Some(port) == original => format!("{host}:{port}"),
            Some(port) if Some(port) != default_port(scheme) => format!("{host}:{port}"),
            _ => host.to_owned(),
        };
        let path = uri.path_and_query().map_or("/", |pq| pq.as_str());

        Uri::builder()
            .scheme(scheme)
            .authority(authority.as_str())
            .path_and_query(path)
            .build()
            .ok()
    }
}

fn dedup(headers: &[ForwardedHeader]) -> Vec<ForwardedHeader> {
    let mut out = Vec::with_capacity(headers.len());
    for h in headers {
        if !out.contains(h) {
            out.push(*h);
        }
    }
    out
}

/// Proxy chains append; the left-most entry is the client-facing one.
fn leftmost(value: &str) -> Option<&str> {
    value.split(',').next().map(str::trim).filter(|v| !v.is_empty())
}

fn host_part(value: &str) -> Option<&str> {
    let host = match value.strip_prefix('[') {
        Some(rest) => &value[..rest.find(']')? + 2],
        None => value.split_once(':').map_or(value, |(h, _)| h),
    };
    if host.is_empty() || host.contains('@') {
        return None;
    }
    host.parse::<Authority>().ok().map(|_| host)
}

fn parse_scheme(value: &str) -> Option<&'static str> {
    if value.eq_ignore_ascii_case("https") {
        Some("https")
    } else if value.eq_ignore_ascii_case("http") {
        Some("http")
    } else {
        None
    }
}

fn default_port(scheme: &str) -> Option<u16> {
    match scheme {
        "http" => Some(80),
        "https" => Some(443),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use http::Method;

    use super::*;

    const REMOTES: [&str; 4] = ["10.1.1.1", "192.168.1.1", "127.0.0.1", "4.4.4.4"];

    fn config(proxies: &[&str], headers: Option<&[&str]>) -> ForwardedConfig {
        ForwardedConfig {
            trusted_proxies: proxies.iter().map(|s| s.to_string()).collect(),
            trusted_headers: headers.map(|h| h.iter().map(|s| s.to_string()).collect()),
        }
    }

    fn forwarded_request(remote: &str) -> Request {
        let remote: IpAddr = remote.parse().unwrap();
        Request::new(Method::GET, Uri::from_static("http://localhost/foo/bar"))
            .with_header("host", "localhost")
            .with_header("x-forwarded-host", "api.example.com")
            .with_header("x-forwarded-proto", "https")
            .with_header("x-forwarded-port", "4443")
            .with_remote_addr(remote)
    }

    fn is_same(out: &Cow<'_, Request>, input: &Request) -> bool {
        matches!(out, Cow::Borrowed(r) if std::ptr::eq(*r, input))
    }

    #[test]
    fn default_config_trusts_nobody() {
        let filter = XForwardedFilter::from_config(&ForwardedConfig::default()).unwrap();

        for remote in REMOTES {
            let request = forwarded_request(remote);
            assert!(is_same(&filter.filter(&request), &request), "{remote}");
        }
    }

    #[test]
    fn wildcard_trusts_any_peer() {
        let filter = XForwardedFilter::from_config(&config(&["*"], None)).unwrap();

        for remote in REMOTES {
            let request = forwarded_request(remote);
            let out = filter.filter(&request);

            assert!(matches!(out, Cow::Owned(_)), "{remote}");
            let uri = out.uri();
            assert_eq!(uri.host(), Some("api.example.com"));
            assert_eq!(uri.port_u16(), Some(4443));
            assert_eq!(uri.scheme_str(), Some("https"));
        }
    }

    #[test]
    fn empty_proxy_list_trusts_nobody() {
        let filter =
            XForwardedFilter::from_config(&config(&[], Some(&["X-Forwarded-Host"]))).unwrap();

        for remote in REMOTES {
            let request = forwarded_request(remote);
            assert!(is_same(&filter.filter(&request), &request), "{remote}");
        }
    }

    #[test]
    fn trust_none_ignores_every_peer() {
        let filter = XForwardedFilter::trust_none();
        let defaults = XForwardedFilter::from_config(&ForwardedConfig::default()).unwrap();

        assert!(filter.trusted_headers().is_empty());
        assert!(defaults.trusted_headers().is_empty());
        for remote in REMOTES {
            let request = forwarded_request(remote);
            assert!(!filter.is_trusted(remote.parse().unwrap()), "{remote}");
            assert!(is_same(&filter.filter(&request), &request), "{remote}");
        }
    }

    #[test]
    fn forwarded_default_port_replaces_explicit_one() {
        let filter = XForwardedFilter::trust_any(&[ForwardedHeader::Proto, ForwardedHeader::Port]);
        let remote: IpAddr = "10.0.0.1".parse().unwrap();
        let request = Request::new(Method::GET, Uri::from_static("http://localhost:8080/x"))
            .with_header("x-forwarded-proto", "https")
            .with_header("x-forwarded-port", "443")
            .with_remote_addr(remote);

        assert_eq!(filter.filter(&request).uri().to_string(), "https://localhost/x");
    }

    #[test]
    fn missing_header_list_trusts_all_headers() {
        let filter = XForwardedFilter::from_config(&config(&["0.0.0.0/0"], None)).unwrap();

        for remote in REMOTES {
            let request = forwarded_request(remote);
            let out = filter.filter(&request);

            assert_eq!(out.uri().to_string(), "https://api.example.com:4443/foo/bar", "{remote}");
        }
    }

    #[test]
    fn empty_header_list_trusts_nothing() {
        let filter = XForwardedFilter::from_config(&config(&["0.0.0.0/0"], Some(&[]))).unwrap();

        for remote in REMOTES {
            let request = forwarded_request(remote);
            assert!(is_same(&filter.filter(&request), &request), "{remote}");
        }
    }

    #[test]
    fn combined_proxies_and_headers() {
        let cases: [(&str, &[&str], &[&str], &str, Option<&str>); 4] = [
            (
                "single-proxy-single-header",
                &["192.168.1.1"],
                &["X-Forwarded-Host"],
                "192.168.1.1",
                Some("http://api.example.com/foo/bar"),
            ),
            (
                "single-proxy-multi-header",
                &["192.168.1.1"],
                &["X-Forwarded-Host", "X-Forwarded-Proto"],
                "192.168.1.1",
                Some("https://api.example.com/foo/bar"),
            ),
            (
                "unmatched-proxy-single-header",
                &["192.168.1.1"],
                &["X-Forwarded-Host"],
                "192.168.2.1",
                None,
            ),
            (
                "matches-proxy-from-list-single-header",
                &["192.168.1.0/24", "192.168.2.0/24"],
                &["X-Forwarded-Host"],
                "192.168.2.1",
                Some("http://api.example.com/foo/bar"),
            ),
        ];

        for (name, proxies, headers, remote, expected) in cases {
            let filter = XForwardedFilter::from_config(&config(proxies, Some(headers))).unwrap();
            let request = forwarded_request(remote);
            let out = filter.filter(&request);

            match expected {
                None => assert!(is_same(&out, &request), "{name}"),
                Some(uri) => {
                    assert!(matches!(out, Cow::Owned(_)), "{name}");
                    assert_eq!(out.uri().to_string(), uri, "{name}");
                }
            }
        }
    }

    #[test]
    fn original_request_is_not_modified() {
        let filter = XForwardedFilter::trust_any(&ForwardedHeader::ALL);
        let request = forwarded_request("10.0.0.1");

        let out = filter.filter(&request).into_owned();

        assert_eq!(request.uri().to_string(), "http://localhost/foo/bar");
        assert_eq!(out.uri().host(), Some("api.example.com"));
    }

    #[test]
    fn missing_remote_addr_is_untrusted() {
        let filter = XForwardedFilter::trust_any(&ForwardedHeader::ALL);
        let request = forwarded_request("10.0.0.1").with_remote_addr(None);

        assert!(is_same(&filter.filter(&request), &request));
    }

    #[test]
    fn restating_current_values_round_trips() {
        let filter = XForwardedFilter::trust_any(&ForwardedHeader::ALL);
        let remote: IpAddr = "10.0.0.1".parse().unwrap();

        for (uri, host, proto, port) in [
            ("http://localhost/foo?x=1", "localhost", "http", "80"),
            ("http://localhost:80/foo", "localhost", "http", "80"),
            ("https://example.com:443/a", "example.com", "https", "443"),
            ("https://example.com:8443/a", "example.com", "https", "8443"),
        ] {
            let request = Request::new(Method::GET, uri.parse().unwrap())
                .with_header("x-forwarded-host", host)
                .with_header("x-forwarded-proto", proto)
                .with_header("x-forwarded-port", port)
                .with_remote_addr(remote);

            assert_eq!(filter.filter(&request).uri().to_string(), uri);
        }
    }

    #[test]
    fn malformed_port_keeps_original_port() {
        let filter = XForwardedFilter::trust_any(&[ForwardedHeader::Host, ForwardedHeader::Port]);
        let remote: IpAddr = "10.0.0.1".parse().unwrap();
        let request = Request::new(Method::GET, Uri::from_static("http://localhost:8080/x"))
            .with_header("x-forwarded-host", "api.example.com")
            .with_header("x-forwarded-port", "not-a-port")
            .with_remote_addr(remote);

        assert_eq!(filter.filter(&request).uri().to_string(), "http://api.example.com:8080/x");
    }

    #[test]
    fn only_malformed_values_leave_request_untouched() {
        let filter = XForwardedFilter::trust_any(&ForwardedHeader::ALL);
        let remote: IpAddr = "10.0.0.1".parse().unwrap();
        let request = Request::new(Method::GET, Uri::from_static("http://localhost/x"))
            .with_header("x-forwarded-port", "99999")
            .with_header("x-forwarded-proto", "gopher")
            .with_remote_addr(remote);

        assert!(is_same(&filter.filter(&request), &request));
    }

    #[test]
    fn forwarded_host_port_suffix_and_chains() {
        let filter = XForwardedFilter::trust_any(&[ForwardedHeader::Host]);
        let remote: IpAddr = "10.0.0.1".parse().unwrap();
        let request = Request::new(Method::GET, Uri::from_static("http://localhost/x"))
            .with_header("x-forwarded-host", "api.example.com:9000, inner.local")
            .with_remote_addr(remote);

        assert_eq!(filter.filter(&request).uri().to_string(), "http://api.example.com/x");
    }

    #[test]
    fn header_names_parse_case_insensitively() {
        assert_eq!("X-FORWARDED-PROTO".parse::<ForwardedHeader>().unwrap(), ForwardedHeader::Proto);
        assert!("X-Forwarded-For".parse::<ForwardedHeader>().is_err());
    }
}
