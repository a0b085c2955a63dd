//! Proxy address matching.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use crate::error::Error;

/// An IP network in CIDR form. A bare address is a single-host network.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ProxyNetwork {
    network: IpAddr,
    prefix: u8,
}

impl ProxyNetwork {
    /// Builds a network, masking off host bits of `addr`.
    pub fn new(addr: IpAddr, prefix: u8) -> Result<Self, Error> {
        let max = max_prefix(addr);
        if prefix > max {
            return Err(Error::Config(format!(
                "prefix /{prefix} is longer than {max} bits for {addr}"
            )));
        }
        Ok(Self { network: mask(addr, prefix), prefix })
    }

    pub fn prefix(&self) -> u8 { self.prefix }

    /// Whether `addr` lies inside this network. IPv4-mapped IPv6 addresses
    /// are matched as IPv4.
    pub fn contains(&self, addr: IpAddr) -> bool {
        let addr = addr.to_canonical();
        match (self.network, addr) {
            (IpAddr::V4(_), IpAddr::V4(_)) | (IpAddr::V6(_), IpAddr::V6(_)) => {
                mask(addr, self.prefix) == self.network
            }
            _ => false,
        }
    }
}

impl FromStr for ProxyNetwork {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (addr, prefix) = match s.split_once('/') {
            Some((addr, prefix)) => (addr, Some(prefix)),
            None => (s, None),
        };
        let addr: IpAddr = addr
            .parse()
            .map_err(|_| Error::Config(format!("`{s}` is not an IP address or CIDR network")))?;
        let addr = addr.to_canonical();
        let prefix = match prefix {
            Some(p) => p
                .parse::<u8>()
                .map_err(|_| Error::Config(format!("`{s}` has an invalid prefix length")))?,
            None => max_prefix(addr),
        };
        Self::new(addr, prefix)
    }
}

impl fmt::Display for ProxyNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix)
    }
}

fn max_prefix(addr: IpAddr) -> u8 {
    match addr {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    }
}

fn mask(addr: IpAddr, prefix: u8) -> IpAddr {
    match addr {
        IpAddr::V4(v4) => {
            let bits = u32::from(v4);
            let mask = u32::MAX.checked_shl(32 - u32::from(prefix)).unwrap_or(0);
            IpAddr::V4((bits & mask).into())
        }
        IpAddr::V6(v6) => {
            let bits = u128::from(v6);
            let mask = u128::MAX.checked_shl(128 - u32::from(prefix)).unwrap_or(0);
            IpAddr::V6((bits & mask).into())
        }
    }
}
