mod http;

use std::fmt;
use std::net::Ipv4Addr;

use thiserror::Error;

use crate::config::General;
use crate::http::HttpClient;

/// The public address of this host as seen from the outside, computed once
/// per run. `Unknown` stands in when the lookup failed; it never equals any
/// stored address, so every record looks stale.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExternalIp {
    Known(Ipv4Addr),
    Unknown,
}

#[derive(Debug, Error, Clone)]
pub enum IpLookupError {
    #[error("unable to obtain the external IP using HTTP: {0}")]
    HttpFailure(Box<str>),

    #[error("the IP lookup service returned {0:?}, which is not an IPv4 address")]
    NotAnAddress(Box<str>),
}

impl ExternalIp {
    pub fn address(&self) -> Option<Ipv4Addr> {
        match self {
            ExternalIp::Known(addr) => Some(*addr),
            ExternalIp::Unknown => None,
        }
    }

    pub fn matches(&self, stored: Option<&str>) -> bool {
        match (self, stored) {
            (ExternalIp::Known(addr), Some(stored)) => addr.to_string() == stored,
            _ => false,
        }
    }
}

impl fmt::Display for ExternalIp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExternalIp::Known(addr) => write!(f, "{}", addr),
            ExternalIp::Unknown => write!(f, "unknown"),
        }
    }
}

pub fn resolve_external_ip(
    client: &dyn HttpClient,
    general: &General,
) -> Result<Ipv4Addr, IpLookupError> {
    let text = http::get_address_text(client, &general.ip_url, &general.ip_regex)
        .map_err(|e| IpLookupError::HttpFailure(e.into()))?;

    text.parse::<Ipv4Addr>()
        .map_err(|_| IpLookupError::NotAnAddress(text.into()))
}
