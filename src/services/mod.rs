pub mod dynu;
pub mod now_dns;
pub mod shared_dyndns;

use thiserror::Error;

use crate::http::HttpClient;
use crate::ip::ExternalIp;
use crate::report::Reporter;

#[derive(Clone, Error, Debug)]
pub enum DdnsUpdateError {
    // used when the provider answered, but not with success
    #[error("{0} returned HTTP {1}: {2}")]
    Status(&'static str, u16, Box<str>),

    // used when a service says it succeeded, but the returned JSON is nonsense
    #[error("received erroneous JSON: {0}")]
    Json(Box<str>),

    #[error("unable to read the response body: {0}")]
    Body(Box<str>),

    #[error("HTTP transport error: {0}")]
    TransportError(Box<str>),
}

pub trait DdnsService {
    /// Push the current address to every record this service is responsible
    /// for. Nothing is propagated: each failure is reported through `log`
    /// and folded into the returned contribution to the run total, 0 meaning
    /// everything went fine.
    fn update(&self, client: &dyn HttpClient, ip: &ExternalIp, log: &dyn Reporter) -> u32;
}
