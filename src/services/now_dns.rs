use crate::http::HttpClient;
use crate::ip::ExternalIp;
use crate::report::Reporter;

use super::{shared_dyndns, DdnsService};

/// The `name` selecting this provider in the config file.
pub const NAME: &str = "now-dns";

pub type Config = shared_dyndns::Config;

pub struct Service {
    inner: shared_dyndns::Service,
}

impl From<Config> for Service {
    fn from(config: Config) -> Self {
        Self {
            inner: shared_dyndns::Service::from_config(
                "Now-DNS",
                "https://now-dns.com/update",
                config,
            ),
        }
    }
}

impl DdnsService for Service {
    fn update(&self, client: &dyn HttpClient, ip: &ExternalIp, log: &dyn Reporter) -> u32 {
        self.inner.update(client, ip, log)
    }
}
