use std::fmt;
use std::net::Ipv4Addr;
use std::time::Duration;

use serde_derive::{Deserialize, Serialize};

use crate::http::{Error, HttpClient, Request, Response};
use crate::ip::ExternalIp;
use crate::report::Reporter;

use super::{DdnsService, DdnsUpdateError};

/// The `name` selecting this provider in the config file.
pub const NAME: &str = "dynu";

const DNS_URL: &str = "https://api.dynu.com/v2/dns";

/// Sent as the `Location` of every record we touch.
const LOCATION: &str = "update-ip";

const TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub(crate) api_key: Box<str>,
}

/// Dynu hands out numeric ids, but nothing here depends on that.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(untagged)]
pub enum RecordId {
    Number(u64),
    Text(Box<str>),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{}", n),
            RecordId::Text(t) => write!(f, "{}", t),
        }
    }
}

/// One domain owned by the API key. Only lives for a single update pass.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct DomainRecord {
    pub id: RecordId,

    pub name: Box<str>,

    /// `None` when the domain has no IPv4 address at all.
    #[serde(rename = "ipv4Address", default)]
    pub ipv4_address: Option<Box<str>>,
}

#[derive(Deserialize)]
struct DomainList {
    domains: Vec<DomainRecord>,
}

#[derive(Serialize)]
struct UpdateRequest<'a> {
    #[serde(rename = "Name")]
    name: &'a str,

    #[serde(rename = "Location")]
    location: &'a str,

    /// An unknown address goes out as `null`.
    #[serde(rename = "ipv4Address")]
    ipv4_address: Option<Ipv4Addr>,
}

pub struct Service {
    config: Config,
}

impl From<Config> for Service {
    fn from(config: Config) -> Self {
        Self { config }
    }
}

impl Service {
    fn rejected(response: Response) -> DdnsUpdateError {
        let status = response.status();
        let body = response.into_string().unwrap_or_default();
        DdnsUpdateError::Status("Dynu", status, body.trim().into())
    }

    /// See: https://www.dynu.com/Support/API#/dns/dnsGet
    pub fn list_domains(&self, client: &dyn HttpClient) -> Result<Vec<DomainRecord>, DdnsUpdateError> {
        let request = Request::get(DNS_URL)
            .set("Accept", "application/json")
            .set("API-Key", &self.config.api_key)
            .timeouts(TIMEOUT, TIMEOUT);

        match client.send(request) {
            Ok(resp) if resp.status() == 200 => resp
                .into_json::<DomainList>()
                .map(|list| list.domains)
                .map_err(|e| DdnsUpdateError::Json(e.to_string().into())),
            Ok(resp) | Err(Error::Status(_, resp)) => Err(Self::rejected(resp)),
            Err(Error::Transport(t)) => Err(DdnsUpdateError::TransportError(t)),
        }
    }

    /// See: https://www.dynu.com/Support/API#/dns/dnsIdPost
    pub fn update_record(
        &self,
        client: &dyn HttpClient,
        record: &DomainRecord,
        ip: &ExternalIp,
    ) -> Result<(), DdnsUpdateError> {
        let url = format!("{}/{}", DNS_URL, record.id);

        let request = Request::post(&url)
            .set("Accept", "application/json")
            .set("API-Key", &self.config.api_key)
            .timeouts(TIMEOUT, TIMEOUT)
            .json(&UpdateRequest {
                name: &record.name,
                location: LOCATION,
                ipv4_address: ip.address(),
            });

        match client.send(request) {
            Ok(resp) if resp.status() == 200 => Ok(()),
            Ok(resp) | Err(Error::Status(_, resp)) => Err(Self::rejected(resp)),
            Err(Error::Transport(t)) => Err(DdnsUpdateError::TransportError(t)),
        }
    }
}

impl DdnsService for Service {
    fn update(&self, client: &dyn HttpClient, ip: &ExternalIp, log: &dyn Reporter) -> u32 {
        // A listing that fails leaves nothing to reconcile, and is not counted.
        let records = match self.list_domains(client) {
            Ok(records) => records,
            Err(e) => {
                log.error(&format!("Service: Dynu: unable to list domains: {}", e));
                Vec::new()
            }
        };

        if records.is_empty() {
            log.info("Service: Dynu: no domains to update");
        }

        let mut failures = 0;

        for record in &records {
            let current = record.ipv4_address.as_deref().unwrap_or("none");

            if ip.matches(record.ipv4_address.as_deref()) {
                log.info(&format!(
                    "Service: Dynu; domain: {}: IP {} is still the same",
                    record.name, current
                ));
                continue;
            }

            match self.update_record(client, record, ip) {
                Ok(()) => log.info(&format!(
                    "Service: Dynu; domain: {}: updated from {} to {}",
                    record.name, current, ip
                )),
                Err(e) => {
                    log.error(&format!(
                        "Service: Dynu; domain: {}: update failed: {}",
                        record.name, e
                    ));
                    failures += 1;
                }
            }
        }

        failures
    }
}
