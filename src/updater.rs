use crate::config::{Config, ServiceConfig};
use crate::http::HttpClient;
use crate::ip::{self, ExternalIp};
use crate::report::Reporter;
use crate::services::{dynu, now_dns, DdnsService};

/// The run total when the config has no `services` section.
const MISSING_SERVICES: u32 = 1;

/// What an incomplete `[[services]]` entry adds to the run total. The entry
/// is already reported as an error when it is skipped, and it has always
/// counted as 0.
pub fn invalid_entry_contribution(_service: &ServiceConfig) -> u32 {
    0
}

/// Operating systems only keep the low byte of an exit status, so a total of
/// 256 would otherwise read as success.
pub fn exit_code(total: u32) -> i32 {
    total.min(255) as i32
}

/// Go through every configured service once, in order, and return the sum
/// of their contributions. 0 means every update went through.
pub fn run(config: &Config, client: &dyn HttpClient, log: &dyn Reporter) -> u32 {
    let Some(services) = &config.services else {
        log.error("the config file has no section \"services\"");
        return MISSING_SERVICES;
    };

    // Only the API-key providers need to be told the address.
    let needs_ip = services
        .iter()
        .any(|service| matches!(service, ServiceConfig::Dynu(_)));

    let ip = if needs_ip {
        match ip::resolve_external_ip(client, &config.general) {
            Ok(addr) => {
                log.info(&format!("external IP is {}", addr));
                ExternalIp::Known(addr)
            }
            Err(e) => {
                log.error(&format!("{}; updating every record regardless", e));
                ExternalIp::Unknown
            }
        }
    } else {
        ExternalIp::Unknown
    };

    let mut total: u32 = 0;

    for (index, service) in services.iter().enumerate() {
        let contribution = match service {
            ServiceConfig::NowDns(conf) => {
                now_dns::Service::from(conf.clone()).update(client, &ip, log)
            }

            ServiceConfig::Dynu(conf) => {
                dynu::Service::from(conf.clone()).update(client, &ip, log)
            }

            ServiceConfig::Unnamed => {
                log.warn(&format!(
                    "service #{} has no \"name\", skipping it",
                    index + 1
                ));
                0
            }

            ServiceConfig::Invalid { name, missing } => {
                log.error(&format!(
                    "service #{} ({}) is missing {}, skipping it",
                    index + 1,
                    name,
                    missing.join(", ")
                ));
                invalid_entry_contribution(service)
            }

            ServiceConfig::Unsupported(name) => {
                log.warn(&format!("provider {} not supported", name));
                0
            }
        };

        total = total.saturating_add(contribution);
    }

    total
}
