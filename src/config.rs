use std::fs;
use std::path::{Path, PathBuf};

use serde_derive::Deserialize;
use thiserror::Error;

use crate::services::{dynu, now_dns};
use crate::util::optional_one_or_more_string;

pub const CONFIG_PATHS: [&str; 2] = [
    "./config.toml",
    #[cfg(target_family = "unix")]
    "/etc/update-ip/config.toml",
];

/// This stores config values specified inside the [general] section of
/// config.toml.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct General {
    #[serde(default = "default_user_agent")]
    pub user_agent: Box<str>,

    /// Where the external IP is looked up. It must answer with the address
    /// in the body.
    #[serde(default = "default_ip_url")]
    pub ip_url: Box<str>,

    /// Only honoured when built with the `regex` feature. The first capture
    /// group is taken as the address.
    #[serde(default = "default_regex")]
    pub ip_regex: Box<str>,

    /// Every log line also goes here when set. Once the file grows past
    /// `log_max_size` bytes it is rolled over to `<log_file>.1`, keeping at
    /// most `log_backups` old files.
    #[serde(default)]
    pub log_file: Option<Box<str>>,

    #[serde(default = "default_log_max_size")]
    pub log_max_size: u64,

    #[serde(default = "default_log_backups")]
    pub log_backups: u32,
}

impl Default for General {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            ip_url: default_ip_url(),
            ip_regex: default_regex(),
            log_file: None,
            log_max_size: default_log_max_size(),
            log_backups: default_log_backups(),
        }
    }
}

/// A `[[services]]` entry after validation. Entries that cannot be used are
/// kept too, so that the updater decides what to report about them.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(from = "RawService")]
pub enum ServiceConfig {
    NowDns(now_dns::Config),
    Dynu(dynu::Config),
    Unnamed,
    Unsupported(Box<str>),
    Invalid {
        name: Box<str>,
        missing: Vec<&'static str>,
    },
}

#[derive(Deserialize)]
struct RawService {
    name: Option<Box<str>>,

    #[serde(default, deserialize_with = "optional_one_or_more_string")]
    hosts: Option<Vec<Box<str>>>,

    user: Option<Box<str>>,

    pass: Option<Box<str>>,

    api_key: Option<Box<str>>,
}

impl From<RawService> for ServiceConfig {
    fn from(raw: RawService) -> Self {
        let Some(name) = raw.name else {
            return ServiceConfig::Unnamed;
        };

        let missing = |fields: &[(&'static str, bool)]| ServiceConfig::Invalid {
            name: name.clone(),
            missing: fields
                .iter()
                .filter(|(_, present)| !present)
                .map(|(field, _)| *field)
                .collect(),
        };

        match name.as_ref() {
            now_dns::NAME => match (raw.hosts, raw.user, raw.pass) {
                (Some(hosts), Some(user), Some(pass)) => {
                    ServiceConfig::NowDns(now_dns::Config { hosts, user, pass })
                }
                (hosts, user, pass) => missing(&[
                    ("hosts", hosts.is_some()),
                    ("user", user.is_some()),
                    ("pass", pass.is_some()),
                ]),
            },

            dynu::NAME => match raw.api_key {
                Some(api_key) => ServiceConfig::Dynu(dynu::Config { api_key }),
                None => missing(&[("api_key", false)]),
            },

            _ => ServiceConfig::Unsupported(name.clone()),
        }
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub general: General,

    /// Left as `None` when the section is absent; that is reported by the
    /// updater rather than rejected here.
    pub services: Option<Vec<ServiceConfig>>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no configuration found, tried: {}", CONFIG_PATHS.join(", "))]
    NotFound,

    #[error("unable to read config file {0}: {1}")]
    Io(PathBuf, std::io::Error),

    #[error("unable to parse config file {0}: {1}")]
    Parse(PathBuf, toml::de::Error),
}

/// Read the config from `path`, or from the first readable entry of
/// [`CONFIG_PATHS`] when no path is given.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let (path, config_str) = match path {
        Some(path) => match fs::read_to_string(path) {
            Ok(s) => (path.to_path_buf(), s),
            Err(e) => return Err(ConfigError::Io(path.to_path_buf(), e)),
        },

        None => CONFIG_PATHS
            .iter()
            .find_map(|path| Some((PathBuf::from(path), fs::read_to_string(path).ok()?)))
            .ok_or(ConfigError::NotFound)?,
    };

    toml::from_str::<Config>(&config_str).map_err(|e| ConfigError::Parse(path, e))
}

fn default_user_agent() -> Box<str> {
    concat!("update-ip/", env!("CARGO_PKG_VERSION")).into()
}

fn default_ip_url() -> Box<str> {
    "https://api.ipify.org".into()
}

fn default_regex() -> Box<str> {
    "(.*)".into()
}

fn default_log_max_size() -> u64 {
    30 * 1024
}

fn default_log_backups() -> u32 {
    2
}
