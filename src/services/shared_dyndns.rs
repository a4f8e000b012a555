//! The hostname + HTTP Basic authentication protocol. The provider works out
//! the address from the connecting client, so no IP is ever sent. The outcome
//! is a bare plain-text token in the response body.

use std::fmt;
use std::time::Duration;

use crate::http::{Error, HttpClient, Request};
use crate::ip::ExternalIp;
use crate::report::Reporter;

use super::{DdnsService, DdnsUpdateError};

const TIMEOUT: Duration = Duration::from_secs(5);

/// What a host adds to the run total when the request never got an answer.
const TRANSPORT_FAILURE: u32 = 1;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub(crate) hosts: Vec<Box<str>>,
    pub(crate) user: Box<str>,
    pub(crate) pass: Box<str>,
}

/// Every answer the protocol defines, plus a catch-all for anything else.
/// Tokens are matched exactly and case-sensitively.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    Good,
    NoChange,
    NoHost,
    NotFqdn,
    BadAuth,
    Unrecognized(Box<str>),
}

impl Reply {
    pub fn classify(body: &str) -> Self {
        match body {
            "good" => Reply::Good,
            "nochg" => Reply::NoChange,
            "nohost" => Reply::NoHost,
            "notfqdn" => Reply::NotFqdn,
            "badauth" => Reply::BadAuth,
            other => Reply::Unrecognized(other.into()),
        }
    }

    /// These are magnitudes rather than flags; a run adds them up as they are.
    pub fn contribution(&self) -> u32 {
        match self {
            Reply::Good | Reply::NoChange => 0,
            Reply::NoHost => 1,
            Reply::NotFqdn => 2,
            Reply::BadAuth => 3,
            Reply::Unrecognized(_) => 4,
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Good => write!(f, "new IP successfully updated (good)"),
            Reply::NoChange => write!(f, "IP is still the same, nothing updated (nochg)"),
            Reply::NoHost => write!(f, "hostname does not exist in the user account (nohost)"),
            Reply::NotFqdn => write!(f, "hostname must be fully-qualified (notfqdn)"),
            Reply::BadAuth => write!(f, "bad authentication details were provided (badauth)"),
            Reply::Unrecognized(text) => write!(f, "server returned an unrecognized answer: {:?}", text),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Service {
    name: &'static str,
    server: &'static str,
    config: Config,
}

impl Service {
    pub fn from_config(name: &'static str, server: &'static str, config: Config) -> Self {
        Self {
            name,
            server,
            config,
        }
    }

    fn request(&self, client: &dyn HttpClient, hostname: &str) -> Result<Reply, DdnsUpdateError> {
        let request = Request::get(self.server)
            .basic_auth(&self.config.user, &self.config.pass)
            .query("hostname", hostname)
            .timeouts(TIMEOUT, TIMEOUT);

        match client.send(request) {
            // Error statuses still carry one of the tokens in their body.
            Ok(resp) | Err(Error::Status(_, resp)) => {
                let body = resp
                    .into_string()
                    .map_err(|e| DdnsUpdateError::Body(e.to_string().into()))?;
                Ok(Reply::classify(&body))
            }

            Err(Error::Transport(t)) => Err(DdnsUpdateError::TransportError(t)),
        }
    }

    /// Update a single hostname and return what it adds to the run total.
    pub fn update_host(&self, client: &dyn HttpClient, hostname: &str, log: &dyn Reporter) -> u32 {
        let reply = match self.request(client, hostname) {
            Ok(reply) => reply,
            Err(e) => {
                log.error(&format!(
                    "Service: {}; hostname: {}: update failed: {}",
                    self.name, hostname, e
                ));
                return TRANSPORT_FAILURE;
            }
        };

        let message = format!("Service: {}; hostname: {}: {}", self.name, hostname, reply);
        match reply {
            Reply::Good | Reply::NoChange => log.info(&message),
            Reply::NoHost | Reply::NotFqdn | Reply::BadAuth => log.error(&message),
            Reply::Unrecognized(_) => log.warn(&message),
        }

        reply.contribution()
    }
}

impl DdnsService for Service {
    fn update(&self, client: &dyn HttpClient, _ip: &ExternalIp, log: &dyn Reporter) -> u32 {
        self.config
            .hosts
            .iter()
            .map(|host| self.update_host(client, host, log))
            .fold(0, u32::saturating_add)
    }
}

#[cfg(test)]
mod tests {
    use log::Level;

    use super::*;
    use crate::http::mock::{reply, transport_error, MockClient};
    use crate::http::Method;
    use crate::report::recording::RecordingReporter;

    const SERVER: &str = "https://dyndns.test/update";

    fn service(hosts: &[&str]) -> Service {
        Service::from_config(
            "Test",
            SERVER,
            Config {
                hosts: hosts.iter().map(|h| Box::from(*h)).collect(),
                user: "alice".into(),
                pass: "hunter2".into(),
            },
        )
    }

    fn contribution_for(body: &'static str) -> u32 {
        let client = MockClient::new(move |_| reply(200, body));
        service(&[]).update_host(&client, "home.example.com", &RecordingReporter::default())
    }

    #[test]
    fn classifies_every_token() {
        assert_eq!(Reply::classify("good"), Reply::Good);
        assert_eq!(Reply::classify("nochg"), Reply::NoChange);
        assert_eq!(Reply::classify("nohost"), Reply::NoHost);
        assert_eq!(Reply::classify("notfqdn"), Reply::NotFqdn);
        assert_eq!(Reply::classify("badauth"), Reply::BadAuth);
        assert_eq!(Reply::classify("GOOD"), Reply::Unrecognized("GOOD".into()));
        assert_eq!(Reply::classify("good\n"), Reply::Unrecognized("good\n".into()));
        assert_eq!(Reply::classify(""), Reply::Unrecognized("".into()));
    }

    #[test]
    fn contributions_follow_the_reply() {
        assert_eq!(contribution_for("good"), 0);
        assert_eq!(contribution_for("nochg"), 0);
        assert_eq!(contribution_for("nohost"), 1);
        assert_eq!(contribution_for("notfqdn"), 2);
        assert_eq!(contribution_for("badauth"), 3);
        assert_eq!(contribution_for("911"), 4);
        assert_eq!(contribution_for(""), 4);
    }

    #[test]
    fn sends_hostname_with_basic_auth() {
        let client = MockClient::new(|_| reply(200, "good"));
        let log = RecordingReporter::default();

        assert_eq!(service(&[]).update_host(&client, "home.example.com", &log), 0);

        let requests = client.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.url.as_ref(), SERVER);
        assert_eq!(request.query_value("hostname"), Some("home.example.com"));
        assert_eq!(request.query_value("myip"), None);
        assert_eq!(request.header("Authorization"), Some("Basic YWxpY2U6aHVudGVyMg=="));
        assert_eq!(request.body, None);
        assert_eq!(request.connect_timeout, TIMEOUT);
        assert_eq!(request.read_timeout, TIMEOUT);
        assert!(log.contains(Level::Info, "home.example.com"));
    }

    #[test]
    fn error_status_body_is_still_classified() {
        let client = MockClient::new(|_| reply(401, "badauth"));
        let log = RecordingReporter::default();

        assert_eq!(service(&[]).update_host(&client, "home.example.com", &log), 3);
        assert!(log.contains(Level::Error, "badauth"));
    }

    #[test]
    fn transport_failure_counts_as_one() {
        let client = MockClient::new(|_| transport_error("connection refused"));
        let log = RecordingReporter::default();

        assert_eq!(service(&[]).update_host(&client, "home.example.com", &log), 1);
        assert!(log.contains(Level::Error, "connection refused"));
    }

    #[test]
    fn unrecognized_answer_is_a_warning() {
        let client = MockClient::new(|_| reply(200, "abuse"));
        let log = RecordingReporter::default();

        assert_eq!(service(&[]).update_host(&client, "home.example.com", &log), 4);
        assert_eq!(log.count(Level::Warn), 1);
        assert_eq!(log.count(Level::Error), 0);
    }

    #[test]
    fn hosts_are_updated_in_order_and_summed() {
        let client = MockClient::new(|request| match request.query_value("hostname") {
            Some("a.example.com") => reply(200, "nochg"),
            Some("b.example.com") => reply(200, "notfqdn"),
            _ => reply(200, "nohost"),
        });
        let log = RecordingReporter::default();
        let service = service(&["a.example.com", "b.example.com", "c.example.com"]);

        assert_eq!(service.update(&client, &ExternalIp::Unknown, &log), 3);

        let hosts = client
            .requests()
            .iter()
            .map(|r| r.query_value("hostname").unwrap().to_owned())
            .collect::<Vec<_>>();
        assert_eq!(hosts, ["a.example.com", "b.example.com", "c.example.com"]);
    }
}
