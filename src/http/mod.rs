#[cfg(feature = "curl")]
#[cfg(feature = "ureq")]
compile_error!("The features `curl` and `ureq` must not be enabled together!");

#[cfg(feature = "curl")]
mod curl_backend;

#[cfg(feature = "ureq")]
mod ureq_backend;

#[cfg(test)]
pub mod mock;

use std::io::{self, Read};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

#[cfg(feature = "curl")]
pub use curl_backend::{check_curl_version, Client};

#[cfg(feature = "ureq")]
pub use ureq_backend::Client;

/// Anything able to perform a single blocking HTTP exchange. Every call site
/// in the crate goes through this, which keeps the providers oblivious of the
/// backend that was compiled in.
pub trait HttpClient {
    fn send(&self, request: Request) -> Result<Response, Error>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    pub(crate) method: Method,
    pub(crate) url: Box<str>,
    pub(crate) queries: Vec<(Box<str>, Box<str>)>,
    pub(crate) headers: Vec<(Box<str>, Box<str>)>,
    pub(crate) body: Option<Vec<u8>>,
    pub(crate) connect_timeout: Duration,
    pub(crate) read_timeout: Duration,
}

pub struct Response {
    status: u16,
    reader: Box<dyn Read>,
}

pub enum Error {
    /// The server answered with a status >= 400. The body is still readable.
    Status(u16, Response),
    Transport(Box<str>),
}

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

impl Request {
    fn new(method: Method, url: &str) -> Self {
        Self {
            method,
            url: url.into(),
            queries: Vec::new(),
            headers: Vec::new(),
            body: None,
            connect_timeout: DEFAULT_TIMEOUT,
            read_timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn get(url: &str) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn post(url: &str) -> Self {
        Self::new(Method::Post, url)
    }

    pub fn query(mut self, param: &str, value: &str) -> Self {
        self.queries.push((param.into(), value.into()));
        self
    }

    pub fn set(mut self, header: &str, value: &str) -> Self {
        self.headers.push((header.into(), value.into()));
        self
    }

    pub fn basic_auth(self, user: &str, password: &str) -> Self {
        let username_password = String::from(user) + ":" + password;
        let base64 = data_encoding::BASE64.encode(username_password.as_bytes());
        self.set("Authorization", &(String::from("Basic ") + &base64))
    }

    pub fn timeouts(mut self, connect: Duration, read: Duration) -> Self {
        self.connect_timeout = connect;
        self.read_timeout = read;
        self
    }

    pub fn json(self, data: &impl Serialize) -> Self {
        // UNWRAP-SAFETY: only plain structs with string keys are ever sent.
        let body = serde_json::to_vec(data).expect("unable to serialize data into JSON string");
        let mut request = self.set("Content-Type", "application/json");
        request.body = Some(body);
        request
    }
}

impl Response {
    pub(crate) fn new(status: u16, reader: Box<dyn Read>) -> Self {
        Self { status, reader }
    }

    #[cfg(any(test, feature = "curl"))]
    pub(crate) fn from_bytes(status: u16, bytes: Vec<u8>) -> Self {
        Self::new(status, Box::new(io::Cursor::new(bytes)))
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn into_json<T: DeserializeOwned>(self) -> Result<T, io::Error> {
        serde_json::from_reader(self.reader)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    pub fn into_string(self) -> Result<String, io::Error> {
        let mut vec = Vec::with_capacity(1024);
        let read = self.reader.take(2 * 1024 * 1024).read_to_end(&mut vec)?;
        vec.resize(read, 0);
        String::from_utf8(vec).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}
