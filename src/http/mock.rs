//! A scripted in-memory `HttpClient` for unit tests. Replies are chosen by a
//! routing closure and every request is recorded for later inspection.

use std::cell::RefCell;

use super::{Error, HttpClient, Method, Request, Response};

type Route = Box<dyn Fn(&Request) -> Result<Response, Error>>;

pub struct MockClient {
    route: Route,
    requests: RefCell<Vec<Request>>,
}

impl MockClient {
    pub fn new(route: impl Fn(&Request) -> Result<Response, Error> + 'static) -> Self {
        Self {
            route: Box::new(route),
            requests: RefCell::new(Vec::new()),
        }
    }

    /// A client that fails the test if anything is sent through it.
    pub fn unreachable() -> Self {
        Self::new(|request| panic!("unexpected request to {}", request.url))
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.borrow().clone()
    }

    pub fn count(&self, method: Method, url: &str) -> usize {
        self.requests
            .borrow()
            .iter()
            .filter(|r| r.method == method && r.url.as_ref() == url)
            .count()
    }
}

impl HttpClient for MockClient {
    fn send(&self, request: Request) -> Result<Response, Error> {
        let reply = (self.route)(&request);
        self.requests.borrow_mut().push(request);
        reply
    }
}

/// Builds a reply the way the real backends do: statuses >= 400 are errors.
pub fn reply(status: u16, body: &str) -> Result<Response, Error> {
    let response = Response::from_bytes(status, body.as_bytes().to_vec());
    if status >= 400 {
        Err(Error::Status(status, response))
    } else {
        Ok(response)
    }
}

pub fn transport_error(detail: &str) -> Result<Response, Error> {
    Err(Error::Transport(detail.into()))
}

impl Request {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(header, _)| header.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_ref())
    }

    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.queries
            .iter()
            .find(|(param, _)| param.as_ref() == name)
            .map(|(_, value)| value.as_ref())
    }

    pub fn json_body(&self) -> serde_json::Value {
        serde_json::from_slice(self.body.as_deref().unwrap_or_default())
            .expect("request body is not JSON")
    }
}
