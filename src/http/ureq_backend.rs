use ureq;

use super::{Error, HttpClient, Method, Request, Response};

pub struct Client {
    user_agent: Box<str>,
}

impl Client {
    pub fn new(user_agent: &str) -> Self {
        Self {
            user_agent: user_agent.into(),
        }
    }
}

impl HttpClient for Client {
    fn send(&self, request: Request) -> Result<Response, Error> {
        // Timeouts are per request, so the agent is built per request too.
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(request.connect_timeout)
            .timeout_read(request.read_timeout)
            .user_agent(&self.user_agent)
            .build();

        let mut inner = agent.request(request.method.as_str(), &request.url);

        for (param, value) in &request.queries {
            inner = inner.query(param, value);
        }

        for (header, value) in &request.headers {
            inner = inner.set(header, value);
        }

        let result = match (request.method, request.body) {
            (Method::Post, Some(body)) => inner.send_bytes(&body),
            (Method::Post, None) => inner.send_bytes(&[]),
            (Method::Get, _) => inner.call(),
        };

        result
            .map_err(|e| match e {
                ureq::Error::Status(code, resp) => {
                    Error::Status(code, Response::new(code, resp.into_reader()))
                }
                ureq::Error::Transport(tp) => Error::Transport(tp.to_string().into()),
            })
            .map(|resp| {
                let status = resp.status();
                Response::new(status, resp.into_reader())
            })
    }
}
