use curl::easy::{Easy, List};

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

    fn configure(&self, curl: &mut Easy, request: &Request) -> Result<(), curl::Error> {
        match request.method {
            Method::Get => curl.get(true)?,
            Method::Post => {
                curl.post(true)?;
                curl.post_fields_copy(request.body.as_deref().unwrap_or_default())?;
            }
        }

        curl.useragent(&self.user_agent)?;
        curl.connect_timeout(request.connect_timeout)?;
        // libcurl has no separate read timeout; the whole transfer is bounded
        // by the sum of both instead.
        curl.timeout(request.connect_timeout + request.read_timeout)?;

        let mut queries = String::new();
        for (param, value) in &request.queries {
            queries.push(if queries.is_empty() { '?' } else { '&' });
            queries.push_str(&curl.url_encode(param.as_bytes()));
            queries.push('=');
            queries.push_str(&curl.url_encode(value.as_bytes()));
        }
        curl.url(&(String::from(request.url.as_ref()) + &queries))?;

        let mut header_list = List::new();
        for (header, value) in &request.headers {
            header_list.append(&(String::from(header.as_ref()) + ": " + value))?;
        }
        curl.http_headers(header_list)?;

        Ok(())
    }
}

impl HttpClient for Client {
    fn send(&self, request: Request) -> Result<Response, Error> {
        let mut curl = Easy::new();

        self.configure(&mut curl, &request)
            .map_err(|e| Error::Transport(e.description().into()))?;

        let mut response = Vec::with_capacity(8192);
        let mut transfer = curl.transfer();

        transfer
            .write_function(|src| {
                response.extend(src.iter().copied());
                Ok(src.len())
            })
            .unwrap(); // UNWRAP-SAFETY: This is always CURLE_OK.

        if let Err(err) = transfer.perform() {
            return Err(Error::Transport(err.description().into()));
        };

        drop(transfer);

        let response_code = curl
            .response_code()
            .map_err(|e| Error::Transport(e.description().into()))? as u16;
        let response = Response::from_bytes(response_code, response);

        if response_code >= 400 {
            return Err(Error::Status(response_code, response));
        };

        Ok(response)
    }
}

/// Rejects a system libcurl that is too old or built without SSL.
pub fn check_curl_version() -> Result<(), &'static str> {
    let version = curl::Version::get();
    let num = version.version_num();
    let major = (num >> 16) & 0xFF;
    let minor = (num >> 8) & 0xFF;

    // As of writing, this is the oldest supported curl in Debian 10.
    // Not going to support anything older than that.
    if !(major > 7 || (major == 7 && minor >= 64)) {
        return Err("System libcurl is too old! Minimum required: 7.64.0");
    }

    if version.ssl_version().is_none() {
        return Err("libcurl doesn't seem to have SSL support");
    }

    Ok(())
}
