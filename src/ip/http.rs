use std::time::Duration;

#[cfg(feature = "regex")]
use regex::Regex;

use crate::http::{Error, HttpClient, Request};

/// Kept well below the provider timeouts, every other request of a run
/// waits on this one.
const TIMEOUT: Duration = Duration::from_secs(2);

pub(super) fn get_address_text(
    client: &dyn HttpClient,
    url: &str,
    #[cfg_attr(not(feature = "regex"), allow(unused_variables))] pattern: &str,
) -> Result<String, String> {
    let response = match client.send(Request::get(url).timeouts(TIMEOUT, TIMEOUT)) {
        Ok(r) => r,
        Err(Error::Status(code, response)) => {
            Err(code.to_string() + " " + &response.into_string().unwrap_or_default())?
        }
        Err(Error::Transport(t)) => Err(t.to_string())?,
    };

    let text = response.into_string().map_err(|e| e.to_string())?;

    #[cfg(feature = "regex")]
    let addr = Regex::new(pattern)
        .map_err(|e| String::from("unable to parse the regex: ") + &e.to_string())?
        .captures(text.as_str())
        .and_then(|captured| captured.get(1))
        .map(|matched| matched.as_str().to_owned())
        .ok_or_else(|| {
            String::from("the following HTTP response does not match regex: ") + &text
        })?;

    #[cfg(not(feature = "regex"))]
    let addr = text;

    Ok(addr.trim().to_owned())
}
