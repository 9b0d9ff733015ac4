//! HTTP Transport
//!
//! Blocking request/response plumbing shared by the JSON-RPC provider and
//! the bonus backend read.

use std::time::Duration;

use serde_json::Value;

use goldmine_common::{
    constants::network,
    errors::{GoldError, GoldResult},
};

/// One HTTP round trip
pub trait Transport {
    /// POST a JSON body and parse the JSON response
    fn post_json(&self, url: &str, body: &Value) -> GoldResult<Value>;

    /// POST url-encoded form fields and return the raw response body
    fn post_form(&self, url: &str, fields: &[(&str, &str)]) -> GoldResult<String>;
}

/// [`Transport`] over `ureq`
#[derive(Debug, Clone)]
pub struct HttpTransport {
    agent: ureq::Agent,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(Duration::from_secs(network::REQUEST_TIMEOUT_SECS))
    }
}

fn transport_error(err: impl ToString) -> GoldError {
    GoldError::Transport { reason: err.to_string() }
}

impl Transport for HttpTransport {
    fn post_json(&self, url: &str, body: &Value) -> GoldResult<Value> {
        self.agent
            .post(url)
            .send_json(body)
            .map_err(transport_error)?
            .into_json::<Value>()
            .map_err(transport_error)
    }

    fn post_form(&self, url: &str, fields: &[(&str, &str)]) -> GoldResult<String> {
        self.agent
            .post(url)
            .send_form(fields)
            .map_err(transport_error)?
            .into_string()
            .map_err(transport_error)
    }
}
