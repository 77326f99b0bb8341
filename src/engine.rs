// HTTP engine for mirrorprobe
// One blocking request per candidate, no retries

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_LENGTH, COOKIE, USER_AGENT};
use std::io::Read;
use std::thread;
use std::time::Duration;

use crate::config::ScanConfig;
use crate::error::ProbeError;
use crate::models::{Method, ProbeResult};

/// Upper bound on body bytes read per response.
pub const MAX_BODY_BYTES: u64 = 16 * 1024 * 1024;

/// Anything that can fetch a single URL.
pub trait Prober {
    fn probe(&self, method: Method, url: &str) -> Result<ProbeResult, ProbeError>;
}

pub struct ProbeEngine {
    pub client: Client,
    headers: HeaderMap,
    delay: Duration,
    keep_body: bool,
}

impl ProbeEngine {
    /// Certificate validation is off: targets are often self-signed or
    /// served under a mismatched name.
    pub fn new(config: &ScanConfig) -> Result<Self, ProbeError> {
        let client = Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            headers: request_headers(config),
            delay: config.delay,
            keep_body: config.filter.content.is_some(),
        })
    }
}

impl Prober for ProbeEngine {
    fn probe(&self, method: Method, url: &str) -> Result<ProbeResult, ProbeError> {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }

        let mut resp = self
            .client
            .request(method.as_reqwest(), url)
            .headers(self.headers.clone())
            .send()?;

        let status = resp.status().as_u16();
        let reported = resp
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<i64>().ok())
            .or_else(|| resp.content_length().map(|n| n as i64))
            .unwrap_or(-1);

        let mut body = Vec::new();
        resp.by_ref().take(MAX_BODY_BYTES).read_to_end(&mut body)?;

        let content_length = if reported <= 0 {
            body.len() as u64
        } else {
            reported as u64
        };

        Ok(ProbeResult {
            status,
            content_length,
            body: if self.keep_body { Some(body) } else { None },
        })
    }
}

/// User-Agent, Cookie, then custom headers; later entries win.
fn request_headers(config: &ScanConfig) -> HeaderMap {
    let mut headers = HeaderMap::new();

    match HeaderValue::from_str(&config.user_agent) {
        Ok(v) => {
            headers.insert(USER_AGENT, v);
        }
        Err(e) => tracing::warn!(error = %e, "ignoring invalid user agent"),
    }

    if !config.cookie.is_empty() {
        match HeaderValue::from_str(&config.cookie) {
            Ok(v) => {
                headers.insert(COOKIE, v);
            }
            Err(e) => tracing::warn!(error = %e, "ignoring invalid cookie string"),
        }
    }

    for header in &config.headers {
        let name = HeaderName::from_bytes(header.name.as_bytes());
        let value = HeaderValue::from_str(&header.value);
        match (name, value) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => tracing::warn!(header = %header.name, "ignoring invalid custom header"),
        }
    }

    headers
}
