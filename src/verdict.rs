// Verdict engine for mirrorprobe
// Decides whether a probe result is reported or suppressed, and renders it

use colored::*;

use crate::models::{Method, ProbeResult};

pub enum Verdict {
    /// Goes to the permanent report.
    Report,
    /// Matched a skip rule; only shown as transient progress.
    Suppress,
}

/// A skip-size entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SizeRule {
    /// Compared as a string against the reported length.
    Exact(String),
    /// Inclusive bounds.
    Range(u64, u64),
}

impl SizeRule {
    pub fn matches(&self, length: u64) -> bool {
        match self {
            SizeRule::Exact(s) => *s == length.to_string(),
            SizeRule::Range(low, high) => (*low..=*high).contains(&length),
        }
    }

    /// Every size this rule covers, stringified.
    pub fn values(&self) -> Vec<String> {
        match self {
            SizeRule::Exact(s) => vec![s.clone()],
            SizeRule::Range(low, high) => (*low..=*high).map(|n| n.to_string()).collect(),
        }
    }
}

/// Response-side skip configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseFilter {
    pub codes: Vec<String>,
    pub sizes: Vec<SizeRule>,
    pub content: Option<String>,
}

impl ResponseFilter {
    /// Whether any rule depends on a response body.
    pub fn needs_body(&self) -> bool {
        !self.sizes.is_empty() || self.content.is_some()
    }
}

/// Decide verdict for one probe result.
///
/// Suppressed when the status code or size matches a skip entry, or,
/// for methods that return a body, the body contains the skip content.
pub fn decide_verdict(result: &ProbeResult, filter: &ResponseFilter, method: Method) -> Verdict {
    let code = result.status_code();
    if filter.codes.iter().any(|c| *c == code) {
        return Verdict::Suppress;
    }

    if filter.sizes.iter().any(|s| s.matches(result.content_length)) {
        return Verdict::Suppress;
    }

    if method.returns_body() {
        if let (Some(needle), Some(body)) = (&filter.content, &result.body) {
            if contains_bytes(body, needle.as_bytes()) {
                return Verdict::Suppress;
            }
        }
    }

    Verdict::Report
}

fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    if needle.is_empty() {
        return true;
    }
    haystack.windows(needle.len()).any(|w| w == needle)
}

/// Permanent report line: `METHOD CODE:200  SIZE:1024       URL`.
///
/// With `paint` the status code and URL are colored by status class.
pub fn render_report_line(method: Method, result: &ProbeResult, url: &str, paint: bool) -> String {
    let code = result.status_code();
    let mut line = format!("{} ", method);

    if paint {
        let (code, url) = paint_by_status(result.status, &code, url);
        // pad on the plain width; escape codes would throw {:-4} off
        line.push_str(&format!("CODE:{}{} ", code, pad(result.status_code().len(), 4)));
        if method.returns_body() {
            line.push_str(&format!("SIZE:{:<10} ", result.size()));
        }
        line.push_str(&url);
    } else {
        line.push_str(&format!("CODE:{:<4} ", code));
        if method.returns_body() {
            line.push_str(&format!("SIZE:{:<10} ", result.size()));
        }
        line.push_str(url);
    }

    line
}

/// Transient line for suppressed results.
pub fn render_progress_line(
    method: Method,
    result: &ProbeResult,
    endpoint: &str,
    path: &str,
    paint: bool,
) -> String {
    let endpoint = if paint {
        endpoint.magenta().to_string()
    } else {
        endpoint.to_string()
    };
    let mut line = format!("-> {}{} \tCODE:{}", endpoint, path, result.status_code());
    if method.returns_body() {
        line.push_str(&format!(" SIZE:{}", result.size()));
    }
    line
}

fn paint_by_status(status: u16, code: &str, url: &str) -> (String, String) {
    match status {
        200..=299 => (code.bright_green().to_string(), url.green().to_string()),
        300..=399 => (code.cyan().to_string(), url.cyan().to_string()),
        400..=499 => (code.red().to_string(), url.red().to_string()),
        500..=599 => (code.blue().to_string(), url.blue().to_string()),
        _ => (code.to_string(), url.to_string()),
    }
}

fn pad(width: usize, min: usize) -> String {
    " ".repeat(min.saturating_sub(width))
}
