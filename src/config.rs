// Scan configuration for mirrorprobe
// Raw option values are validated and normalized once into a ScanConfig,
// which the walker, prober and classifier all borrow.

use lazy_static::lazy_static;
use rand::seq::SliceRandom;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::models::{Header, Method};
use crate::skip::SkipRules;
use crate::verdict::{ResponseFilter, SizeRule};

/// Report file used when none is given; suffixed with the target host.
pub const DEFAULT_REPORT_PATH: &str = "./mirrorprobe.report";

/// Span used when a size range is given in reverse order.
pub const SIZE_WINDOW: u64 = 10;

const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_1 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Mobile/15E148 Safari/604.1",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0",
];

lazy_static! {
    static ref LIST_SEPARATORS: Regex = Regex::new(r"[,;/|]").unwrap();
    // header pairs: ";" or a newline, either real or typed as a literal "\n"
    static ref HEADER_SEPARATORS: Regex = Regex::new(r"\\n|[;\n]").unwrap();
}

/// Option values as they come off the command line.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub source: PathBuf,
    pub endpoint: String,
    pub method: String,
    pub depth: usize,
    pub delay_ms: u64,
    pub timeout_secs: u64,
    pub skip: Vec<String>,
    pub skip_ext: Vec<String>,
    pub skip_code: Vec<String>,
    pub skip_size: Vec<String>,
    pub skip_content: String,
    pub dir_only: bool,
    pub user_agent: String,
    pub cookie: String,
    pub headers: String,
    pub mutations: Vec<String>,
    /// `None` disables the report file.
    pub report: Option<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            source: PathBuf::new(),
            endpoint: String::new(),
            method: "HEAD".to_string(),
            depth: 0,
            delay_ms: 150,
            timeout_secs: 10,
            skip: ["jquery", "css", "img", "images", "i18n", "po"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            skip_ext: [".png", ".jpeg", "jpg", "Gif", ".CSS", ".less", ".sass"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            skip_code: vec!["404".to_string()],
            skip_size: Vec::new(),
            skip_content: String::new(),
            dir_only: false,
            user_agent: "random".to_string(),
            cookie: String::new(),
            headers: String::new(),
            mutations: crate::mutator::DEFAULT_MUTATIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            report: Some(DEFAULT_REPORT_PATH.to_string()),
        }
    }
}

/// Validated settings for one scan.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Canonical source directory.
    pub source: PathBuf,
    pub endpoint: String,
    /// Method as configured, before any upgrade.
    pub method: Method,
    pub delay: Duration,
    pub timeout: Duration,
    pub skip: SkipRules,
    pub filter: ResponseFilter,
    pub user_agent: String,
    pub cookie: String,
    pub headers: Vec<Header>,
    pub mutations: Vec<String>,
    pub report_path: Option<PathBuf>,
}

impl ScanConfig {
    pub fn from_options(opts: ScanOptions) -> Result<Self, ConfigError> {
        let source = validate_source(&opts.source)?;
        let host = validate_endpoint(&opts.endpoint)?;
        let method: Method = opts.method.parse()?;

        if !opts.endpoint.ends_with('/') {
            tracing::warn!(
                endpoint = %opts.endpoint,
                "endpoint has no trailing slash; candidate paths are appended verbatim"
            );
        }

        let skip = SkipRules {
            names: normalize_list(&opts.skip),
            extensions: normalize_list(&opts.skip_ext)
                .iter()
                .filter_map(|e| normalize_extension(e))
                .collect(),
            max_depth: opts.depth,
            dirs_only: opts.dir_only,
        };

        let filter = ResponseFilter {
            codes: normalize_list(&opts.skip_code),
            sizes: normalize_list(&opts.skip_size)
                .iter()
                .map(|s| parse_size_rule(s))
                .collect(),
            content: Some(opts.skip_content).filter(|c| !c.is_empty()),
        };

        let user_agent = if opts.user_agent.is_empty() || opts.user_agent == "random" {
            random_user_agent().to_string()
        } else {
            opts.user_agent
        };

        let report_path = opts.report.filter(|p| !p.is_empty()).map(|p| {
            if p == DEFAULT_REPORT_PATH {
                PathBuf::from(format!("{}.{}", p, host))
            } else {
                PathBuf::from(p)
            }
        });

        Ok(Self {
            source,
            endpoint: opts.endpoint,
            method,
            delay: Duration::from_millis(opts.delay_ms),
            timeout: Duration::from_secs(opts.timeout_secs),
            skip,
            filter,
            user_agent,
            cookie: opts.cookie,
            headers: parse_headers(&opts.headers),
            mutations: opts
                .mutations
                .iter()
                .flat_map(|m| m.split(','))
                .filter(|m| !m.is_empty())
                .map(|m| m.to_string())
                .collect(),
            report_path,
        })
    }

    /// Method actually used for every request.
    pub fn effective_method(&self) -> Method {
        effective_method(self.method, &self.filter)
    }
}

/// HEAD cannot feed body-dependent filters, so those force a GET.
pub fn effective_method(configured: Method, filter: &ResponseFilter) -> Method {
    if !configured.returns_body() && filter.needs_body() {
        Method::GET
    } else {
        configured
    }
}

fn validate_source(path: &Path) -> Result<PathBuf, ConfigError> {
    let meta = fs::metadata(path).map_err(|source| ConfigError::SourceMissing {
        path: path.to_path_buf(),
        source,
    })?;
    if !meta.is_dir() {
        return Err(ConfigError::SourceNotDirectory(path.to_path_buf()));
    }
    fs::canonicalize(path).map_err(|source| ConfigError::SourceMissing {
        path: path.to_path_buf(),
        source,
    })
}

/// Returns the endpoint host, used to name the default report.
fn validate_endpoint(endpoint: &str) -> Result<String, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEndpoint {
        url: endpoint.to_string(),
        reason,
    };

    let url = reqwest::Url::parse(endpoint).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme {}", other))),
    }
    url.host_str()
        .map(|h| h.to_string())
        .ok_or_else(|| invalid("missing host".to_string()))
}

/// Flatten list flags given either repeatedly or joined with `, ; / |`.
pub fn normalize_list(values: &[String]) -> Vec<String> {
    values
        .iter()
        .flat_map(|v| LIST_SEPARATORS.split(v))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .collect()
}

/// `"PNG"`, `".png"` and `" .Png "` all become `".png"`.
pub fn normalize_extension(ext: &str) -> Option<String> {
    let trimmed = ext.trim_matches(|c: char| c == ' ' || c == '.');
    if trimmed.is_empty() {
        return None;
    }
    Some(format!(".{}", trimmed.to_lowercase()))
}

/// Parse one skip-size entry: a plain size, or a `low-high` range.
///
/// Non-numeric bounds count as zero. A reversed range `high-low` covers
/// `high..=high + SIZE_WINDOW`.
pub fn parse_size_rule(entry: &str) -> SizeRule {
    if !entry.contains('-') {
        return SizeRule::Exact(entry.to_string());
    }

    let mut parts = entry.split('-');
    let first = parse_bound(parts.next().unwrap_or(""));
    let second = parse_bound(parts.next().unwrap_or(""));

    if first <= second {
        SizeRule::Range(first, second)
    } else {
        SizeRule::Range(first, first.saturating_add(SIZE_WINDOW))
    }
}

fn parse_bound(token: &str) -> u64 {
    token
        .trim()
        .parse::<i64>()
        .map(i64::unsigned_abs)
        .unwrap_or(0)
}

/// Parse `"k1:v1; k2:v2\n k3=v3"` into ordered headers.
///
/// A pair without `:` may use `=` instead. A later pair replaces an
/// earlier one with the same (case-sensitive) name and takes its place
/// at the end, so the order follows the last occurrence of each name.
pub fn parse_headers(raw: &str) -> Vec<Header> {
    let mut headers: Vec<Header> = Vec::new();

    for pair in HEADER_SEPARATORS.split(raw) {
        let pair = if pair.contains(':') {
            pair.to_string()
        } else {
            pair.replacen('=', ":", 1)
        };

        let mut parts = pair.splitn(2, ':');
        let name = parts.next().unwrap_or("").trim();
        let value = parts.next().unwrap_or("").trim();
        if name.is_empty() {
            continue;
        }

        headers.retain(|h| h.name != name);
        headers.push(Header {
            name: name.to_string(),
            value: value.to_string(),
        });
    }

    headers
}

pub fn random_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_list_separators() {
        let list = normalize_list(&strings(&["css;img", "po|i18n/fonts", " js ,"]));
        assert_eq!(list, strings(&["css", "img", "po", "i18n", "fonts", "js"]));
    }

    #[test]
    fn test_normalize_extension() {
        assert_eq!(normalize_extension("PNG"), Some(".png".to_string()));
        assert_eq!(normalize_extension(".CSS"), Some(".css".to_string()));
        assert_eq!(normalize_extension(" .Gif "), Some(".gif".to_string()));
        assert_eq!(normalize_extension(" . "), None);
    }

    #[test]
    fn test_normalize_extension_idempotent() {
        for ext in ["jpg", ".JPEG", "Sass", ".tar.GZ"] {
            let once = normalize_extension(ext).unwrap();
            assert_eq!(normalize_extension(&once), Some(once.clone()));
        }
    }

    #[test]
    fn test_size_rule_exact() {
        assert_eq!(parse_size_rule("1234"), SizeRule::Exact("1234".to_string()));
    }

    #[test]
    fn test_size_rule_range() {
        let rule = parse_size_rule("100-200");
        assert_eq!(rule, SizeRule::Range(100, 200));
        let values = rule.values();
        assert_eq!(values.len(), 101);
        assert_eq!(values.first().map(String::as_str), Some("100"));
        assert_eq!(values.last().map(String::as_str), Some("200"));
    }

    #[test]
    fn test_size_rule_reversed_range_uses_window() {
        let rule = parse_size_rule("200-100");
        assert_eq!(rule, SizeRule::Range(200, 210));
        assert_eq!(rule.values().len(), 11);
    }

    #[test]
    fn test_size_rule_non_numeric_bounds_are_zero() {
        assert_eq!(parse_size_rule("abc-xyz"), SizeRule::Range(0, 0));
        assert_eq!(parse_size_rule("-50"), SizeRule::Range(0, 50));
        assert_eq!(parse_size_rule("x-7"), SizeRule::Range(0, 7));
    }

    #[test]
    fn test_parse_headers() {
        let headers = parse_headers("X-Api-Key: abc; Accept=text/html\\n X-Trace : 1 ");
        assert_eq!(
            headers,
            vec![
                Header { name: "X-Api-Key".to_string(), value: "abc".to_string() },
                Header { name: "Accept".to_string(), value: "text/html".to_string() },
                Header { name: "X-Trace".to_string(), value: "1".to_string() },
            ]
        );
    }

    #[test]
    fn test_parse_headers_later_duplicate_wins() {
        let headers = parse_headers("X-A: 1\nx-a: 2; X-A: 3");
        assert_eq!(headers.len(), 2);
        assert_eq!(headers[0], Header { name: "x-a".to_string(), value: "2".to_string() });
        assert_eq!(headers[1], Header { name: "X-A".to_string(), value: "3".to_string() });
    }

    #[test]
    fn test_parse_headers_value_keeps_colons() {
        let headers = parse_headers("Referer: https://example.com:8443/");
        assert_eq!(headers[0].value, "https://example.com:8443/");
    }

    #[test]
    fn test_parse_headers_empty() {
        assert!(parse_headers("").is_empty());
        assert!(parse_headers(" ; ;").is_empty());
    }

    #[test]
    fn test_effective_method_upgrade() {
        let mut filter = ResponseFilter::default();
        assert_eq!(effective_method(Method::HEAD, &filter), Method::HEAD);

        filter.sizes.push(SizeRule::Exact("0".to_string()));
        assert_eq!(effective_method(Method::HEAD, &filter), Method::GET);

        let filter = ResponseFilter {
            content: Some("Not Found".to_string()),
            ..ResponseFilter::default()
        };
        assert_eq!(effective_method(Method::HEAD, &filter), Method::GET);
        assert_eq!(effective_method(Method::POST, &filter), Method::POST);
    }

    #[test]
    fn test_random_user_agent_from_pool() {
        assert!(USER_AGENTS.contains(&random_user_agent()));
    }

    #[test]
    fn test_from_options_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let opts = ScanOptions {
            source: dir.path().to_path_buf(),
            endpoint: "https://example.com/".to_string(),
            ..ScanOptions::default()
        };
        let config = ScanConfig::from_options(opts).unwrap();

        assert_eq!(config.method, Method::HEAD);
        assert_eq!(config.effective_method(), Method::HEAD);
        assert_eq!(config.delay, Duration::from_millis(150));
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(
            config.skip.extensions,
            strings(&[".png", ".jpeg", ".jpg", ".gif", ".css", ".less", ".sass"])
        );
        assert_eq!(config.filter.codes, strings(&["404"]));
        assert_eq!(config.mutations.len(), crate::mutator::DEFAULT_MUTATIONS.len());
        assert_eq!(
            config.report_path,
            Some(PathBuf::from("./mirrorprobe.report.example.com"))
        );
        assert!(USER_AGENTS.contains(&config.user_agent.as_str()));
    }

    #[test]
    fn test_from_options_missing_source() {
        let opts = ScanOptions {
            source: PathBuf::from("/definitely/not/here"),
            endpoint: "http://localhost/".to_string(),
            ..ScanOptions::default()
        };
        assert!(matches!(
            ScanConfig::from_options(opts),
            Err(ConfigError::SourceMissing { .. })
        ));
    }

    #[test]
    fn test_from_options_rejects_bad_endpoint_and_method() {
        let dir = tempfile::tempdir().unwrap();
        let base = ScanOptions {
            source: dir.path().to_path_buf(),
            endpoint: "ftp://example.com/".to_string(),
            ..ScanOptions::default()
        };
        assert!(matches!(
            ScanConfig::from_options(base.clone()),
            Err(ConfigError::InvalidEndpoint { .. })
        ));

        let opts = ScanOptions {
            endpoint: "http://example.com/".to_string(),
            method: "BREW".to_string(),
            ..base
        };
        assert!(matches!(
            ScanConfig::from_options(opts),
            Err(ConfigError::UnsupportedMethod(_))
        ));
    }

    #[test]
    fn test_from_options_custom_report_kept_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let opts = ScanOptions {
            source: dir.path().to_path_buf(),
            endpoint: "http://example.com/".to_string(),
            method: "get".to_string(),
            report: Some("out.txt".to_string()),
            skip_size: strings(&["0,10-12"]),
            ..ScanOptions::default()
        };
        let config = ScanConfig::from_options(opts).unwrap();
        assert_eq!(config.method, Method::GET);
        assert_eq!(config.report_path, Some(PathBuf::from("out.txt")));
        assert_eq!(
            config.filter.sizes,
            vec![SizeRule::Exact("0".to_string()), SizeRule::Range(10, 12)]
        );
    }
}
