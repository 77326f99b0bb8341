/// Unit tests for core mirrorprobe models
/// Tests methods, probe results and the public mutation helpers
use mirrorprobe::models::{Method, ProbeResult};
use mirrorprobe::mutator::{companions, mutate_path};

#[test]
fn test_method_display() {
    // Test that Method enum can be converted to string
    assert_eq!(Method::GET.to_string(), "GET");
    assert_eq!(Method::POST.to_string(), "POST");
    assert_eq!(Method::PUT.to_string(), "PUT");
    assert_eq!(Method::DELETE.to_string(), "DELETE");
    assert_eq!(Method::PATCH.to_string(), "PATCH");
    assert_eq!(Method::OPTIONS.to_string(), "OPTIONS");
    assert_eq!(Method::HEAD.to_string(), "HEAD");
}

#[test]
fn test_method_parse_is_case_insensitive() {
    assert_eq!("head".parse::<Method>().unwrap(), Method::HEAD);
    assert_eq!(" Get ".parse::<Method>().unwrap(), Method::GET);
    assert_eq!("options".parse::<Method>().unwrap(), Method::OPTIONS);
    assert!("TRACE".parse::<Method>().is_err());
    assert!("".parse::<Method>().is_err());
}

#[test]
fn test_method_returns_body() {
    // Only HEAD comes back without a body
    assert!(!Method::HEAD.returns_body());
    assert!(Method::GET.returns_body());
    assert!(Method::POST.returns_body());
    assert!(Method::OPTIONS.returns_body());
}

#[test]
fn test_method_to_reqwest() {
    assert_eq!(Method::HEAD.as_reqwest(), reqwest::Method::HEAD);
    assert_eq!(Method::PATCH.as_reqwest(), reqwest::Method::PATCH);
}

#[test]
fn test_probe_result_strings() {
    let result = ProbeResult {
        status: 301,
        content_length: 0,
        body: None,
    };
    assert_eq!(result.status_code(), "301");
    assert_eq!(result.size(), "0");
}

#[test]
fn test_candidate_count_matches_companions_and_patterns() {
    let patterns = ["~", ".bak", "_*", ".old"];
    for path in ["index.php", "a/b/c.txt", "web/.htaccess", "composer.json", "Dockerfile"] {
        let base = path.rsplit('/').next().unwrap();
        let candidates = mutate_path(path, &patterns);
        assert_eq!(candidates.len(), 1 + companions(base).len() + patterns.len(), "{}", path);
        assert_eq!(candidates[0], path);
    }
}

#[test]
fn test_candidates_never_absolute() {
    let candidates = mutate_path("app/config.php", &["~*", ".bak"]);
    assert!(candidates.iter().all(|c| !c.starts_with('/')));
    assert_eq!(candidates[1], "app/~config.php");
}
