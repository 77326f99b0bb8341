// Filename mutations for mirrorprobe
// Expands one source-tree path into the backup/companion variants worth probing

use lazy_static::lazy_static;
use std::collections::HashMap;

/// Placeholder standing for the original filename inside a mutation pattern.
pub const PLACEHOLDER: char = '*';

/// Mutations applied when none are configured.
pub const DEFAULT_MUTATIONS: &[&str] = &[
    "~", ".swp", ".swo", ".tmp", ".dmp", ".bkp", ".backup", ".bak", ".zip", ".tar", ".old", "_*",
    "~*",
];

lazy_static! {
    /// Filenames whose presence suggests that related files sit next to them.
    static ref COMPANIONS: HashMap<&'static str, &'static [&'static str]> = {
        let mut m: HashMap<&'static str, &'static [&'static str]> = HashMap::new();
        m.insert("composer.json", &["composer.lock", "composer.phar"]);
        m.insert(".htaccess", &[".htpasswd"]);
        m.insert(
            "Dockerfile",
            &[
                "Dockerfile.production",
                "Dockerfile.prod",
                "Dockerfile.dev",
                "Dockerfile.local",
                "Dockerfile.loc",
                "docker-compose.yml",
                ".env",
            ],
        );
        m
    };
}

/// Companion filenames known for `file_name`, if any.
pub fn companions(file_name: &str) -> &'static [&'static str] {
    COMPANIONS.get(file_name).copied().unwrap_or(&[])
}

/// Generate the candidate paths for one relative path.
///
/// The original path always comes first, followed by its companions and
/// then one candidate per pattern, in pattern order:
/// - `"config.php"` + `[".bak"]` → `["config.php", "config.php.bak"]`
/// - `"app/config.php"` + `["_*"]` → `["app/config.php", "app/_config.php"]`
///
/// No deduplication is done.
pub fn mutate_path<S: AsRef<str>>(path: &str, patterns: &[S]) -> Vec<String> {
    let (dir, base) = split_path(path);
    let related = companions(base);

    let mut mutations = Vec::with_capacity(1 + related.len() + patterns.len());
    mutations.push(path.to_string()); // Always include original

    for companion in related {
        mutations.push(join_path(dir, companion));
    }

    for pattern in patterns {
        mutations.push(join_path(dir, &mutate_name(base, pattern.as_ref())));
    }

    mutations
}

/// Apply one pattern to a bare filename.
pub fn mutate_name(base: &str, pattern: &str) -> String {
    if pattern.contains(PLACEHOLDER) {
        pattern.replacen(PLACEHOLDER, base, 1)
    } else {
        format!("{}{}", base, pattern)
    }
}

/// Split a `/`-separated relative path into directory and final segment.
fn split_path(path: &str) -> (&str, &str) {
    match path.rsplit_once('/') {
        Some((dir, base)) => (dir, base),
        None => ("", path),
    }
}

fn join_path(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}
