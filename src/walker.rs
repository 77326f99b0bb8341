// Source tree walker for mirrorprobe
// Lazily yields the entries that survive the skip rules, in lexical
// depth-first order. Both the counting and the probing pass consume it.

use std::path::{Path, PathBuf};
use std::time::Duration;
use walkdir::WalkDir;

use crate::config::ScanConfig;
use crate::error::ScanError;
use crate::skip::{depth_of, EntryInfo, SkipDecision, SkipRules};

/// Rough per-request latency assumed for the ETA.
const ASSUMED_LATENCY: Duration = Duration::from_millis(200);

/// A walked entry that should be probed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    /// Root-relative, `/`-separated path; never empty.
    pub rel_path: String,
    pub is_dir: bool,
    pub depth: usize,
}

pub struct SourceWalk<'a> {
    root: PathBuf,
    inner: walkdir::IntoIter,
    rules: &'a SkipRules,
}

impl<'a> SourceWalk<'a> {
    pub fn new(root: &Path, rules: &'a SkipRules) -> Self {
        Self {
            root: root.to_path_buf(),
            inner: WalkDir::new(root).sort_by_file_name().into_iter(),
            rules,
        }
    }
}

impl Iterator for SourceWalk<'_> {
    type Item = Result<WalkEntry, walkdir::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(e)),
            };

            let rel_path = relative_path(&self.root, entry.path());
            if rel_path.is_empty() {
                continue; // the root itself
            }

            let is_dir = entry.file_type().is_dir();
            let name = entry.file_name().to_string_lossy();
            let depth = depth_of(&rel_path);
            let info = EntryInfo {
                name: &name,
                is_dir,
                depth,
                rel_path: &rel_path,
            };

            match self.rules.evaluate(&info) {
                SkipDecision::SkipTree => {
                    tracing::debug!(path = %rel_path, "skipping tree");
                    if is_dir {
                        self.inner.skip_current_dir();
                    }
                }
                SkipDecision::SkipOne => {
                    tracing::trace!(path = %rel_path, "skipping entry");
                }
                SkipDecision::Continue => {
                    return Some(Ok(WalkEntry {
                        rel_path,
                        is_dir,
                        depth,
                    }));
                }
            }
        }
    }
}

/// `/`-joined path of `path` below `root`, or "" for the root itself.
fn relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Totals from the counting pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanEstimate {
    pub items: usize,
    pub mutations: usize,
}

impl ScanEstimate {
    pub fn total_requests(&self) -> usize {
        self.items + self.mutations
    }

    /// Saturates at `Duration::MAX` for absurd delays or counts.
    pub fn eta(&self, delay: Duration) -> Duration {
        let requests = u32::try_from(self.total_requests()).unwrap_or(u32::MAX);
        delay
            .checked_add(ASSUMED_LATENCY)
            .and_then(|per_request| per_request.checked_mul(requests))
            .unwrap_or(Duration::MAX)
    }
}

/// Counting pass: same walk, no network.
pub fn count(config: &ScanConfig) -> Result<ScanEstimate, ScanError> {
    let mut estimate = ScanEstimate::default();
    for entry in SourceWalk::new(&config.source, &config.skip) {
        entry?;
        estimate.items += 1;
        estimate.mutations += config.mutations.len();
    }
    Ok(estimate)
}
