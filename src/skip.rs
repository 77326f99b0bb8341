// Skip rules for walked filesystem entries

/// Directory names never descended into.
const ALWAYS_SKIP_DIRS: &[&str] = &[".", "..", ".hg", ".git"];

/// What to do with one walked entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipDecision {
    /// Exclude the directory and everything below it.
    SkipTree,
    /// Exclude this entry only.
    SkipOne,
    Continue,
}

/// Filesystem-side skip configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipRules {
    /// Exact base names (files or directories).
    pub names: Vec<String>,
    /// Lower-cased, dot-prefixed extensions.
    pub extensions: Vec<String>,
    /// 0 means unlimited.
    pub max_depth: usize,
    pub dirs_only: bool,
}

/// The parts of a walked entry the rules look at.
#[derive(Debug, Clone, Copy)]
pub struct EntryInfo<'a> {
    pub name: &'a str,
    pub is_dir: bool,
    pub depth: usize,
    /// Root-relative, `/`-separated path.
    pub rel_path: &'a str,
}

/// Depth of a root-relative path: separators plus one.
pub fn depth_of(rel_path: &str) -> usize {
    rel_path.matches('/').count() + 1
}

/// Lower-cased extension including the leading dot, or "" if none.
pub fn extension_of(name: &str) -> String {
    match name.rfind('.') {
        Some(idx) => name[idx..].to_lowercase(),
        None => String::new(),
    }
}

impl SkipRules {
    /// First matching rule wins.
    pub fn evaluate(&self, entry: &EntryInfo<'_>) -> SkipDecision {
        if self.dirs_only && !entry.is_dir {
            return SkipDecision::SkipOne;
        }

        if entry.is_dir {
            if self.max_depth > 0 && entry.depth > self.max_depth {
                return SkipDecision::SkipTree;
            }
            if ALWAYS_SKIP_DIRS.contains(&entry.name) {
                return SkipDecision::SkipTree;
            }
        }

        if self.names.iter().any(|n| n == entry.name) {
            return if entry.is_dir {
                SkipDecision::SkipTree
            } else {
                SkipDecision::SkipOne
            };
        }

        if !entry.is_dir {
            let ext = extension_of(entry.name);
            if !ext.is_empty() && self.extensions.iter().any(|e| *e == ext) {
                return SkipDecision::SkipOne;
            }
        }

        SkipDecision::Continue
    }
}
