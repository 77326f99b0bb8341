pub mod models;
pub mod error;
pub mod config;
pub mod cli;
pub mod logging;
pub mod mutator;
pub mod skip;
pub mod walker;
pub mod engine;
pub mod verdict;
pub mod reporting;
pub mod scanner;

// Re-export commonly used items
pub use models::*;
pub use error::*;
pub use config::{ScanConfig, ScanOptions};
pub use mutator::mutate_path;
pub use skip::{SkipDecision, SkipRules};
pub use walker::{SourceWalk, WalkEntry, ScanEstimate};
pub use engine::{ProbeEngine, Prober};
pub use verdict::*;
pub use reporting::Reporter;
pub use scanner::{Scanner, ScanSummary};
