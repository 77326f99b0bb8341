// Probing pass for mirrorprobe
// Walks the source tree once more and probes every candidate path of
// every surviving entry, strictly one request at a time.

use std::io::Write;

use crate::config::ScanConfig;
use crate::engine::Prober;
use crate::error::ScanError;
use crate::models::Method;
use crate::mutator::mutate_path;
use crate::reporting::Reporter;
use crate::verdict::{decide_verdict, render_progress_line, render_report_line, Verdict};
use crate::walker::SourceWalk;

/// Counters for the end banner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub items: usize,
    pub requests: usize,
    pub reported: usize,
    pub suppressed: usize,
    pub failed: usize,
}

pub struct Scanner<'a, P: Prober, W: Write> {
    config: &'a ScanConfig,
    method: Method,
    prober: &'a P,
    reporter: &'a mut Reporter<W>,
    summary: ScanSummary,
}

impl<'a, P: Prober, W: Write> Scanner<'a, P, W> {
    pub fn new(config: &'a ScanConfig, prober: &'a P, reporter: &'a mut Reporter<W>) -> Self {
        Self {
            config,
            method: config.effective_method(),
            prober,
            reporter,
            summary: ScanSummary::default(),
        }
    }

    /// Run the probing pass.
    ///
    /// A failing walk stops here with the error; whatever was already
    /// reported stays valid. The summary so far is returned either way.
    pub fn run(mut self) -> (ScanSummary, Result<(), ScanError>) {
        let result = self.walk();
        (self.summary, result)
    }

    fn walk(&mut self) -> Result<(), ScanError> {
        for entry in SourceWalk::new(&self.config.source, &self.config.skip) {
            let entry = entry?;
            self.summary.items += 1;
            for candidate in mutate_path(&entry.rel_path, &self.config.mutations) {
                self.probe_candidate(&candidate)?;
            }
        }
        Ok(())
    }

    fn probe_candidate(&mut self, path: &str) -> Result<(), ScanError> {
        let url = format!("{}{}", self.config.endpoint, path);
        self.summary.requests += 1;

        let result = match self.prober.probe(self.method, &url) {
            Ok(result) => result,
            Err(e) => {
                self.summary.failed += 1;
                tracing::debug!(url = %url, error = %e, "probe failed");
                self.reporter
                    .error(&format!("[FETCH] {} {} -- {}", self.method, url, e))?;
                return Ok(());
            }
        };

        match decide_verdict(&result, &self.config.filter, self.method) {
            Verdict::Suppress => {
                self.summary.suppressed += 1;
                let line = render_progress_line(
                    self.method,
                    &result,
                    &self.config.endpoint,
                    path,
                    self.reporter.paint(),
                );
                self.reporter.progress(&line)?;
            }
            Verdict::Report => {
                self.summary.reported += 1;
                let painted = render_report_line(self.method, &result, &url, true);
                let plain = render_report_line(self.method, &result, &url, false);
                self.reporter.report(&painted, &plain)?;
            }
        }

        Ok(())
    }
}
