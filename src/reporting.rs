// Reporting and output for mirrorprobe
// Two channels: the report (terminal + optional report file, append-only)
// and transient progress lines that overwrite each other in place.

use chrono::Local;
use colored::*;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use crate::config::ScanConfig;
use crate::models::Method;
use crate::scanner::ScanSummary;
use crate::verdict::SizeRule;
use crate::walker::ScanEstimate;

const RULE_WIDTH: usize = 80;

pub struct Reporter<W: Write> {
    out: W,
    report: Option<File>,
    paint: bool,
    /// Length of the progress line currently on screen.
    last_line_len: usize,
}

impl Reporter<io::Stdout> {
    pub fn stdout(report_path: Option<&Path>) -> io::Result<Self> {
        let report = match report_path {
            Some(path) => Some(open_report(path)?),
            None => None,
        };
        Ok(Self::new(io::stdout(), report, true))
    }
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, report: Option<File>, paint: bool) -> Self {
        Self {
            out,
            report,
            paint,
            last_line_len: 0,
        }
    }

    pub fn paint(&self) -> bool {
        self.paint
    }

    /// Append a line to the terminal and the report file. `plain` is what
    /// lands in the file; `painted` is shown on the terminal.
    pub fn report(&mut self, painted: &str, plain: &str) -> io::Result<()> {
        self.clear_progress()?;
        writeln!(self.out, "{}", if self.paint { painted } else { plain })?;
        if let Some(file) = self.report.as_mut() {
            writeln!(file, "{}", plain)?;
        }
        Ok(())
    }

    /// Replace the current progress line.
    pub fn progress(&mut self, line: &str) -> io::Result<()> {
        self.clear_progress()?;
        write!(self.out, "{}", line)?;
        self.out.flush()?;
        self.last_line_len = line.chars().count();
        Ok(())
    }

    /// Terminal-only line, not part of the report.
    pub fn note(&mut self, line: &str) -> io::Result<()> {
        self.clear_progress()?;
        writeln!(self.out, "{}", line)
    }

    pub fn rule(&mut self) -> io::Result<()> {
        self.note(&"-".repeat(RULE_WIDTH))
    }

    pub fn error(&mut self, message: &str) -> io::Result<()> {
        let plain = format!("ERR: {}", message);
        let painted = plain.red().to_string();
        self.report(&painted, &plain)
    }

    pub fn start_banner(&mut self, estimate: &ScanEstimate, delay: Duration) -> io::Result<()> {
        let line = format!(
            "(START) {} -- ({} items + {} mutations) ~ETA {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            estimate.items,
            estimate.mutations,
            format_duration(estimate.eta(delay)),
        );
        self.report(&line, &line)
    }

    pub fn end_banner(&mut self, summary: &ScanSummary) -> io::Result<()> {
        let line = format!(
            "(END) {} -- {} items, {} requests: {} reported, {} suppressed, {} failed",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            summary.items,
            summary.requests,
            summary.reported,
            summary.suppressed,
            summary.failed,
        );
        self.report(&line, &line)
    }

    /// Echo the effective settings as a label/value table.
    pub fn settings(&mut self, config: &ScanConfig, method: Method) -> io::Result<()> {
        let rows = settings_rows(config, method);
        self.rule()?;
        for (label, value) in rows {
            let line = if self.paint {
                format!("{}: {}", format!("{:>20}", label).cyan(), value.bright_cyan())
            } else {
                format!("{:>20}: {}", label, value)
            };
            self.note(&line)?;
        }
        self.rule()
    }

    fn clear_progress(&mut self) -> io::Result<()> {
        if self.last_line_len > 0 {
            write!(self.out, "\r{}\r", " ".repeat(self.last_line_len))?;
            self.last_line_len = 0;
        }
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn open_report(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn settings_rows(config: &ScanConfig, method: Method) -> Vec<(&'static str, String)> {
    let sizes: Vec<String> = config
        .filter
        .sizes
        .iter()
        .map(|s| match s {
            SizeRule::Exact(v) => v.clone(),
            SizeRule::Range(low, high) => format!("{}-{}", low, high),
        })
        .collect();
    let headers: Vec<String> = config
        .headers
        .iter()
        .map(|h| format!("{}:{}", h.name, h.value))
        .collect();

    vec![
        ("URL", config.endpoint.clone()),
        ("Source path", config.source.display().to_string()),
        ("Method", method.to_string()),
        ("Depth scan", config.skip.max_depth.to_string()),
        ("Dir only", config.skip.dirs_only.to_string()),
        ("Delay", format!("{} (ms)", config.delay.as_millis())),
        ("Timeout", format!("{} (s)", config.timeout.as_secs())),
        ("Ignore dir/files", counted(&config.skip.names)),
        ("Ignore extensions", counted(&config.skip.extensions)),
        ("Ignore by HTTP Code", counted(&config.filter.codes)),
        ("Ignore by size", counted(&sizes)),
        ("Ignore by content", config.filter.content.clone().unwrap_or_default()),
        ("Mutation options", counted(&config.mutations)),
        ("User-Agent", config.user_agent.clone()),
        ("Cookie", config.cookie.clone()),
        ("Headers", counted(&headers)),
        (
            "Report output",
            config
                .report_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        ),
    ]
}

fn counted(items: &[String]) -> String {
    format!("({}) {}", items.len(), items.join(", "))
}

/// `95s` → `1m35s`.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{}h{}m{}s", h, m, s)
    } else if m > 0 {
        format!("{}m{}s", m, s)
    } else {
        format!("{}s", s)
    }
}
