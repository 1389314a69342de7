use crate::types::{format_ticks, Phase, Ticks};
use std::io::{self, Write};

/// Human-readable console output of a session.
///
/// Progress lines are rewritten in place; every other line first terminates a
/// pending progress line.
pub trait ProgressReporter {
    fn banner(&mut self, text: &str);
    fn detail(&mut self, label: &str, value: &str);
    fn status(&mut self, old: Phase, new: Phase);
    fn progress(&mut self, label: &str, position: Ticks);
    /// Terminate the pending progress line, if any.
    fn end_line(&mut self);
}

/// Writes to stdout.
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    line_pending: bool,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self::default()
    }

    fn write_line(&mut self, line: &str) {
        self.end_line();
        let mut out = io::stdout().lock();
        let _ = writeln!(out, "{}", line);
    }
}

impl ProgressReporter for ConsoleReporter {
    fn banner(&mut self, text: &str) {
        self.write_line(text);
    }

    fn detail(&mut self, label: &str, value: &str) {
        self.write_line(&format!("  {}: {}", label, value));
    }

    fn status(&mut self, old: Phase, new: Phase) {
        self.write_line(&format!("  Status: {} > {}", old, new));
    }

    fn progress(&mut self, label: &str, position: Ticks) {
        let mut out = io::stdout().lock();
        let _ = write!(out, "  {}: {}\r", label, format_ticks(position));
        let _ = out.flush();
        self.line_pending = true;
    }

    fn end_line(&mut self) {
        if self.line_pending {
            let mut out = io::stdout().lock();
            let _ = writeln!(out);
            self.line_pending = false;
        }
    }
}

impl<R: ProgressReporter + ?Sized> ProgressReporter for &mut R {
    fn banner(&mut self, text: &str) {
        (**self).banner(text);
    }

    fn detail(&mut self, label: &str, value: &str) {
        (**self).detail(label, value);
    }

    fn status(&mut self, old: Phase, new: Phase) {
        (**self).status(old, new);
    }

    fn progress(&mut self, label: &str, position: Ticks) {
        (**self).progress(label, position);
    }

    fn end_line(&mut self) {
        (**self).end_line();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReportEntry {
    Banner(String),
    Detail { label: String, value: String },
    Status { old: Phase, new: Phase },
    Progress { label: String, position: Ticks },
    LineBreak,
}

/// Keeps every report in memory instead of printing it.
#[derive(Debug, Default)]
pub struct ReportLog {
    entries: Vec<ReportEntry>,
}

impl ReportLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn progress_positions(&self) -> Vec<Ticks> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                ReportEntry::Progress { position, .. } => Some(*position),
                _ => None,
            })
            .collect()
    }

    pub fn detail(&self, label: &str) -> Option<&str> {
        self.entries.iter().rev().find_map(|entry| match entry {
            ReportEntry::Detail { label: l, value } if l == label => Some(value.as_str()),
            _ => None,
        })
    }
}

impl ProgressReporter for ReportLog {
    fn banner(&mut self, text: &str) {
        self.entries.push(ReportEntry::Banner(text.to_string()));
    }

    fn detail(&mut self, label: &str, value: &str) {
        self.entries.push(ReportEntry::Detail {
            label: label.to_string(),
            value: value.to_string(),
        });
    }

    fn status(&mut self, old: Phase, new: Phase) {
        self.entries.push(ReportEntry::Status { old, new });
    }

    fn progress(&mut self, label: &str, position: Ticks) {
        self.entries.push(ReportEntry::Progress {
            label: label.to_string(),
            position,
        });
    }

    fn end_line(&mut self) {
        self.entries.push(ReportEntry::LineBreak);
    }
}
