//! Console output for seeding runs
//!
//! The seeder reports through the [`Ui`] trait so the same run can drive
//! progress bars on a terminal or stay quiet in tests and `--json` mode.

use indicatif::{ProgressBar, ProgressStyle};

use crate::seeder::TableReport;

/// Trait for UI implementations - allows both console and silent/test modes
pub trait Ui {
    fn table_started(&mut self, table: &str, requested: u64);
    fn set_progress(&mut self, current: u64);
    /// Called once per table with the line reported to the operator
    fn table_completed(&mut self, report: &TableReport);
}

/// Progress bar per table, replaced by a completion line when the table is done
pub struct ConsoleUi {
    style: ProgressStyle,
    current: Option<ProgressBar>,
}

impl ConsoleUi {
    pub fn new() -> Self {
        let style = ProgressStyle::default_bar()
            .template("{msg:30} [{bar:40.cyan/blue}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");

        Self {
            style,
            current: None,
        }
    }
}

impl Default for ConsoleUi {
    fn default() -> Self {
        Self::new()
    }
}

impl Ui for ConsoleUi {
    fn table_started(&mut self, table: &str, requested: u64) {
        let pb = ProgressBar::new(requested);
        pb.set_style(self.style.clone());
        pb.set_message(table.to_string());
        self.current = Some(pb);
    }

    fn set_progress(&mut self, current: u64) {
        if let Some(pb) = &self.current {
            pb.set_position(current);
        }
    }

    fn table_completed(&mut self, report: &TableReport) {
        if let Some(pb) = self.current.take() {
            pb.finish_and_clear();
        }
        println!("{}", report);
    }
}

/// Silent UI implementation for testing and non-interactive use.
///
/// Completion lines are kept so callers can inspect what would have been shown.
#[derive(Default)]
pub struct SilentUi {
    lines: Vec<String>,
}

impl SilentUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl Ui for SilentUi {
    fn table_started(&mut self, _table: &str, _requested: u64) {}
    fn set_progress(&mut self, _current: u64) {}
    fn table_completed(&mut self, report: &TableReport) {
        self.lines.push(report.to_string());
    }
}
