//! End-of-run summary: per-target rows, totals, and table rendering.

use std::time::Duration;

use chrono::Local;
use owo_colors::{OwoColorize, Stream};
use serde::Serialize;

use crate::build::BuildDefinition;
use crate::target::TargetStatus;

/// One row of the summary table.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryRow {
  pub target: String,
  pub status: TargetStatus,
  pub duration: Duration,
}

/// The complete result of one run, renderable as a table or as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
  pub build: String,
  pub rows: Vec<SummaryRow>,
  pub total: Duration,
  pub succeeded: bool,
  pub finished_at: String,
}

impl RunSummary {
  /// Collect the summary from the build after the executor finished (or
  /// stopped). Overall success iff no target in the execution list ended
  /// `Failed` or `NotRun`.
  pub(crate) fn from_run(build: &BuildDefinition, order: &[usize]) -> Self {
    let rows: Vec<SummaryRow> = order
      .iter()
      .map(|&i| {
        let target = &build.targets()[i];
        SummaryRow {
          target: target.name.clone(),
          status: target.status,
          duration: target.duration,
        }
      })
      .collect();

    let total = rows.iter().map(|r| r.duration).sum();
    let succeeded = rows
      .iter()
      .all(|r| !matches!(r.status, TargetStatus::Failed | TargetStatus::NotRun));

    Self {
      build: build.name.clone(),
      rows,
      total,
      succeeded,
      finished_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    }
  }
}

pub fn format_duration(duration: Duration) -> String {
  let secs = duration.as_secs();
  let millis = duration.subsec_millis();

  if secs >= 60 {
    format!("{}m {}s", secs / 60, secs % 60)
  } else if secs > 0 {
    format!("{}.{:02}s", secs, millis / 10)
  } else {
    format!("{}ms", millis)
  }
}

fn status_cell(status: TargetStatus, width: usize) -> String {
  let padded = format!("{:<width$}", status.as_str());
  match status {
    TargetStatus::Executed => padded.if_supports_color(Stream::Stdout, |s| s.green()).to_string(),
    TargetStatus::Failed => padded.if_supports_color(Stream::Stdout, |s| s.red()).to_string(),
    TargetStatus::Skipped => padded.if_supports_color(Stream::Stdout, |s| s.yellow()).to_string(),
    TargetStatus::NotRun => padded.if_supports_color(Stream::Stdout, |s| s.cyan()).to_string(),
    TargetStatus::Absent => padded.if_supports_color(Stream::Stdout, |s| s.dimmed()).to_string(),
  }
}

/// Render the summary: banner line, table, total row.
pub(crate) fn render(summary: &RunSummary) -> Vec<String> {
  let mut lines = Vec::new();

  let banner = if summary.succeeded {
    format!("Build succeeded on {}", summary.finished_at)
      .if_supports_color(Stream::Stdout, |s| s.green())
      .to_string()
  } else {
    format!("Build failed on {}", summary.finished_at)
      .if_supports_color(Stream::Stdout, |s| s.red())
      .to_string()
  };
  lines.push(String::new());
  lines.push(banner);
  lines.push(String::new());

  let name_width = summary
    .rows
    .iter()
    .map(|r| r.target.len())
    .chain(["Target".len(), "Total".len()])
    .max()
    .unwrap_or(6);
  let status_width = "Executed".len();
  let duration_width = summary
    .rows
    .iter()
    .map(|r| format_duration(r.duration).len())
    .chain([format_duration(summary.total).len(), "Duration".len()])
    .max()
    .unwrap_or(8);

  let rule = "─".repeat(name_width + status_width + duration_width + 4);
  lines.push(rule.clone());
  lines.push(format!(
    "{:<name_width$}  {:<status_width$}  {:>duration_width$}",
    "Target", "Status", "Duration"
  ));
  lines.push(rule.clone());

  for row in &summary.rows {
    lines.push(format!(
      "{:<name_width$}  {}  {:>duration_width$}",
      row.target,
      status_cell(row.status, status_width),
      format_duration(row.duration)
    ));
  }

  lines.push(rule);
  lines.push(format!(
    "{:<name_width$}  {:<status_width$}  {:>duration_width$}",
    "Total",
    "",
    format_duration(summary.total)
  ));

  lines
}
