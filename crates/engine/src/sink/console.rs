//! Plain console sink, used locally and by providers without a marker
//! protocol.

use std::sync::Mutex;

use owo_colors::{OwoColorize, Stream};

use super::summary::{self, RunSummary};
use super::Sink;

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const WARNING: &str = "⚠";
  pub const INFO: &str = "•";
  pub const ARROW: &str = "→";
}

/// Console sink. A single gate serializes writes so interleaved multi-line
/// output (details, summary table) stays contiguous.
pub struct ConsoleSink {
  gate: Mutex<()>,
}

impl ConsoleSink {
  pub fn new() -> Self {
    Self { gate: Mutex::new(()) }
  }
}

impl Default for ConsoleSink {
  fn default() -> Self {
    Self::new()
  }
}

impl Sink for ConsoleSink {
  fn write(&self, text: &str) {
    let _gate = self.gate.lock().unwrap();
    println!("{text}");
  }

  fn trace(&self, text: &str) {
    let _gate = self.gate.lock().unwrap();
    println!("{}", text.if_supports_color(Stream::Stdout, |s| s.dimmed()));
  }

  fn info(&self, text: &str) {
    let _gate = self.gate.lock().unwrap();
    println!("{} {}", symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()), text);
  }

  fn warn(&self, text: &str, details: Option<&str>) {
    let _gate = self.gate.lock().unwrap();
    eprintln!(
      "{} {}",
      symbols::WARNING.if_supports_color(Stream::Stderr, |s| s.yellow()),
      text.if_supports_color(Stream::Stderr, |s| s.yellow())
    );
    if let Some(details) = details {
      for line in details.lines() {
        eprintln!("  {}", line.if_supports_color(Stream::Stderr, |s| s.yellow()));
      }
    }
  }

  fn error(&self, text: &str, details: Option<&str>) {
    let _gate = self.gate.lock().unwrap();
    eprintln!(
      "{} {}",
      symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
      text.if_supports_color(Stream::Stderr, |s| s.red())
    );
    if let Some(details) = details {
      for line in details.lines() {
        eprintln!("  {}", line.if_supports_color(Stream::Stderr, |s| s.red()));
      }
    }
  }

  fn success(&self, text: &str) {
    let _gate = self.gate.lock().unwrap();
    println!(
      "{} {}",
      symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
      text
    );
  }

  fn block_opened(&self, name: &str) {
    let _gate = self.gate.lock().unwrap();
    println!();
    println!(
      "{} {}",
      symbols::ARROW.if_supports_color(Stream::Stdout, |s| s.cyan()),
      name.if_supports_color(Stream::Stdout, |s| s.bold())
    );
  }

  fn block_closed(&self, _name: &str) {
    // The next block opening provides the visual separation locally.
  }

  fn write_summary(&self, summary: &RunSummary) {
    let _gate = self.gate.lock().unwrap();
    for line in summary::render(summary) {
      println!("{line}");
    }
  }
}
