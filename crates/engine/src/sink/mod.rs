//! Output sinks: the channel between the engine and whoever is watching.
//!
//! The engine emits structured events (plain writes, leveled messages,
//! target blocks, the final summary) against the [`Sink`] trait and never
//! talks to stdout directly. The variant is chosen once at startup from the
//! host classification: a plain console sink locally, and per-provider
//! sinks that wrap writes and blocks in the provider's own markers
//! (workflow commands, service messages, folding directives).

pub mod console;
pub mod providers;
pub mod summary;

use std::sync::Arc;

use trestle_host::Host;

use console::ConsoleSink;
use providers::{AzurePipelinesSink, GitHubActionsSink, GitLabSink, TeamCitySink, TravisSink};
use summary::RunSummary;

/// Structured log events emitted by the engine and by target actions.
///
/// Implementations serialize concurrent writes internally; the relative
/// order of messages emitted by one target's action is preserved.
pub trait Sink: Send + Sync {
  /// Verbatim output line (e.g. streamed subprocess stdout).
  fn write(&self, text: &str);
  /// Low-importance diagnostics.
  fn trace(&self, text: &str);
  fn info(&self, text: &str);
  fn warn(&self, text: &str, details: Option<&str>);
  fn error(&self, text: &str, details: Option<&str>);
  fn success(&self, text: &str);
  /// Open a named target block. Prefer [`BlockGuard::open`], which closes
  /// the block on every exit path.
  fn block_opened(&self, name: &str);
  fn block_closed(&self, name: &str);
  /// Render the end-of-run table.
  fn write_summary(&self, summary: &RunSummary);
}

/// Scoped acquisition of a target block: the block is closed when the guard
/// drops, on normal return, error, and interrupt alike.
pub struct BlockGuard<'a> {
  sink: &'a dyn Sink,
  name: String,
}

impl<'a> BlockGuard<'a> {
  pub fn open(sink: &'a dyn Sink, name: impl Into<String>) -> Self {
    let name = name.into();
    sink.block_opened(&name);
    Self { sink, name }
  }
}

impl Drop for BlockGuard<'_> {
  fn drop(&mut self) {
    self.sink.block_closed(&self.name);
  }
}

/// Pick the sink variant for the detected host. Providers without a
/// block/annotation protocol fall back to the console sink.
pub fn for_host(host: Host) -> Arc<dyn Sink> {
  match host {
    Host::GitHubActions => Arc::new(GitHubActionsSink::new()),
    Host::TeamCity => Arc::new(TeamCitySink::new()),
    Host::Travis => Arc::new(TravisSink::new()),
    Host::GitLab => Arc::new(GitLabSink::new()),
    Host::AzurePipelines => Arc::new(AzurePipelinesSink::new()),
    Host::Console | Host::AppVeyor | Host::Bamboo | Host::Bitrise | Host::Jenkins => Arc::new(ConsoleSink::new()),
  }
}
