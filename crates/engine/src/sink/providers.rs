//! CI-provider sinks: console rendering wrapped in each provider's own
//! markers, so target blocks fold and failures surface as annotations in
//! the provider's UI.

use std::time::{SystemTime, UNIX_EPOCH};

use super::Sink;
use super::console::ConsoleSink;
use super::summary::RunSummary;

/// Slug usable in fold/section names: lowercase alphanumerics and dashes.
fn slug(name: &str) -> String {
  name
    .chars()
    .map(|c| {
      if c.is_ascii_alphanumeric() {
        c.to_ascii_lowercase()
      } else {
        '-'
      }
    })
    .collect()
}

fn unix_now() -> u64 {
  SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}

/// GitHub Actions: workflow commands (`::group::`, `::error::`,
/// `::warning::`). Command data must escape `%`, `\r` and `\n`.
pub struct GitHubActionsSink {
  inner: ConsoleSink,
}

fn github_escape(data: &str) -> String {
  data.replace('%', "%25").replace('\r', "%0D").replace('\n', "%0A")
}

impl GitHubActionsSink {
  pub fn new() -> Self {
    Self { inner: ConsoleSink::new() }
  }
}

impl Default for GitHubActionsSink {
  fn default() -> Self {
    Self::new()
  }
}

impl Sink for GitHubActionsSink {
  fn write(&self, text: &str) {
    self.inner.write(text);
  }

  fn trace(&self, text: &str) {
    self.inner.trace(text);
  }

  fn info(&self, text: &str) {
    self.inner.info(text);
  }

  fn warn(&self, text: &str, details: Option<&str>) {
    self.inner.write(&format!("::warning::{}", github_escape(text)));
    if let Some(details) = details {
      self.inner.warn(text, Some(details));
    }
  }

  fn error(&self, text: &str, details: Option<&str>) {
    self.inner.write(&format!("::error::{}", github_escape(text)));
    if let Some(details) = details {
      self.inner.error(text, Some(details));
    }
  }

  fn success(&self, text: &str) {
    self.inner.success(text);
  }

  fn block_opened(&self, name: &str) {
    self.inner.write(&format!("::group::{}", github_escape(name)));
  }

  fn block_closed(&self, _name: &str) {
    self.inner.write("::endgroup::");
  }

  fn write_summary(&self, summary: &RunSummary) {
    self.inner.write_summary(summary);
  }
}

/// TeamCity: service messages. Values escape `|`, quotes, brackets and
/// newlines with a leading `|`.
pub struct TeamCitySink {
  inner: ConsoleSink,
}

fn teamcity_escape(value: &str) -> String {
  let mut out = String::with_capacity(value.len());
  for c in value.chars() {
    match c {
      '|' => out.push_str("||"),
      '\'' => out.push_str("|'"),
      '[' => out.push_str("|["),
      ']' => out.push_str("|]"),
      '\n' => out.push_str("|n"),
      '\r' => out.push_str("|r"),
      _ => out.push(c),
    }
  }
  out
}

impl TeamCitySink {
  pub fn new() -> Self {
    Self { inner: ConsoleSink::new() }
  }
}

impl Default for TeamCitySink {
  fn default() -> Self {
    Self::new()
  }
}

impl Sink for TeamCitySink {
  fn write(&self, text: &str) {
    self.inner.write(text);
  }

  fn trace(&self, text: &str) {
    self.inner.trace(text);
  }

  fn info(&self, text: &str) {
    self.inner.info(text);
  }

  fn warn(&self, text: &str, details: Option<&str>) {
    let mut message = format!("##teamcity[message text='{}' status='WARNING']", teamcity_escape(text));
    if let Some(details) = details {
      message = format!(
        "##teamcity[message text='{}' errorDetails='{}' status='WARNING']",
        teamcity_escape(text),
        teamcity_escape(details)
      );
    }
    self.inner.write(&message);
  }

  fn error(&self, text: &str, details: Option<&str>) {
    let message = match details {
      Some(details) => format!(
        "##teamcity[message text='{}' errorDetails='{}' status='ERROR']",
        teamcity_escape(text),
        teamcity_escape(details)
      ),
      None => format!("##teamcity[message text='{}' status='ERROR']", teamcity_escape(text)),
    };
    self.inner.write(&message);
  }

  fn success(&self, text: &str) {
    self.inner.success(text);
  }

  fn block_opened(&self, name: &str) {
    self.inner.write(&format!("##teamcity[blockOpened name='{}']", teamcity_escape(name)));
  }

  fn block_closed(&self, name: &str) {
    self.inner.write(&format!("##teamcity[blockClosed name='{}']", teamcity_escape(name)));
  }

  fn write_summary(&self, summary: &RunSummary) {
    self.inner.write_summary(summary);
  }
}

/// Travis CI: fold directives around target blocks.
pub struct TravisSink {
  inner: ConsoleSink,
}

impl TravisSink {
  pub fn new() -> Self {
    Self { inner: ConsoleSink::new() }
  }
}

impl Default for TravisSink {
  fn default() -> Self {
    Self::new()
  }
}

impl Sink for TravisSink {
  fn write(&self, text: &str) {
    self.inner.write(text);
  }

  fn trace(&self, text: &str) {
    self.inner.trace(text);
  }

  fn info(&self, text: &str) {
    self.inner.info(text);
  }

  fn warn(&self, text: &str, details: Option<&str>) {
    self.inner.warn(text, details);
  }

  fn error(&self, text: &str, details: Option<&str>) {
    self.inner.error(text, details);
  }

  fn success(&self, text: &str) {
    self.inner.success(text);
  }

  fn block_opened(&self, name: &str) {
    self.inner.write(&format!("travis_fold:start:{}", slug(name)));
    self.inner.block_opened(name);
  }

  fn block_closed(&self, name: &str) {
    self.inner.write(&format!("travis_fold:end:{}", slug(name)));
  }

  fn write_summary(&self, summary: &RunSummary) {
    self.inner.write_summary(summary);
  }
}

/// GitLab CI: collapsible sections with unix timestamps.
pub struct GitLabSink {
  inner: ConsoleSink,
}

impl GitLabSink {
  pub fn new() -> Self {
    Self { inner: ConsoleSink::new() }
  }
}

impl Default for GitLabSink {
  fn default() -> Self {
    Self::new()
  }
}

impl Sink for GitLabSink {
  fn write(&self, text: &str) {
    self.inner.write(text);
  }

  fn trace(&self, text: &str) {
    self.inner.trace(text);
  }

  fn info(&self, text: &str) {
    self.inner.info(text);
  }

  fn warn(&self, text: &str, details: Option<&str>) {
    self.inner.warn(text, details);
  }

  fn error(&self, text: &str, details: Option<&str>) {
    self.inner.error(text, details);
  }

  fn success(&self, text: &str) {
    self.inner.success(text);
  }

  fn block_opened(&self, name: &str) {
    self
      .inner
      .write(&format!("\x1b[0Ksection_start:{}:{}\r\x1b[0K{}", unix_now(), slug(name), name));
  }

  fn block_closed(&self, name: &str) {
    self
      .inner
      .write(&format!("\x1b[0Ksection_end:{}:{}\r\x1b[0K", unix_now(), slug(name)));
  }

  fn write_summary(&self, summary: &RunSummary) {
    self.inner.write_summary(summary);
  }
}

/// Azure Pipelines: `##[group]` blocks and `##[error]`/`##[warning]`
/// logging commands.
pub struct AzurePipelinesSink {
  inner: ConsoleSink,
}

impl AzurePipelinesSink {
  pub fn new() -> Self {
    Self { inner: ConsoleSink::new() }
  }
}

impl Default for AzurePipelinesSink {
  fn default() -> Self {
    Self::new()
  }
}

impl Sink for AzurePipelinesSink {
  fn write(&self, text: &str) {
    self.inner.write(text);
  }

  fn trace(&self, text: &str) {
    self.inner.trace(text);
  }

  fn info(&self, text: &str) {
    self.inner.info(text);
  }

  fn warn(&self, text: &str, details: Option<&str>) {
    self.inner.write(&format!("##[warning]{text}"));
    if let Some(details) = details {
      self.inner.warn(text, Some(details));
    }
  }

  fn error(&self, text: &str, details: Option<&str>) {
    self.inner.write(&format!("##[error]{text}"));
    if let Some(details) = details {
      self.inner.error(text, Some(details));
    }
  }

  fn success(&self, text: &str) {
    self.inner.success(text);
  }

  fn block_opened(&self, name: &str) {
    self.inner.write(&format!("##[group]{name}"));
  }

  fn block_closed(&self, _name: &str) {
    self.inner.write("##[endgroup]");
  }

  fn write_summary(&self, summary: &RunSummary) {
    self.inner.write_summary(summary);
  }
}
