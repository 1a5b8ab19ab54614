//! Subprocess contract for tool wrappers.
//!
//! Actions spawn external tools through [`ProcessCommand`]: the child's
//! stdout and stderr are streamed through the run's sink line by line while
//! the process runs, and [`RunningProcess::wait`] returns the exit code.
//! An action that does not tolerate a non-zero exit turns it into a target
//! failure via [`ProcessExit::ensure_success`].

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::context::RunContext;
use crate::sink::Sink;

#[derive(Debug, Error)]
pub enum ProcessError {
  #[error("failed to start '{program}': {source}")]
  Spawn {
    program: String,
    #[source]
    source: std::io::Error,
  },

  #[error("failed while waiting for '{program}': {source}")]
  Wait {
    program: String,
    #[source]
    source: std::io::Error,
  },

  #[error("'{program}' exited with code {code:?}")]
  NonZeroExit { program: String, code: Option<i32> },
}

/// Builder for one external tool invocation.
pub struct ProcessCommand {
  program: String,
  args: Vec<String>,
  working_dir: Option<PathBuf>,
  envs: Vec<(String, String)>,
}

impl ProcessCommand {
  pub fn new(program: impl Into<String>) -> Self {
    Self {
      program: program.into(),
      args: Vec::new(),
      working_dir: None,
      envs: Vec::new(),
    }
  }

  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.args.push(arg.into());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.working_dir = Some(dir.into());
    self
  }

  pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.envs.push((key.into(), value.into()));
    self
  }

  /// Spawn the child with piped output streaming through the run's sink.
  pub fn spawn(self, ctx: &RunContext) -> Result<RunningProcess, ProcessError> {
    info!(program = %self.program, args = ?self.args, "starting process");

    let mut command = Command::new(&self.program);
    command
      .args(&self.args)
      .stdin(Stdio::null())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped());
    if let Some(dir) = &self.working_dir {
      command.current_dir(dir);
    }
    for (key, value) in &self.envs {
      command.env(key, value);
    }

    let mut child = command.spawn().map_err(|source| ProcessError::Spawn {
      program: self.program.clone(),
      source,
    })?;

    let mut readers = Vec::new();
    if let Some(stdout) = child.stdout.take() {
      readers.push(stream_lines(stdout, ctx.sink().clone(), false));
    }
    if let Some(stderr) = child.stderr.take() {
      readers.push(stream_lines(stderr, ctx.sink().clone(), true));
    }

    Ok(RunningProcess {
      program: self.program,
      child,
      readers,
    })
  }

  /// Spawn and wait in one step.
  pub async fn run(self, ctx: &RunContext) -> Result<ProcessExit, ProcessError> {
    self.spawn(ctx)?.wait().await
  }
}

fn stream_lines<R>(reader: R, sink: Arc<dyn Sink>, is_stderr: bool) -> JoinHandle<()>
where
  R: AsyncRead + Unpin + Send + 'static,
{
  tokio::spawn(async move {
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
      if is_stderr {
        sink.warn(&line, None);
      } else {
        sink.write(&line);
      }
    }
  })
}

/// Handle to a spawned child process.
pub struct RunningProcess {
  program: String,
  child: Child,
  readers: Vec<JoinHandle<()>>,
}

impl RunningProcess {
  /// Wait for exit, draining the output streams first so every line reaches
  /// the sink before the exit code is observed.
  pub async fn wait(mut self) -> Result<ProcessExit, ProcessError> {
    for reader in self.readers.drain(..) {
      let _ = reader.await;
    }
    let status = self.child.wait().await.map_err(|source| ProcessError::Wait {
      program: self.program.clone(),
      source,
    })?;

    debug!(program = %self.program, code = ?status.code(), "process exited");
    Ok(ProcessExit {
      program: self.program,
      code: status.code(),
    })
  }
}

/// Exit record of a finished process.
#[derive(Debug, Clone)]
pub struct ProcessExit {
  pub program: String,
  /// Exit code; `None` when terminated by a signal.
  pub code: Option<i32>,
}

impl ProcessExit {
  pub fn success(&self) -> bool {
    self.code == Some(0)
  }

  pub fn ensure_success(self) -> Result<Self, ProcessError> {
    if self.success() {
      Ok(self)
    } else {
      Err(ProcessError::NonZeroExit {
        program: self.program,
        code: self.code,
      })
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::params;
  use crate::sink::summary::RunSummary;
  use std::sync::Mutex;
  use trestle_host::Host;

  #[derive(Default)]
  struct Recorder {
    out: Mutex<Vec<String>>,
    err: Mutex<Vec<String>>,
  }

  impl Sink for Recorder {
    fn write(&self, text: &str) {
      self.out.lock().unwrap().push(text.to_string());
    }
    fn trace(&self, _text: &str) {}
    fn info(&self, _text: &str) {}
    fn warn(&self, text: &str, _details: Option<&str>) {
      self.err.lock().unwrap().push(text.to_string());
    }
    fn error(&self, _text: &str, _details: Option<&str>) {}
    fn success(&self, _text: &str) {}
    fn block_opened(&self, _name: &str) {}
    fn block_closed(&self, _name: &str) {}
    fn write_summary(&self, _summary: &RunSummary) {}
  }

  fn test_context(sink: Arc<Recorder>) -> RunContext {
    let params = params::bind(&[], &[]).unwrap();
    RunContext::new("test".to_string(), Host::Console, false, params, sink)
  }

  #[cfg(unix)]
  fn shell(script: &str) -> ProcessCommand {
    ProcessCommand::new("/bin/sh").arg("-c").arg(script)
  }

  #[cfg(unix)]
  #[tokio::test]
  async fn streams_stdout_in_order() {
    let sink = Arc::new(Recorder::default());
    let ctx = test_context(sink.clone());

    let exit = shell("echo one; echo two").run(&ctx).await.unwrap();

    assert!(exit.success());
    assert_eq!(*sink.out.lock().unwrap(), vec!["one", "two"]);
  }

  #[cfg(unix)]
  #[tokio::test]
  async fn streams_stderr_through_warn() {
    let sink = Arc::new(Recorder::default());
    let ctx = test_context(sink.clone());

    shell("echo oops 1>&2").run(&ctx).await.unwrap();

    assert_eq!(*sink.err.lock().unwrap(), vec!["oops"]);
  }

  #[cfg(unix)]
  #[tokio::test]
  async fn nonzero_exit_surfaces_through_ensure_success() {
    let sink = Arc::new(Recorder::default());
    let ctx = test_context(sink.clone());

    let exit = shell("exit 3").run(&ctx).await.unwrap();
    assert!(!exit.success());
    assert_eq!(exit.code, Some(3));

    let err = exit.ensure_success().unwrap_err();
    assert!(matches!(err, ProcessError::NonZeroExit { code: Some(3), .. }));
  }

  #[cfg(unix)]
  #[tokio::test]
  async fn env_and_working_dir_are_applied() {
    let sink = Arc::new(Recorder::default());
    let ctx = test_context(sink.clone());
    let dir = tempfile::tempdir().unwrap();

    shell("echo $TRESTLE_TEST_VAR; pwd")
      .env("TRESTLE_TEST_VAR", "hello")
      .working_dir(dir.path())
      .run(&ctx)
      .await
      .unwrap();

    let out = sink.out.lock().unwrap();
    assert_eq!(out[0], "hello");
    assert!(out[1].ends_with(dir.path().file_name().unwrap().to_str().unwrap()));
  }

  #[tokio::test]
  async fn missing_program_is_a_spawn_error() {
    let sink = Arc::new(Recorder::default());
    let ctx = test_context(sink.clone());

    let err = ProcessCommand::new("trestle-definitely-not-a-program").run(&ctx).await.unwrap_err();
    assert!(matches!(err, ProcessError::Spawn { .. }));
  }
}
