//! Run context passed to conditions and actions.
//!
//! There is no global build singleton: everything an action may consult
//! (bound parameters, host classification, the output sink) travels through
//! an explicit [`RunContext`] argument.

use std::sync::Arc;

use trestle_host::Host;

use crate::params::{ParamError, Params};
use crate::sink::Sink;

pub struct RunContext {
  build_name: String,
  host: Host,
  strict: bool,
  params: Params,
  sink: Arc<dyn Sink>,
}

impl RunContext {
  pub(crate) fn new(build_name: String, host: Host, strict: bool, params: Params, sink: Arc<dyn Sink>) -> Self {
    Self {
      build_name,
      host,
      strict,
      params,
      sink,
    }
  }

  pub fn build_name(&self) -> &str {
    &self.build_name
  }

  pub fn host(&self) -> Host {
    self.host
  }

  /// True when a CI provider is driving the run.
  pub fn is_ci(&self) -> bool {
    self.host.is_ci()
  }

  pub fn strict(&self) -> bool {
    self.strict
  }

  pub fn sink(&self) -> &Arc<dyn Sink> {
    &self.sink
  }

  pub fn string(&self, parameter: &str) -> Result<String, ParamError> {
    self.params.string(parameter)
  }

  pub fn boolean(&self, parameter: &str) -> Result<bool, ParamError> {
    self.params.boolean(parameter)
  }

  pub fn integer(&self, parameter: &str) -> Result<i64, ParamError> {
    self.params.integer(parameter)
  }

  pub fn optional_integer(&self, parameter: &str) -> Result<Option<i64>, ParamError> {
    self.params.optional_integer(parameter)
  }

  pub fn choice(&self, parameter: &str) -> Result<String, ParamError> {
    self.params.choice(parameter)
  }

  pub(crate) fn params(&self) -> &Params {
    &self.params
  }
}
