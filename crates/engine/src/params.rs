//! Typed parameter declaration and binding.
//!
//! A build declares its parameters in a table (`name`, kind, help, default);
//! the CLI parser supplies values, with an environment variable of the same
//! name (case-insensitive, separators ignored) as fallback and the declared
//! default last. Values are kept as the raw strings they arrived as and
//! converted on read; a conversion failure is a structured [`ParamError`],
//! never a silent default.

use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

/// The type a parameter value is converted to on read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamKind {
  String,
  Bool,
  Int,
  /// Integer that may legitimately be unbound; reads yield `Option<i64>`.
  OptionalInt,
  /// One of a fixed set of allowed values (case-insensitive match).
  Choice(Vec<String>),
}

impl ParamKind {
  pub(crate) fn expects(&self) -> &'static str {
    match self {
      ParamKind::String => "string",
      ParamKind::Bool => "boolean",
      ParamKind::Int | ParamKind::OptionalInt => "integer",
      ParamKind::Choice(_) => "choice",
    }
  }
}

/// One declared parameter.
#[derive(Debug, Clone)]
pub struct ParamSpec {
  pub name: String,
  pub kind: ParamKind,
  pub help: String,
  pub default: Option<String>,
}

impl ParamSpec {
  fn new(name: impl Into<String>, kind: ParamKind) -> Self {
    Self {
      name: name.into(),
      kind,
      help: String::new(),
      default: None,
    }
  }

  pub fn string(name: impl Into<String>) -> Self {
    Self::new(name, ParamKind::String)
  }

  pub fn boolean(name: impl Into<String>) -> Self {
    Self::new(name, ParamKind::Bool)
  }

  pub fn integer(name: impl Into<String>) -> Self {
    Self::new(name, ParamKind::Int)
  }

  pub fn optional_integer(name: impl Into<String>) -> Self {
    Self::new(name, ParamKind::OptionalInt)
  }

  pub fn choice<I, S>(name: impl Into<String>, allowed: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self::new(name, ParamKind::Choice(allowed.into_iter().map(Into::into).collect()))
  }

  pub fn help(mut self, text: impl Into<String>) -> Self {
    self.help = text.into();
    self
  }

  pub fn default_value(mut self, value: impl Into<String>) -> Self {
    self.default = Some(value.into());
    self
  }
}

/// Errors raised by parameter binding and typed reads.
#[derive(Debug, Error)]
pub enum ParamError {
  #[error("parameter '{name}' is not declared by this build")]
  NotDeclared { name: String },

  #[error("parameter '{name}' has no value")]
  Missing { name: String },

  #[error("parameter '{name}' has unparsable value '{value}' (expected {expected})")]
  Parse {
    name: String,
    value: String,
    expected: &'static str,
  },

  #[error("parameter '{name}' value '{value}' is not one of: {}", .allowed.join(", "))]
  InvalidChoice {
    name: String,
    value: String,
    allowed: Vec<String>,
  },
}

/// Bound parameter values for one run.
#[derive(Debug)]
pub struct Params {
  specs: Vec<ParamSpec>,
  values: HashMap<String, String>,
}

/// Compare names ignoring case and `-`/`_` separators, so the CLI's
/// `--artifacts-dir` and the environment's `ARTIFACTS_DIR` both bind the
/// parameter declared as `artifacts-dir`.
fn normalize(name: &str) -> String {
  name
    .chars()
    .filter(|c| c.is_ascii_alphanumeric())
    .map(|c| c.to_ascii_lowercase())
    .collect()
}

fn env_lookup(name: &str) -> Option<String> {
  let wanted = normalize(name);
  std::env::vars().find(|(key, _)| normalize(key) == wanted).map(|(_, value)| value)
}

/// Validate a raw value against the declared kind.
fn check(spec: &ParamSpec, value: &str) -> Result<(), ParamError> {
  match &spec.kind {
    ParamKind::String => Ok(()),
    ParamKind::Bool => {
      if value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false") {
        Ok(())
      } else {
        Err(ParamError::Parse {
          name: spec.name.clone(),
          value: value.to_string(),
          expected: spec.kind.expects(),
        })
      }
    }
    ParamKind::Int | ParamKind::OptionalInt => value.parse::<i64>().map(|_| ()).map_err(|_| ParamError::Parse {
      name: spec.name.clone(),
      value: value.to_string(),
      expected: spec.kind.expects(),
    }),
    ParamKind::Choice(allowed) => {
      if allowed.iter().any(|a| a.eq_ignore_ascii_case(value)) {
        Ok(())
      } else {
        Err(ParamError::InvalidChoice {
          name: spec.name.clone(),
          value: value.to_string(),
          allowed: allowed.clone(),
        })
      }
    }
  }
}

/// Bind every declared parameter from CLI values, the environment, and
/// declared defaults, in that order of precedence.
pub(crate) fn bind(specs: &[ParamSpec], cli_values: &[(String, String)]) -> Result<Params, ParamError> {
  let mut values = HashMap::new();

  for spec in specs {
    let from_cli = cli_values
      .iter()
      .find(|(name, _)| normalize(name) == normalize(&spec.name))
      .map(|(_, value)| value.clone());

    let resolved = from_cli
      .or_else(|| env_lookup(&spec.name))
      .or_else(|| spec.default.clone());

    if let Some(value) = resolved {
      check(spec, &value)?;
      debug!(parameter = %spec.name, value = %value, "bound parameter");
      values.insert(normalize(&spec.name), value);
    }
  }

  Ok(Params {
    specs: specs.to_vec(),
    values,
  })
}

impl Params {
  fn spec(&self, name: &str) -> Result<&ParamSpec, ParamError> {
    self
      .specs
      .iter()
      .find(|s| normalize(&s.name) == normalize(name))
      .ok_or_else(|| ParamError::NotDeclared { name: name.to_string() })
  }

  /// The raw bound value, if any.
  pub fn raw(&self, name: &str) -> Option<&str> {
    self.values.get(&normalize(name)).map(String::as_str)
  }

  fn required_raw(&self, name: &str) -> Result<&str, ParamError> {
    self.spec(name)?;
    self.raw(name).ok_or_else(|| ParamError::Missing { name: name.to_string() })
  }

  pub fn string(&self, name: &str) -> Result<String, ParamError> {
    self.required_raw(name).map(str::to_string)
  }

  pub fn boolean(&self, name: &str) -> Result<bool, ParamError> {
    let value = self.required_raw(name)?;
    Ok(value.eq_ignore_ascii_case("true"))
  }

  pub fn integer(&self, name: &str) -> Result<i64, ParamError> {
    let value = self.required_raw(name)?;
    value.parse().map_err(|_| ParamError::Parse {
      name: name.to_string(),
      value: value.to_string(),
      expected: "integer",
    })
  }

  pub fn optional_integer(&self, name: &str) -> Result<Option<i64>, ParamError> {
    self.spec(name)?;
    match self.raw(name) {
      None => Ok(None),
      Some(value) => value.parse().map(Some).map_err(|_| ParamError::Parse {
        name: name.to_string(),
        value: value.to_string(),
        expected: "integer",
      }),
    }
  }

  pub fn choice(&self, name: &str) -> Result<String, ParamError> {
    self.required_raw(name).map(str::to_string)
  }

  /// Requirement truthiness: bound, non-empty, and non-zero for integer
  /// kinds.
  pub(crate) fn satisfies(&self, name: &str) -> bool {
    let Ok(spec) = self.spec(name) else {
      return false;
    };
    let Some(value) = self.raw(name) else {
      return false;
    };
    if value.trim().is_empty() {
      return false;
    }
    match spec.kind {
      ParamKind::Int | ParamKind::OptionalInt => value.parse::<i64>().map(|n| n != 0).unwrap_or(false),
      _ => true,
    }
  }
}
