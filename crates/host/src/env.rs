//! Environment variable access with structured errors.
//!
//! Provider views read their variables through these helpers so that a
//! missing or malformed value is always reported as an [`EnvError`] naming
//! the variable, never silently defaulted.

use std::str::FromStr;

use thiserror::Error;

/// Errors raised when reading a host environment variable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvError {
  /// The variable is not present in the process environment.
  #[error("environment variable {var} is not set")]
  Missing { var: &'static str },

  /// The variable is present but its value does not parse as the requested type.
  #[error("environment variable {var} has unparsable value '{value}'")]
  Parse { var: &'static str, value: String },
}

/// Read a variable as a string.
pub fn var(name: &'static str) -> Result<String, EnvError> {
  std::env::var(name).map_err(|_| EnvError::Missing { var: name })
}

/// Read a variable and parse it into `T`.
pub fn parsed<T: FromStr>(name: &'static str) -> Result<T, EnvError> {
  let value = var(name)?;
  value.parse().map_err(|_| EnvError::Parse { var: name, value })
}

/// True if the variable is set at all, regardless of value.
pub fn is_set(name: &'static str) -> bool {
  std::env::var_os(name).is_some()
}

/// True if the variable is set to `true` (ASCII case-insensitive).
///
/// Providers disagree on capitalization: GitHub Actions exports
/// `GITHUB_ACTIONS=true` while Azure Pipelines exports `TF_BUILD=True`.
pub fn is_true(name: &'static str) -> bool {
  std::env::var(name).is_ok_and(|v| v.eq_ignore_ascii_case("true"))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn var_missing() {
    temp_env::with_var_unset("TRESTLE_TEST_UNSET", || {
      assert_eq!(var("TRESTLE_TEST_UNSET"), Err(EnvError::Missing { var: "TRESTLE_TEST_UNSET" }));
    });
  }

  #[test]
  fn parsed_reads_integer() {
    temp_env::with_var("TRESTLE_TEST_NUM", Some("42"), || {
      assert_eq!(parsed::<u64>("TRESTLE_TEST_NUM"), Ok(42));
    });
  }

  #[test]
  fn parsed_reports_malformed_value() {
    temp_env::with_var("TRESTLE_TEST_NUM", Some("forty-two"), || {
      assert_eq!(
        parsed::<u64>("TRESTLE_TEST_NUM"),
        Err(EnvError::Parse {
          var: "TRESTLE_TEST_NUM",
          value: "forty-two".to_string(),
        })
      );
    });
  }

  #[test]
  fn is_true_ignores_case() {
    temp_env::with_var("TRESTLE_TEST_FLAG", Some("True"), || {
      assert!(is_true("TRESTLE_TEST_FLAG"));
    });
    temp_env::with_var("TRESTLE_TEST_FLAG", Some("1"), || {
      assert!(!is_true("TRESTLE_TEST_FLAG"));
    });
  }
}
