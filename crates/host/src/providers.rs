//! Typed views over provider-specific environment variables.
//!
//! Each provider exposes its documented variables through a small record.
//! `current()` returns the record only when the provider's sentinel claims
//! the process; the individual accessors read the environment lazily, so a
//! variable that is absent or malformed surfaces as an [`EnvError`] from
//! that read and nowhere else.

use crate::env::{self, EnvError};

/// GitHub Actions (`GITHUB_ACTIONS=true`).
#[derive(Debug, Clone, Copy)]
pub struct GitHubActions(());

impl GitHubActions {
  pub fn current() -> Option<Self> {
    env::is_true("GITHUB_ACTIONS").then_some(Self(()))
  }

  pub fn repository(&self) -> Result<String, EnvError> {
    env::var("GITHUB_REPOSITORY")
  }

  pub fn workflow(&self) -> Result<String, EnvError> {
    env::var("GITHUB_WORKFLOW")
  }

  pub fn actor(&self) -> Result<String, EnvError> {
    env::var("GITHUB_ACTOR")
  }

  pub fn sha(&self) -> Result<String, EnvError> {
    env::var("GITHUB_SHA")
  }

  pub fn ref_name(&self) -> Result<String, EnvError> {
    env::var("GITHUB_REF_NAME")
  }

  pub fn event_name(&self) -> Result<String, EnvError> {
    env::var("GITHUB_EVENT_NAME")
  }

  pub fn run_id(&self) -> Result<u64, EnvError> {
    env::parsed("GITHUB_RUN_ID")
  }

  pub fn run_number(&self) -> Result<u64, EnvError> {
    env::parsed("GITHUB_RUN_NUMBER")
  }
}

/// TeamCity (`TEAMCITY_VERSION` present).
#[derive(Debug, Clone, Copy)]
pub struct TeamCity(());

impl TeamCity {
  pub fn current() -> Option<Self> {
    env::is_set("TEAMCITY_VERSION").then_some(Self(()))
  }

  pub fn version(&self) -> Result<String, EnvError> {
    env::var("TEAMCITY_VERSION")
  }

  pub fn project_name(&self) -> Result<String, EnvError> {
    env::var("TEAMCITY_PROJECT_NAME")
  }

  pub fn build_configuration(&self) -> Result<String, EnvError> {
    env::var("TEAMCITY_BUILDCONF_NAME")
  }

  /// TeamCity build numbers are free-form strings (they may carry a
  /// `{build.counter}`-style suffix), so no numeric conversion is offered.
  pub fn build_number(&self) -> Result<String, EnvError> {
    env::var("BUILD_NUMBER")
  }
}

/// GitLab CI (`GITLAB_CI=true`).
#[derive(Debug, Clone, Copy)]
pub struct GitLab(());

impl GitLab {
  pub fn current() -> Option<Self> {
    env::is_true("GITLAB_CI").then_some(Self(()))
  }

  pub fn job_id(&self) -> Result<u64, EnvError> {
    env::parsed("CI_JOB_ID")
  }

  pub fn pipeline_id(&self) -> Result<u64, EnvError> {
    env::parsed("CI_PIPELINE_ID")
  }

  pub fn project_path(&self) -> Result<String, EnvError> {
    env::var("CI_PROJECT_PATH")
  }

  pub fn commit_sha(&self) -> Result<String, EnvError> {
    env::var("CI_COMMIT_SHA")
  }

  pub fn ref_name(&self) -> Result<String, EnvError> {
    env::var("CI_COMMIT_REF_NAME")
  }
}

/// Travis CI (`TRAVIS=true`).
#[derive(Debug, Clone, Copy)]
pub struct Travis(());

impl Travis {
  pub fn current() -> Option<Self> {
    env::is_true("TRAVIS").then_some(Self(()))
  }

  pub fn repo_slug(&self) -> Result<String, EnvError> {
    env::var("TRAVIS_REPO_SLUG")
  }

  pub fn branch(&self) -> Result<String, EnvError> {
    env::var("TRAVIS_BRANCH")
  }

  pub fn commit(&self) -> Result<String, EnvError> {
    env::var("TRAVIS_COMMIT")
  }

  pub fn build_id(&self) -> Result<u64, EnvError> {
    env::parsed("TRAVIS_BUILD_ID")
  }

  pub fn build_number(&self) -> Result<u64, EnvError> {
    env::parsed("TRAVIS_BUILD_NUMBER")
  }
}

/// AppVeyor (`APPVEYOR=True`).
#[derive(Debug, Clone, Copy)]
pub struct AppVeyor(());

impl AppVeyor {
  pub fn current() -> Option<Self> {
    env::is_true("APPVEYOR").then_some(Self(()))
  }

  pub fn project_name(&self) -> Result<String, EnvError> {
    env::var("APPVEYOR_PROJECT_NAME")
  }

  pub fn build_version(&self) -> Result<String, EnvError> {
    env::var("APPVEYOR_BUILD_VERSION")
  }

  pub fn build_number(&self) -> Result<u64, EnvError> {
    env::parsed("APPVEYOR_BUILD_NUMBER")
  }

  pub fn repo_branch(&self) -> Result<String, EnvError> {
    env::var("APPVEYOR_REPO_BRANCH")
  }
}

/// Jenkins (`JENKINS_URL` present).
#[derive(Debug, Clone, Copy)]
pub struct Jenkins(());

impl Jenkins {
  pub fn current() -> Option<Self> {
    env::is_set("JENKINS_URL").then_some(Self(()))
  }

  pub fn url(&self) -> Result<String, EnvError> {
    env::var("JENKINS_URL")
  }

  pub fn job_name(&self) -> Result<String, EnvError> {
    env::var("JOB_NAME")
  }

  pub fn build_number(&self) -> Result<u64, EnvError> {
    env::parsed("BUILD_NUMBER")
  }

  pub fn workspace(&self) -> Result<String, EnvError> {
    env::var("WORKSPACE")
  }
}

/// Bamboo (`bamboo_buildKey` present).
#[derive(Debug, Clone, Copy)]
pub struct Bamboo(());

impl Bamboo {
  pub fn current() -> Option<Self> {
    env::is_set("bamboo_buildKey").then_some(Self(()))
  }

  pub fn build_key(&self) -> Result<String, EnvError> {
    env::var("bamboo_buildKey")
  }

  pub fn plan_name(&self) -> Result<String, EnvError> {
    env::var("bamboo_planName")
  }

  pub fn build_number(&self) -> Result<u64, EnvError> {
    env::parsed("bamboo_buildNumber")
  }
}

/// Bitrise (`BITRISE_BUILD_URL` present).
#[derive(Debug, Clone, Copy)]
pub struct Bitrise(());

impl Bitrise {
  pub fn current() -> Option<Self> {
    env::is_set("BITRISE_BUILD_URL").then_some(Self(()))
  }

  pub fn build_url(&self) -> Result<String, EnvError> {
    env::var("BITRISE_BUILD_URL")
  }

  pub fn app_title(&self) -> Result<String, EnvError> {
    env::var("BITRISE_APP_TITLE")
  }

  pub fn git_branch(&self) -> Result<String, EnvError> {
    env::var("BITRISE_GIT_BRANCH")
  }

  pub fn build_number(&self) -> Result<u64, EnvError> {
    env::parsed("BITRISE_BUILD_NUMBER")
  }
}

/// Azure Pipelines (`TF_BUILD=True`).
#[derive(Debug, Clone, Copy)]
pub struct AzurePipelines(());

impl AzurePipelines {
  pub fn current() -> Option<Self> {
    env::is_true("TF_BUILD").then_some(Self(()))
  }

  pub fn build_id(&self) -> Result<u64, EnvError> {
    env::parsed("BUILD_BUILDID")
  }

  pub fn definition_name(&self) -> Result<String, EnvError> {
    env::var("BUILD_DEFINITIONNAME")
  }

  pub fn source_branch(&self) -> Result<String, EnvError> {
    env::var("BUILD_SOURCEBRANCH")
  }

  pub fn team_project(&self) -> Result<String, EnvError> {
    env::var("SYSTEM_TEAMPROJECT")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn view_absent_without_sentinel() {
    temp_env::with_var_unset("GITHUB_ACTIONS", || {
      assert!(GitHubActions::current().is_none());
    });
  }

  #[test]
  fn github_actions_typed_reads() {
    temp_env::with_vars(
      [
        ("GITHUB_ACTIONS", Some("true")),
        ("GITHUB_REPOSITORY", Some("trestle-build/trestle")),
        ("GITHUB_RUN_ID", Some("8675309")),
        ("GITHUB_RUN_NUMBER", None),
      ],
      || {
        let gh = GitHubActions::current().unwrap();
        assert_eq!(gh.repository().unwrap(), "trestle-build/trestle");
        assert_eq!(gh.run_id().unwrap(), 8675309);
        assert_eq!(
          gh.run_number(),
          Err(EnvError::Missing { var: "GITHUB_RUN_NUMBER" })
        );
      },
    );
  }

  #[test]
  fn gitlab_malformed_numeric_is_an_error() {
    temp_env::with_vars(
      [("GITLAB_CI", Some("true")), ("CI_JOB_ID", Some("not-a-number"))],
      || {
        let gl = GitLab::current().unwrap();
        assert_eq!(
          gl.job_id(),
          Err(EnvError::Parse {
            var: "CI_JOB_ID",
            value: "not-a-number".to_string(),
          })
        );
      },
    );
  }

  #[test]
  fn teamcity_build_number_stays_a_string() {
    temp_env::with_vars(
      [
        ("TEAMCITY_VERSION", Some("2025.07")),
        ("BUILD_NUMBER", Some("451-release")),
      ],
      || {
        let tc = TeamCity::current().unwrap();
        assert_eq!(tc.build_number().unwrap(), "451-release");
      },
    );
  }
}
