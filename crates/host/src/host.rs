//! Host classification.

use std::fmt;

use tracing::{debug, warn};

use crate::env;

/// The environment driving the current process: a local shell, or one of a
/// closed set of CI providers.
///
/// Classification is decided once, from one sentinel variable per provider.
/// The engine uses it to pick an output sink and to route variable lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Host {
  /// A local shell; no provider claimed the process.
  Console,
  AppVeyor,
  AzurePipelines,
  Bamboo,
  Bitrise,
  GitHubActions,
  GitLab,
  Jenkins,
  TeamCity,
  Travis,
}

/// Providers in detection order, paired with their sentinel check.
const PROVIDERS: &[(Host, fn() -> bool)] = &[
  (Host::AppVeyor, || env::is_true("APPVEYOR")),
  (Host::AzurePipelines, || env::is_true("TF_BUILD")),
  (Host::Bamboo, || env::is_set("bamboo_buildKey")),
  (Host::Bitrise, || env::is_set("BITRISE_BUILD_URL")),
  (Host::GitHubActions, || env::is_true("GITHUB_ACTIONS")),
  (Host::GitLab, || env::is_true("GITLAB_CI")),
  (Host::Jenkins, || env::is_set("JENKINS_URL")),
  (Host::TeamCity, || env::is_set("TEAMCITY_VERSION")),
  (Host::Travis, || env::is_true("TRAVIS")),
];

impl Host {
  /// Classify the current process from its environment.
  ///
  /// At most one provider is expected to claim the process. If several do
  /// (e.g. a container image leaking another CI's variables), the first in
  /// declaration order wins and the conflict is logged.
  pub fn detect() -> Self {
    let claimed: Vec<Host> = PROVIDERS
      .iter()
      .filter(|(_, sentinel)| sentinel())
      .map(|(host, _)| *host)
      .collect();

    match claimed.as_slice() {
      [] => Host::Console,
      [host] => {
        debug!(host = %host, "detected CI host");
        *host
      }
      [first, ..] => {
        warn!(hosts = ?claimed, chosen = %first, "multiple CI hosts claimed the process");
        *first
      }
    }
  }

  /// True when running under any CI provider.
  pub fn is_ci(self) -> bool {
    self != Host::Console
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Host::Console => "console",
      Host::AppVeyor => "AppVeyor",
      Host::AzurePipelines => "Azure Pipelines",
      Host::Bamboo => "Bamboo",
      Host::Bitrise => "Bitrise",
      Host::GitHubActions => "GitHub Actions",
      Host::GitLab => "GitLab",
      Host::Jenkins => "Jenkins",
      Host::TeamCity => "TeamCity",
      Host::Travis => "Travis",
    }
  }
}

impl fmt::Display for Host {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
