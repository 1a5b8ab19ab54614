//! trestle-host: host environment classification for trestle.
//!
//! A build may run in a local shell or under one of a closed set of CI
//! providers. This crate answers two questions for the engine:
//! - *Who is driving the process?* ([`Host::detect`], decided from one
//!   sentinel environment variable per provider)
//! - *What does that provider tell us?* (per-provider typed views in
//!   [`providers`], reading documented variables lazily and surfacing
//!   conversion failures as structured [`EnvError`]s)

pub mod env;
pub mod host;
pub mod providers;

pub use env::EnvError;
pub use host::Host;
pub use providers::{
  AppVeyor, AzurePipelines, Bamboo, Bitrise, GitHubActions, GitLab, Jenkins, TeamCity, Travis,
};
