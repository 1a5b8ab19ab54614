//! The command-line surface the engine consumes.
//!
//! The command is assembled at runtime with clap's builder API: the fixed
//! engine options plus one generated option per declared parameter. `--help`
//! and `--graph` are handled by the engine itself (they must list targets
//! and parameters and exit before planning), so clap's own help is disabled.

use std::path::PathBuf;

use clap::{Arg, ArgAction, Command, parser::ValueSource};
use owo_colors::{OwoColorize, Stream};

use crate::build::BuildDefinition;
use crate::params::{ParamKind, ParamSpec};
use crate::run::RunOptions;

/// A parsed engine invocation.
pub(crate) struct Invocation {
  pub options: RunOptions,
  pub help: bool,
  pub graph: bool,
  pub summary_path: Option<PathBuf>,
}

fn parameter_arg(spec: &ParamSpec) -> Arg {
  let arg = Arg::new(spec.name.clone())
    .long(spec.name.clone())
    .help(spec.help.clone());
  match &spec.kind {
    ParamKind::Bool => arg
      .value_name("BOOL")
      .num_args(0..=1)
      .default_missing_value("true"),
    ParamKind::Int | ParamKind::OptionalInt => arg.value_name("N").num_args(1),
    ParamKind::Choice(_) => arg.value_name("CHOICE").num_args(1),
    ParamKind::String => arg.value_name("VALUE").num_args(1),
  }
}

fn command_for(build: &BuildDefinition) -> Command {
  let mut command = Command::new(build.name.clone())
    .no_binary_name(true)
    .disable_help_flag(true)
    .disable_version_flag(true)
    .arg(
      Arg::new("targets")
        .value_name("TARGET")
        .num_args(0..)
        .help("Targets to invoke (defaults to the default target)"),
    )
    .arg(
      Arg::new("target")
        .long("target")
        .short('t')
        .value_name("NAME")
        .action(ArgAction::Append)
        .help("Target to invoke; may be given multiple times"),
    )
    .arg(
      Arg::new("skip")
        .long("skip")
        .value_name("NAME")
        .num_args(0..)
        .action(ArgAction::Append)
        // A bare --skip records one empty value; empties are filtered out
        // when the names are collected.
        .default_missing_value("")
        .help("Skip the named non-invoked targets; bare --skip skips all of them"),
    )
    .arg(
      Arg::new("strict")
        .long("strict")
        .action(ArgAction::SetTrue)
        .help("Fail unless the dependency graph admits exactly one order"),
    )
    .arg(
      Arg::new("graph")
        .long("graph")
        .action(ArgAction::SetTrue)
        .help("Render the dependency graph and exit"),
    )
    .arg(
      Arg::new("summary-path")
        .long("summary-path")
        .value_name("FILE")
        .num_args(1)
        .help("Write the run summary as JSON to FILE"),
    )
    .arg(
      Arg::new("help")
        .long("help")
        .short('h')
        .action(ArgAction::SetTrue)
        .help("Print targets and parameters and exit"),
    );

  for spec in build.parameters() {
    command = command.arg(parameter_arg(spec));
  }
  command
}

pub(crate) fn parse(build: &BuildDefinition, args: &[String]) -> Result<Invocation, clap::Error> {
  let matches = command_for(build).try_get_matches_from(args)?;

  let mut targets: Vec<String> = matches
    .get_many::<String>("targets")
    .map(|v| v.cloned().collect())
    .unwrap_or_default();
  if let Some(named) = matches.get_many::<String>("target") {
    targets.extend(named.cloned());
  }

  // Absent flag means no skipping; a bare flag means skip every
  // non-invoked target; named values mean skip exactly those.
  let skip = if matches!(matches.value_source("skip"), Some(ValueSource::CommandLine)) {
    Some(
      matches
        .get_many::<String>("skip")
        .map(|v| v.filter(|s| !s.is_empty()).cloned().collect())
        .unwrap_or_default(),
    )
  } else {
    None
  };

  let mut parameters = Vec::new();
  for spec in build.parameters() {
    if matches!(matches.value_source(&spec.name), Some(ValueSource::CommandLine))
      && let Some(value) = matches.get_one::<String>(&spec.name)
    {
      parameters.push((spec.name.clone(), value.clone()));
    }
  }

  Ok(Invocation {
    options: RunOptions {
      targets,
      skip,
      strict: matches.get_flag("strict"),
      parameters,
    },
    help: matches.get_flag("help"),
    graph: matches.get_flag("graph"),
    summary_path: matches.get_one::<String>("summary-path").map(PathBuf::from),
  })
}

fn bold(text: &str) -> String {
  text.if_supports_color(Stream::Stdout, |s| s.bold()).to_string()
}

/// The `--help` listing: targets with dependencies, parameters, engine
/// options. Printed before any planning happens.
pub(crate) fn print_help(build: &BuildDefinition) {
  println!("{}", bold(&build.name));
  println!();
  println!("Usage: [TARGET]... [--target NAME]... [--skip [NAME]...] [--strict] [--graph] [parameters]");

  println!();
  println!("{}", bold("Targets:"));
  let width = build.targets().iter().map(|t| t.name.len()).max().unwrap_or(0);
  for target in build.targets() {
    let mut line = format!("  {:width$}", target.name);
    if target.is_default {
      line.push_str("  (default)");
    }
    if let Some(description) = &target.description {
      line.push_str(&format!("  {description}"));
    }
    if !target.dependencies.is_empty() {
      line.push_str(&format!("  [depends on: {}]", target.dependencies.join(", ")));
    }
    println!("{line}");
  }

  if !build.parameters().is_empty() {
    println!();
    println!("{}", bold("Parameters:"));
    for spec in build.parameters() {
      let mut line = format!("  --{}", spec.name);
      if let ParamKind::Choice(allowed) = &spec.kind {
        line.push_str(&format!(" <{}>", allowed.join("|")));
      } else {
        line.push_str(&format!(" <{}>", spec.kind.expects()));
      }
      if !spec.help.is_empty() {
        line.push_str(&format!("  {}", spec.help));
      }
      if let Some(default) = &spec.default {
        line.push_str(&format!("  [default: {default}]"));
      }
      println!("{line}");
    }
  }

  println!();
  println!("{}", bold("Options:"));
  println!("  --target <NAME>        Target to invoke; may be given multiple times");
  println!("  --skip [NAME]...       Skip the named non-invoked targets; bare --skip skips all");
  println!("  --strict               Fail unless the dependency graph admits exactly one order");
  println!("  --graph                Render the dependency graph and exit");
  println!("  --summary-path <FILE>  Write the run summary as JSON to FILE");
  println!("  --help                 Print this listing and exit");
}

/// The `--graph` rendering: each target with its dependency fan-in.
pub(crate) fn print_graph(build: &BuildDefinition) {
  println!("Dependency graph for {}:", bold(&build.name));
  println!();
  for target in build.targets() {
    let default_marker = if target.is_default { " (default)" } else { "" };
    println!("{}{}", bold(&target.name), default_marker);
    for (i, dep) in target.dependencies.iter().enumerate() {
      let connector = if i + 1 == target.dependencies.len() {
        "└─"
      } else {
        "├─"
      };
      println!("  {connector} {dep}");
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::params::ParamSpec;
  use crate::target::Target;

  fn build() -> BuildDefinition {
    BuildDefinition::new("demo")
      .parameter(ParamSpec::choice("configuration", ["debug", "release"]))
      .parameter(ParamSpec::boolean("skip-slow"))
      .target(Target::named("Compile").default())
      .target(Target::named("Test").depends_on(["Compile"]))
  }

  fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
  }

  #[test]
  fn positional_and_named_targets_combine() {
    let invocation = parse(&build(), &args(&["Compile", "--target", "Test"])).unwrap();
    assert_eq!(invocation.options.targets, vec!["Compile", "Test"]);
  }

  #[test]
  fn absent_skip_flag_is_none() {
    let invocation = parse(&build(), &args(&["Test"])).unwrap();
    assert_eq!(invocation.options.skip, None);
  }

  #[test]
  fn bare_skip_flag_is_an_empty_list() {
    let invocation = parse(&build(), &args(&["Test", "--skip"])).unwrap();
    assert_eq!(invocation.options.skip, Some(Vec::new()));
  }

  #[test]
  fn named_skip_flag_lists_names() {
    let invocation = parse(&build(), &args(&["Test", "--skip", "Compile"])).unwrap();
    assert_eq!(invocation.options.skip, Some(vec!["Compile".to_string()]));
  }

  #[test]
  fn parameters_are_collected() {
    let invocation = parse(&build(), &args(&["--configuration", "release"])).unwrap();
    assert_eq!(
      invocation.options.parameters,
      vec![("configuration".to_string(), "release".to_string())]
    );
  }

  #[test]
  fn bool_parameter_without_value_reads_true() {
    let invocation = parse(&build(), &args(&["--skip-slow"])).unwrap();
    assert_eq!(
      invocation.options.parameters,
      vec![("skip-slow".to_string(), "true".to_string())]
    );
  }

  #[test]
  fn strict_graph_and_help_flags() {
    let invocation = parse(&build(), &args(&["--strict", "--graph", "--help"])).unwrap();
    assert!(invocation.options.strict);
    assert!(invocation.graph);
    assert!(invocation.help);
  }

  #[test]
  fn summary_path_is_a_path() {
    let invocation = parse(&build(), &args(&["--summary-path", "out/run.json"])).unwrap();
    assert_eq!(invocation.summary_path, Some(PathBuf::from("out/run.json")));
  }

  #[test]
  fn unknown_flags_are_rejected() {
    assert!(parse(&build(), &args(&["--frobnicate"])).is_err());
  }
}
