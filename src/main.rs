// SPDX-License-Identifier: PMPL-1.0-or-later

//! fw-audit: panic-reference, stack-depth and binary-size auditing for firmware examples

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use fw_audit::config::AuditConfig;
use fw_audit::runner::SystemRunner;
use fw_audit::simavr::SimavrInvocation;
use fw_audit::sweep::{self, size, stack};
use fw_audit::types::*;
use fw_audit::{diagnostics, panics, report};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "fw-audit")]
#[command(version)]
#[command(about = "Panic-reference, stack-depth and binary-size auditing for firmware examples")]
#[command(long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Config file (JSON or YAML)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Firmware crate to build and analyze
    #[arg(long, global = true, value_name = "DIR")]
    crate_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check compiled examples for panic references
    Panics {
        /// Example to check
        #[arg(value_name = "TARGET", required_unless_present_any = ["all", "targets"])]
        target: Option<String>,

        /// Check every example under the crate's examples/ directory
        #[arg(long, conflicts_with_all = ["target", "targets"])]
        all: bool,

        /// Check an explicit list of examples
        #[arg(long, value_delimiter = ',', conflicts_with = "target")]
        targets: Option<Vec<String>>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,

        /// Build without default features
        #[arg(long)]
        no_default_features: bool,

        /// Comma-separated feature list
        #[arg(long, value_name = "FEATURES")]
        features: Option<String>,

        /// Disassembler timeout in seconds
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        timeout: Option<u64>,

        /// Build profile
        #[arg(long)]
        profile: Option<String>,

        /// Directory holding per-profile build output
        #[arg(long, value_name = "DIR")]
        profile_root: Option<PathBuf>,

        /// Save the result as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Measure stack usage across nesting depths under the simulator
    Stack {
        /// Depths to run (default: all)
        #[arg(long, value_delimiter = ',')]
        depths: Option<Vec<u32>>,

        /// Per-run timeout in seconds
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        timeout: Option<u64>,

        /// Save the table as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Measure .text size with cargo-bloat
    Size {
        /// Per-run timeout in seconds
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        timeout: Option<u64>,

        /// Save the table as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run a binary under simavr (usable as a cargo runner)
    Simavr {
        /// simavr arguments, an optional -t/--timeout and the binary
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, num_args = 0..)]
        args: Vec<String>,
    },
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            // --help and --version are not usage errors
            return if err.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            diagnostics::error(format!("{:#}", err));
            ExitCode::from(1)
        }
    }
}

fn load_config(global: &GlobalArgs) -> Result<AuditConfig> {
    let mut config = AuditConfig::load_or_default(global.config.as_deref())?;
    if let Some(dir) = &global.crate_dir {
        config.crate_dir = dir.clone();
    }
    Ok(config)
}

fn exit_code(passed: bool) -> u8 {
    if passed {
        0
    } else {
        1
    }
}

fn run(cli: Cli) -> Result<u8> {
    match cli.command {
        Commands::Panics {
            target,
            all,
            targets,
            verbose,
            no_default_features,
            features,
            timeout,
            profile,
            profile_root,
            output,
        } => {
            let mut config = load_config(&cli.global)?;
            if let Some(secs) = timeout {
                config.timeout_secs = secs;
            }
            if let Some(profile) = profile {
                config.profile = profile;
            }
            if let Some(root) = profile_root {
                config.profile_root = root;
            }
            config.validate()?;

            let options = BuildOptions::with_feature_list(no_default_features, features.as_deref());
            let runner = SystemRunner;

            if let Some(target) = target {
                // Unknown targets are usage errors, caught before any build
                if !config.target_source(&target).is_file() {
                    bail!(
                        "unknown target '{}' (no {})",
                        target,
                        config.target_source(&target).display()
                    );
                }

                println!("Checking {} for panic references...", target);
                let outcome = panics::analyze(&config, &runner, &target, &options, verbose)?;
                if let Some(path) = &output {
                    report::save_report(&outcome, path)?;
                }
                let passed = match &outcome {
                    TargetOutcome::Analyzed(result) => report::print_single(result),
                    TargetOutcome::Failed { .. } => {
                        println!("{}: failed to analyze", target);
                        false
                    }
                    TargetOutcome::NotFound => false,
                };
                return Ok(exit_code(passed));
            }

            let targets = match targets {
                Some(list) => list,
                None if all => panics::discover_targets(&config.examples_dir())?,
                None => bail!("specify a TARGET, --targets or --all"),
            };
            if targets.is_empty() {
                bail!("no examples found in {}", config.examples_dir().display());
            }

            let suite = panics::run_suite(&config, &runner, &targets, &options, verbose)?;
            if let Some(path) = &output {
                report::save_report(&suite, path)?;
            }
            Ok(exit_code(report::print_suite(&suite)))
        }

        Commands::Stack {
            depths,
            timeout,
            output,
        } => {
            let mut config = load_config(&cli.global)?;
            if timeout.is_some() {
                config.sweep_timeout_secs = timeout;
            }
            config.validate()?;

            let depths = depths.unwrap_or_else(|| stack::DEPTHS.to_vec());
            let results = stack::run(
                &SystemRunner,
                &config.crate_dir,
                &depths,
                stack::CONFIGS,
                config.sweep_timeout(),
            );
            sweep::print_table(
                "Stack Analysis Results",
                &results.to_table("Nesting Depth"),
            );
            if let Some(path) = &output {
                report::save_report(&results, path)?;
            }
            Ok(0)
        }

        Commands::Size { timeout, output } => {
            let mut config = load_config(&cli.global)?;
            if timeout.is_some() {
                config.sweep_timeout_secs = timeout;
            }
            config.validate()?;

            println!("Running binary size analysis with cargo-bloat...");
            let results = size::run(
                &SystemRunner,
                &config.crate_dir,
                size::CONFIGS,
                config.sweep_timeout(),
            );
            sweep::print_table(
                "Binary Size Analysis (cargo-bloat)",
                &results.to_table("Configuration"),
            );
            if let Some(path) = &output {
                report::save_report(&results, path)?;
            }
            Ok(0)
        }

        Commands::Simavr { args } => {
            let invocation = SimavrInvocation::parse(&args)?;
            let code = fw_audit::simavr::run(&invocation);
            Ok(code.clamp(0, 255) as u8)
        }
    }
}
