// SPDX-License-Identifier: PMPL-1.0-or-later

//! Audit configuration: defaults, optional JSON/YAML file, CLI overrides.

use crate::catalog::ExclusionSpec;
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Placeholder expanded to `--no-default-features` / `--features a,b` (zero or more args)
pub const BUILD_FLAGS_PLACEHOLDER: &str = "{build_flags}";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisassemblerConfig {
    pub program: String,
    /// Supports `{target}`, `{profile}` and `{build_flags}`
    pub args: Vec<String>,
}

impl Default for DisassemblerConfig {
    fn default() -> Self {
        Self {
            program: "cargo".to_string(),
            args: [
                "objdump",
                "--profile",
                "{profile}",
                "--example",
                "{target}",
                BUILD_FLAGS_PLACEHOLDER,
                "--",
                "--disassemble",
                "--demangle",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Firmware crate the toolchain runs in
    pub crate_dir: PathBuf,
    /// Relative to `crate_dir` unless absolute
    pub profile_root: PathBuf,
    pub profile: String,
    pub timeout_secs: u64,
    /// Per-run limit for the stack and size sweeps; none by default
    pub sweep_timeout_secs: Option<u64>,
    pub disassembler: DisassemblerConfig,
    /// Extra false-positive rules, applied after the built-in one
    pub exclusions: Vec<ExclusionSpec>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            crate_dir: PathBuf::from("."),
            profile_root: PathBuf::from("target/avr-atmega2560"),
            profile: "release".to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            sweep_timeout_secs: None,
            disassembler: DisassemblerConfig::default(),
            exclusions: Vec::new(),
        }
    }
}

impl AuditConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: AuditConfig = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(&content)
                .with_context(|| format!("parsing json config {}", path.display()))?,
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
                .with_context(|| format!("parsing yaml config {}", path.display()))?,
            _ => {
                return Err(anyhow!(
                    "unsupported config extension for {}",
                    path.display()
                ))
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Defaults when no file is given
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            bail!("timeout value must be a positive integer");
        }
        if self.sweep_timeout_secs == Some(0) {
            bail!("sweep timeout value must be a positive integer");
        }
        if self.profile.trim().is_empty() {
            bail!("build profile must not be empty");
        }
        if self.disassembler.program.trim().is_empty() {
            bail!("disassembler program must not be empty");
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn sweep_timeout(&self) -> Option<Duration> {
        self.sweep_timeout_secs.map(Duration::from_secs)
    }

    pub fn examples_dir(&self) -> PathBuf {
        self.crate_dir.join("examples")
    }

    /// Source file defining the example `target`
    pub fn target_source(&self, target: &str) -> PathBuf {
        self.examples_dir().join(format!("{}.rs", target))
    }

    /// `<profile-root>/<profile>/examples/<target>.asm`
    pub fn artifact_path(&self, target: &str) -> PathBuf {
        self.crate_dir
            .join(&self.profile_root)
            .join(&self.profile)
            .join("examples")
            .join(format!("{}.asm", target))
    }
}
