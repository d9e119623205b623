//! Policy resolution
//!
//! Precedence: `--policy <file>` > `KIOKU_POLICY` > `<config dir>/policy.json`
//! (only if it exists) > built-in defaults.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Context;
use directories::ProjectDirs;
use kioku_core::SchedulerPolicy;

/// Environment variable naming a policy file
pub const POLICY_ENV: &str = "KIOKU_POLICY";

/// Where the active policy came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicySource {
    /// `--policy` flag
    Flag(PathBuf),
    /// `KIOKU_POLICY`
    Env(PathBuf),
    /// Platform config directory
    ConfigDir(PathBuf),
    /// Built-in defaults
    Default,
}

impl PolicySource {
    fn path(&self) -> Option<&Path> {
        match self {
            PolicySource::Flag(p) | PolicySource::Env(p) | PolicySource::ConfigDir(p) => Some(p),
            PolicySource::Default => None,
        }
    }
}

impl fmt::Display for PolicySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicySource::Flag(p) => write!(f, "--policy {}", p.display()),
            PolicySource::Env(p) => write!(f, "{POLICY_ENV}={}", p.display()),
            PolicySource::ConfigDir(p) => write!(f, "{}", p.display()),
            PolicySource::Default => write!(f, "built-in defaults"),
        }
    }
}

/// Default policy file location for this platform
pub fn default_policy_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "kioku", "kioku").map(|dirs| dirs.config_dir().join("policy.json"))
}

/// Pick the policy source without touching the file system beyond an existence check
pub fn select_source(
    flag: Option<PathBuf>,
    env: Option<PathBuf>,
    config_file: Option<PathBuf>,
) -> PolicySource {
    if let Some(path) = flag {
        PolicySource::Flag(path)
    } else if let Some(path) = env.filter(|p| !p.as_os_str().is_empty()) {
        PolicySource::Env(path)
    } else if let Some(path) = config_file.filter(|p| p.is_file()) {
        PolicySource::ConfigDir(path)
    } else {
        PolicySource::Default
    }
}

/// Load and validate the policy from `source`
pub fn load_policy(source: &PolicySource) -> anyhow::Result<SchedulerPolicy> {
    let Some(path) = source.path() else {
        return Ok(SchedulerPolicy::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read policy file {}", path.display()))?;
    let policy = SchedulerPolicy::from_json(&json)
        .with_context(|| format!("Invalid policy in {}", path.display()))?;
    tracing::debug!(source = %source, "Policy loaded");
    Ok(policy)
}

/// Resolve and load the active policy
pub fn resolve_policy(flag: Option<PathBuf>) -> anyhow::Result<(SchedulerPolicy, PolicySource)> {
    let env = std::env::var_os(POLICY_ENV).map(PathBuf::from);
    let source = select_source(flag, env, default_policy_path());
    let policy = load_policy(&source)?;
    Ok((policy, source))
}
