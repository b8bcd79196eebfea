//! Project configuration.
//!
//! TOML file with per-field serde defaults; a missing file or missing key
//! falls back to the default so a fresh checkout needs no setup. The only
//! behavioral knob the core consumes is the transition deny list — the
//! state machine forbids nothing structurally, so which moves are allowed
//! is a business policy decision, not engine logic.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::model::Status;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub transitions: TransitionConfig,
    #[serde(default)]
    pub demo: DemoConfig,
}

/// Raw `[transitions]` table. Pairs are written `"Cerrado->Nuevo"`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransitionConfig {
    #[serde(default)]
    pub denied: Vec<String>,
}

impl TransitionConfig {
    /// Parse the deny list into a checked policy.
    ///
    /// # Errors
    ///
    /// Fails when a rule is not of the form `From->To` or names an
    /// unknown status.
    pub fn policy(&self) -> Result<TransitionPolicy> {
        let mut denied = Vec::with_capacity(self.denied.len());
        for raw in &self.denied {
            let (from, to) = raw
                .split_once("->")
                .with_context(|| format!("transition rule '{raw}' is not 'From->To'"))?;
            let from = Status::from_str(from.trim())
                .with_context(|| format!("transition rule '{raw}'"))?;
            let to =
                Status::from_str(to.trim()).with_context(|| format!("transition rule '{raw}'"))?;
            denied.push((from, to));
        }
        Ok(TransitionPolicy { denied })
    }
}

/// Checked transition policy consumed by the controller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionPolicy {
    denied: Vec<(Status, Status)>,
}

impl TransitionPolicy {
    /// A policy denying exactly the given pairs.
    #[must_use]
    pub const fn denying(denied: Vec<(Status, Status)>) -> Self {
        Self { denied }
    }

    /// Whether the policy allows this move.
    #[must_use]
    pub fn allows(&self, from: Status, to: Status) -> bool {
        !self.denied.contains(&(from, to))
    }
}

/// `[demo]` table: knobs for the seeded demo backend the CLI runs against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoConfig {
    /// How many sample leads the demo backend starts with.
    #[serde(default = "default_seed_leads")]
    pub seed_leads: usize,
    /// Whether the dashboard runs scripted background actors that commit
    /// remote edits while the TUI is open.
    #[serde(default = "default_true")]
    pub live_actors: bool,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            seed_leads: default_seed_leads(),
            live_actors: default_true(),
        }
    }
}

const fn default_seed_leads() -> usize {
    12
}

const fn default_true() -> bool {
    true
}

/// Default config location: `<user config dir>/leadlane/config.toml`.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("leadlane").join("config.toml"))
}

/// Load configuration from an explicit path, or from the default location,
/// or fall back to defaults when no file exists.
///
/// # Errors
///
/// Fails when an explicitly given file cannot be read, or when the TOML
/// does not parse.
pub fn load_config(explicit: Option<&Path>) -> Result<ProjectConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(ProjectConfig::default()),
        },
    };
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("reading config {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
}
