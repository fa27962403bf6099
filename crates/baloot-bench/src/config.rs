//! YAML description of a tournament: which deals to play, the two agents
//! facing each other, and where the run's artifacts go.

use baloot_core::scoring::Doubling;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

const DEFAULT_OUT_DIR: &str = "bench/out";
const DEFAULT_LATENCY_BUDGET_MS: u64 = 1_200;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BenchmarkConfig {
    pub run_id: String,
    pub deals: DealConfig,
    pub agents: Vec<AgentConfig>,
    #[serde(default)]
    pub report: ReportConfig,
    /// Level of the structured event log; no log is written when absent.
    #[serde(default)]
    pub telemetry: Option<TelemetryLevel>,
}

impl BenchmarkConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate().map_err(|source| ConfigError::Invalid {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(config)
    }

    /// Checks the run and fills in the default baseline (the second agent).
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        if !is_identifier(&self.run_id) {
            return Err(ValidationError::RunId(self.run_id.clone()));
        }
        if self.deals.hands == 0 {
            return Err(ValidationError::NoHands);
        }
        Doubling::from_level(self.deals.doubling)
            .map_err(|_| ValidationError::Doubling(self.deals.doubling))?;

        if self.agents.len() != 2 {
            return Err(ValidationError::AgentCount(self.agents.len()));
        }
        let mut names = HashSet::new();
        for agent in &self.agents {
            if !is_identifier(&agent.name) || !names.insert(agent.name.as_str()) {
                return Err(ValidationError::AgentName(agent.name.clone()));
            }
        }

        let baseline = match self.report.baseline.take() {
            Some(name) if names.contains(name.as_str()) => name,
            Some(name) => return Err(ValidationError::Baseline(name)),
            None => self.agents[1].name.clone(),
        };
        self.report.baseline = Some(baseline);

        if self.report.latency_budget_ms == 0 {
            return Err(ValidationError::LatencyBudget);
        }
        Ok(())
    }

    /// Artifacts live in `<out_dir>/<run_id>/`.
    pub fn run_paths(&self) -> RunPaths {
        let dir = self.report.out_dir.join(&self.run_id);
        RunPaths {
            deals: dir.join("deals.jsonl"),
            summary: dir.join("summary.md"),
            telemetry: dir.join("telemetry.jsonl"),
            dir,
        }
    }
}

fn is_identifier(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

/// Contracts the generated deals are played under.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum ContractMode {
    Sun,
    Hokum,
    #[default]
    Mixed,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DealConfig {
    pub seed: Option<u64>,
    pub hands: usize,
    #[serde(default)]
    pub mode: ContractMode,
    /// Replay every deal with the agents' teams exchanged.
    #[serde(default = "default_swap_teams")]
    pub swap_teams: bool,
    /// Doubling level applied to every hand (0 or 1 plays undoubled, 5 is Gahwa).
    #[serde(default)]
    pub doubling: u8,
}

impl DealConfig {
    pub fn lineups(&self) -> usize {
        if self.swap_teams { 2 } else { 1 }
    }
}

fn default_swap_teams() -> bool {
    true
}

/// One side of the match. An agent plays both seats of its team.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AgentConfig {
    pub name: String,
    pub kind: AgentKind,
    #[serde(default)]
    pub params: serde_yaml::Value,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Search,
    Random,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ReportConfig {
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,
    /// Agent the other is measured against.
    #[serde(default)]
    pub baseline: Option<String>,
    #[serde(default = "default_latency_budget_ms")]
    pub latency_budget_ms: u64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            out_dir: default_out_dir(),
            baseline: None,
            latency_budget_ms: DEFAULT_LATENCY_BUDGET_MS,
        }
    }
}

fn default_out_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUT_DIR)
}

fn default_latency_budget_ms() -> u64 {
    DEFAULT_LATENCY_BUDGET_MS
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TelemetryLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl TelemetryLevel {
    pub fn level(self) -> Level {
        match self {
            TelemetryLevel::Error => Level::ERROR,
            TelemetryLevel::Warn => Level::WARN,
            TelemetryLevel::Info => Level::INFO,
            TelemetryLevel::Debug => Level::DEBUG,
            TelemetryLevel::Trace => Level::TRACE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPaths {
    pub dir: PathBuf,
    pub deals: PathBuf,
    pub summary: PathBuf,
    pub telemetry: PathBuf,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is not a valid tournament file: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("{}: {source}", path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: ValidationError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("run_id '{0}' must be non-empty and use only letters, digits, '.', '_' or '-'")]
    RunId(String),
    #[error("deals.hands must be at least one")]
    NoHands,
    #[error("deals.doubling {0} is not a level between 0 and 5")]
    Doubling(u8),
    #[error("a match needs exactly two agents, found {0}")]
    AgentCount(usize),
    #[error("agent name '{0}' is empty, repeated or not a plain identifier")]
    AgentName(String),
    #[error("report.baseline '{0}' is not one of the agents")]
    Baseline(String),
    #[error("report.latency_budget_ms must be greater than zero")]
    LatencyBudget,
}
