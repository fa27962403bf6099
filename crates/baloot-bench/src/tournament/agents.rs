use super::AgentError;
use crate::config::{AgentConfig, AgentKind};
use baloot_bot::{Policy, RandomPolicy, SearchParams, SearchPolicy};
use std::time::Duration;

pub(super) struct AgentBlueprint {
    pub(super) name: String,
    implementation: AgentImplementation,
}

enum AgentImplementation {
    Search(SearchParams),
    Random,
}

impl AgentBlueprint {
    pub(super) fn from_configs(configs: &[AgentConfig]) -> Result<Vec<Self>, AgentError> {
        configs.iter().map(Self::from_config).collect()
    }

    fn from_config(config: &AgentConfig) -> Result<Self, AgentError> {
        let implementation = match config.kind {
            AgentKind::Search => {
                AgentImplementation::Search(search_params(&config.name, &config.params)?)
            }
            AgentKind::Random => AgentImplementation::Random,
        };

        Ok(Self {
            name: config.name.clone(),
            implementation,
        })
    }

    /// One policy instance per seat; `seed` keeps seats and deals independent.
    pub(super) fn spawn_policy(&self, seed: u64) -> Result<Box<dyn Policy>, AgentError> {
        match &self.implementation {
            AgentImplementation::Search(params) => {
                let policy = SearchPolicy::new(params.with_seed(params.seed ^ seed)).map_err(
                    |err| AgentError::Spawn {
                        name: self.name.clone(),
                        message: err.to_string(),
                    },
                )?;
                Ok(Box::new(policy))
            }
            AgentImplementation::Random => Ok(Box::new(RandomPolicy::new(seed))),
        }
    }
}

/// Starts from the `BALOOT_SEARCH_*` environment and applies YAML params on top.
fn search_params(name: &str, params: &serde_yaml::Value) -> Result<SearchParams, AgentError> {
    let mut search = SearchParams::from_env();
    if params.is_null() {
        return Ok(search);
    }

    let mapping = params
        .as_mapping()
        .ok_or_else(|| AgentError::InvalidSearchParam {
            name: name.to_string(),
            message: "expected mapping for search params".to_string(),
        })?;

    let invalid = |message: &str| AgentError::InvalidSearchParam {
        name: name.to_string(),
        message: message.to_string(),
    };

    for (key, value) in mapping {
        match key.as_str() {
            Some("iterations") => {
                let iterations = value
                    .as_u64()
                    .filter(|v| *v > 0)
                    .ok_or_else(|| invalid("iterations must be a positive integer"))?;
                search = search.with_iterations(iterations as usize);
            }
            Some("time_budget_ms") => {
                let millis = value
                    .as_u64()
                    .ok_or_else(|| invalid("time_budget_ms must be an integer"))?;
                search = search.with_time_budget(Some(Duration::from_millis(millis)));
            }
            Some("respect_voids") => {
                let enabled = value
                    .as_bool()
                    .ok_or_else(|| invalid("respect_voids must be a boolean"))?;
                search = search.with_respect_voids(enabled);
            }
            Some("workers") => {
                let workers = value
                    .as_u64()
                    .ok_or_else(|| invalid("workers must be an integer"))?;
                search = search.with_workers(Some(workers as usize));
            }
            Some("seed") => {
                let seed = value
                    .as_u64()
                    .ok_or_else(|| invalid("seed must be an integer"))?;
                search = search.with_seed(seed);
            }
            Some(other) => {
                return Err(AgentError::InvalidSearchParam {
                    name: name.to_string(),
                    message: format!("unknown parameter '{other}'"),
                });
            }
            None => return Err(invalid("parameter names must be strings")),
        }
    }

    Ok(search)
}
