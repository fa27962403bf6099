use std::time::Duration;

pub const DEFAULT_ITERATIONS: usize = 400;

/// Knobs for one search decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchParams {
    pub iterations: usize,
    pub seed: u64,
    /// Stop issuing iterations once this much wall-clock time has passed.
    pub time_budget: Option<Duration>,
    pub respect_voids: bool,
    /// Worker threads for rollouts; `None` uses the global rayon pool.
    pub workers: Option<usize>,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            seed: 0,
            time_budget: None,
            respect_voids: false,
            workers: None,
        }
    }
}

impl SearchParams {
    pub fn from_env() -> Self {
        Self::from_reader(|key| std::env::var(key).ok())
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_time_budget(mut self, budget: Option<Duration>) -> Self {
        self.time_budget = budget;
        self
    }

    pub fn with_respect_voids(mut self, enabled: bool) -> Self {
        self.respect_voids = enabled;
        self
    }

    pub fn with_workers(mut self, workers: Option<usize>) -> Self {
        self.workers = workers.filter(|&n| n > 0);
        self
    }

    /// Applies `BALOOT_SEARCH_*` overrides on top of the defaults. Values
    /// that fail to parse are ignored.
    pub fn from_reader<F>(mut read: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let iterations = read("BALOOT_SEARCH_ITERATIONS")
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|value| *value > 0)
            .unwrap_or(defaults.iterations);

        let time_budget = read("BALOOT_SEARCH_TIME_MS")
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|value| *value > 0)
            .map(Duration::from_millis);

        let respect_voids = read("BALOOT_SEARCH_VOIDS")
            .map(|raw| matches!(raw.trim(), "1" | "true" | "TRUE" | "on" | "ON"))
            .unwrap_or(defaults.respect_voids);

        let seed = read("BALOOT_SEARCH_SEED")
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .unwrap_or(defaults.seed);

        let workers = read("BALOOT_SEARCH_WORKERS")
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|value| *value > 0);

        Self {
            iterations,
            seed,
            time_budget,
            respect_voids,
            workers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_ITERATIONS, SearchParams};
    use std::collections::HashMap;
    use std::time::Duration;

    #[test]
    fn search_params_default_fallbacks() {
        let params = SearchParams::from_reader(|_| None);
        assert_eq!(params, SearchParams::default());
        assert_eq!(params.iterations, DEFAULT_ITERATIONS);
    }

    #[test]
    fn search_params_respect_overrides() {
        let mut vars = HashMap::new();
        vars.insert("BALOOT_SEARCH_ITERATIONS".to_string(), "1200".to_string());
        vars.insert("BALOOT_SEARCH_TIME_MS".to_string(), "250".to_string());
        vars.insert("BALOOT_SEARCH_VOIDS".to_string(), "on".to_string());
        vars.insert("BALOOT_SEARCH_SEED".to_string(), "77".to_string());
        vars.insert("BALOOT_SEARCH_WORKERS".to_string(), "2".to_string());

        let params = SearchParams::from_reader(|key| vars.get(key).cloned());
        assert_eq!(params.iterations, 1200);
        assert_eq!(params.time_budget, Some(Duration::from_millis(250)));
        assert!(params.respect_voids);
        assert_eq!(params.seed, 77);
        assert_eq!(params.workers, Some(2));
    }

    #[test]
    fn search_params_ignore_garbage() {
        let mut vars = HashMap::new();
        vars.insert("BALOOT_SEARCH_ITERATIONS".to_string(), "0".to_string());
        vars.insert("BALOOT_SEARCH_TIME_MS".to_string(), "soon".to_string());
        let params = SearchParams::from_reader(|key| vars.get(key).cloned());
        assert_eq!(params.iterations, DEFAULT_ITERATIONS);
        assert_eq!(params.time_budget, None);
    }
}
