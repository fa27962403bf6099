use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use thiserror::Error;

use crate::config::{AgentConfig, AgentKind, BenchmarkConfig};
use crate::tournament::{DecisionSummary, HandOutcome, HandResultLabel};

const CONFIDENCE_LEVEL: f64 = 0.95;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("baseline agent '{0}' not present in tournament results")]
    MissingBaseline(String),
    #[error("agent '{0}' defined in results but missing from configuration")]
    UnknownAgent(String),
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("statistics error: {0}")]
    Stats(#[from] statrs::StatsError),
}

pub struct AnalyticsCollector {
    baseline: String,
    agents: HashMap<String, AgentAccumulator>,
    comparison: ComparisonAccumulator,
    agent_order: Vec<String>,
    latency_budget_ms: u64,
}

impl AnalyticsCollector {
    pub fn new(config: &BenchmarkConfig) -> Result<Self, AnalyticsError> {
        let baseline = config
            .report
            .baseline
            .clone()
            .ok_or_else(|| AnalyticsError::MissingBaseline("<unset>".into()))?;

        let mut agents = HashMap::new();
        let mut order = Vec::new();
        for agent in &config.agents {
            agents.insert(
                agent.name.clone(),
                AgentAccumulator::new(agent.clone(), config.report.latency_budget_ms),
            );
            order.push(agent.name.clone());
        }

        if !agents.contains_key(&baseline) {
            return Err(AnalyticsError::MissingBaseline(baseline));
        }

        Ok(Self {
            baseline,
            agents,
            comparison: ComparisonAccumulator::default(),
            agent_order: order,
            latency_budget_ms: config.report.latency_budget_ms,
        })
    }

    pub fn record_hand(&mut self, outcome: &HandOutcome) -> Result<(), AnalyticsError> {
        for result in &outcome.team_results {
            let acc = self
                .agents
                .get_mut(&result.agent_name)
                .ok_or_else(|| AnalyticsError::UnknownAgent(result.agent_name.clone()))?;

            let bidder = outcome.bidder == result.team;
            acc.record_hand(HandSample {
                points: f64::from(result.points),
                result: outcome.result_for(result.team),
                bidder,
                made_contract: bidder && !outcome.score.khasara,
                kaboot: outcome.score.kaboot == Some(result.team),
                metrics: &result.metrics,
            });
        }

        let [ns, ew] = &outcome.team_results;
        if ns.agent_name != ew.agent_name {
            let (candidate, baseline) = if ns.agent_name == self.baseline {
                (ew, ns)
            } else {
                (ns, ew)
            };
            self.comparison
                .record(f64::from(candidate.points) - f64::from(baseline.points));
        }

        Ok(())
    }

    pub fn finalize(mut self) -> Result<AnalyticsSummary, AnalyticsError> {
        let z = Normal::new(0.0, 1.0)?.inverse_cdf(0.5 + CONFIDENCE_LEVEL / 2.0);

        let mut reports = Vec::new();
        for name in &self.agent_order {
            if let Some(acc) = self.agents.remove(name) {
                reports.push(acc.into_report(z));
            }
        }

        let (p_value, sample_size) = self.comparison.wilcoxon_signed_rank()?;

        Ok(AnalyticsSummary {
            baseline: self.baseline,
            agents: reports,
            p_value,
            sample_size,
            latency_budget_ms: self.latency_budget_ms,
        }
        .enrich())
    }
}

struct HandSample<'a> {
    points: f64,
    result: HandResultLabel,
    bidder: bool,
    made_contract: bool,
    kaboot: bool,
    metrics: &'a DecisionSummary,
}

struct AgentAccumulator {
    config: AgentConfig,
    per_hand_points: Vec<f64>,
    wins: u32,
    ties: u32,
    bids: u32,
    bids_made: u32,
    kaboots: u32,
    total_latency_ms: f64,
    total_decisions: u64,
    latency_budget_ms: u64,
}

impl AgentAccumulator {
    fn new(config: AgentConfig, latency_budget_ms: u64) -> Self {
        Self {
            config,
            per_hand_points: Vec::new(),
            wins: 0,
            ties: 0,
            bids: 0,
            bids_made: 0,
            kaboots: 0,
            total_latency_ms: 0.0,
            total_decisions: 0,
            latency_budget_ms,
        }
    }

    fn record_hand(&mut self, sample: HandSample<'_>) {
        self.per_hand_points.push(sample.points);
        match sample.result {
            HandResultLabel::Win => self.wins += 1,
            HandResultLabel::Tie => self.ties += 1,
            HandResultLabel::Loss => {}
        }
        if sample.bidder {
            self.bids += 1;
        }
        if sample.made_contract {
            self.bids_made += 1;
        }
        if sample.kaboot {
            self.kaboots += 1;
        }
        self.total_latency_ms += sample.metrics.total_ms;
        self.total_decisions += u64::from(sample.metrics.decisions);
    }

    fn into_report(self, z: f64) -> AgentReport {
        let hands = self.per_hand_points.len();
        let avg_points = mean(&self.per_hand_points);
        let ci95 = confidence_interval(&self.per_hand_points, z);

        let avg_latency = if self.total_decisions == 0 {
            0.0
        } else {
            self.total_latency_ms / self.total_decisions as f64
        };

        AgentReport {
            name: self.config.name.clone(),
            kind: self.config.kind.clone(),
            params: self.config.params.clone(),
            hands,
            avg_points,
            ci95,
            wins: self.wins as usize,
            ties: self.ties as usize,
            bids: self.bids as usize,
            bids_made: self.bids_made as usize,
            kaboots: self.kaboots as usize,
            average_ms_per_decision: avg_latency,
            delta_vs_baseline: 0.0,
            over_budget: avg_latency > self.latency_budget_ms as f64,
        }
    }
}

#[derive(Clone, Default)]
struct ComparisonAccumulator {
    diffs: Vec<f64>,
}

impl ComparisonAccumulator {
    fn record(&mut self, diff: f64) {
        self.diffs.push(diff);
    }

    /// Two-sided Wilcoxon signed-rank test on the paired per-hand differences,
    /// normal approximation with tie correction. Zero differences are dropped.
    fn wilcoxon_signed_rank(self) -> Result<(f64, usize), AnalyticsError> {
        let diffs: Vec<f64> = self
            .diffs
            .into_iter()
            .filter(|d| d.abs() > f64::EPSILON)
            .collect();
        let n = diffs.len();
        if n == 0 {
            return Ok((1.0, 0));
        }

        let mut paired: Vec<(f64, f64)> =
            diffs.into_iter().map(|d| (d.abs(), d.signum())).collect();
        paired.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut ranks = Vec::with_capacity(n);
        let mut tie_sizes = Vec::new();
        let mut i = 0;
        while i < paired.len() {
            let mut j = i;
            while j + 1 < paired.len() && (paired[j + 1].0 - paired[i].0).abs() < 1e-12 {
                j += 1;
            }
            let rank = (i + j + 2) as f64 / 2.0;
            for entry in &paired[i..=j] {
                ranks.push((rank, entry.1));
            }
            if j > i {
                tie_sizes.push(j - i + 1);
            }
            i = j + 1;
        }

        let w_plus: f64 = ranks
            .iter()
            .filter(|(_, sign)| *sign > 0.0)
            .map(|(rank, _)| *rank)
            .sum();
        let w_minus: f64 = ranks
            .iter()
            .filter(|(_, sign)| *sign < 0.0)
            .map(|(rank, _)| *rank)
            .sum();

        let w = w_plus.min(w_minus);
        let n_f = n as f64;
        let mean_w = n_f * (n_f + 1.0) / 4.0;

        let tie_adjustment: f64 = tie_sizes
            .into_iter()
            .map(|count| {
                let c = count as f64;
                (c.powi(3) - c) / 48.0
            })
            .sum();
        let variance_w = n_f * (n_f + 1.0) * (2.0 * n_f + 1.0) / 24.0 - tie_adjustment;
        if variance_w <= 0.0 {
            return Ok((1.0, n));
        }

        let z = ((w - mean_w).abs() - 0.5).max(0.0) / variance_w.sqrt();
        let normal = Normal::new(0.0, 1.0)?;
        let p = 2.0 * (1.0 - normal.cdf(z));
        Ok((p.clamp(0.0, 1.0), n))
    }
}

#[derive(Debug, Serialize)]
pub struct AnalyticsSummary {
    pub baseline: String,
    pub agents: Vec<AgentReport>,
    /// Wilcoxon p-value for the non-baseline agent's per-hand point margin.
    pub p_value: f64,
    pub sample_size: usize,
    pub latency_budget_ms: u64,
}

impl AnalyticsSummary {
    pub fn enrich(mut self) -> Self {
        let baseline_avg = self
            .agents
            .iter()
            .find(|agent| agent.name == self.baseline)
            .map(|agent| agent.avg_points)
            .unwrap_or(0.0);

        for agent in &mut self.agents {
            agent.delta_vs_baseline = agent.avg_points - baseline_avg;
        }

        self
    }

    pub fn render_markdown(&self) -> String {
        let mut rows = String::new();
        rows.push_str("# Tournament Summary\n\n");
        rows.push_str(&format!("Baseline: `{}`\n\n", self.baseline));
        rows.push_str(&format!(
            "Latency budget: {} ms average per decision\n\n",
            self.latency_budget_ms
        ));
        rows.push_str("| Agent | Kind | Hands | Avg points | Δ vs baseline | 95% CI | Win % | Tie % | Bids made | Kaboots | Avg ms/decision | Over Budget |\n");
        rows.push_str("|-------|------|-------|------------|----------------|--------|-------|-------|-----------|---------|------------------|-------------|\n");

        for agent in &self.agents {
            let rate = |count: usize| {
                if agent.hands == 0 {
                    0.0
                } else {
                    count as f64 / agent.hands as f64 * 100.0
                }
            };

            rows.push_str(&format!(
                "| {name} | {kind:?} | {hands} | {avg:.3} | {delta:+.3} | [{ci_low:.3}, {ci_high:.3}] | {win:.1}% | {tie:.1}% | {made}/{bids} | {kaboots} | {latency:.2} | {over_budget} |\n",
                name = agent.name,
                kind = agent.kind,
                hands = agent.hands,
                avg = agent.avg_points,
                delta = agent.delta_vs_baseline,
                ci_low = agent.ci95.0,
                ci_high = agent.ci95.1,
                win = rate(agent.wins),
                tie = rate(agent.ties),
                made = agent.bids_made,
                bids = agent.bids,
                kaboots = agent.kaboots,
                latency = agent.average_ms_per_decision,
                over_budget = if agent.over_budget { "Yes" } else { "No" },
            ));
        }

        rows.push_str(&format!(
            "\nWilcoxon signed-rank on per-hand margins: p = {:.4} (n = {})\n",
            self.p_value, self.sample_size
        ));
        rows
    }

    pub fn write_markdown(&self, path: impl AsRef<Path>) -> Result<(), AnalyticsError> {
        fs::write(path.as_ref(), self.render_markdown()).map_err(|e| AnalyticsError::Io {
            context: "writing summary markdown",
            source: e,
        })?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentReport {
    pub name: String,
    pub kind: AgentKind,
    pub params: serde_yaml::Value,
    pub hands: usize,
    pub avg_points: f64,
    pub ci95: (f64, f64),
    pub wins: usize,
    pub ties: usize,
    pub bids: usize,
    pub bids_made: usize,
    pub kaboots: usize,
    pub average_ms_per_decision: f64,
    #[serde(skip)]
    pub delta_vs_baseline: f64,
    #[serde(skip)]
    pub over_budget: bool,
}

fn mean(points: &[f64]) -> f64 {
    if points.is_empty() {
        0.0
    } else {
        points.iter().sum::<f64>() / points.len() as f64
    }
}

fn confidence_interval(points: &[f64], z: f64) -> (f64, f64) {
    if points.is_empty() {
        return (0.0, 0.0);
    }
    let mean = mean(points);
    if points.len() == 1 {
        return (mean, mean);
    }
    let variance = points
        .iter()
        .map(|value| (value - mean).powi(2))
        .sum::<f64>()
        / (points.len() as f64 - 1.0);
    let std_error = (variance / points.len() as f64).sqrt();
    let margin = z * std_error;
    (mean - margin, mean + margin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_interval_brackets_the_mean() {
        let z = Normal::new(0.0, 1.0).unwrap().inverse_cdf(0.975);
        assert!((z - 1.96).abs() < 1e-3);
        let (low, high) = confidence_interval(&[10.0, 12.0, 14.0, 16.0], z);
        assert!(low < 13.0 && high > 13.0);
        assert!(((low + high) / 2.0 - 13.0).abs() < 1e-9);
        assert_eq!(confidence_interval(&[7.0], z), (7.0, 7.0));
    }

    #[test]
    fn wilcoxon_detects_consistent_margin() {
        let mut acc = ComparisonAccumulator::default();
        for diff in 1..=30 {
            acc.record(f64::from(diff));
        }
        let (p, n) = acc.wilcoxon_signed_rank().unwrap();
        assert_eq!(n, 30);
        assert!(p < 0.001);
    }

    #[test]
    fn wilcoxon_ignores_zero_differences() {
        let mut acc = ComparisonAccumulator::default();
        acc.record(0.0);
        acc.record(0.0);
        let (p, n) = acc.wilcoxon_signed_rank().unwrap();
        assert_eq!(n, 0);
        assert_eq!(p, 1.0);
    }

    #[test]
    fn markdown_lists_every_agent() {
        let report = |name: &str, avg: f64| AgentReport {
            name: name.to_string(),
            kind: AgentKind::Random,
            params: serde_yaml::Value::Null,
            hands: 4,
            avg_points: avg,
            ci95: (avg - 1.0, avg + 1.0),
            wins: 2,
            ties: 0,
            bids: 2,
            bids_made: 1,
            kaboots: 0,
            average_ms_per_decision: 0.5,
            delta_vs_baseline: 0.0,
            over_budget: false,
        };
        let summary = AnalyticsSummary {
            baseline: "random".to_string(),
            agents: vec![report("search", 14.0), report("random", 10.0)],
            p_value: 0.2,
            sample_size: 4,
            latency_budget_ms: 1_200,
        }
        .enrich();
        assert!((summary.agents[0].delta_vs_baseline - 4.0).abs() < 1e-9);
        let markdown = summary.render_markdown();
        assert!(markdown.contains("| search | Random | 4 | 14.000 | +4.000 |"));
        assert!(markdown.contains("| random |"));
        assert!(markdown.contains("1/2"));
        assert!(markdown.contains("p = 0.2000"));
    }
}
