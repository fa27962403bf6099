mod agents;
mod deal;

pub use deal::DealSetup;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::analytics::{AnalyticsCollector, AnalyticsError};
use agents::AgentBlueprint;
use baloot_bot::{DecisionError, Policy, PolicyContext};
use baloot_core::model::contract::Contract;
use baloot_core::model::player::{Seat, Team};
use baloot_core::model::round::{HandState, PlayOutcome};
use baloot_core::rules::PlayError;
use baloot_core::scoring::{Doubling, HandResult, HandScore, ScoreError};
use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

use crate::config::{BenchmarkConfig, RunPaths};
use crate::telemetry::{
    TelemetryError, TelemetryOutputs, append_highlights_to_markdown, write_summary_outputs,
};

/// Primary entry point for orchestrating tournaments.
pub struct TournamentRunner {
    config: BenchmarkConfig,
    paths: RunPaths,
    agents: Vec<AgentBlueprint>,
    doubling: Doubling,
    logging_enabled: bool,
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub hands_played: usize,
    pub lineups: usize,
    pub rows_written: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub telemetry_path: Option<PathBuf>,
    pub telemetry_outputs: Option<TelemetryOutputs>,
}

impl TournamentRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: BenchmarkConfig) -> Result<Self, RunnerError> {
        let agents = AgentBlueprint::from_configs(&config.agents)?;

        if agents.len() != 2 {
            return Err(RunnerError::AgentCount {
                found: agents.len(),
            });
        }

        let doubling = Doubling::from_level(config.deals.doubling)?;

        Ok(Self {
            logging_enabled: config.telemetry.is_some(),
            paths: config.run_paths(),
            config,
            agents,
            doubling,
        })
    }

    /// Execute the tournament, streaming JSONL rows to disk.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        fs::create_dir_all(&self.paths.dir)?;

        let mut writer = BufWriter::new(File::create(&self.paths.deals)?);
        let mut rng = StdRng::seed_from_u64(self.config.deals.seed.unwrap_or(0));
        let mut rows_written = 0usize;
        let mut analytics = AnalyticsCollector::new(&self.config)?;
        let lineups = self.config.deals.lineups();

        for hand_index in 0..self.config.deals.hands {
            let base_seed = rng.next_u64();
            let setup = DealSetup::from_seed(base_seed, hand_index, self.config.deals.mode);

            for lineup_index in 0..lineups {
                let outcome = self.play_hand(hand_index, lineup_index, base_seed, &setup)?;
                analytics.record_hand(&outcome)?;
                rows_written += write_hand_rows(
                    &mut writer,
                    &self.config,
                    hand_index,
                    lineup_index,
                    base_seed,
                    &outcome,
                )?;
            }
        }

        writer.flush()?;

        let summary = analytics.finalize()?;
        summary.write_markdown(&self.paths.summary)?;

        let telemetry_path = self.logging_enabled.then(|| self.paths.telemetry.clone());

        let telemetry_outputs = if let Some(path) = telemetry_path.as_ref() {
            write_summary_outputs(path, &self.paths.dir)?
        } else {
            None
        };

        if let Some(outputs) = telemetry_outputs.as_ref() {
            append_highlights_to_markdown(&self.paths.summary, outputs)?;
        }

        Ok(RunSummary {
            hands_played: self.config.deals.hands,
            lineups,
            rows_written,
            jsonl_path: self.paths.deals.clone(),
            summary_path: self.paths.summary.clone(),
            telemetry_path,
            telemetry_outputs,
        })
    }

    /// Lineup 0 seats the first agent as North/South; lineup 1 swaps teams.
    fn team_agents(&self, lineup_index: usize) -> [usize; 2] {
        if lineup_index % 2 == 0 { [0, 1] } else { [1, 0] }
    }

    fn play_hand(
        &self,
        hand_index: usize,
        lineup_index: usize,
        base_seed: u64,
        setup: &DealSetup,
    ) -> Result<HandOutcome, RunnerError> {
        let team_agents = self.team_agents(lineup_index);
        let mut seats = Vec::with_capacity(4);
        for seat in Seat::LOOP {
            let agent = &self.agents[team_agents[seat.team().index()]];
            let seed = base_seed ^ ((seat.index() as u64 + 1) << 32) ^ lineup_index as u64;
            seats.push(SeatState {
                agent_name: agent.name.clone(),
                policy: agent.spawn_policy(seed)?,
                metrics: DecisionMetrics::default(),
            });
        }

        let mut state = HandState::deal(
            &setup.deck,
            setup.starting_player,
            setup.contract,
            setup.bidder,
        );

        while let Some(seat) = state.next_to_play() {
            let seat_state = &mut seats[seat.index()];
            let hand = *state.hand(seat);
            let ctx = PolicyContext::new(seat, &hand, state.table_view());
            let start = Instant::now();
            let card = seat_state
                .policy
                .propose_move(&ctx)
                .map_err(|source| RunnerError::Decision {
                    agent: seat_state.agent_name.clone(),
                    seat,
                    source,
                })?;
            let elapsed_ms = seat_state.metrics.record(start.elapsed());

            let outcome = state.play_card(seat, card).map_err(|source| RunnerError::Play {
                agent: seat_state.agent_name.clone(),
                seat,
                source,
            })?;

            if self.logging_enabled && tracing::enabled!(Level::INFO) {
                let trick_winner = match outcome {
                    PlayOutcome::TrickCompleted { winner, .. } => Some(winner.label()),
                    PlayOutcome::Played => None,
                };
                event!(
                    target: "baloot_bench::play",
                    Level::INFO,
                    run_id = %self.config.run_id,
                    hand_index = hand_index as u32,
                    lineup_index = lineup_index as u32,
                    seat = seat.label(),
                    agent = %seat_state.agent_name,
                    card = %card,
                    trick_winner,
                    elapsed_ms
                );
            }
        }

        let score = state.score(self.doubling)?;

        if self.logging_enabled && tracing::enabled!(Level::INFO) {
            event!(
                target: "baloot_bench::hand",
                Level::INFO,
                run_id = %self.config.run_id,
                hand_index = hand_index as u32,
                lineup_index = lineup_index as u32,
                contract = %setup.contract,
                bidder = setup.bidder.label(),
                raw_ns = state.raw_abnat()[0],
                raw_ew = state.raw_abnat()[1],
                points_ns = score.points[0],
                points_ew = score.points[1],
                kaboot = score.kaboot.is_some(),
                khasara = score.khasara
            );
        }

        let team_results = Team::BOTH.map(|team| {
            let [first, second] = team.seats();
            let metrics = seats[first.index()]
                .metrics
                .merged(&seats[second.index()].metrics)
                .finalize();
            TeamResult {
                team,
                agent_name: self.agents[team_agents[team.index()]].name.clone(),
                raw_abnat: state.raw_abnat()[team.index()],
                project_abnat: state.project_abnat()[team.index()],
                points: score.points(team),
                metrics,
            }
        });

        Ok(HandOutcome {
            contract: setup.contract,
            bidder: setup.bidder,
            starting_player: setup.starting_player,
            score,
            team_results,
        })
    }
}

fn write_hand_rows(
    writer: &mut BufWriter<File>,
    config: &BenchmarkConfig,
    hand_index: usize,
    lineup_index: usize,
    base_seed: u64,
    outcome: &HandOutcome,
) -> Result<usize, RunnerError> {
    let deal_id = format!("H{hand_index:05}_L{lineup_index}");

    let mut rows_written = 0usize;
    for result in &outcome.team_results {
        let opponent = &outcome.team_results[result.team.opponent().index()];
        let row = DealLogRow {
            run_id: config.run_id.clone(),
            deal_id: deal_id.clone(),
            hand_index,
            lineup_index,
            deal_seed: base_seed,
            contract: outcome.contract.to_string(),
            starting_player: outcome.starting_player.label(),
            team: result.team.label(),
            agent: result.agent_name.clone(),
            opponent: opponent.agent_name.clone(),
            bidder: outcome.bidder == result.team,
            raw_abnat: result.raw_abnat,
            project_abnat: result.project_abnat,
            points: result.points,
            opponent_points: opponent.points,
            result: outcome.result_for(result.team),
            kaboot: outcome.score.kaboot == Some(result.team),
            khasara: outcome.score.khasara && outcome.bidder == result.team,
            speed_ms_turn: result.metrics.avg_ms_per_decision,
            decisions: result.metrics.decisions,
        };

        serde_json::to_writer(&mut *writer, &row)?;
        writer.write_all(b"\n")?;
        rows_written += 1;
    }

    Ok(rows_written)
}

struct SeatState {
    agent_name: String,
    policy: Box<dyn Policy>,
    metrics: DecisionMetrics,
}

pub struct HandOutcome {
    pub contract: Contract,
    pub bidder: Team,
    pub starting_player: Seat,
    pub score: HandScore,
    pub team_results: [TeamResult; 2],
}

impl HandOutcome {
    pub fn result_for(&self, team: Team) -> HandResultLabel {
        match self.score.result {
            HandResult::Tie => HandResultLabel::Tie,
            HandResult::Winner(winner) if winner == team => HandResultLabel::Win,
            HandResult::Winner(_) => HandResultLabel::Loss,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HandResultLabel {
    Win,
    Loss,
    Tie,
}

pub struct TeamResult {
    pub team: Team,
    pub agent_name: String,
    pub raw_abnat: u32,
    pub project_abnat: u32,
    pub points: u32,
    pub metrics: DecisionSummary,
}

#[derive(Default, Clone)]
struct DecisionMetrics {
    total: Duration,
    decisions: u32,
}

impl DecisionMetrics {
    fn record(&mut self, duration: Duration) -> f64 {
        self.total += duration;
        self.decisions += 1;
        duration.as_secs_f64() * 1000.0
    }

    fn merged(&self, other: &DecisionMetrics) -> DecisionMetrics {
        DecisionMetrics {
            total: self.total + other.total,
            decisions: self.decisions + other.decisions,
        }
    }

    fn finalize(self) -> DecisionSummary {
        let avg_ms = if self.decisions == 0 {
            0.0
        } else {
            self.total.as_secs_f64() * 1000.0 / f64::from(self.decisions)
        };

        DecisionSummary {
            decisions: self.decisions,
            avg_ms_per_decision: avg_ms,
            total_ms: self.total.as_secs_f64() * 1000.0,
        }
    }
}

#[derive(Clone)]
pub struct DecisionSummary {
    pub decisions: u32,
    pub avg_ms_per_decision: f64,
    pub total_ms: f64,
}

#[derive(Serialize)]
struct DealLogRow {
    run_id: String,
    deal_id: String,
    hand_index: usize,
    lineup_index: usize,
    deal_seed: u64,
    contract: String,
    starting_player: &'static str,
    team: &'static str,
    agent: String,
    opponent: String,
    bidder: bool,
    raw_abnat: u32,
    project_abnat: u32,
    points: u32,
    opponent_points: u32,
    result: HandResultLabel,
    kaboot: bool,
    khasara: bool,
    speed_ms_turn: f64,
    decisions: u32,
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("{0}")]
    Agent(#[from] AgentError),
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize log row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("agent '{agent}' at {seat} failed to decide: {source}")]
    Decision {
        agent: String,
        seat: Seat,
        #[source]
        source: DecisionError,
    },
    #[error("agent '{agent}' at {seat} made an illegal play: {source}")]
    Play {
        agent: String,
        seat: Seat,
        #[source]
        source: PlayError,
    },
    #[error("scoring failed: {0}")]
    Score(#[from] ScoreError),
    #[error("configuration requires exactly 2 agents but found {found}")]
    AgentCount { found: usize },
    #[error("analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
    #[error("telemetry summarisation failed: {0}")]
    Telemetry(#[from] TelemetryError),
}

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("invalid search parameter for agent '{name}': {message}")]
    InvalidSearchParam { name: String, message: String },
    #[error("failed to start agent '{name}': {message}")]
    Spawn { name: String, message: String },
}
