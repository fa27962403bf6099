//! Converts a hand's raw abnat into game points.
//!
//! The pipeline runs in a fixed order: kaboot, abnat conversion with the
//! rounding remainder credited to the bidder, project conversion, khasara,
//! doubling, and finally the Baloot bonus which no multiplier touches.

mod doubling;

pub use doubling::{Doubling, GAHWA_POINTS};

use crate::model::contract::Mode;
use crate::model::player::Team;
use thiserror::Error;

/// Game points for holding King and Queen of trump.
pub const BALOOT_BONUS: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreError {
    #[error("raw abnat totals {found} but a {mode} hand always totals {expected}")]
    AbnatMismatch { mode: Mode, expected: u32, found: u32 },
    #[error("a Baloot bonus requires a trump suit")]
    BalootWithoutTrump,
    #[error("doubling level {0} is not defined")]
    InvalidDoubling(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreInput {
    pub mode: Mode,
    pub raw_abnat: [u32; 2],
    pub project_abnat: [u32; 2],
    pub doubling: Doubling,
    pub bidder: Team,
    pub baloot_holder: Option<Team>,
    /// Tricks taken by each team, when the caller tracked them. Without it a
    /// sweep is inferred from one team holding no raw abnat, which misses
    /// tricks made only of zero-point cards.
    pub tricks_won: Option<[u8; 2]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandResult {
    Winner(Team),
    Tie,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandScore {
    pub points: [u32; 2],
    pub result: HandResult,
    pub kaboot: Option<Team>,
    pub khasara: bool,
}

impl HandScore {
    pub fn points(&self, team: Team) -> u32 {
        self.points[team.index()]
    }

    pub fn winner(&self) -> Option<Team> {
        match self.result {
            HandResult::Winner(team) => Some(team),
            HandResult::Tie => None,
        }
    }
}

/// Game points for `raw` abnat when nobody swept.
///
/// Sun floors `raw / 5`. Hokum rounds `raw / 10` with a remainder of exactly
/// five rounding down and anything above it rounding up.
pub const fn convert_abnat(raw: u32, mode: Mode) -> u32 {
    match mode {
        Mode::Sun => raw / 5,
        Mode::Hokum => {
            if raw % 10 > 5 {
                raw / 10 + 1
            } else {
                raw / 10
            }
        }
    }
}

pub const fn convert_projects(value: u32, mode: Mode) -> u32 {
    match mode {
        Mode::Sun => value * 2 / 10,
        Mode::Hokum => value / 10,
    }
}

pub fn score_hand(input: &ScoreInput) -> Result<HandScore, ScoreError> {
    let mode = input.mode;
    let found = input.raw_abnat[0] + input.raw_abnat[1];
    if found != mode.pool_abnat() {
        return Err(ScoreError::AbnatMismatch {
            mode,
            expected: mode.pool_abnat(),
            found,
        });
    }
    if input.baloot_holder.is_some() && mode == Mode::Sun {
        return Err(ScoreError::BalootWithoutTrump);
    }

    let projects = input.project_abnat.map(|value| convert_projects(value, mode));
    let project_total = projects[0] + projects[1];
    let mut points = [0u32; 2];
    let mut khasara = false;

    let kaboot = sweeping_team(input);

    if let Some(sweeper) = kaboot {
        points[sweeper.index()] = mode.kaboot_points() + project_total;
    } else {
        let bidder = input.bidder;
        let defender = bidder.opponent();
        let defender_base = convert_abnat(input.raw_abnat[defender.index()], mode);
        let bidder_base = mode.pool_points().saturating_sub(defender_base);

        points[bidder.index()] = bidder_base + projects[bidder.index()];
        points[defender.index()] = defender_base + projects[defender.index()];

        if points[bidder.index()] <= points[defender.index()] {
            khasara = true;
            points[bidder.index()] = 0;
            points[defender.index()] = mode.pool_points() + project_total;
        }

        apply_doubling(&mut points, input.doubling);
    }

    if let Some(holder) = input.baloot_holder {
        points[holder.index()] += BALOOT_BONUS;
    }

    let result = match points[0].cmp(&points[1]) {
        core::cmp::Ordering::Greater => HandResult::Winner(Team::NorthSouth),
        core::cmp::Ordering::Less => HandResult::Winner(Team::EastWest),
        core::cmp::Ordering::Equal => HandResult::Tie,
    };

    Ok(HandScore {
        points,
        result,
        kaboot,
        khasara,
    })
}

fn sweeping_team(input: &ScoreInput) -> Option<Team> {
    Team::BOTH.into_iter().find(|team| {
        let other = team.opponent().index();
        match input.tricks_won {
            Some(tricks) => tricks[other] == 0,
            None => input.raw_abnat[other] == 0,
        }
    })
}

fn apply_doubling(points: &mut [u32; 2], doubling: Doubling) {
    if !doubling.is_doubled() || points[0] == points[1] {
        return;
    }
    let (winner, loser) = if points[0] > points[1] { (0, 1) } else { (1, 0) };
    points[winner] = match doubling.multiplier() {
        Some(multiplier) => (points[0] + points[1]) * multiplier,
        None => GAHWA_POINTS,
    };
    points[loser] = 0;
}
