//! Project (meld) detection and the rule deciding which team scores them.

use crate::model::card::Card;
use crate::model::card_set::CardSet;
use crate::model::contract::{Contract, Mode};
use crate::model::hand::Hand;
use crate::model::player::Seat;
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectKind {
    /// Three cards in sequence.
    Sira,
    /// Four cards in sequence.
    Fifty,
    /// Five or more in sequence, four of a kind of 10/J/Q/K, or four Aces in Hokum.
    Hundred,
    /// Four Aces in Sun.
    FourHundred,
}

impl ProjectKind {
    /// Abnat before mode conversion. Four Aces in Sun carry 200, which the
    /// Sun conversion doubles into 40 game points.
    pub const fn abnat(self) -> u32 {
        match self {
            ProjectKind::Sira => 20,
            ProjectKind::Fifty => 50,
            ProjectKind::Hundred => 100,
            ProjectKind::FourHundred => 200,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub kind: ProjectKind,
    /// Highest card by natural order (7..A).
    pub top: Rank,
    pub length: u8,
    #[serde(skip)]
    pub cards: CardSet,
}

impl Project {
    fn strength(&self) -> (u32, u8, Rank) {
        (self.kind.abnat(), self.length, self.top)
    }
}

const SQUARE_RANKS: [Rank; 5] = [Rank::Ace, Rank::King, Rank::Queen, Rank::Jack, Rank::Ten];

/// Declarable projects in `hand`. Each card belongs to at most one project;
/// four-of-a-kind is claimed before sequences.
pub fn detect_projects(hand: &Hand, mode: Mode) -> Vec<Project> {
    let mut projects = Vec::new();
    let mut free = hand.set();

    for rank in SQUARE_RANKS {
        let square: CardSet = Suit::ALL.iter().map(|suit| Card::new(rank, *suit)).collect();
        if square.intersection(free) != square {
            continue;
        }
        let kind = match (rank, mode) {
            (Rank::Ace, Mode::Sun) => ProjectKind::FourHundred,
            _ => ProjectKind::Hundred,
        };
        projects.push(Project {
            kind,
            top: rank,
            length: 4,
            cards: square,
        });
        free = free.difference(square);
    }

    for suit in Suit::ALL {
        let mut run = CardSet::EMPTY;
        let mut last: Option<Rank> = None;
        for rank in Rank::ORDERED {
            let card = Card::new(rank, suit);
            if free.contains(card) {
                run.insert(card);
                last = Some(rank);
                continue;
            }
            push_run(&mut projects, run, last);
            run = CardSet::EMPTY;
        }
        push_run(&mut projects, run, last);
    }

    projects
}

fn push_run(projects: &mut Vec<Project>, run: CardSet, top: Option<Rank>) {
    let kind = match run.len() {
        0..=2 => return,
        3 => ProjectKind::Sira,
        4 => ProjectKind::Fifty,
        _ => ProjectKind::Hundred,
    };
    if let Some(top) = top {
        projects.push(Project {
            kind,
            top,
            length: run.len() as u8,
            cards: run,
        });
    }
}

/// Project abnat each team may score. Only the team owning the single
/// strongest project scores, and then it scores every project its two seats
/// declared. Exact ties go to the seat nearest `leader` in play order.
pub fn resolve_projects(declarations: &[Vec<Project>; 4], leader: Seat) -> [u32; 2] {
    let mut best: Option<(Seat, (u32, u8, Rank))> = None;
    for seat in leader.rotation() {
        for project in &declarations[seat.index()] {
            let strength = project.strength();
            if best.is_none_or(|(_, current)| strength > current) {
                best = Some((seat, strength));
            }
        }
    }

    let mut totals = [0u32; 2];
    if let Some((seat, _)) = best {
        let team = seat.team();
        totals[team.index()] = team
            .seats()
            .iter()
            .flat_map(|s| declarations[s.index()].iter())
            .map(|project| project.kind.abnat())
            .sum();
    }
    totals
}

/// Seat holding both King and Queen of trump, if any.
pub fn baloot_holder(hands: &[Hand; 4], contract: Contract) -> Option<Seat> {
    let trump = contract.trump()?;
    let pair = [Card::new(Rank::King, trump), Card::new(Rank::Queen, trump)];
    Seat::LOOP
        .into_iter()
        .find(|seat| pair.iter().all(|card| hands[seat.index()].contains(*card)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand(cards: &[&str]) -> Hand {
        Hand::with_cards(cards.iter().map(|c| c.parse::<Card>().unwrap()))
    }

    #[test]
    fn detects_sequences_by_natural_order() {
        let projects = detect_projects(
            &hand(&["9S", "10S", "JS", "7H", "8H", "AC", "KD", "QD"]),
            Mode::Sun,
        );
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].kind, ProjectKind::Sira);
        assert_eq!(projects[0].top, Rank::Jack);
    }

    #[test]
    fn long_runs_are_hundreds() {
        let projects = detect_projects(
            &hand(&["7D", "8D", "9D", "10D", "JD", "AS", "AH", "KC"]),
            Mode::Hokum,
        );
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].kind, ProjectKind::Hundred);
        assert_eq!(projects[0].length, 5);
    }

    #[test]
    fn four_aces_depend_on_mode() {
        let h = hand(&["AS", "AH", "AD", "AC", "7S", "9H", "8D", "QC"]);
        assert_eq!(detect_projects(&h, Mode::Sun)[0].kind, ProjectKind::FourHundred);
        assert_eq!(detect_projects(&h, Mode::Hokum)[0].kind, ProjectKind::Hundred);
    }

    #[test]
    fn square_cards_are_not_reused_in_runs() {
        // Four Kings plus QS/JS: KS belongs to the square, so no Sira remains.
        let h = hand(&["KS", "KH", "KD", "KC", "QS", "JS", "7H", "8C"]);
        let projects = detect_projects(&h, Mode::Sun);
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].kind, ProjectKind::Hundred);
    }

    #[test]
    fn sevens_through_nines_never_form_squares() {
        let h = hand(&["9S", "9H", "9D", "9C", "7S", "7H", "8D", "QC"]);
        assert!(detect_projects(&h, Mode::Hokum).is_empty());
    }

    #[test]
    fn strongest_project_takes_all_for_its_team() {
        let mut declarations: [Vec<Project>; 4] = Default::default();
        declarations[Seat::North.index()] =
            detect_projects(&hand(&["7S", "8S", "9S"]), Mode::Sun);
        declarations[Seat::South.index()] =
            detect_projects(&hand(&["7H", "8H", "9H"]), Mode::Sun);
        declarations[Seat::East.index()] =
            detect_projects(&hand(&["QD", "KD", "AD", "JD"]), Mode::Sun);
        assert_eq!(resolve_projects(&declarations, Seat::North), [0, 50]);
    }

    #[test]
    fn equal_projects_go_to_the_seat_nearest_the_leader() {
        let mut declarations: [Vec<Project>; 4] = Default::default();
        declarations[Seat::North.index()] =
            detect_projects(&hand(&["7S", "8S", "9S"]), Mode::Sun);
        declarations[Seat::West.index()] =
            detect_projects(&hand(&["7H", "8H", "9H"]), Mode::Sun);
        assert_eq!(resolve_projects(&declarations, Seat::North), [20, 0]);
        assert_eq!(resolve_projects(&declarations, Seat::West), [0, 20]);
    }

    #[test]
    fn baloot_needs_king_and_queen_of_trump_together() {
        let mut hands: [Hand; 4] = Default::default();
        hands[Seat::East.index()] = hand(&["KH", "QH"]);
        hands[Seat::North.index()] = hand(&["KS"]);
        hands[Seat::South.index()] = hand(&["QS"]);
        assert_eq!(baloot_holder(&hands, Contract::hokum(Suit::Hearts)), Some(Seat::East));
        assert_eq!(baloot_holder(&hands, Contract::hokum(Suit::Spades)), None);
        assert_eq!(baloot_holder(&hands, Contract::sun()), None);
    }
}
