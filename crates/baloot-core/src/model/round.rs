use crate::model::card::Card;
use crate::model::card_set::CardSet;
use crate::model::contract::{Contract, LAST_TRICK_BONUS};
use crate::model::deck::{Deck, HAND_SIZE};
use crate::model::hand::Hand;
use crate::model::player::{Seat, Team};
use crate::model::table::TableView;
use crate::model::trick::Trick;
use crate::projects::{Project, baloot_holder, detect_projects, resolve_projects};
use crate::rules::{PlayError, check_play, legal_moves, resolve_trick};
use crate::scoring::{Doubling, HandScore, ScoreError, ScoreInput, score_hand};
use std::array;

/// One hand of play at the real table, from the deal to the last trick.
#[derive(Debug, Clone)]
pub struct HandState {
    hands: [Hand; 4],
    contract: Contract,
    bidder: Team,
    starting_player: Seat,
    current_trick: Trick,
    trick_history: Vec<Trick>,
    raw_abnat: [u32; 2],
    tricks_won: [u8; 2],
    projects: [Vec<Project>; 4],
    project_abnat: [u32; 2],
    baloot: Option<Seat>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    Played,
    TrickCompleted {
        winner: Seat,
        abnat: u32,
        last_trick: bool,
    },
}

impl HandState {
    /// Deals `deck` starting with `starting_player`, who also leads the first trick.
    pub fn deal(deck: &Deck, starting_player: Seat, contract: Contract, bidder: Team) -> Self {
        Self::from_hands(deck.deal(starting_player), starting_player, contract, bidder)
    }

    pub fn from_hands(
        hands: [Hand; 4],
        starting_player: Seat,
        contract: Contract,
        bidder: Team,
    ) -> Self {
        let projects: [Vec<Project>; 4] =
            array::from_fn(|idx| detect_projects(&hands[idx], contract.mode()));
        let project_abnat = resolve_projects(&projects, starting_player);
        let baloot = baloot_holder(&hands, contract);

        Self {
            hands,
            contract,
            bidder,
            starting_player,
            current_trick: Trick::new(starting_player),
            trick_history: Vec::with_capacity(HAND_SIZE),
            raw_abnat: [0; 2],
            tricks_won: [0; 2],
            projects,
            project_abnat,
            baloot,
        }
    }

    pub fn contract(&self) -> Contract {
        self.contract
    }

    pub fn bidder(&self) -> Team {
        self.bidder
    }

    pub fn starting_player(&self) -> Seat {
        self.starting_player
    }

    pub fn hand(&self, seat: Seat) -> &Hand {
        &self.hands[seat.index()]
    }

    pub fn current_trick(&self) -> &Trick {
        &self.current_trick
    }

    pub fn trick_history(&self) -> &[Trick] {
        &self.trick_history
    }

    pub fn tricks_completed(&self) -> usize {
        self.trick_history.len()
    }

    pub fn is_complete(&self) -> bool {
        self.trick_history.len() == HAND_SIZE
    }

    pub fn next_to_play(&self) -> Option<Seat> {
        (!self.is_complete()).then(|| self.current_trick.next_seat())
    }

    /// Abnat taken so far by each team, last-trick bonus included.
    pub fn raw_abnat(&self) -> [u32; 2] {
        self.raw_abnat
    }

    pub fn tricks_won(&self) -> [u8; 2] {
        self.tricks_won
    }

    pub fn projects(&self, seat: Seat) -> &[Project] {
        &self.projects[seat.index()]
    }

    /// Project abnat each team is entitled to after comparing declarations.
    pub fn project_abnat(&self) -> [u32; 2] {
        self.project_abnat
    }

    pub fn baloot_holder(&self) -> Option<Seat> {
        self.baloot
    }

    pub fn table_view(&self) -> TableView<'_> {
        TableView::new(
            self.contract,
            self.bidder,
            &self.current_trick,
            &self.trick_history,
        )
    }

    pub fn legal_moves(&self, seat: Seat) -> Result<CardSet, PlayError> {
        self.expect_turn(seat)?;
        Ok(legal_moves(
            &self.hands[seat.index()],
            &self.current_trick,
            self.contract,
        )?)
    }

    pub fn play_card(&mut self, seat: Seat, card: Card) -> Result<PlayOutcome, PlayError> {
        self.expect_turn(seat)?;
        check_play(
            &self.hands[seat.index()],
            &self.current_trick,
            self.contract,
            card,
        )?;

        self.current_trick.play(seat, card)?;
        self.hands[seat.index()].remove(card);

        if !self.current_trick.is_complete() {
            return Ok(PlayOutcome::Played);
        }

        let winner = resolve_trick(&self.current_trick, self.contract)?;
        let last_trick = self.trick_history.len() + 1 == HAND_SIZE;
        let mut abnat = self.current_trick.abnat(self.contract);
        if last_trick {
            abnat += LAST_TRICK_BONUS;
        }
        self.raw_abnat[winner.team().index()] += abnat;
        self.tricks_won[winner.team().index()] += 1;

        let finished = std::mem::replace(&mut self.current_trick, Trick::new(winner));
        self.trick_history.push(finished);

        Ok(PlayOutcome::TrickCompleted {
            winner,
            abnat,
            last_trick,
        })
    }

    pub fn score(&self, doubling: Doubling) -> Result<HandScore, ScoreError> {
        score_hand(&ScoreInput {
            mode: self.contract.mode(),
            raw_abnat: self.raw_abnat,
            project_abnat: self.project_abnat,
            doubling,
            bidder: self.bidder,
            baloot_holder: self.baloot.map(Seat::team),
            tricks_won: Some(self.tricks_won),
        })
    }

    fn expect_turn(&self, seat: Seat) -> Result<(), PlayError> {
        if self.is_complete() {
            return Err(PlayError::HandComplete);
        }
        let expected = self.current_trick.next_seat();
        if expected != seat {
            return Err(PlayError::OutOfTurn {
                expected,
                actual: seat,
            });
        }
        Ok(())
    }
}
