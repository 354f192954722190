//! Game state, seat identities and the structured observation
//!
//! [`GameState`] is plain data. The rules that mutate it live in
//! [`crate::engine`]; this module only knows how to deal a fresh game, check
//! the structural invariants and project the state into an [`Observation`].

use std::collections::VecDeque;
use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::card::{Card, CARD_COUNT};

/// Actions a player may take before the turn closes on its own
pub const ACTIONS_PER_TURN: u8 = 3;

/// Cards dealt face up into each player's convoy
pub const CONVOY_DEAL: usize = 4;

/// Cards dealt into each player's hand
pub const HAND_DEAL: usize = 4;

/// Seat index, 0 or 1
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct PlayerId(u8);

/// Returned when a byte does not name a seat
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("seat {0} outside 0..2")]
pub struct InvalidSeat(pub u8);

impl PlayerId {
    pub const FIRST: PlayerId = PlayerId(0);
    pub const SECOND: PlayerId = PlayerId(1);

    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    pub fn opponent(self) -> PlayerId {
        PlayerId(1 - self.0)
    }
}

impl TryFrom<u8> for PlayerId {
    type Error = InvalidSeat;

    fn try_from(seat: u8) -> Result<Self, Self::Error> {
        match seat {
            0 | 1 => Ok(PlayerId(seat)),
            other => Err(InvalidSeat(other)),
        }
    }
}

impl From<PlayerId> for u8 {
    fn from(id: PlayerId) -> u8 {
        id.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player {}", self.0)
    }
}

/// How a finished game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Winner(PlayerId),
    /// Both convoys were destroyed by the same sandstorm
    Draw,
}

impl Outcome {
    /// Terminal reward from `player`'s perspective
    pub fn reward_for(self, player: PlayerId) -> f32 {
        match self {
            Outcome::Winner(winner) if winner == player => 1.0,
            Outcome::Winner(_) => -1.0,
            Outcome::Draw => 0.0,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Winner(player) => write!(f, "{player} won"),
            Outcome::Draw => write!(f, "draw"),
        }
    }
}

/// Cards held by one seat
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Player {
    pub(crate) hand: Vec<Card>,
    /// Owned convoy cards in build order; positions live in the shared convoy
    pub(crate) convoy: Vec<Card>,
}

impl Player {
    pub fn hand(&self) -> &[Card] {
        &self.hand
    }

    pub fn convoy(&self) -> &[Card] {
        &self.convoy
    }
}

/// Structural invariant violations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("action budget {0} outside 1..=3")]
    ActionBudget(u8),
    #[error("{0} appears more than once")]
    DuplicateCard(Card),
    #[error("{0} is missing from every zone")]
    MissingCard(Card),
    #[error("{card} is in {player}'s convoy but not in the shared convoy")]
    StrayConvoyCard { card: Card, player: PlayerId },
    #[error("{card} in the shared convoy has {owners} owners")]
    ConvoyOwnership { card: Card, owners: usize },
    #[error("recorded outcome {recorded:?} but the convoys imply {implied:?}")]
    OutcomeMismatch {
        recorded: Option<Outcome>,
        implied: Option<Outcome>,
    },
}

/// Complete state of one game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub(crate) deck: VecDeque<Card>,
    /// Shared convoy, index 0 is the front and the next sandstorm target
    pub(crate) convoy: Vec<Card>,
    pub(crate) players: [Player; 2],
    pub(crate) junkyard: Vec<Card>,
    pub(crate) turn: PlayerId,
    pub(crate) actions_left: u8,
    pub(crate) outcome: Option<Outcome>,
}

/// Loose parts of a [`GameState`], checked by `GameState::try_from`
#[derive(Debug, Clone, Default)]
pub struct StateParts {
    pub deck: Vec<Card>,
    pub convoy: Vec<Card>,
    pub hands: [Vec<Card>; 2],
    pub convoys: [Vec<Card>; 2],
    pub junkyard: Vec<Card>,
    pub turn: PlayerId,
    pub actions_left: u8,
    pub outcome: Option<Outcome>,
}

impl GameState {
    /// Shuffle the universe, deal convoys then hands, and pick who starts
    pub fn deal<R: Rng>(rng: &mut R) -> Self {
        let mut cards: Vec<Card> = Card::all().collect();
        cards.shuffle(rng);

        let mut rest = cards.into_iter();
        let mut take = |n: usize| -> Vec<Card> { rest.by_ref().take(n).collect() };

        let convoys = [take(CONVOY_DEAL), take(CONVOY_DEAL)];
        let hands = [take(HAND_DEAL), take(HAND_DEAL)];
        let deck: VecDeque<Card> = take(CARD_COUNT).into();

        let convoy = convoys.concat();
        let [convoy0, convoy1] = convoys;
        let [hand0, hand1] = hands;

        Self {
            deck,
            convoy,
            players: [
                Player { hand: hand0, convoy: convoy0 },
                Player { hand: hand1, convoy: convoy1 },
            ],
            junkyard: Vec::new(),
            turn: PlayerId(rng.gen_range(0..2)),
            actions_left: ACTIONS_PER_TURN,
            outcome: None,
        }
    }

    pub fn deck(&self) -> &VecDeque<Card> {
        &self.deck
    }

    pub fn convoy(&self) -> &[Card] {
        &self.convoy
    }

    pub fn player(&self, id: PlayerId) -> &Player {
        &self.players[id.index()]
    }

    pub fn junkyard(&self) -> &[Card] {
        &self.junkyard
    }

    pub fn turn(&self) -> PlayerId {
        self.turn
    }

    pub fn actions_left(&self) -> u8 {
        self.actions_left
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// Outcome implied by the seat convoys: a game ends once either is empty
    ///
    /// Both empty at once is a draw.
    pub fn convoy_outcome(&self) -> Option<Outcome> {
        let [first, second] = &self.players;
        match (first.convoy.is_empty(), second.convoy.is_empty()) {
            (true, true) => Some(Outcome::Draw),
            (true, false) => Some(Outcome::Winner(PlayerId::SECOND)),
            (false, true) => Some(Outcome::Winner(PlayerId::FIRST)),
            (false, false) => None,
        }
    }

    /// Check budget range, card conservation, convoy ownership and outcome
    ///
    /// Every card must sit in exactly one of deck, shared convoy, a hand or
    /// the junkyard, and every shared convoy card must be owned by exactly one
    /// player's convoy. The recorded outcome must match [`Self::convoy_outcome`].
    pub fn validate(&self) -> Result<(), StateError> {
        let budget_floor = if self.outcome.is_some() { 0 } else { 1 };
        if !(budget_floor..=ACTIONS_PER_TURN).contains(&self.actions_left) {
            return Err(StateError::ActionBudget(self.actions_left));
        }

        let mut seen = [false; CARD_COUNT];
        let placed = self
            .deck
            .iter()
            .chain(&self.convoy)
            .chain(self.players.iter().flat_map(|p| &p.hand))
            .chain(&self.junkyard);
        for &card in placed {
            let slot = &mut seen[usize::from(card.code())];
            if *slot {
                return Err(StateError::DuplicateCard(card));
            }
            *slot = true;
        }
        if let Some(missing) = Card::all().find(|c| !seen[usize::from(c.code())]) {
            return Err(StateError::MissingCard(missing));
        }

        for (player, id) in self.players.iter().zip([PlayerId::FIRST, PlayerId::SECOND]) {
            if let Some(&card) = player.convoy.iter().find(|c| !self.convoy.contains(c)) {
                return Err(StateError::StrayConvoyCard { card, player: id });
            }
        }
        for &card in &self.convoy {
            let owners = self
                .players
                .iter()
                .flat_map(|p| &p.convoy)
                .filter(|&&owned| owned == card)
                .count();
            if owners != 1 {
                return Err(StateError::ConvoyOwnership { card, owners });
            }
        }

        let implied = self.convoy_outcome();
        if self.outcome != implied {
            return Err(StateError::OutcomeMismatch {
                recorded: self.outcome,
                implied,
            });
        }
        Ok(())
    }

    pub fn observation(&self) -> Observation {
        Observation {
            turn: self.turn,
            actions_left: self.actions_left,
            deck_size: self.deck.len(),
            convoy: self.convoy.clone(),
            hands: self.players.clone().map(|p| p.hand),
            convoys: self.players.clone().map(|p| p.convoy),
            junkyard_size: self.junkyard.len(),
            outcome: self.outcome,
        }
    }
}

impl TryFrom<StateParts> for GameState {
    type Error = StateError;

    fn try_from(parts: StateParts) -> Result<Self, Self::Error> {
        let [hand0, hand1] = parts.hands;
        let [convoy0, convoy1] = parts.convoys;
        let state = Self {
            deck: parts.deck.into(),
            convoy: parts.convoy,
            players: [
                Player { hand: hand0, convoy: convoy0 },
                Player { hand: hand1, convoy: convoy1 },
            ],
            junkyard: parts.junkyard,
            turn: parts.turn,
            actions_left: parts.actions_left,
            outcome: parts.outcome,
        };
        state.validate()?;
        Ok(state)
    }
}

/// Rendering-agnostic snapshot handed to presentation layers and the adapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub turn: PlayerId,
    pub actions_left: u8,
    pub deck_size: usize,
    pub convoy: Vec<Card>,
    pub hands: [Vec<Card>; 2],
    pub convoys: [Vec<Card>; 2],
    pub junkyard_size: usize,
    pub outcome: Option<Outcome>,
}
