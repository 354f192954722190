//! Card identities

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of distinct cards in a game
pub const CARD_COUNT: usize = 21;

/// One of the 21 cards
///
/// Cards carry no rank; the rules only compare them by identity. The code in
/// `0..21` is stable across games and doubles as the observation encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Card(u8);

/// Returned when a byte does not name one of the 21 cards
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("card code {0} outside 0..21")]
pub struct InvalidCardCode(pub u8);

impl Card {
    /// Card for an observation code, `None` for padding and out-of-range values
    pub fn from_code(code: i32) -> Option<Card> {
        u8::try_from(code).ok().and_then(|c| Card::try_from(c).ok())
    }

    /// Stable code in `0..21`
    pub fn code(self) -> u8 {
        self.0
    }

    /// The full universe in code order
    pub fn all() -> impl Iterator<Item = Card> {
        (0..CARD_COUNT as u8).map(Card)
    }
}

impl TryFrom<u8> for Card {
    type Error = InvalidCardCode;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        if usize::from(code) < CARD_COUNT {
            Ok(Card(code))
        } else {
            Err(InvalidCardCode(code))
        }
    }
}

impl From<Card> for u8 {
    fn from(card: Card) -> u8 {
        card.0
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Car{}", self.0 + 1)
    }
}
