//! Versioned binary form of [`GameState`]
//!
//! Layout (v1): `[version][turn][actions_left][outcome]` followed by seven
//! sections, each a length byte and that many card codes: deck, shared
//! convoy, seat 0 hand, seat 0 convoy, seat 1 hand, seat 1 convoy, junkyard.
//! Seat convoys repeat cards already listed in the shared convoy, so a state
//! carries `21 + convoy length` card codes.

use engine_core::DecodeError;

use crate::card::{Card, CARD_COUNT};
use crate::state::{GameState, Outcome, PlayerId, StateParts};

pub const STATE_VERSION: u8 = 1;

const OUTCOME_NONE: u8 = 0;
const OUTCOME_FIRST: u8 = 1;
const OUTCOME_SECOND: u8 = 2;
const OUTCOME_DRAW: u8 = 3;

pub fn encode_state(state: &GameState, out: &mut Vec<u8>) {
    out.push(STATE_VERSION);
    out.push(u8::from(state.turn));
    out.push(state.actions_left);
    out.push(match state.outcome {
        None => OUTCOME_NONE,
        Some(Outcome::Winner(PlayerId::FIRST)) => OUTCOME_FIRST,
        Some(Outcome::Winner(_)) => OUTCOME_SECOND,
        Some(Outcome::Draw) => OUTCOME_DRAW,
    });

    push_section(out, state.deck.iter());
    push_section(out, state.convoy.iter());
    for player in &state.players {
        push_section(out, player.hand.iter());
        push_section(out, player.convoy.iter());
    }
    push_section(out, state.junkyard.iter());
}

// Conservation caps every section at 21 cards, so the length fits a byte.
fn push_section<'a>(out: &mut Vec<u8>, cards: impl ExactSizeIterator<Item = &'a Card>) {
    out.push(cards.len() as u8);
    out.extend(cards.map(|card| card.code()));
}

/// Decode and fully validate a state
///
/// # Errors
///
/// `UnsupportedVersion` for an unknown version byte, `InvalidLength` for a
/// truncated or oversized buffer and `CorruptedData` for out-of-range fields
/// or a state that breaks card conservation, convoy ownership or records an
/// outcome its convoys do not imply.
pub fn decode_state(buf: &[u8]) -> Result<GameState, DecodeError> {
    let mut reader = Reader { buf, pos: 0 };

    let version = reader.byte()?;
    if version != STATE_VERSION {
        return Err(DecodeError::UnsupportedVersion {
            version: u32::from(version),
        });
    }
    let turn = PlayerId::try_from(reader.byte()?)
        .map_err(|e| DecodeError::CorruptedData(e.to_string()))?;
    let actions_left = reader.byte()?;
    let outcome = match reader.byte()? {
        OUTCOME_NONE => None,
        OUTCOME_FIRST => Some(Outcome::Winner(PlayerId::FIRST)),
        OUTCOME_SECOND => Some(Outcome::Winner(PlayerId::SECOND)),
        OUTCOME_DRAW => Some(Outcome::Draw),
        other => {
            return Err(DecodeError::CorruptedData(format!(
                "unknown outcome tag {other}"
            )))
        }
    };

    let deck = reader.cards()?;
    let convoy = reader.cards()?;
    let hand0 = reader.cards()?;
    let convoy0 = reader.cards()?;
    let hand1 = reader.cards()?;
    let convoy1 = reader.cards()?;
    let junkyard = reader.cards()?;

    if reader.pos != buf.len() {
        return Err(DecodeError::InvalidLength {
            expected: reader.pos,
            actual: buf.len(),
        });
    }

    GameState::try_from(StateParts {
        deck,
        convoy,
        hands: [hand0, hand1],
        convoys: [convoy0, convoy1],
        junkyard,
        turn,
        actions_left,
        outcome,
    })
    .map_err(|e| DecodeError::CorruptedData(e.to_string()))
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl Reader<'_> {
    fn take(&mut self, n: usize) -> Result<&[u8], DecodeError> {
        let end = self.pos + n;
        let bytes = self.buf.get(self.pos..end).ok_or(DecodeError::InvalidLength {
            expected: end,
            actual: self.buf.len(),
        })?;
        self.pos = end;
        Ok(bytes)
    }

    fn byte(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    fn cards(&mut self) -> Result<Vec<Card>, DecodeError> {
        let len = usize::from(self.byte()?);
        if len > CARD_COUNT {
            return Err(DecodeError::CorruptedData(format!(
                "section of {len} cards"
            )));
        }
        self.take(len)?
            .iter()
            .map(|&code| {
                Card::try_from(code).map_err(|e| DecodeError::CorruptedData(e.to_string()))
            })
            .collect()
    }
}
