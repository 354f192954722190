use std::fmt;

use serde::{Deserialize, Serialize};

use crate::card::Card;

/// Which neighbour a driven card swaps with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Toward the back of the convoy (index + 1)
    Forward,
    /// Toward the front of the convoy (index - 1)
    Backward,
}

/// A move requested by the player whose turn it is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Build { card: Card },
    Drive { card: Card, direction: Direction },
    Draw,
    End,
}

impl Action {
    /// Whether a valid application of this action spends one unit of budget
    pub fn consumes_budget(self) -> bool {
        !matches!(self, Action::End)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => write!(f, "forward"),
            Direction::Backward => write!(f, "backward"),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Build { card } => write!(f, "build {card}"),
            Action::Drive { card, direction } => write!(f, "drive {card} {direction}"),
            Action::Draw => write!(f, "draw"),
            Action::End => write!(f, "end"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(code: i32) -> Card {
        Card::from_code(code).unwrap()
    }

    #[test]
    fn test_only_end_is_free() {
        assert!(Action::Build { card: card(0) }.consumes_budget());
        assert!(Action::Drive { card: card(0), direction: Direction::Forward }.consumes_budget());
        assert!(Action::Draw.consumes_budget());
        assert!(!Action::End.consumes_budget());
    }

    #[test]
    fn test_display() {
        assert_eq!(Action::Build { card: card(2) }.to_string(), "build Car3");
        assert_eq!(
            Action::Drive { card: card(9), direction: Direction::Backward }.to_string(),
            "drive Car10 backward"
        );
        assert_eq!(Action::End.to_string(), "end");
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_string(&Action::Drive {
            card: card(4),
            direction: Direction::Forward,
        })
        .unwrap();
        assert_eq!(json, r#"{"type":"drive","card":4,"direction":"forward"}"#);

        let parsed: Action = serde_json::from_str(r#"{"type":"draw"}"#).unwrap();
        assert_eq!(parsed, Action::Draw);
    }
}
