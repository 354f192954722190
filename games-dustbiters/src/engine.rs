//! Turn protocol, sandstorm resolution and win detection

use rand::Rng;
use tracing::{debug, trace};

use crate::action::{Action, Direction};
use crate::card::Card;
use crate::state::{GameState, Observation, Outcome, PlayerId, ACTIONS_PER_TURN};

/// Reward for a build, drive or draw whose precondition fails
pub const INVALID_ACTION_PENALTY: f32 = -1.0;

/// Protocol misuse by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("game already finished ({0})")]
    GameFinished(Outcome),
}

/// Everything one call to [`GameEngine::step`] produced
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    pub observation: Observation,
    pub reward: f32,
    pub done: bool,
    /// False when the action's precondition failed and nothing changed
    pub valid: bool,
    /// Whether this step closed the mover's turn
    pub turn_closed: bool,
    /// Card lost to the sandstorm if the turn closed on a non-empty convoy
    pub destroyed: Option<Card>,
}

/// Owns a [`GameState`] and applies the rules to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameEngine {
    state: GameState,
}

impl GameEngine {
    /// Deal a fresh game from `rng`
    pub fn new<R: Rng>(rng: &mut R) -> Self {
        Self { state: GameState::deal(rng) }
    }

    /// Resume from an existing, already validated state
    pub fn from_state(state: GameState) -> Self {
        Self { state }
    }

    /// Replace the current game with a fresh deal
    pub fn reset<R: Rng>(&mut self, rng: &mut R) -> Observation {
        self.state = GameState::deal(rng);
        debug!(starting = %self.state.turn, "dealt new game");
        self.observation()
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn into_state(self) -> GameState {
        self.state
    }

    pub fn current_player(&self) -> PlayerId {
        self.state.turn
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.state.outcome
    }

    pub fn is_over(&self) -> bool {
        self.state.is_over()
    }

    pub fn observation(&self) -> Observation {
        self.state.observation()
    }

    /// Moves available to the current player, in adapter index order
    ///
    /// Builds in hand order, then forward and backward drives for each owned
    /// convoy card in build order, then draw if the deck has cards, then end.
    /// Drives that would leave the convoy are still listed and fail when
    /// applied. Empty once the game is over.
    pub fn legal_actions(&self) -> Vec<Action> {
        if self.state.is_over() {
            return Vec::new();
        }
        let player = self.state.player(self.state.turn);

        let builds = player.hand().iter().map(|&card| Action::Build { card });
        let drives = player.convoy().iter().flat_map(|&card| {
            [Direction::Forward, Direction::Backward]
                .map(|direction| Action::Drive { card, direction })
        });
        let draw = (!self.state.deck.is_empty()).then_some(Action::Draw);

        builds
            .chain(drives)
            .chain(draw)
            .chain(std::iter::once(Action::End))
            .collect()
    }

    /// Apply one action for the current player
    ///
    /// `End`, or a valid action that spends the last unit of budget, closes
    /// the turn: the sandstorm runs, then the outcome is checked. The reward
    /// is the terminal reward from the mover's perspective when the game ends,
    /// [`INVALID_ACTION_PENALTY`] for a failed action and zero otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::GameFinished`] if the game already has an outcome.
    pub fn step(&mut self, action: Action) -> Result<StepResult, EngineError> {
        if let Some(outcome) = self.state.outcome {
            return Err(EngineError::GameFinished(outcome));
        }
        let mover = self.state.turn;

        let valid = match action {
            Action::Build { card } => self.build(card),
            Action::Drive { card, direction } => self.drive(card, direction),
            Action::Draw => self.draw(),
            Action::End => true,
        };

        let mut reward = 0.0;
        if !valid {
            trace!(player = %mover, %action, "invalid action");
            reward = INVALID_ACTION_PENALTY;
        } else if action.consumes_budget() {
            self.state.actions_left -= 1;
        }

        let turn_closed = action == Action::End || self.state.actions_left == 0;
        let mut destroyed = None;
        if turn_closed {
            destroyed = self.sandstorm();
            match self.state.convoy_outcome() {
                Some(outcome) => {
                    debug!(player = %mover, %outcome, "game over");
                    self.state.outcome = Some(outcome);
                    reward = outcome.reward_for(mover);
                }
                None => {
                    self.state.turn = mover.opponent();
                    self.state.actions_left = ACTIONS_PER_TURN;
                }
            }
        }

        debug_assert!(
            self.state.validate().is_ok(),
            "invariant broken after {action}: {:?}",
            self.state.validate()
        );

        Ok(StepResult {
            observation: self.observation(),
            reward,
            done: self.state.is_over(),
            valid,
            turn_closed,
            destroyed,
        })
    }

    fn build(&mut self, card: Card) -> bool {
        let player = &mut self.state.players[self.state.turn.index()];
        let Some(pos) = player.hand.iter().position(|&c| c == card) else {
            return false;
        };
        player.hand.remove(pos);
        player.convoy.push(card);
        self.state.convoy.push(card);
        true
    }

    fn drive(&mut self, card: Card, direction: Direction) -> bool {
        let convoy = &mut self.state.convoy;
        let Some(pos) = convoy.iter().position(|&c| c == card) else {
            return false;
        };
        let neighbour = match direction {
            Direction::Forward if pos + 1 < convoy.len() => pos + 1,
            Direction::Backward if pos > 0 => pos - 1,
            _ => return false,
        };
        convoy.swap(pos, neighbour);
        true
    }

    fn draw(&mut self) -> bool {
        let Some(card) = self.state.deck.pop_front() else {
            return false;
        };
        self.state.players[self.state.turn.index()].hand.push(card);
        true
    }

    /// Destroy the front convoy card, if there is one
    fn sandstorm(&mut self) -> Option<Card> {
        if self.state.convoy.is_empty() {
            trace!("sandstorm over an empty convoy");
            return None;
        }
        let card = self.state.convoy.remove(0);
        self.state.junkyard.push(card);
        for player in &mut self.state.players {
            player.convoy.retain(|&c| c != card);
        }
        debug!(%card, "sandstorm destroyed card");
        Some(card)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Player, StateParts};
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn card(code: u8) -> Card {
        Card::try_from(code).unwrap()
    }

    fn cards(codes: &[u8]) -> Vec<Card> {
        codes.iter().map(|&c| card(c)).collect()
    }

    /// Convoys, hands and shared order as given; every other card goes to the deck
    fn engine_with(convoys: [&[u8]; 2], shared: &[u8], hands: [&[u8]; 2], turn: PlayerId) -> GameEngine {
        let used: Vec<u8> = shared.iter().chain(hands[0]).chain(hands[1]).copied().collect();
        let parts = StateParts {
            deck: Card::all().filter(|c| !used.contains(&c.code())).collect(),
            convoy: cards(shared),
            hands: [cards(hands[0]), cards(hands[1])],
            convoys: [cards(convoys[0]), cards(convoys[1])],
            junkyard: Vec::new(),
            turn,
            actions_left: ACTIONS_PER_TURN,
            outcome: None,
        };
        GameEngine::from_state(GameState::try_from(parts).unwrap())
    }

    /// Running game that skips validation, for convoys no valid deal reaches
    fn unchecked_engine(convoys: [&[u8]; 2], shared: &[u8], hands: [&[u8]; 2], turn: PlayerId) -> GameEngine {
        let used: Vec<u8> = shared.iter().chain(hands[0]).chain(hands[1]).copied().collect();
        let [hand0, hand1] = hands.map(cards);
        let [convoy0, convoy1] = convoys.map(cards);
        GameEngine::from_state(GameState {
            deck: Card::all().filter(|c| !used.contains(&c.code())).collect(),
            convoy: cards(shared),
            players: [
                Player { hand: hand0, convoy: convoy0 },
                Player { hand: hand1, convoy: convoy1 },
            ],
            junkyard: Vec::new(),
            turn,
            actions_left: ACTIONS_PER_TURN,
            outcome: None,
        })
    }

    fn standard() -> GameEngine {
        engine_with(
            [&[0, 1, 2, 3], &[4, 5, 6, 7]],
            &[0, 1, 2, 3, 4, 5, 6, 7],
            [&[8, 9, 10, 11], &[12, 13, 14, 15]],
            PlayerId::FIRST,
        )
    }

    #[test]
    fn test_reset_deals_fresh_game() {
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let mut engine = GameEngine::new(&mut rng);
        let obs = engine.reset(&mut rng);

        assert_eq!(obs.deck_size, 5);
        assert_eq!(obs.convoy.len(), 8);
        assert_eq!(obs.hands[0].len(), 4);
        assert_eq!(obs.hands[1].len(), 4);
        assert_eq!(obs.actions_left, ACTIONS_PER_TURN);
    }

    #[test]
    fn test_build_appends_to_both_convoys() {
        let mut engine = standard();
        let result = engine.step(Action::Build { card: card(9) }).unwrap();

        assert!(result.valid);
        assert_eq!(result.reward, 0.0);
        let state = engine.state();
        assert_eq!(state.player(PlayerId::FIRST).hand(), cards(&[8, 10, 11]).as_slice());
        assert_eq!(state.player(PlayerId::FIRST).convoy().last(), Some(&card(9)));
        assert_eq!(state.convoy().last(), Some(&card(9)));
        assert_eq!(state.actions_left(), 2);
    }

    #[test]
    fn test_build_from_opponent_hand_is_invalid() {
        let mut engine = standard();
        let before = engine.state().clone();
        let result = engine.step(Action::Build { card: card(12) }).unwrap();

        assert!(!result.valid);
        assert_eq!(result.reward, INVALID_ACTION_PENALTY);
        assert_eq!(engine.state(), &before);
    }

    #[test]
    fn test_drive_swaps_neighbours() {
        let mut engine = standard();
        engine
            .step(Action::Drive { card: card(0), direction: Direction::Forward })
            .unwrap();
        assert_eq!(engine.state().convoy(), cards(&[1, 0, 2, 3, 4, 5, 6, 7]).as_slice());

        // Drives may move the opponent's cards
        engine
            .step(Action::Drive { card: card(4), direction: Direction::Backward })
            .unwrap();
        assert_eq!(engine.state().convoy(), cards(&[1, 0, 2, 4, 3, 5, 6, 7]).as_slice());
        assert_eq!(engine.state().player(PlayerId::FIRST).convoy(), cards(&[0, 1, 2, 3]).as_slice());
        assert_eq!(engine.state().player(PlayerId::SECOND).convoy(), cards(&[4, 5, 6, 7]).as_slice());
    }

    #[test]
    fn test_drive_out_of_bounds_is_invalid() {
        let mut engine = standard();
        let before = engine.state().clone();

        let front = engine.step(Action::Drive { card: card(0), direction: Direction::Backward }).unwrap();
        let back = engine.step(Action::Drive { card: card(7), direction: Direction::Forward }).unwrap();
        let absent = engine.step(Action::Drive { card: card(8), direction: Direction::Forward }).unwrap();

        assert!(!front.valid && !back.valid && !absent.valid);
        assert_eq!(engine.state(), &before);
    }

    #[test]
    fn test_draw_takes_front_of_deck() {
        let mut engine = standard();
        let top = engine.state().deck()[0];
        let result = engine.step(Action::Draw).unwrap();

        assert!(result.valid);
        assert_eq!(engine.state().player(PlayerId::FIRST).hand().last(), Some(&top));
        assert_eq!(engine.state().deck().len(), 4);
    }

    #[test]
    fn test_draw_from_empty_deck_is_invalid() {
        let mut engine = engine_with(
            [&[0, 1, 2, 3, 4, 5, 6, 7, 8, 9], &[10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20]],
            &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20],
            [&[], &[]],
            PlayerId::FIRST,
        );
        let result = engine.step(Action::Draw).unwrap();
        assert!(!result.valid);
        assert!(!engine.legal_actions().contains(&Action::Draw));
    }

    #[test]
    fn test_end_runs_sandstorm_and_passes_turn() {
        let mut engine = standard();
        let result = engine.step(Action::End).unwrap();

        assert!(result.turn_closed);
        assert_eq!(result.destroyed, Some(card(0)));
        assert_eq!(engine.state().junkyard(), &[card(0)]);
        assert!(!engine.state().player(PlayerId::FIRST).convoy().contains(&card(0)));
        assert_eq!(engine.current_player(), PlayerId::SECOND);
        assert_eq!(engine.state().actions_left(), ACTIONS_PER_TURN);
    }

    #[test]
    fn test_budget_exhaustion_closes_turn() {
        let mut engine = standard();
        assert!(!engine.step(Action::Draw).unwrap().turn_closed);
        assert!(!engine.step(Action::Draw).unwrap().turn_closed);
        // Failed actions do not spend budget
        assert!(!engine.step(Action::Build { card: card(15) }).unwrap().turn_closed);
        let last = engine.step(Action::Draw).unwrap();

        assert!(last.turn_closed);
        assert_eq!(last.destroyed, Some(card(0)));
        assert_eq!(engine.current_player(), PlayerId::SECOND);
    }

    #[test]
    fn test_mover_destroying_opponent_wins() {
        let mut engine = engine_with(
            [&[1, 2], &[0]],
            &[0, 1, 2],
            [&[3], &[4]],
            PlayerId::FIRST,
        );
        let result = engine.step(Action::End).unwrap();

        assert!(result.done);
        assert_eq!(result.reward, 1.0);
        assert_eq!(engine.outcome(), Some(Outcome::Winner(PlayerId::FIRST)));
        assert!(engine.legal_actions().is_empty());
    }

    #[test]
    fn test_mover_losing_own_convoy_loses() {
        let mut engine = engine_with([&[0], &[1]], &[0, 1], [&[], &[]], PlayerId::FIRST);
        let result = engine.step(Action::End).unwrap();

        assert_eq!(result.reward, -1.0);
        assert_eq!(engine.outcome(), Some(Outcome::Winner(PlayerId::SECOND)));
    }

    #[test]
    fn test_simultaneous_elimination_is_draw() {
        // Seat 1 already has no convoy; destroying seat 0's last card empties both
        let mut engine = unchecked_engine([&[0], &[]], &[0], [&[5], &[6]], PlayerId::SECOND);
        let result = engine.step(Action::End).unwrap();

        assert!(result.done);
        assert_eq!(result.reward, 0.0);
        assert_eq!(engine.outcome(), Some(Outcome::Draw));
    }

    #[test]
    fn test_sandstorm_on_empty_convoy_is_noop() {
        let mut engine = unchecked_engine([&[], &[]], &[], [&[5], &[6]], PlayerId::FIRST);
        let result = engine.step(Action::End).unwrap();

        assert_eq!(result.destroyed, None);
        assert!(engine.state().junkyard().is_empty());
        assert_eq!(engine.outcome(), Some(Outcome::Draw));
    }

    #[test]
    fn test_step_after_finish_is_error() {
        let mut engine = engine_with([&[0], &[1]], &[0, 1], [&[], &[]], PlayerId::FIRST);
        engine.step(Action::End).unwrap();

        let err = engine.step(Action::End).unwrap_err();
        assert_eq!(err, EngineError::GameFinished(Outcome::Winner(PlayerId::SECOND)));
        assert_eq!(err.to_string(), "game already finished (player 1 won)");
    }

    #[test]
    fn test_legal_action_order() {
        let engine = engine_with(
            [&[0, 1], &[2]],
            &[2, 0, 1],
            [&[3, 4], &[5]],
            PlayerId::FIRST,
        );
        let expected = vec![
            Action::Build { card: card(3) },
            Action::Build { card: card(4) },
            Action::Drive { card: card(0), direction: Direction::Forward },
            Action::Drive { card: card(0), direction: Direction::Backward },
            Action::Drive { card: card(1), direction: Direction::Forward },
            Action::Drive { card: card(1), direction: Direction::Backward },
            Action::Draw,
            Action::End,
        ];
        assert_eq!(engine.legal_actions(), expected);
    }

    #[test]
    fn test_same_seed_same_game() {
        let play = |seed: u64| {
            let mut engine = GameEngine::new(&mut ChaCha20Rng::seed_from_u64(seed));
            let mut trace = Vec::new();
            while !engine.is_over() && trace.len() < 200 {
                let action = engine.legal_actions()[0];
                trace.push(engine.step(action).unwrap().observation);
            }
            trace
        };
        assert_eq!(play(21), play(21));
    }
}
