//! Computer players for Splendid.
//!
//! The bot has no strategy beyond a fixed preference between move types. It
//! picks a random legal move of the most preferred type available and plays
//! it through the same actions a person would.

use crate::actions::{GameAction, GameEvent, Move, MoveType, PieceAction};
use crate::board::PlayerId;
use crate::game::{GameError, GameState};
use crate::player::PlayerState;
use rand::prelude::*;
use tracing::debug;

/// Lower is preferred: buy, then three tokens, then fewer tokens, then reserve
fn preference(mv: &Move) -> u8 {
    match mv.move_type {
        MoveType::BuyCard => 0,
        MoveType::TakeDifferentTokens if mv.pieces.len() == 3 => 1,
        MoveType::TakeDifferentTokens | MoveType::TakeSameTokens => 2,
        MoveType::ReserveCard => 3,
    }
}

/// A bot player that picks random legal moves
pub struct Bot {
    pub player_id: PlayerId,
    rng: StdRng,
}

impl Bot {
    pub fn new(player_id: PlayerId) -> Self {
        Self {
            player_id,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(player_id: PlayerId, seed: u64) -> Self {
        Self {
            player_id,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Choose a move from the catalog
    pub fn choose_move(&mut self, game: &GameState) -> Option<Move> {
        let moves = game.valid_moves(self.player_id);
        let best = moves.iter().map(preference).min()?;
        let candidates: Vec<&Move> = moves.iter().filter(|m| preference(m) == best).collect();
        candidates.choose(&mut self.rng).map(|mv| (*mv).clone())
    }

    /// Play a whole turn: pick the pieces of a move, confirm it, claim a tile
    /// if several are offered, then end the turn
    pub fn take_turn(&mut self, game: &mut GameState) -> Result<Vec<GameEvent>, GameError> {
        let player = self.player_id;
        if game.current_player != player {
            return Err(GameError::NotYourTurn);
        }

        let mut events = Vec::new();
        if game.player_state(player) != Some(PlayerState::TurnStarted) {
            events.extend(game.apply_action(player, GameAction::ResetTurn)?);
        }

        let mv = self
            .choose_move(game)
            .ok_or(GameError::NoLegalMoves(player))?;
        debug!(player, move_type = ?mv.move_type, pieces = ?mv.pieces, "Bot chose move");

        for piece in mv.activation_order() {
            let action = game
                .table
                .get(piece)
                .and_then(PieceAction::for_component)
                .ok_or(GameError::InvalidPiece)?;
            events.extend(action.activate(game, player)?);
        }
        events.extend(game.apply_action(player, GameAction::Confirm(mv.move_type))?);

        if game.player_state(player) == Some(PlayerState::TilesOffered) {
            let tile = game
                .tiles_earned()
                .choose(&mut self.rng)
                .copied()
                .ok_or(GameError::NoTileOffered)?;
            events.extend(game.apply_action(player, GameAction::SelectTile(tile))?);
        }

        events.extend(game.apply_action(player, GameAction::EndTurn)?);
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Area;
    use crate::catalog::StandardCatalog;

    fn new_game() -> GameState {
        let mut rng = StdRng::seed_from_u64(11);
        GameState::setup(vec!["Bot".into(), "Human".into()], &StandardCatalog, &mut rng).unwrap()
    }

    #[test]
    fn test_bot_creation() {
        let bot = Bot::new(1);
        assert_eq!(bot.player_id, 1);
    }

    #[test]
    fn test_bot_prefers_three_tokens_at_start() {
        let game = new_game();
        let mut bot = Bot::with_seed(0, 3);

        // Nothing is affordable with an empty hand
        let mv = bot.choose_move(&game).unwrap();
        assert_eq!(mv.move_type, MoveType::TakeDifferentTokens);
        assert_eq!(mv.pieces.len(), 3);
    }

    #[test]
    fn test_bot_prefers_buying() {
        let mut game = new_game();
        let card = game.table.open_cards()[0];
        let cost = game.table.get(card).unwrap().as_card().unwrap().cost;
        for (color, n) in cost.colors() {
            for _ in 0..n {
                let id = game.table.available_token(color).unwrap();
                game.table.move_to(id, Area::InPlayerArea, Some(0));
            }
        }

        let mut bot = Bot::with_seed(0, 3);
        let mv = bot.choose_move(&game).unwrap();
        assert_eq!(mv.move_type, MoveType::BuyCard);
    }

    #[test]
    fn test_bot_plays_a_turn() {
        let mut game = new_game();
        let mut bot = Bot::with_seed(0, 5);

        let events = bot.take_turn(&mut game).unwrap();

        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::MoveConfirmed { player: 0, .. })));
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::TurnEnded { player: 0, next_player: 1 })));
        assert_eq!(game.table.player_tokens(0).total(), 3);
        assert!(game.table.holding_area().is_empty());
    }

    #[test]
    fn test_bot_waits_for_its_turn() {
        let mut game = new_game();
        let mut bot = Bot::with_seed(1, 5);
        assert_eq!(bot.take_turn(&mut game), Err(GameError::NotYourTurn));
    }
}
