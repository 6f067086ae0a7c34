//! Core game state machine.
//!
//! This module contains the main `GameState` struct: the table, the seated
//! players and the turn lifecycle that drives them.

use crate::actions::{GameAction, GameEvent, Move, MoveType, PieceAction};
use crate::board::{
    Area, Card, Component, ComponentId, ComponentKind, Filter, Placement, PlayerId, Table, Tile,
    Token,
};
use crate::catalog::{CatalogError, ComponentFactory};
use crate::config::GameConfig;
use crate::moves;
use crate::player::{ColorCount, Player, PlayerState};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{debug, error, info};

/// Game phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Players seated, components not dealt yet
    Setup,

    /// Normal play
    Playing,

    /// Someone reached the winning score; play continues to the end of the round
    FinalRound,

    /// Game is over
    Finished { winner: PlayerId },
}

/// Errors that can occur when applying actions
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GameError {
    #[error("Not your turn")]
    NotYourTurn,

    #[error("Invalid action for current phase")]
    InvalidPhase,

    #[error("That piece cannot be taken now")]
    InvalidPiece,

    #[error("No such component")]
    NoSuchComponent,

    #[error("That piece is not in the holding area")]
    NotHeld,

    #[error("Holding area does not make up that move")]
    IncompleteMove,

    #[error("Holding area must be confirmed or reset first")]
    HoldingNotEmpty,

    #[error("Cannot afford this")]
    CannotAfford,

    #[error("That tile is not on offer")]
    NoTileOffered,

    #[error("Player {0} has no legal move")]
    NoLegalMoves(PlayerId),

    #[error("Game is over")]
    GameOver,

    #[error("Must have 2-4 players, got {0}")]
    PlayerCount(usize),

    #[error("Catalog error: {0}")]
    Catalog(String),
}

impl From<CatalogError> for GameError {
    fn from(e: CatalogError) -> Self {
        GameError::Catalog(e.to_string())
    }
}

/// The complete game state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Every token, card and tile
    pub table: Table,
    /// All players, in turn order
    pub players: Vec<Player>,
    /// Current player index
    pub current_player: PlayerId,
    /// Current game phase
    pub phase: GamePhase,
    /// Turn number (starts at 1)
    pub turn_number: u32,
    /// Rule parameters
    pub config: GameConfig,
}

impl GameState {
    /// Create a new game with the given player names (2-4)
    pub fn new(player_names: Vec<String>) -> Self {
        Self::with_config(player_names, GameConfig::default())
    }

    /// Create a new game with custom rules
    pub fn with_config(player_names: Vec<String>, config: GameConfig) -> Self {
        assert!(
            (2..=4).contains(&player_names.len()),
            "Must have 2-4 players"
        );

        let mut players: Vec<Player> = player_names
            .into_iter()
            .enumerate()
            .map(|(i, name)| Player::new(i as PlayerId, name))
            .collect();
        players[0].start();

        Self {
            table: Table::new(),
            players,
            current_player: 0,
            phase: GamePhase::Setup,
            turn_number: 1,
            config,
        }
    }

    /// Create a game and deal it from a factory
    pub fn setup<R: Rng>(
        player_names: Vec<String>,
        factory: &dyn ComponentFactory,
        rng: &mut R,
    ) -> Result<Self, GameError> {
        if !(2..=4).contains(&player_names.len()) {
            return Err(GameError::PlayerCount(player_names.len()));
        }
        let mut game = Self::new(player_names);
        game.init_components(factory, rng)?;
        Ok(game)
    }

    /// Get the number of players
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Get a player by ID
    pub fn get_player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id as usize)
    }

    /// Get a mutable player by ID
    fn get_player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(id as usize)
    }

    fn set_state(&mut self, id: PlayerId, state: PlayerState) {
        if let Some(p) = self.get_player_mut(id) {
            p.state = state;
        }
    }

    /// Lifecycle state of a player
    pub fn player_state(&self, id: PlayerId) -> Option<PlayerState> {
        self.get_player(id).map(|p| p.state)
    }

    /// Check if the game is finished
    pub fn is_finished(&self) -> bool {
        matches!(self.phase, GamePhase::Finished { .. })
    }

    /// Get the winner if the game is finished
    pub fn get_winner(&self) -> Option<PlayerId> {
        if let GamePhase::Finished { winner } = self.phase {
            Some(winner)
        } else {
            None
        }
    }

    // ==================== Setup ====================

    /// Build the table from a factory: every card shuffled into its row's
    /// deck, `player_count + 1` random tiles on offer, the token supply for
    /// this many players, then the face-up grid dealt.
    pub fn init_components<R: Rng>(
        &mut self,
        factory: &dyn ComponentFactory,
        rng: &mut R,
    ) -> Result<(), GameError> {
        if self.phase != GamePhase::Setup {
            return Err(GameError::InvalidPhase);
        }

        let mut components = Vec::new();

        let mut cards = factory.cards()?;
        cards.shuffle(rng);
        components.extend(cards.into_iter().map(|row| {
            Component::Card(Card {
                id: 0,
                cost: row.cost,
                reward: row.reward,
                points: row.points,
                row: row.row,
                column: None,
                face_up: false,
                placement: Placement::supply(),
            })
        }));

        let mut tiles = factory.tiles()?;
        tiles.shuffle(rng);
        tiles.truncate(self.player_count() + 1);
        components.extend(tiles.into_iter().enumerate().map(|(i, row)| {
            Component::Tile(Tile {
                id: 0,
                cost: row.cost,
                points: row.points,
                column: Some(i as u8),
                placement: Placement::supply(),
            })
        }));

        let supply = factory.tokens(self.player_count())?;
        for (color, count) in supply.colors() {
            for _ in 0..count {
                components.push(Component::Token(Token {
                    id: 0,
                    color,
                    placement: Placement::supply(),
                }));
            }
        }

        self.table = Table::from_components(components);
        self.draw_cards();
        self.phase = GamePhase::Playing;

        info!(
            players = self.player_count(),
            components = self.table.len(),
            "Components dealt"
        );
        Ok(())
    }

    /// Turn the top card of a row's deck face up into a slot
    fn draw_card_for_row(&mut self, row: u8, column: u8) -> Option<GameEvent> {
        let card = *self.table.deck(row).first()?;
        self.table.deal(card, column);
        Some(GameEvent::CardDealt { card, row, column })
    }

    /// Fill every empty grid slot from its row's deck
    pub fn draw_cards(&mut self) -> Vec<GameEvent> {
        let grid = self
            .table
            .card_grid(self.config.grid_rows, self.config.grid_columns);
        let mut events = Vec::new();
        for (row, slots) in grid.iter().enumerate() {
            for (column, slot) in slots.iter().enumerate() {
                if slot.is_none() {
                    events.extend(self.draw_card_for_row(row as u8, column as u8));
                }
            }
        }
        events
    }

    // ==================== Queries ====================

    /// Every structurally legal full move for a player
    pub fn valid_moves(&self, player: PlayerId) -> Vec<Move> {
        moves::valid_moves(&self.table, player, &self.config)
    }

    /// Holding area contents belonging to `player`
    fn held_by(&self, player: PlayerId) -> Vec<ComponentId> {
        if player != self.current_player {
            return Vec::new();
        }
        self.table.holding_area()
    }

    /// Pieces the player may pick next, given what is already held.
    ///
    /// Only the current player builds a move; anyone else gets an empty set.
    pub fn valid_pieces(&self, player: PlayerId) -> BTreeSet<ComponentId> {
        if player != self.current_player {
            return BTreeSet::new();
        }
        let catalog = self.valid_moves(player);
        moves::valid_pieces(&self.table, &catalog, &self.held_by(player))
    }

    /// Whether picking this component would be legal right now
    pub fn is_valid_action(&self, player: PlayerId, component: ComponentId) -> bool {
        moves::is_valid_action(&self.table, &self.valid_pieces(player), component)
    }

    /// No further piece may be added to the holding area
    pub fn turn_complete(&self, player: PlayerId) -> bool {
        self.valid_pieces(player).is_empty()
    }

    /// Catalog moves the holding area makes up exactly
    pub fn completed_moves(&self, player: PlayerId) -> Vec<Move> {
        let catalog = self.valid_moves(player);
        moves::completed_moves(&self.table, &catalog, &self.held_by(player))
    }

    /// Points from purchased cards and claimed tiles
    pub fn points_for_player(&self, player: PlayerId) -> u32 {
        self.table
            .filter(
                Filter::new()
                    .area(Area::InPlayerArea)
                    .owner(player),
            )
            .map(|c| match c {
                Component::Card(card) => card.points,
                Component::Tile(tile) => tile.points,
                Component::Token(_) => 0,
            })
            .sum()
    }

    /// Number of cards a player has purchased
    pub fn cards_purchased(&self, player: PlayerId) -> usize {
        self.table.count(
            Filter::new()
                .area(Area::InPlayerArea)
                .owner(player)
                .kind(ComponentKind::Card),
        )
    }

    /// Tiles on offer the current player's card rewards cover
    pub fn tiles_earned(&self) -> Vec<ComponentId> {
        let rewards = self.table.card_rewards(self.current_player);
        self.table
            .tiles_on_offer()
            .into_iter()
            .filter(|&id| {
                self.table
                    .get(id)
                    .and_then(Component::as_tile)
                    .is_some_and(|t| rewards.covers_cost(&t.cost))
            })
            .collect()
    }

    pub fn earned_single_tile(&self) -> bool {
        self.tiles_earned().len() == 1
    }

    pub fn earned_multiple_tiles(&self) -> bool {
        self.tiles_earned().len() > 1
    }

    // ==================== Turn Lifecycle ====================

    /// Hand the turn to the next seat, wrapping round
    pub fn next_player(&mut self) {
        let current = self.current_player;
        if let Some(p) = self.get_player_mut(current) {
            p.wait();
        }

        self.current_player = (current + 1) % self.player_count() as PlayerId;

        let next = self.current_player;
        if let Some(p) = self.get_player_mut(next) {
            p.start();
        }
    }

    /// Return the tokens for a cost to the supply.
    ///
    /// Card rewards reduce each color first, then the player's tokens of that
    /// color are spent, then gold for any remainder. Nothing moves if the
    /// player cannot afford the cost.
    pub fn pay_chip_cost(
        &mut self,
        cost: &ColorCount,
        player: PlayerId,
    ) -> Result<Vec<ComponentId>, GameError> {
        let spent =
            moves::payment_plan(&self.table, player, cost).ok_or(GameError::CannotAfford)?;
        for &id in &spent {
            self.table.move_to(id, Area::InSupply, None);
        }
        debug!(player, %cost, tokens = spent.len(), "Paid cost");
        Ok(spent)
    }

    /// Apply an action to the game state
    pub fn apply_action(
        &mut self,
        player: PlayerId,
        action: GameAction,
    ) -> Result<Vec<GameEvent>, GameError> {
        match self.phase {
            GamePhase::Finished { .. } => return Err(GameError::GameOver),
            GamePhase::Setup => return Err(GameError::InvalidPhase),
            GamePhase::Playing | GamePhase::FinalRound => {}
        }
        if player != self.current_player {
            return Err(GameError::NotYourTurn);
        }

        match action {
            GameAction::TakePiece(id) => self.take_piece(player, id),
            GameAction::ReturnPiece(id) => self.return_piece(player, id),
            GameAction::ResetTurn => self.reset_turn(player),
            GameAction::Confirm(move_type) => self.confirm(player, move_type),
            GameAction::SelectTile(id) => self.select_tile(player, id),
            GameAction::EndTurn => self.end_turn(player),
        }
    }

    // ==================== Helper Methods ====================

    fn current_state(&self, player: PlayerId) -> PlayerState {
        self.player_state(player)
            .unwrap_or(PlayerState::WaitingForTurn)
    }

    /// Recompute the building state after the holding area changed
    fn refresh_building_state(&mut self, player: PlayerId) {
        let state = if self.table.holding_area().is_empty() {
            PlayerState::TurnStarted
        } else if self.turn_complete(player) {
            PlayerState::TurnValid
        } else {
            PlayerState::TurnInProgress
        };
        self.set_state(player, state);
    }

    fn take_piece(
        &mut self,
        player: PlayerId,
        id: ComponentId,
    ) -> Result<Vec<GameEvent>, GameError> {
        if !self.current_state(player).is_building_move() {
            return Err(GameError::InvalidPhase);
        }
        let component = self.table.get(id).ok_or(GameError::NoSuchComponent)?;
        let action = PieceAction::for_component(component).ok_or(GameError::InvalidPiece)?;

        let takeable = action.is_takeable(&self.table, player);
        if !takeable || !self.is_valid_action(player, id) {
            return Err(GameError::InvalidPiece);
        }

        self.table.hold(id, player);
        debug!(player, component = id, "Piece taken");
        self.refresh_building_state(player);

        Ok(vec![GameEvent::PieceTaken {
            player,
            component: id,
        }])
    }

    fn return_piece(
        &mut self,
        player: PlayerId,
        id: ComponentId,
    ) -> Result<Vec<GameEvent>, GameError> {
        if !self.current_state(player).is_building_move() {
            return Err(GameError::InvalidPhase);
        }
        let component = self.table.get(id).ok_or(GameError::NoSuchComponent)?;
        if component.area() != Area::InHoldingArea {
            return Err(GameError::NotHeld);
        }

        self.table.release(id);
        debug!(player, component = id, "Piece returned");
        self.refresh_building_state(player);

        Ok(vec![GameEvent::PieceReturned {
            player,
            component: id,
        }])
    }

    fn reset_turn(&mut self, player: PlayerId) -> Result<Vec<GameEvent>, GameError> {
        if !self.current_state(player).is_building_move() {
            return Err(GameError::InvalidPhase);
        }

        let mut events = Vec::new();
        for id in self.table.holding_area() {
            self.table.release(id);
            events.push(GameEvent::PieceReturned {
                player,
                component: id,
            });
        }
        self.set_state(player, PlayerState::TurnStarted);
        Ok(events)
    }

    fn confirm(
        &mut self,
        player: PlayerId,
        move_type: MoveType,
    ) -> Result<Vec<GameEvent>, GameError> {
        if !matches!(
            self.current_state(player),
            PlayerState::TurnInProgress | PlayerState::TurnValid
        ) {
            return Err(GameError::InvalidPhase);
        }
        if !self
            .completed_moves(player)
            .iter()
            .any(|m| m.move_type == move_type)
        {
            return Err(GameError::IncompleteMove);
        }

        let held = self.table.holding_area();
        let mut events = vec![GameEvent::MoveConfirmed { player, move_type }];

        match move_type {
            MoveType::TakeDifferentTokens | MoveType::TakeSameTokens => {
                let mut tokens = ColorCount::new();
                for &id in &held {
                    if let Some(color) = self.table.get(id).and_then(Component::color) {
                        tokens.add(color, 1);
                    }
                    self.table.move_to(id, Area::InPlayerArea, Some(player));
                }
                events.push(GameEvent::TokensBanked { player, tokens });
            }

            MoveType::BuyCard => {
                let card = self.held_card(&held)?;
                let cost = self
                    .table
                    .get(card)
                    .and_then(Component::as_card)
                    .map(|c| c.cost)
                    .ok_or(GameError::NoSuchComponent)?;

                // Pay before the card lands, so it does not discount itself
                let spent = self.pay_chip_cost(&cost, player)?;
                let mut tokens = ColorCount::new();
                for id in spent {
                    if let Some(color) = self.table.get(id).and_then(Component::color) {
                        tokens.add(color, 1);
                    }
                }
                self.table.move_to(card, Area::InPlayerArea, Some(player));

                if !tokens.is_empty() {
                    events.push(GameEvent::TokensPaid { player, tokens });
                }
                events.push(GameEvent::CardBought { player, card });
            }

            MoveType::ReserveCard => {
                let card = self.held_card(&held)?;
                let mut with_gold = false;
                for &id in &held {
                    if id == card {
                        self.table.move_to(id, Area::InReservedArea, Some(player));
                    } else {
                        self.table.move_to(id, Area::InPlayerArea, Some(player));
                        with_gold = true;
                    }
                }
                events.push(GameEvent::CardReserved {
                    player,
                    card,
                    with_gold,
                });
            }
        }

        info!(player, ?move_type, "Move confirmed");
        events.extend(self.draw_cards());
        events.extend(self.award_tiles(player));
        Ok(events)
    }

    fn held_card(&self, held: &[ComponentId]) -> Result<ComponentId, GameError> {
        held.iter()
            .copied()
            .find(|&id| {
                self.table
                    .get(id)
                    .is_some_and(|c| c.kind() == ComponentKind::Card)
            })
            .ok_or(GameError::IncompleteMove)
    }

    /// Tile award once a move is committed: none finishes the turn, one is
    /// claimed straight away, several are offered for the player to choose
    fn award_tiles(&mut self, player: PlayerId) -> Vec<GameEvent> {
        let earned = self.tiles_earned();
        match earned.as_slice() {
            [] => {
                self.set_state(player, PlayerState::TurnFinished);
                Vec::new()
            }
            [tile] => vec![self.claim_tile(player, *tile)],
            tiles => {
                self.set_state(player, PlayerState::TilesOffered);
                vec![GameEvent::TilesOffered {
                    player,
                    tiles: tiles.to_vec(),
                }]
            }
        }
    }

    fn claim_tile(&mut self, player: PlayerId, tile: ComponentId) -> GameEvent {
        self.table.move_to(tile, Area::InPlayerArea, Some(player));
        self.set_state(player, PlayerState::TileSelected);
        info!(player, tile, "Tile claimed");
        GameEvent::TileClaimed { player, tile }
    }

    fn select_tile(
        &mut self,
        player: PlayerId,
        tile: ComponentId,
    ) -> Result<Vec<GameEvent>, GameError> {
        if self.current_state(player) != PlayerState::TilesOffered {
            return Err(GameError::InvalidPhase);
        }
        if !self.tiles_earned().contains(&tile) {
            return Err(GameError::NoTileOffered);
        }
        Ok(vec![self.claim_tile(player, tile)])
    }

    fn end_turn(&mut self, player: PlayerId) -> Result<Vec<GameEvent>, GameError> {
        match self.current_state(player) {
            PlayerState::TurnFinished | PlayerState::TileSelected => {}
            PlayerState::TurnStarted | PlayerState::TurnInProgress | PlayerState::TurnValid
                if !self.table.holding_area().is_empty() =>
            {
                return Err(GameError::HoldingNotEmpty);
            }
            _ => return Err(GameError::InvalidPhase),
        }
        let points = self.points_for_player(player);
        let final_round = self.phase == GamePhase::FinalRound
            || (self.phase == GamePhase::Playing && points >= self.config.points_to_win);
        // The round is over once the last seat has played
        let last_seat = (self.player_count() - 1) as PlayerId;
        let game_over = final_round && player == last_seat;

        // A stalled next seat is reported before anything changes
        let next_player = (player + 1) % self.player_count() as PlayerId;
        if !game_over && self.valid_moves(next_player).is_empty() {
            error!(player = next_player, "No legal move available");
            return Err(GameError::NoLegalMoves(next_player));
        }

        self.set_state(player, PlayerState::TurnFinished);
        let mut events = Vec::new();

        if self.phase == GamePhase::Playing && final_round {
            self.phase = GamePhase::FinalRound;
            info!(player, points, "Final round");
            events.push(GameEvent::FinalRound { player, points });
        }

        if game_over {
            let winner = self.leader();
            let points = self.points_for_player(winner);
            self.phase = GamePhase::Finished { winner };
            info!(winner, points, "Game won");
            events.push(GameEvent::GameWon {
                player: winner,
                points,
            });
            return Ok(events);
        }

        self.next_player();
        self.turn_number += 1;
        info!(player, next_player, turn = self.turn_number, "Turn ended");
        events.push(GameEvent::TurnEnded {
            player,
            next_player,
        });
        Ok(events)
    }

    /// Most points; ties go to fewer purchased cards, then earlier seat
    fn leader(&self) -> PlayerId {
        self.players
            .iter()
            .map(|p| p.id)
            .max_by(|&a, &b| {
                self.points_for_player(a)
                    .cmp(&self.points_for_player(b))
                    .then(self.cards_purchased(b).cmp(&self.cards_purchased(a)))
                    .then(b.cmp(&a))
            })
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::GemColor;
    use crate::catalog::StandardCatalog;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn new_game(players: usize) -> GameState {
        let names = (0..players).map(|i| format!("P{}", i)).collect();
        let mut rng = StdRng::seed_from_u64(7);
        GameState::setup(names, &StandardCatalog, &mut rng).unwrap()
    }

    fn give(game: &mut GameState, color: GemColor, count: usize, player: PlayerId) {
        for _ in 0..count {
            let id = game.table.available_token(color).unwrap();
            game.table.move_to(id, Area::InPlayerArea, Some(player));
        }
    }

    /// A card from the grid, turned into a player-owned reward
    fn give_reward(game: &mut GameState, color: GemColor, player: PlayerId) {
        let id = game
            .table
            .ids(Filter::new().area(Area::InSupply).kind(ComponentKind::Card).face_up(false))
            .into_iter()
            .find(|&id| game.table.get(id).and_then(Component::color) == Some(color))
            .unwrap();
        game.table.move_to(id, Area::InPlayerArea, Some(player));
    }

    #[test]
    fn test_new_game_starts_in_setup() {
        let game = GameState::new(vec!["A".into(), "B".into()]);
        assert_eq!(game.phase, GamePhase::Setup);
        assert_eq!(game.player_state(0), Some(PlayerState::TurnStarted));
        assert_eq!(game.player_state(1), Some(PlayerState::WaitingForTurn));
    }

    #[test]
    fn test_actions_rejected_before_setup() {
        let mut game = GameState::new(vec!["A".into(), "B".into()]);
        assert_eq!(
            game.apply_action(0, GameAction::ResetTurn),
            Err(GameError::InvalidPhase)
        );
    }

    #[test]
    fn test_init_components_sizes_table() {
        let game = new_game(3);

        assert_eq!(game.table.tiles_on_offer().len(), 4);
        assert_eq!(game.table.open_cards().len(), 12);
        let supply = game.table.supply_counts();
        assert_eq!(supply.red, 5);
        assert_eq!(supply.gold, 5);
        assert_eq!(game.phase, GamePhase::Playing);

        let columns: Vec<_> = game
            .table
            .tiles_on_offer()
            .iter()
            .map(|&id| game.table.get(id).unwrap().as_tile().unwrap().column)
            .collect();
        assert_eq!(columns, vec![Some(0), Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn test_init_components_only_once() {
        let mut game = new_game(2);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            game.init_components(&StandardCatalog, &mut rng),
            Err(GameError::InvalidPhase)
        );
    }

    #[test]
    fn test_setup_rejects_player_count() {
        let mut rng = StdRng::seed_from_u64(1);
        let result = GameState::setup(vec!["Solo".into()], &StandardCatalog, &mut rng);
        assert!(matches!(result, Err(GameError::PlayerCount(1))));

        let names = (0..5).map(|i| format!("P{}", i)).collect();
        let result = GameState::setup(names, &StandardCatalog, &mut rng);
        assert!(matches!(result, Err(GameError::PlayerCount(5))));
    }

    #[test]
    fn test_stalled_next_player_leaves_turn_in_place() {
        let mut game = new_game(2);
        // Player 0 owns every token, player 1 has a full reserve it cannot pay for
        for id in game.table.ids(Filter::new().kind(ComponentKind::Token)) {
            game.table.move_to(id, Area::InPlayerArea, Some(0));
        }
        for id in game.table.deck(0).into_iter().take(3) {
            game.table.move_to(id, Area::InReservedArea, Some(1));
        }
        assert!(game.valid_moves(1).is_empty());

        game.set_state(0, PlayerState::TurnFinished);
        let table = game.table.clone();
        let players = game.players.clone();

        assert_eq!(
            game.apply_action(0, GameAction::EndTurn),
            Err(GameError::NoLegalMoves(1))
        );
        assert_eq!(game.current_player, 0);
        assert_eq!(game.turn_number, 1);
        assert_eq!(game.phase, GamePhase::Playing);
        assert_eq!(game.players, players);
        assert_eq!(game.table, table);
    }

    #[test]
    fn test_grid_rows_match_tiers() {
        let game = new_game(2);
        let grid = game.table.card_grid(3, 4);
        for (row, slots) in grid.iter().enumerate() {
            for slot in slots {
                let card = game.table.get(slot.unwrap()).unwrap().as_card().unwrap();
                assert_eq!(card.row as usize, row);
            }
        }
    }

    #[test]
    fn test_next_player_wraps() {
        let mut game = new_game(3);
        game.next_player();
        game.next_player();
        assert_eq!(game.current_player, 2);
        game.next_player();
        assert_eq!(game.current_player, 0);
        assert_eq!(game.player_state(0), Some(PlayerState::TurnStarted));

        let active = game.players.iter().filter(|p| !p.is_waiting()).count();
        assert_eq!(active, 1);
    }

    #[test]
    fn test_discount_applied_before_tokens() {
        let mut game = new_game(4);
        give_reward(&mut game, GemColor::Red, 0);
        give(&mut game, GemColor::Red, 2, 0);
        give(&mut game, GemColor::Gold, 1, 0);

        let spent = game
            .pay_chip_cost(&ColorCount::single(GemColor::Red, 3), 0)
            .unwrap();

        assert_eq!(spent.len(), 2);
        let tokens = game.table.player_tokens(0);
        assert_eq!(tokens.red, 0);
        assert_eq!(tokens.gold, 1);
        assert_eq!(game.table.supply_counts().red, 7);
    }

    #[test]
    fn test_gold_pays_shortfall() {
        let mut game = new_game(4);
        give(&mut game, GemColor::Blue, 1, 0);
        give(&mut game, GemColor::Gold, 2, 0);

        game.pay_chip_cost(&ColorCount::single(GemColor::Blue, 3), 0)
            .unwrap();
        assert!(game.table.player_tokens(0).is_empty());
    }

    #[test]
    fn test_payment_refuses_unaffordable_cost() {
        let mut game = new_game(4);
        give(&mut game, GemColor::Blue, 1, 0);

        let result = game.pay_chip_cost(&ColorCount::single(GemColor::Blue, 2), 0);
        assert_eq!(result, Err(GameError::CannotAfford));
        // Nothing moved
        assert_eq!(game.table.player_tokens(0).blue, 1);
    }

    #[test]
    fn test_tiles_earned_counts_rewards_not_tokens() {
        let mut game = new_game(2);
        let tile = game.table.tiles_on_offer()[0];
        let cost = game.table.get(tile).unwrap().as_tile().unwrap().cost;

        for (color, n) in cost.colors() {
            give(&mut game, color, n as usize, 0);
        }
        assert!(!game.tiles_earned().contains(&tile));

        for (color, n) in cost.colors() {
            for _ in 0..n {
                give_reward(&mut game, color, 0);
            }
        }
        assert!(game.tiles_earned().contains(&tile));
    }

    #[test]
    fn test_multiple_tiles_threshold() {
        let mut game = new_game(2);
        assert!(!game.earned_single_tile());
        assert!(!game.earned_multiple_tiles());

        // Enough rewards of every color for any standard tile
        for color in GemColor::RESOURCES {
            for _ in 0..4 {
                give_reward(&mut game, color, 0);
            }
        }
        assert_eq!(game.tiles_earned().len(), 3);
        assert!(game.earned_multiple_tiles());
        assert!(!game.earned_single_tile());
    }

    #[test]
    fn test_points_for_player() {
        let mut game = new_game(2);
        let card = game.table.open_cards()[0];
        let points = game.table.get(card).unwrap().as_card().unwrap().points;
        game.table.move_to(card, Area::InPlayerArea, Some(1));

        let tile = game.table.tiles_on_offer()[0];
        game.table.move_to(tile, Area::InPlayerArea, Some(1));

        assert_eq!(game.points_for_player(1), points + 3);
        assert_eq!(game.points_for_player(0), 0);
    }

    #[test]
    fn test_leader_tie_break_on_fewer_cards() {
        let mut game = new_game(2);
        let tiles = game.table.tiles_on_offer();
        game.table.move_to(tiles[0], Area::InPlayerArea, Some(0));
        game.table.move_to(tiles[1], Area::InPlayerArea, Some(1));

        // Same points, but player 0 also owns a worthless card
        let free_card = game
            .table
            .ids(Filter::new().area(Area::InSupply).kind(ComponentKind::Card).face_up(false))
            .into_iter()
            .find(|&id| game.table.get(id).unwrap().as_card().unwrap().points == 0)
            .unwrap();
        game.table.move_to(free_card, Area::InPlayerArea, Some(0));

        assert_eq!(game.points_for_player(0), game.points_for_player(1));
        assert_eq!(game.leader(), 1);
    }

    #[test]
    fn test_leader_tie_break_on_seat() {
        let game = new_game(3);
        assert_eq!(game.leader(), 0);
    }
}
