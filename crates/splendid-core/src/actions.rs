//! Game actions that players can take.
//!
//! This module defines the moves a player can build, the actions that drive
//! the engine, and the events that result from those actions.

use crate::board::{Area, Component, ComponentId, PlayerId, Table};
use crate::game::{GameError, GameState};
use crate::player::ColorCount;
use serde::{Deserialize, Serialize};

/// Kind of full move a turn consists of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveType {
    /// Up to three tokens of different colors
    TakeDifferentTokens,
    /// Two tokens of one color
    TakeSameTokens,
    /// Buy a face-up or reserved card
    BuyCard,
    /// Reserve a face-up card, taking a gold token if one is left
    ReserveCard,
}

/// A structurally legal full move
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    /// Components the move consists of
    pub pieces: Vec<ComponentId>,
    pub move_type: MoveType,
    /// Pieces that must be held before the others become valid
    pub required: Vec<ComponentId>,
}

impl Move {
    pub fn new(pieces: Vec<ComponentId>, move_type: MoveType) -> Self {
        Self {
            pieces,
            move_type,
            required: Vec::new(),
        }
    }

    pub fn with_required(mut self, required: Vec<ComponentId>) -> Self {
        self.required = required;
        self
    }

    /// Pieces in the order they can be picked: required pieces first
    pub fn activation_order(&self) -> Vec<ComponentId> {
        let mut order = self.required.clone();
        order.extend(self.pieces.iter().filter(|p| !self.required.contains(p)));
        order
    }
}

/// All possible actions a player can take
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameAction {
    /// Pick a token or card into the holding area
    TakePiece(ComponentId),
    /// Put a held piece back where it came from
    ReturnPiece(ComponentId),
    /// Put every held piece back
    ResetTurn,
    /// Commit the holding area as a move of this type
    Confirm(MoveType),
    /// Claim one of several earned tiles
    SelectTile(ComponentId),
    /// Hand the turn to the next player
    EndTurn,
}

/// Activation of a single piece, chosen by component variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PieceAction {
    TakeToken(ComponentId),
    TakeCard(ComponentId),
}

impl PieceAction {
    /// The action that moves this component, if it can be picked at all
    pub fn for_component(component: &Component) -> Option<Self> {
        match component {
            Component::Token(t) => Some(PieceAction::TakeToken(t.id)),
            Component::Card(c) => Some(PieceAction::TakeCard(c.id)),
            // Tiles are claimed, never picked
            Component::Tile(_) => None,
        }
    }

    pub fn component(&self) -> ComponentId {
        match self {
            PieceAction::TakeToken(id) | PieceAction::TakeCard(id) => *id,
        }
    }

    /// Whether the piece sits where this action can pick it up: a token in
    /// the supply, a card face-up on the grid, or a card in the player's own
    /// reserve
    pub fn is_takeable(&self, table: &Table, player: PlayerId) -> bool {
        let Some(component) = table.get(self.component()) else {
            return false;
        };
        let placement = component.placement();
        match (self, component) {
            (PieceAction::TakeToken(_), Component::Token(_)) => placement.area == Area::InSupply,
            (PieceAction::TakeCard(_), Component::Card(card)) => match placement.area {
                Area::InSupply => card.face_up && card.column.is_some(),
                Area::InReservedArea => placement.owner == Some(player),
                _ => false,
            },
            _ => false,
        }
    }

    /// Perform the transition for `player`. The engine checks the variant's
    /// pick-up rule through [`PieceAction::is_takeable`].
    pub fn activate(
        &self,
        game: &mut GameState,
        player: PlayerId,
    ) -> Result<Vec<GameEvent>, GameError> {
        game.apply_action(player, GameAction::TakePiece(self.component()))
    }
}

/// Events that occur as a result of actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A piece was moved into the holding area
    PieceTaken {
        player: PlayerId,
        component: ComponentId,
    },

    /// A held piece went back to where it came from
    PieceReturned {
        player: PlayerId,
        component: ComponentId,
    },

    /// The holding area was committed
    MoveConfirmed {
        player: PlayerId,
        move_type: MoveType,
    },

    /// Tokens went from the holding area to the player
    TokensBanked {
        player: PlayerId,
        tokens: ColorCount,
    },

    /// Tokens went from the player back to the supply
    TokensPaid {
        player: PlayerId,
        tokens: ColorCount,
    },

    /// A card was bought
    CardBought {
        player: PlayerId,
        card: ComponentId,
    },

    /// A card was reserved
    CardReserved {
        player: PlayerId,
        card: ComponentId,
        /// Whether a gold token came with it
        with_gold: bool,
    },

    /// A card was turned face up into an empty grid slot
    CardDealt {
        card: ComponentId,
        row: u8,
        column: u8,
    },

    /// Several tiles were earned; the player must pick one
    TilesOffered {
        player: PlayerId,
        tiles: Vec<ComponentId>,
    },

    /// A tile was claimed
    TileClaimed {
        player: PlayerId,
        tile: ComponentId,
    },

    /// A player reached the winning score; the round will be finished
    FinalRound { player: PlayerId, points: u32 },

    /// Turn ended
    TurnEnded {
        player: PlayerId,
        next_player: PlayerId,
    },

    /// A player won the game
    GameWon { player: PlayerId, points: u32 },
}
