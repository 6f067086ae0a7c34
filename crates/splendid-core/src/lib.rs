//! Splendid - a gem-trading card game engine
//!
//! This crate provides the core rules for Splendid, including:
//! - Tokens, cards and tiles, and the areas they move between
//! - The catalog of legal moves and the incremental move validator
//! - Cost payment with card discounts and the gold wildcard
//! - The turn lifecycle state machine and game end
//!
//! # Architecture
//!
//! The engine is a single owned [`GameState`] driven by
//! [`GameState::apply_action`]. A move is built one piece at a time in the
//! holding area; after every pick the engine recomputes which pieces may
//! follow, so a front end only ever offers legal choices.
//!
//! # Modules
//!
//! - [`board`]: Colors, components and the table that holds them
//! - [`player`]: Color counts and the player lifecycle
//! - [`moves`]: Move catalog, validation and payment planning
//! - [`game`]: Game state machine
//! - [`catalog`]: Card, tile and token content
//! - [`bot`]: Random computer player

pub mod actions;
pub mod board;
pub mod bot;
pub mod catalog;
pub mod config;
pub mod game;
pub mod moves;
pub mod player;

// Re-export commonly used types
pub use actions::{GameAction, GameEvent, Move, MoveType, PieceAction};
pub use board::{Area, Component, ComponentId, ComponentKind, Filter, GemColor, PlayerId, Table};
pub use bot::Bot;
pub use catalog::{CatalogError, ComponentFactory, JsonCatalog, StandardCatalog};
pub use config::GameConfig;
pub use game::{GameError, GamePhase, GameState};
pub use player::{ColorCount, Player, PlayerState};
