//! Player state and color counting.
//!
//! This module contains:
//! - ColorCount for costs, discounts, holdings and supply counts
//! - The per-player turn lifecycle state
//! - Player struct

use crate::board::{GemColor, PlayerId};
use crate::catalog::CatalogError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A count per gem color
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColorCount {
    pub white: u32,
    pub blue: u32,
    pub green: u32,
    pub red: u32,
    pub black: u32,
    pub gold: u32,
}

impl ColorCount {
    /// Create an empty count
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a count with specific resource amounts (no gold)
    pub fn with_amounts(white: u32, blue: u32, green: u32, red: u32, black: u32) -> Self {
        Self {
            white,
            blue,
            green,
            red,
            black,
            gold: 0,
        }
    }

    /// Create a count of a single color
    pub fn single(color: GemColor, amount: u32) -> Self {
        let mut count = Self::new();
        count.add(color, amount);
        count
    }

    pub fn get(&self, color: GemColor) -> u32 {
        match color {
            GemColor::White => self.white,
            GemColor::Blue => self.blue,
            GemColor::Green => self.green,
            GemColor::Red => self.red,
            GemColor::Black => self.black,
            GemColor::Gold => self.gold,
        }
    }

    pub fn set(&mut self, color: GemColor, count: u32) {
        match color {
            GemColor::White => self.white = count,
            GemColor::Blue => self.blue = count,
            GemColor::Green => self.green = count,
            GemColor::Red => self.red = count,
            GemColor::Black => self.black = count,
            GemColor::Gold => self.gold = count,
        }
    }

    pub fn add(&mut self, color: GemColor, amount: u32) {
        self.set(color, self.get(color) + amount);
    }

    /// Add another count to this one
    pub fn add_count(&mut self, other: &ColorCount) {
        for color in GemColor::ALL {
            self.add(color, other.get(color));
        }
    }

    pub fn total(&self) -> u32 {
        GemColor::ALL.iter().map(|&c| self.get(c)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Colors with a non-zero count, wildcard last
    pub fn colors(&self) -> impl Iterator<Item = (GemColor, u32)> + '_ {
        GemColor::ALL
            .into_iter()
            .map(|c| (c, self.get(c)))
            .filter(|&(_, n)| n > 0)
    }

    /// Check color by color that this count meets a cost. Gold is not a wildcard here.
    pub fn covers_cost(&self, cost: &ColorCount) -> bool {
        GemColor::RESOURCES
            .iter()
            .all(|&c| self.get(c) >= cost.get(c))
    }

    /// Resource units this count falls short of a cost, summed over colors
    pub fn shortfall(&self, cost: &ColorCount) -> u32 {
        GemColor::RESOURCES
            .iter()
            .map(|&c| cost.get(c).saturating_sub(self.get(c)))
            .sum()
    }

    /// Check that this count meets a cost when gold covers any shortfall
    pub fn covers_cost_with_wildcard(&self, cost: &ColorCount) -> bool {
        self.shortfall(cost) <= self.gold
    }
}

impl FromStr for ColorCount {
    type Err = CatalogError;

    /// Parse catalog text such as `"7 white, 7 blue, 5 gold"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut count = ColorCount::new();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let mut words = part.split_whitespace();
            let (Some(amount), Some(color), None) = (words.next(), words.next(), words.next())
            else {
                return Err(CatalogError::MalformedCount(part.to_string()));
            };
            let amount: u32 = amount
                .parse()
                .map_err(|_| CatalogError::MalformedCount(part.to_string()))?;
            let color = GemColor::from_name(color)
                .ok_or_else(|| CatalogError::UnknownColor(color.to_string()))?;
            count.add(color, amount);
        }
        Ok(count)
    }
}

impl fmt::Display for ColorCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .colors()
            .map(|(color, n)| format!("{} {}", n, color))
            .collect();
        if parts.is_empty() {
            f.write_str("nothing")
        } else {
            f.write_str(&parts.join(", "))
        }
    }
}

/// Where a player is in the turn lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    /// Another player is taking their turn
    WaitingForTurn,
    /// Turn has begun, nothing picked yet
    TurnStarted,
    /// Some pieces picked, more may be added
    TurnInProgress,
    /// No further piece may be picked; ready to confirm
    TurnValid,
    /// Several tiles earned, one must be chosen
    TilesOffered,
    /// A tile has been claimed this turn
    TileSelected,
    /// Move committed, waiting to hand over
    TurnFinished,
}

impl PlayerState {
    /// Whether pieces may still be picked or returned
    pub fn is_building_move(&self) -> bool {
        matches!(
            self,
            PlayerState::TurnStarted | PlayerState::TurnInProgress | PlayerState::TurnValid
        )
    }
}

/// A seated player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Seat index (0-3)
    pub id: PlayerId,
    pub name: String,
    pub state: PlayerState,
}

impl Player {
    /// Create a new player, waiting for their turn
    pub fn new(id: PlayerId, name: String) -> Self {
        Self {
            id,
            name,
            state: PlayerState::WaitingForTurn,
        }
    }

    pub fn wait(&mut self) {
        self.state = PlayerState::WaitingForTurn;
    }

    pub fn start(&mut self) {
        self.state = PlayerState::TurnStarted;
    }

    pub fn is_waiting(&self) -> bool {
        self.state == PlayerState::WaitingForTurn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_count_total() {
        let count = ColorCount::with_amounts(1, 2, 3, 4, 5);
        assert_eq!(count.total(), 15);
    }

    #[test]
    fn test_covers_cost() {
        let count = ColorCount::with_amounts(2, 2, 2, 2, 2);
        assert!(count.covers_cost(&ColorCount::with_amounts(1, 1, 1, 1, 1)));
        assert!(!count.covers_cost(&ColorCount::with_amounts(3, 0, 0, 0, 0)));
    }

    #[test]
    fn test_gold_covers_shortfall() {
        let mut count = ColorCount::with_amounts(1, 0, 0, 2, 0);
        let cost = ColorCount::with_amounts(2, 0, 0, 3, 0);
        assert_eq!(count.shortfall(&cost), 2);
        assert!(!count.covers_cost_with_wildcard(&cost));

        count.gold = 2;
        assert!(count.covers_cost_with_wildcard(&cost));
        // Plain cover never spends gold
        assert!(!count.covers_cost(&cost));
    }

    #[test]
    fn test_parse_catalog_text() {
        let count: ColorCount = "7 white, 7 blue, 7 red, 7 green, 7 black, 5 yellow"
            .parse()
            .unwrap();
        assert_eq!(count.white, 7);
        assert_eq!(count.green, 7);
        assert_eq!(count.gold, 5);
        assert_eq!(count.total(), 40);
    }

    #[test]
    fn test_parse_rejects_bad_text() {
        assert!(matches!(
            "3 purple".parse::<ColorCount>(),
            Err(CatalogError::UnknownColor(_))
        ));
        assert!(matches!(
            "three red".parse::<ColorCount>(),
            Err(CatalogError::MalformedCount(_))
        ));
        assert!(matches!(
            "3 red green".parse::<ColorCount>(),
            Err(CatalogError::MalformedCount(_))
        ));
        assert_eq!("".parse::<ColorCount>().unwrap(), ColorCount::new());
    }

    #[test]
    fn test_display_lists_non_zero_colors() {
        let count = ColorCount::with_amounts(3, 0, 0, 2, 0);
        assert_eq!(count.to_string(), "3 white, 2 red");
        assert_eq!(ColorCount::new().to_string(), "nothing");
    }

    #[test]
    fn test_player_lifecycle() {
        let mut player = Player::new(0, "Test".to_string());
        assert!(player.is_waiting());

        player.start();
        assert_eq!(player.state, PlayerState::TurnStarted);
        assert!(player.state.is_building_move());

        player.wait();
        assert!(player.is_waiting());
    }
}
