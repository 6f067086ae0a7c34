//! Rule parameters.
//!
//! The defaults are the standard rules; tests and variants override fields.

use serde::{Deserialize, Serialize};

/// Points needed to trigger the final round
pub const POINTS_TO_WIN: u32 = 15;

/// Most cards a player may hold reserved at once
pub const MAX_RESERVED: usize = 3;

/// Supply a color needs before two of it may be taken together
pub const SAME_COLOR_MINIMUM: u32 = 3;

/// Configuration for a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub points_to_win: u32,
    pub max_reserved: usize,
    pub same_color_minimum: u32,
    /// Card tiers on the grid
    pub grid_rows: u8,
    /// Face-up slots per tier
    pub grid_columns: u8,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            points_to_win: POINTS_TO_WIN,
            max_reserved: MAX_RESERVED,
            same_color_minimum: SAME_COLOR_MINIMUM,
            grid_rows: 3,
            grid_columns: 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_standard_rules() {
        let config = GameConfig::default();
        assert_eq!(config.points_to_win, 15);
        assert_eq!(config.max_reserved, 3);
        assert_eq!(config.grid_rows * config.grid_columns, 12);
    }

    #[test]
    fn test_config_deserializes_from_json() {
        let config: GameConfig = serde_json::from_str(
            r#"{"points_to_win":10,"max_reserved":2,"same_color_minimum":4,"grid_rows":3,"grid_columns":4}"#,
        )
        .unwrap();
        assert_eq!(config.points_to_win, 10);
        assert_eq!(config.max_reserved, 2);
    }
}
