//! Game content: the cards, tiles and token supply a match is built from.
//!
//! The engine never hardcodes content. It asks a [`ComponentFactory`] for raw
//! rows and turns them into live components in `GameState::init_components`.
//!
//! - [`StandardCatalog`]: the built-in 90 cards and 10 tiles
//! - [`JsonCatalog`]: rows loaded from JSON, costs in catalog text form
//!   (`"3 white, 2 blue"`)

use crate::board::GemColor;
use crate::player::ColorCount;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Points every standard tile is worth
const TILE_POINTS: u32 = 3;

/// Errors raised while reading content
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Unknown color: {0}")]
    UnknownColor(String),

    #[error("Malformed count: {0}")]
    MalformedCount(String),

    #[error("Card row {0} out of range (0-2)")]
    BadRow(u8),

    #[error("Costs cannot include gold")]
    GoldInCost,

    #[error("Cards cannot reward gold")]
    GoldReward,

    #[error("Unsupported player count: {0}")]
    UnsupportedPlayerCount(usize),

    #[error("Invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A card as listed in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardRow {
    pub row: u8,
    pub reward: GemColor,
    pub points: u32,
    pub cost: ColorCount,
}

/// A tile as listed in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRow {
    pub points: u32,
    pub cost: ColorCount,
}

/// Source of raw content rows
pub trait ComponentFactory {
    fn cards(&self) -> Result<Vec<CardRow>, CatalogError>;

    fn tiles(&self) -> Result<Vec<TileRow>, CatalogError>;

    /// Token supply for a seated player count
    fn tokens(&self, player_count: usize) -> Result<ColorCount, CatalogError> {
        standard_token_supply(player_count)
    }
}

/// Standard token supply: fewer resource tokens with fewer players, always 5 gold
pub fn standard_token_supply(player_count: usize) -> Result<ColorCount, CatalogError> {
    let text = match player_count {
        4 => "7 white, 7 blue, 7 red, 7 green, 7 black, 5 yellow",
        3 => "5 white, 5 blue, 5 red, 5 green, 5 black, 5 yellow",
        2 => "4 white, 4 blue, 4 red, 4 green, 4 black, 5 yellow",
        n => return Err(CatalogError::UnsupportedPlayerCount(n)),
    };
    text.parse()
}

/// Cost pattern relative to the card's own color: `(offset, amount)`, where
/// offset 0 is the card's color and 1-4 walk the resource colors in order
type Pattern = &'static [(usize, u32)];

/// Tier 1: 8 cards per color
const TIER_ONE: [(Pattern, u32); 8] = [
    (&[(1, 1), (2, 1), (3, 1), (4, 1)], 0),
    (&[(1, 1), (2, 2), (3, 1), (4, 1)], 0),
    (&[(1, 2), (2, 2), (4, 1)], 0),
    (&[(0, 1), (2, 1), (3, 3)], 0),
    (&[(2, 2), (3, 1)], 0),
    (&[(1, 2), (3, 2)], 0),
    (&[(2, 3)], 0),
    (&[(1, 4)], 1),
];

/// Tier 2: 6 cards per color
const TIER_TWO: [(Pattern, u32); 6] = [
    (&[(1, 3), (2, 2), (3, 2)], 1),
    (&[(0, 2), (2, 3), (4, 3)], 1),
    (&[(1, 1), (2, 4), (3, 2)], 2),
    (&[(2, 5)], 2),
    (&[(1, 5), (3, 3)], 2),
    (&[(0, 6)], 3),
];

/// Tier 3: 4 cards per color
const TIER_THREE: [(Pattern, u32); 4] = [
    (&[(1, 3), (2, 3), (3, 5), (4, 3)], 3),
    (&[(1, 7)], 4),
    (&[(0, 3), (1, 6), (4, 3)], 4),
    (&[(0, 3), (1, 7)], 5),
];

/// The built-in content set
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardCatalog;

impl StandardCatalog {
    fn pattern_cost(color_index: usize, pattern: Pattern) -> ColorCount {
        let mut cost = ColorCount::new();
        for &(offset, amount) in pattern {
            let color = GemColor::RESOURCES[(color_index + offset) % GemColor::RESOURCES.len()];
            cost.add(color, amount);
        }
        cost
    }
}

impl ComponentFactory for StandardCatalog {
    fn cards(&self) -> Result<Vec<CardRow>, CatalogError> {
        let tiers: [&[(Pattern, u32)]; 3] = [&TIER_ONE, &TIER_TWO, &TIER_THREE];
        let mut cards = Vec::with_capacity(90);
        for (row, tier) in tiers.iter().enumerate() {
            for (i, reward) in GemColor::RESOURCES.iter().enumerate() {
                for &(pattern, points) in tier.iter() {
                    cards.push(CardRow {
                        row: row as u8,
                        reward: *reward,
                        points,
                        cost: Self::pattern_cost(i, pattern),
                    });
                }
            }
        }
        Ok(cards)
    }

    fn tiles(&self) -> Result<Vec<TileRow>, CatalogError> {
        let mut tiles = Vec::with_capacity(10);
        for i in 0..GemColor::RESOURCES.len() {
            tiles.push(TileRow {
                points: TILE_POINTS,
                cost: Self::pattern_cost(i, &[(0, 4), (1, 4)]),
            });
            tiles.push(TileRow {
                points: TILE_POINTS,
                cost: Self::pattern_cost(i, &[(0, 3), (1, 3), (2, 3)]),
            });
        }
        Ok(tiles)
    }
}

#[derive(Debug, Deserialize)]
struct RawCard {
    row: u8,
    reward: GemColor,
    #[serde(default)]
    points: u32,
    cost: String,
}

#[derive(Debug, Deserialize)]
struct RawTile {
    #[serde(default = "default_tile_points")]
    points: u32,
    cost: String,
}

fn default_tile_points() -> u32 {
    TILE_POINTS
}

#[derive(Debug, Deserialize)]
struct RawCatalog {
    cards: Vec<RawCard>,
    tiles: Vec<RawTile>,
}

/// Content loaded from JSON:
///
/// ```json
/// {
///   "cards": [{"row": 0, "reward": "red", "points": 0, "cost": "2 white, 1 blue"}],
///   "tiles": [{"points": 3, "cost": "4 red, 4 green"}]
/// }
/// ```
#[derive(Debug, Clone)]
pub struct JsonCatalog {
    cards: Vec<CardRow>,
    tiles: Vec<TileRow>,
}

impl JsonCatalog {
    /// Parse and validate a JSON catalog
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let raw: RawCatalog = serde_json::from_str(json)?;

        let cards = raw
            .cards
            .into_iter()
            .map(|c| {
                if c.row > 2 {
                    return Err(CatalogError::BadRow(c.row));
                }
                if c.reward.is_wildcard() {
                    return Err(CatalogError::GoldReward);
                }
                Ok(CardRow {
                    row: c.row,
                    reward: c.reward,
                    points: c.points,
                    cost: parse_cost(&c.cost)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let tiles = raw
            .tiles
            .into_iter()
            .map(|t| {
                Ok(TileRow {
                    points: t.points,
                    cost: parse_cost(&t.cost)?,
                })
            })
            .collect::<Result<Vec<_>, CatalogError>>()?;

        Ok(Self { cards, tiles })
    }
}

impl ComponentFactory for JsonCatalog {
    fn cards(&self) -> Result<Vec<CardRow>, CatalogError> {
        Ok(self.cards.clone())
    }

    fn tiles(&self) -> Result<Vec<TileRow>, CatalogError> {
        Ok(self.tiles.clone())
    }
}

fn parse_cost(text: &str) -> Result<ColorCount, CatalogError> {
    let cost: ColorCount = text.parse()?;
    if cost.gold > 0 {
        return Err(CatalogError::GoldInCost);
    }
    Ok(cost)
}
