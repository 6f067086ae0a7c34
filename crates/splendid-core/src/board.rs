//! Table representation: gem colors, component areas, and the shared
//! collection of tokens, cards and tiles.
//!
//! This module contains:
//! - Gem colors (five resources plus the gold wildcard)
//! - The areas a component can occupy and who owns it there
//! - Token, card and tile components
//! - The `Table` that owns every component and answers filtered queries

use crate::player::ColorCount;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Player identifier (seat index, 0-3)
pub type PlayerId = u8;

/// Stable index of a component on the table
pub type ComponentId = usize;

/// Gem colors. Five resource colors plus gold, which is the wildcard.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum GemColor {
    White,
    Blue,
    Green,
    Red,
    Black,
    /// Wildcard, spendable as any resource color
    #[serde(alias = "yellow")]
    Gold,
}

impl GemColor {
    /// The five resource colors, in display order
    pub const RESOURCES: [GemColor; 5] = [
        GemColor::White,
        GemColor::Blue,
        GemColor::Green,
        GemColor::Red,
        GemColor::Black,
    ];

    /// Every color, wildcard last
    pub const ALL: [GemColor; 6] = [
        GemColor::White,
        GemColor::Blue,
        GemColor::Green,
        GemColor::Red,
        GemColor::Black,
        GemColor::Gold,
    ];

    /// Whether this is the wildcard color
    pub fn is_wildcard(&self) -> bool {
        matches!(self, GemColor::Gold)
    }

    /// Lowercase name, as used in catalog text
    pub fn name(&self) -> &'static str {
        match self {
            GemColor::White => "white",
            GemColor::Blue => "blue",
            GemColor::Green => "green",
            GemColor::Red => "red",
            GemColor::Black => "black",
            GemColor::Gold => "gold",
        }
    }

    /// Parse a lowercase color name. `yellow` is accepted for gold.
    pub fn from_name(name: &str) -> Option<GemColor> {
        match name.trim().to_ascii_lowercase().as_str() {
            "white" => Some(GemColor::White),
            "blue" => Some(GemColor::Blue),
            "green" => Some(GemColor::Green),
            "red" => Some(GemColor::Red),
            "black" => Some(GemColor::Black),
            "gold" | "yellow" => Some(GemColor::Gold),
            _ => None,
        }
    }
}

impl fmt::Display for GemColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a component currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Area {
    /// Unowned and available to everyone (token pool, card decks and grid, tile offer)
    InSupply,
    /// Picked by the active player for the move being built, not yet committed
    InHoldingArea,
    /// Reserved by a player but not purchased
    InReservedArea,
    /// Owned and committed (banked token, purchased card, claimed tile)
    InPlayerArea,
}

/// Area and ownership of a single component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub area: Area,
    pub owner: Option<PlayerId>,
    /// Area the component was picked from while it sits in the holding area
    pub origin: Option<Area>,
}

impl Placement {
    /// An unowned placement in the supply
    pub fn supply() -> Self {
        Self {
            area: Area::InSupply,
            owner: None,
            origin: None,
        }
    }

    /// Area the component occupies once the holding area is put back
    pub fn settled_area(&self) -> Area {
        match (self.area, self.origin) {
            (Area::InHoldingArea, Some(origin)) => origin,
            (area, _) => area,
        }
    }

    /// Owner once the holding area is put back. Supply pieces have none.
    pub fn settled_owner(&self) -> Option<PlayerId> {
        if self.settled_area() == Area::InSupply {
            None
        } else {
            self.owner
        }
    }
}

/// Kind of component, for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    Token,
    Card,
    Tile,
}

/// A gem token. Tokens of the same color are interchangeable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub id: ComponentId,
    pub color: GemColor,
    pub placement: Placement,
}

/// A development card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: ComponentId,
    /// Token cost (never includes gold)
    pub cost: ColorCount,
    /// Discount color granted once owned
    pub reward: GemColor,
    pub points: u32,
    /// Tier, 0-2
    pub row: u8,
    /// Display slot while face-up on the grid
    pub column: Option<u8>,
    pub face_up: bool,
    pub placement: Placement,
}

/// A bonus tile, claimed once a player's card rewards cover its cost
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub id: ComponentId,
    /// Required card rewards per color
    pub cost: ColorCount,
    pub points: u32,
    /// Display slot while on offer
    pub column: Option<u8>,
    pub placement: Placement,
}

/// Any component on the table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Component {
    Token(Token),
    Card(Card),
    Tile(Tile),
}

impl Component {
    pub fn id(&self) -> ComponentId {
        match self {
            Component::Token(t) => t.id,
            Component::Card(c) => c.id,
            Component::Tile(t) => t.id,
        }
    }

    fn set_id(&mut self, id: ComponentId) {
        match self {
            Component::Token(t) => t.id = id,
            Component::Card(c) => c.id = id,
            Component::Tile(t) => t.id = id,
        }
    }

    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::Token(_) => ComponentKind::Token,
            Component::Card(_) => ComponentKind::Card,
            Component::Tile(_) => ComponentKind::Tile,
        }
    }

    pub fn placement(&self) -> &Placement {
        match self {
            Component::Token(t) => &t.placement,
            Component::Card(c) => &c.placement,
            Component::Tile(t) => &t.placement,
        }
    }

    fn placement_mut(&mut self) -> &mut Placement {
        match self {
            Component::Token(t) => &mut t.placement,
            Component::Card(c) => &mut c.placement,
            Component::Tile(t) => &mut t.placement,
        }
    }

    pub fn area(&self) -> Area {
        self.placement().area
    }

    pub fn owner(&self) -> Option<PlayerId> {
        self.placement().owner
    }

    /// Token color, or the reward color of a card. Tiles have none.
    pub fn color(&self) -> Option<GemColor> {
        match self {
            Component::Token(t) => Some(t.color),
            Component::Card(c) => Some(c.reward),
            Component::Tile(_) => None,
        }
    }

    pub fn as_token(&self) -> Option<&Token> {
        match self {
            Component::Token(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_card(&self) -> Option<&Card> {
        match self {
            Component::Card(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_tile(&self) -> Option<&Tile> {
        match self {
            Component::Tile(t) => Some(t),
            _ => None,
        }
    }
}

/// Component query. Unset fields match anything.
///
/// By default the area and owner are compared against where each component
/// actually is. [`Filter::settled`] compares against where it will be once the
/// holding area is put back instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Filter {
    area: Option<Area>,
    owner: Option<Option<PlayerId>>,
    kind: Option<ComponentKind>,
    color: Option<GemColor>,
    face_up: Option<bool>,
    row: Option<u8>,
    column: Option<Option<u8>>,
    settled: bool,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn settled(mut self) -> Self {
        self.settled = true;
        self
    }

    pub fn area(mut self, area: Area) -> Self {
        self.area = Some(area);
        self
    }

    pub fn owner(mut self, player: PlayerId) -> Self {
        self.owner = Some(Some(player));
        self
    }

    pub fn unowned(mut self) -> Self {
        self.owner = Some(None);
        self
    }

    pub fn kind(mut self, kind: ComponentKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Token color or card reward color
    pub fn color(mut self, color: GemColor) -> Self {
        self.color = Some(color);
        self
    }

    pub fn face_up(mut self, face_up: bool) -> Self {
        self.face_up = Some(face_up);
        self
    }

    pub fn row(mut self, row: u8) -> Self {
        self.row = Some(row);
        self
    }

    /// Card or tile display column (`None` matches components off the display)
    pub fn column(mut self, column: Option<u8>) -> Self {
        self.column = Some(column);
        self
    }

    /// Check a single component against this filter
    pub fn matches(&self, component: &Component) -> bool {
        let placement = component.placement();
        let (area, owner) = if self.settled {
            (placement.settled_area(), placement.settled_owner())
        } else {
            (placement.area, placement.owner)
        };

        if self.area.is_some_and(|a| a != area) {
            return false;
        }
        if self.owner.is_some_and(|o| o != owner) {
            return false;
        }
        if self.kind.is_some_and(|k| k != component.kind()) {
            return false;
        }
        if self.color.is_some() && self.color != component.color() {
            return false;
        }
        if let Some(face_up) = self.face_up {
            if !component.as_card().is_some_and(|c| c.face_up == face_up) {
                return false;
            }
        }
        if let Some(row) = self.row {
            if !component.as_card().is_some_and(|c| c.row == row) {
                return false;
            }
        }
        if let Some(column) = self.column {
            let actual = match component {
                Component::Card(c) => c.column,
                Component::Tile(t) => t.column,
                Component::Token(_) => return false,
            };
            if actual != column {
                return false;
            }
        }
        true
    }
}

/// Every component in the game, indexed by `ComponentId`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    components: Vec<Component>,
}

impl Table {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table, renumbering component ids to their position
    pub fn from_components(components: Vec<Component>) -> Self {
        let mut components = components;
        for (i, component) in components.iter_mut().enumerate() {
            component.set_id(i);
        }
        Self { components }
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    // ==================== Query Methods ====================

    /// Get a component by id
    pub fn get(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Component> {
        self.components.iter()
    }

    /// All components matching a filter, in id order
    pub fn filter(&self, filter: Filter) -> impl Iterator<Item = &Component> + '_ {
        self.components.iter().filter(move |c| filter.matches(c))
    }

    /// Ids of all components matching a filter, in id order
    pub fn ids(&self, filter: Filter) -> Vec<ComponentId> {
        self.filter(filter).map(Component::id).collect()
    }

    pub fn count(&self, filter: Filter) -> usize {
        self.filter(filter).count()
    }

    /// Per-color count over matching tokens (by color) and cards (by reward).
    /// A gold card reward is never a discount and is not counted.
    pub fn count_by_color(&self, filter: Filter) -> ColorCount {
        let mut counts = ColorCount::new();
        for component in self.filter(filter) {
            match component {
                Component::Token(t) => counts.add(t.color, 1),
                Component::Card(c) if !c.reward.is_wildcard() => counts.add(c.reward, 1),
                Component::Card(_) | Component::Tile(_) => {}
            }
        }
        counts
    }

    /// Tokens per color left in the supply, counting held tokens as returned
    pub fn supply_counts(&self) -> ColorCount {
        self.count_by_color(
            Filter::new()
                .settled()
                .area(Area::InSupply)
                .kind(ComponentKind::Token),
        )
    }

    /// Supply tokens of one color, counting held tokens as returned
    pub fn supply_tokens(&self, color: GemColor) -> Vec<ComponentId> {
        self.ids(
            Filter::new()
                .settled()
                .area(Area::InSupply)
                .kind(ComponentKind::Token)
                .color(color),
        )
    }

    /// The first supply token of every resource color that has any
    pub fn top_supply_tokens(&self) -> Vec<ComponentId> {
        GemColor::RESOURCES
            .iter()
            .filter_map(|&color| self.supply_tokens(color).first().copied())
            .collect()
    }

    /// Supply token actually available right now (not held)
    pub fn available_token(&self, color: GemColor) -> Option<ComponentId> {
        self.filter(
            Filter::new()
                .area(Area::InSupply)
                .kind(ComponentKind::Token)
                .color(color),
        )
        .map(Component::id)
        .next()
    }

    /// Face-up cards on the grid, by row then column
    pub fn open_cards(&self) -> Vec<ComponentId> {
        let mut cards: Vec<&Card> = self
            .filter(
                Filter::new()
                    .settled()
                    .area(Area::InSupply)
                    .kind(ComponentKind::Card)
                    .face_up(true),
            )
            .filter_map(Component::as_card)
            .filter(|c| c.column.is_some())
            .collect();
        cards.sort_by_key(|c| (c.row, c.column));
        cards.into_iter().map(|c| c.id).collect()
    }

    /// The face-up grid as `rows x columns` slots
    pub fn card_grid(&self, rows: u8, columns: u8) -> Vec<Vec<Option<ComponentId>>> {
        let mut grid = vec![vec![None; columns as usize]; rows as usize];
        for id in self.open_cards() {
            if let Some(card) = self.get(id).and_then(Component::as_card) {
                if let Some(column) = card.column {
                    if let Some(slot) = grid
                        .get_mut(card.row as usize)
                        .and_then(|r| r.get_mut(column as usize))
                    {
                        *slot = Some(id);
                    }
                }
            }
        }
        grid
    }

    /// Face-down cards left in a row's deck
    pub fn deck(&self, row: u8) -> Vec<ComponentId> {
        self.ids(
            Filter::new()
                .settled()
                .area(Area::InSupply)
                .kind(ComponentKind::Card)
                .face_up(false)
                .row(row),
        )
    }

    /// Cards a player has reserved, counting held ones as still reserved
    pub fn reserved_cards(&self, player: PlayerId) -> Vec<ComponentId> {
        self.ids(
            Filter::new()
                .settled()
                .area(Area::InReservedArea)
                .owner(player)
                .kind(ComponentKind::Card),
        )
    }

    /// Tiles still on offer
    pub fn tiles_on_offer(&self) -> Vec<ComponentId> {
        self.ids(
            Filter::new()
                .area(Area::InSupply)
                .kind(ComponentKind::Tile),
        )
    }

    /// Tokens a player has banked, per color
    pub fn player_tokens(&self, player: PlayerId) -> ColorCount {
        self.count_by_color(
            Filter::new()
                .area(Area::InPlayerArea)
                .owner(player)
                .kind(ComponentKind::Token),
        )
    }

    /// Permanent discounts a player has from purchased cards, per color
    pub fn card_rewards(&self, player: PlayerId) -> ColorCount {
        self.count_by_color(
            Filter::new()
                .area(Area::InPlayerArea)
                .owner(player)
                .kind(ComponentKind::Card),
        )
    }

    /// Components currently in the holding area
    pub fn holding_area(&self) -> Vec<ComponentId> {
        self.ids(Filter::new().area(Area::InHoldingArea))
    }

    /// Tokens per color across every area
    pub fn token_totals(&self) -> ColorCount {
        self.count_by_color(Filter::new().kind(ComponentKind::Token))
    }

    // ==================== Transitions ====================

    /// Move a component to an area with the given owner.
    ///
    /// Cards leaving the supply drop their grid column; tiles leaving the
    /// supply leave the offer.
    pub fn move_to(&mut self, id: ComponentId, area: Area, owner: Option<PlayerId>) -> bool {
        let Some(component) = self.components.get_mut(id) else {
            return false;
        };
        let placement = component.placement_mut();
        placement.area = area;
        placement.owner = owner;
        placement.origin = None;

        if area != Area::InSupply {
            match component {
                Component::Card(card) => {
                    card.column = None;
                    card.face_up = true;
                }
                Component::Tile(tile) => tile.column = None,
                Component::Token(_) => {}
            }
        }
        true
    }

    /// Put a component into the holding area for a player, remembering its origin
    pub(crate) fn hold(&mut self, id: ComponentId, player: PlayerId) -> bool {
        let Some(component) = self.components.get_mut(id) else {
            return false;
        };
        let placement = component.placement_mut();
        if placement.area == Area::InHoldingArea {
            return false;
        }
        placement.origin = Some(placement.area);
        placement.area = Area::InHoldingArea;
        placement.owner = Some(player);
        true
    }

    /// Return a held component to its origin. No-op for pieces not held.
    pub(crate) fn release(&mut self, id: ComponentId) -> bool {
        let Some(component) = self.components.get_mut(id) else {
            return false;
        };
        let placement = component.placement_mut();
        if placement.area != Area::InHoldingArea {
            return false;
        }
        let origin = placement.origin.take().unwrap_or(Area::InSupply);
        placement.area = origin;
        if origin == Area::InSupply {
            placement.owner = None;
        }
        true
    }

    /// Turn a card face up into a grid slot
    pub(crate) fn deal(&mut self, id: ComponentId, column: u8) -> bool {
        match self.components.get_mut(id) {
            Some(Component::Card(card)) => {
                card.face_up = true;
                card.column = Some(column);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(color: GemColor) -> Component {
        Component::Token(Token {
            id: 0,
            color,
            placement: Placement::supply(),
        })
    }

    fn card(row: u8, reward: GemColor, column: Option<u8>) -> Component {
        Component::Card(Card {
            id: 0,
            cost: ColorCount::new(),
            reward,
            points: 0,
            row,
            column,
            face_up: column.is_some(),
            placement: Placement::supply(),
        })
    }

    #[test]
    fn test_color_names_round_trip() {
        for color in GemColor::ALL {
            assert_eq!(GemColor::from_name(color.name()), Some(color));
        }
        assert_eq!(GemColor::from_name("yellow"), Some(GemColor::Gold));
        assert_eq!(GemColor::from_name("purple"), None);
    }

    #[test]
    fn test_from_components_renumbers_ids() {
        let table = Table::from_components(vec![
            token(GemColor::Red),
            token(GemColor::Red),
            card(0, GemColor::Blue, Some(0)),
        ]);
        let ids: Vec<_> = table.iter().map(Component::id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_filter_by_kind_and_color() {
        let table = Table::from_components(vec![
            token(GemColor::Red),
            token(GemColor::Blue),
            card(0, GemColor::Red, Some(0)),
        ]);
        let red_tokens = table.count(
            Filter::new()
                .kind(ComponentKind::Token)
                .color(GemColor::Red),
        );
        assert_eq!(red_tokens, 1);
        assert_eq!(table.count(Filter::new().color(GemColor::Red)), 2);
    }

    #[test]
    fn test_hold_and_release_restore_origin() {
        let mut table = Table::from_components(vec![token(GemColor::Green)]);

        assert!(table.hold(0, 1));
        assert_eq!(table.get(0).unwrap().area(), Area::InHoldingArea);
        assert_eq!(table.get(0).unwrap().owner(), Some(1));

        // A held token still counts toward the supply
        assert_eq!(table.supply_counts().get(GemColor::Green), 1);
        assert_eq!(table.available_token(GemColor::Green), None);

        assert!(table.release(0));
        assert_eq!(table.get(0).unwrap().area(), Area::InSupply);
        assert_eq!(table.get(0).unwrap().owner(), None);

        // Releasing again changes nothing
        assert!(!table.release(0));
        assert_eq!(table.get(0).unwrap().area(), Area::InSupply);
    }

    #[test]
    fn test_reserved_card_released_back_to_reserved() {
        let mut table = Table::from_components(vec![card(1, GemColor::White, None)]);
        table.move_to(0, Area::InReservedArea, Some(2));

        table.hold(0, 2);
        assert_eq!(table.reserved_cards(2), vec![0]);

        table.release(0);
        assert_eq!(table.get(0).unwrap().area(), Area::InReservedArea);
        assert_eq!(table.get(0).unwrap().owner(), Some(2));
    }

    #[test]
    fn test_card_grid_and_deck() {
        let table = Table::from_components(vec![
            card(0, GemColor::Red, Some(2)),
            card(0, GemColor::Blue, None),
            card(2, GemColor::Black, Some(0)),
        ]);
        let grid = table.card_grid(3, 4);
        assert_eq!(grid[0][2], Some(0));
        assert_eq!(grid[2][0], Some(2));
        assert_eq!(grid[1], vec![None; 4]);
        assert_eq!(table.deck(0), vec![1]);
        assert_eq!(table.open_cards(), vec![0, 2]);
    }

    #[test]
    fn test_gold_reward_is_not_a_wildcard() {
        let mut table = Table::from_components(vec![
            card(0, GemColor::Gold, None),
            card(0, GemColor::Gold, None),
        ]);
        table.move_to(0, Area::InPlayerArea, Some(0));
        table.move_to(1, Area::InPlayerArea, Some(0));

        assert!(table.card_rewards(0).is_empty());
        assert_eq!(
            table.count_by_color(Filter::new().area(Area::InPlayerArea).owner(0)),
            ColorCount::new()
        );
    }

    #[test]
    fn test_move_to_clears_grid_slot() {
        let mut table = Table::from_components(vec![card(0, GemColor::Red, Some(1))]);
        table.move_to(0, Area::InPlayerArea, Some(0));
        let card = table.get(0).unwrap().as_card().unwrap();
        assert_eq!(card.column, None);
        assert!(table.open_cards().is_empty());
        assert_eq!(table.card_rewards(0).get(GemColor::Red), 1);
    }
}
