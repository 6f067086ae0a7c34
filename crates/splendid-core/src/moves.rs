//! Move catalog and incremental move validation.
//!
//! The catalog enumerates every structurally legal full move for a player.
//! The validator takes that catalog plus the pieces already picked into the
//! holding area and works out which pieces may be picked next.
//!
//! Both are computed against *settled* areas: a held piece counts as still
//! sitting where it came from, so the catalog stays fixed while a move is
//! being built.

use crate::actions::{Move, MoveType};
use crate::board::{Area, Component, ComponentId, ComponentKind, Filter, GemColor, PlayerId, Table};
use crate::config::GameConfig;
use crate::player::ColorCount;
use std::collections::BTreeSet;

/// Every structurally legal full move for `player`
pub fn valid_moves(table: &Table, player: PlayerId, config: &GameConfig) -> Vec<Move> {
    let mut result = Vec::new();

    // 3 different tokens, or every stocked color when fewer than 3 are left
    let top_tokens = table.top_supply_tokens();
    if top_tokens.len() >= 3 {
        result.extend(
            combinations(&top_tokens, 3)
                .into_iter()
                .map(|pieces| Move::new(pieces, MoveType::TakeDifferentTokens)),
        );
    } else if !top_tokens.is_empty() {
        result.push(Move::new(top_tokens, MoveType::TakeDifferentTokens));
    }

    // 2 of the same color, if that leaves some behind
    let supply = table.supply_counts();
    for color in GemColor::RESOURCES {
        if supply.get(color) >= config.same_color_minimum {
            let pair: Vec<ComponentId> = table.supply_tokens(color).into_iter().take(2).collect();
            if pair.len() == 2 {
                result.push(Move::new(pair, MoveType::TakeSameTokens));
            }
        }
    }

    // Buy a face-up or reserved card
    let open_cards = table.open_cards();
    let reserved = table.reserved_cards(player);
    for &card_id in open_cards.iter().chain(reserved.iter()) {
        if let Some(card) = table.get(card_id).and_then(Component::as_card) {
            if can_afford(table, player, &card.cost) {
                result.push(Move::new(vec![card_id], MoveType::BuyCard));
            }
        }
    }

    // Reserve a face-up card, with a gold token when one is left
    if reserved.len() < config.max_reserved {
        let gold = table.supply_tokens(GemColor::Gold).first().copied();
        for &card_id in &open_cards {
            let mv = match gold {
                Some(gold) => Move::new(vec![card_id, gold], MoveType::ReserveCard)
                    .with_required(vec![gold]),
                None => Move::new(vec![card_id], MoveType::ReserveCard),
            };
            result.push(mv);
        }
    }

    result
}

/// Tokens and card rewards a player owns, per color
pub fn player_holdings(table: &Table, player: PlayerId) -> ColorCount {
    table.count_by_color(
        Filter::new()
            .area(Area::InPlayerArea)
            .owner(player),
    )
}

/// Whether a player's rewards and tokens cover a cost, gold filling any gap
pub fn can_afford(table: &Table, player: PlayerId, cost: &ColorCount) -> bool {
    player_holdings(table, player).covers_cost_with_wildcard(cost)
}

/// Tokens a player would spend on a cost, or `None` if they cannot afford it.
///
/// Per color the requirement is reduced by owned card rewards, then paid from
/// tokens of that color; any remainder is paid in gold.
pub fn payment_plan(table: &Table, player: PlayerId, cost: &ColorCount) -> Option<Vec<ComponentId>> {
    let rewards = table.card_rewards(player);
    let owned = |color: GemColor| {
        table.ids(
            Filter::new()
                .area(Area::InPlayerArea)
                .owner(player)
                .kind(ComponentKind::Token)
                .color(color),
        )
    };

    let mut spent = Vec::new();
    let mut gold_needed = 0;
    for color in GemColor::RESOURCES {
        let needed = cost.get(color).saturating_sub(rewards.get(color)) as usize;
        let tokens = owned(color);
        let paid = needed.min(tokens.len());
        spent.extend_from_slice(&tokens[..paid]);
        gold_needed += needed - paid;
    }

    let gold = owned(GemColor::Gold);
    if gold_needed > gold.len() {
        return None;
    }
    spent.extend_from_slice(&gold[..gold_needed]);
    Some(spent)
}

/// Two pieces are interchangeable: the same component, or tokens of one color
pub fn pieces_match(table: &Table, a: ComponentId, b: ComponentId) -> bool {
    if a == b {
        return true;
    }
    match (table.get(a), table.get(b)) {
        (Some(Component::Token(x)), Some(Component::Token(y))) => x.color == y.color,
        _ => false,
    }
}

/// Remove the first item equivalent to `target`. Returns whether one was found.
pub fn remove_first_match<T, F>(items: &mut Vec<T>, target: &T, equivalent: F) -> bool
where
    F: Fn(&T, &T) -> bool,
{
    match items.iter().position(|item| equivalent(target, item)) {
        Some(i) => {
            items.remove(i);
            true
        }
        None => false,
    }
}

/// Pieces of `mv` left once every held piece has consumed a match.
/// `None` if some held piece has no match, ruling the move out.
pub fn unmatched_pieces(table: &Table, mv: &Move, held: &[ComponentId]) -> Option<Vec<ComponentId>> {
    let mut remaining = mv.pieces.clone();
    for taken in held {
        if !remove_first_match(&mut remaining, taken, |a, b| pieces_match(table, *a, *b)) {
            return None;
        }
    }
    Some(remaining)
}

/// Union of the pieces that may be picked next, over every move the held
/// pieces are still consistent with
pub fn valid_pieces(table: &Table, moves: &[Move], held: &[ComponentId]) -> BTreeSet<ComponentId> {
    let is_in = |piece: ComponentId, pieces: &[ComponentId]| {
        pieces.iter().any(|&p| pieces_match(table, p, piece))
    };

    let mut result = BTreeSet::new();
    for mv in moves {
        let Some(remaining) = unmatched_pieces(table, mv, held) else {
            continue;
        };
        let required_held = mv.required.iter().all(|&r| is_in(r, held));
        for piece in remaining {
            if required_held || is_in(piece, &mv.required) {
                result.insert(piece);
            }
        }
    }
    result
}

/// Offered pieces, plus any token of a color already on offer
pub fn is_valid_action(table: &Table, offered: &BTreeSet<ComponentId>, component: ComponentId) -> bool {
    if offered.contains(&component) {
        return true;
    }

    // The offered instance may be one already held; any token of its color will do
    let Some(Component::Token(token)) = table.get(component) else {
        return false;
    };
    offered.iter().any(|&id| {
        table
            .get(id)
            .and_then(Component::as_token)
            .is_some_and(|t| t.color == token.color)
    })
}

/// Catalog moves the held pieces match exactly
pub fn completed_moves(table: &Table, moves: &[Move], held: &[ComponentId]) -> Vec<Move> {
    if held.is_empty() {
        return Vec::new();
    }
    moves
        .iter()
        .filter(|mv| unmatched_pieces(table, mv, held).is_some_and(|rest| rest.is_empty()))
        .cloned()
        .collect()
}

/// All `k`-element combinations, preserving input order
fn combinations<T: Copy>(items: &[T], k: usize) -> Vec<Vec<T>> {
    if k == 0 {
        return vec![Vec::new()];
    }
    let mut result = Vec::new();
    for (i, &first) in items.iter().enumerate() {
        for mut rest in combinations(&items[i + 1..], k - 1) {
            rest.insert(0, first);
            result.push(rest);
        }
    }
    result
}
