//! Headless matches between random bots.

use crate::config::SimConfig;
use anyhow::Context;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use splendid_core::{
    Bot, ComponentFactory, GameError, GameEvent, GameState, JsonCatalog, PlayerId,
    StandardCatalog,
};
use tracing::{debug, info, warn};

/// How a match ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outcome {
    Winner { player: PlayerId, points: u32 },
    TurnLimit,
    /// The player to move had no legal move
    Stalled { player: PlayerId },
}

/// Final standing of one seat
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Score {
    pub name: String,
    pub points: u32,
    pub cards: usize,
    pub reserved: usize,
}

/// Result of a match, printed as JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchSummary {
    pub seed: u64,
    pub turns: u32,
    pub outcome: Outcome,
    pub scores: Vec<Score>,
}

/// Deal a match from the configured catalog and play it out
pub fn run_match(config: &SimConfig) -> anyhow::Result<MatchSummary> {
    let seed = config.seed.unwrap_or_else(rand::random);
    let factory: Box<dyn ComponentFactory> = match &config.catalog {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading catalog {}", path.display()))?;
            Box::new(JsonCatalog::from_json(&json)?)
        }
        None => Box::new(StandardCatalog),
    };

    let names = (0..config.players).map(|i| format!("Bot {}", i + 1)).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut game = GameState::setup(names, factory.as_ref(), &mut rng)?;

    info!(seed, players = config.players, "Starting match");
    let outcome = play(&mut game, seed, config.max_turns)?;

    Ok(summarize(&game, seed, outcome))
}

/// Let one bot per seat take turns until the game ends or the limit is hit
pub fn play(game: &mut GameState, seed: u64, max_turns: u32) -> Result<Outcome, GameError> {
    let mut bots: Vec<Bot> = game
        .players
        .iter()
        .map(|p| Bot::with_seed(p.id, seed.wrapping_add(p.id as u64 + 1)))
        .collect();

    while game.turn_number <= max_turns {
        let player = game.current_player;
        let events = match bots[player as usize].take_turn(game) {
            Ok(events) => events,
            Err(GameError::NoLegalMoves(stuck)) => {
                warn!(player = stuck, turn = game.turn_number, "Match stalled");
                return Ok(Outcome::Stalled { player: stuck });
            }
            Err(e) => return Err(e),
        };

        for event in &events {
            debug!(?event);
            if let GameEvent::GameWon { player, points } = event {
                return Ok(Outcome::Winner {
                    player: *player,
                    points: *points,
                });
            }
        }
        info!(
            player,
            points = game.points_for_player(player),
            turn = game.turn_number,
            "Turn played"
        );
    }

    warn!(max_turns, "Turn limit reached");
    Ok(Outcome::TurnLimit)
}

fn summarize(game: &GameState, seed: u64, outcome: Outcome) -> MatchSummary {
    let scores = game
        .players
        .iter()
        .map(|p| Score {
            name: p.name.clone(),
            points: game.points_for_player(p.id),
            cards: game.cards_purchased(p.id),
            reserved: game.table.reserved_cards(p.id).len(),
        })
        .collect();

    MatchSummary {
        seed,
        turns: game.turn_number,
        outcome,
        scores,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(seed: u64) -> SimConfig {
        SimConfig {
            players: 3,
            seed: Some(seed),
            ..SimConfig::default()
        }
    }

    #[test]
    fn test_match_is_reproducible() {
        let first = run_match(&config(17)).unwrap();
        let second = run_match(&config(17)).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.scores.len(), 3);
    }

    #[test]
    fn test_winner_has_top_score() {
        let summary = run_match(&config(3)).unwrap();
        if let Outcome::Winner { player, points } = summary.outcome {
            assert!(points >= 15);
            let best = summary.scores.iter().map(|s| s.points).max().unwrap();
            assert_eq!(summary.scores[player as usize].points, best);
        }
    }

    #[test]
    fn test_turn_limit() {
        let summary = run_match(&SimConfig {
            max_turns: 2,
            ..config(5)
        })
        .unwrap();
        assert_eq!(summary.outcome, Outcome::TurnLimit);
        assert_eq!(summary.turns, 3);
    }

    #[test]
    fn test_missing_catalog_file() {
        let result = run_match(&SimConfig {
            catalog: Some("/nonexistent/catalog.json".into()),
            ..config(1)
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_summary_json() {
        let summary = MatchSummary {
            seed: 9,
            turns: 1,
            outcome: Outcome::Stalled { player: 2 },
            scores: vec![],
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["outcome"]["type"], "stalled");
        assert_eq!(json["outcome"]["player"], 2);
    }
}
