//! Runner configuration, read from environment variables.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a number, got {value:?}")]
    NotANumber { var: &'static str, value: String },

    #[error("SPLENDID_PLAYERS must be 2-4, got {0}")]
    PlayerCount(usize),

    #[error("SPLENDID_MAX_TURNS must be at least 1")]
    NoTurns,
}

/// Settings for one simulated match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimConfig {
    pub players: usize,
    /// Seed for dealing and for the bots; random when unset
    pub seed: Option<u64>,
    /// Turns after which the match is abandoned
    pub max_turns: u32,
    /// JSON catalog to deal from instead of the standard set
    pub catalog: Option<PathBuf>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            players: 4,
            seed: None,
            max_turns: 400,
            catalog: None,
        }
    }
}

impl SimConfig {
    /// Read `SPLENDID_PLAYERS`, `SPLENDID_SEED`, `SPLENDID_MAX_TURNS` and
    /// `SPLENDID_CATALOG`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let defaults = Self::default();

        let players = parse_var(&lookup, "SPLENDID_PLAYERS")?.unwrap_or(defaults.players);
        if !(2..=4).contains(&players) {
            return Err(ConfigError::PlayerCount(players));
        }

        let max_turns = parse_var(&lookup, "SPLENDID_MAX_TURNS")?.unwrap_or(defaults.max_turns);
        if max_turns == 0 {
            return Err(ConfigError::NoTurns);
        }

        Ok(Self {
            players,
            seed: parse_var(&lookup, "SPLENDID_SEED")?,
            max_turns,
            catalog: lookup("SPLENDID_CATALOG")
                .filter(|path| !path.is_empty())
                .map(PathBuf::from),
        })
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&'static str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::NotANumber { var, value }),
    }
}
