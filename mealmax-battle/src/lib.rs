//! MEALMAX Battle - Two-meal contest engine
//!
//! This crate resolves meal battles:
//! - Scoring meals from price, cuisine and difficulty
//! - Drawing one random fraction per battle from a pluggable source
//! - Committing win/loss records and retiring the loser
//!
//! ## Architecture
//!
//! - `battle`: the engine and its ring of combatants
//! - `score`: pure scoring
//! - `random`: random source contract and local sources
//! - `config`: timeouts and constants

mod battle;
mod config;
mod random;
mod score;

pub use battle::{BattleModel, BattleOutcome};
pub use config::{BattleConfig, COMBATANT_CAPACITY, DEFAULT_RANDOM_TIMEOUT_MS, SCORE_NORMALIZATION};
pub use random::{check_fraction, parse_random_fraction, RandomSource, ScriptedRandom, SeededRandom};
pub use score::{battle_score, score_delta};
