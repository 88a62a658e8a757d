//! MEALMAX Core - Meals and their records
//!
//! This crate provides the data side of meal battles:
//! - Meal definitions with validated price and difficulty
//! - The shared error taxonomy
//! - The record store contract and an in-memory kitchen
//! - Leaderboard ordering

pub mod error;
pub mod leaderboard;
pub mod meal;
pub mod store;

// Re-exports for convenient access
pub use error::{Error, ErrorKind, RandomSourceError, Result};
pub use leaderboard::{LeaderboardEntry, LeaderboardSort};
pub use meal::{Difficulty, Meal, MealId, MealRecord};
pub use store::{Kitchen, MealStats, Outcome, RecordStore};
