//! Leaderboard ordering

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::meal::{Difficulty, Meal, MealId};

/// Leaderboard sort key
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaderboardSort {
    #[default]
    Wins,
    WinPct,
}

impl FromStr for LeaderboardSort {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "wins" => Ok(LeaderboardSort::Wins),
            "win_pct" => Ok(LeaderboardSort::WinPct),
            other => Err(Error::validation(format!(
                "invalid sort_by parameter: {}",
                other
            ))),
        }
    }
}

/// One leaderboard row
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub id: MealId,
    pub meal: String,
    pub cuisine: String,
    pub price: f64,
    pub difficulty: Difficulty,
    pub battles: u32,
    pub wins: u32,
    /// Wins per battle, rounded to one decimal place
    pub win_pct: f64,
}

impl LeaderboardEntry {
    /// Build a row; returns `None` for meals that have never battled
    pub fn from_meal(meal: &Meal, battles: u32, wins: u32) -> Option<Self> {
        if battles == 0 {
            return None;
        }
        Some(Self {
            id: meal.id(),
            meal: meal.name().to_string(),
            cuisine: meal.cuisine().to_string(),
            price: meal.price(),
            difficulty: meal.difficulty(),
            battles,
            wins,
            win_pct: round_one_decimal(raw_win_pct(wins, battles)),
        })
    }
}

fn raw_win_pct(wins: u32, battles: u32) -> f64 {
    wins as f64 / battles as f64
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Order rows best-first. Ties fall back to ascending id so output is stable.
pub fn rank(mut rows: Vec<LeaderboardEntry>, sort: LeaderboardSort) -> Vec<LeaderboardEntry> {
    rows.sort_by(|a, b| {
        let primary = match sort {
            LeaderboardSort::Wins => b.wins.cmp(&a.wins),
            LeaderboardSort::WinPct => raw_win_pct(b.wins, b.battles)
                .partial_cmp(&raw_win_pct(a.wins, a.battles))
                .unwrap_or(Ordering::Equal),
        };
        primary.then(a.id.cmp(&b.id))
    });
    rows
}
