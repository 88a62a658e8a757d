//! Battle scoring

use mealmax_core::{Meal, Result};

use crate::config::SCORE_NORMALIZATION;

/// Score a meal: `price * cuisine length - difficulty penalty`.
///
/// Cuisine length counts characters, not bytes. Harder meals lose less.
pub fn battle_score(meal: &Meal) -> Result<f64> {
    meal.validate()?;

    let cuisine_len = meal.cuisine().chars().count() as f64;
    let score = meal.price() * cuisine_len - meal.difficulty().penalty();

    tracing::info!(
        "Battle score for {}: price={:.3}, cuisine={}, difficulty={} -> {:.3}",
        meal.name(),
        meal.price(),
        meal.cuisine(),
        meal.difficulty(),
        score
    );
    Ok(score)
}

/// Normalized gap between two scores
pub fn score_delta(score_1: f64, score_2: f64) -> f64 {
    (score_1 - score_2).abs() / SCORE_NORMALIZATION
}
