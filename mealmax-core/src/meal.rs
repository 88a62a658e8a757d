//! Meal definitions

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Meal identifier assigned by the record store
pub type MealId = u64;

/// How hard a meal is to prepare.
///
/// Harder meals carry the smaller battle penalty: High = 1, Med = 2, Low = 3.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    #[serde(rename = "HIGH")]
    High,
    #[serde(rename = "MED")]
    Med,
    #[serde(rename = "LOW")]
    Low,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::High, Difficulty::Med, Difficulty::Low];

    /// Penalty subtracted from the battle score
    pub fn penalty(self) -> f64 {
        match self {
            Difficulty::High => 1.0,
            Difficulty::Med => 2.0,
            Difficulty::Low => 3.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::High => "HIGH",
            Difficulty::Med => "MED",
            Difficulty::Low => "LOW",
        }
    }
}

impl FromStr for Difficulty {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "HIGH" => Ok(Difficulty::High),
            "MED" => Ok(Difficulty::Med),
            "LOW" => Ok(Difficulty::Low),
            other => Err(Error::validation(format!(
                "invalid difficulty level: {}. Must be 'LOW', 'MED', or 'HIGH'",
                other
            ))),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A meal that can be sent into battle.
///
/// Construction validates price and difficulty, so a `Meal` value always
/// satisfies its invariants. Win/loss counters live in the record store,
/// not here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MealRecord", into = "MealRecord")]
pub struct Meal {
    id: MealId,
    name: String,
    cuisine: String,
    price: f64,
    difficulty: Difficulty,
}

/// Wire shape of a meal, checked before it becomes a [`Meal`]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MealRecord {
    pub id: MealId,
    pub meal: String,
    pub cuisine: String,
    pub price: f64,
    pub difficulty: Difficulty,
}

impl Meal {
    pub fn new(
        id: MealId,
        name: impl Into<String>,
        cuisine: impl Into<String>,
        price: f64,
        difficulty: Difficulty,
    ) -> Result<Self> {
        let meal = Self {
            id,
            name: name.into(),
            cuisine: cuisine.into(),
            price,
            difficulty,
        };
        meal.validate()?;
        Ok(meal)
    }

    /// Re-check the invariants established at construction
    pub fn validate(&self) -> Result<()> {
        validate_price(self.price)
    }

    pub fn id(&self) -> MealId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cuisine(&self) -> &str {
        &self.cuisine
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }
}

/// Price must be a finite, strictly positive number
pub(crate) fn validate_price(price: f64) -> Result<()> {
    if !price.is_finite() || price <= 0.0 {
        return Err(Error::validation(format!(
            "invalid price: {}. Price must be a positive number",
            price
        )));
    }
    Ok(())
}

impl TryFrom<MealRecord> for Meal {
    type Error = Error;

    fn try_from(record: MealRecord) -> Result<Self> {
        Meal::new(
            record.id,
            record.meal,
            record.cuisine,
            record.price,
            record.difficulty,
        )
    }
}

impl From<Meal> for MealRecord {
    fn from(meal: Meal) -> Self {
        Self {
            id: meal.id,
            meal: meal.name,
            cuisine: meal.cuisine,
            price: meal.price,
            difficulty: meal.difficulty,
        }
    }
}
