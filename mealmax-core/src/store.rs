//! Record store contract and the in-memory kitchen
//!
//! The battle engine only ever talks to [`RecordStore`]. [`Kitchen`] is the
//! reference implementation: meals live in memory, deletion is a soft flag,
//! and battle results are committed under a single write lock.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::leaderboard::{rank, LeaderboardEntry, LeaderboardSort};
use crate::meal::{validate_price, Difficulty, Meal, MealId};

/// Result of one battle from a single meal's point of view
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
}

impl FromStr for Outcome {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "win" => Ok(Outcome::Win),
            "loss" => Ok(Outcome::Loss),
            other => Err(Error::validation(format!(
                "invalid result: {}. Expected 'win' or 'loss'",
                other
            ))),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Win => f.write_str("win"),
            Outcome::Loss => f.write_str("loss"),
        }
    }
}

/// Battle counters for one meal
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealStats {
    pub battles: u32,
    pub wins: u32,
}

impl MealStats {
    fn apply(&mut self, outcome: Outcome) {
        self.battles += 1;
        if outcome == Outcome::Win {
            self.wins += 1;
        }
    }
}

/// Storage the battle engine reads meals from and writes results to
pub trait RecordStore: Send + Sync {
    /// Look up a live meal by id
    fn find_by_id(&self, id: MealId) -> Result<Meal>;

    /// Look up a live meal by name
    fn find_by_name(&self, name: &str) -> Result<Meal>;

    /// Count one battle for a meal, and one win if it won
    fn update_stats(&self, id: MealId, outcome: Outcome) -> Result<()>;

    /// Commit a battle result for both meals.
    ///
    /// Implementations must apply both updates or neither.
    fn record_battle(&self, winner: MealId, loser: MealId) -> Result<()>;
}

impl<T: RecordStore + ?Sized> RecordStore for Arc<T> {
    fn find_by_id(&self, id: MealId) -> Result<Meal> {
        (**self).find_by_id(id)
    }

    fn find_by_name(&self, name: &str) -> Result<Meal> {
        (**self).find_by_name(name)
    }

    fn update_stats(&self, id: MealId, outcome: Outcome) -> Result<()> {
        (**self).update_stats(id, outcome)
    }

    fn record_battle(&self, winner: MealId, loser: MealId) -> Result<()> {
        (**self).record_battle(winner, loser)
    }
}

#[derive(Debug)]
struct MealRow {
    meal: Meal,
    stats: MealStats,
    deleted: bool,
}

#[derive(Debug)]
struct Table {
    rows: BTreeMap<MealId, MealRow>,
    next_id: MealId,
}

impl Table {
    fn live(&self, id: MealId) -> Result<&MealRow> {
        match self.rows.get(&id) {
            Some(row) if row.deleted => {
                tracing::info!("Meal with ID {} has been deleted", id);
                Err(Error::Deleted(format!("Meal with ID {}", id)))
            }
            Some(row) => Ok(row),
            None => {
                tracing::info!("Meal with ID {} not found", id);
                Err(Error::NotFound(format!("Meal with ID {}", id)))
            }
        }
    }

    fn live_mut(&mut self, id: MealId) -> Result<&mut MealRow> {
        self.live(id)?;
        self.rows
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("Meal with ID {}", id)))
    }
}

/// Menu file entry used by [`Kitchen::load_json`]
#[derive(Debug, Deserialize)]
struct MenuItem {
    meal: String,
    cuisine: String,
    price: f64,
    difficulty: Difficulty,
}

/// In-memory record store with soft deletion
#[derive(Debug)]
pub struct Kitchen {
    table: RwLock<Table>,
}

impl Kitchen {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(Table {
                rows: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Load a menu from a JSON array of `{meal, cuisine, price, difficulty}`
    pub fn load_json(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read menu file {}", path.display()))?;
        Self::from_json_str(&content)
            .with_context(|| format!("Failed to load menu from {}", path.display()))
    }

    /// Load a menu from JSON text
    pub fn from_json_str(content: &str) -> anyhow::Result<Self> {
        let items: Vec<MenuItem> = serde_json::from_str(content)?;
        let kitchen = Self::new();
        for item in items {
            kitchen.create_meal(&item.meal, &item.cuisine, item.price, item.difficulty)?;
        }
        Ok(kitchen)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Table>> {
        self.table
            .read()
            .map_err(|_| Error::Persistence("kitchen table lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Table>> {
        self.table
            .write()
            .map_err(|_| Error::Persistence("kitchen table lock poisoned".to_string()))
    }

    /// Add a meal and return it with its assigned id
    pub fn create_meal(
        &self,
        name: &str,
        cuisine: &str,
        price: f64,
        difficulty: Difficulty,
    ) -> Result<Meal> {
        validate_price(price)?;

        let mut table = self.write()?;
        let duplicate = table
            .rows
            .values()
            .any(|row| !row.deleted && row.meal.name() == name);
        if duplicate {
            tracing::error!("Duplicate meal name: {}", name);
            return Err(Error::validation(format!(
                "Meal with name '{}' already exists",
                name
            )));
        }

        let id = table.next_id;
        let meal = Meal::new(id, name, cuisine, price, difficulty)?;
        table.rows.insert(
            id,
            MealRow {
                meal: meal.clone(),
                stats: MealStats::default(),
                deleted: false,
            },
        );
        table.next_id += 1;

        tracing::info!("Meal successfully added: {} (id {})", name, id);
        Ok(meal)
    }

    /// Soft-delete a meal
    pub fn delete_meal(&self, id: MealId) -> Result<()> {
        let mut table = self.write()?;
        table.live_mut(id)?.deleted = true;
        tracing::info!("Meal with ID {} marked as deleted", id);
        Ok(())
    }

    /// Drop every meal, deleted or not
    pub fn clear_meals(&self) -> Result<()> {
        let mut table = self.write()?;
        table.rows.clear();
        tracing::info!("Meals cleared from kitchen");
        Ok(())
    }

    /// Counters for a live meal
    pub fn stats(&self, id: MealId) -> Result<MealStats> {
        Ok(self.read()?.live(id)?.stats)
    }

    /// Live meals that have battled at least once, best first
    pub fn leaderboard(&self, sort: LeaderboardSort) -> Result<Vec<LeaderboardEntry>> {
        let table = self.read()?;
        let rows = table
            .rows
            .values()
            .filter(|row| !row.deleted)
            .filter_map(|row| LeaderboardEntry::from_meal(&row.meal, row.stats.battles, row.stats.wins))
            .collect();
        tracing::info!("Leaderboard retrieved ({:?})", sort);
        Ok(rank(rows, sort))
    }

    /// Number of live meals
    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.rows.values().filter(|row| !row.deleted).count())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl Default for Kitchen {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for Kitchen {
    fn find_by_id(&self, id: MealId) -> Result<Meal> {
        Ok(self.read()?.live(id)?.meal.clone())
    }

    fn find_by_name(&self, name: &str) -> Result<Meal> {
        let table = self.read()?;
        let mut seen_deleted = false;
        for row in table.rows.values().filter(|row| row.meal.name() == name) {
            if !row.deleted {
                return Ok(row.meal.clone());
            }
            seen_deleted = true;
        }

        if seen_deleted {
            tracing::info!("Meal with name {} has been deleted", name);
            Err(Error::Deleted(format!("Meal with name {}", name)))
        } else {
            tracing::info!("Meal with name {} not found", name);
            Err(Error::NotFound(format!("Meal with name {}", name)))
        }
    }

    fn update_stats(&self, id: MealId, outcome: Outcome) -> Result<()> {
        let mut table = self.write()?;
        table.live_mut(id)?.stats.apply(outcome);
        tracing::info!("Meal stats updated for meal ID {}: {}", id, outcome);
        Ok(())
    }

    fn record_battle(&self, winner: MealId, loser: MealId) -> Result<()> {
        if winner == loser {
            return Err(Error::validation(format!(
                "meal {} cannot battle itself",
                winner
            )));
        }

        let mut table = self.write()?;
        // Both rows are checked before either is touched
        table.live(winner)?;
        table.live(loser)?;
        table.live_mut(winner)?.stats.apply(Outcome::Win);
        table.live_mut(loser)?.stats.apply(Outcome::Loss);

        tracing::info!("Battle recorded: winner {} / loser {}", winner, loser);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn stocked() -> Kitchen {
        let kitchen = Kitchen::new();
        kitchen.create_meal("Kung Pao", "Chinese", 100.0, Difficulty::High).unwrap();
        kitchen.create_meal("Burger", "American", 50.0, Difficulty::Med).unwrap();
        kitchen.create_meal("Tacos", "Mexican", 8.0, Difficulty::Low).unwrap();
        kitchen
    }

    #[test]
    fn test_create_meal_assigns_ids() {
        let kitchen = stocked();
        assert_eq!(kitchen.find_by_name("Kung Pao").unwrap().id(), 1);
        assert_eq!(kitchen.find_by_name("Tacos").unwrap().id(), 3);
        assert_eq!(kitchen.len().unwrap(), 3);
    }

    #[test]
    fn test_create_meal_duplicate() {
        let kitchen = stocked();
        let err = kitchen.create_meal("Burger", "American", 9.0, Difficulty::Low).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_create_meal_invalid_price() {
        let kitchen = Kitchen::new();
        assert!(kitchen.create_meal("Free Lunch", "American", 0.0, Difficulty::Low).is_err());
        assert!(kitchen.create_meal("Refund", "American", -3.0, Difficulty::Low).is_err());
        assert!(kitchen.is_empty().unwrap());
    }

    #[test]
    fn test_delete_meal() {
        let kitchen = stocked();
        kitchen.delete_meal(2).unwrap();

        assert!(matches!(kitchen.find_by_id(2), Err(Error::Deleted(_))));
        assert!(matches!(kitchen.find_by_name("Burger"), Err(Error::Deleted(_))));
        assert!(matches!(kitchen.delete_meal(2), Err(Error::Deleted(_))));
        assert!(matches!(kitchen.delete_meal(42), Err(Error::NotFound(_))));
        assert_eq!(kitchen.len().unwrap(), 2);
    }

    #[test]
    fn test_deleted_name_can_be_reused() {
        let kitchen = stocked();
        kitchen.delete_meal(3).unwrap();
        let tacos = kitchen.create_meal("Tacos", "Mexican", 9.5, Difficulty::Med).unwrap();
        assert_eq!(tacos.id(), 4);
        assert_eq!(kitchen.find_by_name("Tacos").unwrap().id(), 4);
    }

    #[test]
    fn test_find_missing() {
        let kitchen = stocked();
        assert!(matches!(kitchen.find_by_id(99), Err(Error::NotFound(_))));
        assert!(matches!(kitchen.find_by_name("Sushi"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_update_stats() {
        let kitchen = stocked();
        kitchen.update_stats(1, Outcome::Win).unwrap();
        kitchen.update_stats(1, Outcome::Loss).unwrap();
        assert_eq!(kitchen.stats(1).unwrap(), MealStats { battles: 2, wins: 1 });
    }

    #[test]
    fn test_update_stats_deleted_meal() {
        let kitchen = stocked();
        kitchen.delete_meal(1).unwrap();
        assert!(matches!(kitchen.update_stats(1, Outcome::Win), Err(Error::Deleted(_))));
    }

    #[test]
    fn test_update_stats_unknown_meal() {
        let kitchen = stocked();
        assert!(matches!(kitchen.update_stats(99, Outcome::Win), Err(Error::NotFound(_))));
        assert!(matches!(kitchen.update_stats(99, Outcome::Loss), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_outcome_tokens() {
        assert_eq!("win".parse::<Outcome>().unwrap(), Outcome::Win);
        assert_eq!("loss".parse::<Outcome>().unwrap(), Outcome::Loss);
        let err = "draw".parse::<Outcome>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_record_battle() {
        let kitchen = stocked();
        kitchen.record_battle(1, 2).unwrap();
        assert_eq!(kitchen.stats(1).unwrap(), MealStats { battles: 1, wins: 1 });
        assert_eq!(kitchen.stats(2).unwrap(), MealStats { battles: 1, wins: 0 });
    }

    #[test]
    fn test_record_battle_is_all_or_nothing() {
        let kitchen = stocked();
        kitchen.delete_meal(2).unwrap();

        assert!(kitchen.record_battle(1, 2).is_err());
        assert_eq!(kitchen.stats(1).unwrap(), MealStats::default());

        assert!(kitchen.record_battle(1, 1).is_err());
        assert_eq!(kitchen.stats(1).unwrap(), MealStats::default());
    }

    #[test]
    fn test_leaderboard_skips_deleted_and_unbattled() {
        let kitchen = stocked();
        kitchen.record_battle(1, 2).unwrap();
        kitchen.record_battle(1, 2).unwrap();
        kitchen.record_battle(2, 1).unwrap();
        kitchen.create_meal("Salad", "Greek", 6.0, Difficulty::Low).unwrap();

        let board = kitchen.leaderboard(LeaderboardSort::Wins).unwrap();
        let names: Vec<_> = board.iter().map(|e| e.meal.as_str()).collect();
        assert_eq!(names, vec!["Kung Pao", "Burger"]);
        assert_eq!(board[0].wins, 2);
        assert_eq!(board[0].battles, 3);
        assert_eq!(board[0].win_pct, 0.7);

        kitchen.delete_meal(1).unwrap();
        let board = kitchen.leaderboard(LeaderboardSort::WinPct).unwrap();
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].meal, "Burger");
    }

    #[test]
    fn test_clear_meals() {
        let kitchen = stocked();
        kitchen.clear_meals().unwrap();
        assert!(kitchen.is_empty().unwrap());
        assert!(matches!(kitchen.find_by_id(1), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_from_json_str() {
        let menu = r#"[
            {"meal": "Paella", "cuisine": "Spanish", "price": 22.0, "difficulty": "HIGH"},
            {"meal": "Toast", "cuisine": "British", "price": 2.5, "difficulty": "LOW"}
        ]"#;
        let kitchen = Kitchen::from_json_str(menu).unwrap();
        assert_eq!(kitchen.len().unwrap(), 2);
        assert_eq!(kitchen.find_by_name("Toast").unwrap().difficulty(), Difficulty::Low);
    }

    #[test]
    fn test_from_json_str_rejects_bad_menu() {
        let bad_tier = r#"[{"meal": "Toast", "cuisine": "British", "price": 2.5, "difficulty": "EASY"}]"#;
        assert!(Kitchen::from_json_str(bad_tier).is_err());

        let dupes = r#"[
            {"meal": "Toast", "cuisine": "British", "price": 2.5, "difficulty": "LOW"},
            {"meal": "Toast", "cuisine": "French", "price": 3.5, "difficulty": "MED"}
        ]"#;
        assert!(Kitchen::from_json_str(dupes).is_err());
    }

    #[test]
    fn test_load_json_missing_file() {
        let path = std::env::temp_dir().join("mealmax-no-such-menu.json");
        let err = Kitchen::load_json(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to read menu file"));
    }

    #[test]
    fn test_load_json_roundtrip_file() {
        let path = std::env::temp_dir().join(format!("mealmax-menu-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"[{"meal": "Curry", "cuisine": "Indian", "price": 14.0, "difficulty": "MED"}]"#,
        )
        .unwrap();
        let kitchen = Kitchen::load_json(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(kitchen.find_by_id(1).unwrap().name(), "Curry");
    }
}
