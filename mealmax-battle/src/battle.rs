//! Battle engine - two meals enter, one meal leaves
//!
//! `BattleModel` owns the ring (at most two meals) behind one async mutex.
//! A battle holds that lock from scoring through the random draw, the
//! record store commit and the loser's removal, so concurrent callers never
//! see a half-resolved ring.

use mealmax_core::{Error, Meal, MealId, RandomSourceError, RecordStore, Result};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::instrument;

use crate::config::{BattleConfig, COMBATANT_CAPACITY};
use crate::random::{check_fraction, RandomSource};
use crate::score::{battle_score, score_delta};

/// Full record of one resolved battle
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BattleOutcome {
    pub winner: Meal,
    pub loser: Meal,
    /// Score of the first combatant
    pub score_1: f64,
    /// Score of the second combatant
    pub score_2: f64,
    /// Normalized score gap the draw was compared against
    pub delta: f64,
    pub random_value: f64,
    /// True when the first combatant won
    pub first_won: bool,
}

impl BattleOutcome {
    pub fn winner_name(&self) -> &str {
        self.winner.name()
    }
}

/// Contest engine holding up to two combatants
pub struct BattleModel<S, R> {
    store: S,
    random: R,
    config: BattleConfig,
    combatants: Mutex<Vec<Meal>>,
}

impl<S, R> BattleModel<S, R>
where
    S: RecordStore,
    R: RandomSource,
{
    /// Create an engine with the default configuration
    pub fn new(store: S, random: R) -> Self {
        Self::with_config(store, random, BattleConfig::default())
    }

    pub fn with_config(store: S, random: R, config: BattleConfig) -> Self {
        Self {
            store,
            random,
            config,
            combatants: Mutex::new(Vec::with_capacity(COMBATANT_CAPACITY)),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn random_source(&self) -> &R {
        &self.random
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    /// Add a meal to the ring
    #[instrument(skip_all, fields(meal = %meal.name()))]
    pub async fn prep_combatant(&self, meal: Meal) -> Result<()> {
        if let Err(err) = meal.validate() {
            tracing::error!("combatant is not a valid meal: {}", err);
            return Err(err);
        }

        let mut combatants = self.combatants.lock().await;
        if combatants.len() >= COMBATANT_CAPACITY {
            tracing::error!(
                "Attempted to add combatant '{}' but combatants list is full",
                meal.name()
            );
            return Err(Error::RegistryFull {
                capacity: COMBATANT_CAPACITY,
            });
        }
        if combatants.iter().any(|c| c.id() == meal.id()) {
            tracing::error!("Combatant '{}' is already in the ring", meal.name());
            return Err(Error::Validation(format!(
                "meal {} is already a combatant",
                meal.id()
            )));
        }

        tracing::info!("Adding combatant '{}' to combatants list", meal.name());
        combatants.push(meal);
        tracing::info!(
            "Current combatants list: {:?}",
            combatants.iter().map(Meal::name).collect::<Vec<_>>()
        );
        Ok(())
    }

    /// Look a meal up in the record store and add it to the ring
    pub async fn prep_combatant_by_name(&self, name: &str) -> Result<()> {
        let meal = self.store.find_by_name(name)?;
        self.prep_combatant(meal).await
    }

    /// Look a meal up by id and add it to the ring
    pub async fn prep_combatant_by_id(&self, id: MealId) -> Result<()> {
        let meal = self.store.find_by_id(id)?;
        self.prep_combatant(meal).await
    }

    /// Snapshot of the ring in the order meals were added
    pub async fn combatants(&self) -> Result<Vec<Meal>> {
        let combatants = self.combatants.lock().await;
        if combatants.is_empty() {
            tracing::error!("Combatants list is empty");
            return Err(Error::EmptyRegistry);
        }
        tracing::info!("Retrieving current list of combatants");
        Ok(combatants.clone())
    }

    pub fn battle_score(&self, meal: &Meal) -> Result<f64> {
        battle_score(meal)
    }

    pub async fn combatant_count(&self) -> usize {
        self.combatants.lock().await.len()
    }

    /// Empty the ring
    #[instrument(skip_all)]
    pub async fn clear_combatants(&self) {
        let mut combatants = self.combatants.lock().await;
        tracing::info!("Clearing the combatants list");
        if combatants.is_empty() {
            tracing::warn!("Clearing an empty combatants list");
        }
        combatants.clear();
    }

    /// Fight the two combatants and return the winner's name
    pub async fn battle(&self) -> Result<String> {
        let outcome = self.battle_detailed().await?;
        Ok(outcome.winner.name().to_string())
    }

    /// Fight the two combatants and return the full outcome.
    ///
    /// Nothing changes unless the random draw and the record store commit
    /// both succeed; only then is the loser removed from the ring.
    #[instrument(skip_all)]
    pub async fn battle_detailed(&self) -> Result<BattleOutcome> {
        let mut combatants = self.combatants.lock().await;
        tracing::info!("Two meals enter, one meal leaves!");

        if combatants.len() < COMBATANT_CAPACITY {
            tracing::error!("Not enough combatants to start a battle");
            return Err(Error::NotEnoughCombatants {
                found: combatants.len(),
            });
        }

        let first = combatants[0].clone();
        let second = combatants[1].clone();
        tracing::info!("Battle started between {} and {}", first.name(), second.name());

        let score_1 = battle_score(&first)?;
        let score_2 = battle_score(&second)?;
        let delta = score_delta(score_1, score_2);
        tracing::info!("Delta between scores: {:.3}", delta);

        let random_value = self.draw().await?;
        tracing::info!("Random number drawn: {:.3}", random_value);

        // Exact ties go to the second combatant
        let first_won = delta > random_value;
        let (winner, loser, loser_index) = if first_won {
            (first, second, 1)
        } else {
            (second, first, 0)
        };
        tracing::info!("The winner is: {}", winner.name());

        if let Err(err) = self.store.record_battle(winner.id(), loser.id()) {
            tracing::error!("Failed to record battle result: {}", err);
            return Err(err);
        }
        combatants.remove(loser_index);

        Ok(BattleOutcome {
            winner,
            loser,
            score_1,
            score_2,
            delta,
            random_value,
            first_won,
        })
    }

    /// One draw from the random source, bounded by the configured timeout
    async fn draw(&self) -> Result<f64> {
        let timeout = self.config.random_timeout();
        let drawn = match tokio::time::timeout(timeout, self.random.next_fraction()).await {
            Ok(result) => result.and_then(check_fraction),
            Err(_) => Err(RandomSourceError::Timeout(timeout)),
        };

        drawn.map_err(|err| {
            tracing::error!("Random source unavailable: {}", err);
            Error::from(err)
        })
    }
}
