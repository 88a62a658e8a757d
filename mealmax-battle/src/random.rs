//! Random source abstraction
//!
//! A battle consumes exactly one fraction in `[0, 1)`. Where it comes from
//! (a remote service, a seeded generator, a test script) is up to the
//! caller, so the engine only sees [`RandomSource`].

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use mealmax_core::RandomSourceError;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Provider of one random fraction per call
#[async_trait]
pub trait RandomSource: Send + Sync {
    /// Return a value in `[0, 1)`
    async fn next_fraction(&self) -> Result<f64, RandomSourceError>;
}

#[async_trait]
impl<T: RandomSource + ?Sized> RandomSource for Arc<T> {
    async fn next_fraction(&self) -> Result<f64, RandomSourceError> {
        (**self).next_fraction().await
    }
}

/// Accept a value only if it is a finite fraction in `[0, 1)`
pub fn check_fraction(value: f64) -> Result<f64, RandomSourceError> {
    if value.is_finite() && (0.0..1.0).contains(&value) {
        Ok(value)
    } else {
        Err(RandomSourceError::Malformed(format!(
            "{} is outside [0, 1)",
            value
        )))
    }
}

/// Parse a plain-text provider response such as `"0.45\n"`
pub fn parse_random_fraction(body: &str) -> Result<f64, RandomSourceError> {
    let trimmed = body.trim();
    let value: f64 = trimmed
        .parse()
        .map_err(|_| RandomSourceError::Malformed(trimmed.to_string()))?;
    check_fraction(value)
}

/// Deterministic source backed by a seeded ChaCha8 generator
pub struct SeededRandom {
    rng: Mutex<ChaCha8Rng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }
}

#[async_trait]
impl RandomSource for SeededRandom {
    async fn next_fraction(&self) -> Result<f64, RandomSourceError> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| RandomSourceError::Transport("seeded generator lock poisoned".to_string()))?;
        Ok(rng.gen::<f64>())
    }
}

/// Source that replays a fixed script of values and failures.
///
/// Once the script runs out every call fails with a transport error.
#[derive(Default)]
pub struct ScriptedRandom {
    script: Mutex<VecDeque<Result<f64, RandomSourceError>>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedRandom {
    pub fn new<I>(script: I) -> Self
    where
        I: IntoIterator<Item = Result<f64, RandomSourceError>>,
    {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Script of successful draws only
    pub fn values<I: IntoIterator<Item = f64>>(values: I) -> Self {
        Self::new(values.into_iter().map(Ok))
    }

    /// Sleep this long before answering each call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of times `next_fraction` has been called
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn pop(&self) -> Result<f64, RandomSourceError> {
        let mut script = self
            .script
            .lock()
            .map_err(|_| RandomSourceError::Transport("script lock poisoned".to_string()))?;
        script
            .pop_front()
            .unwrap_or_else(|| Err(RandomSourceError::Transport("random script exhausted".to_string())))
    }
}

#[async_trait]
impl RandomSource for ScriptedRandom {
    async fn next_fraction(&self) -> Result<f64, RandomSourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.pop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_random_fraction() {
        assert_eq!(parse_random_fraction("0.45").unwrap(), 0.45);
        assert_eq!(parse_random_fraction("0.07\n").unwrap(), 0.07);
        assert_eq!(parse_random_fraction("0").unwrap(), 0.0);
    }

    #[test]
    fn test_parse_random_fraction_invalid() {
        assert_eq!(
            parse_random_fraction("invalid_response"),
            Err(RandomSourceError::Malformed("invalid_response".to_string()))
        );
        assert!(matches!(
            parse_random_fraction("1.0"),
            Err(RandomSourceError::Malformed(_))
        ));
        assert!(matches!(
            parse_random_fraction("-0.2"),
            Err(RandomSourceError::Malformed(_))
        ));
        assert!(matches!(
            parse_random_fraction("NaN"),
            Err(RandomSourceError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn test_seeded_random_is_reproducible() {
        let a = SeededRandom::new(7);
        let b = SeededRandom::new(7);
        for _ in 0..5 {
            let x = a.next_fraction().await.unwrap();
            assert_eq!(x, b.next_fraction().await.unwrap());
            assert!((0.0..1.0).contains(&x));
        }
    }

    #[tokio::test]
    async fn test_scripted_random_replays_then_fails() {
        let source = ScriptedRandom::new(vec![
            Ok(0.25),
            Err(RandomSourceError::Transport("connection reset".to_string())),
        ]);
        assert_eq!(source.next_fraction().await.unwrap(), 0.25);
        assert!(matches!(
            source.next_fraction().await,
            Err(RandomSourceError::Transport(_))
        ));
        assert!(source.next_fraction().await.is_err());
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test]
    async fn test_arc_source_delegates() {
        let source = Arc::new(ScriptedRandom::values([0.5]));
        let shared: Arc<ScriptedRandom> = Arc::clone(&source);
        assert_eq!(shared.next_fraction().await.unwrap(), 0.5);
        assert_eq!(source.calls(), 1);
    }
}
