//! # Core Logic - Randomized Delays
//!
//! Jittered pauses between on-chain actions and wallets, and the random
//! withdrawal amount helper. Durations are whole seconds so that the spread
//! of activity across wallets is easy to read in the logs.

use crate::traits::Delayer;
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use tracing::debug;

/// Production [`Delayer`] backed by the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomDelay;

impl RandomDelay {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Delayer for RandomDelay {
    async fn wait(&self, min_secs: u64, max_secs: u64) {
        let delay = random_duration(&mut rand::thread_rng(), min_secs, max_secs);
        debug!("Sleeping {}s (bounds {}-{}s)", delay.as_secs(), min_secs, max_secs);
        tokio::time::sleep(delay).await;
    }
}

/// Picks a whole number of seconds in `[min_secs, max_secs]`.
///
/// Bounds given in the wrong order are swapped rather than rejected.
pub fn random_duration<R: Rng + ?Sized>(rng: &mut R, min_secs: u64, max_secs: u64) -> Duration {
    let (low, high) = if min_secs <= max_secs {
        (min_secs, max_secs)
    } else {
        (max_secs, min_secs)
    };
    let secs = rng.gen_range(low..=high);
    Duration::from_millis(secs * 1000)
}

/// Random amount in `[low, high]` rounded to 4 decimal places.
pub fn random_amount(low: f64, high: f64) -> f64 {
    random_amount_with(&mut rand::thread_rng(), low, high)
}

pub fn random_amount_with<R: Rng + ?Sized>(rng: &mut R, low: f64, high: f64) -> f64 {
    let (low, high) = if low <= high { (low, high) } else { (high, low) };
    if low == high {
        return round4(low);
    }
    let raw = rng.gen_range(low..=high);
    // Rounding can step past a bound that has more than 4 decimals.
    round4(raw).clamp(low, high)
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
