//! Math and timing helpers

use std::time::Duration;

use rand::Rng;
use tracing::info;

use crate::error::{Result, UtilsError};

pub use contracts::{Location, Vector2D, Vector3D};

/// Default pause bounds (seconds)
pub const DEFAULT_SLEEP_RANGE: (f64, f64) = (2.0, 6.0);

/// `Duration` from float seconds, rejecting negative, NaN, infinite and
/// out-of-range values
pub fn duration_from_secs(what: &str, seconds: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(seconds).map_err(|_| UtilsError::invalid_duration(what, seconds))
}

/// Uniform random duration in `[start, end]` seconds
///
/// Reversed bounds are swapped and negative bounds clamp to zero.
///
/// # Errors
/// Either bound is NaN or infinite, or the upper bound does not fit a `Duration`.
pub fn random_sleep_duration<R: Rng + ?Sized>(
    rng: &mut R,
    start: f64,
    end: f64,
) -> Result<Duration> {
    for bound in [start, end] {
        if !bound.is_finite() {
            return Err(UtilsError::invalid_duration("sleep bound", bound));
        }
    }
    let (low, high) = if start <= end { (start, end) } else { (end, start) };
    let (low, high) = (low.max(0.0), high.max(0.0));
    duration_from_secs("sleep bound", high)?;

    let secs = if low == high {
        low
    } else {
        rng.random_range(low..=high)
    };
    duration_from_secs("sleep", secs)
}

/// Sleep for a random time in `[start, end]` seconds
pub async fn sleep_random_time(start: f64, end: f64) -> Result<Duration> {
    let duration = random_sleep_duration(&mut rand::rng(), start, end)?;
    info!(seconds = duration.as_secs_f64(), "sleeping");
    tokio::time::sleep(duration).await;
    Ok(duration)
}
