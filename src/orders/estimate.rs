use std::ops::Range;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

pub const BASE_DELIVERY_MINUTES: i64 = 25;
pub const VARIABLE_DELIVERY_MINUTES: Range<i64> = 10..30;

/// Source of the variable part of a delivery estimate.
pub trait RandomSource: Send + Sync {
    /// Uniform integer in `range`, upper bound exclusive.
    fn next_in(&self, range: Range<i64>) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_in(&self, range: Range<i64>) -> i64 {
        rand::rng().random_range(range)
    }
}

/// Always answers the same value, clamped into the requested range.
#[derive(Debug, Clone, Copy)]
pub struct FixedRandom(pub i64);

impl RandomSource for FixedRandom {
    fn next_in(&self, range: Range<i64>) -> i64 {
        self.0.clamp(range.start, range.end - 1)
    }
}

pub fn estimated_delivery(now: DateTime<Utc>, random: &dyn RandomSource) -> DateTime<Utc> {
    let minutes = BASE_DELIVERY_MINUTES + random.next_in(VARIABLE_DELIVERY_MINUTES);
    now + Duration::minutes(minutes)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    #[test]
    fn estimate_spans_thirty_five_to_fifty_four_minutes() {
        let now = Utc::now();

        let earliest = estimated_delivery(now, &FixedRandom(i64::MIN));
        let latest = estimated_delivery(now, &FixedRandom(i64::MAX));

        assert_eq!(earliest - now, Duration::minutes(35));
        assert_eq!(latest - now, Duration::minutes(54));
    }

    #[test]
    fn thread_random_stays_in_range() {
        for _ in 0..200 {
            let value = ThreadRandom.next_in(VARIABLE_DELIVERY_MINUTES);
            assert!(VARIABLE_DELIVERY_MINUTES.contains(&value));
        }
    }
}
