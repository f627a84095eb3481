//! Formatting and hashing helpers shared across the engine and solver.

use crate::{Tick, TICKS_PER_SECOND};
use std::hash::{Hash, Hasher};

/// Round half-to-even, the tie-breaking rule used by duration rolls.
pub fn round_half_to_even(x: f64) -> i64 {
    let floor = x.floor();
    let frac = x - floor;
    let f = floor as i64;
    if frac > 0.5 {
        f + 1
    } else if frac < 0.5 {
        f
    } else if f % 2 == 0 {
        f
    } else {
        f + 1
    }
}

/// Human-readable duration for plan output: "1d 2h", "1h 6m", "2m 3s", "45s".
pub fn format_duration(ticks: Tick) -> String {
    let total_seconds = (ticks.max(0)) / TICKS_PER_SECOND;
    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3_600;
    let minutes = (total_seconds % 3_600) / 60;
    let seconds = total_seconds % 60;

    if days > 0 {
        format!("{}d {}h", days, hours)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// Hashes a f64 value using its bit representation for consistent hashing.
pub fn hash_f64<H: Hasher>(val: f64, state: &mut H) {
    val.to_bits().hash(state);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_half_to_even() {
        assert_eq!(round_half_to_even(2.5), 2);
        assert_eq!(round_half_to_even(3.5), 4);
        assert_eq!(round_half_to_even(2.4), 2);
        assert_eq!(round_half_to_even(2.6), 3);
        assert_eq!(round_half_to_even(30.0), 30);
    }

    #[test]
    fn test_format_duration_bands() {
        assert_eq!(format_duration(450), "45s");
        assert_eq!(format_duration(123 * 10), "2m 3s");
        assert_eq!(format_duration((3600 + 360) * 10), "1h 6m");
        assert_eq!(format_duration((86_400 + 7_200) * 10), "1d 2h");
    }
}
