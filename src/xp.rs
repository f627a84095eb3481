//! The XP curve and mastery pool math.
//!
//! Levels follow the classic 1..99 exponential table extended to 120:
//! `xp(L) = floor( sum_{l=1}^{L-1} floor(l + 300 * 2^(l/7)) / 4 )`.

use std::sync::OnceLock;

pub const MAX_LEVEL: u32 = 120;
pub const MAX_MASTERY_LEVEL: u32 = 99;

/// Pool capacity contributed by each action a skill has.
pub const POOL_XP_PER_ACTION: i64 = 500_000;

/// Fraction of earned mastery XP that also feeds the skill's pool.
pub const POOL_FEED_FRACTION: f64 = 0.25;

/// One claimed mastery token is worth this fraction of the pool cap.
pub const TOKEN_POOL_FRACTION: f64 = 0.001;

/// Pool thresholds that activate skill-wide mastery bonuses.
pub const POOL_CHECKPOINTS: [f64; 4] = [0.10, 0.25, 0.50, 0.95];

fn xp_table() -> &'static [i64; MAX_LEVEL as usize + 1] {
    static TABLE: OnceLock<[i64; MAX_LEVEL as usize + 1]> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = [0i64; MAX_LEVEL as usize + 1];
        let mut points = 0i64;
        for level in 1..MAX_LEVEL as usize {
            points += ((level as f64) + 300.0 * 2f64.powf(level as f64 / 7.0)).floor() as i64;
            table[level + 1] = points / 4;
        }
        table
    })
}

/// Level reached with `xp` experience, clamped to [1, 120]. Monotonic in `xp`.
pub fn level_for_xp(xp: i64) -> u32 {
    let table = xp_table();
    let mut level = 1u32;
    for l in 2..=MAX_LEVEL {
        if table[l as usize] <= xp {
            level = l;
        } else {
            break;
        }
    }
    level
}

/// The minimum XP at which `level_for_xp` reports `level`. Inverse of
/// `level_for_xp` on exact table values.
pub fn start_xp_for_level(level: u32) -> i64 {
    let clamped = level.clamp(1, MAX_LEVEL);
    xp_table()[clamped as usize]
}

/// Mastery levels use the same curve capped at 99.
pub fn mastery_level_for_xp(xp: i64) -> u32 {
    level_for_xp(xp).min(MAX_MASTERY_LEVEL)
}

/// A skill's pool capacity scales with how many actions it has.
pub fn max_mastery_pool_xp(actions_in_skill: usize) -> i64 {
    actions_in_skill as i64 * POOL_XP_PER_ACTION
}

/// Pool XP granted by claiming one mastery token.
pub fn token_pool_xp(max_pool_xp: i64) -> i64 {
    (max_pool_xp as f64 * TOKEN_POOL_FRACTION).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_anchor_points() {
        assert_eq!(start_xp_for_level(1), 0);
        assert_eq!(start_xp_for_level(2), 83);
        assert_eq!(start_xp_for_level(10), 1154);
        assert_eq!(start_xp_for_level(50), 101_333);
        assert_eq!(start_xp_for_level(99), 13_034_431);
    }

    #[test]
    fn test_level_for_xp_inverts_table() {
        for level in 1..=MAX_LEVEL {
            assert_eq!(
                level_for_xp(start_xp_for_level(level)),
                level,
                "level_for_xp(start_xp_for_level({})) should round-trip",
                level
            );
        }
    }

    #[test]
    fn test_level_just_below_boundary() {
        assert_eq!(level_for_xp(82), 1);
        assert_eq!(level_for_xp(83), 2);
        assert_eq!(level_for_xp(13_034_430), 98);
    }

    #[test]
    fn test_level_is_monotonic() {
        let mut last = 0;
        for xp in (0..200_000).step_by(997) {
            let level = level_for_xp(xp);
            assert!(level >= last, "level_for_xp must never decrease");
            last = level;
        }
    }

    #[test]
    fn test_mastery_caps_at_99() {
        assert_eq!(mastery_level_for_xp(start_xp_for_level(120)), 99);
    }

    #[test]
    fn test_token_pool_xp() {
        let cap = max_mastery_pool_xp(3);
        assert_eq!(cap, 1_500_000);
        assert_eq!(token_pool_xp(cap), 1_500);
    }
}
