//! Pure RNG-driven helpers. Every roller takes the definitions it needs and
//! a `&mut SimRng`; nothing here touches global state, so the rolls are
//! deterministic in the RNG's sequence.

use crate::modifier::ResolvedModifiers;
use crate::rng::SimRng;
use crate::utils::round_half_to_even;
use crate::{Tick, TICK_MS};

/// Action duration after modifiers: percentage scaling, then the flat
/// millisecond adjustment converted to ticks, floored at one tick.
pub fn rolled_duration(base_ticks: Tick, modifiers: &ResolvedModifiers) -> Tick {
    let scaled = base_ticks as f64 * (1.0 + modifiers.skill_interval_pct() / 100.0);
    let flat_ticks = modifiers.flat_skill_interval_ms() as i64 / TICK_MS;
    (round_half_to_even(scaled) + flat_ticks).max(1)
}

/// Success iff the roll lands under `chance_pct` percent.
pub fn roll_doubling(rng: &mut SimRng, chance_pct: f64) -> bool {
    if chance_pct <= 0.0 {
        return false;
    }
    rng.next_double() < chance_pct / 100.0
}

pub fn thieving_stealth(skill_level: u32, mastery_level: u32) -> i64 {
    40 + skill_level as i64 + mastery_level as i64
}

/// `(100 + stealth) / (100 + perception)`, capped at 1.
pub fn thieving_success_chance(stealth: i64, perception: i64) -> f64 {
    ((100 + stealth) as f64 / (100 + perception) as f64).min(1.0)
}

pub fn roll_thieving(rng: &mut SimRng, stealth: i64, perception: i64) -> bool {
    rng.next_double() < thieving_success_chance(stealth, perception)
}

/// `0.70 + 0.006 * mastery_level`, capped at 1.
pub fn cooking_success_chance(mastery_level: u32) -> f64 {
    (0.70 + 0.006 * mastery_level as f64).min(1.0)
}

pub fn roll_cooking_success(
    rng: &mut SimRng,
    mastery_level: u32,
    modifiers: &ResolvedModifiers,
) -> bool {
    let perfect = modifiers.perfect_cook_chance() / 100.0;
    rng.next_double() < (cooking_success_chance(mastery_level) + perfect).min(1.0)
}

/// Damage in [1, max_hit].
pub fn roll_damage(rng: &mut SimRng, max_hit: i64) -> i64 {
    1 + rng.next_int(max_hit.max(1))
}

/// Hit iff the roll lands under `accuracy / (accuracy + evasion)`.
pub fn roll_hit(rng: &mut SimRng, accuracy: f64, evasion: f64) -> bool {
    let accuracy = accuracy.max(0.0);
    let evasion = evasion.max(0.0);
    if accuracy <= 0.0 {
        return false;
    }
    rng.next_double() < accuracy / (accuracy + evasion)
}
