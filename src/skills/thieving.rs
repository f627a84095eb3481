//! Thieving: stealth vs perception. Success pays GP and XP; failure deals
//! damage and stuns for three seconds with no reward.

use super::{mastery_xp_per_completion, roll_mastery_token, scaled_skill_xp, CompletionOutcome};
use crate::builder::StateUpdateBuilder;
use crate::enums::Skill;
use crate::id::Id;
use crate::modifier::{resolve_modifiers, ModifierAnchor};
use crate::rng::SimRng;
use crate::rollers;
use crate::Tick;

/// Stun duration after a failed pickpocket.
pub const STUN_TICKS: Tick = 30;

pub fn complete(
    b: &mut StateUpdateBuilder,
    action_id: &Id,
    rng: &mut SimRng,
) -> CompletionOutcome {
    let Some(def) = b.state().registries().action(action_id).cloned() else {
        return CompletionOutcome::Cleared;
    };
    let Some(thieving) = &def.thieving else {
        return CompletionOutcome::Cleared;
    };
    let anchor = ModifierAnchor::for_action(b.state(), action_id);
    let modifiers = resolve_modifiers(b.state(), &anchor);

    let stealth = rollers::thieving_stealth(
        b.state().skill_level(Skill::Thieving),
        b.state().mastery_level(action_id),
    ) + modifiers.thieving_stealth() as i64;

    if rollers::roll_thieving(rng, stealth, thieving.perception) {
        let gp = rng.uniform_int(thieving.gp_min, thieving.gp_max);
        b.add_gp(gp);
        b.add_skill_xp(Skill::Thieving, scaled_skill_xp(def.xp, &modifiers));
        b.add_mastery_xp(
            Skill::Thieving,
            action_id,
            mastery_xp_per_completion(def.base_ticks, &modifiers),
        );
        if let Some(drops) = &def.drops {
            let mut rolled = Vec::new();
            drops.roll(rng, &mut rolled);
            for (item, qty) in rolled {
                b.add_item_or_drop(&item, qty);
            }
        }
        if let Some(token) = &def.mastery_token {
            roll_mastery_token(b, Skill::Thieving, token, rng);
        }
        CompletionOutcome::Continue
    } else {
        let damage = rollers::roll_damage(rng, thieving.max_hit);
        let died = b.apply_damage(damage);
        if died {
            return CompletionOutcome::Died;
        }
        b.state_mut().stunned.ticks_remaining = STUN_TICKS;
        CompletionOutcome::Continue
    }
}
