//! Mastery token claiming: each non-combat skill has a token item; claiming
//! one banks a fixed fraction of the pool cap into the skill's pool.

use crate::builder::StateUpdateBuilder;
use crate::enums::Skill;
use crate::error::{SimError, SimResult};
use crate::xp;

/// Claim one token. Fails with `PoolFull` if the pool cannot fit a whole
/// token's worth of XP.
pub fn claim_token(b: &mut StateUpdateBuilder, skill: Skill) -> SimResult<()> {
    let token = b
        .state()
        .registries()
        .mastery_token_for(skill)
        .ok_or_else(|| {
            SimError::InvalidArgument(format!("{} has no mastery token", skill))
        })?;
    if b.state().inventory.count_of(&token) < 1 {
        return Err(SimError::InsufficientInputs {
            action: token.clone(),
            missing: token,
        });
    }
    let cap = b.state().max_mastery_pool_xp(skill);
    let token_xp = xp::token_pool_xp(cap);
    let pool = b.state().skill_state(skill).mastery_pool_xp;
    if pool + token_xp > cap {
        return Err(SimError::PoolFull { skill });
    }
    b.remove_item(&token, 1)?;
    b.add_mastery_pool_xp(skill, token_xp);
    Ok(())
}

/// Claim as many tokens as fit in the pool. Returns how many were claimed.
pub fn claim_all(b: &mut StateUpdateBuilder, skill: Skill) -> SimResult<i64> {
    let mut claimed = 0;
    loop {
        match claim_token(b, skill) {
            Ok(()) => claimed += 1,
            Err(SimError::PoolFull { .. }) | Err(SimError::InsufficientInputs { .. }) => break,
            Err(e) => return Err(e),
        }
    }
    Ok(claimed)
}
