//! Built-in action-decision behaviors
//!
//! Each returns an index into `DecisionContext::available`, or `None` for a
//! basic attack.

use rand::seq::IteratorRandom;
use rand::{Rng, RngCore};

use crate::behavior::registry::{BehaviorResult, DecisionContext};

const DEFAULT_HEAL_BELOW: f64 = 0.5;
const SUPPORT_HEAL_BELOW: f64 = 0.75;
const DEFAULT_ABILITY_CHANCE: f64 = 0.7;

fn ally_below(ctx: &DecisionContext<'_>, ratio: f64) -> bool {
    ctx.allies.iter().any(|c| c.hp_ratio() < ratio)
}

fn first_heal(ctx: &DecisionContext<'_>) -> Option<usize> {
    ctx.available.iter().position(|a| a.heals())
}

fn strongest_attack(ctx: &DecisionContext<'_>) -> Option<usize> {
    ctx.available
        .iter()
        .enumerate()
        .filter(|(_, a)| !a.heals() && !a.is_utility())
        .fold(None, |best: Option<(usize, u32)>, (i, a)| match best {
            Some((_, dmg)) if dmg >= a.damage => best,
            _ => Some((i, a.damage)),
        })
        .map(|(i, _)| i)
}

/// Heal a badly hurt ally if possible, otherwise usually use something
pub fn default_decision(
    ctx: &DecisionContext<'_>,
    mut rng: &mut dyn RngCore,
) -> BehaviorResult<Option<usize>> {
    if ctx.available.is_empty() {
        return Ok(None);
    }

    if ally_below(ctx, DEFAULT_HEAL_BELOW) {
        if let Some(i) = first_heal(ctx) {
            return Ok(Some(i));
        }
    }

    if !rng.gen_bool(DEFAULT_ABILITY_CHANCE) {
        return Ok(None);
    }

    Ok(ctx
        .available
        .iter()
        .enumerate()
        .filter(|(_, a)| !a.heals())
        .map(|(i, _)| i)
        .choose(&mut rng))
}

/// Always the hardest-hitting ability
pub fn aggressive(
    ctx: &DecisionContext<'_>,
    _rng: &mut dyn RngCore,
) -> BehaviorResult<Option<usize>> {
    Ok(strongest_attack(ctx))
}

/// Heal early, buff next, attack last
pub fn support(ctx: &DecisionContext<'_>, _rng: &mut dyn RngCore) -> BehaviorResult<Option<usize>> {
    if ally_below(ctx, SUPPORT_HEAL_BELOW) {
        if let Some(i) = first_heal(ctx) {
            return Ok(Some(i));
        }
    }
    if let Some(i) = ctx.available.iter().position(|a| a.is_utility()) {
        return Ok(Some(i));
    }
    Ok(strongest_attack(ctx))
}
