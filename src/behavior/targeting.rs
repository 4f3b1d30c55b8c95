//! Built-in targeting behaviors

use ordered_float::OrderedFloat;
use rand::seq::SliceRandom;
use rand::RngCore;
use std::cmp::Reverse;

use crate::behavior::registry::{BehaviorResult, TargetSelection, TargetingContext};
use crate::character::Character;

fn single(c: Option<&&Character>) -> Option<TargetSelection> {
    c.map(|c| TargetSelection::Single(c.id.clone()))
}

fn multiple(group: &[&Character]) -> Option<TargetSelection> {
    if group.is_empty() {
        return None;
    }
    Some(TargetSelection::Multiple(
        group.iter().map(|c| c.id.clone()).collect(),
    ))
}

pub fn random_enemy(
    ctx: &TargetingContext<'_>,
    mut rng: &mut dyn RngCore,
) -> BehaviorResult<Option<TargetSelection>> {
    Ok(single(ctx.enemies().choose(&mut rng)))
}

pub fn lowest_hp_enemy(
    ctx: &TargetingContext<'_>,
    _rng: &mut dyn RngCore,
) -> BehaviorResult<Option<TargetSelection>> {
    Ok(single(ctx.enemies().iter().min_by_key(|c| c.current_hp)))
}

pub fn highest_attack_enemy(
    ctx: &TargetingContext<'_>,
    _rng: &mut dyn RngCore,
) -> BehaviorResult<Option<TargetSelection>> {
    // min of the reversed key keeps the first of equals
    Ok(single(
        ctx.enemies().iter().min_by_key(|c| Reverse(c.stats.attack)),
    ))
}

/// Most wounded ally by health ratio
pub fn lowest_hp_ally(
    ctx: &TargetingContext<'_>,
    _rng: &mut dyn RngCore,
) -> BehaviorResult<Option<TargetSelection>> {
    Ok(single(
        ctx.allies().iter().min_by_key(|c| OrderedFloat(c.hp_ratio())),
    ))
}

pub fn random_ally(
    ctx: &TargetingContext<'_>,
    mut rng: &mut dyn RngCore,
) -> BehaviorResult<Option<TargetSelection>> {
    Ok(single(ctx.allies().choose(&mut rng)))
}

pub fn self_only(
    ctx: &TargetingContext<'_>,
    _rng: &mut dyn RngCore,
) -> BehaviorResult<Option<TargetSelection>> {
    Ok(Some(TargetSelection::Single(ctx.actor.id.clone())))
}

pub fn all_enemies(
    ctx: &TargetingContext<'_>,
    _rng: &mut dyn RngCore,
) -> BehaviorResult<Option<TargetSelection>> {
    Ok(multiple(&ctx.enemies()))
}

pub fn all_allies(
    ctx: &TargetingContext<'_>,
    _rng: &mut dyn RngCore,
) -> BehaviorResult<Option<TargetSelection>> {
    Ok(multiple(&ctx.allies()))
}
