//! Built-in passive behaviors

use rand::RngCore;

use crate::behavior::registry::{BehaviorResult, PassiveContext, PassiveEffect, PassiveOutcome};
use crate::character::{Character, PassiveTarget};
use crate::core::error::BehaviorError;

const SECOND_WIND_THRESHOLD: f64 = 0.3;
const SECOND_WIND_PERCENT: f64 = 0.25;

/// Flat `amount`, else `percent` of `base`, at least 1
fn scaled_amount(amount: Option<u32>, percent: Option<f64>, base: u32) -> Option<u32> {
    match (amount, percent) {
        (Some(flat), _) => Some(flat),
        (None, Some(p)) => Some(((base as f64 * p).round() as u32).max(1)),
        (None, None) => None,
    }
}

/// Heal self by `amount` or `percent` of max health
pub fn regenerate(
    ctx: &PassiveContext<'_>,
    _rng: &mut dyn RngCore,
) -> BehaviorResult<PassiveOutcome> {
    let data = &ctx.passive.passive_data;
    let amount = scaled_amount(data.amount, data.percent, ctx.actor.max_hp())
        .ok_or(BehaviorError::MissingData("amount or percent"))?;

    if ctx.actor.current_hp >= ctx.actor.max_hp() {
        return Ok(PassiveOutcome::skipped());
    }

    Ok(PassiveOutcome::executed(
        format!("{}'s {} restores {} HP", ctx.actor.name, ctx.passive.name, amount),
        vec![PassiveEffect::Heal {
            target: ctx.actor.id.clone(),
            amount,
        }],
    ))
}

/// Apply `statusId` to the configured target group
pub fn apply_status(
    ctx: &PassiveContext<'_>,
    _rng: &mut dyn RngCore,
) -> BehaviorResult<PassiveOutcome> {
    let data = &ctx.passive.passive_data;
    let status_id = data
        .status_id
        .clone()
        .ok_or(BehaviorError::MissingData("statusId"))?;

    let targets: Vec<&Character> = match data.target.unwrap_or_default() {
        PassiveTarget::SelfTarget => vec![ctx.actor],
        PassiveTarget::Allies => ctx.allies.to_vec(),
        PassiveTarget::Enemies => ctx.enemies.to_vec(),
        PassiveTarget::Source => ctx
            .data
            .source
            .as_ref()
            .and_then(|id| ctx.enemies.iter().chain(ctx.allies).find(|c| &c.id == id))
            .copied()
            .into_iter()
            .collect(),
    };

    if targets.is_empty() {
        return Ok(PassiveOutcome::skipped());
    }

    let names: Vec<&str> = targets.iter().map(|c| c.name.as_str()).collect();
    let effects = targets
        .iter()
        .map(|c| PassiveEffect::ApplyStatus {
            target: c.id.clone(),
            status_id: status_id.clone(),
            duration: data.duration,
        })
        .collect();

    Ok(PassiveOutcome::executed(
        format!(
            "{}'s {} applies {} to {}",
            ctx.actor.name,
            ctx.passive.name,
            status_id,
            names.join(", ")
        ),
        effects,
    ))
}

/// Strike back at whoever just dealt damage
pub fn thorns(ctx: &PassiveContext<'_>, _rng: &mut dyn RngCore) -> BehaviorResult<PassiveOutcome> {
    let Some(source) = ctx.data.source.as_ref() else {
        return Ok(PassiveOutcome::skipped());
    };
    if source == &ctx.actor.id {
        return Ok(PassiveOutcome::skipped());
    }

    let data = &ctx.passive.passive_data;
    let taken = ctx.data.amount.unwrap_or(0);
    let amount = scaled_amount(data.amount, data.percent, taken)
        .ok_or(BehaviorError::MissingData("amount or percent"))?;

    if amount == 0 || taken == 0 {
        return Ok(PassiveOutcome::skipped());
    }

    Ok(PassiveOutcome::executed(
        format!("{}'s {} reflects {} damage", ctx.actor.name, ctx.passive.name, amount),
        vec![PassiveEffect::Damage {
            target: source.clone(),
            amount,
        }],
    ))
}

/// Emergency heal once health drops under `threshold`
pub fn second_wind(
    ctx: &PassiveContext<'_>,
    _rng: &mut dyn RngCore,
) -> BehaviorResult<PassiveOutcome> {
    let data = &ctx.passive.passive_data;
    let threshold = data.threshold.unwrap_or(SECOND_WIND_THRESHOLD);

    if ctx.actor.hp_ratio() >= threshold {
        return Ok(PassiveOutcome::skipped());
    }

    let amount = scaled_amount(
        data.amount,
        Some(data.percent.unwrap_or(SECOND_WIND_PERCENT)),
        ctx.actor.max_hp(),
    )
    .unwrap_or(1);

    Ok(PassiveOutcome::executed(
        format!("{} catches a second wind (+{} HP)", ctx.actor.name, amount),
        vec![PassiveEffect::Heal {
            target: ctx.actor.id.clone(),
            amount,
        }],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::triggers::{Trigger, TriggerData};
    use crate::behavior::PassiveRule;
    use crate::character::{CharacterTemplate, PassiveAbility, PassiveData, Stats};
    use crate::core::types::{CharacterId, Team};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn body(team: Team, current: u32) -> Character {
        let mut template = CharacterTemplate::new(
            "b",
            "Bearer",
            Stats {
                hp: 100,
                ..Stats::default()
            },
        );
        template.current_hp = Some(current);
        Character::from_template(&template, team, 0)
    }

    fn run(
        f: fn(&PassiveContext<'_>, &mut dyn RngCore) -> BehaviorResult<PassiveOutcome>,
        actor: &Character,
        enemy: &Character,
        data: PassiveData,
        trigger_data: TriggerData,
    ) -> BehaviorResult<PassiveOutcome> {
        let passive = PassiveAbility::new("Test", Trigger::TurnStart, PassiveRule::Regenerate)
            .with_data(data);
        let allies = [actor];
        let enemies = [enemy];
        let ctx = PassiveContext {
            actor,
            passive: &passive,
            trigger: Trigger::TurnStart,
            data: &trigger_data,
            allies: &allies,
            enemies: &enemies,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        f(&ctx, &mut rng)
    }

    #[test]
    fn test_regenerate_percent_of_max() {
        let actor = body(Team::Player, 50);
        let enemy = body(Team::Enemy, 100);
        let outcome = run(
            regenerate,
            &actor,
            &enemy,
            PassiveData {
                percent: Some(0.1),
                ..PassiveData::default()
            },
            TriggerData::default(),
        )
        .unwrap();

        assert!(outcome.executed);
        assert_eq!(
            outcome.effects,
            vec![PassiveEffect::Heal {
                target: actor.id.clone(),
                amount: 10
            }]
        );
    }

    #[test]
    fn test_regenerate_at_full_health_skips() {
        let actor = body(Team::Player, 100);
        let enemy = body(Team::Enemy, 100);
        let outcome = run(
            regenerate,
            &actor,
            &enemy,
            PassiveData {
                amount: Some(5),
                ..PassiveData::default()
            },
            TriggerData::default(),
        )
        .unwrap();
        assert!(!outcome.executed);
    }

    #[test]
    fn test_apply_status_without_id_is_error() {
        let actor = body(Team::Player, 100);
        let enemy = body(Team::Enemy, 100);
        let result = run(
            apply_status,
            &actor,
            &enemy,
            PassiveData::default(),
            TriggerData::default(),
        );
        assert_eq!(result, Err(BehaviorError::MissingData("statusId")));
    }

    #[test]
    fn test_apply_status_to_enemies() {
        let actor = body(Team::Player, 100);
        let enemy = body(Team::Enemy, 100);
        let outcome = run(
            apply_status,
            &actor,
            &enemy,
            PassiveData {
                status_id: Some("burn".into()),
                target: Some(PassiveTarget::Enemies),
                ..PassiveData::default()
            },
            TriggerData::default(),
        )
        .unwrap();

        assert_eq!(
            outcome.effects,
            vec![PassiveEffect::ApplyStatus {
                target: CharacterId::new("e-1"),
                status_id: "burn".into(),
                duration: None,
            }]
        );
    }

    #[test]
    fn test_thorns_reflects_percent_of_damage_taken() {
        let actor = body(Team::Player, 80);
        let enemy = body(Team::Enemy, 100);
        let outcome = run(
            thorns,
            &actor,
            &enemy,
            PassiveData {
                percent: Some(0.5),
                ..PassiveData::default()
            },
            TriggerData {
                source: Some(enemy.id.clone()),
                amount: Some(20),
                ..TriggerData::default()
            },
        )
        .unwrap();

        assert_eq!(
            outcome.effects,
            vec![PassiveEffect::Damage {
                target: enemy.id.clone(),
                amount: 10
            }]
        );
    }

    #[test]
    fn test_second_wind_below_threshold_only() {
        let enemy = body(Team::Enemy, 100);
        let healthy = body(Team::Player, 60);
        let outcome = run(
            second_wind,
            &healthy,
            &enemy,
            PassiveData::default(),
            TriggerData::default(),
        )
        .unwrap();
        assert!(!outcome.executed);

        let dying = body(Team::Player, 20);
        let outcome = run(
            second_wind,
            &dying,
            &enemy,
            PassiveData::default(),
            TriggerData::default(),
        )
        .unwrap();
        assert!(outcome.executed);
        assert_eq!(
            outcome.effects,
            vec![PassiveEffect::Heal {
                target: dying.id.clone(),
                amount: 25
            }]
        );
    }
}
