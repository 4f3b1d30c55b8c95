//! Battle orchestration
//!
//! Idle -> Preparing -> (TurnStart -> ActionExecution)* -> Ended
//!
//! Each turn: cooldowns -> status effects -> turn-start passives -> plan ->
//! execute actions one scheduled step at a time -> turn-end passives.
//! The end condition is checked after every action.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::fmt::Write;
use std::sync::Arc;

use crate::battle::battlefield::Battlefield;
use crate::battle::events::{BattleEvent, BattleLog, BattleLogEntry, EventBus, EventSink};
use crate::battle::passives::{PassiveEngine, PassiveResult};
use crate::battle::planner::{Action, ActionKind, ActionPlanner, PlanSkip, PlannedHit};
use crate::battle::scheduler::{BattleStep, Scheduler, VirtualScheduler};
use crate::battle::targeting::TargetResolver;
use crate::battle::triggers::{Trigger, TriggerData, TriggerTracker};
use crate::behavior::{BehaviorRegistry, PassiveEffect};
use crate::character::{CharacterSnapshot, CharacterTemplate, StatusApplication};
use crate::core::config::BattleConfig;
use crate::core::error::{BattleError, Result};
use crate::core::types::{CharacterId, Team, Turn};
use crate::effects::{AddOutcome, EffectType, StatusCatalog, StatusEffectEngine};
use crate::resolution::{
    check_and_reset_death_status, DamageResolver, DeathStatusChange, HealingResolver, TypeChart,
};

/// Battle phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BattlePhase {
    #[default]
    Idle,
    Preparing,
    TurnStart,
    ActionExecution,
    Ended,
}

/// Battle outcome, from the player's side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BattleOutcome {
    Victory,
    Defeat,
    Draw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EndReason {
    /// One or both teams have no one standing
    Elimination,
    /// `max_turns` ran out
    Timeout,
}

/// Living members per team decide the battle
pub fn check_battle_end(field: &Battlefield) -> Option<BattleOutcome> {
    let players = field.living_count(Team::Player);
    let enemies = field.living_count(Team::Enemy);

    match (players, enemies) {
        (0, 0) => Some(BattleOutcome::Draw),
        (0, _) => Some(BattleOutcome::Defeat),
        (_, 0) => Some(BattleOutcome::Victory),
        _ => None,
    }
}

/// Summary of a finished battle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleReport {
    pub outcome: BattleOutcome,
    pub reason: EndReason,
    pub turns: Turn,
    pub survivors: Vec<CharacterSnapshot>,
    pub damage_dealt: BTreeMap<CharacterId, u32>,
    pub healing_done: BTreeMap<CharacterId, u32>,
    pub log: Vec<BattleLogEntry>,
}

fn seeded_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

pub struct BattleOrchestrator<S: Scheduler = VirtualScheduler> {
    config: BattleConfig,
    registry: Option<Arc<BehaviorRegistry>>,
    planner: ActionPlanner,
    targets: TargetResolver,
    passives: PassiveEngine,
    damage: DamageResolver,
    healing: HealingResolver,
    effects: StatusEffectEngine,
    tracker: Option<TriggerTracker>,
    scheduler: S,
    events: EventBus,
    log: BattleLog,
    rng: ChaCha8Rng,

    field: Battlefield,
    phase: BattlePhase,
    turn: Turn,
    queue: VecDeque<Action>,
    active: bool,
    paused: bool,
    /// Step that came due while paused; rescheduled on resume
    stashed: Option<BattleStep>,
    result: Option<(BattleOutcome, EndReason)>,
    damage_dealt: BTreeMap<CharacterId, u32>,
    healing_done: BTreeMap<CharacterId, u32>,
}

impl BattleOrchestrator<VirtualScheduler> {
    pub fn new(config: BattleConfig) -> Self {
        Self::with_scheduler(config, VirtualScheduler::new())
    }
}

impl Default for BattleOrchestrator<VirtualScheduler> {
    fn default() -> Self {
        Self::new(BattleConfig::default())
    }
}

impl<S: Scheduler> BattleOrchestrator<S> {
    pub fn with_scheduler(config: BattleConfig, scheduler: S) -> Self {
        let registry = Some(Arc::new(BehaviorRegistry::with_builtins()));
        let damage = DamageResolver::new(
            config.damage.clone(),
            TypeChart::with_overrides(&config.type_chart),
        );
        let healing = HealingResolver::new(config.damage.clone());

        Self {
            planner: ActionPlanner::new(
                registry.clone(),
                damage.clone(),
                healing.clone(),
                config.default_cooldown,
            ),
            targets: TargetResolver::new(registry.clone()),
            passives: PassiveEngine::new(registry.clone()),
            registry,
            damage,
            healing,
            effects: StatusEffectEngine::default(),
            tracker: Some(TriggerTracker::new()),
            scheduler,
            events: EventBus::new(),
            log: BattleLog::new(),
            rng: seeded_rng(config.seed),
            config,
            field: Battlefield::default(),
            phase: BattlePhase::Idle,
            turn: 0,
            queue: VecDeque::new(),
            active: false,
            paused: false,
            stashed: None,
            result: None,
            damage_dealt: BTreeMap::new(),
            healing_done: BTreeMap::new(),
        }
    }

    /// Replace the behavior registry
    pub fn with_registry(mut self, registry: BehaviorRegistry) -> Self {
        self.registry = Some(Arc::new(registry));
        self.rewire();
        self
    }

    /// Run with no behavior registry; every lookup takes its fallback path
    pub fn without_registry(mut self) -> Self {
        self.registry = None;
        self.rewire();
        self
    }

    pub fn with_catalog(mut self, catalog: StatusCatalog) -> Self {
        self.effects = StatusEffectEngine::new(catalog);
        self
    }

    /// Run with no trigger tracker; passives fire on every matching trigger
    pub fn without_trigger_tracker(mut self) -> Self {
        self.tracker = None;
        self
    }

    fn rewire(&mut self) {
        self.planner = ActionPlanner::new(
            self.registry.clone(),
            self.damage.clone(),
            self.healing.clone(),
            self.config.default_cooldown,
        );
        self.targets = TargetResolver::new(self.registry.clone());
        self.passives = PassiveEngine::new(self.registry.clone());
    }

    pub fn subscribe(&mut self, sink: impl EventSink + 'static) {
        self.events.subscribe(sink);
    }

    // ---- accessors ----

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn turn(&self) -> Turn {
        self.turn
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn outcome(&self) -> Option<BattleOutcome> {
        self.result.map(|(outcome, _)| outcome)
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        self.result.map(|(_, reason)| reason)
    }

    pub fn battlefield(&self) -> &Battlefield {
        &self.field
    }

    pub fn log(&self) -> &BattleLog {
        &self.log
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn trigger_tracker(&self) -> Option<&TriggerTracker> {
        self.tracker.as_ref()
    }

    pub fn queued_actions(&self) -> usize {
        self.queue.len()
    }

    pub fn report(&self) -> Option<BattleReport> {
        let (outcome, reason) = self.result?;
        Some(BattleReport {
            outcome,
            reason,
            turns: self.turn,
            survivors: self
                .field
                .iter()
                .filter(|c| c.is_alive())
                .map(|c| c.snapshot())
                .collect(),
            damage_dealt: self.damage_dealt.clone(),
            healing_done: self.healing_done.clone(),
            log: self.log.entries().to_vec(),
        })
    }

    // ---- inbound controls ----

    /// Copy both rosters in and schedule the first turn.
    ///
    /// Fails only on bad input or when a battle is already running.
    pub fn start_battle(
        &mut self,
        player: &[CharacterTemplate],
        enemy: &[CharacterTemplate],
    ) -> Result<()> {
        if self.active {
            return Err(BattleError::AlreadyActive);
        }

        self.phase = BattlePhase::Preparing;
        self.field = match Battlefield::from_rosters(player, enemy) {
            Ok(field) => field,
            Err(e) => {
                self.phase = BattlePhase::Idle;
                return Err(e);
            }
        };

        if let Some(seed) = self.config.seed {
            self.rng = ChaCha8Rng::seed_from_u64(seed);
        }
        if let Some(tracker) = self.tracker.as_mut() {
            tracker.reset_battle_tracking();
        }
        self.scheduler.cancel_all();
        self.queue.clear();
        self.turn = 0;
        self.result = None;
        self.stashed = None;
        self.paused = false;
        self.active = true;
        self.damage_dealt.clear();
        self.healing_done.clear();
        self.log.clear();

        tracing::info!(
            "Battle started: {} players vs {} enemies",
            self.field.player.len(),
            self.field.enemy.len()
        );
        self.log.push(0, "The battle begins!");
        self.events.emit(BattleEvent::BattleStarted {
            player_team: self.field.snapshots(Team::Player),
            enemy_team: self.field.snapshots(Team::Enemy),
        });

        for id in self.field.ids() {
            self.run_passives(Trigger::BattleStart, &id, TriggerData::default());
        }

        if self.check_end() {
            return Ok(());
        }
        self.schedule(BattleStep::TurnStart, self.config.turn_start_delay_ms);
        Ok(())
    }

    /// Stop at the next scheduling boundary
    pub fn pause(&mut self) -> bool {
        if !self.active || self.paused {
            return false;
        }
        self.paused = true;
        tracing::info!("Battle paused on turn {}", self.turn);
        true
    }

    pub fn resume(&mut self) -> bool {
        if !self.paused {
            return false;
        }
        self.paused = false;
        if let Some(step) = self.stashed.take() {
            self.scheduler.schedule(0, step);
        }
        tracing::info!("Battle resumed on turn {}", self.turn);
        true
    }

    /// Scale future step delays. Resolution is unaffected.
    pub fn set_speed_multiplier(&mut self, multiplier: f64) -> bool {
        if !multiplier.is_finite() || multiplier <= 0.0 {
            tracing::warn!("Ignoring invalid speed multiplier {}", multiplier);
            return false;
        }
        self.config.speed_multiplier = multiplier;
        true
    }

    // ---- driving ----

    /// Run every step due on the scheduler clock. Returns how many ran.
    pub fn tick(&mut self) -> usize {
        let mut ran = 0;
        while self.active {
            let Some(step) = self.scheduler.pop_due() else {
                break;
            };
            self.run_step(step);
            ran += 1;
        }
        ran
    }

    /// Move the clock forward and run whatever became due
    pub fn advance(&mut self, elapsed_ms: u64) -> usize {
        self.scheduler.advance(elapsed_ms);
        self.tick()
    }

    /// Delay until the next step, `None` when nothing will run on its own
    pub fn time_until_next_step(&self) -> Option<u64> {
        if !self.active || self.paused {
            return None;
        }
        self.scheduler.peek_delay()
    }

    /// Jump the clock from step to step until the battle ends or pauses
    pub fn run_to_completion(&mut self) -> Option<BattleOutcome> {
        while let Some(delay) = self.time_until_next_step() {
            self.advance(delay);
        }
        self.outcome()
    }

    fn schedule(&mut self, step: BattleStep, base_delay_ms: u64) {
        let delay = self.config.scaled_delay(base_delay_ms);
        self.scheduler.schedule(delay, step);
    }

    fn run_step(&mut self, step: BattleStep) {
        if !self.active {
            return;
        }
        if self.paused {
            tracing::debug!("{:?} held while paused", step);
            self.stashed = Some(step);
            return;
        }

        match step {
            BattleStep::TurnStart => self.begin_turn(),
            BattleStep::ExecuteNextAction => self.execute_next_action(),
            BattleStep::TurnEnd => self.end_turn(),
        }
    }

    // ---- turn phases ----

    fn begin_turn(&mut self) {
        if self.config.max_turns > 0 && self.turn >= self.config.max_turns {
            self.finish(BattleOutcome::Draw, EndReason::Timeout);
            return;
        }

        self.phase = BattlePhase::TurnStart;
        self.turn += 1;
        if let Some(tracker) = self.tracker.as_mut() {
            tracker.reset_turn_tracking();
        }

        tracing::info!("Turn {} begins", self.turn);
        self.log.push(self.turn, format!("Turn {} begins!", self.turn));
        self.events.emit(BattleEvent::TurnStarted {
            turn_number: self.turn,
        });

        for character in self.field.player.iter_mut().chain(self.field.enemy.iter_mut()) {
            for ability in character.abilities.iter_mut() {
                ability.current_cooldown = ability.current_cooldown.saturating_sub(1);
            }
        }

        for id in self.field.ids() {
            self.process_status_effects(&id);
        }
        if self.check_end() {
            return;
        }

        for id in self.field.ids() {
            self.run_passives(Trigger::TurnStart, &id, TriggerData::default());
        }
        if self.check_end() {
            return;
        }

        self.plan_turn();
        self.phase = BattlePhase::ActionExecution;

        if self.queue.is_empty() {
            self.schedule(BattleStep::TurnEnd, self.config.turn_end_delay_ms);
        } else {
            self.schedule(BattleStep::ExecuteNextAction, self.config.action_delay_ms);
        }
    }

    fn plan_turn(&mut self) {
        for id in self.field.ids() {
            let Some(character) = self.field.get(&id) else {
                continue;
            };
            if !character.is_alive() {
                continue;
            }
            let team = character.team;
            let name = character.name.clone();

            match self
                .planner
                .plan_action(&id, team, &mut self.field, &mut self.rng)
            {
                Ok(action) => self.queue.push_back(action),
                Err(PlanSkip::Stunned) => {
                    self.log
                        .push(self.turn, format!("{} is stunned and cannot act!", name));
                }
                Err(skip) => tracing::debug!("{} does not act: {}", name, skip),
            }
            self.tick_control_effects(&id);
        }
        tracing::debug!("Turn {}: {} actions queued", self.turn, self.queue.len());
    }

    /// Control effects count down once their bearer's chance to act has passed
    fn tick_control_effects(&mut self, id: &CharacterId) {
        let Some(character) = self.field.get_mut(id) else {
            return;
        };
        let expired = self.effects.tick_control_effects(character);
        if expired.is_empty() {
            return;
        }
        let effects: Vec<String> = character
            .status_effects
            .iter()
            .map(|e| e.effect_id.clone())
            .collect();
        tracing::debug!("{} recovers from {:?}", character.name, expired);
        self.events.emit(BattleEvent::StatusEffectsChanged {
            character: id.clone(),
            effects,
        });
    }

    fn execute_next_action(&mut self) {
        self.phase = BattlePhase::ActionExecution;

        let mut next = None;
        while let Some(action) = self.queue.pop_front() {
            let alive = self
                .field
                .get(&action.actor)
                .map_or(false, |c| c.is_alive());
            if alive {
                next = Some(action);
                break;
            }
            tracing::debug!("{} fell before acting", action.actor_name);
        }

        if let Some(action) = next {
            self.execute_action(action);
            if self.check_end() {
                return;
            }
        }

        if self.queue.is_empty() {
            self.schedule(BattleStep::TurnEnd, self.config.turn_end_delay_ms);
        } else {
            self.schedule(BattleStep::ExecuteNextAction, self.config.action_delay_ms);
        }
    }

    fn end_turn(&mut self) {
        for id in self.field.ids() {
            self.run_passives(Trigger::TurnEnd, &id, TriggerData::default());
        }
        if self.check_end() {
            return;
        }

        self.log.push(
            self.turn,
            format!(
                "End of turn {}: {} allies and {} enemies standing",
                self.turn,
                self.field.living_count(Team::Player),
                self.field.living_count(Team::Enemy)
            ),
        );
        self.schedule(BattleStep::TurnStart, self.config.turn_start_delay_ms);
    }

    fn check_end(&mut self) -> bool {
        match check_battle_end(&self.field) {
            Some(outcome) => {
                self.finish(outcome, EndReason::Elimination);
                true
            }
            None => false,
        }
    }

    fn finish(&mut self, outcome: BattleOutcome, reason: EndReason) {
        if !self.active {
            return;
        }
        self.active = false;
        self.paused = false;
        self.stashed = None;
        self.phase = BattlePhase::Ended;
        self.scheduler.cancel_all();
        self.queue.clear();
        self.result = Some((outcome, reason));

        let text = match (outcome, reason) {
            (BattleOutcome::Victory, _) => "Victory! The enemy team has been defeated.",
            (BattleOutcome::Defeat, _) => "Defeat! Your team has fallen.",
            (BattleOutcome::Draw, EndReason::Timeout) => "Draw! Time has run out.",
            (BattleOutcome::Draw, EndReason::Elimination) => "Draw! Both teams have fallen.",
        };
        tracing::info!("Battle ended after {} turns: {:?} ({:?})", self.turn, outcome, reason);
        self.log.push(self.turn, text);
        self.events.emit(BattleEvent::BattleEnded {
            result: outcome,
            reason,
            player_team: self.field.snapshots(Team::Player),
            enemy_team: self.field.snapshots(Team::Enemy),
        });
    }

    // ---- action execution ----

    fn execute_action(&mut self, action: Action) {
        let ability_name = action.ability_name().to_string();
        self.events.emit(BattleEvent::CharacterAction {
            character: action.actor.clone(),
            action: action.clone(),
        });

        let mut landed = Vec::new();
        for hit in &action.hits {
            let Some(hit) = self.resolve_hit(&action, hit) else {
                continue;
            };
            match action.kind {
                ActionKind::Attack => self.deal_damage(
                    Some(&action.actor),
                    &hit.target,
                    hit.amount,
                    Some(&ability_name),
                    hit.is_critical,
                    &hit.scaling_text,
                    true,
                ),
                ActionKind::Heal => self.heal(
                    Some(&action.actor),
                    &hit.target,
                    hit.amount,
                    Some(&ability_name),
                    hit.is_critical,
                    &hit.scaling_text,
                    true,
                ),
                ActionKind::Utility => {
                    let target = self.field.name_of(&hit.target);
                    self.log.push(
                        self.turn,
                        format!("{} uses {} on {}", action.actor_name, ability_name, target),
                    );
                }
            }
            landed.push(hit.target);

            if !self.field.get(&action.actor).map_or(false, |c| c.is_alive()) {
                tracing::debug!("{} fell mid-action", action.actor_name);
                break;
            }
        }

        let actor_alive = self.field.get(&action.actor).map_or(false, |c| c.is_alive());
        let application = action
            .ability
            .as_ref()
            .and_then(|a| a.applies_status.clone())
            .filter(|_| actor_alive);
        if let Some(application) = application {
            for target in landed {
                self.apply_ability_status(&action, &target, &application);
            }
        }
    }

    /// The planned hit if its target still stands. A single-target action
    /// whose target fell is re-aimed and recomputed; area hits are dropped.
    fn resolve_hit(&mut self, action: &Action, hit: &PlannedHit) -> Option<PlannedHit> {
        if self.field.get(&hit.target).map_or(false, |c| c.is_alive()) {
            return Some(hit.clone());
        }
        if action.hits.len() != 1 {
            return None;
        }

        let actor = self.field.get(&action.actor)?;
        let candidates = self.field.candidates();
        let selection = self.targets.select_target(
            actor,
            action.ability.as_ref(),
            &candidates,
            &mut self.rng,
        )?;
        let retarget = selection.ids().into_iter().next()?;
        let target = self.field.get(&retarget)?;

        tracing::debug!("{} re-aims at {}", actor.name, target.name);
        Some(self.planner.preview(
            actor,
            target,
            action.ability.as_ref(),
            action.kind,
            &mut self.rng,
        ))
    }

    fn apply_ability_status(
        &mut self,
        action: &Action,
        target: &CharacterId,
        application: &StatusApplication,
    ) {
        let chance = if application.chance.is_finite() {
            application.chance.clamp(0.0, 1.0)
        } else {
            0.0
        };
        if chance < 1.0 && !self.rng.gen_bool(chance) {
            return;
        }
        self.apply_status(
            target,
            &application.status_id,
            application.duration,
            &action.actor_name,
        );
    }

    // ---- state changes ----

    #[allow(clippy::too_many_arguments)]
    fn deal_damage(
        &mut self,
        source: Option<&CharacterId>,
        target_id: &CharacterId,
        amount: u32,
        ability: Option<&str>,
        is_critical: bool,
        scaling_text: &str,
        fire_triggers: bool,
    ) {
        let Some(target) = self.field.get_mut(target_id) else {
            return;
        };
        if !target.is_alive() {
            return;
        }

        let shield = self.effects.absorb_damage(target, amount);
        let applied = self.damage.apply_damage(target, shield.remaining);
        let target_name = target.name.clone();
        let new_health = target.current_hp;
        let max_health = target.stats.hp;
        let effects_after_shield = (!shield.depleted.is_empty()).then(|| {
            target
                .status_effects
                .iter()
                .map(|e| e.effect_id.clone())
                .collect::<Vec<_>>()
        });

        let attacker = source
            .map(|id| self.field.name_of(id))
            .unwrap_or_else(|| "Something".to_string());
        if let Some(source) = source {
            *self.damage_dealt.entry(source.clone()).or_insert(0) += applied.actual_damage;
        }

        let mut text = format!("{} deals {}", attacker, applied.actual_damage);
        if !scaling_text.is_empty() {
            let _ = write!(text, " {}", scaling_text);
        }
        let _ = write!(text, " to {}", target_name);
        if let Some(ability) = ability {
            let _ = write!(text, " with {}", ability);
        }
        if shield.absorbed > 0 {
            let _ = write!(text, " ({} absorbed)", shield.absorbed);
        }
        if is_critical {
            text.push_str(" [CRITICAL]");
        }
        self.log.push(self.turn, text);

        self.events.emit(BattleEvent::CharacterDamaged {
            character: target_id.clone(),
            amount: applied.actual_damage,
            absorbed: shield.absorbed,
            new_health,
            max_health,
            source: source.cloned(),
            ability: ability.map(str::to_string),
            is_critical,
        });
        if let Some(effects) = effects_after_shield {
            self.events.emit(BattleEvent::StatusEffectsChanged {
                character: target_id.clone(),
                effects,
            });
        }

        if applied.killed {
            self.handle_death(target_id, source, fire_triggers);
        }

        if !fire_triggers {
            return;
        }
        if let Some(source) = source {
            if applied.actual_damage > 0 {
                let data = TriggerData::from_source(source, applied.actual_damage)
                    .with_target(target_id)
                    .with_ability(ability);
                self.run_passives(Trigger::DamageTaken, target_id, data.clone());
                self.run_passives(Trigger::DamageDealt, source, data);
            }
            if applied.killed {
                let data = TriggerData::from_source(source, applied.actual_damage)
                    .with_target(target_id)
                    .with_ability(ability);
                self.run_passives(Trigger::Kill, source, data);
            }
        }
    }

    /// Heal a living character. Defeated characters only come back through
    /// revival-class status effects.
    #[allow(clippy::too_many_arguments)]
    fn heal(
        &mut self,
        source: Option<&CharacterId>,
        target_id: &CharacterId,
        amount: u32,
        ability: Option<&str>,
        is_critical: bool,
        scaling_text: &str,
        fire_triggers: bool,
    ) {
        let Some(target) = self.field.get_mut(target_id) else {
            return;
        };
        if !target.is_alive() {
            return;
        }

        let applied = self.healing.apply_healing(target, amount);
        let target_name = target.name.clone();
        let new_health = target.current_hp;
        let max_health = target.stats.hp;

        let healer = source
            .map(|id| self.field.name_of(id))
            .unwrap_or_else(|| target_name.clone());
        if let Some(source) = source {
            *self.healing_done.entry(source.clone()).or_insert(0) += applied.actual_healing;
        }

        let mut text = if healer == target_name {
            format!("{} recovers {}", target_name, applied.actual_healing)
        } else {
            format!("{} heals {} for {}", healer, target_name, applied.actual_healing)
        };
        if !scaling_text.is_empty() {
            let _ = write!(text, " {}", scaling_text);
        }
        if let Some(ability) = ability {
            let _ = write!(text, " with {}", ability);
        }
        if is_critical {
            text.push_str(" [CRITICAL]");
        }
        self.log.push(self.turn, text);

        self.events.emit(BattleEvent::CharacterHealed {
            character: target_id.clone(),
            amount: applied.actual_healing,
            new_health,
            max_health,
            source: source.cloned(),
            ability: ability.map(str::to_string),
        });

        if fire_triggers && applied.actual_healing > 0 {
            let data = TriggerData {
                source: source.cloned(),
                amount: Some(applied.actual_healing),
                ability: ability.map(str::to_string),
                ..TriggerData::default()
            };
            self.run_passives(Trigger::Healed, target_id, data);
        }
    }

    fn handle_death(
        &mut self,
        id: &CharacterId,
        killer: Option<&CharacterId>,
        fire_triggers: bool,
    ) {
        let Some(character) = self.field.get_mut(id) else {
            return;
        };
        character.is_dead = true;
        let cleared = self.effects.clear_on_death(character);
        let name = character.name.clone();
        let team = character.team;
        let remaining: Vec<String> = character
            .status_effects
            .iter()
            .map(|e| e.effect_id.clone())
            .collect();

        tracing::debug!("{} defeated", name);
        self.log.push(self.turn, format!("{} has been defeated!", name));
        self.events.emit(BattleEvent::CharacterDefeated {
            character: id.clone(),
            source: killer.cloned(),
        });
        if !cleared.is_empty() {
            self.events.emit(BattleEvent::StatusEffectsChanged {
                character: id.clone(),
                effects: remaining,
            });
        }

        if !fire_triggers {
            return;
        }
        let allies: Vec<CharacterId> = self
            .field
            .living(team)
            .iter()
            .map(|c| c.id.clone())
            .collect();
        for ally in allies {
            let data = TriggerData {
                source: killer.cloned(),
                target: Some(id.clone()),
                ..TriggerData::default()
            };
            self.run_passives(Trigger::AllyDefeated, &ally, data);
        }
    }

    fn process_status_effects(&mut self, id: &CharacterId) {
        let Some(character) = self.field.get_mut(id) else {
            return;
        };
        if character.status_effects.is_empty() {
            return;
        }

        let report = self
            .effects
            .process_status_effects(character, &self.damage, &self.healing);
        let name = character.name.clone();
        let max_health = character.stats.hp;
        let effects: Vec<String> = character
            .status_effects
            .iter()
            .map(|e| e.effect_id.clone())
            .collect();

        for tick in &report.ticks {
            match tick.effect_type {
                EffectType::Damage => {
                    self.log.push(
                        self.turn,
                        format!("{} takes {} damage from {}", name, tick.amount, tick.effect_name),
                    );
                    self.events.emit(BattleEvent::CharacterDamaged {
                        character: id.clone(),
                        amount: tick.amount,
                        absorbed: 0,
                        new_health: tick.new_health,
                        max_health,
                        source: None,
                        ability: Some(tick.effect_name.clone()),
                        is_critical: false,
                    });
                }
                _ => {
                    self.log.push(
                        self.turn,
                        format!("{} recovers {} from {}", name, tick.amount, tick.effect_name),
                    );
                    self.events.emit(BattleEvent::CharacterHealed {
                        character: id.clone(),
                        amount: tick.amount,
                        new_health: tick.new_health,
                        max_health,
                        source: None,
                        ability: Some(tick.effect_name.clone()),
                    });
                }
            }
        }

        if report.changed() {
            self.events.emit(BattleEvent::StatusEffectsChanged {
                character: id.clone(),
                effects,
            });
        }

        if report.killed() {
            self.handle_death(id, None, true);
        }
        if report.revived() {
            self.revive(id);
        }
    }

    fn revive(&mut self, id: &CharacterId) {
        let Some(character) = self.field.get_mut(id) else {
            return;
        };
        if check_and_reset_death_status(character) == DeathStatusChange::Revived {
            let name = character.name.clone();
            let new_health = character.current_hp;
            tracing::debug!("{} revived", name);
            self.log.push(self.turn, format!("{} is revived!", name));
            self.events.emit(BattleEvent::CharacterRevived {
                character: id.clone(),
                new_health,
            });
        }
    }

    fn apply_status(
        &mut self,
        target_id: &CharacterId,
        status_id: &str,
        duration: Option<i32>,
        source: &str,
    ) -> bool {
        let Some(target) = self.field.get_mut(target_id) else {
            return false;
        };
        let Some(outcome) = self.effects.add_effect(target, status_id, duration, source) else {
            return false;
        };

        let effect_name = self
            .effects
            .catalog()
            .get(status_id)
            .map(|d| d.name.clone())
            .unwrap_or_else(|| status_id.to_string());
        let name = target.name.clone();
        let effects: Vec<String> = target
            .status_effects
            .iter()
            .map(|e| e.effect_id.clone())
            .collect();

        let text = match outcome {
            AddOutcome::Applied => format!("{} is affected by {}", name, effect_name),
            AddOutcome::Stacked { stacks } => {
                format!("{}'s {} stacks to {}", name, effect_name, stacks)
            }
            AddOutcome::Refreshed => format!("{}'s {} is refreshed", name, effect_name),
        };
        self.log.push(self.turn, text);
        self.events.emit(BattleEvent::StatusEffectsChanged {
            character: target_id.clone(),
            effects,
        });
        true
    }

    // ---- passives ----

    fn run_passives(&mut self, trigger: Trigger, id: &CharacterId, data: TriggerData) {
        let results = self.passives.process_passives(
            trigger,
            id,
            &data,
            &self.field,
            self.tracker.as_mut(),
            &mut self.rng,
        );
        for result in results {
            self.apply_passive(result);
        }
    }

    /// Effects from passives never fire further triggers
    fn apply_passive(&mut self, result: PassiveResult) {
        self.log.push(self.turn, result.message.clone());
        self.events.emit(BattleEvent::PassiveTriggered {
            character: result.character.clone(),
            message: result.message.clone(),
        });

        let owner = self.field.name_of(&result.character);
        for effect in result.effects {
            match effect {
                PassiveEffect::Heal { target, amount } => self.heal(
                    Some(&result.character),
                    &target,
                    amount,
                    Some(&result.passive),
                    false,
                    "",
                    false,
                ),
                PassiveEffect::Damage { target, amount } => self.deal_damage(
                    Some(&result.character),
                    &target,
                    amount,
                    Some(&result.passive),
                    false,
                    "",
                    false,
                ),
                PassiveEffect::ApplyStatus {
                    target,
                    status_id,
                    duration,
                } => {
                    self.apply_status(&target, &status_id, duration, &owner);
                }
            }
        }
    }
}
