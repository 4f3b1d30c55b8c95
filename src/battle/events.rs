//! Outbound battle events, listener fan-out and the text battle log

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

use crate::battle::orchestrator::{BattleOutcome, EndReason};
use crate::battle::planner::Action;
use crate::character::CharacterSnapshot;
use crate::core::error::SinkError;
use crate::core::types::{CharacterId, Turn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum BattleEvent {
    BattleStarted {
        player_team: Vec<CharacterSnapshot>,
        enemy_team: Vec<CharacterSnapshot>,
    },
    TurnStarted {
        turn_number: Turn,
    },
    CharacterAction {
        character: CharacterId,
        action: Action,
    },
    CharacterDamaged {
        character: CharacterId,
        amount: u32,
        /// Taken by shields before health
        absorbed: u32,
        new_health: u32,
        max_health: u32,
        source: Option<CharacterId>,
        ability: Option<String>,
        is_critical: bool,
    },
    CharacterHealed {
        character: CharacterId,
        amount: u32,
        new_health: u32,
        max_health: u32,
        source: Option<CharacterId>,
        ability: Option<String>,
    },
    CharacterDefeated {
        character: CharacterId,
        source: Option<CharacterId>,
    },
    CharacterRevived {
        character: CharacterId,
        new_health: u32,
    },
    StatusEffectsChanged {
        character: CharacterId,
        effects: Vec<String>,
    },
    PassiveTriggered {
        character: CharacterId,
        message: String,
    },
    BattleEnded {
        result: BattleOutcome,
        reason: EndReason,
        player_team: Vec<CharacterSnapshot>,
        enemy_team: Vec<CharacterSnapshot>,
    },
}

impl BattleEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            BattleEvent::BattleStarted { .. } => "BATTLE_STARTED",
            BattleEvent::TurnStarted { .. } => "TURN_STARTED",
            BattleEvent::CharacterAction { .. } => "CHARACTER_ACTION",
            BattleEvent::CharacterDamaged { .. } => "CHARACTER_DAMAGED",
            BattleEvent::CharacterHealed { .. } => "CHARACTER_HEALED",
            BattleEvent::CharacterDefeated { .. } => "CHARACTER_DEFEATED",
            BattleEvent::CharacterRevived { .. } => "CHARACTER_REVIVED",
            BattleEvent::StatusEffectsChanged { .. } => "STATUS_EFFECTS_CHANGED",
            BattleEvent::PassiveTriggered { .. } => "PASSIVE_TRIGGERED",
            BattleEvent::BattleEnded { .. } => "BATTLE_ENDED",
        }
    }
}

/// A consumer of battle events (renderer, sound, UI, recorder)
pub trait EventSink {
    fn on_event(&mut self, event: &BattleEvent) -> Result<(), SinkError>;
}

impl<F> EventSink for F
where
    F: FnMut(&BattleEvent) -> Result<(), SinkError>,
{
    fn on_event(&mut self, event: &BattleEvent) -> Result<(), SinkError> {
        self(event)
    }
}

/// Fans events out to every sink. Sink failures are logged and dropped.
#[derive(Default)]
pub struct EventBus {
    sinks: Vec<Box<dyn EventSink>>,
    failures: usize,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, sink: impl EventSink + 'static) {
        self.sinks.push(Box::new(sink));
    }

    pub fn emit(&mut self, event: BattleEvent) {
        for sink in self.sinks.iter_mut() {
            if let Err(e) = sink.on_event(&event) {
                self.failures += 1;
                tracing::warn!("{} dispatch failed: {}", event.kind(), e);
            }
        }
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Dispatches that failed since the bus was created
    pub fn failures(&self) -> usize {
        self.failures
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("sinks", &self.sinks.len())
            .field("failures", &self.failures)
            .finish()
    }
}

/// Sink that keeps every event; clones share the same buffer
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
    events: Arc<Mutex<Vec<BattleEvent>>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<BattleEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn count(&self, kind: &str) -> usize {
        self.events
            .lock()
            .map(|events| events.iter().filter(|e| e.kind() == kind).count())
            .unwrap_or(0)
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

impl EventSink for EventRecorder {
    fn on_event(&mut self, event: &BattleEvent) -> Result<(), SinkError> {
        let mut events = self
            .events
            .lock()
            .map_err(|_| SinkError("recorder lock poisoned".into()))?;
        events.push(event.clone());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleLogEntry {
    pub turn: Turn,
    pub text: String,
}

/// Append-only human-readable battle history
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleLog {
    entries: Vec<BattleLogEntry>,
}

impl BattleLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn, text: impl Into<String>) {
        self.entries.push(BattleLogEntry {
            turn,
            text: text.into(),
        });
    }

    pub fn entries(&self) -> &[BattleLogEntry] {
        &self.entries
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.text.as_str())
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().any(|line| line.contains(needle))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(n: Turn) -> BattleEvent {
        BattleEvent::TurnStarted { turn_number: n }
    }

    #[test]
    fn test_event_wire_shape() {
        let json = serde_json::to_value(turn(3)).unwrap();
        assert_eq!(json["type"], "TURN_STARTED");
        assert_eq!(json["turnNumber"], 3);
    }

    #[test]
    fn test_failing_sink_does_not_block_others() {
        let recorder = EventRecorder::new();
        let mut bus = EventBus::new();
        bus.subscribe(|_: &BattleEvent| -> Result<(), SinkError> {
            Err(SinkError("listener threw".into()))
        });
        bus.subscribe(recorder.clone());

        bus.emit(turn(1));
        bus.emit(turn(2));

        assert_eq!(bus.failures(), 2);
        assert_eq!(recorder.events(), vec![turn(1), turn(2)]);
        assert_eq!(recorder.count("TURN_STARTED"), 2);
    }

    #[test]
    fn test_log_is_ordered() {
        let mut log = BattleLog::new();
        log.push(1, "Turn 1 begins!");
        log.push(1, "Ayla deals 12 to Bram");
        assert_eq!(log.len(), 2);
        assert_eq!(log.lines().next(), Some("Turn 1 begins!"));
        assert!(log.contains("deals 12"));
    }
}
