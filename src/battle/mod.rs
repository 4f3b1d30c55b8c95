//! Battle flow - turn loop, planning, passives and outbound events
//!
//! The orchestrator owns every live character and is the only writer.
//! Planning, targeting and passive dispatch read the battlefield and hand
//! back descriptions; the orchestrator applies them in order.

pub mod battlefield;
pub mod events;
pub mod orchestrator;
pub mod passives;
pub mod planner;
pub mod scheduler;
pub mod targeting;
pub mod triggers;

pub use battlefield::Battlefield;
pub use events::{BattleEvent, BattleLog, BattleLogEntry, EventBus, EventRecorder, EventSink};
pub use orchestrator::{
    check_battle_end, BattleOrchestrator, BattleOutcome, BattlePhase, BattleReport, EndReason,
};
pub use passives::{PassiveEngine, PassiveResult};
pub use planner::{Action, ActionKind, ActionPlanner, PlanSkip, PlannedHit};
pub use scheduler::{BattleStep, Scheduler, TimerHandle, VirtualScheduler};
pub use targeting::TargetResolver;
pub use triggers::{Trigger, TriggerData, TriggerTracker};
