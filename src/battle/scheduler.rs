//! Cancellable step scheduling on a millisecond clock
//!
//! The orchestrator never blocks. It schedules its next step with a delay
//! and whoever drives the battle advances the clock: tests jump straight to
//! the next due step, the realtime runner sleeps for the peeked delay first.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Discrete pacing boundaries of a battle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BattleStep {
    TurnStart,
    ExecuteNextAction,
    TurnEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

pub trait Scheduler {
    /// Run `step` once `delay_ms` has elapsed on this clock
    fn schedule(&mut self, delay_ms: u64, step: BattleStep) -> TimerHandle;

    /// Returns false if the timer already fired or was cancelled
    fn cancel(&mut self, handle: TimerHandle) -> bool;

    fn cancel_all(&mut self);

    /// Next step that is due now, earliest first
    fn pop_due(&mut self) -> Option<BattleStep>;

    /// Milliseconds until the next pending step, 0 if one is already due
    fn peek_delay(&self) -> Option<u64>;

    /// Move the clock forward
    fn advance(&mut self, elapsed_ms: u64);

    fn now(&self) -> u64;

    fn pending(&self) -> usize;
}

/// Deterministic scheduler on a virtual clock.
///
/// Steps due at the same instant run in scheduling order.
#[derive(Debug, Clone, Default)]
pub struct VirtualScheduler {
    now: u64,
    next_id: u64,
    queue: BinaryHeap<Reverse<(u64, u64)>>,
    steps: AHashMap<u64, BattleStep>,
}

impl VirtualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop cancelled entries sitting at the front of the queue
    fn prune(&mut self) {
        while let Some(&Reverse((_, id))) = self.queue.peek() {
            if self.steps.contains_key(&id) {
                break;
            }
            self.queue.pop();
        }
    }
}

impl Scheduler for VirtualScheduler {
    fn schedule(&mut self, delay_ms: u64, step: BattleStep) -> TimerHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.queue.push(Reverse((self.now + delay_ms, id)));
        self.steps.insert(id, step);
        TimerHandle(id)
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        let removed = self.steps.remove(&handle.0).is_some();
        self.prune();
        removed
    }

    fn cancel_all(&mut self) {
        self.queue.clear();
        self.steps.clear();
    }

    fn pop_due(&mut self) -> Option<BattleStep> {
        self.prune();
        let Reverse((due, id)) = *self.queue.peek()?;
        if due > self.now {
            return None;
        }
        self.queue.pop();
        self.steps.remove(&id)
    }

    fn peek_delay(&self) -> Option<u64> {
        self.queue
            .iter()
            .filter(|Reverse((_, id))| self.steps.contains_key(id))
            .map(|Reverse((due, _))| due.saturating_sub(self.now))
            .min()
    }

    fn advance(&mut self, elapsed_ms: u64) {
        self.now += elapsed_ms;
    }

    fn now(&self) -> u64 {
        self.now
    }

    fn pending(&self) -> usize {
        self.steps.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_fire_in_due_order() {
        let mut scheduler = VirtualScheduler::new();
        scheduler.schedule(600, BattleStep::ExecuteNextAction);
        scheduler.schedule(400, BattleStep::TurnEnd);

        assert_eq!(scheduler.pop_due(), None);
        assert_eq!(scheduler.peek_delay(), Some(400));

        scheduler.advance(400);
        assert_eq!(scheduler.pop_due(), Some(BattleStep::TurnEnd));
        assert_eq!(scheduler.pop_due(), None);
        assert_eq!(scheduler.peek_delay(), Some(200));

        scheduler.advance(1000);
        assert_eq!(scheduler.pop_due(), Some(BattleStep::ExecuteNextAction));
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(scheduler.peek_delay(), None);
    }

    #[test]
    fn test_same_instant_keeps_schedule_order() {
        let mut scheduler = VirtualScheduler::new();
        scheduler.schedule(0, BattleStep::TurnEnd);
        scheduler.schedule(0, BattleStep::TurnStart);
        assert_eq!(scheduler.pop_due(), Some(BattleStep::TurnEnd));
        assert_eq!(scheduler.pop_due(), Some(BattleStep::TurnStart));
    }

    #[test]
    fn test_cancel() {
        let mut scheduler = VirtualScheduler::new();
        let first = scheduler.schedule(100, BattleStep::TurnStart);
        scheduler.schedule(200, BattleStep::TurnEnd);

        assert!(scheduler.cancel(first));
        assert!(!scheduler.cancel(first));
        assert_eq!(scheduler.peek_delay(), Some(200));

        scheduler.cancel_all();
        scheduler.advance(500);
        assert_eq!(scheduler.pop_due(), None);
        assert_eq!(scheduler.now(), 500);
    }
}
