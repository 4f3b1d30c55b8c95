//! Pluggable behaviors: targeting rules, action decisions, passive effects

pub mod decision;
pub mod ids;
pub mod passive;
pub mod registry;
pub mod targeting;

pub use ids::{DecisionRule, PassiveRule, TargetingRule};
pub use registry::{
    BehaviorRegistry, BehaviorResult, DecisionContext, DecisionFn, PassiveContext, PassiveEffect,
    PassiveFn, PassiveOutcome, TargetSelection, TargetingContext, TargetingFn,
};
