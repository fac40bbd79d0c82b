//! Raid mechanics for the Uprising coordination core.
//!
//! This crate owns everything that happens between "a rebel wants to hit
//! a corporation" and "the raid resolved": party lifecycle, battle
//! planning, countdown state transitions, the execution engine, and the
//! corporate countermeasure tracker. It is deliberately free of timers
//! and I/O; the service layer drives these functions and owns the clock.
//!
//! ## Modules
//!
//! - [`party`]: party board, membership index, and lifecycle transitions
//! - [`plan`]: team bonuses, role assignment, battle plans, countdowns
//! - [`execution`]: damage, loot, and retaliation resolution
//! - [`countermeasures`]: corporate countermeasures and threat intel
//! - [`persistence`]: the write-through storage capability
//! - [`rng`]: deterministic pseudo-random stream for raid rolls
//! - [`error`]: the raid error taxonomy

pub mod countermeasures;
pub mod error;
pub mod execution;
pub mod party;
pub mod persistence;
pub mod plan;
pub mod rng;

pub use error::RaidError;
pub use execution::execute_raid;
pub use party::{LeaveOutcome, MIN_JOIN_ENERGY, MIN_LEADER_ENERGY, PartyBoard, member_count};
pub use persistence::{NoOpPersistence, Persistence, PersistenceError};
pub use plan::{
    SYNERGY_CLASS_THRESHOLD, abort, assign_roles, begin_countdown, compute_bonuses,
    create_battle_plan,
};
pub use rng::RaidRng;
