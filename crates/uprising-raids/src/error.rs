//! Error types for the `uprising-raids` crate.
//!
//! Every variant except [`RaidError::DataIntegrity`] is recoverable by the
//! caller: the operation simply did not apply its effect and the condition
//! is reported back to the invoking layer. `DataIntegrity` signals a broken
//! cross-registry reference (a party pointing at a corporation or formation
//! that no longer exists) and is asserted instead of silently proceeding.

use uprising_types::{RebelClass, UserId};
use uprising_world::WorldError;

/// Errors that can occur during raid-party operations.
#[derive(Debug, thiserror::Error)]
pub enum RaidError {
    /// The referenced party does not exist.
    #[error("raid party not found")]
    NotFound,

    /// The user is already a member of some party.
    #[error("{user} is already in a raid party")]
    AlreadyInParty {
        /// The user who attempted the operation.
        user: UserId,
    },

    /// The user does not have enough energy for the operation.
    #[error("insufficient energy: need {required}, have {available}")]
    InsufficientEnergy {
        /// Energy the operation requires.
        required: u32,
        /// Energy the user currently has.
        available: u32,
    },

    /// The party is below the formation's minimum size.
    #[error("insufficient members: formation needs {required}, party has {current}")]
    InsufficientMembers {
        /// Formation minimum.
        required: u32,
        /// Current member count.
        current: u32,
    },

    /// The party is no longer recruiting (state is past Forming).
    #[error("party is not recruiting")]
    NotRecruiting,

    /// The party is at the formation's member cap.
    #[error("party is full (max {max})")]
    PartyFull {
        /// Formation maximum.
        max: u32,
    },

    /// The formation's class allow-list excludes the user's class.
    #[error("class {class:?} is not eligible for this formation")]
    ClassNotEligible {
        /// The rejected class.
        class: RebelClass,
    },

    /// The caller is not the party leader.
    #[error("only the party leader may do that")]
    NotLeader,

    /// The party has no battle plan yet.
    #[error("party has no battle plan")]
    NoBattlePlan,

    /// Not every member has marked ready.
    #[error("not all members are ready ({ready}/{total})")]
    NotAllReady {
        /// Members currently ready.
        ready: u32,
        /// Total members.
        total: u32,
    },

    /// A countdown is already running.
    #[error("party is already executing")]
    AlreadyExecuting,

    /// Abort requested but no countdown is running.
    #[error("party is not executing")]
    NotExecuting,

    /// A stored cross-registry reference points at a missing entity.
    #[error("data integrity violation: {context}")]
    DataIntegrity {
        /// Description of the broken reference.
        context: String,
    },

    /// Arithmetic overflow during a checked computation.
    #[error("arithmetic overflow in raid calculation: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },

    /// A registry operation failed.
    #[error("world registry error: {source}")]
    World {
        /// The underlying registry error.
        #[from]
        source: WorldError,
    },
}
