//! Error types for the `uprising-world` crate.
//!
//! All fallible registry operations return [`WorldError`] through the
//! standard [`Result`] type alias.

use uprising_types::{CorporationId, FormationId, UserId};

/// Errors that can occur during registry operations.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// A corporation was not found in the registry.
    #[error("corporation not found: {0}")]
    CorporationNotFound(CorporationId),

    /// A formation preset was not found in the catalog.
    #[error("formation not found: {0}")]
    FormationNotFound(FormationId),

    /// A rebel was not found in the registry.
    #[error("rebel not found: {0}")]
    RebelNotFound(UserId),

    /// A duplicate corporation was inserted where uniqueness is required.
    #[error("duplicate corporation id: {0}")]
    DuplicateCorporation(CorporationId),

    /// A duplicate formation was inserted where uniqueness is required.
    #[error("duplicate formation id: {0}")]
    DuplicateFormation(FormationId),

    /// A rebel with the same user id is already registered.
    #[error("rebel already registered: {0}")]
    DuplicateRebel(UserId),

    /// A stash has reached its item capacity.
    #[error("stash for {user} is full (capacity {capacity})")]
    StashFull {
        /// Owner of the full stash.
        user: UserId,
        /// The stash's item capacity.
        capacity: usize,
    },

    /// Arithmetic overflow during a checked operation.
    #[error("arithmetic overflow in world calculation: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },
}
