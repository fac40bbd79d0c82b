//! Shared type definitions for the Uprising raid-coordination core.
//!
//! This crate is the single source of truth for all types used across the
//! Uprising workspace. Nothing here performs I/O or holds behavior beyond
//! small invariant-preserving helpers; the logic crates build on these.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe identifier wrappers (UUID v7 for generated ids,
//!   string-backed newtypes for external identities and catalog keys)
//! - [`enums`] -- Enumeration types (classes, roles, party lifecycle,
//!   strategies, countermeasures, threat tiers)
//! - [`structs`] -- Core entity structs (corporations, rebels, formations,
//!   raid parties, battle plans, outcomes, stashes)

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{CountermeasureKind, PartyState, RaidRole, RaidStrategy, RebelClass, ThreatTier};
pub use ids::{CorporationId, CountermeasureId, FormationId, PartyId, UserId};
pub use structs::{
    BattlePlan, Corporation, CorporateIntel, Countermeasure, CountermeasureState, Formation,
    LootItem, RaidOutcome, RaidParty, Rebel, Stash, StashItem, TeamBonuses,
};
