//! Registries for the Uprising game world.
//!
//! This crate owns the state stores the raid logic operates on:
//! corporations (targets), rebels (players), the formation catalog, and
//! per-rebel loot stashes. Everything lives in explicit registry objects
//! that a service injects where needed -- no process-wide singletons.
//!
//! # Modules
//!
//! - [`corporations`] -- [`CorporationRegistry`] plus the starting roster.
//! - [`error`] -- Error types for registry operations.
//! - [`formations`] -- [`FormationCatalog`] plus the starting presets.
//! - [`rebels`] -- [`RebelRegistry`] with energy/loyalty/damage mutators
//!   and inactivity eviction.
//! - [`stash`] -- [`StashStore`] with checked credit and capacity-guarded
//!   item deposits.

pub mod corporations;
pub mod error;
pub mod formations;
pub mod rebels;
pub mod stash;

// Re-export primary types at crate root.
pub use corporations::{CorporationRegistry, seed_corporations};
pub use error::WorldError;
pub use formations::{FormationCatalog, seed_formations};
pub use rebels::RebelRegistry;
pub use stash::StashStore;
