//! Configuration, countdown scheduling, and the service facade for the
//! Uprising raid-coordination core.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `uprising-config.yaml` into
//!   strongly-typed structs.
//! - [`error`] -- The service-level [`CoreError`] type.
//! - [`scheduler`] -- Cancellable countdown timers per party.
//! - [`service`] -- [`RaidService`], the single entry point for the
//!   presentation layer.
//!
//! [`CoreError`]: error::CoreError
//! [`RaidService`]: service::RaidService

pub mod config;
pub mod error;
pub mod scheduler;
pub mod service;

pub use config::{ConfigError, GameConfig};
pub use error::CoreError;
pub use scheduler::{CountdownTimers, TimerRegistry};
pub use service::{GameState, RaidService};
