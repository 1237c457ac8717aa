//! Destination resolution and engine state for Stowage.
//!
//! This crate sits between the host and the weight registry. It decides,
//! per storage job, whether operator weights should send an item somewhere
//! other than where the host would put it.
//!
//! # Modules
//!
//! - [`resolver`] -- [`DestinationResolver`]: weighted candidate rescoring
//!   and nearest-cell selection.
//! - [`host`] -- Traits the host implements for candidates and cell checks.
//! - [`service`] -- [`PriorityService`]: owned engine state and host hooks.
//! - [`session`] -- Per-game on/off toggle.
//! - [`config`] -- YAML configuration.
//! - [`error`] -- [`ResolveError`].

pub mod config;
pub mod error;
pub mod host;
pub mod resolver;
pub mod service;
pub mod session;

pub use config::{ConfigError, RescanTrigger, StowageConfig};
pub use error::ResolveError;
pub use host::{PlacementHost, StorageCandidate};
pub use resolver::{DestinationResolver, Resolution};
pub use service::PriorityService;
pub use session::SessionSettings;
