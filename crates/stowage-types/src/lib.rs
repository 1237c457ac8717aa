//! Shared type definitions for the Stowage storage priority engine.
//!
//! Every crate in the workspace speaks in these types. They are serde
//! serializable and export `TypeScript` bindings via `ts-rs` for operator
//! tooling.
//!
//! # Modules
//!
//! - [`ids`] -- Location UUIDs and definition-name identifiers
//! - [`enums`] -- Storage priority scale, operator gestures, weight provenance
//! - [`structs`] -- Item and category definitions, cells, placement jobs
//! - [`snapshot`] -- Persisted registry and session layout

pub mod enums;
pub mod ids;
pub mod snapshot;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{StoragePriority, WeightGesture, WeightSource};
pub use ids::{CategoryId, ItemTypeId, LocationId};
pub use snapshot::{
    GameSnapshot, LocationWeightsRecord, RegistrySnapshot, SNAPSHOT_FORMAT_VERSION, SessionState,
};
pub use structs::{Category, Cell, ItemType, Job};
