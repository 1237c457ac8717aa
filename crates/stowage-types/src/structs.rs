//! Core entity structs: definitions, positions, and placement jobs.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::{CategoryId, ItemTypeId};

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

/// Host definition of an item type.
///
/// Read-only to the engine. An item type may belong to several
/// categories; membership order is preserved but carries no meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ItemType {
    /// Stable definition name.
    pub id: ItemTypeId,
    /// Human-readable label.
    #[serde(default)]
    pub label: String,
    /// Categories this item type belongs to.
    #[serde(default)]
    pub categories: Vec<CategoryId>,
}

impl ItemType {
    /// Create an item type with no label and the given categories.
    pub fn new(id: impl Into<ItemTypeId>, categories: Vec<CategoryId>) -> Self {
        Self {
            id: id.into(),
            label: String::new(),
            categories,
        }
    }

    /// Label for display, falling back to the definition name.
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            self.id.as_str()
        } else {
            &self.label
        }
    }
}

/// Host definition of an item category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Category {
    /// Stable definition name.
    pub id: CategoryId,
    /// Human-readable label.
    #[serde(default)]
    pub label: String,
}

impl Category {
    /// Create a category with no label.
    pub fn new(id: impl Into<CategoryId>) -> Self {
        Self {
            id: id.into(),
            label: String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

/// A map cell on the horizontal plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Cell {
    /// Column.
    pub x: i32,
    /// Row.
    pub z: i32,
}

impl Cell {
    /// Create a cell.
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Squared horizontal distance to another cell.
    ///
    /// Computed in `i64` so any pair of `i32` coordinates fits; saturates
    /// rather than wrapping at the extreme corners of the range.
    pub fn distance_squared(self, other: Self) -> i64 {
        let dx = i64::from(self.x).saturating_sub(i64::from(other.x));
        let dz = i64::from(self.z).saturating_sub(i64::from(other.z));
        dx.saturating_mul(dx).saturating_add(dz.saturating_mul(dz))
    }
}

impl core::fmt::Display for Cell {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

// ---------------------------------------------------------------------------
// Job
// ---------------------------------------------------------------------------

/// A placement request for one item instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Job {
    /// The item's type.
    pub item_type: ItemTypeId,
    /// Where the item lies, if it is on the ground.
    #[serde(default)]
    pub item_position: Option<Cell>,
    /// Where the carrier stands, if the item is being carried.
    #[serde(default)]
    pub carrier_position: Option<Cell>,
}

impl Job {
    /// Create a job for an item lying at `position`.
    pub fn at(item_type: impl Into<ItemTypeId>, position: Cell) -> Self {
        Self {
            item_type: item_type.into(),
            item_position: Some(position),
            carrier_position: None,
        }
    }

    /// Mark the job as carried by someone standing at `position`.
    #[must_use]
    pub fn carried_from(mut self, position: Cell) -> Self {
        self.carrier_position = Some(position);
        self
    }

    /// The reference point for distance comparisons: the carrier if
    /// carried, otherwise the item itself.
    pub fn effective_position(&self) -> Option<Cell> {
        self.carrier_position.or(self.item_position)
    }
}
