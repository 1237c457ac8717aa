//! Strongly-typed identifiers.
//!
//! Storage locations are identified by host-issued UUID v7 tokens. The
//! registry never holds a reference to the location itself, only this id.
//!
//! Item types and categories are identified by their stable definition
//! names (`"Steel"`, `"ResourcesRaw"`). Those names survive save/load and
//! are the keys written into snapshots.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// The nil identifier. Hosts use it as the "no location" token.
            pub const fn nil() -> Self {
                Self(Uuid::nil())
            }

            /// Whether this is the nil identifier.
            pub const fn is_nil(&self) -> bool {
                self.0.is_nil()
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

/// Generates a newtype wrapper around a definition name.
macro_rules! define_def_name {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub String);

        impl $name {
            /// Wrap a definition name.
            pub fn new(name: impl Into<String>) -> Self {
                Self(name.into())
            }

            /// Borrow the definition name.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether the name is empty or whitespace. A blank name never
            /// refers to a live definition.
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(name: &str) -> Self {
                Self(name.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(name: String) -> Self {
                Self(name)
            }
        }
    };
}

define_id! {
    /// Unique identifier for a storage location (a storage building or a
    /// stockpile zone).
    LocationId
}

define_def_name! {
    /// Stable definition name of an item type.
    ItemTypeId
}

define_def_name! {
    /// Stable definition name of an item category.
    CategoryId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_location_ids_are_not_nil() {
        let id = LocationId::new();
        assert!(!id.is_nil());
        assert!(LocationId::nil().is_nil());
    }

    #[test]
    fn location_id_roundtrip_serde() {
        let original = LocationId::new();
        let json = serde_json::to_string(&original).ok();
        assert!(json.is_some());
        let restored: Result<LocationId, _> =
            serde_json::from_str(json.as_deref().unwrap_or(""));
        assert_eq!(restored.ok(), Some(original));
    }

    #[test]
    fn def_names_serialize_as_plain_strings() {
        let id = ItemTypeId::new("Steel");
        assert_eq!(serde_json::to_string(&id).ok().as_deref(), Some("\"Steel\""));
        assert_eq!(id.to_string(), "Steel");
    }

    #[test]
    fn blank_def_names_are_detected() {
        assert!(CategoryId::new("").is_blank());
        assert!(CategoryId::new("  ").is_blank());
        assert!(!CategoryId::new("Foods").is_blank());
    }
}
