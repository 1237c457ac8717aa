//! Live item type and category definitions supplied by the host.
//!
//! The catalog is how the engine learns which definition names currently
//! resolve. The resolver uses it to find an item's categories, and
//! snapshot loading uses it to drop overrides whose definitions were
//! removed between sessions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use stowage_types::{Category, CategoryId, ItemType, ItemTypeId};

use crate::error::WeightError;

/// Definition lookup by stable name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionCatalog {
    /// Item types by definition name.
    items: BTreeMap<ItemTypeId, ItemType>,
    /// Categories by definition name.
    categories: BTreeMap<CategoryId, Category>,
}

impl DefinitionCatalog {
    /// Create an empty catalog.
    pub const fn new() -> Self {
        Self {
            items: BTreeMap::new(),
            categories: BTreeMap::new(),
        }
    }

    /// Build a catalog from definition lists. Later duplicates replace
    /// earlier ones.
    pub fn from_definitions(
        items: impl IntoIterator<Item = ItemType>,
        categories: impl IntoIterator<Item = Category>,
    ) -> Self {
        let mut catalog = Self::new();
        for category in categories {
            catalog.insert_category(category);
        }
        for item in items {
            catalog.insert_item(item);
        }
        catalog
    }

    /// Add or replace an item type definition.
    pub fn insert_item(&mut self, item: ItemType) -> Option<ItemType> {
        self.items.insert(item.id.clone(), item)
    }

    /// Add or replace a category definition.
    pub fn insert_category(&mut self, category: Category) -> Option<Category> {
        self.categories.insert(category.id.clone(), category)
    }

    /// Remove an item type definition.
    pub fn remove_item(&mut self, id: &ItemTypeId) -> Option<ItemType> {
        self.items.remove(id)
    }

    /// Remove a category definition.
    pub fn remove_category(&mut self, id: &CategoryId) -> Option<Category> {
        self.categories.remove(id)
    }

    /// Look up an item type.
    pub fn item(&self, id: &ItemTypeId) -> Option<&ItemType> {
        self.items.get(id)
    }

    /// Look up a category.
    pub fn category(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.get(id)
    }

    /// Look up an item type, failing with [`WeightError::UnknownItemType`].
    pub fn require_item(&self, id: &ItemTypeId) -> Result<&ItemType, WeightError> {
        self.item(id)
            .ok_or_else(|| WeightError::UnknownItemType(id.clone()))
    }

    /// Look up a category, failing with [`WeightError::UnknownCategory`].
    pub fn require_category(&self, id: &CategoryId) -> Result<&Category, WeightError> {
        self.category(id)
            .ok_or_else(|| WeightError::UnknownCategory(id.clone()))
    }

    /// Whether an item type name resolves.
    pub fn contains_item(&self, id: &ItemTypeId) -> bool {
        self.items.contains_key(id)
    }

    /// Whether a category name resolves.
    pub fn contains_category(&self, id: &CategoryId) -> bool {
        self.categories.contains_key(id)
    }

    /// Number of item type definitions.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Number of category definitions.
    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    /// Iterate over every item type in name order.
    pub fn items(&self) -> impl Iterator<Item = &ItemType> {
        self.items.values()
    }

    /// Iterate over every category in name order.
    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.values()
    }
}
