//! Per-location weight overrides and effective-score arithmetic.
//!
//! A [`WeightModel`] extends a location's base rank with small signed
//! offsets keyed by item type and by item category. Both maps are sparse:
//! a key is present only while its value is non-zero, so "has any
//! override" is an emptiness check and snapshots stay proportional to
//! actual customisation.
//!
//! # Precedence
//!
//! An item type's own non-zero override wins outright. Without one, the
//! weights of every category the item belongs to are summed and clamped to
//! the same `[-3, +3]` band a single override can express.

use std::collections::BTreeMap;

use tracing::debug;

use stowage_types::{CategoryId, ItemType, ItemTypeId, WeightGesture, WeightSource};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Lowest weight an override may hold.
pub const MIN_WEIGHT: i32 = -3;

/// Highest weight an override may hold.
pub const MAX_WEIGHT: i32 = 3;

/// The implicit weight of anything without an override.
pub const DEFAULT_WEIGHT: i32 = 0;

/// Clamp a raw value into `[MIN_WEIGHT, MAX_WEIGHT]`.
pub const fn clamp_weight(value: i32) -> i32 {
    if value < MIN_WEIGHT {
        MIN_WEIGHT
    } else if value > MAX_WEIGHT {
        MAX_WEIGHT
    } else {
        value
    }
}

/// Render a weight the way the operator's weight box shows it.
///
/// Zero renders as an empty string, positive weights carry an explicit `+`.
pub fn format_weight(weight: i32) -> String {
    match weight {
        0 => String::new(),
        w if w > 0 => format!("+{w}"),
        w => w.to_string(),
    }
}

// ---------------------------------------------------------------------------
// WeightModel
// ---------------------------------------------------------------------------

/// Sparse weight overrides owned by exactly one storage location.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeightModel {
    /// Item type overrides. Values are non-zero and within bounds.
    item_weights: BTreeMap<ItemTypeId, i32>,
    /// Category overrides. Values are non-zero and within bounds.
    category_weights: BTreeMap<CategoryId, i32>,
}

impl WeightModel {
    /// Create a model with no overrides.
    pub const fn new() -> Self {
        Self {
            item_weights: BTreeMap::new(),
            category_weights: BTreeMap::new(),
        }
    }

    // -------------------------------------------------------------------
    // Item type overrides
    // -------------------------------------------------------------------

    /// The override for an item type, or `0` when absent.
    pub fn get_item_weight(&self, item: &ItemTypeId) -> i32 {
        self.item_weights.get(item).copied().unwrap_or(DEFAULT_WEIGHT)
    }

    /// Set an item type override, clamped. Zero removes the key.
    ///
    /// Returns the value now in effect. A blank id is ignored.
    pub fn set_item_weight(&mut self, item: &ItemTypeId, value: i32) -> i32 {
        if item.is_blank() {
            return DEFAULT_WEIGHT;
        }
        let stored = write_weight(&mut self.item_weights, item, value);
        debug!(item = %item, weight = stored, "item weight set");
        stored
    }

    /// Shift an item type override by `delta`, clamped.
    pub fn adjust_item_weight(&mut self, item: &ItemTypeId, delta: i32) -> i32 {
        let target = self.get_item_weight(item).saturating_add(delta);
        self.set_item_weight(item, target)
    }

    /// Remove an item type override regardless of its value.
    pub fn reset_item_weight(&mut self, item: &ItemTypeId) {
        if self.item_weights.remove(item).is_some() {
            debug!(item = %item, "item weight reset");
        }
    }

    /// Apply one operator gesture to an item type override.
    pub fn apply_item_gesture(&mut self, item: &ItemTypeId, gesture: WeightGesture) -> i32 {
        match gesture {
            WeightGesture::Raise => self.adjust_item_weight(item, 1),
            WeightGesture::Lower => self.adjust_item_weight(item, -1),
            WeightGesture::Reset => {
                self.reset_item_weight(item);
                DEFAULT_WEIGHT
            }
        }
    }

    // -------------------------------------------------------------------
    // Category overrides
    // -------------------------------------------------------------------

    /// The override for a category, or `0` when absent.
    pub fn get_category_weight(&self, category: &CategoryId) -> i32 {
        self.category_weights
            .get(category)
            .copied()
            .unwrap_or(DEFAULT_WEIGHT)
    }

    /// Set a category override, clamped. Zero removes the key.
    ///
    /// Returns the value now in effect. A blank id is ignored.
    pub fn set_category_weight(&mut self, category: &CategoryId, value: i32) -> i32 {
        if category.is_blank() {
            return DEFAULT_WEIGHT;
        }
        let stored = write_weight(&mut self.category_weights, category, value);
        debug!(category = %category, weight = stored, "category weight set");
        stored
    }

    /// Shift a category override by `delta`, clamped.
    pub fn adjust_category_weight(&mut self, category: &CategoryId, delta: i32) -> i32 {
        let target = self.get_category_weight(category).saturating_add(delta);
        self.set_category_weight(category, target)
    }

    /// Remove a category override regardless of its value.
    pub fn reset_category_weight(&mut self, category: &CategoryId) {
        if self.category_weights.remove(category).is_some() {
            debug!(category = %category, "category weight reset");
        }
    }

    /// Apply one operator gesture to a category override.
    pub fn apply_category_gesture(
        &mut self,
        category: &CategoryId,
        gesture: WeightGesture,
    ) -> i32 {
        match gesture {
            WeightGesture::Raise => self.adjust_category_weight(category, 1),
            WeightGesture::Lower => self.adjust_category_weight(category, -1),
            WeightGesture::Reset => {
                self.reset_category_weight(category);
                DEFAULT_WEIGHT
            }
        }
    }

    // -------------------------------------------------------------------
    // Whole-model operations
    // -------------------------------------------------------------------

    /// Drop every override.
    pub fn reset_all(&mut self) {
        let cleared = self.override_count();
        self.item_weights.clear();
        self.category_weights.clear();
        if cleared > 0 {
            debug!(cleared, "all weights reset");
        }
    }

    /// Whether any item or category override exists.
    pub fn has_any_override(&self) -> bool {
        !self.item_weights.is_empty() || !self.category_weights.is_empty()
    }

    /// Number of overrides across both maps.
    pub fn override_count(&self) -> usize {
        self.item_weights
            .len()
            .saturating_add(self.category_weights.len())
    }

    /// Replace `other`'s overrides with a copy of this model's.
    pub fn copy_into(&self, other: &mut Self) {
        other.item_weights.clone_from(&self.item_weights);
        other.category_weights.clone_from(&self.category_weights);
    }

    /// Iterate over the item type overrides in key order.
    pub fn item_overrides(&self) -> impl Iterator<Item = (&ItemTypeId, i32)> {
        self.item_weights.iter().map(|(k, v)| (k, *v))
    }

    /// Iterate over the category overrides in key order.
    pub fn category_overrides(&self) -> impl Iterator<Item = (&CategoryId, i32)> {
        self.category_weights.iter().map(|(k, v)| (k, *v))
    }

    // -------------------------------------------------------------------
    // Scoring
    // -------------------------------------------------------------------

    /// The weight that applies to `item` at this location.
    pub fn effective_weight(&self, item: &ItemType) -> i32 {
        self.resolve_weight(item).0
    }

    /// Base rank plus effective weight. Not clamped: a weighted score may
    /// leave the 0..=5 band.
    pub fn effective_score(&self, base_rank: i32, item: &ItemType) -> i32 {
        base_rank.saturating_add(self.effective_weight(item))
    }

    /// The full derivation of an effective score, for logs and tooltips.
    pub fn explain(&self, base_rank: i32, item: &ItemType) -> ScoreBreakdown {
        let (weight, source) = self.resolve_weight(item);
        ScoreBreakdown {
            base: base_rank,
            weight,
            effective: base_rank.saturating_add(weight),
            source,
        }
    }

    fn resolve_weight(&self, item: &ItemType) -> (i32, WeightSource) {
        let own = self.get_item_weight(&item.id);
        if own != DEFAULT_WEIGHT {
            return (own, WeightSource::ItemOverride);
        }

        let sum = item
            .categories
            .iter()
            .map(|category| self.get_category_weight(category))
            .fold(DEFAULT_WEIGHT, i32::saturating_add);
        let weight = clamp_weight(sum);
        if weight == DEFAULT_WEIGHT {
            (DEFAULT_WEIGHT, WeightSource::Unweighted)
        } else {
            (weight, WeightSource::CategoryFallback)
        }
    }
}

/// Single write path for both override maps: clamp, then store or prune.
fn write_weight<K: Ord + Clone>(map: &mut BTreeMap<K, i32>, key: &K, value: i32) -> i32 {
    let clamped = clamp_weight(value);
    if clamped == DEFAULT_WEIGHT {
        map.remove(key);
    } else {
        map.insert(key.clone(), clamped);
    }
    clamped
}

// ---------------------------------------------------------------------------
// ScoreBreakdown
// ---------------------------------------------------------------------------

/// How an effective score was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreBreakdown {
    /// The location's base rank.
    pub base: i32,
    /// The weight added to it.
    pub weight: i32,
    /// `base + weight`.
    pub effective: i32,
    /// Where the weight came from.
    pub source: WeightSource,
}

impl core::fmt::Display for ScoreBreakdown {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} + {} = {}", self.base, self.weight, self.effective)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn steel() -> ItemType {
        ItemType::new(
            "Steel",
            vec![CategoryId::new("ResourcesRaw"), CategoryId::new("Metals")],
        )
    }

    #[test]
    fn set_clamps_every_value() {
        let mut model = WeightModel::new();
        let id = ItemTypeId::new("Steel");
        for v in -10..=10 {
            model.set_item_weight(&id, v);
            assert_eq!(model.get_item_weight(&id), v.clamp(MIN_WEIGHT, MAX_WEIGHT));
        }
        model.set_item_weight(&id, i32::MAX);
        assert_eq!(model.get_item_weight(&id), MAX_WEIGHT);
        model.set_item_weight(&id, i32::MIN);
        assert_eq!(model.get_item_weight(&id), MIN_WEIGHT);
    }

    #[test]
    fn zero_removes_the_key() {
        let mut model = WeightModel::new();
        let id = ItemTypeId::new("Steel");
        let cat = CategoryId::new("Foods");
        model.set_item_weight(&id, 2);
        model.set_category_weight(&cat, -1);
        assert_eq!(model.override_count(), 2);

        model.set_item_weight(&id, 0);
        model.adjust_category_weight(&cat, 1);
        assert!(!model.has_any_override());
        assert_eq!(model.override_count(), 0);
    }

    #[test]
    fn adjust_saturates_at_the_bound() {
        let mut model = WeightModel::new();
        let id = ItemTypeId::new("Steel");
        for _ in 0..7 {
            model.adjust_item_weight(&id, 1);
        }
        assert_eq!(model.get_item_weight(&id), 3);

        for _ in 0..10 {
            model.adjust_item_weight(&id, -1);
        }
        assert_eq!(model.get_item_weight(&id), -3);
    }

    #[test]
    fn blank_ids_are_ignored() {
        let mut model = WeightModel::new();
        assert_eq!(model.set_item_weight(&ItemTypeId::new(""), 2), 0);
        assert_eq!(model.set_category_weight(&CategoryId::new(" "), 2), 0);
        assert!(!model.has_any_override());
    }

    #[test]
    fn reset_all_clears_both_maps() {
        let mut model = WeightModel::new();
        model.set_item_weight(&ItemTypeId::new("Steel"), 1);
        model.set_category_weight(&CategoryId::new("Foods"), 1);
        model.reset_all();
        assert!(!model.has_any_override());
    }

    #[test]
    fn item_override_beats_categories() {
        let mut model = WeightModel::new();
        let item = steel();
        model.set_category_weight(&CategoryId::new("ResourcesRaw"), 3);
        model.set_category_weight(&CategoryId::new("Metals"), 3);
        model.set_item_weight(&item.id, -2);
        assert_eq!(model.effective_weight(&item), -2);
    }

    #[test]
    fn categories_sum_and_clamp() {
        let mut model = WeightModel::new();
        let item = steel();
        model.set_category_weight(&CategoryId::new("ResourcesRaw"), 2);
        model.set_category_weight(&CategoryId::new("Metals"), 2);
        assert_eq!(model.effective_weight(&item), 3);

        model.set_category_weight(&CategoryId::new("Metals"), -3);
        assert_eq!(model.effective_weight(&item), -1);
    }

    #[test]
    fn unrelated_categories_do_not_apply() {
        let mut model = WeightModel::new();
        model.set_category_weight(&CategoryId::new("Foods"), 3);
        assert_eq!(model.effective_weight(&steel()), 0);
    }

    #[test]
    fn effective_score_may_leave_the_rank_band() {
        let mut model = WeightModel::new();
        let item = steel();
        model.set_item_weight(&item.id, 3);
        assert_eq!(model.effective_score(5, &item), 8);
        model.set_item_weight(&item.id, -3);
        assert_eq!(model.effective_score(0, &item), -3);
    }

    #[test]
    fn gestures_step_and_reset() {
        let mut model = WeightModel::new();
        let id = ItemTypeId::new("Steel");
        assert_eq!(model.apply_item_gesture(&id, WeightGesture::Raise), 1);
        assert_eq!(model.apply_item_gesture(&id, WeightGesture::Raise), 2);
        assert_eq!(model.apply_item_gesture(&id, WeightGesture::Lower), 1);
        assert_eq!(model.apply_item_gesture(&id, WeightGesture::Reset), 0);
        assert!(!model.has_any_override());

        let cat = CategoryId::new("Foods");
        assert_eq!(model.apply_category_gesture(&cat, WeightGesture::Lower), -1);
        assert_eq!(model.get_category_weight(&cat), -1);
    }

    #[test]
    fn copy_into_replaces_target() {
        let mut source = WeightModel::new();
        source.set_item_weight(&ItemTypeId::new("Steel"), 2);
        let mut target = WeightModel::new();
        target.set_category_weight(&CategoryId::new("Foods"), -1);

        source.copy_into(&mut target);
        assert_eq!(target, source);

        // The copy is a snapshot, not a shared reference.
        source.reset_all();
        assert_eq!(target.get_item_weight(&ItemTypeId::new("Steel")), 2);
    }

    #[test]
    fn explain_reports_the_source() {
        let mut model = WeightModel::new();
        let item = steel();
        assert_eq!(model.explain(2, &item).source, WeightSource::Unweighted);

        model.set_category_weight(&CategoryId::new("Metals"), 1);
        let breakdown = model.explain(2, &item);
        assert_eq!(breakdown.source, WeightSource::CategoryFallback);
        assert_eq!(breakdown.effective, 3);
        assert_eq!(breakdown.to_string(), "2 + 1 = 3");

        model.set_item_weight(&item.id, -1);
        assert_eq!(model.explain(2, &item).source, WeightSource::ItemOverride);
    }

    #[test]
    fn format_weight_matches_box_text() {
        assert_eq!(format_weight(0), "");
        assert_eq!(format_weight(2), "+2");
        assert_eq!(format_weight(-3), "-3");
    }
}
