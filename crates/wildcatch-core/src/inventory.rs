//! Inventory collaborator: capture items and their stock.
//!
//! The core never tracks quantities itself. Before a capture device is thrown
//! it asks [`Inventory::is_available`], takes the encounter latch, and only
//! then calls [`Inventory::consume_one`]. A refused consume aborts the throw.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identifier for an inventory item.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(String);

impl ItemId {
    /// Creates an item id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemId({})", self.0)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A throwable capture device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureItem {
    /// Inventory key.
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// Multiplier applied to the species catch rate.
    pub catch_multiplier: f32,
}

impl CaptureItem {
    /// Creates a capture item.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, catch_multiplier: f32) -> Self {
        Self {
            id: ItemId::new(id),
            name: name.into(),
            catch_multiplier,
        }
    }

    /// Catch multiplier with negative values treated as zero.
    #[must_use]
    pub fn effective_multiplier(&self) -> f32 {
        if self.catch_multiplier.is_finite() {
            self.catch_multiplier.max(0.0)
        } else {
            0.0
        }
    }
}

/// Item stock as seen by the core.
pub trait Inventory {
    /// Units currently held.
    fn quantity(&self, item: &ItemId) -> u32;

    /// True when at least one unit is held.
    fn is_available(&self, item: &ItemId) -> bool {
        self.quantity(item) > 0
    }

    /// Removes one unit. Returns `false` if nothing was removed.
    fn consume_one(&mut self, item: &ItemId) -> bool;
}

/// Reference inventory: a plain item → quantity map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Satchel {
    items: BTreeMap<ItemId, u32>,
}

impl Satchel {
    /// Creates an empty satchel.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `amount` units of `item`.
    pub fn add(&mut self, item: impl Into<ItemId>, amount: u32) {
        let entry = self.items.entry(item.into()).or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    /// Iterates held items in id order, skipping empty entries.
    pub fn iter(&self) -> impl Iterator<Item = (&ItemId, u32)> + '_ {
        self.items
            .iter()
            .filter(|(_, qty)| **qty > 0)
            .map(|(id, qty)| (id, *qty))
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Inventory for Satchel {
    fn quantity(&self, item: &ItemId) -> u32 {
        self.items.get(item).copied().unwrap_or(0)
    }

    fn consume_one(&mut self, item: &ItemId) -> bool {
        match self.items.get_mut(item) {
            Some(qty) if *qty > 0 => {
                *qty -= 1;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consume_decrements_until_empty() {
        let mut satchel = Satchel::new();
        satchel.add("orb", 2);
        let orb = ItemId::new("orb");

        assert!(satchel.consume_one(&orb));
        assert!(satchel.consume_one(&orb));
        assert!(!satchel.consume_one(&orb));
        assert!(!satchel.is_available(&orb));
        assert_eq!(satchel.iter().count(), 0);
    }

    #[test]
    fn unknown_item_is_unavailable() {
        let mut satchel = Satchel::new();
        let ghost = ItemId::new("ghost");
        assert_eq!(satchel.quantity(&ghost), 0);
        assert!(!satchel.consume_one(&ghost));
    }

    #[test]
    fn negative_multiplier_is_zero() {
        let item = CaptureItem::new("cursed", "Cursed Orb", -3.0);
        assert!(item.effective_multiplier().abs() < f32::EPSILON);
        let nan = CaptureItem::new("nan", "Broken Orb", f32::NAN);
        assert!(nan.effective_multiplier().abs() < f32::EPSILON);
    }
}
