//! Data models for the wishlist.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Percentage at which an item leaves the low tier.
pub const MID_TIER_THRESHOLD: f64 = 31.0;

/// Percentage at which an item is complete.
pub const COMPLETE_THRESHOLD: f64 = 100.0;

/// Half a cent. Amounts closer than this are the same amount.
pub const MONEY_TOLERANCE: f64 = 0.005;

/// Stable identifier of a wishlist item. Not reused within a list unless the id space wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Progress band driving presentation and deposit eligibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Low,
    Mid,
    Complete,
}

impl Tier {
    /// Classify a percentage.
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= COMPLETE_THRESHOLD {
            Tier::Complete
        } else if percentage >= MID_TIER_THRESHOLD {
            Tier::Mid
        } else {
            Tier::Low
        }
    }

    /// Completion disables further deposits.
    pub fn accepts_deposits(self) -> bool {
        self != Tier::Complete
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::Low => "seedling",
            Tier::Mid => "growing",
            Tier::Complete => "completed",
        }
    }
}

/// Derived progress of an item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Progress {
    pub percentage: f64,
    pub tier: Tier,
}

impl Progress {
    /// Compute progress for a saved amount against a target price.
    ///
    /// A zero price counts as complete as soon as anything is saved.
    pub fn compute(price: f64, saved: f64) -> Self {
        let percentage = if price > 0.0 {
            saved.clamp(0.0, price) / price * 100.0
        } else if saved > 0.0 {
            100.0
        } else {
            0.0
        };

        Self {
            percentage,
            tier: Tier::from_percentage(percentage),
        }
    }
}

/// A single savings goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishItem {
    pub id: ItemId,
    pub name: String,
    pub price: f64,
    pub saved_amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_uri: Option<String>,
}

impl WishItem {
    /// Amount still missing; never negative.
    pub fn remaining(&self) -> f64 {
        (self.price - self.saved_amount).max(0.0)
    }

    pub fn progress(&self) -> Progress {
        Progress::compute(self.price, self.saved_amount)
    }

    pub fn is_complete(&self) -> bool {
        self.progress().tier == Tier::Complete
    }
}

/// A validated item that has not been given an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDraft {
    pub name: String,
    pub price: f64,
    pub saved_amount: f64,
    pub image_uri: Option<String>,
}

impl ItemDraft {
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            price,
            saved_amount: 0.0,
            image_uri: None,
        }
    }

    pub fn with_image(mut self, image_uri: Option<String>) -> Self {
        self.image_uri = image_uri;
        self
    }
}

/// The ordered collection of items plus the id allocator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Wishlist {
    items: Vec<WishItem>,
    next_id: u64,
}

impl Wishlist {
    /// Create a new empty wishlist.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a list from stored items, keeping their order and ids.
    ///
    /// The allocator resumes after the highest id present.
    pub fn from_items(items: Vec<WishItem>) -> Self {
        let next_id = items
            .iter()
            .map(|i| i.id.0.saturating_add(1))
            .max()
            .unwrap_or(0);
        Self { items, next_id }
    }

    /// Hand out the next unused id.
    ///
    /// Once the id space is exhausted the counter wraps and skips ids still in use.
    pub fn allocate_id(&mut self) -> ItemId {
        let mut candidate = self.next_id;
        while self.get(ItemId(candidate)).is_some() {
            candidate = candidate.wrapping_add(1);
        }
        self.next_id = candidate.wrapping_add(1);
        ItemId(candidate)
    }

    /// Append a draft at the end of the list.
    pub fn push(&mut self, draft: ItemDraft) -> ItemId {
        let id = self.allocate_id();
        self.items.push(WishItem {
            id,
            name: draft.name,
            price: draft.price,
            saved_amount: draft.saved_amount,
            image_uri: draft.image_uri,
        });
        id
    }

    pub fn items(&self) -> &[WishItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Current 0-based position of an item.
    pub fn position(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    pub fn get(&self, id: ItemId) -> Option<&WishItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut WishItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    /// Item at a 0-based position.
    pub fn at(&self, position: usize) -> Option<&WishItem> {
        self.items.get(position)
    }

    /// Remove an item; later items shift down by one.
    pub fn remove(&mut self, id: ItemId) -> Option<WishItem> {
        let position = self.position(id)?;
        Some(self.items.remove(position))
    }

    /// Total saved across all items.
    pub fn total_saved(&self) -> f64 {
        self.items.iter().map(|i| i.saved_amount).sum()
    }

    /// Total of all target prices.
    pub fn total_price(&self) -> f64 {
        self.items.iter().map(|i| i.price).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_tiers() {
        assert_eq!(Progress::compute(1000.0, 0.0).tier, Tier::Low);
        assert_eq!(Progress::compute(1000.0, 300.0).tier, Tier::Low);
        assert_eq!(Progress::compute(1000.0, 310.0).tier, Tier::Mid);
        assert_eq!(Progress::compute(1000.0, 400.0).tier, Tier::Mid);
        assert_eq!(Progress::compute(1000.0, 999.0).tier, Tier::Mid);
        assert_eq!(Progress::compute(1000.0, 1000.0).tier, Tier::Complete);
        assert_eq!(Progress::compute(1000.0, 400.0).percentage, 40.0);
    }

    #[test]
    fn test_progress_clamps_overshoot() {
        let progress = Progress::compute(100.0, 250.0);
        assert_eq!(progress.percentage, 100.0);
        assert_eq!(progress.tier, Tier::Complete);
    }

    #[test]
    fn test_progress_zero_price() {
        assert_eq!(Progress::compute(0.0, 0.0).percentage, 0.0);
        assert_eq!(Progress::compute(0.0, 0.0).tier, Tier::Low);
        assert_eq!(Progress::compute(0.0, 5.0).percentage, 100.0);
        assert!(!Progress::compute(0.0, 5.0).tier.accepts_deposits());
    }

    #[test]
    fn test_wishlist_ids_are_stable() {
        let mut list = Wishlist::new();
        let a = list.push(ItemDraft::new("a", 1.0));
        let b = list.push(ItemDraft::new("b", 2.0));
        let c = list.push(ItemDraft::new("c", 3.0));

        assert_eq!(list.position(c), Some(2));
        list.remove(b);
        assert_eq!(list.position(a), Some(0));
        assert_eq!(list.position(c), Some(1));

        // Removed ids are not handed out again.
        let d = list.push(ItemDraft::new("d", 4.0));
        assert_ne!(d, b);
        assert_eq!(d, ItemId(3));
    }

    #[test]
    fn test_from_items_resumes_allocator() {
        let items = vec![WishItem {
            id: ItemId(7),
            name: "bike".to_string(),
            price: 500.0,
            saved_amount: 20.0,
            image_uri: None,
        }];
        let mut list = Wishlist::from_items(items);
        assert_eq!(list.allocate_id(), ItemId(8));
    }

    #[test]
    fn test_allocator_at_id_limit() {
        let item = |id: u64, name: &str| WishItem {
            id: ItemId(id),
            name: name.to_string(),
            price: 1.0,
            saved_amount: 0.0,
            image_uri: None,
        };

        let mut list = Wishlist::from_items(vec![item(0, "a"), item(u64::MAX - 1, "b")]);
        assert_eq!(list.allocate_id(), ItemId(u64::MAX));
        // Wrapped around; 0 is taken.
        assert_eq!(list.allocate_id(), ItemId(1));

        let mut list = Wishlist::from_items(vec![item(u64::MAX, "c")]);
        assert_eq!(list.allocate_id(), ItemId(0));
    }

    #[test]
    fn test_remaining_never_negative() {
        let item = WishItem {
            id: ItemId(0),
            name: "x".to_string(),
            price: 10.0,
            saved_amount: 12.0,
            image_uri: None,
        };
        assert_eq!(item.remaining(), 0.0);
        assert!(item.is_complete());
    }
}
