//! The wishlist screen state: the ordered items and their persisted snapshot.

use crate::detail::{DetailHandoff, DetailResult};
use crate::error::{Result, ValidationError, WishlistError};
use crate::models::{ItemDraft, ItemId, WishItem, Wishlist};
use crate::snapshot::{SkippedRecord, SnapshotCodec};
use crate::store::{KeyValueStore, SNAPSHOT_KEY};
use crate::utils;

/// Summary of a load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped: Vec<SkippedRecord>,
}

/// What a detail result did to the list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ApplyOutcome {
    Updated,
    Deleted,
    /// The item no longer exists; nothing changed.
    Stale,
}

/// Owns the wishlist and keeps the store in step with it.
pub struct ListController<S: KeyValueStore> {
    wishlist: Wishlist,
    store: S,
}

impl<S: KeyValueStore> ListController<S> {
    /// Create a controller with an empty list. Call [`load`](Self::load) to restore.
    pub fn new(store: S) -> Self {
        Self {
            wishlist: Wishlist::new(),
            store,
        }
    }

    /// Replace the in-memory list with the stored snapshot.
    ///
    /// Nothing is written back. On a corrupt snapshot the list is left empty and the
    /// error is returned to the caller.
    pub fn load(&mut self) -> Result<LoadReport> {
        self.wishlist = Wishlist::new();

        let content = match self.store.get(SNAPSHOT_KEY)? {
            Some(content) => content,
            None => {
                log::debug!("No stored wishlist, starting empty");
                return Ok(LoadReport::default());
            }
        };

        let parsed = SnapshotCodec::parse(&content).inspect_err(|e| {
            log::warn!("Discarding stored wishlist: {e}");
        })?;

        self.wishlist = parsed.wishlist;
        log::debug!(
            "Loaded {} items ({} skipped)",
            self.wishlist.len(),
            parsed.skipped.len()
        );

        Ok(LoadReport {
            loaded: self.wishlist.len(),
            skipped: parsed.skipped,
        })
    }

    /// Raw snapshot text as currently stored.
    pub fn stored_snapshot(&self) -> Result<Option<String>> {
        self.store.get(SNAPSHOT_KEY)
    }

    /// Validate add-dialog input into a draft.
    pub fn validate_draft(
        name: &str,
        price_text: &str,
        image_uri: Option<String>,
    ) -> std::result::Result<ItemDraft, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if price_text.trim().is_empty() {
            return Err(ValidationError::EmptyPrice);
        }

        let price = utils::parse_amount(price_text)
            .ok_or_else(|| ValidationError::InvalidPrice(price_text.trim().to_string()))?;
        if price < 0.0 {
            return Err(ValidationError::InvalidPrice(price_text.trim().to_string()));
        }

        Ok(ItemDraft::new(name, price).with_image(image_uri))
    }

    /// Add a new item with nothing saved yet, then save.
    pub fn add_item(
        &mut self,
        name: &str,
        price_text: &str,
        image_uri: Option<String>,
    ) -> Result<ItemId> {
        let draft = Self::validate_draft(name, price_text, image_uri)?;
        let id = self.wishlist.push(draft);
        log::info!("Added item {id}");

        if let Err(e) = self.save() {
            self.wishlist.remove(id);
            return Err(e);
        }
        Ok(id)
    }

    /// Add several drafts with a single save at the end.
    pub fn add_items(&mut self, drafts: Vec<ItemDraft>) -> Result<Vec<ItemId>> {
        if let Some(bad) = drafts.iter().find(|d| d.name.trim().is_empty()) {
            log::debug!("Rejecting bulk add, empty name in {bad:?}");
            return Err(ValidationError::EmptyName.into());
        }
        if let Some(bad) = drafts.iter().find(|d| !d.price.is_finite() || d.price < 0.0) {
            return Err(ValidationError::InvalidPrice(bad.price.to_string()).into());
        }
        if drafts
            .iter()
            .any(|d| !d.saved_amount.is_finite() || d.saved_amount < 0.0)
        {
            return Err(ValidationError::InvalidAmount.into());
        }

        let before = self.wishlist.clone();
        let ids: Vec<ItemId> = drafts
            .into_iter()
            .map(|mut draft| {
                draft.name = draft.name.trim().to_string();
                self.wishlist.push(draft)
            })
            .collect();

        if let Err(e) = self.save() {
            self.wishlist = before;
            return Err(e);
        }
        log::info!("Added {} items", ids.len());
        Ok(ids)
    }

    /// Hand a copy of an item to the detail screen.
    pub fn open_detail(&self, id: ItemId) -> Result<DetailHandoff> {
        let position = self
            .wishlist
            .position(id)
            .ok_or_else(|| WishlistError::ItemNotFound(id.to_string()))?;
        Ok(Self::handoff(position, &self.wishlist.items()[position]))
    }

    /// Hand a copy of the item at a 0-based position to the detail screen.
    pub fn open_detail_at(&self, position: usize) -> Result<DetailHandoff> {
        let item = self
            .wishlist
            .at(position)
            .ok_or(WishlistError::InvalidPosition(position + 1))?;
        Ok(Self::handoff(position, item))
    }

    fn handoff(position: usize, item: &WishItem) -> DetailHandoff {
        DetailHandoff {
            item_id: item.id,
            position,
            name: item.name.clone(),
            price: item.price,
            saved_amount: item.saved_amount,
            image_uri: item.image_uri.clone(),
        }
    }

    /// Apply what the detail screen returned, then save.
    ///
    /// Results for items that no longer exist are reported as [`ApplyOutcome::Stale`].
    /// If the save fails the list is put back as it was.
    pub fn apply_detail_result(&mut self, result: DetailResult) -> Result<ApplyOutcome> {
        let before = self.wishlist.clone();
        let outcome = if result.deleted {
            match self.wishlist.remove(result.item_id) {
                Some(item) => {
                    log::info!("Deleted item {} ({})", item.id, item.name);
                    ApplyOutcome::Deleted
                }
                None => ApplyOutcome::Stale,
            }
        } else {
            match self.wishlist.get_mut(result.item_id) {
                Some(item) => {
                    item.saved_amount = result.saved_amount.max(0.0);
                    log::info!("Saved {:.2} toward {}", item.saved_amount, item.id);
                    ApplyOutcome::Updated
                }
                None => ApplyOutcome::Stale,
            }
        };

        if outcome == ApplyOutcome::Stale {
            log::warn!("Ignoring result for missing item {}", result.item_id);
            return Ok(outcome);
        }

        if let Err(e) = self.save() {
            self.wishlist = before;
            return Err(e);
        }
        Ok(outcome)
    }

    /// Write the full list to the store.
    pub fn save(&mut self) -> Result<()> {
        let content = SnapshotCodec::format(&self.wishlist);
        self.store.set(SNAPSHOT_KEY, &content)?;
        log::debug!("Saved {} items", self.wishlist.len());
        Ok(())
    }

    /// Lifecycle hook for leaving the screen.
    pub fn pause(&mut self) -> Result<()> {
        self.save()
    }

    pub fn wishlist(&self) -> &Wishlist {
        &self.wishlist
    }

    pub fn items(&self) -> &[WishItem] {
        self.wishlist.items()
    }

    pub fn item(&self, id: ItemId) -> Option<&WishItem> {
        self.wishlist.get(id)
    }

    pub fn at(&self, position: usize) -> Option<&WishItem> {
        self.wishlist.at(position)
    }

    pub fn len(&self) -> usize {
        self.wishlist.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wishlist.is_empty()
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detail::DetailController;
    use crate::store::MemoryStore;

    fn controller() -> ListController<MemoryStore> {
        ListController::new(MemoryStore::new())
    }

    #[test]
    fn test_add_item_appends_and_saves() {
        let mut list = controller();
        let id = list.add_item("Headphones", "1000", None).unwrap();

        assert_eq!(list.len(), 1);
        let item = list.item(id).unwrap();
        assert_eq!(item.saved_amount, 0.0);
        assert_eq!(item.price, 1000.0);

        let stored = list.stored_snapshot().unwrap().unwrap();
        assert!(stored.contains("Headphones"));
    }

    #[test]
    fn test_add_item_validation() {
        let mut list = controller();
        let cases = [
            ("", "10", ValidationError::EmptyName),
            ("   ", "10", ValidationError::EmptyName),
            ("Bike", "", ValidationError::EmptyPrice),
            ("Bike", "ten", ValidationError::InvalidPrice("ten".to_string())),
            ("Bike", "-3", ValidationError::InvalidPrice("-3".to_string())),
        ];

        for (name, price, expected) in cases {
            match list.add_item(name, price, None) {
                Err(WishlistError::Validation(v)) => assert_eq!(v, expected),
                other => panic!("expected {expected:?}, got {other:?}"),
            }
        }
        assert!(list.is_empty());
        assert_eq!(list.stored_snapshot().unwrap(), None);
    }

    #[test]
    fn test_load_restores_order() {
        let mut list = controller();
        list.add_item("a", "1", None).unwrap();
        list.add_item("b", "2", Some("file:///b.png".to_string())).unwrap();
        list.add_item("c", "3", None).unwrap();

        let mut restored = ListController::new(list.into_store());
        let report = restored.load().unwrap();
        assert_eq!(report.loaded, 3);
        let names: Vec<_> = restored.items().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(restored.at(1).unwrap().image_uri.as_deref(), Some("file:///b.png"));
    }

    #[test]
    fn test_load_corrupt_snapshot_leaves_empty() {
        let mut store = MemoryStore::new();
        store.set(SNAPSHOT_KEY, "{{{").unwrap();
        let mut list = ListController::new(store);

        assert!(matches!(list.load(), Err(WishlistError::CorruptSnapshot(_))));
        assert!(list.is_empty());
        // The bad snapshot is still there for recovery.
        assert_eq!(list.stored_snapshot().unwrap().as_deref(), Some("{{{"));
    }

    #[test]
    fn test_detail_round_trip_updates_saved() {
        let mut list = controller();
        let id = list.add_item("Headphones", "1000", None).unwrap();

        let mut detail = DetailController::open(list.open_detail(id).unwrap());
        detail.deposit(400.0).unwrap();
        let outcome = list.apply_detail_result(detail.close()).unwrap();

        assert_eq!(outcome, ApplyOutcome::Updated);
        assert_eq!(list.item(id).unwrap().saved_amount, 400.0);
    }

    #[test]
    fn test_delete_shifts_positions() {
        let mut list = controller();
        for name in ["a", "b", "c", "d"] {
            list.add_item(name, "10", None).unwrap();
        }

        let detail = DetailController::open(list.open_detail_at(2).unwrap());
        let request = detail.request_delete();
        let result = detail.confirm_delete(request);
        assert_eq!(list.apply_detail_result(result).unwrap(), ApplyOutcome::Deleted);

        assert_eq!(list.len(), 3);
        assert_eq!(list.at(2).unwrap().name, "d");
    }

    #[test]
    fn test_stale_result_is_ignored() {
        let mut list = controller();
        let id = list.add_item("a", "10", None).unwrap();
        let handoff = list.open_detail(id).unwrap();

        // Item removed while the detail screen was open.
        let other = DetailController::open(handoff.clone());
        let request = other.request_delete();
        list.apply_detail_result(other.confirm_delete(request)).unwrap();

        let mut detail = DetailController::open(handoff);
        detail.deposit(5.0).unwrap();
        assert_eq!(list.apply_detail_result(detail.close()).unwrap(), ApplyOutcome::Stale);
        assert!(list.is_empty());
    }

    /// Counts writes and can be told to fail them.
    #[derive(Default)]
    struct CountingStore {
        inner: MemoryStore,
        writes: usize,
        fail_writes: bool,
    }

    impl KeyValueStore for CountingStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<()> {
            if self.fail_writes {
                return Err(WishlistError::Other("disk full".to_string()));
            }
            self.writes += 1;
            self.inner.set(key, value)
        }
    }

    #[test]
    fn test_add_items_saves_once_and_validates_first() {
        let mut list = ListController::new(CountingStore::default());
        let err = list
            .add_items(vec![ItemDraft::new("ok", 1.0), ItemDraft::new(" ", 2.0)])
            .unwrap_err();
        assert!(err.is_validation());
        assert!(list.is_empty());

        let ids = list
            .add_items(vec![ItemDraft::new("x", 1.0), ItemDraft::new("y", 2.0)])
            .unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(list.len(), 2);
        assert_eq!(list.into_store().writes, 1);
    }

    #[test]
    fn test_add_items_rejects_bad_saved_amounts() {
        let mut list = controller();
        let mut nan = ItemDraft::new("Lamp", 40.0);
        nan.saved_amount = f64::NAN;
        let mut negative = ItemDraft::new("Desk", 200.0);
        negative.saved_amount = -50.0;

        for bad in [nan, negative] {
            let err = list
                .add_items(vec![ItemDraft::new("Phone", 300.0), bad])
                .unwrap_err();
            assert!(matches!(
                err,
                WishlistError::Validation(ValidationError::InvalidAmount)
            ));
        }
        assert!(list.is_empty());
        assert_eq!(list.stored_snapshot().unwrap(), None);
    }

    #[test]
    fn test_failed_save_restores_detail_result() {
        let mut list = ListController::new(CountingStore::default());
        let id = list.add_item("Headphones", "1000", None).unwrap();
        let keep = list.add_item("Bike", "200", None).unwrap();

        let mut store = list.into_store();
        store.fail_writes = true;
        let mut list = ListController::new(store);
        list.load().unwrap();

        let mut detail = DetailController::open(list.open_detail(id).unwrap());
        detail.deposit(400.0).unwrap();
        assert!(list.apply_detail_result(detail.close()).is_err());
        assert_eq!(list.item(id).unwrap().saved_amount, 0.0);

        let detail = DetailController::open(list.open_detail(keep).unwrap());
        let request = detail.request_delete();
        assert!(list.apply_detail_result(detail.confirm_delete(request)).is_err());
        assert_eq!(list.len(), 2);
        assert_eq!(list.at(1).unwrap().id, keep);
    }

    #[test]
    fn test_open_detail_at_out_of_range() {
        let list = controller();
        assert!(matches!(
            list.open_detail_at(0),
            Err(WishlistError::InvalidPosition(1))
        ));
    }
}
