//! JSON snapshot format for the persisted wishlist.
//!
//! The snapshot is a single JSON array with one object per item, in list order:
//!
//! ```json
//! [{"id": 0, "name": "Headphones", "price": 1000.0, "imageUri": "", "savedAmount": 400.0}]
//! ```
//!
//! Older snapshots stored `price` as display text (`"1000"`, `"฿1,000"`) and had no `id`;
//! both are still accepted when reading.

use crate::error::{Result, WishlistError};
use crate::models::{ItemDraft, ItemId, WishItem, Wishlist};
use crate::utils;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// Wire shape of one stored record.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<u64>,
    name: String,
    price: StoredPrice,
    #[serde(default)]
    image_uri: String,
    #[serde(default)]
    saved_amount: f64,
}

/// Price as written now (number) or by older versions (text).
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum StoredPrice {
    Number(f64),
    Text(String),
}

impl StoredPrice {
    fn resolve(&self) -> std::result::Result<f64, String> {
        match self {
            StoredPrice::Number(v) => Ok(*v),
            StoredPrice::Text(text) => {
                utils::parse_amount(text).ok_or_else(|| format!("unparsable price '{text}'"))
            }
        }
    }
}

/// A record that could not be restored.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    /// 0-based index in the stored array.
    pub index: usize,
    pub reason: String,
}

/// Outcome of parsing a snapshot: the restored list and anything dropped on the way.
#[derive(Debug, Clone, Default)]
pub struct ParsedSnapshot {
    pub wishlist: Wishlist,
    pub skipped: Vec<SkippedRecord>,
}

/// Parse and format wishlist snapshots.
pub struct SnapshotCodec;

impl SnapshotCodec {
    /// Parse snapshot text.
    ///
    /// A snapshot that is not a JSON array is corrupt as a whole. Individual records that
    /// fail are reported in [`ParsedSnapshot::skipped`] and the rest are kept in order.
    pub fn parse(content: &str) -> Result<ParsedSnapshot> {
        let root: Value = serde_json::from_str(content)
            .map_err(|e| WishlistError::CorruptSnapshot(e.to_string()))?;

        let records = match root {
            Value::Array(records) => records,
            other => {
                return Err(WishlistError::CorruptSnapshot(format!(
                    "expected an array of items, found {}",
                    json_kind(&other)
                )))
            }
        };

        let mut restored: Vec<(Option<ItemId>, ItemDraft)> = Vec::with_capacity(records.len());
        let mut skipped = Vec::new();

        for (index, value) in records.into_iter().enumerate() {
            match Self::restore_record(value) {
                Ok(entry) => restored.push(entry),
                Err(reason) => {
                    log::warn!("Skipping stored item {index}: {reason}");
                    skipped.push(SkippedRecord { index, reason });
                }
            }
        }

        Ok(ParsedSnapshot {
            wishlist: Self::assemble(restored),
            skipped,
        })
    }

    /// Format the whole list as snapshot text.
    pub fn format(wishlist: &Wishlist) -> String {
        let records: Vec<SnapshotRecord> = wishlist
            .items()
            .iter()
            .map(|item| SnapshotRecord {
                id: Some(item.id.0),
                name: item.name.clone(),
                price: StoredPrice::Number(item.price),
                image_uri: item.image_uri.clone().unwrap_or_default(),
                saved_amount: item.saved_amount,
            })
            .collect();

        // Serializing plain structs of strings and finite numbers cannot fail.
        serde_json::to_string(&records).unwrap_or_else(|_| "[]".to_string())
    }

    fn restore_record(value: Value) -> std::result::Result<(Option<ItemId>, ItemDraft), String> {
        let record: SnapshotRecord = serde_json::from_value(value).map_err(|e| e.to_string())?;

        let name = record.name.trim();
        if name.is_empty() {
            return Err("empty name".to_string());
        }

        let price = record.price.resolve()?;
        if !price.is_finite() || price < 0.0 {
            return Err(format!("invalid price {price}"));
        }

        let saved_amount = if record.saved_amount.is_finite() && record.saved_amount > 0.0 {
            record.saved_amount
        } else {
            0.0
        };

        let image_uri = Some(record.image_uri).filter(|uri| !uri.trim().is_empty());

        let draft = ItemDraft {
            name: name.to_string(),
            price,
            saved_amount,
            image_uri,
        };
        Ok((record.id.map(ItemId), draft))
    }

    /// Rebuild the list, keeping stored ids and allocating fresh ones for records
    /// that had none or that collide with an earlier record.
    fn assemble(restored: Vec<(Option<ItemId>, ItemDraft)>) -> Wishlist {
        let mut seen = HashSet::new();
        let ids: Vec<Option<ItemId>> = restored
            .iter()
            .map(|(id, _)| id.filter(|id| seen.insert(*id)))
            .collect();

        let mut next = ids
            .iter()
            .flatten()
            .map(|id| id.0.saturating_add(1))
            .max()
            .unwrap_or(0);
        let items = restored
            .into_iter()
            .zip(ids)
            .map(|((_, draft), id)| {
                let id = id.unwrap_or_else(|| {
                    while seen.contains(&ItemId(next)) {
                        next = next.wrapping_add(1);
                    }
                    let fresh = ItemId(next);
                    seen.insert(fresh);
                    next = next.wrapping_add(1);
                    fresh
                });
                WishItem {
                    id,
                    name: draft.name,
                    price: draft.price,
                    saved_amount: draft.saved_amount,
                    image_uri: draft.image_uri,
                }
            })
            .collect();

        Wishlist::from_items(items)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
