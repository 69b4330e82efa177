//! Per-item savings screen state.
//!
//! A [`DetailController`] works on a value copy of one item. It never touches the list;
//! whatever happens here reaches the list only through the [`DetailResult`] produced when
//! the controller is closed.

use crate::error::{Result, ValidationError};
use crate::models::{ItemId, Progress, Tier, MONEY_TOLERANCE};
use crate::utils;
use serde::{Deserialize, Serialize};

/// Data handed from the list to the detail screen when an item is opened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailHandoff {
    pub item_id: ItemId,
    /// 0-based position at open time, for display only.
    pub position: usize,
    pub name: String,
    pub price: f64,
    pub saved_amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_uri: Option<String>,
}

/// Outcome returned to the list when the detail screen closes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailResult {
    pub item_id: ItemId,
    #[serde(rename = "isDeleted")]
    pub deleted: bool,
    pub saved_amount: f64,
}

/// An open delete confirmation. Dropping it cancels the delete.
#[derive(Debug)]
#[must_use = "a delete request does nothing until confirmed"]
pub struct DeleteRequest {
    item_id: ItemId,
}

/// Deposit/delete state machine for one item.
#[derive(Debug, Clone)]
pub struct DetailController {
    handoff: DetailHandoff,
    saved_amount: f64,
}

impl DetailController {
    /// Open the detail screen on a handed-off copy.
    pub fn open(handoff: DetailHandoff) -> Self {
        let saved_amount = handoff.saved_amount;
        Self {
            handoff,
            saved_amount,
        }
    }

    pub fn item_id(&self) -> ItemId {
        self.handoff.item_id
    }

    pub fn position(&self) -> usize {
        self.handoff.position
    }

    pub fn name(&self) -> &str {
        &self.handoff.name
    }

    pub fn price(&self) -> f64 {
        self.handoff.price
    }

    pub fn image_uri(&self) -> Option<&str> {
        self.handoff.image_uri.as_deref()
    }

    pub fn saved_amount(&self) -> f64 {
        self.saved_amount
    }

    pub fn remaining(&self) -> f64 {
        (self.handoff.price - self.saved_amount).max(0.0)
    }

    pub fn progress(&self) -> Progress {
        Progress::compute(self.handoff.price, self.saved_amount)
    }

    pub fn percentage(&self) -> f64 {
        self.progress().percentage
    }

    pub fn tier(&self) -> Tier {
        self.progress().tier
    }

    pub fn is_complete(&self) -> bool {
        self.tier() == Tier::Complete
    }

    /// Whether the deposit action is available.
    pub fn can_deposit(&self) -> bool {
        self.tier().accepts_deposits()
    }

    /// Add `amount` to the saved total and return the new total.
    ///
    /// Deposits larger than what is still missing are rejected, not clamped. A deposit
    /// that lands within half a cent of the price completes the item exactly.
    pub fn deposit(&mut self, amount: f64) -> Result<f64> {
        if !self.can_deposit() {
            return Err(ValidationError::AlreadyComplete.into());
        }
        if !amount.is_finite() || amount <= 0.0 {
            return Err(ValidationError::InvalidAmount.into());
        }

        let price = self.handoff.price;
        let remaining = self.remaining();
        if price > 0.0 && amount - remaining > MONEY_TOLERANCE {
            return Err(ValidationError::ExceedsRemaining { remaining }.into());
        }

        self.saved_amount += amount;
        if price > 0.0 && price - self.saved_amount < MONEY_TOLERANCE {
            self.saved_amount = price;
        }
        log::debug!(
            "Deposited {amount:.2} into {} (saved {:.2})",
            self.handoff.item_id,
            self.saved_amount
        );
        Ok(self.saved_amount)
    }

    /// Parse typed text and deposit it.
    pub fn deposit_text(&mut self, text: &str) -> Result<f64> {
        let amount = utils::parse_amount(text).ok_or(ValidationError::InvalidAmount)?;
        self.deposit(amount)
    }

    /// First step of deleting: open the confirmation.
    pub fn request_delete(&self) -> DeleteRequest {
        DeleteRequest {
            item_id: self.handoff.item_id,
        }
    }

    /// Commit a confirmed delete. Closes the screen.
    pub fn confirm_delete(self, request: DeleteRequest) -> DetailResult {
        debug_assert_eq!(request.item_id, self.handoff.item_id);
        DetailResult {
            item_id: self.handoff.item_id,
            deleted: true,
            saved_amount: self.saved_amount,
        }
    }

    /// Close the screen without deleting.
    pub fn close(self) -> DetailResult {
        DetailResult {
            item_id: self.handoff.item_id,
            deleted: false,
            saved_amount: self.saved_amount,
        }
    }
}
