//! Write-through persistence for the cart ledger.
//!
//! [`PersistentCart`] wraps a [`CartLedger`] and a [`SlotStorage`] handle.
//! Each mutator runs against the ledger first and then writes one snapshot
//! to the storage slot. Storage failures are logged and remembered but never
//! undo or fail the in-memory mutation.

use mavi_core::{Product, ProductId};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{CartError, CartLedger, CartTotals, LineItem, ShippingPolicy};
use crate::storage::{self, SlotStorage, Snapshot, StorageError};

/// Serialized form of a cart, as stored in its slot.
///
/// ```json
/// {"state":{"items":[...],"subtotal":"20","shipping":"9.99","discount":"0","total":"29.99"},"version":0}
/// ```
pub type CartSnapshot = Snapshot<CartState>;

/// Line items plus the totals they produced when the snapshot was taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartState {
    pub items: Vec<LineItem>,
    #[serde(flatten)]
    pub totals: CartTotals,
}

impl CartState {
    /// Capture the current state of `ledger`.
    #[must_use]
    pub fn of(ledger: &CartLedger) -> Self {
        Self {
            items: ledger.items().to_vec(),
            totals: ledger.totals(),
        }
    }
}

impl Snapshot<CartState> {
    /// Snapshot the current state of `ledger`.
    #[must_use]
    pub fn of(ledger: &CartLedger) -> Self {
        Self::new(CartState::of(ledger))
    }

    /// Rebuild a ledger from this snapshot.
    ///
    /// Totals are recomputed from the items with `policy`; the stored totals
    /// are informational only.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the stored lines cannot be priced.
    pub fn into_ledger(self, policy: ShippingPolicy) -> Result<CartLedger, CartError> {
        CartLedger::from_items(self.state.items, policy)
    }
}

/// A cart ledger that saves itself after every mutation.
#[derive(Debug)]
pub struct PersistentCart<S> {
    ledger: CartLedger,
    storage: S,
    slot: String,
    last_error: Option<String>,
}

impl<S: SlotStorage + Clone + 'static> PersistentCart<S> {
    /// Open the cart stored in `slot`, or start empty.
    ///
    /// A missing, corrupt, unpriceable or unreadable snapshot never fails
    /// the open: the problem is logged and the session starts with an empty
    /// cart. A read failure also marks the cart as degraded.
    pub async fn open(storage: S, slot: impl Into<String>, policy: ShippingPolicy) -> Self {
        let slot = slot.into();
        let mut last_error = None;

        let ledger = match storage::restore::<_, CartState>(&storage, &slot).await {
            Ok(Some(state)) => match CartLedger::from_items(state.items, policy) {
                Ok(ledger) => {
                    info!(
                        slot = %slot,
                        items = ledger.items().len(),
                        "Cart rehydrated from storage"
                    );
                    ledger
                }
                Err(e) => {
                    warn!(
                        slot = %slot,
                        error = %e,
                        "Discarding cart snapshot that cannot be priced"
                    );
                    CartLedger::new(policy)
                }
            },
            Ok(None) => CartLedger::new(policy),
            Err(e) => {
                warn!(slot = %slot, error = %e, "Cart storage unavailable, starting empty");
                last_error = Some(e.to_string());
                CartLedger::new(policy)
            }
        };

        Self {
            ledger,
            storage,
            slot,
            last_error,
        }
    }

    /// Read access to the underlying ledger.
    #[must_use]
    pub const fn ledger(&self) -> &CartLedger {
        &self.ledger
    }

    /// See [`CartLedger::add_item`]. A refused change is not written.
    ///
    /// # Errors
    ///
    /// Returns the ledger's [`CartError`]; storage failures are not errors.
    pub async fn add_item(&mut self, product: &Product, quantity: i64) -> Result<(), CartError> {
        self.ledger.add_item(product, quantity)?;
        self.write_through().await;
        Ok(())
    }

    /// See [`CartLedger::remove_item`].
    ///
    /// # Errors
    ///
    /// Returns the ledger's [`CartError`]; storage failures are not errors.
    pub async fn remove_item(&mut self, product_id: &ProductId) -> Result<(), CartError> {
        self.ledger.remove_item(product_id)?;
        self.write_through().await;
        Ok(())
    }

    /// See [`CartLedger::update_quantity`].
    ///
    /// # Errors
    ///
    /// Returns the ledger's [`CartError`]; storage failures are not errors.
    pub async fn update_quantity(
        &mut self,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<(), CartError> {
        self.ledger.update_quantity(product_id, quantity)?;
        self.write_through().await;
        Ok(())
    }

    /// See [`CartLedger::clear`].
    pub async fn clear(&mut self) {
        self.ledger.clear();
        self.write_through().await;
    }

    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.ledger.item_count()
    }

    /// Whether the last storage operation failed.
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        self.last_error.is_some()
    }

    /// Message of the last storage failure, cleared by the next good write.
    #[must_use]
    pub fn last_persist_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Serialize the ledger and write it to the slot.
    ///
    /// # Errors
    ///
    /// Returns the [`StorageError`] from encoding or from the backend.
    pub async fn persist(&self) -> Result<(), StorageError> {
        storage::store(&self.storage, &self.slot, &CartState::of(&self.ledger)).await
    }

    async fn write_through(&mut self) {
        match self.persist().await {
            Ok(()) => {
                if self.last_error.take().is_some() {
                    info!(slot = %self.slot, "Cart storage recovered");
                }
            }
            Err(e) => {
                warn!(
                    slot = %self.slot,
                    error = %e,
                    "Failed to persist cart, keeping in-memory state"
                );
                self.last_error = Some(e.to_string());
            }
        }
    }
}
