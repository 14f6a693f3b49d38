use thiserror::Error;
use uuid::Uuid;

use super::checkout::PlacedOrder;

/// Failure of a single store operation, reported by the `CheckoutStore`
/// implementation.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct StoreError(pub String);

/// One seller partition that failed partway through its write sequence.
///
/// `order_id` is `Some` when the order row was already written, i.e. a
/// partially-populated order now exists in the ledger.
#[derive(Debug)]
pub struct PartitionFailure {
    pub seller_id: Uuid,
    pub order_id: Option<Uuid>,
    pub error: StoreError,
}

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("missing required shipping field: {field}")]
    ValidationFailed { field: &'static str },

    #[error("cart is empty")]
    CartEmpty,

    #[error("checkout attempt {attempt_id} was already processed")]
    DuplicateCheckout { attempt_id: Uuid },

    #[error("store unavailable: {0}")]
    DataUnavailable(#[from] StoreError),

    /// Some partitions failed after others (or their own order row) were
    /// already written. No compensation is performed and the cart is left
    /// intact so the buyer can retry with a fresh attempt id.
    #[error("order fan-out failed for {n} of {total} seller partition(s)",
        n = .failures.len(),
        total = .placed.len() + .failures.len())]
    PartialOrderFailure {
        placed: Vec<PlacedOrder>,
        failures: Vec<PartitionFailure>,
    },
}
