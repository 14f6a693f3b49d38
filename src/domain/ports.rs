use uuid::Uuid;

use super::checkout::{CartLine, NewDelivery, NewOrder, NewOrderItem, NewPayment};
use super::errors::StoreError;

/// Whether a checkout attempt id was seen for the first time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Fresh,
    Replay,
}

/// Persistence operations the checkout workflow depends on.
///
/// The workflow never touches the database directly; it is handed an
/// implementation of this trait, which makes the whole fan-out testable
/// against an in-memory fake. Implementations must be callable from
/// multiple threads at once: seller partitions write concurrently.
pub trait CheckoutStore: Send + Sync {
    fn find_cart(&self, buyer_id: Uuid) -> Result<Option<Uuid>, StoreError>;

    /// The cart's line items joined with their product snapshot, in the
    /// order the items were added.
    fn cart_lines(&self, cart_id: Uuid) -> Result<Vec<CartLine>, StoreError>;

    /// Record a checkout attempt id, reporting whether it is new. A replay
    /// must not be recorded twice.
    fn record_attempt(&self, attempt_id: Uuid, cart_id: Uuid) -> Result<AttemptOutcome, StoreError>;

    fn insert_order(&self, order: &NewOrder) -> Result<Uuid, StoreError>;

    fn insert_order_items(&self, order_id: Uuid, items: &[NewOrderItem]) -> Result<(), StoreError>;

    fn insert_payment(&self, order_id: Uuid, payment: &NewPayment) -> Result<(), StoreError>;

    fn insert_delivery(&self, order_id: Uuid, delivery: &NewDelivery) -> Result<(), StoreError>;

    /// Bulk-delete every line item under the cart.
    fn clear_cart(&self, cart_id: Uuid) -> Result<(), StoreError>;
}

/// Produces human-readable order numbers. Numbers must never collide across
/// concurrent checkouts; the `orders.order_number` unique constraint is the
/// final backstop.
pub trait OrderNumberSource: Send + Sync {
    fn next_order_number(&self) -> String;
}
