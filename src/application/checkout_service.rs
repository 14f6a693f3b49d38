use std::thread;

use bigdecimal::BigDecimal;
use uuid::Uuid;

use crate::domain::checkout::{
    CheckoutReceipt, CheckoutRequest, DeliveryMethod, DeliveryStatus, NewDelivery, NewOrder,
    NewOrderItem, NewPayment, OrderStatus, PaymentStatus, PlacedOrder, DEFAULT_CURRENCY,
};
use crate::domain::errors::{CheckoutError, PartitionFailure, StoreError};
use crate::domain::partition::{partition_by_seller, SellerPartition};
use crate::domain::ports::{AttemptOutcome, CheckoutStore, OrderNumberSource};
use crate::domain::validate::validate_shipping_address;

/// The checkout order-splitting workflow.
///
/// One multi-seller cart becomes one order (plus items, a payment stub and a
/// delivery stub) per seller. The store and the order-number source are
/// injected so the workflow runs unchanged against Postgres or an in-memory
/// fake.
pub struct CheckoutService<S, N> {
    store: S,
    order_numbers: N,
}

impl<S: CheckoutStore, N: OrderNumberSource> CheckoutService<S, N> {
    pub fn new(store: S, order_numbers: N) -> Self {
        Self {
            store,
            order_numbers,
        }
    }

    /// Run one checkout: validate, snapshot the cart, partition by seller,
    /// fan out the per-seller writes, then clear the cart.
    ///
    /// The cart is cleared only when every partition succeeded; on a partial
    /// failure the remaining lines stay in place so the buyer can retry with
    /// a fresh attempt id.
    pub fn place_order(
        &self,
        buyer_id: Uuid,
        request: &CheckoutRequest,
    ) -> Result<CheckoutReceipt, CheckoutError> {
        validate_shipping_address(&request.shipping_address)?;

        let cart_id = self
            .store
            .find_cart(buyer_id)?
            .ok_or(CheckoutError::CartEmpty)?;
        let lines = self.store.cart_lines(cart_id)?;
        if lines.is_empty() {
            return Err(CheckoutError::CartEmpty);
        }

        let orphaned = lines.iter().filter(|l| l.seller_id.is_none()).count();
        if orphaned > 0 {
            log::warn!("cart {cart_id}: dropping {orphaned} line(s) whose product has no seller");
        }
        let partitions = partition_by_seller(lines);
        if partitions.is_empty() {
            return Err(CheckoutError::CartEmpty);
        }

        if self.store.record_attempt(request.attempt_id, cart_id)? == AttemptOutcome::Replay {
            return Err(CheckoutError::DuplicateCheckout {
                attempt_id: request.attempt_id,
            });
        }

        let mut placed = Vec::new();
        let mut failures = Vec::new();
        for result in self.fan_out(buyer_id, request, partitions) {
            match result {
                Ok(order) => placed.push(order),
                Err(failure) => failures.push(failure),
            }
        }

        if !failures.is_empty() {
            for failure in &failures {
                log::error!(
                    "cart {cart_id}: order writes for seller {} failed (order row: {:?}): {}",
                    failure.seller_id,
                    failure.order_id,
                    failure.error
                );
            }
            return Err(CheckoutError::PartialOrderFailure { placed, failures });
        }

        // Orders exist at this point; a failed clear must not fail the
        // checkout, the stale lines are only a nuisance.
        if let Err(e) = self.store.clear_cart(cart_id) {
            log::warn!("cart {cart_id}: orders placed but cart clearing failed: {e}");
        }

        Ok(CheckoutReceipt {
            cart_id,
            orders: placed,
        })
    }

    /// Write each seller partition on its own thread. Partitions touch
    /// disjoint order rows, so there is nothing to coordinate between them;
    /// results come back in partition order.
    fn fan_out(
        &self,
        buyer_id: Uuid,
        request: &CheckoutRequest,
        partitions: Vec<SellerPartition>,
    ) -> Vec<Result<PlacedOrder, PartitionFailure>> {
        thread::scope(|scope| {
            let handles: Vec<_> = partitions
                .into_iter()
                .map(|partition| {
                    let seller_id = partition.seller_id;
                    let handle =
                        scope.spawn(move || self.place_seller_order(buyer_id, request, partition));
                    (seller_id, handle)
                })
                .collect();

            handles
                .into_iter()
                .map(|(seller_id, handle)| {
                    handle.join().unwrap_or_else(|_| {
                        Err(PartitionFailure {
                            seller_id,
                            order_id: None,
                            error: StoreError("order writer thread panicked".to_string()),
                        })
                    })
                })
                .collect()
        })
    }

    /// The sequential write chain for one seller: order, items, payment
    /// stub, delivery stub. A failure after the order insert leaves the
    /// partial order in place; no compensating delete is attempted.
    fn place_seller_order(
        &self,
        buyer_id: Uuid,
        request: &CheckoutRequest,
        partition: SellerPartition,
    ) -> Result<PlacedOrder, PartitionFailure> {
        let seller_id = partition.seller_id;
        let fail = |order_id: Option<Uuid>, error: StoreError| PartitionFailure {
            seller_id,
            order_id,
            error,
        };

        let subtotal = partition
            .lines
            .iter()
            .fold(BigDecimal::from(0), |acc, line| acc + line.line_subtotal());
        // Free shipping, no tax, no discounts: platform policy today.
        let shipping_cost = BigDecimal::from(0);
        let tax_amount = BigDecimal::from(0);
        let discount_amount = BigDecimal::from(0);
        let total_amount = &subtotal + &shipping_cost + &tax_amount - &discount_amount;
        let currency = partition
            .lines
            .first()
            .map(|l| l.currency.clone())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

        let order_number = self.order_numbers.next_order_number();
        let order = NewOrder {
            order_number: order_number.clone(),
            buyer_id,
            seller_id,
            status: OrderStatus::Pending,
            subtotal: subtotal.clone(),
            tax_amount,
            shipping_cost,
            discount_amount,
            total_amount: total_amount.clone(),
            currency: currency.clone(),
            shipping_address: request.shipping_address.clone(),
            billing_address: request.shipping_address.clone(),
        };
        let order_id = self
            .store
            .insert_order(&order)
            .map_err(|e| fail(None, e))?;

        let items: Vec<NewOrderItem> = partition
            .lines
            .iter()
            .map(|line| NewOrderItem {
                product_id: line.product_id,
                variant_id: line.variant_id,
                product_name: line.product_name.clone(),
                product_sku: line.product_sku.clone(),
                price: line.price.clone(),
                quantity: line.quantity,
                subtotal: line.line_subtotal(),
            })
            .collect();
        self.store
            .insert_order_items(order_id, &items)
            .map_err(|e| fail(Some(order_id), e))?;

        let payment = NewPayment {
            method: request.payment_method,
            status: PaymentStatus::Pending,
            amount: total_amount.clone(),
            currency: currency.clone(),
        };
        self.store
            .insert_payment(order_id, &payment)
            .map_err(|e| fail(Some(order_id), e))?;

        let delivery = NewDelivery {
            method: DeliveryMethod::PlatformCourier,
            status: DeliveryStatus::Pending,
            address: request.shipping_address.clone(),
            recipient_name: request.shipping_address.full_name.clone(),
            recipient_phone: request.shipping_address.phone.clone(),
            notes: request.shipping_address.delivery_notes.clone(),
        };
        self.store
            .insert_delivery(order_id, &delivery)
            .map_err(|e| fail(Some(order_id), e))?;

        Ok(PlacedOrder {
            order_id,
            order_number,
            seller_id,
            subtotal,
            total_amount,
            currency,
            item_count: items.len(),
        })
    }
}
