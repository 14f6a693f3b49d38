use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::checkout_service::CheckoutService;
use crate::auth::{AuthorizedSession, Role};
use crate::db::DbPool;
use crate::domain::checkout::{CheckoutRequest, PaymentMethod, PlacedOrder, ShippingAddress};
use crate::errors::AppError;
use crate::infrastructure::checkout_store::DieselCheckoutStore;
use crate::infrastructure::order_numbers::UuidOrderNumbers;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct PlaceOrderRequest {
    /// Client-generated id, unique per submission. Resubmitting the same id
    /// (double-click, network retry) is refused instead of duplicating
    /// orders.
    pub attempt_id: Uuid,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PlacedOrderResponse {
    pub id: Uuid,
    pub order_number: String,
    pub seller_id: Uuid,
    /// Decimal amount as a string to avoid floating-point issues, e.g. "199.50"
    pub subtotal: String,
    pub total_amount: String,
    pub currency: String,
    pub item_count: usize,
}

impl From<PlacedOrder> for PlacedOrderResponse {
    fn from(order: PlacedOrder) -> Self {
        PlacedOrderResponse {
            id: order.order_id,
            order_number: order.order_number,
            seller_id: order.seller_id,
            subtotal: order.subtotal.to_string(),
            total_amount: order.total_amount.to_string(),
            currency: order.currency,
            item_count: order.item_count,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PlaceOrderResponse {
    /// One order per seller represented in the cart.
    pub orders: Vec<PlacedOrderResponse>,
}

// ── Handler ──────────────────────────────────────────────────────────────────

/// POST /checkout
///
/// Splits the buyer's cart into one order per seller, writing each order
/// with its items, a pending payment stub and a pending delivery stub. The
/// cart is emptied only if every seller's order was created.
#[utoipa::path(
    post,
    path = "/checkout",
    request_body = PlaceOrderRequest,
    responses(
        (status = 201, description = "One order created per seller", body = PlaceOrderResponse),
        (status = 401, description = "Not authenticated"),
        (status = 409, description = "Cart is empty, or this attempt id was already processed"),
        (status = 422, description = "Shipping address is missing a required field"),
        (status = 500, description = "Order fan-out failed partway; cart left intact"),
        (status = 503, description = "Store read failed; safe to retry"),
    ),
    tag = "checkout"
)]
pub async fn place_order(
    pool: web::Data<DbPool>,
    session: AuthorizedSession,
    body: web::Json<PlaceOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let buyer_id = session.require(Role::Buyer)?.user_id;
    let body = body.into_inner();

    let request = CheckoutRequest {
        attempt_id: body.attempt_id,
        shipping_address: body.shipping_address,
        payment_method: body.payment_method,
    };

    let receipt = web::block(move || {
        let store = DieselCheckoutStore::new(pool.get_ref().clone());
        let service = CheckoutService::new(store, UuidOrderNumbers);
        service.place_order(buyer_id, &request)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))?
    .map_err(AppError::from)?;

    Ok(HttpResponse::Created().json(PlaceOrderResponse {
        orders: receipt.orders.into_iter().map(Into::into).collect(),
    }))
}
