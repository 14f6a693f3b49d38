use actix_web::{web, HttpResponse};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{AuthorizedSession, Role};
use crate::db::DbPool;
use crate::errors::AppError;
use crate::infrastructure::models::{DeliveryRow, OrderItemRow, OrderRow, PaymentRow};
use crate::schema::{deliveries, order_items, orders, payments};

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListOrdersParams {
    /// Page number (1-based). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: i64,
    /// Number of items per page. Defaults to 20, maximum 100.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderSummaryResponse {
    pub id: Uuid,
    pub order_number: String,
    pub buyer_id: Uuid,
    pub seller_id: Uuid,
    pub status: String,
    /// Decimal amount as a string to avoid floating-point issues, e.g. "199.50"
    pub total_amount: String,
    pub currency: String,
    pub created_at: String,
}

impl From<OrderRow> for OrderSummaryResponse {
    fn from(order: OrderRow) -> Self {
        OrderSummaryResponse {
            id: order.id,
            order_number: order.order_number,
            buyer_id: order.buyer_id,
            seller_id: order.seller_id,
            status: order.status,
            total_amount: order.total_amount.to_string(),
            currency: order.currency,
            created_at: order.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListOrdersResponse {
    pub items: Vec<OrderSummaryResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub product_sku: Option<String>,
    pub price: String,
    pub quantity: i32,
    pub subtotal: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentSummaryResponse {
    pub payment_method: String,
    pub status: String,
    pub amount: String,
    pub currency: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeliverySummaryResponse {
    pub delivery_method: String,
    pub status: String,
    pub recipient_name: Option<String>,
    pub recipient_phone: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderDetailResponse {
    pub id: Uuid,
    pub order_number: String,
    pub buyer_id: Uuid,
    pub seller_id: Uuid,
    pub status: String,
    pub subtotal: String,
    pub tax_amount: String,
    pub shipping_cost: String,
    pub discount_amount: String,
    pub total_amount: String,
    pub currency: String,
    pub shipping_address: Value,
    pub created_at: String,
    pub items: Vec<OrderItemResponse>,
    pub payment: Option<PaymentSummaryResponse>,
    pub delivery: Option<DeliverySummaryResponse>,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

fn clamp_paging(params: ListOrdersParams) -> (i64, i64, i64) {
    let page = params.page.max(1);
    let limit = params.limit.clamp(1, 100);
    (page, limit, (page - 1) * limit)
}

/// GET /orders
///
/// The buyer's orders, newest first. Multi-seller checkouts show up as
/// several orders sharing a created_at instant.
#[utoipa::path(
    get,
    path = "/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (default 20, max 100)"),
    ),
    responses(
        (status = 200, description = "Paginated list of the buyer's orders", body = ListOrdersResponse),
        (status = 401, description = "Not authenticated"),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    pool: web::Data<DbPool>,
    session: AuthorizedSession,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let user_id = session.require(Role::Buyer)?.user_id;
    let (page, limit, offset) = clamp_paging(query.into_inner());

    let response = web::block(move || {
        let mut conn = pool.get()?;

        let total: i64 = orders::table
            .filter(orders::buyer_id.eq(user_id))
            .count()
            .get_result(&mut conn)?;

        let rows = orders::table
            .filter(orders::buyer_id.eq(user_id))
            .select(OrderRow::as_select())
            .order(orders::created_at.desc())
            .limit(limit)
            .offset(offset)
            .load(&mut conn)?;

        Ok::<_, AppError>(ListOrdersResponse {
            items: rows.into_iter().map(Into::into).collect(),
            total,
            page,
            limit,
        })
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(response))
}

/// GET /seller/orders
///
/// Orders received by the authenticated seller, newest first.
#[utoipa::path(
    get,
    path = "/seller/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (default 20, max 100)"),
    ),
    responses(
        (status = 200, description = "Paginated list of the seller's received orders", body = ListOrdersResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Requires the seller role"),
    ),
    tag = "orders"
)]
pub async fn list_seller_orders(
    pool: web::Data<DbPool>,
    session: AuthorizedSession,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let seller_id = session.require(Role::Seller)?.user_id;
    let (page, limit, offset) = clamp_paging(query.into_inner());

    let response = web::block(move || {
        let mut conn = pool.get()?;

        let total: i64 = orders::table
            .filter(orders::seller_id.eq(seller_id))
            .count()
            .get_result(&mut conn)?;

        let rows = orders::table
            .filter(orders::seller_id.eq(seller_id))
            .select(OrderRow::as_select())
            .order(orders::created_at.desc())
            .limit(limit)
            .offset(offset)
            .load(&mut conn)?;

        Ok::<_, AppError>(ListOrdersResponse {
            items: rows.into_iter().map(Into::into).collect(),
            total,
            page,
            limit,
        })
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(response))
}

/// GET /orders/{id}
///
/// Full order detail with item snapshots and the payment/delivery stubs.
/// Visible to the order's buyer, its seller, and admins; anyone else sees a
/// 404 rather than a confirmation the order exists.
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Order found", body = OrderDetailResponse),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Order not found or not visible to this user"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    pool: web::Data<DbPool>,
    session: AuthorizedSession,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    let response = web::block(move || {
        let mut conn = pool.get()?;

        let order: Option<OrderRow> = orders::table
            .filter(orders::id.eq(order_id))
            .select(OrderRow::as_select())
            .first(&mut conn)
            .optional()?;
        let Some(order) = order else {
            return Ok::<_, AppError>(None);
        };

        let visible = order.buyer_id == session.user_id
            || order.seller_id == session.user_id
            || session.is_admin();
        if !visible {
            return Ok(None);
        }

        let items: Vec<OrderItemRow> = order_items::table
            .filter(order_items::order_id.eq(order.id))
            .order(order_items::created_at.asc())
            .select(OrderItemRow::as_select())
            .load(&mut conn)?;

        let payment: Option<PaymentRow> = payments::table
            .filter(payments::order_id.eq(order.id))
            .select(PaymentRow::as_select())
            .first(&mut conn)
            .optional()?;

        let delivery: Option<DeliveryRow> = deliveries::table
            .filter(deliveries::order_id.eq(order.id))
            .select(DeliveryRow::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(Some(OrderDetailResponse {
            id: order.id,
            order_number: order.order_number,
            buyer_id: order.buyer_id,
            seller_id: order.seller_id,
            status: order.status,
            subtotal: order.subtotal.to_string(),
            tax_amount: order.tax_amount.to_string(),
            shipping_cost: order.shipping_cost.to_string(),
            discount_amount: order.discount_amount.to_string(),
            total_amount: order.total_amount.to_string(),
            currency: order.currency,
            shipping_address: order.shipping_address,
            created_at: order.created_at.to_rfc3339(),
            items: items
                .into_iter()
                .map(|item| OrderItemResponse {
                    id: item.id,
                    product_id: item.product_id,
                    product_name: item.product_name,
                    product_sku: item.product_sku,
                    price: item.price.to_string(),
                    quantity: item.quantity,
                    subtotal: item.subtotal.to_string(),
                })
                .collect(),
            payment: payment.map(|p| PaymentSummaryResponse {
                payment_method: p.payment_method,
                status: p.status,
                amount: p.amount.to_string(),
                currency: p.currency,
            }),
            delivery: delivery.map(|d| DeliverySummaryResponse {
                delivery_method: d.delivery_method,
                status: d.status,
                recipient_name: d.recipient_name,
                recipient_phone: d.recipient_phone,
            }),
        }))
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    match response {
        Some(order) => Ok(HttpResponse::Ok().json(order)),
        None => Err(AppError::NotFound),
    }
}
