use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{AuthorizedSession, Role};
use crate::db::DbPool;
use crate::domain::checkout::DEFAULT_CURRENCY;
use crate::errors::AppError;
use crate::infrastructure::models::{CartItemRow, NewCartItemRow, NewCartRow, ProductRow};
use crate::schema::{cart_items, carts, products};

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddCartItemRequest {
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCartItemRequest {
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub price: String,
    pub currency: String,
    pub quantity: i32,
    pub line_subtotal: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartResponse {
    pub cart_id: Option<Uuid>,
    pub items: Vec<CartItemResponse>,
    pub subtotal: String,
    pub currency: String,
}

impl CartResponse {
    fn empty() -> Self {
        CartResponse {
            cart_id: None,
            items: vec![],
            subtotal: BigDecimal::from(0).to_string(),
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /cart
///
/// The buyer's cart with each line joined to its product. A buyer without a
/// cart gets an empty response rather than a 404.
#[utoipa::path(
    get,
    path = "/cart",
    responses(
        (status = 200, description = "The buyer's cart", body = CartResponse),
        (status = 401, description = "Not authenticated"),
    ),
    tag = "cart"
)]
pub async fn view_cart(
    pool: web::Data<DbPool>,
    session: AuthorizedSession,
) -> Result<HttpResponse, AppError> {
    let user_id = session.require(Role::Buyer)?.user_id;

    let response = web::block(move || {
        let mut conn = pool.get()?;

        let cart_id: Option<Uuid> = carts::table
            .filter(carts::user_id.eq(user_id))
            .select(carts::id)
            .first(&mut conn)
            .optional()?;
        let Some(cart_id) = cart_id else {
            return Ok::<_, AppError>(CartResponse::empty());
        };

        let rows: Vec<(CartItemRow, ProductRow)> = cart_items::table
            .inner_join(products::table)
            .filter(cart_items::cart_id.eq(cart_id))
            .order((cart_items::created_at.asc(), cart_items::id.asc()))
            .select((CartItemRow::as_select(), ProductRow::as_select()))
            .load(&mut conn)?;

        let subtotal = rows.iter().fold(BigDecimal::from(0), |acc, (item, product)| {
            acc + &product.price * BigDecimal::from(item.quantity)
        });
        let currency = rows
            .first()
            .map(|(_, product)| product.currency.clone())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

        let items = rows
            .into_iter()
            .map(|(item, product)| {
                let line_subtotal = &product.price * BigDecimal::from(item.quantity);
                CartItemResponse {
                    id: item.id,
                    product_id: product.id,
                    product_name: product.name,
                    price: product.price.to_string(),
                    currency: product.currency,
                    quantity: item.quantity,
                    line_subtotal: line_subtotal.to_string(),
                }
            })
            .collect();

        Ok(CartResponse {
            cart_id: Some(cart_id),
            items,
            subtotal: subtotal.to_string(),
            currency,
        })
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(response))
}

/// POST /cart/items
///
/// Add a product to the buyer's cart, creating the cart on first use.
/// Adding a product already in the cart accumulates its quantity.
#[utoipa::path(
    post,
    path = "/cart/items",
    request_body = AddCartItemRequest,
    responses(
        (status = 201, description = "Item added"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Product unknown or inactive"),
        (status = 422, description = "Quantity below 1"),
    ),
    tag = "cart"
)]
pub async fn add_item(
    pool: web::Data<DbPool>,
    session: AuthorizedSession,
    body: web::Json<AddCartItemRequest>,
) -> Result<HttpResponse, AppError> {
    let user_id = session.require(Role::Buyer)?.user_id;
    let body = body.into_inner();
    if body.quantity < 1 {
        return Err(AppError::Validation { field: "quantity" });
    }

    let (cart_id, item_id) = web::block(move || {
        let mut conn = pool.get()?;

        let active: Option<bool> = products::table
            .filter(products::id.eq(body.product_id))
            .select(products::is_active)
            .first(&mut conn)
            .optional()?;
        if active != Some(true) {
            return Err(AppError::NotFound);
        }

        let cart_id: Option<Uuid> = carts::table
            .filter(carts::user_id.eq(user_id))
            .select(carts::id)
            .first(&mut conn)
            .optional()?;
        let cart_id = match cart_id {
            Some(id) => id,
            None => {
                let id = Uuid::new_v4();
                diesel::insert_into(carts::table)
                    .values(&NewCartRow { id, user_id })
                    .execute(&mut conn)?;
                id
            }
        };

        let item_id: Uuid = diesel::insert_into(cart_items::table)
            .values(&NewCartItemRow {
                id: Uuid::new_v4(),
                cart_id,
                product_id: body.product_id,
                variant_id: body.variant_id,
                quantity: body.quantity,
            })
            .on_conflict((cart_items::cart_id, cart_items::product_id))
            .do_update()
            .set(cart_items::quantity.eq(cart_items::quantity + body.quantity))
            .returning(cart_items::id)
            .get_result(&mut conn)?;

        Ok((cart_id, item_id))
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(json!({ "cart_id": cart_id, "item_id": item_id })))
}

/// PATCH /cart/items/{id}
#[utoipa::path(
    patch,
    path = "/cart/items/{id}",
    params(("id" = Uuid, Path, description = "Cart item UUID")),
    request_body = UpdateCartItemRequest,
    responses(
        (status = 204, description = "Quantity updated"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "No such item in this buyer's cart"),
        (status = 422, description = "Quantity below 1"),
    ),
    tag = "cart"
)]
pub async fn update_item(
    pool: web::Data<DbPool>,
    session: AuthorizedSession,
    path: web::Path<Uuid>,
    body: web::Json<UpdateCartItemRequest>,
) -> Result<HttpResponse, AppError> {
    let user_id = session.require(Role::Buyer)?.user_id;
    let item_id = path.into_inner();
    let quantity = body.into_inner().quantity;
    if quantity < 1 {
        return Err(AppError::Validation { field: "quantity" });
    }

    let updated = web::block(move || {
        let mut conn = pool.get()?;
        // Scoped to the buyer's own cart so foreign item ids read as absent.
        let owned_cart_ids = carts::table
            .filter(carts::user_id.eq(user_id))
            .select(carts::id);
        let updated = diesel::update(
            cart_items::table
                .filter(cart_items::id.eq(item_id))
                .filter(cart_items::cart_id.eq_any(owned_cart_ids)),
        )
        .set(cart_items::quantity.eq(quantity))
        .execute(&mut conn)?;
        Ok::<_, AppError>(updated)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    if updated == 0 {
        return Err(AppError::NotFound);
    }
    Ok(HttpResponse::NoContent().finish())
}

/// DELETE /cart/items/{id}
#[utoipa::path(
    delete,
    path = "/cart/items/{id}",
    params(("id" = Uuid, Path, description = "Cart item UUID")),
    responses(
        (status = 204, description = "Item removed"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "No such item in this buyer's cart"),
    ),
    tag = "cart"
)]
pub async fn remove_item(
    pool: web::Data<DbPool>,
    session: AuthorizedSession,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let user_id = session.require(Role::Buyer)?.user_id;
    let item_id = path.into_inner();

    let deleted = web::block(move || {
        let mut conn = pool.get()?;
        let owned_cart_ids = carts::table
            .filter(carts::user_id.eq(user_id))
            .select(carts::id);
        let deleted = diesel::delete(
            cart_items::table
                .filter(cart_items::id.eq(item_id))
                .filter(cart_items::cart_id.eq_any(owned_cart_ids)),
        )
        .execute(&mut conn)?;
        Ok::<_, AppError>(deleted)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    if deleted == 0 {
        return Err(AppError::NotFound);
    }
    Ok(HttpResponse::NoContent().finish())
}
