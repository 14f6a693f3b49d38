use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Every marketplace listing is priced in kwacha today. Carried on the
/// product row so a future multi-currency catalog does not require a schema
/// change.
pub const DEFAULT_CURRENCY: &str = "ZMW";

fn default_country() -> String {
    "Zambia".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    MobileMoneyMtn,
    MobileMoneyAirtel,
    MobileMoneyZamtel,
    Card,
    CashOnDelivery,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::MobileMoneyMtn => "mobile_money_mtn",
            PaymentMethod::MobileMoneyAirtel => "mobile_money_airtel",
            PaymentMethod::MobileMoneyZamtel => "mobile_money_zamtel",
            PaymentMethod::Card => "card",
            PaymentMethod::CashOnDelivery => "cash_on_delivery",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    PlatformCourier,
    ThirdPartyCourier,
    SellerPickup,
}

impl DeliveryMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryMethod::PlatformCourier => "platform_courier",
            DeliveryMethod::ThirdPartyCourier => "third_party_courier",
            DeliveryMethod::SellerPickup => "seller_pickup",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Refunded => "refunded",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Processing => "processing",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Pending,
    Assigned,
    InTransit,
    Delivered,
    Failed,
    Returned,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "pending",
            DeliveryStatus::Assigned => "assigned",
            DeliveryStatus::InTransit => "in_transit",
            DeliveryStatus::Delivered => "delivered",
            DeliveryStatus::Failed => "failed",
            DeliveryStatus::Returned => "returned",
        }
    }
}

/// Shipping address as submitted at checkout. Stored verbatim as JSONB on
/// the order and the delivery so later profile edits never rewrite history.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ShippingAddress {
    pub full_name: String,
    pub phone: String,
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: Option<String>,
    pub city: String,
    pub province: String,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default)]
    pub delivery_notes: Option<String>,
}

/// One cart line joined with the product fields the checkout needs.
///
/// `seller_id` is optional because a product can lose its seller reference
/// (seller account deletion); such lines cannot be checked out.
#[derive(Debug, Clone)]
pub struct CartLine {
    pub item_id: Uuid,
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    pub seller_id: Option<Uuid>,
    pub product_name: String,
    pub product_sku: Option<String>,
    pub price: BigDecimal,
    pub currency: String,
    pub quantity: i32,
}

impl CartLine {
    pub fn line_subtotal(&self) -> BigDecimal {
        &self.price * BigDecimal::from(self.quantity)
    }
}

#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    /// Client-generated, unique per submission. A replayed id is refused so a
    /// double-click or network retry cannot duplicate per-seller orders.
    pub attempt_id: Uuid,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
}

/// Order write record handed to the store. Amounts satisfy
/// `total_amount = subtotal + shipping_cost + tax_amount - discount_amount`.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_number: String,
    pub buyer_id: Uuid,
    pub seller_id: Uuid,
    pub status: OrderStatus,
    pub subtotal: BigDecimal,
    pub tax_amount: BigDecimal,
    pub shipping_cost: BigDecimal,
    pub discount_amount: BigDecimal,
    pub total_amount: BigDecimal,
    pub currency: String,
    pub shipping_address: ShippingAddress,
    pub billing_address: ShippingAddress,
}

/// Immutable snapshot of a product at purchase time. Later product edits
/// must not retroactively alter historical orders.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    pub product_name: String,
    pub product_sku: Option<String>,
    pub price: BigDecimal,
    pub quantity: i32,
    pub subtotal: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub amount: BigDecimal,
    pub currency: String,
}

#[derive(Debug, Clone)]
pub struct NewDelivery {
    pub method: DeliveryMethod,
    pub status: DeliveryStatus,
    pub address: ShippingAddress,
    pub recipient_name: String,
    pub recipient_phone: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order_id: Uuid,
    pub order_number: String,
    pub seller_id: Uuid,
    pub subtotal: BigDecimal,
    pub total_amount: BigDecimal,
    pub currency: String,
    pub item_count: usize,
}

#[derive(Debug, Clone)]
pub struct CheckoutReceipt {
    pub cart_id: Uuid,
    pub orders: Vec<PlacedOrder>,
}
