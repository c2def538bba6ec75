use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
pub use storefront_common::Cents;
use thiserror::Error;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
        #[sqlx(transparent)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl FromStr for $name {
            type Err = ();

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.to_string()))
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }
    };
}

//--------------------------------------   Identifiers        ---------------------------------------------------------
string_id!(
    /// Opaque, unguessable order identifier. It is the only link between a local order and the gateway's checkout
    /// session, so it is generated server-side from a v4 UUID.
    OrderId
);
string_id!(StoreId);
string_id!(ProductId);

impl OrderId {
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatusType {
    /// The order has been created locally and is waiting for the gateway to confirm payment.
    Pending,
    /// The gateway has confirmed payment. Terminal.
    Paid,
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::Pending => write!(f, "Pending"),
            OrderStatusType::Paid => write!(f, "Paid"),
        }
    }
}

impl From<String> for OrderStatusType {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status: {value}. But this conversion cannot fail. Defaulting to Pending");
            OrderStatusType::Pending
        })
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid order status: {0}")]
pub struct ConversionError(String);

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" | "pending" => Ok(Self::Pending),
            "Paid" | "paid" => Ok(Self::Paid),
            s => Err(ConversionError(s.to_string())),
        }
    }
}

//--------------------------------------        Store          ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Store {
    pub id: StoreId,
    /// The store owner
    pub user_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------       Product         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub store_id: StoreId,
    pub name: String,
    /// Products without a price can be listed but not bought.
    pub price: Option<Cents>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------      OrderItem        ---------------------------------------------------------
/// A single line of an order. Name and unit price are copies of the catalog values at checkout time.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub product_name: String,
    pub unit_price: Cents,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    pub fn line_total(&self) -> Cents {
        self.unit_price * self.quantity
    }
}

//--------------------------------------        Order          ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub store_id: StoreId,
    pub user_id: String,
    pub status: OrderStatusType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(skip)]
    pub items: Vec<OrderItem>,
}

impl Order {
    pub fn total_price(&self) -> Cents {
        self.items.iter().map(OrderItem::line_total).sum()
    }

    pub fn is_paid(&self) -> bool {
        self.status == OrderStatusType::Paid
    }
}

//--------------------------------------      LineItem         ---------------------------------------------------------
/// A priced line as resolved from the catalog during checkout. It is what gets written as an [`OrderItem`] and what
/// gets sent to the payment gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Cents,
    pub quantity: i64,
}

impl LineItem {
    pub fn new(product_id: ProductId, name: String, unit_price: Cents, quantity: i64) -> Self {
        Self { product_id, name, unit_price, quantity }
    }

    pub fn line_total(&self) -> Cents {
        self.unit_price * self.quantity
    }
}

impl From<&OrderItem> for LineItem {
    fn from(item: &OrderItem) -> Self {
        Self {
            product_id: item.product_id.clone(),
            name: item.product_name.clone(),
            unit_price: item.unit_price,
            quantity: item.quantity,
        }
    }
}

//--------------------------------------        NewOrder       ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewOrder {
    /// Generated when the order is built. Never supplied by the client.
    pub id: OrderId,
    pub store_id: StoreId,
    /// The buyer, as identified by the external identity provider
    pub user_id: String,
    pub items: Vec<LineItem>,
    pub created_at: DateTime<Utc>,
}

impl NewOrder {
    pub fn new(store_id: StoreId, user_id: String, items: Vec<LineItem>) -> Self {
        Self { id: OrderId::random(), store_id, user_id, items, created_at: Utc::now() }
    }

    pub fn total_price(&self) -> Cents {
        self.items.iter().map(LineItem::line_total).sum()
    }
}
