use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Order {
    pub id: i64,
    #[serde(skip_serializing)]
    pub first_name: String,
    #[serde(skip_serializing)]
    pub last_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(skip)]
    pub order_items: Vec<OrderItem>,

    // Derived at read time, not stored
    #[sqlx(skip)]
    pub name: String,
    #[sqlx(skip)]
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_title: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: i32,
}

/// Daily sales total for the dashboard chart
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Sales {
    pub date: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub sum: Decimal,
}

impl OrderItem {
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

impl Order {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Attach items and fill in `name` and `total`
    pub fn with_items(mut self, items: Vec<OrderItem>) -> Self {
        self.total = items.iter().map(OrderItem::line_total).sum();
        self.name = self.full_name();
        self.order_items = items;
        self
    }
}
