use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;

use super::count_rows;
use crate::database::manager::DatabaseError;
use crate::database::models::{Order, OrderItem, Sales};
use crate::database::paginate::Paginated;

const ORDER_COLUMNS: &str = "id, first_name, last_name, email, created_at, updated_at";

pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Every order with its items, for the CSV export
    pub async fn all_with_items(&self) -> Result<Vec<Order>, DatabaseError> {
        let sql = format!("SELECT {} FROM orders ORDER BY id", ORDER_COLUMNS);
        let orders = sqlx::query_as::<_, Order>(&sql).fetch_all(&self.pool).await?;
        self.load_items(orders).await
    }

    /// Revenue per calendar day, oldest first
    pub async fn daily_sales(&self) -> Result<Vec<Sales>, DatabaseError> {
        let sales = sqlx::query_as::<_, Sales>(
            "SELECT to_char(o.created_at, 'YYYY-MM-DD') AS date, \
                    SUM(oi.price * oi.quantity) AS sum \
             FROM orders o JOIN order_items oi ON oi.order_id = o.id \
             GROUP BY date ORDER BY date",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(sales)
    }

    async fn load_items(&self, orders: Vec<Order>) -> Result<Vec<Order>, DatabaseError> {
        if orders.is_empty() {
            return Ok(orders);
        }
        let ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT id, order_id, product_title, price, quantity FROM order_items \
             WHERE order_id = ANY($1) ORDER BY id",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(attach_items(orders, items))
    }
}

fn attach_items(orders: Vec<Order>, items: Vec<OrderItem>) -> Vec<Order> {
    let mut grouped: HashMap<i64, Vec<OrderItem>> = HashMap::new();
    for item in items {
        grouped.entry(item.order_id).or_default().push(item);
    }

    orders
        .into_iter()
        .map(|order| {
            let items = grouped.remove(&order.id).unwrap_or_default();
            order.with_items(items)
        })
        .collect()
}

#[async_trait]
impl Paginated for OrderRepository {
    type Item = Order;

    async fn count(&self) -> Result<i64, DatabaseError> {
        count_rows(&self.pool, "orders").await
    }

    async fn fetch_page(&self, limit: i64, offset: i64) -> Result<Vec<Order>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM orders ORDER BY id LIMIT $1 OFFSET $2",
            ORDER_COLUMNS
        );
        let orders = sqlx::query_as::<_, Order>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        self.load_items(orders).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn order(id: i64) -> Order {
        Order {
            id,
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            order_items: Vec::new(),
            name: String::new(),
            total: Decimal::ZERO,
        }
    }

    fn item(id: i64, order_id: i64, price: i64, quantity: i32) -> OrderItem {
        OrderItem {
            id,
            order_id,
            product_title: format!("item {}", id),
            price: Decimal::from(price),
            quantity,
        }
    }

    #[test]
    fn items_land_on_their_own_order() {
        let orders = attach_items(
            vec![order(1), order(2), order(3)],
            vec![item(1, 1, 10, 1), item(2, 2, 3, 2), item(3, 1, 5, 2)],
        );

        assert_eq!(orders[0].order_items.len(), 2);
        assert_eq!(orders[0].total, Decimal::from(20));
        assert_eq!(orders[1].total, Decimal::from(6));
        assert!(orders[2].order_items.is_empty());
        assert_eq!(orders[2].total, Decimal::ZERO);
        assert_eq!(orders[2].name, "Ada Lovelace");
    }
}
