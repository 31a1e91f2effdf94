//! CSV rendering of orders for the export endpoint.
//!
//! Each order is one row carrying its id, customer name and email, followed
//! by one row per line item carrying title, price and quantity.

use std::io::Write;

use crate::database::models::Order;

pub const HEADER: [&str; 6] = ["ID", "Name", "Email", "Product Title", "Price", "Quantity"];

pub fn write_orders_csv<W: Write>(orders: &[Order], out: W) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(HEADER)?;

    for order in orders {
        let id = order.id.to_string();
        writer.write_record([id.as_str(), order.name.as_str(), order.email.as_str(), "", "", ""])?;

        for item in &order.order_items {
            let price = item.price.to_string();
            let quantity = item.quantity.to_string();
            writer.write_record(["", "", "", item.product_title.as_str(), price.as_str(), quantity.as_str()])?;
        }
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::OrderItem;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn order(id: i64, first: &str, last: &str, items: Vec<OrderItem>) -> Order {
        Order {
            id,
            first_name: first.into(),
            last_name: last.into(),
            email: format!("{}@example.com", first.to_lowercase()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            order_items: Vec::new(),
            name: String::new(),
            total: Decimal::ZERO,
        }
        .with_items(items)
    }

    fn item(order_id: i64, title: &str, price: &str, quantity: i32) -> OrderItem {
        OrderItem {
            id: 0,
            order_id,
            product_title: title.into(),
            price: Decimal::from_str(price).unwrap(),
            quantity,
        }
    }

    #[test]
    fn writes_order_then_item_rows() {
        let orders = vec![
            order(1, "Ada", "Lovelace", vec![item(1, "Lamp", "19.99", 2), item(1, "Bulb, warm", "3.50", 4)]),
            order(2, "Alan", "Turing", vec![]),
        ];

        let mut out = Vec::new();
        write_orders_csv(&orders, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "ID,Name,Email,Product Title,Price,Quantity",
                "1,Ada Lovelace,ada@example.com,,,",
                ",,,Lamp,19.99,2",
                ",,,\"Bulb, warm\",3.50,4",
                "2,Alan Turing,alan@example.com,,,",
            ]
        );
    }

    #[test]
    fn empty_export_is_header_only() {
        let mut out = Vec::new();
        write_orders_csv(&[], &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "ID,Name,Email,Product Title,Price,Quantity\n");
    }
}
