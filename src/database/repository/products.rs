use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;

use super::{count_rows, expect_affected};
use crate::database::manager::DatabaseError;
use crate::database::models::Product;
use crate::database::paginate::Paginated;

pub struct NewProduct {
    pub title: String,
    pub description: String,
    pub image: String,
    pub price: Decimal,
}

#[derive(Debug, Default)]
pub struct ProductChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub price: Option<Decimal>,
}

pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, id: i64) -> Result<Option<Product>, DatabaseError> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, title, description, image, price FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    pub async fn create(&self, new: NewProduct) -> Result<Product, DatabaseError> {
        sqlx::query_as::<_, Product>(
            "INSERT INTO products (title, description, image, price) VALUES ($1, $2, $3, $4) \
             RETURNING id, title, description, image, price",
        )
        .bind(new.title)
        .bind(new.description)
        .bind(new.image)
        .bind(new.price)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::classify)
    }

    pub async fn update(&self, id: i64, changes: ProductChanges) -> Result<Product, DatabaseError> {
        sqlx::query_as::<_, Product>(
            "UPDATE products SET \
                title = COALESCE($2, title), \
                description = COALESCE($3, description), \
                image = COALESCE($4, image), \
                price = COALESCE($5, price) \
             WHERE id = $1 RETURNING id, title, description, image, price",
        )
        .bind(id)
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.image)
        .bind(changes.price)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::classify)?
        .ok_or_else(|| DatabaseError::NotFound(format!("product {} not found", id)))
    }

    pub async fn delete(&self, id: i64) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        expect_affected(result.rows_affected(), "product", id)
    }
}

#[async_trait]
impl Paginated for ProductRepository {
    type Item = Product;

    async fn count(&self) -> Result<i64, DatabaseError> {
        count_rows(&self.pool, "products").await
    }

    async fn fetch_page(&self, limit: i64, offset: i64) -> Result<Vec<Product>, DatabaseError> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT id, title, description, image, price FROM products \
             ORDER BY id LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }
}
