use axum::{
    extract::{Path, Query, State},
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

use crate::database::models::Product;
use crate::database::paginate::paginate;
use crate::database::repository::{NewProduct, ProductChanges, ProductRepository};
use crate::error::ApiError;
use crate::handlers::PageQuery;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    pub price: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub price: Option<Decimal>,
}

fn check_price(price: Option<Decimal>) -> Result<(), ApiError> {
    match price {
        Some(p) if p.is_sign_negative() => {
            Err(ApiError::field_error("price", "Price cannot be negative"))
        }
        _ => Ok(()),
    }
}

/// GET /api/products - one page of products
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Vec<Product>> {
    let page = paginate(&ProductRepository::new(state.pool.clone()), query.page()).await?;
    Ok(ApiResponse::paged(page))
}

/// POST /api/products
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateProductRequest>,
) -> ApiResult<Product> {
    if body.title.trim().is_empty() {
        return Err(ApiError::field_error("title", "Title is required"));
    }
    check_price(Some(body.price))?;

    let product = ProductRepository::new(state.pool.clone())
        .create(NewProduct {
            title: body.title,
            description: body.description,
            image: body.image,
            price: body.price,
        })
        .await?;

    info!(product_id = product.id, "created product");
    Ok(ApiResponse::created(product))
}

/// GET /api/products/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Product> {
    let product = ProductRepository::new(state.pool.clone())
        .find(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("product {} not found", id)))?;
    Ok(ApiResponse::success(product))
}

/// PUT /api/products/:id - partial update
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateProductRequest>,
) -> ApiResult<Product> {
    check_price(body.price)?;

    let product = ProductRepository::new(state.pool.clone())
        .update(
            id,
            ProductChanges {
                title: body.title,
                description: body.description,
                image: body.image,
                price: body.price,
            },
        )
        .await?;
    Ok(ApiResponse::success(product))
}

/// DELETE /api/products/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<()> {
    ProductRepository::new(state.pool.clone()).delete(id).await?;
    info!(product_id = id, "deleted product");
    Ok(ApiResponse::<()>::no_content())
}
