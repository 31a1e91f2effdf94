use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::database::models::{Order, Sales};
use crate::database::paginate::paginate;
use crate::database::repository::OrderRepository;
use crate::error::ApiError;
use crate::handlers::PageQuery;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::export::write_orders_csv;
use crate::state::AppState;

/// GET /api/orders - one page of orders with items, name and total
pub async fn list(State(state): State<AppState>, Query(query): Query<PageQuery>) -> ApiResult<Vec<Order>> {
    let page = paginate(&OrderRepository::new(state.pool.clone()), query.page()).await?;
    Ok(ApiResponse::paged(page))
}

/// POST /api/export - every order as a CSV attachment
pub async fn export(State(state): State<AppState>) -> Result<Response, ApiError> {
    let orders = OrderRepository::new(state.pool.clone()).all_with_items().await?;

    let mut body = Vec::new();
    write_orders_csv(&orders, &mut body).map_err(|e| {
        tracing::error!("CSV export failed: {}", e);
        ApiError::internal_server_error("Could not build export")
    })?;

    tracing::info!(orders = orders.len(), "exported orders");
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"orders.csv\""),
        ],
        body,
    )
        .into_response())
}

/// GET /api/chart - revenue per day
pub async fn chart(State(state): State<AppState>) -> ApiResult<Vec<Sales>> {
    let sales = OrderRepository::new(state.pool.clone()).daily_sales().await?;
    Ok(ApiResponse::success(sales))
}
