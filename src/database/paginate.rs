//! Offset pagination shared by every list endpoint.
//!
//! An entity kind only has to say how many rows it has and how to load one
//! window of them; page arithmetic and the response shape live here.

use async_trait::async_trait;
use serde::Serialize;

use super::manager::DatabaseError;

/// Records per page, identical for every entity kind
pub const PAGE_SIZE: i64 = 5;

/// A paginable record source
#[async_trait]
pub trait Paginated: Send + Sync {
    type Item: Serialize + Send;

    /// Total rows for this entity kind
    async fn count(&self) -> Result<i64, DatabaseError>;

    /// One window of rows, with whatever eager loading the kind needs
    async fn fetch_page(&self, limit: i64, offset: i64) -> Result<Vec<Self::Item>, DatabaseError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub total: i64,
    pub page: i64,
    pub last_page: i64,
}

impl PageMeta {
    pub fn new(total: i64, page: i64) -> Self {
        Self {
            total,
            page,
            last_page: last_page(total),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

/// `ceil(total / PAGE_SIZE)`; an empty table has zero pages
pub fn last_page(total: i64) -> i64 {
    if total <= 0 {
        0
    } else {
        (total + PAGE_SIZE - 1) / PAGE_SIZE
    }
}

/// Row offset for a 1-indexed page. Pages below 1 are not rejected; the
/// offset is clamped so they read from the first row.
pub fn page_offset(page: i64) -> i64 {
    page.saturating_sub(1).max(0).saturating_mul(PAGE_SIZE)
}

pub async fn paginate<E>(entity: &E, page: i64) -> Result<Page<E::Item>, DatabaseError>
where
    E: Paginated + ?Sized,
{
    let data = entity.fetch_page(PAGE_SIZE, page_offset(page)).await?;
    let total = entity.count().await?;

    Ok(Page {
        data,
        meta: PageMeta::new(total, page),
    })
}
