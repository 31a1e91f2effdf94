pub mod manager;
pub mod models;
pub mod paginate;
pub mod repository;

pub use manager::{connect_pool, health_check, DatabaseError};
pub use paginate::{paginate, Page, PageMeta, Paginated, PAGE_SIZE};
