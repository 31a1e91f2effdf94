// Public handlers: no session required

pub mod auth;

pub use auth::{login, register};
