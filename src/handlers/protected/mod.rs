// Protected handlers: every route here sits behind the session middleware.
// Account routes act on the caller only; the rest also pass a resource guard.

pub mod account;
pub mod orders;
pub mod permissions;
pub mod products;
pub mod roles;
pub mod upload;
pub mod users;
