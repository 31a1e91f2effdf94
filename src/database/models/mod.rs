pub mod order;
pub mod permission;
pub mod product;
pub mod role;
pub mod user;

pub use order::{Order, OrderItem, Sales};
pub use permission::Permission;
pub use product::Product;
pub use role::Role;
pub use user::User;
