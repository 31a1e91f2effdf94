pub mod seed;
pub mod token;
