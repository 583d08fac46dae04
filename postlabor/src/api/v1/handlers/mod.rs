pub mod admin;
pub mod health;
pub mod research;

pub use health::{health_check, ping};
