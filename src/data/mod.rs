//! Data layer
//!
//! SQLite persistence (sqlx) and the entity models.

mod database;
mod models;

pub use database::Database;
pub use models::*;
