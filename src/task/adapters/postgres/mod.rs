//! `PostgreSQL` adapters for task lifecycle persistence.

pub mod models;
pub mod repository;
pub mod schema;

pub use repository::{PostgresTaskRepository, TaskPgPool};
