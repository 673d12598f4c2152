//! `PostgreSQL` adapters for registry persistence.

pub mod models;
pub mod repository;
pub mod schema;

pub use repository::{PostgresRegistry, RegistryPgPool};
