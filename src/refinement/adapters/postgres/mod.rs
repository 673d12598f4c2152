//! `PostgreSQL` adapters for refinement persistence.

pub mod models;
pub mod repository;
pub mod schema;

pub use repository::{PostgresRefinementRepository, RefinementPgPool};
