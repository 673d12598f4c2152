//! Port contracts for the task lifecycle engine.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod directory;
pub mod repository;

pub use directory::{DirectoryError, ProjectDirectory, ProjectSummary};
pub use repository::{TaskRepository, TaskRepositoryError, TaskRepositoryResult};
