//! Port contracts for refinement threads.
//!
//! Ports define infrastructure-agnostic interfaces used by thread
//! services.

pub mod directory;
pub mod repository;

pub use directory::{TaskAccessView, TaskDirectory, TaskDirectoryError};
pub use repository::{
    RefinementRepository, RefinementRepositoryError, RefinementRepositoryResult,
};
