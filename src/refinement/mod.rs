//! Refinement threads: notes, questions, answers, and updates on tasks.
//!
//! Owners and share members discuss a task in a flat thread; only the
//! owner answers questions, and each answer references the question it
//! resolves. Author roles are snapshotted at post time. Depends on the
//! task engine only through the narrow [`ports::TaskDirectory`] view. The
//! module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
