//! Task lifecycle engine.
//!
//! Owns task CRUD, the start/stop/complete time-tracking state machine,
//! additive sharing with project collaborators, and the daily-selection
//! bookkeeping that lets a collaborator run a shared task for one calendar
//! day at a time. Depends on the project registry only through the narrow
//! [`ports::ProjectDirectory`] view. The module follows hexagonal
//! architecture:
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
