//! Project and collaborator registry.
//!
//! Owns project CRUD, collaborator membership, and the email invitation
//! lifecycle: create, refresh, accept, decline, and lazy expiry. Invitation
//! notifications are dispatched fire-and-forget after the transactional
//! upsert. The module follows hexagonal architecture:
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
