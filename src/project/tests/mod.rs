//! Unit tests for the project registry module.
//!
//! Tests are organised by concept: domain validation and update semantics,
//! the invitation response machine, and service orchestration over the
//! in-memory adapters.

mod domain_tests;
