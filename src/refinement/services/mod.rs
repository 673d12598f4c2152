//! Application services for refinement threads.

mod thread;

pub use thread::{RefinementThreadError, RefinementThreadResult, RefinementThreadService};
