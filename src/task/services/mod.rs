//! Application services for task lifecycle orchestration.

mod lifecycle;

pub use lifecycle::{
    ExtractedTaskCandidate, ShareOutcome, TaskLifecycleError, TaskLifecycleResult,
    TaskLifecycleService, TaskListing,
};
