//! Error types for refinement thread validation and parsing.

use super::RefinementId;
use thiserror::Error;

/// Errors returned while constructing refinement entries.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RefinementDomainError {
    /// The entry content is empty after trimming.
    #[error("refinement content must not be empty")]
    EmptyContent,

    /// Answers can only be posted through the answer flow, referencing the
    /// question they resolve.
    #[error("answers must reference the question they answer")]
    AnswerOutsideThread,

    /// The referenced entry is not a question.
    #[error("refinement {0} is not a question")]
    NotAQuestion(RefinementId),
}

/// Error returned while parsing refinement kinds from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown refinement kind: {0}")]
pub struct ParseRefinementKindError(pub String);

/// Error returned while parsing author roles from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown author role: {0}")]
pub struct ParseAuthorRoleError(pub String);
