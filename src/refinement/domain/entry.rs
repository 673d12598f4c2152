//! Refinement entries: notes, questions, answers, and updates on a task.

use super::{
    ParseAuthorRoleError, ParseRefinementKindError, RefinementDomainError, RefinementId,
};
use crate::identity::{EmailAddress, SubjectId};
use crate::task::domain::TaskId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Kind of a refinement entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefinementKind {
    /// Free-form note.
    Note,
    /// Question awaiting an owner answer.
    Question,
    /// Owner answer referencing a question.
    Answer,
    /// Progress update.
    Update,
}

impl RefinementKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Question => "question",
            Self::Answer => "answer",
            Self::Update => "update",
        }
    }
}

impl TryFrom<&str> for RefinementKind {
    type Error = ParseRefinementKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "note" => Ok(Self::Note),
            "question" => Ok(Self::Question),
            "answer" => Ok(Self::Answer),
            "update" => Ok(Self::Update),
            _ => Err(ParseRefinementKindError(value.to_owned())),
        }
    }
}

/// Author's relationship to the task, snapshotted at post time rather
/// than resolved live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorRole {
    /// The author owned the task when posting.
    Owner,
    /// The author was a share member when posting.
    Collaborator,
}

impl AuthorRole {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Collaborator => "collaborator",
        }
    }
}

impl TryFrom<&str> for AuthorRole {
    type Error = ParseAuthorRoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "owner" => Ok(Self::Owner),
            "collaborator" => Ok(Self::Collaborator),
            _ => Err(ParseAuthorRoleError(value.to_owned())),
        }
    }
}

/// Attribution of a refinement entry's author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    /// Author subject identifier.
    pub subject: SubjectId,
    /// Author email at post time.
    pub email: EmailAddress,
    /// Author display name at post time, if any.
    pub name: Option<String>,
}

/// A single entry in a task's refinement thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refinement {
    id: RefinementId,
    task_id: TaskId,
    author: SubjectId,
    author_email: EmailAddress,
    author_name: Option<String>,
    role: AuthorRole,
    kind: RefinementKind,
    content: String,
    parent_id: Option<RefinementId>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

/// Parameter object for reconstructing a persisted refinement entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedRefinementData {
    /// Persisted entry identifier.
    pub id: RefinementId,
    /// Persisted task reference.
    pub task_id: TaskId,
    /// Persisted author subject.
    pub author: SubjectId,
    /// Persisted author email.
    pub author_email: EmailAddress,
    /// Persisted author display name, if any.
    pub author_name: Option<String>,
    /// Persisted role snapshot.
    pub role: AuthorRole,
    /// Persisted entry kind.
    pub kind: RefinementKind,
    /// Persisted content.
    pub content: String,
    /// Persisted question reference for answers.
    pub parent_id: Option<RefinementId>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted edit timestamp, if any.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Refinement {
    /// Posts a note, question, or update to a task's thread.
    ///
    /// # Errors
    ///
    /// Returns [`RefinementDomainError::AnswerOutsideThread`] for
    /// [`RefinementKind::Answer`] — answers are created through
    /// [`Refinement::answer_to`] — and
    /// [`RefinementDomainError::EmptyContent`] for blank content.
    pub fn post(
        task_id: TaskId,
        author: Author,
        role: AuthorRole,
        kind: RefinementKind,
        content: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<Self, RefinementDomainError> {
        if kind == RefinementKind::Answer {
            return Err(RefinementDomainError::AnswerOutsideThread);
        }
        Self::build(task_id, author, role, kind, content, None, clock)
    }

    /// Posts an answer referencing the question it resolves.
    ///
    /// # Errors
    ///
    /// Returns [`RefinementDomainError::NotAQuestion`] when the referenced
    /// entry is not a question and
    /// [`RefinementDomainError::EmptyContent`] for blank content.
    pub fn answer_to(
        question: &Self,
        author: Author,
        content: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<Self, RefinementDomainError> {
        if question.kind != RefinementKind::Question {
            return Err(RefinementDomainError::NotAQuestion(question.id));
        }
        Self::build(
            question.task_id,
            author,
            AuthorRole::Owner,
            RefinementKind::Answer,
            content,
            Some(question.id),
            clock,
        )
    }

    fn build(
        task_id: TaskId,
        author: Author,
        role: AuthorRole,
        kind: RefinementKind,
        content: impl Into<String>,
        parent_id: Option<RefinementId>,
        clock: &impl Clock,
    ) -> Result<Self, RefinementDomainError> {
        let raw = content.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(RefinementDomainError::EmptyContent);
        }
        Ok(Self {
            id: RefinementId::new(),
            task_id,
            author: author.subject,
            author_email: author.email,
            author_name: author.name,
            role,
            kind,
            content: trimmed.to_owned(),
            parent_id,
            created_at: clock.utc(),
            updated_at: None,
        })
    }

    /// Reconstructs an entry from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedRefinementData) -> Self {
        Self {
            id: data.id,
            task_id: data.task_id,
            author: data.author,
            author_email: data.author_email,
            author_name: data.author_name,
            role: data.role,
            kind: data.kind,
            content: data.content,
            parent_id: data.parent_id,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the entry identifier.
    #[must_use]
    pub const fn id(&self) -> RefinementId {
        self.id
    }

    /// Returns the task reference.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the author subject.
    #[must_use]
    pub const fn author(&self) -> &SubjectId {
        &self.author
    }

    /// Returns the author email at post time.
    #[must_use]
    pub const fn author_email(&self) -> &EmailAddress {
        &self.author_email
    }

    /// Returns the author display name at post time, if any.
    #[must_use]
    pub fn author_name(&self) -> Option<&str> {
        self.author_name.as_deref()
    }

    /// Returns the role snapshot taken at post time.
    #[must_use]
    pub const fn role(&self) -> AuthorRole {
        self.role
    }

    /// Returns the entry kind.
    #[must_use]
    pub const fn kind(&self) -> RefinementKind {
        self.kind
    }

    /// Returns the content.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the referenced question for answers.
    #[must_use]
    pub const fn parent_id(&self) -> Option<RefinementId> {
        self.parent_id
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the edit timestamp, if the entry was ever edited.
    #[must_use]
    pub const fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}
