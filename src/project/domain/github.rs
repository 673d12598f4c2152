//! Validated GitHub repository slugs and URL derivation.

use super::ProjectDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized GitHub repository identifier in `owner/repo` format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GithubRepo(String);

impl GithubRepo {
    /// Creates a validated repository slug.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::InvalidGithubRepo`] if the value does
    /// not contain exactly one slash-delimited owner and repository segment.
    pub fn new(value: impl Into<String>) -> Result<Self, ProjectDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        let mut segments = normalized.split('/');
        let owner = segments.next().unwrap_or_default();
        let repo = segments.next().unwrap_or_default();
        let has_more_segments = segments.next().is_some();
        let is_valid = !owner.is_empty()
            && !repo.is_empty()
            && !has_more_segments
            && !normalized.chars().any(char::is_whitespace);

        if !is_valid {
            return Err(ProjectDomainError::InvalidGithubRepo(raw));
        }

        Ok(Self(normalized.to_owned()))
    }

    /// Derives a repository slug from a GitHub URL.
    ///
    /// Accepts any URL containing a `github.com/` host segment, takes the
    /// first two path segments as owner and repository, and strips a
    /// trailing `.git`. Returns `None` when no valid slug can be derived;
    /// an unparseable URL is not an error, the project simply keeps no
    /// derived repository.
    #[must_use]
    pub fn from_url(url: &str) -> Option<Self> {
        let (_, path) = url.split_once("github.com/")?;
        let mut segments = path.split('/');
        let owner = segments.next()?;
        let repo_raw = segments.next()?;
        let repo = repo_raw
            .split(['?', '#'])
            .next()
            .unwrap_or(repo_raw)
            .trim_end_matches(".git");
        Self::new(format!("{owner}/{repo}")).ok()
    }

    /// Returns the slug as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for GithubRepo {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for GithubRepo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
