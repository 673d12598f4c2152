//! Project aggregate root and lifecycle status.

use super::{GithubRepo, ProjectDomainError, ParseProjectStatusError, ProjectId, ProjectSlug};
use crate::identity::SubjectId;
use crate::patch::FieldPatch;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Project release status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    /// Scoping and design, no code yet.
    Planning,
    /// Active development.
    Development,
    /// Internal testing.
    Alpha,
    /// External testing.
    Beta,
    /// Generally available.
    OfficialRelease,
}

impl ProjectStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::Development => "development",
            Self::Alpha => "alpha",
            Self::Beta => "beta",
            Self::OfficialRelease => "official-release",
        }
    }
}

impl TryFrom<&str> for ProjectStatus {
    type Error = ParseProjectStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "planning" => Ok(Self::Planning),
            "development" => Ok(Self::Development),
            "alpha" => Ok(Self::Alpha),
            "beta" => Ok(Self::Beta),
            "official-release" => Ok(Self::OfficialRelease),
            _ => Err(ParseProjectStatusError(value.to_owned())),
        }
    }
}

/// Descriptive fields captured at project creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSeed {
    name: String,
    description: String,
    kind: String,
    category: String,
    status: ProjectStatus,
    github_url: Option<String>,
    github_repo: Option<GithubRepo>,
    npm_package: Option<String>,
}

impl ProjectSeed {
    /// Creates a seed with defaults: a commercial SaaS project in planning.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::EmptyProjectName`] when the name is
    /// empty after trimming.
    pub fn new(name: impl Into<String>) -> Result<Self, ProjectDomainError> {
        let raw = name.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ProjectDomainError::EmptyProjectName);
        }
        Ok(Self {
            name: trimmed.to_owned(),
            description: String::new(),
            kind: "saas".to_owned(),
            category: "commercial".to_owned(),
            status: ProjectStatus::Planning,
            github_url: None,
            github_repo: None,
            npm_package: None,
        })
    }

    /// Sets the project description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the project kind (e.g. "saas", "library").
    #[must_use]
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Sets the project category (e.g. "commercial", "open-source").
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Sets the release status.
    #[must_use]
    pub const fn with_status(mut self, status: ProjectStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the GitHub URL.
    #[must_use]
    pub fn with_github_url(mut self, url: impl Into<String>) -> Self {
        self.github_url = Some(url.into());
        self
    }

    /// Sets an explicit repository slug, overriding URL derivation.
    #[must_use]
    pub fn with_github_repo(mut self, repo: GithubRepo) -> Self {
        self.github_repo = Some(repo);
        self
    }

    /// Sets the npm package name.
    #[must_use]
    pub fn with_npm_package(mut self, package: impl Into<String>) -> Self {
        self.npm_package = Some(package.into());
        self
    }
}

/// Partial update for project fields.
///
/// Unset fields leave the stored value untouched. Clearable fields use
/// [`FieldPatch`] so clearing and keeping stay distinguishable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProjectUpdate {
    name: Option<String>,
    description: Option<String>,
    kind: Option<String>,
    category: Option<String>,
    status: Option<ProjectStatus>,
    github_url: FieldPatch<String>,
    github_repo: FieldPatch<GithubRepo>,
    npm_package: FieldPatch<String>,
}

impl ProjectUpdate {
    /// Creates an empty update touching nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the project name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Replaces the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Replaces the project kind.
    #[must_use]
    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Replaces the category.
    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Replaces the release status.
    #[must_use]
    pub const fn status(mut self, status: ProjectStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets or clears the GitHub URL.
    #[must_use]
    pub fn github_url(mut self, patch: FieldPatch<String>) -> Self {
        self.github_url = patch;
        self
    }

    /// Sets or clears the repository slug explicitly.
    #[must_use]
    pub fn github_repo(mut self, patch: FieldPatch<GithubRepo>) -> Self {
        self.github_repo = patch;
        self
    }

    /// Sets or clears the npm package name.
    #[must_use]
    pub fn npm_package(mut self, patch: FieldPatch<String>) -> Self {
        self.npm_package = patch;
        self
    }
}

/// Project aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    id: ProjectId,
    slug: ProjectSlug,
    name: String,
    description: String,
    kind: String,
    category: String,
    status: ProjectStatus,
    github_url: Option<String>,
    github_repo: Option<GithubRepo>,
    github_stars: u64,
    github_forks: u64,
    npm_package: Option<String>,
    npm_downloads: u64,
    owner: SubjectId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted project aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedProjectData {
    /// Persisted project identifier.
    pub id: ProjectId,
    /// Persisted human-facing slug.
    pub slug: ProjectSlug,
    /// Persisted name.
    pub name: String,
    /// Persisted description.
    pub description: String,
    /// Persisted kind.
    pub kind: String,
    /// Persisted category.
    pub category: String,
    /// Persisted release status.
    pub status: ProjectStatus,
    /// Persisted GitHub URL, if any.
    pub github_url: Option<String>,
    /// Persisted repository slug, if any.
    pub github_repo: Option<GithubRepo>,
    /// Persisted star counter.
    pub github_stars: u64,
    /// Persisted fork counter.
    pub github_forks: u64,
    /// Persisted npm package name, if any.
    pub npm_package: Option<String>,
    /// Persisted npm download counter.
    pub npm_downloads: u64,
    /// Persisted owner subject.
    pub owner: SubjectId,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest lifecycle timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Creates a new project owned by the given subject.
    ///
    /// Derives the repository slug from the GitHub URL when the seed does
    /// not carry an explicit one. Counters start at zero.
    #[must_use]
    pub fn new(owner: SubjectId, seed: ProjectSeed, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        let id = ProjectId::new();
        let slug = ProjectSlug::derive(&seed.name, id);
        let github_repo = seed.github_repo.or_else(|| {
            seed.github_url
                .as_deref()
                .and_then(GithubRepo::from_url)
        });

        Self {
            id,
            slug,
            name: seed.name,
            description: seed.description,
            kind: seed.kind,
            category: seed.category,
            status: seed.status,
            github_url: seed.github_url,
            github_repo,
            github_stars: 0,
            github_forks: 0,
            npm_package: seed.npm_package,
            npm_downloads: 0,
            owner,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a project from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedProjectData) -> Self {
        Self {
            id: data.id,
            slug: data.slug,
            name: data.name,
            description: data.description,
            kind: data.kind,
            category: data.category,
            status: data.status,
            github_url: data.github_url,
            github_repo: data.github_repo,
            github_stars: data.github_stars,
            github_forks: data.github_forks,
            npm_package: data.npm_package,
            npm_downloads: data.npm_downloads,
            owner: data.owner,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the project identifier.
    #[must_use]
    pub const fn id(&self) -> ProjectId {
        self.id
    }

    /// Returns the human-facing slug.
    #[must_use]
    pub const fn slug(&self) -> &ProjectSlug {
        &self.slug
    }

    /// Returns the project name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the project kind.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns the category.
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Returns the release status.
    #[must_use]
    pub const fn status(&self) -> ProjectStatus {
        self.status
    }

    /// Returns the GitHub URL, if any.
    #[must_use]
    pub fn github_url(&self) -> Option<&str> {
        self.github_url.as_deref()
    }

    /// Returns the derived or explicit repository slug, if any.
    #[must_use]
    pub const fn github_repo(&self) -> Option<&GithubRepo> {
        self.github_repo.as_ref()
    }

    /// Returns the star counter.
    #[must_use]
    pub const fn github_stars(&self) -> u64 {
        self.github_stars
    }

    /// Returns the fork counter.
    #[must_use]
    pub const fn github_forks(&self) -> u64 {
        self.github_forks
    }

    /// Returns the npm package name, if any.
    #[must_use]
    pub fn npm_package(&self) -> Option<&str> {
        self.npm_package.as_deref()
    }

    /// Returns the npm download counter.
    #[must_use]
    pub const fn npm_downloads(&self) -> u64 {
        self.npm_downloads
    }

    /// Returns the owner subject. Ownership is immutable after creation.
    #[must_use]
    pub const fn owner(&self) -> &SubjectId {
        &self.owner
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest lifecycle timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Applies a partial update and refreshes `updated_at`.
    ///
    /// Clearing the GitHub URL keeps the previously derived repository
    /// slug; setting a new URL re-derives the slug only when the URL
    /// parses and no explicit slug patch is present.
    pub fn apply_update(&mut self, update: ProjectUpdate, clock: &impl Clock) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(kind) = update.kind {
            self.kind = kind;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(status) = update.status {
            self.status = status;
        }

        if let FieldPatch::Set(ref url) = update.github_url {
            if update.github_repo.is_keep() {
                if let Some(repo) = GithubRepo::from_url(url) {
                    self.github_repo = Some(repo);
                }
            }
        }
        update.github_url.apply(&mut self.github_url);
        update.github_repo.apply(&mut self.github_repo);
        update.npm_package.apply(&mut self.npm_package);

        self.touch(clock);
    }

    /// Replaces the GitHub metrics counters.
    pub fn record_github_metrics(&mut self, stars: u64, forks: u64, clock: &impl Clock) {
        self.github_stars = stars;
        self.github_forks = forks;
        self.touch(clock);
    }

    /// Replaces the npm download counter.
    pub fn record_npm_metrics(&mut self, downloads: u64, clock: &impl Clock) {
        self.npm_downloads = downloads;
        self.touch(clock);
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
