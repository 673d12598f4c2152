//! External metrics fetch port for repository and package counters.

use crate::project::domain::GithubRepo;
use async_trait::async_trait;
use thiserror::Error;

/// Star and fork counters for a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RepositoryMetrics {
    /// Stargazer count.
    pub stars: u64,
    /// Fork count.
    pub forks: u64,
}

/// Download counter for a published package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PackageMetrics {
    /// Download count over the provider's reporting window.
    pub downloads: u64,
}

/// Errors returned by metrics providers.
#[derive(Debug, Clone, Error)]
pub enum MetricsError {
    /// The provider could not be reached or rejected the request.
    #[error("metrics provider unavailable: {0}")]
    Unavailable(String),
}

/// On-demand metrics fetch contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetricsProvider: Send + Sync {
    /// Fetches star and fork counters for a repository slug.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError`] when the fetch fails.
    async fn repository_metrics(
        &self,
        repo: &GithubRepo,
    ) -> Result<RepositoryMetrics, MetricsError>;

    /// Fetches the download counter for an npm package.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError`] when the fetch fails.
    async fn package_metrics(&self, package: &str) -> Result<PackageMetrics, MetricsError>;
}
