//! In-memory notification and metrics doubles for tests and reference use.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::project::{
    domain::GithubRepo,
    ports::{
        InvitationNotice, InvitationNotifier, MetricsError, MetricsProvider, NotificationError,
        PackageMetrics, RepositoryMetrics,
    },
};

/// Notifier that records every notice instead of delivering it.
#[derive(Debug, Clone, Default)]
pub struct RecordingInvitationNotifier {
    notices: Arc<RwLock<Vec<InvitationNotice>>>,
}

impl RecordingInvitationNotifier {
    /// Creates an empty recording notifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all recorded notices in dispatch order.
    #[must_use]
    pub fn notices(&self) -> Vec<InvitationNotice> {
        self.notices
            .read()
            .map(|notices| notices.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl InvitationNotifier for RecordingInvitationNotifier {
    async fn invitation_created(&self, notice: &InvitationNotice) -> Result<(), NotificationError> {
        let mut notices = self
            .notices
            .write()
            .map_err(|err| NotificationError::Dispatch(err.to_string()))?;
        notices.push(notice.clone());
        Ok(())
    }
}

/// Metrics provider answering every fetch with fixed counters.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticMetricsProvider {
    repository: RepositoryMetrics,
    package: PackageMetrics,
}

impl StaticMetricsProvider {
    /// Creates a provider returning the given counters.
    #[must_use]
    pub const fn new(repository: RepositoryMetrics, package: PackageMetrics) -> Self {
        Self {
            repository,
            package,
        }
    }
}

#[async_trait]
impl MetricsProvider for StaticMetricsProvider {
    async fn repository_metrics(
        &self,
        _repo: &GithubRepo,
    ) -> Result<RepositoryMetrics, MetricsError> {
        Ok(self.repository)
    }

    async fn package_metrics(&self, _package: &str) -> Result<PackageMetrics, MetricsError> {
        Ok(self.package)
    }
}
