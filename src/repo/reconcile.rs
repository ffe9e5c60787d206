//! Reconciliation driver for repository registrations.
//!
//! Each operation converges one declared record against the server: build
//! the request from the record, call the gateway under the token lock, and
//! fold the observed state back in. A resource that vanished out of band is
//! never an error; the driver clears the local identifier and the outer tool
//! sees a record that needs recreating.

use std::sync::Arc;

use tracing::debug;

use crate::error::{Result, SyncError};
use crate::features::{Feature, FeatureProbe};
use crate::lock::TokenLock;

use super::gateway::RepositoryGateway;
use super::mapper::{expand_repository, flatten_repository};
use super::record::RepositoryRecord;
use super::types::{
    ConnectionStatus, RepoCreateRequest, RepoQuery, RepoUpdateRequest, Repository,
};

/// How a read resolves the remote copy. Decided once per call from the
/// capability probe, never re-derived mid-operation.
enum ReadStrategy {
    /// Single get-by-key request.
    Direct,
    /// List filtered by key, then an exact-match scan.
    ListScan,
}

/// Drives repository registrations toward their declared state.
pub struct Reconciler {
    gateway: Arc<dyn RepositoryGateway>,
    probe: Arc<dyn FeatureProbe>,
    token: Arc<TokenLock>,
}

impl Reconciler {
    pub fn new(
        gateway: Arc<dyn RepositoryGateway>,
        probe: Arc<dyn FeatureProbe>,
        token: Arc<TokenLock>,
    ) -> Self {
        Self {
            gateway,
            probe,
            token,
        }
    }

    /// Register the repository, then normalize the record from the server's
    /// authoritative copy.
    pub async fn create(&self, record: &mut RepositoryRecord) -> Result<()> {
        if record.is_created() {
            return Err(SyncError::validation(format!(
                "repository {} is already registered as {}",
                record.repo, record.id
            )));
        }
        self.check_project_support(record)?;

        let repo = expand_repository(record);
        let url = repo.repo.clone();

        let created = {
            let _token = self.token.exclusive().await;
            self.gateway
                .create_repository(RepoCreateRequest {
                    repo,
                    upsert: false,
                    creds_only: false,
                })
                .await?
        };
        let created = created.ok_or_else(|| {
            SyncError::invalid_response(&url, "server returned neither an error nor a repository")
        })?;

        // The registration exists even when the server cannot reach it, so
        // the identifier is persisted before the failure is surfaced.
        record.set_id(&created.repo);
        if created.connection_state.status == ConnectionStatus::Failed {
            return Err(SyncError::degraded(
                &created.repo,
                &created.connection_state.message,
            ));
        }

        debug!(repo = %record.id, "repository registered");
        self.read(record).await
    }

    /// Refresh the record from the server, detecting out-of-band deletion.
    pub async fn read(&self, record: &mut RepositoryRecord) -> Result<()> {
        if !record.is_created() {
            return Err(SyncError::validation(format!(
                "repository {} has no identifier to read",
                record.repo
            )));
        }

        let observed = match self.read_strategy()? {
            ReadStrategy::Direct => self.fetch_direct(&record.id).await?,
            ReadStrategy::ListScan => self.fetch_scan(&record.id).await?,
        };

        match observed {
            Some(repo) => {
                flatten_repository(&repo, record);
                Ok(())
            }
            None => {
                debug!(repo = %record.id, "repository deleted out of band");
                record.clear_id();
                Ok(())
            }
        }
    }

    /// Push declared changes to the server, then re-normalize.
    pub async fn update(&self, record: &mut RepositoryRecord) -> Result<()> {
        if !record.is_created() {
            return Err(SyncError::validation(format!(
                "repository {} has no identifier to update",
                record.repo
            )));
        }
        self.check_project_support(record)?;

        let repo = expand_repository(record);
        let url = repo.repo.clone();

        let updated = {
            let _token = self.token.exclusive().await;
            self.gateway.update_repository(RepoUpdateRequest { repo }).await
        };
        let updated = match updated {
            Ok(payload) => payload,
            Err(SyncError::NotFound(_)) => {
                // Nothing left to update; absence will surface as a diff on
                // the next plan.
                debug!(repo = %record.id, "repository deleted out of band, skipping update");
                record.clear_id();
                return Ok(());
            }
            Err(err) => return Err(err),
        };
        let updated = updated.ok_or_else(|| {
            SyncError::invalid_response(&url, "server returned neither an error nor a repository")
        })?;

        if updated.connection_state.status == ConnectionStatus::Failed {
            return Err(SyncError::degraded(
                &updated.repo,
                &updated.connection_state.message,
            ));
        }

        record.set_id(&updated.repo);
        self.read(record).await
    }

    /// Deregister the repository. Absence is already the desired end state,
    /// so a missing resource is success.
    pub async fn delete(&self, record: &mut RepositoryRecord) -> Result<()> {
        if !record.is_created() {
            return Err(SyncError::validation(format!(
                "repository {} has no identifier to delete",
                record.repo
            )));
        }

        let deleted = {
            let _token = self.token.exclusive().await;
            self.gateway
                .delete_repository(RepoQuery {
                    repo: record.id.clone(),
                    force_refresh: false,
                })
                .await
        };
        match deleted {
            Ok(()) => {
                record.clear_id();
                Ok(())
            }
            Err(SyncError::NotFound(_)) => {
                debug!(repo = %record.id, "repository already deleted");
                record.clear_id();
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    fn read_strategy(&self) -> Result<ReadStrategy> {
        if self.probe.is_supported(Feature::RepositoryGet)? {
            Ok(ReadStrategy::Direct)
        } else {
            Ok(ReadStrategy::ListScan)
        }
    }

    async fn fetch_direct(&self, id: &str) -> Result<Option<Repository>> {
        let fetched = {
            let _token = self.token.shared().await;
            self.gateway
                .get_repository(RepoQuery {
                    repo: id.to_string(),
                    force_refresh: true,
                })
                .await
        };
        match fetched {
            Ok(repo) => Ok(Some(repo)),
            Err(SyncError::NotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn fetch_scan(&self, id: &str) -> Result<Option<Repository>> {
        let listed = {
            let _token = self.token.shared().await;
            self.gateway
                .list_repositories(RepoQuery {
                    repo: id.to_string(),
                    force_refresh: true,
                })
                .await
        };
        let list = match listed {
            Ok(Some(list)) => list,
            Ok(None) => return Ok(None),
            Err(SyncError::NotFound(_)) => return Ok(None),
            Err(err) => return Err(err),
        };
        // Exact key match only; the filter is advisory and the server may
        // return unrelated entries.
        Ok(list.items.into_iter().find(|r| r.repo == id))
    }

    fn check_project_support(&self, record: &RepositoryRecord) -> Result<()> {
        if record.project.is_none() {
            return Ok(());
        }
        if self
            .probe
            .is_supported(Feature::ProjectScopedRepositories)?
        {
            Ok(())
        } else {
            Err(SyncError::unsupported(format!(
                "repository {} declares a project, but the connected server predates {}",
                record.repo,
                Feature::ProjectScopedRepositories.name(),
            )))
        }
    }
}
