//! Reconciliation driver for repository credential templates.
//!
//! Templates share the repository gateway and token lock but have their own
//! lifecycle: they are created, updated and deleted independently of any
//! repository registration. The credentials API has no direct-get endpoint
//! and no connection state, so reads always go through a list and an
//! exact-URL scan.

use std::sync::Arc;

use tracing::debug;

use crate::error::{Result, SyncError};
use crate::lock::TokenLock;

use super::gateway::RepositoryGateway;
use super::mapper::{expand_credentials, flatten_credentials};
use super::record::RepoCredsRecord;
use super::types::{CredsCreateRequest, CredsQuery, CredsUpdateRequest};

/// Drives credential templates toward their declared state.
pub struct CredsReconciler {
    gateway: Arc<dyn RepositoryGateway>,
    token: Arc<TokenLock>,
}

impl CredsReconciler {
    pub fn new(gateway: Arc<dyn RepositoryGateway>, token: Arc<TokenLock>) -> Self {
        Self { gateway, token }
    }

    /// Register the template, then normalize the record from the server's
    /// copy.
    pub async fn create(&self, record: &mut RepoCredsRecord) -> Result<()> {
        if record.is_created() {
            return Err(SyncError::validation(format!(
                "credentials for {} are already registered",
                record.url
            )));
        }

        let creds = expand_credentials(record);
        let url = creds.url.clone();

        let created = {
            let _token = self.token.exclusive().await;
            self.gateway
                .create_credentials(CredsCreateRequest {
                    creds,
                    upsert: false,
                })
                .await?
        };
        let created = created.ok_or_else(|| {
            SyncError::invalid_response(&url, "server returned neither an error nor credentials")
        })?;

        record.set_id(&created.url);
        debug!(url = %record.id, "credential template registered");
        self.read(record).await
    }

    /// Refresh the record from the server, detecting out-of-band deletion.
    pub async fn read(&self, record: &mut RepoCredsRecord) -> Result<()> {
        if !record.is_created() {
            return Err(SyncError::validation(format!(
                "credentials for {} have no identifier to read",
                record.url
            )));
        }

        let listed = {
            let _token = self.token.shared().await;
            self.gateway
                .list_credentials(CredsQuery {
                    url: record.id.clone(),
                })
                .await
        };
        let list = match listed {
            Ok(Some(list)) => list,
            Ok(None) => return Ok(self.forget(record)),
            Err(SyncError::NotFound(_)) => return Ok(self.forget(record)),
            Err(err) => return Err(err),
        };

        match list.items.into_iter().find(|c| c.url == record.id) {
            Some(creds) => {
                flatten_credentials(&creds, record);
                Ok(())
            }
            None => Ok(self.forget(record)),
        }
    }

    /// Push declared changes to the server, then re-normalize.
    pub async fn update(&self, record: &mut RepoCredsRecord) -> Result<()> {
        if !record.is_created() {
            return Err(SyncError::validation(format!(
                "credentials for {} have no identifier to update",
                record.url
            )));
        }

        let creds = expand_credentials(record);
        let url = creds.url.clone();

        let updated = {
            let _token = self.token.exclusive().await;
            self.gateway.update_credentials(CredsUpdateRequest { creds }).await
        };
        let updated = match updated {
            Ok(payload) => payload,
            Err(SyncError::NotFound(_)) => {
                self.forget(record);
                return Ok(());
            }
            Err(err) => return Err(err),
        };
        let updated = updated.ok_or_else(|| {
            SyncError::invalid_response(&url, "server returned neither an error nor credentials")
        })?;

        record.set_id(&updated.url);
        self.read(record).await
    }

    /// Deregister the template; a missing template is success.
    pub async fn delete(&self, record: &mut RepoCredsRecord) -> Result<()> {
        if !record.is_created() {
            return Err(SyncError::validation(format!(
                "credentials for {} have no identifier to delete",
                record.url
            )));
        }

        let deleted = {
            let _token = self.token.exclusive().await;
            self.gateway
                .delete_credentials(CredsQuery {
                    url: record.id.clone(),
                })
                .await
        };
        match deleted {
            Ok(()) => {
                record.clear_id();
                Ok(())
            }
            Err(SyncError::NotFound(_)) => {
                record.clear_id();
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    fn forget(&self, record: &mut RepoCredsRecord) {
        debug!(url = %record.id, "credential template deleted out of band");
        record.clear_id();
    }
}
