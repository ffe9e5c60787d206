//! Remote gateway contract.

use async_trait::async_trait;

use crate::error::Result;

use super::types::{
    CredsCreateRequest, CredsQuery, CredsUpdateRequest, RepoCreateRequest, RepoCreds,
    RepoCredsList, RepoQuery, RepoUpdateRequest, Repository, RepositoryList,
};

/// Client-side contract for the repository service.
///
/// Implementations wrap the real transport and MUST route raw errors through
/// [`SyncError::remote`], so missing resources arrive as the typed
/// [`SyncError::NotFound`] and the reconcilers never inspect message text.
///
/// Create, update and list return `Option` because the server can answer
/// success with no payload; the reconcilers decide what that means per
/// operation (a contract violation for create/update, out-of-band deletion
/// for list).
///
/// [`SyncError::remote`]: crate::error::SyncError::remote
/// [`SyncError::NotFound`]: crate::error::SyncError::NotFound
#[async_trait]
pub trait RepositoryGateway: Send + Sync {
    async fn create_repository(&self, req: RepoCreateRequest) -> Result<Option<Repository>>;

    /// Direct lookup by canonical URL. Only valid when the server supports
    /// [`Feature::RepositoryGet`](crate::features::Feature::RepositoryGet).
    async fn get_repository(&self, query: RepoQuery) -> Result<Repository>;

    async fn list_repositories(&self, query: RepoQuery) -> Result<Option<RepositoryList>>;

    async fn update_repository(&self, req: RepoUpdateRequest) -> Result<Option<Repository>>;

    async fn delete_repository(&self, query: RepoQuery) -> Result<()>;

    async fn create_credentials(&self, req: CredsCreateRequest) -> Result<Option<RepoCreds>>;

    async fn list_credentials(&self, query: CredsQuery) -> Result<Option<RepoCredsList>>;

    async fn update_credentials(&self, req: CredsUpdateRequest) -> Result<Option<RepoCreds>>;

    async fn delete_credentials(&self, query: CredsQuery) -> Result<()>;
}
