//! Repository reconciliation: declared records, wire types, the gateway
//! contract, field mapping, and the drivers.

pub mod creds;
pub mod gateway;
pub mod mapper;
pub mod record;
pub mod reconcile;
pub mod types;

pub use creds::CredsReconciler;
pub use gateway::RepositoryGateway;
pub use record::{RepoCredsRecord, RepositoryRecord};
pub use reconcile::Reconciler;
pub use types::{ConnectionState, ConnectionStatus, RepoCreds, Repository};
