//! Expand/flatten between declared records and wire types.

use super::record::{RepoCredsRecord, RepositoryRecord};
use super::types::{RepoCreds, Repository};

/// Build the wire repository from the declared record.
///
/// Only explicitly declared fields are copied; everything else stays at the
/// wire zero value, which the server reads as "no value" on create and
/// "do not change" on update.
pub fn expand_repository(record: &RepositoryRecord) -> Repository {
    let mut repo = Repository {
        repo: record.repo.clone(),
        ..Default::default()
    };
    if let Some(v) = &record.username {
        repo.username = v.clone();
    }
    if let Some(v) = &record.password {
        repo.password = v.clone();
    }
    if let Some(v) = &record.ssh_private_key {
        repo.ssh_private_key = v.clone();
    }
    if let Some(v) = &record.tls_client_cert_data {
        repo.tls_client_cert_data = v.clone();
    }
    if let Some(v) = &record.tls_client_cert_key {
        repo.tls_client_cert_key = v.clone();
    }
    if let Some(v) = record.insecure {
        repo.insecure = v;
    }
    if let Some(v) = record.enable_lfs {
        repo.enable_lfs = v;
    }
    if let Some(v) = record.enable_oci {
        repo.enable_oci = v;
    }
    if let Some(v) = &record.repo_type {
        repo.repo_type = v.clone();
    }
    if let Some(v) = &record.name {
        repo.name = v.clone();
    }
    if let Some(v) = &record.project {
        repo.project = v.clone();
    }
    if let Some(v) = record.github_app_id {
        repo.github_app_id = v;
    }
    if let Some(v) = record.github_app_installation_id {
        repo.github_app_installation_id = v;
    }
    if let Some(v) = &record.github_app_private_key {
        repo.github_app_private_key = v.clone();
    }
    if let Some(v) = &record.github_app_enterprise_base_url {
        repo.github_app_enterprise_base_url = v.clone();
    }
    repo
}

/// Copy observed state back into the declared record.
///
/// Secret fields are left alone: the server never echoes them, so the
/// declared values are the only copy and must survive every read.
pub fn flatten_repository(repo: &Repository, record: &mut RepositoryRecord) {
    record.repo = repo.repo.clone();
    record.username = some_if_set(&repo.username);
    record.tls_client_cert_data = some_if_set(&repo.tls_client_cert_data);
    record.insecure = Some(repo.insecure);
    record.enable_lfs = Some(repo.enable_lfs);
    record.enable_oci = Some(repo.enable_oci);
    record.repo_type = some_if_set(&repo.repo_type);
    record.name = some_if_set(&repo.name);
    record.project = some_if_set(&repo.project);
    record.github_app_id = some_if_nonzero(repo.github_app_id);
    record.github_app_installation_id = some_if_nonzero(repo.github_app_installation_id);
    record.github_app_enterprise_base_url = some_if_set(&repo.github_app_enterprise_base_url);
    record.connection_state_status = Some(repo.connection_state.status.to_string());
    record.inherited_creds = Some(repo.inherited_creds);
}

/// Build the wire credential template from the declared record.
pub fn expand_credentials(record: &RepoCredsRecord) -> RepoCreds {
    let mut creds = RepoCreds {
        url: record.url.clone(),
        ..Default::default()
    };
    if let Some(v) = &record.username {
        creds.username = v.clone();
    }
    if let Some(v) = &record.password {
        creds.password = v.clone();
    }
    if let Some(v) = &record.ssh_private_key {
        creds.ssh_private_key = v.clone();
    }
    if let Some(v) = &record.tls_client_cert_data {
        creds.tls_client_cert_data = v.clone();
    }
    if let Some(v) = &record.tls_client_cert_key {
        creds.tls_client_cert_key = v.clone();
    }
    if let Some(v) = record.github_app_id {
        creds.github_app_id = v;
    }
    if let Some(v) = record.github_app_installation_id {
        creds.github_app_installation_id = v;
    }
    if let Some(v) = &record.github_app_private_key {
        creds.github_app_private_key = v.clone();
    }
    if let Some(v) = &record.github_app_enterprise_base_url {
        creds.github_app_enterprise_base_url = v.clone();
    }
    creds
}

/// Copy observed template state back into the declared record. Same secret
/// asymmetry as [`flatten_repository`].
pub fn flatten_credentials(creds: &RepoCreds, record: &mut RepoCredsRecord) {
    record.url = creds.url.clone();
    record.username = some_if_set(&creds.username);
    record.tls_client_cert_data = some_if_set(&creds.tls_client_cert_data);
    record.github_app_id = some_if_nonzero(creds.github_app_id);
    record.github_app_installation_id = some_if_nonzero(creds.github_app_installation_id);
    record.github_app_enterprise_base_url = some_if_set(&creds.github_app_enterprise_base_url);
}

fn some_if_set(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn some_if_nonzero(value: i64) -> Option<i64> {
    (value != 0).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::types::{ConnectionState, ConnectionStatus};

    fn declared() -> RepositoryRecord {
        let mut record = RepositoryRecord::new("https://git.example.com/repo.git");
        record.username = Some("bot".to_string());
        record.password = Some("hunter2".to_string());
        record.ssh_private_key = Some("-----BEGIN-----".to_string());
        record.tls_client_cert_key = Some("-----KEY-----".to_string());
        record.insecure = Some(true);
        record
    }

    #[test]
    fn test_expand_copies_declared_fields_only() {
        let repo = expand_repository(&declared());
        assert_eq!(repo.repo, "https://git.example.com/repo.git");
        assert_eq!(repo.username, "bot");
        assert_eq!(repo.password, "hunter2");
        assert!(repo.insecure);
        // Undeclared fields stay at the wire zero value.
        assert!(repo.name.is_empty());
        assert!(repo.project.is_empty());
        assert!(!repo.enable_lfs);
        assert_eq!(repo.github_app_id, 0);
    }

    #[test]
    fn test_flatten_never_touches_secrets() {
        let mut record = declared();
        // A server response carries no secret fields at all.
        let remote = Repository {
            repo: "https://git.example.com/repo.git".to_string(),
            username: "bot".to_string(),
            tls_client_cert_data: "CERTDATA".to_string(),
            connection_state: ConnectionState {
                status: ConnectionStatus::Successful,
                message: String::new(),
            },
            ..Default::default()
        };

        flatten_repository(&remote, &mut record);

        assert_eq!(record.password.as_deref(), Some("hunter2"));
        assert_eq!(record.ssh_private_key.as_deref(), Some("-----BEGIN-----"));
        assert_eq!(record.tls_client_cert_key.as_deref(), Some("-----KEY-----"));
        // Non-secret observed fields do come back.
        assert_eq!(record.tls_client_cert_data.as_deref(), Some("CERTDATA"));
        assert_eq!(record.connection_state_status.as_deref(), Some("Successful"));
        assert_eq!(record.inherited_creds, Some(false));
    }

    #[test]
    fn test_flatten_is_idempotent() {
        let mut record = declared();
        let remote = Repository {
            repo: "https://git.example.com/repo.git".to_string(),
            username: "bot".to_string(),
            enable_lfs: true,
            ..Default::default()
        };

        flatten_repository(&remote, &mut record);
        let first = record.clone();
        flatten_repository(&remote, &mut record);
        assert_eq!(first, record);
    }

    #[test]
    fn test_credentials_round_trip_asymmetry() {
        let mut record = RepoCredsRecord::new("https://git.example.com/");
        record.username = Some("bot".to_string());
        record.password = Some("hunter2".to_string());
        record.github_app_private_key = Some("-----APPKEY-----".to_string());

        let wire = expand_credentials(&record);
        assert_eq!(wire.password, "hunter2");
        assert_eq!(wire.github_app_private_key, "-----APPKEY-----");

        let remote = RepoCreds {
            url: "https://git.example.com/".to_string(),
            username: "bot".to_string(),
            github_app_id: 42,
            ..Default::default()
        };
        flatten_credentials(&remote, &mut record);

        assert_eq!(record.password.as_deref(), Some("hunter2"));
        assert_eq!(
            record.github_app_private_key.as_deref(),
            Some("-----APPKEY-----")
        );
        assert_eq!(record.github_app_id, Some(42));
    }
}
