//! Wire-level types for the repository API.
//!
//! These mirror the server's request and response payloads. Empty strings
//! are the wire zero value and are omitted when serializing; on update the
//! server reads absence as "do not change".

use serde::{Deserialize, Serialize};
use std::fmt;

/// Connection health of a registered repository, as reported by the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionStatus {
    #[default]
    Unknown,
    Successful,
    Failed,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStatus::Unknown => write!(f, "Unknown"),
            ConnectionStatus::Successful => write!(f, "Successful"),
            ConnectionStatus::Failed => write!(f, "Failed"),
        }
    }
}

/// Connection state the server attaches to each repository it knows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionState {
    pub status: ConnectionStatus,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
}

/// A repository registration as the server holds it.
///
/// `repo` is the canonical key: the server normalizes the declared URL and
/// every later lookup uses the normalized form. Secret fields are accepted
/// on requests but never populated on responses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Repository {
    pub repo: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub username: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub password: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ssh_private_key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tls_client_cert_data: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tls_client_cert_key: String,
    pub insecure: bool,
    pub enable_lfs: bool,
    pub enable_oci: bool,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub repo_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub project: String,
    pub github_app_id: i64,
    pub github_app_installation_id: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub github_app_private_key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub github_app_enterprise_base_url: String,
    /// Response-only; the server fills it in when asked for a fresh check.
    pub inherited_creds: bool,
    pub connection_state: ConnectionState,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepositoryList {
    pub items: Vec<Repository>,
}

/// A reusable credential template keyed by URL prefix.
///
/// Decoupled from any single repository registration; the server applies the
/// template to every repository whose URL starts with `url`. No connection
/// state: templates are never "connected" to anything themselves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RepoCreds {
    pub url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub username: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub password: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ssh_private_key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tls_client_cert_data: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tls_client_cert_key: String,
    pub github_app_id: i64,
    pub github_app_installation_id: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub github_app_private_key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub github_app_enterprise_base_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepoCredsList {
    pub items: Vec<RepoCreds>,
}

// ── Request types ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoCreateRequest {
    pub repo: Repository,
    pub upsert: bool,
    pub creds_only: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoUpdateRequest {
    pub repo: Repository,
}

/// Lookup filter for get and list. `force_refresh` bypasses the server-side
/// connection-state cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoQuery {
    pub repo: String,
    pub force_refresh: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredsCreateRequest {
    pub creds: RepoCreds,
    pub upsert: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredsUpdateRequest {
    pub creds: RepoCreds,
}

/// Lookup filter for credential templates. The credentials API exposes no
/// cache bypass, so the filter is the URL prefix alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredsQuery {
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_fields_stay_off_the_wire() {
        let repo = Repository {
            repo: "https://git.example.com/repo.git".to_string(),
            username: "bot".to_string(),
            ..Default::default()
        };
        let value = serde_json::to_value(&repo).unwrap();
        let obj = value.as_object().unwrap();

        assert_eq!(obj["repo"], "https://git.example.com/repo.git");
        assert_eq!(obj["username"], "bot");
        assert!(!obj.contains_key("password"));
        assert!(!obj.contains_key("sshPrivateKey"));
        assert!(!obj.contains_key("tlsClientCertKey"));
        assert!(!obj.contains_key("project"));
    }

    #[test]
    fn test_connection_state_round_trip() {
        let raw = r#"{"status":"Failed","message":"ssh: handshake failed"}"#;
        let state: ConnectionState = serde_json::from_str(raw).unwrap();
        assert_eq!(state.status, ConnectionStatus::Failed);
        assert_eq!(state.message, "ssh: handshake failed");
    }

    #[test]
    fn test_repository_deserializes_with_missing_fields() {
        let raw = r#"{"repo":"https://git.example.com/repo.git"}"#;
        let repo: Repository = serde_json::from_str(raw).unwrap();
        assert_eq!(repo.repo, "https://git.example.com/repo.git");
        assert_eq!(repo.connection_state.status, ConnectionStatus::Unknown);
    }
}
