//! Shared data types for the bootgres provisioning workflow

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A resolved database identity.
///
/// Sourced from a secret payload and immutable afterwards. Three of these
/// exist per run: master (admin), service (application), and optionally CDC.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

impl Credential {
    /// Decode a secret payload (`{"username": ..., "password": ...}`).
    ///
    /// Rejects payloads that parse but carry an empty username or password,
    /// so a half-written secret is caught before any connection opens.
    pub fn from_payload(payload: &str) -> Result<Self, CredentialDecodeError> {
        let credential: Credential = serde_json::from_str(payload)?;
        if credential.username.is_empty() {
            return Err(CredentialDecodeError::EmptyField("username"));
        }
        if credential.password.is_empty() {
            return Err(CredentialDecodeError::EmptyField("password"));
        }
        Ok(credential)
    }
}

// Passwords must never reach logs; Debug elides them.
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Error decoding a secret payload into a [`Credential`].
#[derive(Debug, thiserror::Error)]
pub enum CredentialDecodeError {
    #[error("payload is not valid credential JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("payload field '{0}' is missing or empty")]
    EmptyField(&'static str),
}

/// The database and schema a run provisions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProvisioningTarget {
    pub database: String,
    pub schema: String,
}

impl ProvisioningTarget {
    /// Resolve the target from configuration, defaulting from the service
    /// username: database = username with one trailing `_user` stripped,
    /// schema = username verbatim.
    pub fn resolve(
        service_username: &str,
        database_override: Option<&str>,
        schema_override: Option<&str>,
    ) -> Self {
        let database = match database_override {
            Some(name) => name.to_string(),
            None => service_username
                .strip_suffix("_user")
                .unwrap_or(service_username)
                .to_string(),
        };
        let schema = schema_override.unwrap_or(service_username).to_string();
        Self { database, schema }
    }
}

/// Inputs to a bootstrap run.
///
/// Secret fields hold secret *identifiers*, resolved through the secret
/// store at run time, never credential material itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BootstrapRequest {
    /// Secret id for the master (admin) credential
    pub master_user_secret: String,
    /// Secret id for the service (application) credential
    pub app_user_secret: String,
    /// Secret id for the CDC credential; None disables the CDC phase
    pub cdc_user_secret: Option<String>,
    /// Explicit target database name (default: derived from service username)
    pub app_database_name: Option<String>,
    /// Explicit target schema name (default: service username)
    pub app_schema_name: Option<String>,
}

/// Result of a completed bootstrap run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BootstrapOutcome {
    /// Human-readable summary of what was provisioned
    pub message: String,
    /// Target database name
    pub database: String,
    /// Target schema name
    pub schema: String,
    /// Service role username
    pub service_role: String,
    /// CDC role username, if the CDC phase ran
    pub cdc_role: Option<String>,
    /// Whether this run issued CREATE DATABASE
    pub database_created: bool,
    /// Whether this run issued CREATE USER for the service role
    pub service_role_created: bool,
    /// Whether this run issued CREATE USER for the CDC role (None if skipped)
    pub cdc_role_created: Option<bool>,
    /// Whether this run created the logical-replication publication (None if skipped)
    pub publication_created: Option<bool>,
    /// Completion timestamp
    pub completed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_decode() {
        let credential =
            Credential::from_payload(r#"{"username":"myapp_user","password":"myapp_password"}"#)
                .unwrap();
        assert_eq!(credential.username, "myapp_user");
        assert_eq!(credential.password, "myapp_password");
    }

    #[test]
    fn test_credential_decode_rejects_invalid_json() {
        let result = Credential::from_payload("not json at all");
        assert!(matches!(result, Err(CredentialDecodeError::Parse(_))));
    }

    #[test]
    fn test_credential_decode_rejects_missing_field() {
        let result = Credential::from_payload(r#"{"username":"myapp_user"}"#);
        assert!(matches!(result, Err(CredentialDecodeError::Parse(_))));
    }

    #[test]
    fn test_credential_decode_rejects_empty_password() {
        let result = Credential::from_payload(r#"{"username":"myapp_user","password":""}"#);
        assert!(matches!(
            result,
            Err(CredentialDecodeError::EmptyField("password"))
        ));
    }

    #[test]
    fn test_credential_debug_redacts_password() {
        let credential = Credential {
            username: "myapp_user".to_string(),
            password: "myapp_password".to_string(),
        };
        let rendered = format!("{:?}", credential);
        assert!(rendered.contains("myapp_user"));
        assert!(!rendered.contains("myapp_password"));
    }

    #[test]
    fn test_target_defaults_from_service_username() {
        let target = ProvisioningTarget::resolve("myapp_user", None, None);
        assert_eq!(target.database, "myapp");
        assert_eq!(target.schema, "myapp_user");
    }

    #[test]
    fn test_target_without_user_suffix() {
        let target = ProvisioningTarget::resolve("reporting", None, None);
        assert_eq!(target.database, "reporting");
        assert_eq!(target.schema, "reporting");
    }

    #[test]
    fn test_target_overrides_win() {
        let target =
            ProvisioningTarget::resolve("myapp_user", Some("app_database"), Some("app_schema"));
        assert_eq!(target.database, "app_database");
        assert_eq!(target.schema, "app_schema");
    }

    #[test]
    fn test_bootstrap_outcome_serialization() {
        let outcome = BootstrapOutcome {
            message: "Provisioned database \"myapp\" with service role \"myapp_user\"."
                .to_string(),
            database: "myapp".to_string(),
            schema: "myapp_user".to_string(),
            service_role: "myapp_user".to_string(),
            cdc_role: Some("cdc_user".to_string()),
            database_created: true,
            service_role_created: true,
            cdc_role_created: Some(false),
            publication_created: Some(true),
            completed_at: Utc::now(),
        };

        let json = serde_json::to_string(&outcome).unwrap();
        let parsed: BootstrapOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(outcome, parsed);
    }
}
