//! Secret resolution
//!
//! The workflow consumes secrets through the [`SecretStore`] seam: a lookup
//! by id returning the raw JSON payload or absence. The shipped
//! implementation reads the payload from an environment variable named by the
//! secret id; a networked store drops in behind the same trait.

use async_trait::async_trait;
use bootgres_models::Credential;

use crate::error::ProvisionError;

#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch the raw payload for a secret id, or `None` when absent.
    async fn fetch(&self, secret_id: &str) -> Result<Option<String>, ProvisionError>;
}

/// Secret store backed by process environment variables. The secret id names
/// the variable holding the JSON payload.
#[derive(Debug, Default, Clone)]
pub struct EnvSecretStore;

#[async_trait]
impl SecretStore for EnvSecretStore {
    async fn fetch(&self, secret_id: &str) -> Result<Option<String>, ProvisionError> {
        match std::env::var(secret_id) {
            Ok(value) if !value.trim().is_empty() => Ok(Some(value)),
            _ => Ok(None),
        }
    }
}

/// Resolve a secret the run cannot proceed without. Absence or a malformed
/// payload is fatal.
pub async fn resolve_required(
    store: &dyn SecretStore,
    secret_id: &str,
) -> Result<Credential, ProvisionError> {
    let payload =
        store
            .fetch(secret_id)
            .await?
            .ok_or_else(|| ProvisionError::SecretMissing {
                id: secret_id.to_string(),
            })?;

    Credential::from_payload(&payload).map_err(|source| ProvisionError::SecretDecode {
        id: secret_id.to_string(),
        source,
    })
}

/// Resolve the optional CDC secret. Lookup failures, absence, and malformed
/// payloads all disable the CDC phase rather than failing the run.
pub async fn resolve_optional(store: &dyn SecretStore, secret_id: &str) -> Option<Credential> {
    let payload = match store.fetch(secret_id).await {
        Ok(Some(payload)) => payload,
        Ok(None) => {
            tracing::warn!(secret = %secret_id, "secret not found, treating as absent");
            return None;
        }
        Err(e) => {
            tracing::warn!(secret = %secret_id, "secret lookup failed, treating as absent: {}", e);
            return None;
        }
    };

    match Credential::from_payload(&payload) {
        Ok(credential) => Some(credential),
        Err(e) => {
            tracing::warn!(secret = %secret_id, "malformed secret payload, treating as absent: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapSecretStore {
        payloads: HashMap<String, String>,
    }

    #[async_trait]
    impl SecretStore for MapSecretStore {
        async fn fetch(&self, secret_id: &str) -> Result<Option<String>, ProvisionError> {
            Ok(self.payloads.get(secret_id).cloned())
        }
    }

    struct FailingSecretStore;

    #[async_trait]
    impl SecretStore for FailingSecretStore {
        async fn fetch(&self, secret_id: &str) -> Result<Option<String>, ProvisionError> {
            Err(ProvisionError::SecretFetch {
                id: secret_id.to_string(),
                message: "store unreachable".to_string(),
            })
        }
    }

    fn store_with(entries: &[(&str, &str)]) -> MapSecretStore {
        MapSecretStore {
            payloads: entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_resolve_required_decodes_payload() {
        let store = store_with(&[(
            "MASTER_USER_SECRET",
            r#"{"username":"admin_user","password":"admin_password"}"#,
        )]);

        let credential = resolve_required(&store, "MASTER_USER_SECRET").await.unwrap();
        assert_eq!(credential.username, "admin_user");
    }

    #[tokio::test]
    async fn test_resolve_required_missing_is_fatal() {
        let store = store_with(&[]);

        let result = resolve_required(&store, "MASTER_USER_SECRET").await;
        assert!(matches!(
            result,
            Err(ProvisionError::SecretMissing { id }) if id == "MASTER_USER_SECRET"
        ));
    }

    #[tokio::test]
    async fn test_resolve_required_malformed_is_fatal() {
        let store = store_with(&[("APP_USER_SECRET", "not json")]);

        let result = resolve_required(&store, "APP_USER_SECRET").await;
        assert!(matches!(result, Err(ProvisionError::SecretDecode { .. })));
    }

    #[tokio::test]
    async fn test_resolve_optional_absent_is_none() {
        let store = store_with(&[]);

        assert!(resolve_optional(&store, "CDC_USER_SECRET").await.is_none());
    }

    #[tokio::test]
    async fn test_resolve_optional_malformed_is_none() {
        let store = store_with(&[("CDC_USER_SECRET", "{\"username\":\"cdc_user\"")]);

        assert!(resolve_optional(&store, "CDC_USER_SECRET").await.is_none());
    }

    #[tokio::test]
    async fn test_resolve_optional_lookup_failure_is_none() {
        assert!(resolve_optional(&FailingSecretStore, "CDC_USER_SECRET")
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_env_secret_store_reads_variable() {
        std::env::set_var(
            "BOOTGRES_TEST_SECRET",
            r#"{"username":"u","password":"p"}"#,
        );
        let payload = EnvSecretStore
            .fetch("BOOTGRES_TEST_SECRET")
            .await
            .unwrap()
            .unwrap();
        assert!(payload.contains("\"username\""));
        std::env::remove_var("BOOTGRES_TEST_SECRET");
    }

    #[tokio::test]
    async fn test_env_secret_store_blank_is_absent() {
        std::env::set_var("BOOTGRES_TEST_BLANK_SECRET", "   ");
        let payload = EnvSecretStore.fetch("BOOTGRES_TEST_BLANK_SECRET").await.unwrap();
        assert!(payload.is_none());
        std::env::remove_var("BOOTGRES_TEST_BLANK_SECRET");
    }
}
