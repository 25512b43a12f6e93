//! Error types for the provisioning workflow

use bootgres_models::CredentialDecodeError;
use thiserror::Error;

/// Everything that can abort a bootstrap run.
///
/// Driver errors are rendered into the message at the point of failure so the
/// session layer stays swappable; statement errors carry the database label
/// and the literal statement text.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("secret '{id}' could not be resolved")]
    SecretMissing { id: String },

    #[error("secret '{id}' has a malformed payload: {source}")]
    SecretDecode {
        id: String,
        #[source]
        source: CredentialDecodeError,
    },

    #[error("secret store lookup for '{id}' failed: {message}")]
    SecretFetch { id: String, message: String },

    #[error("failed to connect to database '{database}' as '{user}': {message}")]
    Connect {
        database: String,
        user: String,
        message: String,
    },

    #[error("statement failed on database '{database}': {statement}: {message}")]
    Statement {
        database: String,
        statement: String,
        message: String,
    },
}
