//! Bootgres Provisioner - idempotent PostgreSQL bootstrap workflow
//!
//! This crate holds the core of the bootstrap tool: a session layer that
//! guarantees connections are logged and closed, idempotent database/role
//! provisioning, the fixed grant statement tables, and the orchestrator that
//! sequences them into a single one-shot run.
//!
//! # Usage
//!
//! ```rust,no_run
//! use bootgres_models::BootstrapRequest;
//! use bootgres_provisioner::secrets::EnvSecretStore;
//! use bootgres_provisioner::session::PgConnector;
//! use bootgres_provisioner::run_bootstrap;
//!
//! # async fn example() -> Result<(), bootgres_provisioner::ProvisionError> {
//! let request = BootstrapRequest {
//!     master_user_secret: "MASTER_USER_SECRET".to_string(),
//!     app_user_secret: "APP_USER_SECRET".to_string(),
//!     cdc_user_secret: None,
//!     app_database_name: None,
//!     app_schema_name: None,
//! };
//! let secrets = EnvSecretStore;
//! let connector = PgConnector::new("db.example.internal", 5432);
//!
//! let outcome = run_bootstrap(&request, &secrets, &connector).await?;
//! println!("{}", outcome.message);
//! # Ok(())
//! # }
//! ```

pub mod bootstrap;
pub mod error;
pub mod grants;
pub mod ident;
pub mod identity;
pub mod secrets;
pub mod session;

// Re-export the entry point and error type for convenience
pub use bootstrap::run_bootstrap;
pub use error::ProvisionError;
