//! Database session lifecycle
//!
//! A session is bound to one (credential, database) pair and owned by exactly
//! one phase of the workflow. Every statement is logged with its database
//! label immediately before submission, and the phase that opened a session
//! must close it on every exit path.

use async_trait::async_trait;
use bootgres_models::Credential;
use tokio_postgres::NoTls;

use crate::error::ProvisionError;

/// Database used when a phase asks for no specific target database.
pub const ADMIN_DATABASE: &str = "postgres";

/// A live database session scoped to one (credential, database) pair.
#[async_trait]
pub trait Session: Send {
    /// Label of the database this session is bound to.
    fn database_label(&self) -> &str;

    /// Execute one statement.
    async fn execute(&mut self, statement: &str) -> Result<(), ProvisionError>;

    /// Run a single-row boolean query (existence checks).
    async fn query_bool(&mut self, statement: &str) -> Result<bool, ProvisionError>;

    /// Close the session. Consuming self keeps close a one-shot operation.
    async fn close(self: Box<Self>) -> Result<(), ProvisionError>;
}

/// Factory for sessions. `database: None` connects to the administrative
/// database.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(
        &self,
        credential: &Credential,
        database: Option<&str>,
    ) -> Result<Box<dyn Session>, ProvisionError>;
}

/// Connector for a live PostgreSQL host.
#[derive(Debug, Clone)]
pub struct PgConnector {
    host: String,
    port: u16,
}

impl PgConnector {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

#[async_trait]
impl Connector for PgConnector {
    async fn connect(
        &self,
        credential: &Credential,
        database: Option<&str>,
    ) -> Result<Box<dyn Session>, ProvisionError> {
        let database = database.unwrap_or(ADMIN_DATABASE);

        let mut config = tokio_postgres::Config::new();
        config
            .host(&self.host)
            .port(self.port)
            .user(&credential.username)
            .password(&credential.password)
            .dbname(database);

        let (client, connection) =
            config
                .connect(NoTls)
                .await
                .map_err(|e| ProvisionError::Connect {
                    database: database.to_string(),
                    user: credential.username.clone(),
                    message: e.to_string(),
                })?;

        // Drive the connection until the client is dropped
        let driver_label = database.to_string();
        let driver = tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(database = %driver_label, "PostgreSQL connection error: {}", e);
            }
        });

        tracing::info!(database = %database, user = %credential.username, "connection opened");

        Ok(Box::new(PgSession {
            database: database.to_string(),
            client,
            driver,
        }))
    }
}

/// Session over a tokio-postgres client with a spawned connection driver.
pub struct PgSession {
    database: String,
    client: tokio_postgres::Client,
    driver: tokio::task::JoinHandle<()>,
}

impl PgSession {
    fn log_statement(&self, statement: &str) {
        tracing::info!(database = %self.database, statement = %statement, "executing statement");
    }

    fn statement_error(&self, statement: &str, message: String) -> ProvisionError {
        ProvisionError::Statement {
            database: self.database.clone(),
            statement: statement.to_string(),
            message,
        }
    }
}

#[async_trait]
impl Session for PgSession {
    fn database_label(&self) -> &str {
        &self.database
    }

    async fn execute(&mut self, statement: &str) -> Result<(), ProvisionError> {
        self.log_statement(statement);
        self.client
            .batch_execute(statement)
            .await
            .map_err(|e| self.statement_error(statement, e.to_string()))
    }

    async fn query_bool(&mut self, statement: &str) -> Result<bool, ProvisionError> {
        self.log_statement(statement);
        let row = self
            .client
            .query_one(statement, &[])
            .await
            .map_err(|e| self.statement_error(statement, e.to_string()))?;
        row.try_get(0)
            .map_err(|e| self.statement_error(statement, e.to_string()))
    }

    async fn close(self: Box<Self>) -> Result<(), ProvisionError> {
        let Self {
            database,
            client,
            driver,
        } = *self;

        // Dropping the client terminates the connection; wait for the driver
        // task so the socket is fully torn down before the next phase opens
        // its own session.
        drop(client);
        if let Err(e) = driver.await {
            tracing::warn!(database = %database, "connection driver task panicked: {}", e);
        }

        tracing::info!(database = %database, "connection closed");
        Ok(())
    }
}
