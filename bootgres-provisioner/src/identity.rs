//! Idempotent database and role provisioning
//!
//! Each identity is probed with an existence query and created only when
//! absent; an existing identity is never altered or dropped. Re-running the
//! workflow against an already-provisioned cluster is therefore a no-op here.

use crate::error::ProvisionError;
use crate::ident::{quote_ident, quote_literal};
use crate::session::Session;

pub fn database_exists_statement(database: &str) -> String {
    format!(
        "SELECT exists(SELECT datname FROM pg_catalog.pg_database WHERE lower(datname) = lower({}))",
        quote_literal(database)
    )
}

pub fn create_database_statement(database: &str) -> String {
    format!("CREATE DATABASE {}", quote_ident(database))
}

pub fn role_exists_statement(role: &str) -> String {
    format!(
        "SELECT exists(SELECT rolname FROM pg_catalog.pg_roles WHERE rolname = {})",
        quote_literal(role)
    )
}

pub fn create_role_statement(role: &str, password: &str) -> String {
    format!(
        "CREATE USER {} WITH ENCRYPTED PASSWORD {}",
        quote_ident(role),
        quote_literal(password)
    )
}

/// Create the database unless it already exists. Returns whether this run
/// created it. Database name comparison is case-insensitive.
pub async fn ensure_database(
    session: &mut dyn Session,
    database: &str,
) -> Result<bool, ProvisionError> {
    if session
        .query_bool(&database_exists_statement(database))
        .await?
    {
        tracing::info!(database = %database, "database already exists, skipping creation");
        return Ok(false);
    }

    session
        .execute(&create_database_statement(database))
        .await?;
    tracing::info!(database = %database, "database created");
    Ok(true)
}

/// Create the role unless it already exists. Returns whether this run
/// created it.
pub async fn ensure_role(
    session: &mut dyn Session,
    role: &str,
    password: &str,
) -> Result<bool, ProvisionError> {
    if session.query_bool(&role_exists_statement(role)).await? {
        tracing::info!(role = %role, "role already exists, skipping creation");
        return Ok(false);
    }

    session
        .execute(&create_role_statement(role, password))
        .await?;
    tracing::info!(role = %role, "role created");
    Ok(true)
}
