//! Fixed grant statement tables and the sequential statement runner
//!
//! Statement order matters. In the service list, the extensions are created
//! while default public-schema privileges are still in place, the PUBLIC
//! revocations run after the service role has its own rights, and the
//! ownership transfer comes last so the admin session holds sufficient rights
//! for every prior step. Failures abort the list; nothing is skipped or
//! retried.

use bootgres_models::ProvisioningTarget;

use crate::error::ProvisionError;
use crate::ident::{quote_ident, quote_literal};
use crate::session::Session;

/// Name of the logical-replication publication created by the CDC phase.
pub const PUBLICATION_NAME: &str = "cdc_publication";

/// Statement list for the service role, executed on an admin session bound to
/// the target database.
pub fn service_grant_statements(target: &ProvisioningTarget, role: &str) -> Vec<String> {
    let database = quote_ident(&target.database);
    let schema = quote_ident(&target.schema);
    let role = quote_ident(role);

    vec![
        format!("CREATE SCHEMA IF NOT EXISTS {schema}"),
        format!("CREATE EXTENSION IF NOT EXISTS pg_trgm WITH SCHEMA {schema}"),
        format!("CREATE EXTENSION IF NOT EXISTS intarray WITH SCHEMA {schema}"),
        format!("GRANT CONNECT ON DATABASE {database} TO {role}"),
        format!("GRANT CREATE ON DATABASE {database} TO {role}"),
        format!("CREATE SCHEMA IF NOT EXISTS {schema}"),
        "REVOKE CREATE ON SCHEMA public FROM PUBLIC".to_string(),
        format!("REVOKE ALL ON DATABASE {database} FROM PUBLIC"),
        format!("GRANT USAGE, CREATE ON SCHEMA {schema} TO {role}"),
        format!("ALTER DEFAULT PRIVILEGES IN SCHEMA {schema} GRANT ALL ON TABLES TO {role}"),
        format!("GRANT ALL PRIVILEGES ON DATABASE {database} TO {role}"),
        format!("ALTER DATABASE {database} OWNER TO {role}"),
    ]
}

/// Statement list for the CDC role, executed on an admin session bound to the
/// target database after the service list has completed. The publication is
/// handled separately by [`ensure_publication`].
pub fn cdc_grant_statements(target: &ProvisioningTarget, role: &str) -> Vec<String> {
    let database = quote_ident(&target.database);
    let schema = quote_ident(&target.schema);
    let role = quote_ident(role);

    vec![
        format!("GRANT CONNECT ON DATABASE {database} TO {role}"),
        format!("GRANT SELECT ON ALL TABLES IN SCHEMA {schema} TO {role}"),
        format!("GRANT rds_replication TO {role}"),
    ]
}

pub fn publication_exists_statement() -> String {
    format!(
        "SELECT exists(SELECT pubname FROM pg_catalog.pg_publication WHERE pubname = {})",
        quote_literal(PUBLICATION_NAME)
    )
}

pub fn create_publication_statement() -> String {
    format!(
        "CREATE PUBLICATION {} FOR ALL TABLES",
        quote_ident(PUBLICATION_NAME)
    )
}

/// Execute a statement list in order, stopping at the first failure.
pub async fn run_statements(
    session: &mut dyn Session,
    statements: &[String],
) -> Result<(), ProvisionError> {
    for statement in statements {
        session.execute(statement).await?;
    }
    Ok(())
}

/// Create the logical-replication publication unless it already exists.
/// Returns whether this run created it.
pub async fn ensure_publication(session: &mut dyn Session) -> Result<bool, ProvisionError> {
    if session.query_bool(&publication_exists_statement()).await? {
        tracing::info!(publication = PUBLICATION_NAME, "publication already exists, skipping creation");
        return Ok(false);
    }

    session.execute(&create_publication_statement()).await?;
    tracing::info!(publication = PUBLICATION_NAME, "publication created");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> ProvisioningTarget {
        ProvisioningTarget {
            database: "myapp".to_string(),
            schema: "myapp_user".to_string(),
        }
    }

    #[test]
    fn test_service_list_creates_extensions_before_public_revocation() {
        let statements = service_grant_statements(&target(), "myapp_user");

        let last_extension = statements
            .iter()
            .rposition(|s| s.starts_with("CREATE EXTENSION"))
            .unwrap();
        let first_revoke = statements
            .iter()
            .position(|s| s.starts_with("REVOKE"))
            .unwrap();
        assert!(last_extension < first_revoke);
    }

    #[test]
    fn test_service_list_revokes_after_role_grants_and_before_ownership() {
        let statements = service_grant_statements(&target(), "myapp_user");

        let connect_grant = statements
            .iter()
            .position(|s| s.starts_with("GRANT CONNECT"))
            .unwrap();
        let first_revoke = statements
            .iter()
            .position(|s| s.starts_with("REVOKE"))
            .unwrap();
        let owner = statements
            .iter()
            .position(|s| s.starts_with("ALTER DATABASE"))
            .unwrap();

        assert!(connect_grant < first_revoke);
        assert!(first_revoke < owner);
        assert_eq!(owner, statements.len() - 1);
    }

    #[test]
    fn test_service_list_quotes_identifiers() {
        let statements = service_grant_statements(&target(), "myapp_user");

        assert_eq!(
            statements[3],
            "GRANT CONNECT ON DATABASE \"myapp\" TO \"myapp_user\""
        );
        assert_eq!(
            statements[9],
            "ALTER DEFAULT PRIVILEGES IN SCHEMA \"myapp_user\" GRANT ALL ON TABLES TO \"myapp_user\""
        );
    }

    #[test]
    fn test_cdc_list_grants_replication_but_not_superuser() {
        let statements = cdc_grant_statements(&target(), "cdc_user");

        assert!(statements
            .iter()
            .any(|s| s == "GRANT rds_replication TO \"cdc_user\""));
        assert!(!statements.iter().any(|s| s.contains("rds_superuser")));
    }

    #[test]
    fn test_publication_statements() {
        assert_eq!(
            publication_exists_statement(),
            "SELECT exists(SELECT pubname FROM pg_catalog.pg_publication WHERE pubname = 'cdc_publication')"
        );
        assert_eq!(
            create_publication_statement(),
            "CREATE PUBLICATION \"cdc_publication\" FOR ALL TABLES"
        );
    }
}
