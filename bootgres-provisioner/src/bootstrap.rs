//! The bootstrap orchestration
//!
//! Sequences secret resolution, identity provisioning, and the grant phases
//! into one run. Each phase owns exactly one session and closes it on every
//! exit path; the admin session is fully closed before the target-database
//! session opens. There is no retry and no rollback: the first error
//! propagates to the caller once the active session is closed.

use bootgres_models::{BootstrapOutcome, BootstrapRequest, Credential, ProvisioningTarget};
use chrono::Utc;

use crate::error::ProvisionError;
use crate::grants::{
    cdc_grant_statements, ensure_publication, run_statements, service_grant_statements,
    PUBLICATION_NAME,
};
use crate::identity::{ensure_database, ensure_role};
use crate::secrets::{resolve_optional, resolve_required, SecretStore};
use crate::session::{Connector, Session};

/// How the CDC phase was decided for this run.
enum CdcSetup {
    Enabled(Credential),
    NotConfigured,
    Unresolvable { secret_id: String },
}

struct IdentityReport {
    database_created: bool,
    service_role_created: bool,
    cdc_role_created: Option<bool>,
}

/// Run the full bootstrap workflow against the given collaborators.
pub async fn run_bootstrap(
    request: &BootstrapRequest,
    secrets: &dyn SecretStore,
    connector: &dyn Connector,
) -> Result<BootstrapOutcome, ProvisionError> {
    // Step 1: Resolve credentials (nothing connects until these are good)
    tracing::info!("Step 1: Resolving credentials");
    let master = resolve_required(secrets, &request.master_user_secret).await?;
    let service = resolve_required(secrets, &request.app_user_secret).await?;
    let cdc = match &request.cdc_user_secret {
        None => CdcSetup::NotConfigured,
        Some(secret_id) => match resolve_optional(secrets, secret_id).await {
            Some(credential) => CdcSetup::Enabled(credential),
            None => CdcSetup::Unresolvable {
                secret_id: secret_id.clone(),
            },
        },
    };

    let target = ProvisioningTarget::resolve(
        &service.username,
        request.app_database_name.as_deref(),
        request.app_schema_name.as_deref(),
    );
    tracing::info!(
        database = %target.database,
        schema = %target.schema,
        service_role = %service.username,
        "resolved provisioning target"
    );

    // Step 2: Ensure database and roles on the admin database
    tracing::info!("Step 2: Ensuring database and roles exist");
    let cdc_credential = match &cdc {
        CdcSetup::Enabled(credential) => Some(credential),
        _ => None,
    };
    let mut session = connector.connect(&master, None).await?;
    let identities =
        provision_identities(session.as_mut(), &target, &service, cdc_credential).await;
    let closed = session.close().await;
    let identities = identities?;
    closed?;

    // Step 3: Apply service role grants on the target database
    tracing::info!("Step 3: Applying service role grants");
    let mut session = connector.connect(&master, Some(&target.database)).await?;
    let granted = run_statements(
        session.as_mut(),
        &service_grant_statements(&target, &service.username),
    )
    .await;
    let closed = session.close().await;
    granted?;
    closed?;

    // Step 4: Apply CDC grants and publication, if enabled
    let (cdc_role, publication_created) = match &cdc {
        CdcSetup::Enabled(credential) => {
            tracing::info!("Step 4: Applying CDC role grants and publication");
            let mut session = connector.connect(&master, Some(&target.database)).await?;
            let result = apply_cdc_phase(session.as_mut(), &target, &credential.username).await;
            let closed = session.close().await;
            let publication_created = result?;
            closed?;
            (Some(credential.username.clone()), Some(publication_created))
        }
        _ => {
            tracing::info!("Step 4: CDC not enabled, skipping");
            (None, None)
        }
    };

    let outcome = BootstrapOutcome {
        message: summary_message(&target, &service.username, &cdc),
        database: target.database,
        schema: target.schema,
        service_role: service.username,
        cdc_role,
        database_created: identities.database_created,
        service_role_created: identities.service_role_created,
        cdc_role_created: identities.cdc_role_created,
        publication_created,
        completed_at: Utc::now(),
    };

    tracing::info!(message = %outcome.message, "bootstrap complete");
    Ok(outcome)
}

/// Database first, then service role, then CDC role: the grant phases assume
/// all three exist.
async fn provision_identities(
    session: &mut dyn Session,
    target: &ProvisioningTarget,
    service: &Credential,
    cdc: Option<&Credential>,
) -> Result<IdentityReport, ProvisionError> {
    let database_created = ensure_database(session, &target.database).await?;
    let service_role_created =
        ensure_role(session, &service.username, &service.password).await?;
    let cdc_role_created = match cdc {
        Some(credential) => {
            Some(ensure_role(session, &credential.username, &credential.password).await?)
        }
        None => None,
    };

    Ok(IdentityReport {
        database_created,
        service_role_created,
        cdc_role_created,
    })
}

async fn apply_cdc_phase(
    session: &mut dyn Session,
    target: &ProvisioningTarget,
    cdc_role: &str,
) -> Result<bool, ProvisionError> {
    run_statements(session, &cdc_grant_statements(target, cdc_role)).await?;
    ensure_publication(session).await
}

fn summary_message(target: &ProvisioningTarget, service_role: &str, cdc: &CdcSetup) -> String {
    match cdc {
        CdcSetup::Enabled(credential) => format!(
            "Provisioned database \"{}\" with service role \"{}\" and CDC role \"{}\" (publication \"{}\").",
            target.database, service_role, credential.username, PUBLICATION_NAME
        ),
        CdcSetup::NotConfigured => format!(
            "Provisioned database \"{}\" with service role \"{}\". CDC_USER_SECRET not set; skipping CDC user/publication setup.",
            target.database, service_role
        ),
        CdcSetup::Unresolvable { secret_id } => format!(
            "Provisioned database \"{}\" with service role \"{}\". CDC secret \"{}\" missing or malformed; skipping CDC user/publication setup.",
            target.database, service_role, secret_id
        ),
    }
}
