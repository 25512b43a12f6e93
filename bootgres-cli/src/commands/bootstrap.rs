use anyhow::Result;
use uuid::Uuid;

use bootgres_models::ProvisioningTarget;
use bootgres_provisioner::grants::{
    cdc_grant_statements, create_publication_statement, service_grant_statements,
};
use bootgres_provisioner::run_bootstrap;
use bootgres_provisioner::secrets::{resolve_optional, resolve_required, EnvSecretStore};
use bootgres_provisioner::session::PgConnector;

use crate::config::Config;

pub async fn run(output: String) -> Result<()> {
    let config = Config::load()?;
    let run_id = format!("bootstrap-{}", Uuid::new_v4());
    tracing::info!(run_id = %run_id, host = %config.rds_host, "starting bootstrap run");

    let secrets = EnvSecretStore;
    let connector = PgConnector::new(config.rds_host.clone(), config.rds_port);

    let outcome = run_bootstrap(&config.request(), &secrets, &connector).await?;

    if output == "json" {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!("{}", outcome.message);
    }

    Ok(())
}

/// Resolve the target and print the statement plan without opening any
/// database connection. Secrets are still read (usernames drive the
/// derivation), but only locally.
pub async fn plan() -> Result<()> {
    let config = Config::load()?;
    let secrets = EnvSecretStore;

    let service = resolve_required(&secrets, &config.app_user_secret).await?;
    let target = ProvisioningTarget::resolve(
        &service.username,
        config.app_database_name.as_deref(),
        config.app_schema_name.as_deref(),
    );

    println!("Target:");
    println!("  Database: {}", target.database);
    println!("  Schema:   {}", target.schema);
    println!();
    println!("Service role statements ({}):", service.username);
    for statement in service_grant_statements(&target, &service.username) {
        println!("  {}", statement);
    }

    println!();
    match &config.cdc_user_secret {
        Some(secret_id) => match resolve_optional(&secrets, secret_id).await {
            Some(cdc) => {
                println!("CDC role statements ({}):", cdc.username);
                for statement in cdc_grant_statements(&target, &cdc.username) {
                    println!("  {}", statement);
                }
                println!("  {}", create_publication_statement());
            }
            None => println!(
                "CDC secret \"{}\" missing or malformed; CDC phase would be skipped.",
                secret_id
            ),
        },
        None => println!("CDC_USER_SECRET not set; CDC phase would be skipped."),
    }

    Ok(())
}

pub fn show_config() -> Result<()> {
    let config = Config::load()?;

    println!("RDS_HOST:           {}", config.rds_host);
    println!("RDS_PORT:           {}", config.rds_port);
    println!("MASTER_USER_SECRET: {}", config.master_user_secret);
    println!("APP_USER_SECRET:    {}", config.app_user_secret);
    println!(
        "CDC_USER_SECRET:    {}",
        config.cdc_user_secret.as_deref().unwrap_or("<not set>")
    );
    println!(
        "APP_DATABASE_NAME:  {}",
        config
            .app_database_name
            .as_deref()
            .unwrap_or("<derived from service username>")
    );
    println!(
        "APP_SCHEMA_NAME:    {}",
        config
            .app_schema_name
            .as_deref()
            .unwrap_or("<service username>")
    );

    Ok(())
}
