use anyhow::{Context, Result};
use bootgres_models::BootstrapRequest;

#[derive(Debug, Clone)]
pub struct Config {
    pub rds_host: String,
    pub rds_port: u16,
    pub master_user_secret: String,
    pub app_user_secret: String,
    pub cdc_user_secret: Option<String>,
    pub app_database_name: Option<String>,
    pub app_schema_name: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            rds_host: std::env::var("RDS_HOST").context("RDS_HOST must be set")?,
            rds_port: std::env::var("RDS_PORT")
                .unwrap_or_else(|_| "5432".to_string())
                .parse()
                .context("RDS_PORT must be a valid port number")?,
            master_user_secret: std::env::var("MASTER_USER_SECRET")
                .context("MASTER_USER_SECRET must be set")?,
            app_user_secret: std::env::var("APP_USER_SECRET")
                .context("APP_USER_SECRET must be set")?,
            cdc_user_secret: std::env::var("CDC_USER_SECRET").ok(),
            app_database_name: std::env::var("APP_DATABASE_NAME").ok(),
            app_schema_name: std::env::var("APP_SCHEMA_NAME").ok(),
        })
    }

    pub fn request(&self) -> BootstrapRequest {
        BootstrapRequest {
            master_user_secret: self.master_user_secret.clone(),
            app_user_secret: self.app_user_secret.clone(),
            cdc_user_secret: self.cdc_user_secret.clone(),
            app_database_name: self.app_database_name.clone(),
            app_schema_name: self.app_schema_name.clone(),
        }
    }
}
