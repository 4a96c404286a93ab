use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

/// Process configuration, loaded once at startup from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub production: bool,
    /// Test mode redirects persistence to `test_`-prefixed tables.
    pub test_mode: bool,
    /// Shared secret the Core API must present on every request.
    pub secret_key: String,
    pub postgres_host: String,
    pub postgres_user: String,
    pub postgres_password: String,
    pub postgres_db: String,
    pub postgres_port: u16,
    /// Volume holding the trained regression artifacts (`{id}.onnx`).
    pub model_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let secret_key = env::var("SECRET_KEY").context("SECRET_KEY must be set")?;
        let postgres_host = env::var("POSTGRES_HOST").context("POSTGRES_HOST must be set")?;
        let postgres_user = env::var("POSTGRES_USER").context("POSTGRES_USER must be set")?;
        let postgres_password =
            env::var("POSTGRES_PASSWORD").context("POSTGRES_PASSWORD must be set")?;
        let postgres_db = env::var("POSTGRES_DB").context("POSTGRES_DB must be set")?;
        let postgres_port = env::var("POSTGRES_PORT")
            .unwrap_or_else(|_| "5432".to_string())
            .parse::<u16>()
            .context("POSTGRES_PORT must be a valid port number")?;

        let model_dir = env::var("MODEL_DIR").unwrap_or_else(|_| "/var/lib/epoch".to_string());

        Ok(Self {
            production: env::var("NODE_ENV").map(|v| v == "production").unwrap_or(false),
            test_mode: env::var("TEST_MODE").map(|v| v == "true").unwrap_or(false),
            secret_key,
            postgres_host,
            postgres_user,
            postgres_password,
            postgres_db,
            postgres_port,
            model_dir: PathBuf::from(model_dir),
        })
    }

    pub fn database_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.postgres_user,
            self.postgres_password,
            self.postgres_host,
            self.postgres_port,
            self.postgres_db
        )
    }
}
