//! Configuration
//! Mission: One place that turns `.env`, environment and flags into settings

use anyhow::{bail, Result};
use clap::{Args, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::warn;

const DEV_JWT_SECRET: &str = "dev-secret-change-in-production-minimum-32-characters";
const DEV_ADMIN_PASSWORD: &str = "admin123";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AppEnv {
    Development,
    Production,
}

/// Settings shared by the server and the seeder.
#[derive(Args, Debug, Clone)]
pub struct AppConfig {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Address to bind
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0")]
    pub bind_addr: String,

    /// SQLite database file; relative paths resolve against the crate root
    #[arg(long, env = "DB_PATH", default_value = "blog.db")]
    pub db_path: String,

    /// HMAC secret for session tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    #[arg(long, env = "APP_ENV", value_enum, default_value = "development")]
    pub app_env: AppEnv,

    /// Allowed browser origin (credentials enabled)
    #[arg(long, env = "CORS_ORIGIN", default_value = "http://localhost:5173")]
    pub cors_origin: String,

    #[arg(long, env = "BCRYPT_COST", default_value_t = bcrypt::DEFAULT_COST)]
    pub bcrypt_cost: u32,

    /// Default admin created when the user table is empty
    #[arg(long, env = "ADMIN_EMAIL", default_value = "admin@example.com")]
    pub admin_email: String,

    /// Password for the default admin; required to create it in production
    #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            bind_addr: "0.0.0.0".to_string(),
            db_path: "blog.db".to_string(),
            jwt_secret: None,
            app_env: AppEnv::Development,
            cors_origin: "http://localhost:5173".to_string(),
            bcrypt_cost: bcrypt::DEFAULT_COST,
            admin_email: "admin@example.com".to_string(),
            admin_password: None,
        }
    }
}

impl AppConfig {
    /// Fill derived fields. Production refuses to start without a real secret.
    pub fn finalize(mut self) -> Result<Self> {
        self.jwt_secret = match self.jwt_secret.take().filter(|s| !s.trim().is_empty()) {
            Some(secret) => Some(secret),
            None if self.app_env == AppEnv::Production => {
                bail!("JWT_SECRET must be set when APP_ENV=production")
            }
            None => {
                warn!("⚠️  JWT_SECRET not set, using development secret");
                Some(DEV_JWT_SECRET.to_string())
            }
        };

        if !(4..=31).contains(&self.bcrypt_cost) {
            bail!("BCRYPT_COST must be between 4 and 31, got {}", self.bcrypt_cost);
        }

        self.db_path = resolve_data_path(&self.db_path);
        Ok(self)
    }

    pub fn jwt_secret(&self) -> &str {
        self.jwt_secret.as_deref().unwrap_or(DEV_JWT_SECRET)
    }

    /// Password for the bootstrap admin. Production never falls back to the
    /// development default, so an unset `ADMIN_PASSWORD` yields `None`.
    pub fn default_admin_password(&self) -> Option<&str> {
        match self.admin_password.as_deref().filter(|p| !p.trim().is_empty()) {
            Some(password) => Some(password),
            None if self.app_env == AppEnv::Production => None,
            None => Some(DEV_ADMIN_PASSWORD),
        }
    }

    pub fn secure_cookies(&self) -> bool {
        self.app_env == AppEnv::Production
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

/// Treat relative paths as relative to the crate root, not the caller's cwd.
fn resolve_data_path(raw: &str) -> String {
    if raw == ":memory:" {
        return raw.to_string();
    }

    let p = PathBuf::from(raw);
    if p.is_absolute() {
        return p.to_string_lossy().to_string();
    }

    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join(p)
        .to_string_lossy()
        .to_string()
}

/// Load `.env` from the cwd search path, then from the crate root.
pub fn load_env() {
    let _ = dotenv::dotenv();

    let candidate = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    if candidate.exists() {
        let _ = dotenv::from_path(&candidate);
    }
}
