//! Process configuration, read from flags or `TENANTRY_*` environment
//! variables.

use std::time::Duration;

use clap::{ArgAction, Parser};
use tenantry_auth::AuthConfig;
use tenantry_cache::CachePolicy;
use tenantry_db::DbConfig;
use tenantry_telemetry::TelemetryConfig;

#[derive(Parser, Debug, Clone)]
#[command(name = "tenantry-server", version, about = "Multi-tenant registration and login API")]
pub struct Config {
    /// Address to bind to
    #[arg(long, default_value = "0.0.0.0", env = "TENANTRY_HOST")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 8080, env = "TENANTRY_PORT")]
    pub port: u16,

    /// SurrealDB endpoint; `mem://` runs the embedded in-memory engine
    #[arg(long, default_value = "mem://", env = "TENANTRY_DB_URL")]
    pub db_url: String,

    #[arg(long, default_value = "tenantry", env = "TENANTRY_DB_NAMESPACE")]
    pub db_namespace: String,

    #[arg(long, default_value = "main", env = "TENANTRY_DB_DATABASE")]
    pub db_database: String,

    #[arg(long, default_value = "root", env = "TENANTRY_DB_USERNAME")]
    pub db_username: String,

    #[arg(
        long,
        default_value = "root",
        env = "TENANTRY_DB_PASSWORD",
        hide_env_values = true
    )]
    pub db_password: String,

    /// Emit spans, metrics and events; `false` selects the no-op strategy
    #[arg(long, default_value_t = true, action = ArgAction::Set, env = "TENANTRY_TELEMETRY_ENABLED")]
    pub telemetry_enabled: bool,

    /// Cache repository lookups in process memory
    #[arg(long, default_value_t = true, action = ArgAction::Set, env = "TENANTRY_CACHE_ENABLED")]
    pub cache_enabled: bool,

    /// Lifetime of cached entities, in seconds
    #[arg(long, default_value_t = 600, env = "TENANTRY_CACHE_TTL_SECS")]
    pub cache_ttl_secs: u64,

    /// Lifetime of cached "not found" markers, in seconds
    #[arg(long, default_value_t = 300, env = "TENANTRY_CACHE_NEGATIVE_TTL_SECS")]
    pub cache_negative_ttl_secs: u64,

    /// Server-side secret prepended to passwords before hashing
    #[arg(long, env = "TENANTRY_PASSWORD_PEPPER", hide_env_values = true)]
    pub password_pepper: Option<String>,
}

impl Config {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            url: self.db_url.clone(),
            namespace: self.db_namespace.clone(),
            database: self.db_database.clone(),
            username: self.db_username.clone(),
            password: self.db_password.clone(),
        }
    }

    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig {
            pepper: self.password_pepper.clone(),
            ..AuthConfig::default()
        }
    }

    pub fn cache_policy(&self) -> CachePolicy {
        CachePolicy {
            positive_ttl: Duration::from_secs(self.cache_ttl_secs),
            negative_ttl: Duration::from_secs(self.cache_negative_ttl_secs),
        }
    }

    pub fn telemetry_config(&self) -> TelemetryConfig {
        TelemetryConfig {
            enabled: self.telemetry_enabled,
            ..TelemetryConfig::default()
        }
    }
}
