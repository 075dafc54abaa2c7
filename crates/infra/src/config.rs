//! Process configuration loaded from environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `SOIL_BIND_ADDR` | `0.0.0.0:8080` |
//! | `USE_PERSISTENT_STORES` | `false` |
//! | `DATABASE_URL` | required when persistent |
//! | `DATABASE_MAX_CONNECTIONS` | `5` |
//! | `DATABASE_ACQUIRE_TIMEOUT_SECS` | `5` |
//! | `JWT_SECRET` | insecure dev secret (warns) |
//! | `JWT_ISSUER` | `soil` |
//! | `JWT_AUDIENCE` | `soil-clients` |
//! | `JWT_TTL_HOURS` | `6` |
//! | `BCRYPT_COST` | `12` |
//! | `SOIL_REQUIRE_AUTH` | `false` |

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use tracing::{info, warn};

const DEV_JWT_SECRET: &str = "dev-insecure-secret-change-me";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &"<redacted>")
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout", &self.acquire_timeout)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    InMemory,
    Postgres(DatabaseConfig),
}

#[derive(Clone, PartialEq, Eq)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_hours: i64,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("ttl_hours", &self.ttl_hours)
            .finish()
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: DEV_JWT_SECRET.to_string(),
            issuer: "soil".to_string(),
            audience: "soil-clients".to_string(),
            ttl_hours: 6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub storage: StorageConfig,
    pub jwt: JwtConfig,
    pub bcrypt_cost: u32,
    /// Guard every resource route with bearer auth.
    pub require_auth: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            storage: StorageConfig::InMemory,
            jwt: JwtConfig::default(),
            bcrypt_cost: 12,
            require_auth: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let storage = if try_load::<bool, _>(&var, "USE_PERSISTENT_STORES", "false")? {
            let url = var("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
            StorageConfig::Postgres(DatabaseConfig {
                url,
                max_connections: try_load(&var, "DATABASE_MAX_CONNECTIONS", "5")?,
                acquire_timeout: Duration::from_secs(try_load(
                    &var,
                    "DATABASE_ACQUIRE_TIMEOUT_SECS",
                    "5",
                )?),
            })
        } else {
            StorageConfig::InMemory
        };

        let secret = var("JWT_SECRET").unwrap_or_else(|| {
            warn!("JWT_SECRET not set; using insecure development secret");
            DEV_JWT_SECRET.to_string()
        });

        let ttl_hours: i64 = try_load(&var, "JWT_TTL_HOURS", "6")?;
        if ttl_hours <= 0 {
            return Err(ConfigError::Invalid {
                key: "JWT_TTL_HOURS",
                value: ttl_hours.to_string(),
                reason: "must be positive".to_string(),
            });
        }

        let bcrypt_cost: u32 = try_load(&var, "BCRYPT_COST", "12")?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                key: "BCRYPT_COST",
                value: bcrypt_cost.to_string(),
                reason: "must be between 4 and 31".to_string(),
            });
        }

        Ok(Self {
            bind_addr: try_load(&var, "SOIL_BIND_ADDR", "0.0.0.0:8080")?,
            storage,
            jwt: JwtConfig {
                secret,
                issuer: try_load(&var, "JWT_ISSUER", "soil")?,
                audience: try_load(&var, "JWT_AUDIENCE", "soil-clients")?,
                ttl_hours,
            },
            bcrypt_cost,
            require_auth: try_load(&var, "SOIL_REQUIRE_AUTH", "false")?,
        })
    }

    pub fn persistent(&self) -> bool {
        matches!(self.storage, StorageConfig::Postgres(_))
    }
}

fn try_load<T, F>(var: &F, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    let raw = var(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    raw.trim().parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");
        ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }
    })
}
