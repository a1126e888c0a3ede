use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use actix_web::cookie::Key;

use crate::db;

const MIN_SESSION_SECRET_LEN: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("SESSION_SECRET must be at least {MIN_SESSION_SECRET_LEN} bytes")]
    SessionSecretTooShort,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_address: String,
    pub session_secret: Option<String>,
    pub seed_file: PathBuf,
    pub cookie_secure: bool,
    pub pool_size: u32,
}

impl Config {
    /// Read configuration from the process environment (after `.env`).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let session_secret = lookup("SESSION_SECRET").filter(|s| !s.is_empty());
        if matches!(&session_secret, Some(secret) if secret.len() < MIN_SESSION_SECRET_LEN) {
            return Err(ConfigError::SessionSecretTooShort);
        }

        let database_url: String = try_load(&lookup, "DATABASE_URL", "smartdine.db")?;
        let mut pool_size: u32 = try_load(&lookup, "DB_POOL_SIZE", "8")?;
        if db::is_in_memory(&database_url) {
            pool_size = 1;
        }

        Ok(Config {
            database_url,
            bind_address: try_load(&lookup, "BIND_ADDRESS", "127.0.0.1:8080")?,
            session_secret,
            seed_file: try_load(&lookup, "SEED_FILE", "data/seed.json")?,
            cookie_secure: try_load(&lookup, "COOKIE_SECURE", "false")?,
            pool_size,
        })
    }

    /// Signing key for session cookies. Without a configured secret a
    /// random key is generated and sessions end on restart.
    pub fn session_key(&self) -> Key {
        match &self.session_secret {
            Some(secret) => Key::derive_from(secret.as_bytes()),
            None => {
                log::warn!("SESSION_SECRET not set, generating an ephemeral session key");
                Key::generate()
            }
        }
    }
}

fn try_load<F, T>(lookup: &F, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    let value = lookup(key).unwrap_or_else(|| {
        log::debug!("{key} not set, using default: {default}");
        default.to_owned()
    });
    value.parse().map_err(|err: T::Err| ConfigError::Invalid {
        key,
        reason: err.to_string(),
        value,
    })
}
