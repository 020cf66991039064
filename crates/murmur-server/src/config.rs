use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

/// Placeholder secret shipped as the default; fine for local runs only.
pub const PLACEHOLDER_SECRET: &str = "dev-secret-change-me";

pub struct Config {
    pub addr: SocketAddr,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub session_ttl: chrono::Duration,
    pub db_connect_attempts: u32,
    pub db_retry_delay: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let host = env_or("MURMUR_HOST", "0.0.0.0");
        let port: u16 = parse_env("MURMUR_PORT", 5000)?;
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", host, port))?;

        let session_hours: i64 = parse_env("MURMUR_SESSION_HOURS", 12)?;
        let db_connect_attempts: u32 = parse_env("MURMUR_DB_CONNECT_ATTEMPTS", 10)?;
        let retry_secs: u64 = parse_env("MURMUR_DB_RETRY_SECS", 3)?;

        Ok(Self {
            addr,
            db_path: env_or("MURMUR_DB_PATH", "murmur.db").into(),
            jwt_secret: env_or("MURMUR_JWT_SECRET", PLACEHOLDER_SECRET),
            session_ttl: chrono::Duration::hours(session_hours),
            db_connect_attempts: db_connect_attempts.max(1),
            db_retry_delay: Duration::from_secs(retry_secs),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{} must be a number, got {:?}", key, raw)),
        Err(_) => Ok(default),
    }
}
