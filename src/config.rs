use std::{env, path::PathBuf};

use anyhow::Context;

use crate::filters::{DEFAULT_LIMIT, MAX_LIMIT, PageLimits};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub limits: PageLimits,
    pub reference_data_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let default_limit = parse_or("SEARCH_DEFAULT_LIMIT", DEFAULT_LIMIT)?;
        let max_limit = parse_or("SEARCH_MAX_LIMIT", MAX_LIMIT)?;
        let limits = PageLimits::new(default_limit, max_limit)
            .context("invalid SEARCH_DEFAULT_LIMIT / SEARCH_MAX_LIMIT")?;
        let reference_data_path = env::var("REFERENCE_DATA_PATH")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);
        Ok(Self {
            port,
            database_url,
            host,
            limits,
            reference_data_path,
        })
    }
}

fn parse_or(key: &str, default: u64) -> anyhow::Result<u64> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .with_context(|| format!("{key} must be a positive integer, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
