use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub db_path: PathBuf,
    pub addr: SocketAddr,
    pub asset_dir: PathBuf,
    pub asset_base_url: String,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup; unset keys fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let jwt_secret = lookup("VIDSHARE_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("VIDSHARE_JWT_SECRET is unset or still a placeholder; set it in your .env file and restart");
        }

        let host = var("VIDSHARE_HOST", "0.0.0.0");
        let port: u16 = var("VIDSHARE_PORT", "8000")
            .parse()
            .context("VIDSHARE_PORT must be a port number")?;
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", host, port))?;

        let max_upload_mb: usize = var("VIDSHARE_MAX_UPLOAD_MB", "512")
            .parse()
            .context("VIDSHARE_MAX_UPLOAD_MB must be a whole number")?;

        let asset_base_url = var("VIDSHARE_ASSET_BASE_URL", "/assets")
            .trim_end_matches('/')
            .to_string();
        if !asset_base_url.starts_with('/') {
            bail!("VIDSHARE_ASSET_BASE_URL must be an absolute path such as /assets");
        }

        Ok(Self {
            jwt_secret,
            db_path: var("VIDSHARE_DB_PATH", "vidshare.db").into(),
            addr,
            asset_dir: var("VIDSHARE_ASSET_DIR", "./assets").into(),
            asset_base_url,
            max_upload_bytes: max_upload_mb * 1024 * 1024,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(pairs: &[(&str, &str)]) -> Result<Config> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let cfg = config(&[("VIDSHARE_JWT_SECRET", "s3cret")]).unwrap();
        assert_eq!(cfg.addr.port(), 8000);
        assert_eq!(cfg.db_path, PathBuf::from("vidshare.db"));
        assert_eq!(cfg.asset_base_url, "/assets");
        assert_eq!(cfg.max_upload_bytes, 512 * 1024 * 1024);
    }

    #[test]
    fn asset_base_url_must_be_a_sub_path() {
        let cfg = config(&[("VIDSHARE_JWT_SECRET", "s3cret"), ("VIDSHARE_ASSET_BASE_URL", "/media/")]).unwrap();
        assert_eq!(cfg.asset_base_url, "/media");
        assert!(config(&[("VIDSHARE_JWT_SECRET", "s3cret"), ("VIDSHARE_ASSET_BASE_URL", "/")]).is_err());
    }

    #[test]
    fn placeholder_secret_is_fatal() {
        assert!(config(&[]).is_err());
        assert!(config(&[("VIDSHARE_JWT_SECRET", "dev-secret-change-me")]).is_err());
    }

    #[test]
    fn bad_port_is_reported() {
        let err = config(&[("VIDSHARE_JWT_SECRET", "s3cret"), ("VIDSHARE_PORT", "http")]).unwrap_err();
        assert!(err.to_string().contains("VIDSHARE_PORT"));
    }
}
