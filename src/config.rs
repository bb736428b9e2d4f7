//! Daemon configuration
//!
//! Built-in defaults, optionally overridden through `GPIE_*` environment
//! variables. The resulting value is passed explicitly to every component.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::display::FbiConfig;
use crate::drive::Credentials;
use crate::sync::ReconcilePolicy;

/// Cache directory, relative to the working directory
pub const DEFAULT_CACHE_DIR: &str = "images";

/// Drive folder whose children are shown
pub const DEFAULT_FOLDER_ID: &str = "1p8uFsCYf90m4IseWBHV3CFTVXKxszyuX";

/// Time between refreshes
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// HTTP request timeout for listing and downloads
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct Config {
    pub cache_dir: PathBuf,
    pub folder_id: String,
    pub refresh_interval: Duration,
    pub request_timeout: Duration,
    pub policy: ReconcilePolicy,
    pub display: FbiConfig,
    /// None when no token is configured; running then fails at startup
    pub credentials: Option<Credentials>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            folder_id: DEFAULT_FOLDER_ID.to_string(),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            policy: ReconcilePolicy::default(),
            display: FbiConfig::default(),
            credentials: None,
        }
    }
}

impl Config {
    /// Defaults overridden by the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each `GPIE_*` key
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(dir) = get("GPIE_CACHE_DIR") {
            config.cache_dir = PathBuf::from(dir);
        }
        if let Some(folder) = get("GPIE_FOLDER_ID") {
            config.folder_id = folder.trim().to_string();
        }
        if let Some(secs) = get("GPIE_REFRESH_SECS") {
            let secs: u64 = parse("GPIE_REFRESH_SECS", &secs)?;
            if secs == 0 {
                return Err(anyhow!("GPIE_REFRESH_SECS must be greater than zero"));
            }
            config.refresh_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = get("GPIE_REQUEST_TIMEOUT_SECS") {
            config.request_timeout = Duration::from_secs(parse("GPIE_REQUEST_TIMEOUT_SECS", &secs)?);
        }
        if let Some(policy) = get("GPIE_RECONCILE") {
            config.policy = policy
                .parse()
                .map_err(|e: String| anyhow!("Invalid GPIE_RECONCILE: {}", e))?;
        }
        if let Some(program) = get("GPIE_DISPLAY_PROGRAM") {
            config.display.program = program;
        }
        if let Some(secs) = get("GPIE_SLIDE_SECS") {
            config.display.slide_secs = parse("GPIE_SLIDE_SECS", &secs)?;
        }
        if let Some(console) = get("GPIE_CONSOLE") {
            config.display.console = match console.trim() {
                "none" => None,
                n => Some(parse("GPIE_CONSOLE", n)?),
            };
        }

        // A token file wins over an inline token
        config.credentials = match (get("GPIE_ACCESS_TOKEN_FILE"), get("GPIE_ACCESS_TOKEN")) {
            (Some(path), _) => Some(Credentials::TokenFile(PathBuf::from(path))),
            (None, Some(token)) => Some(Credentials::Token(token)),
            (None, None) => None,
        };

        Ok(config)
    }
}

fn parse<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("Invalid {}: {:?}", key, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.cache_dir, PathBuf::from("images"));
        assert_eq!(config.folder_id, DEFAULT_FOLDER_ID);
        assert_eq!(config.refresh_interval, Duration::from_secs(300));
        assert_eq!(config.policy, ReconcilePolicy::FetchMissing);
        assert_eq!(config.display, FbiConfig::default());
        assert!(config.credentials.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("GPIE_CACHE_DIR", "/var/cache/gpie"),
            ("GPIE_FOLDER_ID", "abc"),
            ("GPIE_REFRESH_SECS", "60"),
            ("GPIE_RECONCILE", "present"),
            ("GPIE_DISPLAY_PROGRAM", "/usr/local/bin/fbi"),
            ("GPIE_SLIDE_SECS", "15"),
            ("GPIE_CONSOLE", "none"),
            ("GPIE_ACCESS_TOKEN", "ya29.abc"),
        ])
        .unwrap();

        assert_eq!(config.cache_dir, PathBuf::from("/var/cache/gpie"));
        assert_eq!(config.folder_id, "abc");
        assert_eq!(config.refresh_interval, Duration::from_secs(60));
        assert_eq!(config.policy, ReconcilePolicy::RefetchPresent);
        assert_eq!(config.display.program, "/usr/local/bin/fbi");
        assert_eq!(config.display.slide_secs, 15);
        assert_eq!(config.display.console, None);
        assert!(matches!(config.credentials, Some(Credentials::Token(ref t)) if t == "ya29.abc"));
    }

    #[test]
    fn test_token_file_preferred() {
        let config = config_from(&[
            ("GPIE_ACCESS_TOKEN", "inline"),
            ("GPIE_ACCESS_TOKEN_FILE", "/run/gpie/token"),
        ])
        .unwrap();
        assert!(matches!(
            config.credentials,
            Some(Credentials::TokenFile(ref p)) if p == &PathBuf::from("/run/gpie/token")
        ));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(config_from(&[("GPIE_REFRESH_SECS", "soon")]).is_err());
        assert!(config_from(&[("GPIE_REFRESH_SECS", "0")]).is_err());
        assert!(config_from(&[("GPIE_RECONCILE", "always")]).is_err());
        assert!(config_from(&[("GPIE_CONSOLE", "-1")]).is_err());
    }

    #[test]
    fn test_blank_values_ignored() {
        let config = config_from(&[("GPIE_FOLDER_ID", "  "), ("GPIE_ACCESS_TOKEN", "")]).unwrap();
        assert_eq!(config.folder_id, DEFAULT_FOLDER_ID);
        assert!(config.credentials.is_none());
    }
}
