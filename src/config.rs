use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Server settings, read from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub data_path: PathBuf,
    pub static_path: PathBuf,
    /// How often seated names are written for the next process.
    pub continuity_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            data_path: PathBuf::from("data"),
            static_path: PathBuf::from("static"),
            continuity_interval: Duration::from_secs(60),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring invalid {}={:?}", key, raw);
            None
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: env_parse("PORT").unwrap_or(defaults.port),
            data_path: env_parse("DATA_PATH").unwrap_or(defaults.data_path),
            static_path: env_parse("STATIC_PATH").unwrap_or(defaults.static_path),
            continuity_interval: env_parse("CONTINUITY_INTERVAL_SECS")
                .filter(|secs: &u64| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.continuity_interval),
        }
    }
}

/// Create the data directory if missing.
pub fn init(config: &ServerConfig) -> std::io::Result<()> {
    if !config.data_path.exists() {
        fs::create_dir_all(&config.data_path)?;
        tracing::info!("Created data directory {}", config.data_path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.data_path, PathBuf::from("data"));
        assert_eq!(config.continuity_interval, Duration::from_secs(60));
    }

    #[test]
    fn init_creates_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            data_path: dir.path().join("nested/data"),
            ..ServerConfig::default()
        };
        init(&config).unwrap();
        assert!(config.data_path.is_dir());
    }
}
