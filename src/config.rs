/// Port used when `PORT` is not set.
pub const DEFAULT_PORT: u16 = 3000;

/// Pool size used when `DB_MAX_CONNECTIONS` is not set.
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    /// Storage connection string. `None` runs the service in degraded mode.
    pub database_url: Option<String>,
    pub port: u16,
    pub db_max_connections: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self::from_lookup(|key| std::env::var(key).ok())?;

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        match config.database_url {
            Some(ref url) => tracing::debug!(
                "Database URL: {}...",
                url.chars().take(20).collect::<String>()
            ),
            None => tracing::error!(
                "❌ DB_URL / DATABASE_URL not set - starting without storage, data endpoints will return 503"
            ),
        }
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }

    /// Builds the configuration from an arbitrary variable source.
    ///
    /// A missing or malformed connection string is not an error: it is logged
    /// and the service starts without storage.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = ["DB_URL", "DATABASE_URL", "MONGO_URI"]
            .iter()
            .find_map(|&key| lookup(key).filter(|v| !v.trim().is_empty()))
            .and_then(|url| {
                if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
                    tracing::error!("❌ DB_URL must start with postgresql:// or postgres://");
                    return None;
                }
                Some(url)
            });

        let port = match lookup("PORT").filter(|v| !v.trim().is_empty()) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            None => DEFAULT_PORT,
        };

        let db_max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| anyhow::anyhow!("DB_MAX_CONNECTIONS must be a positive number"))?,
            None => DEFAULT_DB_MAX_CONNECTIONS,
        };

        Ok(Self {
            database_url,
            port,
            db_max_connections,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.database_url, None);
        assert_eq!(config.port, 3000);
        assert_eq!(config.db_max_connections, 10);
    }

    #[test]
    fn test_database_url_precedence() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://second/db"),
            ("DB_URL", "postgres://first/db"),
        ])
        .unwrap();
        assert_eq!(config.database_url.as_deref(), Some("postgres://first/db"));

        let config = config_from(&[
            ("DB_URL", "   "),
            ("MONGO_URI", "postgresql://legacy/db"),
        ])
        .unwrap();
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgresql://legacy/db")
        );
    }

    #[test]
    fn test_foreign_scheme_degrades_instead_of_failing() {
        let config = config_from(&[("DATABASE_URL", "mongodb+srv://cluster/shayai")]).unwrap();
        assert_eq!(config.database_url, None);
    }

    #[test]
    fn test_port_override() {
        assert_eq!(config_from(&[("PORT", "8080")]).unwrap().port, 8080);
        assert!(config_from(&[("PORT", "http")]).is_err());
        assert!(config_from(&[("PORT", "70000")]).is_err());
    }

    #[test]
    fn test_db_max_connections() {
        let config = config_from(&[("DB_MAX_CONNECTIONS", "4")]).unwrap();
        assert_eq!(config.db_max_connections, 4);
        assert!(config_from(&[("DB_MAX_CONNECTIONS", "0")]).is_err());
    }
}
