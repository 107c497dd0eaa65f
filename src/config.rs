use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// PostgreSQL connection URL; the in-memory store is used when unset
    #[serde(default)]
    pub database_url: Option<String>,

    /// Upper bound on pooled PostgreSQL connections
    #[serde(default = "default_max_connections")]
    pub database_max_connections: u32,

    /// Apply embedded migrations on startup
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_max_connections() -> u32 {
    5
}

fn default_run_migrations() -> bool {
    true
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_iter(std::env::vars())
    }

    fn from_iter<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter::<_, Config>(vars).map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_defaults_without_database() {
        let config = assert_ok!(Config::from_iter(Vec::<(String, String)>::new()));
        assert_eq!(config.database_url, None);
        assert_eq!(config.database_max_connections, 5);
        assert!(config.run_migrations);
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_reads_overrides() {
        let vars = vec![
            (
                "DATABASE_URL".to_string(),
                "postgres://localhost/cinegraph".to_string(),
            ),
            ("PORT".to_string(), "9000".to_string()),
            ("RUN_MIGRATIONS".to_string(), "false".to_string()),
        ];
        let config = assert_ok!(Config::from_iter(vars));
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/cinegraph")
        );
        assert_eq!(config.port, 9000);
        assert!(!config.run_migrations);
    }

    #[test]
    fn test_rejects_bad_port() {
        let vars = vec![("PORT".to_string(), "not-a-port".to_string())];
        assert_err!(Config::from_iter(vars));
    }
}
