use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub retention: RetentionSettings,
    pub propagation: PropagationConfig,
    pub app: AppConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// SQLite URL, e.g. "sqlite:./data/correlog.db"
    pub url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetentionSettings {
    pub ttl_days: u32,
    pub cleanup_hour: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PropagationConfig {
    /// Echo the inbound correlation id back on the response
    pub echo_correlation_id: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub application_name: String,
    pub environment: String,
}

pub fn load_config() -> anyhow::Result<Config> {
    let config = config::Config::builder()
        .add_source(config::File::with_name("correlog"))
        .add_source(config::Environment::with_prefix("CORRELOG").separator("__"))
        .build()?;

    let cfg: Config = config.try_deserialize()?;
    validate_config(&cfg)?;

    Ok(cfg)
}

fn validate_config(cfg: &Config) -> anyhow::Result<()> {
    if cfg.database.url.is_empty() {
        anyhow::bail!("database.url must not be empty");
    }

    if cfg.retention.ttl_days == 0 {
        anyhow::bail!("retention.ttl_days must be at least 1");
    }

    if cfg.retention.cleanup_hour > 23 {
        anyhow::bail!(
            "retention.cleanup_hour must be 0-23, got {}",
            cfg.retention.cleanup_hour
        );
    }

    if cfg.app.application_name.is_empty() {
        anyhow::bail!("app.application_name must not be empty");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> Config {
        Config {
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
            },
            retention: RetentionSettings {
                ttl_days: 30,
                cleanup_hour: 3,
            },
            propagation: PropagationConfig {
                echo_correlation_id: true,
            },
            app: AppConfig {
                application_name: "correlog-tests".to_string(),
                environment: "Testing".to_string(),
            },
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate_config(&create_test_config()).is_ok());
    }

    #[test]
    fn test_validate_config_rejects_empty_database_url() {
        let mut cfg = create_test_config();
        cfg.database.url.clear();

        let result = validate_config(&cfg);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("database.url must not be empty"));
    }

    #[test]
    fn test_validate_config_rejects_zero_ttl() {
        let mut cfg = create_test_config();
        cfg.retention.ttl_days = 0;
        assert!(validate_config(&cfg).is_err());
    }

    #[test]
    fn test_validate_config_rejects_bad_cleanup_hour() {
        let mut cfg = create_test_config();
        cfg.retention.cleanup_hour = 24;
        assert!(validate_config(&cfg).is_err());
    }
}
