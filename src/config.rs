use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Bootstrap administrator api key, installed on first startup.
    #[serde(default = "default_admin_token")]
    pub admin_token: String,
    #[serde(default = "default_environment")]
    pub environment: String,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::default())
            .build()?
            .try_deserialize()
    }
}

fn default_database_url() -> String {
    "postgresql://postgres:postgres@db:5432/tochka".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_admin_token() -> String {
    "qyLFpbXdjCflyuWZ3TvXESo7jNOBNIy".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.port, 8000);
        assert!(config.database_url.ends_with("/tochka"));
        assert_eq!(config.environment, "development");
        assert!(!config.admin_token.is_empty());
    }

    #[test]
    fn explicit_values_win() {
        let config: AppConfig =
            serde_json::from_str(r#"{"port": 9000, "environment": "production"}"#).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.environment, "production");
    }
}
