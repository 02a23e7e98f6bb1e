use serde::Deserialize;
use std::fs;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub api: Api,
    #[serde(default)]
    pub credentials: Credentials,
    #[serde(default)]
    pub general: General,
    #[serde(default)]
    pub paging: Paging,
}

#[derive(Debug, Deserialize)]
pub struct Api {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct General {
    pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Paging {
    #[serde(default = "default_products_limit")]
    pub products_limit: u32,
    #[serde(default = "default_offers_limit")]
    pub offers_limit: u32,
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_products_limit() -> u32 {
    4
}

fn default_offers_limit() -> u32 {
    10
}

impl Default for General {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl Default for Paging {
    fn default() -> Self {
        Self {
            products_limit: default_products_limit(),
            offers_limit: default_offers_limit(),
        }
    }
}

impl Config {
    /// Read a TOML config, then apply `AGENT_*` environment overrides.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn parse(contents: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(contents)?;
        Ok(config)
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("AGENT_API_URL") {
            self.api.base_url = url;
        }
        if let Some(phone) = var("AGENT_PHONE") {
            self.credentials.phone = phone;
        }
        if let Some(password) = var("AGENT_PASSWORD") {
            self.credentials.password = password;
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::parse(
            r#"
            [api]
            base_url = "https://api.example.org/agent"
            "#,
        )
        .unwrap();

        assert_eq!(config.timeout(), Duration::from_secs(15));
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.paging.products_limit, 4);
        assert_eq!(config.paging.offers_limit, 10);
        assert!(config.credentials.phone.is_empty());
    }

    #[test]
    fn test_full_file() {
        let config = Config::parse(
            r#"
            [api]
            base_url = "https://api.example.org/agent"
            timeout_secs = 5

            [credentials]
            phone = "+998901234567"
            password = "secret"

            [general]
            log_level = "debug"

            [paging]
            products_limit = 8
            "#,
        )
        .unwrap();

        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(config.credentials.password, "secret");
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.paging.products_limit, 8);
        assert_eq!(config.paging.offers_limit, 10);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::parse(
            r#"
            [api]
            base_url = "https://a.example.org"

            [credentials]
            phone = "1"
            "#,
        )
        .unwrap();

        config.apply_env(|key| match key {
            "AGENT_PHONE" => Some("2".to_string()),
            "AGENT_API_URL" => Some("https://b.example.org".to_string()),
            _ => None,
        });

        assert_eq!(config.credentials.phone, "2");
        assert_eq!(config.api.base_url, "https://b.example.org");
        assert!(config.credentials.password.is_empty());
    }

    #[test]
    fn test_missing_api_section_fails() {
        assert!(Config::parse("[general]\nlog_level = \"warn\"").is_err());
    }
}
