use std::env;
use std::net::SocketAddr;

use anyhow::Context;

const DEFAULT_DATABASE_URL: &str = "sqlite://data/bookmarks.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_token: String,
    pub database_url: String,
    pub max_connections: u32,
    pub bind_addr: SocketAddr,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| match env::var(key) {
            Ok(value) => Ok(Some(value)),
            Err(env::VarError::NotPresent) => Ok(None),
            Err(env::VarError::NotUnicode(_)) => anyhow::bail!("{} is not valid unicode", key),
        })
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> anyhow::Result<Option<String>>,
    {
        let api_token = match lookup("API_TOKEN")? {
            Some(value) => {
                let token = value.trim();
                if token.is_empty() {
                    anyhow::bail!("API_TOKEN is set but empty");
                }
                token.to_string()
            }
            None => anyhow::bail!("API_TOKEN is required but not set"),
        };

        let database_url = lookup("DATABASE_URL")?
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS")? {
            Some(value) => value
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .with_context(|| format!("DATABASE_MAX_CONNECTIONS is invalid: {}", value))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let bind_addr = lookup("BIND_ADDR")?
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr
            .trim()
            .parse::<SocketAddr>()
            .with_context(|| format!("BIND_ADDR is invalid: {}", bind_addr))?;

        Ok(Self {
            api_token,
            database_url,
            max_connections,
            bind_addr,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| Ok(vars.get(key).cloned()))
    }

    #[test]
    fn defaults_apply_when_only_token_is_set() {
        let config = load(&[("API_TOKEN", "abc")]).unwrap();
        assert_eq!(config.api_token, "abc");
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR.parse().unwrap());
    }

    #[test]
    fn token_is_trimmed() {
        let config = load(&[("API_TOKEN", "  abc \n")]).unwrap();
        assert_eq!(config.api_token, "abc");
    }

    #[test]
    fn missing_or_blank_token_is_an_error() {
        assert!(load(&[]).is_err());
        assert!(load(&[("API_TOKEN", "   ")]).is_err());
    }

    #[test]
    fn overrides_are_parsed() {
        let config = load(&[
            ("API_TOKEN", "abc"),
            ("DATABASE_URL", "sqlite::memory:"),
            ("DATABASE_MAX_CONNECTIONS", "2"),
            ("BIND_ADDR", "127.0.0.1:9000"),
        ])
        .unwrap();
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.max_connections, 2);
        assert_eq!(config.bind_addr.port(), 9000);
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        assert!(load(&[("API_TOKEN", "abc"), ("DATABASE_MAX_CONNECTIONS", "lots")]).is_err());
        assert!(load(&[("API_TOKEN", "abc"), ("DATABASE_MAX_CONNECTIONS", "0")]).is_err());
        assert!(load(&[("API_TOKEN", "abc"), ("BIND_ADDR", "nowhere")]).is_err());
    }
}
