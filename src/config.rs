use std::net::SocketAddr;

use url::Url;

use crate::error::ConfigError;

const DEFAULT_LOG_LEVEL: &str = "info";

/// Public address Telegram pushes updates to, and the local address to bind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Webhook {
    pub url: Url,
    pub address: SocketAddr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bot_token: String,
    pub database_url: String,
    pub log_level: String,
    /// Long polling is used when absent.
    pub webhook: Option<Webhook>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let bot_token = read("TELOXIDE_TOKEN")
            .or_else(|| read("TOKEN"))
            .ok_or(ConfigError::Missing("TELOXIDE_TOKEN"))?;

        let database_url = match read("DATABASE_URL") {
            Some(url) => url,
            None => database_url_from_parts(&read)?,
        };

        let log_level = read("LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_owned());

        let webhook = match (read("NGROK_URL"), read("NGROK_ADDR")) {
            (Some(url), Some(address)) => Some(Webhook {
                url: url.parse().map_err(|e: url::ParseError| ConfigError::Invalid {
                    name: "NGROK_URL",
                    reason: e.to_string(),
                })?,
                address: address.parse().map_err(|e: std::net::AddrParseError| {
                    ConfigError::Invalid {
                        name: "NGROK_ADDR",
                        reason: e.to_string(),
                    }
                })?,
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing("NGROK_ADDR")),
            (None, Some(_)) => return Err(ConfigError::Missing("NGROK_URL")),
        };

        Ok(Self {
            bot_token,
            database_url,
            log_level,
            webhook,
        })
    }
}

/// Userinfo is percent-encoded by `Url`, so credentials may hold `/`, `#` or `@`.
fn database_url_from_parts(read: &impl Fn(&str) -> Option<String>) -> Result<String, ConfigError> {
    if read("DB_HOST").is_none() {
        return Err(ConfigError::Missing("DATABASE_URL"));
    }
    let part = |name: &'static str| read(name).ok_or(ConfigError::Missing(name));
    let invalid = |name: &'static str, reason: String| ConfigError::Invalid { name, reason };

    let port: u16 = part("DB_PORT")?
        .trim()
        .parse()
        .map_err(|e: std::num::ParseIntError| invalid("DB_PORT", e.to_string()))?;

    let mut url = Url::parse("postgres://localhost")
        .map_err(|e| invalid("DB_HOST", e.to_string()))?;
    url.set_host(Some(part("DB_HOST")?.as_str()))
        .map_err(|e| invalid("DB_HOST", e.to_string()))?;
    url.set_port(Some(port))
        .map_err(|()| invalid("DB_PORT", "not accepted in a URL".to_owned()))?;
    url.set_username(&part("DB_USER")?)
        .map_err(|()| invalid("DB_USER", "not accepted in a URL".to_owned()))?;
    url.set_password(Some(part("DB_PASSWORD")?.as_str()))
        .map_err(|()| invalid("DB_PASSWORD", "not accepted in a URL".to_owned()))?;
    url.set_path(&format!("/{}", part("DB_NAME")?.trim_start_matches('/')));

    Ok(url.into())
}
