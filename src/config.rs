use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use crate::http::parser::ParseLimits;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,

    /// Initial size of the per-connection parse buffer.
    pub buffer_size: usize,
    pub max_header_size: usize,

    #[serde(deserialize_with = "deserialize_duration")]
    pub read_timeout: Duration,

    #[serde(deserialize_with = "deserialize_duration")]
    pub write_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 42069,

            buffer_size: 8,
            max_header_size: 8192,

            read_timeout: Duration::from_secs(5),
            write_timeout: Duration::from_secs(30),
        }
    }
}

impl ServerConfig {
    pub fn from_file(path: &str) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("failed to read {path}: {err}, falling back to default config");
                return ServerConfig::default();
            }
        };

        Self::from_toml(&content).unwrap_or_else(|err| {
            tracing::warn!(
                "failed to deserialize config file {path}: {err}, falling back to default config"
            );
            ServerConfig::default()
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<ServerConfig>(content)
    }

    pub fn parse_limits(&self) -> ParseLimits {
        ParseLimits {
            initial_buffer_size: self.buffer_size,
            max_head_size: self.max_header_size,
        }
    }
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let secs = f64::deserialize(deserializer)?;
    Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = ServerConfig::from_toml("port = 8080\nread_timeout = 0.5\n").unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.read_timeout, Duration::from_millis(500));
        assert_eq!(config.buffer_size, 8);
        assert_eq!(config.write_timeout, Duration::from_secs(30));
    }

    #[test]
    fn negative_timeout_is_rejected() {
        assert!(ServerConfig::from_toml("write_timeout = -1.0").is_err());
    }

    #[test]
    fn missing_file_falls_back_to_default() {
        let config = ServerConfig::from_file("/nonexistent/rawhttp.toml");
        assert_eq!(config.port, 42069);
        assert_eq!(config.address, IpAddr::V4(Ipv4Addr::LOCALHOST));
    }

    #[test]
    fn limits_follow_config() {
        let config = ServerConfig::from_toml("buffer_size = 64\nmax_header_size = 1024").unwrap();
        let limits = config.parse_limits();
        assert_eq!(limits.initial_buffer_size, 64);
        assert_eq!(limits.max_head_size, 1024);
    }
}
