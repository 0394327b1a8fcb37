//! Application configuration loaded from environment variables.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Server Configuration ===
    /// HTTP listen port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// HTTP listen address.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: IpAddr,

    // === Frontend ===
    /// Directory served as static frontend assets.
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,

    /// Page the frontend server redirects `/` to.
    #[serde(default = "default_frontend_entry")]
    pub frontend_entry: String,

    // === Process ===
    /// Seconds between heartbeat log lines.
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_secs: u64,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,
}

fn default_port() -> u16 {
    3000
}

fn default_bind_addr() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_static_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_frontend_entry() -> String {
    "-Main_.html".to_string()
}

fn default_heartbeat_interval() -> u64 {
    600
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_addr: default_bind_addr(),
            static_dir: default_static_dir(),
            frontend_entry: default_frontend_entry(),
            heartbeat_interval_secs: default_heartbeat_interval(),
            rust_log: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.port == 0 {
            return Err("PORT must be non-zero".to_string());
        }

        if self.heartbeat_interval_secs == 0 {
            return Err("HEARTBEAT_INTERVAL_SECS must be at least 1".to_string());
        }

        if self.frontend_entry.trim().is_empty() {
            return Err("FRONTEND_ENTRY must not be empty".to_string());
        }

        Ok(())
    }

    /// Socket address to listen on.
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }

    /// Heartbeat period.
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }

    /// Redirect target for the frontend root, always absolute.
    pub fn frontend_entry_path(&self) -> String {
        let entry = self.frontend_entry.trim();
        if entry.starts_with('/') {
            entry.to_string()
        } else {
            format!("/{entry}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values_are_sensible() {
        let config = Config::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.listen_addr().to_string(), "0.0.0.0:3000");
        assert_eq!(config.heartbeat_interval(), Duration::from_secs(600));
        assert_eq!(config.frontend_entry_path(), "/-Main_.html");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn deserializes_from_env_pairs() {
        let vars = vec![
            ("PORT".to_string(), "8081".to_string()),
            ("BIND_ADDR".to_string(), "127.0.0.1".to_string()),
            ("STATIC_DIR".to_string(), "public".to_string()),
            ("HEARTBEAT_INTERVAL_SECS".to_string(), "5".to_string()),
        ];
        let config: Config = envy::from_iter(vars).unwrap();

        assert_eq!(config.listen_addr().to_string(), "127.0.0.1:8081");
        assert_eq!(config.static_dir, PathBuf::from("public"));
        assert_eq!(config.heartbeat_interval_secs, 5);
        assert_eq!(config.frontend_entry, "-Main_.html");
    }

    #[test]
    fn validate_rejects_zero_port() {
        let config = Config {
            port: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_heartbeat() {
        let config = Config {
            heartbeat_interval_secs: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_blank_entry_page() {
        let config = Config {
            frontend_entry: "  ".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn entry_path_keeps_leading_slash() {
        let config = Config {
            frontend_entry: "/index.html".to_string(),
            ..Config::default()
        };
        assert_eq!(config.frontend_entry_path(), "/index.html");
    }
}
