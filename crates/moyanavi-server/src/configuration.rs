use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use std::net::{AddrParseError, SocketAddr};

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
}

impl Settings {
    /// Read `MOYANAVI_SERVER__HOST` / `MOYANAVI_SERVER__PORT`, falling back to
    /// the defaults.
    pub fn new() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port())?
            .add_source(
                Environment::with_prefix("MOYANAVI")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clean_env() {
        env::remove_var("MOYANAVI_SERVER__HOST");
        env::remove_var("MOYANAVI_SERVER__PORT");
    }

    #[test]
    #[serial]
    fn test_default_settings() {
        clean_env();

        let settings = Settings::new().unwrap();
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.server.port, 3000);
        assert_eq!(
            settings.server.socket_addr().unwrap(),
            "127.0.0.1:3000".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    #[serial]
    fn test_server_settings_from_env() {
        clean_env();
        env::set_var("MOYANAVI_SERVER__HOST", "0.0.0.0");
        env::set_var("MOYANAVI_SERVER__PORT", "8080");

        let settings = Settings::new().unwrap();
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 8080);

        clean_env();
    }

    #[test]
    fn test_invalid_host() {
        let server = ServerSettings {
            host: "not a host".to_string(),
            port: 3000,
        };
        assert!(server.socket_addr().is_err());
    }
}
