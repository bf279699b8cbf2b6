use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::rest::DEFAULT_TIMEOUT;

/// Configuración de conexión al nodo Lavalink
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NodeConfig {
    // Nodo
    pub host: String,
    pub port: u16,
    pub password: String,
    pub secure: bool,

    // Peticiones
    #[serde(with = "humantime_serde_compat")]
    pub request_timeout: Duration,

    // Sesión asignada por el nodo (la obtiene el cliente de websocket)
    pub session_id: Option<String>,
}

impl NodeConfig {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            host: std::env::var("LAVALINK_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("LAVALINK_PORT")
                .unwrap_or_else(|_| "2333".to_string())
                .parse()
                .context("LAVALINK_PORT inválido")?,
            password: std::env::var("LAVALINK_PASSWORD")
                .unwrap_or_else(|_| "youshallnotpass".to_string()),
            secure: std::env::var("LAVALINK_SECURE")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .context("LAVALINK_SECURE debe ser true o false")?,
            request_timeout: match std::env::var("LAVALINK_TIMEOUT") {
                Ok(val) if !val.trim().is_empty() => humantime::parse_duration(val.trim())
                    .context("LAVALINK_TIMEOUT inválido (ej: 10s, 500ms)")?,
                _ => DEFAULT_TIMEOUT,
            },
            session_id: std::env::var("LAVALINK_SESSION_ID")
                .ok()
                .filter(|s| !s.trim().is_empty()),
        };

        config.validate()?;

        Ok(config)
    }

    /// Validates configuration values for correctness.
    ///
    /// # Validation Rules
    ///
    /// - Host and password must not be empty
    /// - Port must not be 0
    /// - Request timeout must be greater than zero
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            anyhow::bail!("Lavalink host must not be empty");
        }

        if self.port == 0 {
            anyhow::bail!("Lavalink port must be greater than 0");
        }

        if self.password.is_empty() {
            anyhow::bail!("Lavalink password must not be empty");
        }

        if self.request_timeout.is_zero() {
            anyhow::bail!("Request timeout must be greater than 0");
        }

        Ok(())
    }

    /// URL base del nodo, sin prefijo de versión
    pub fn base_url(&self) -> Result<Url> {
        let scheme = if self.secure { "https" } else { "http" };
        Url::parse(&format!("{}://{}:{}/", scheme, self.host, self.port))
            .with_context(|| format!("URL de nodo inválida: {}:{}", self.host, self.port))
    }

    /// Returns a summary of the current configuration for logging.
    ///
    /// The password is never included.
    pub fn summary(&self) -> String {
        format!(
            "Config Summary:\n  \
            Node: {}:{} (tls={})\n  \
            Timeout: {}\n  \
            Session: {}",
            self.host,
            self.port,
            self.secure,
            humantime::format_duration(self.request_timeout),
            self.session_id.as_deref().unwrap_or("none"),
        )
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 2333,
            password: "youshallnotpass".to_string(),
            secure: false,
            request_timeout: DEFAULT_TIMEOUT,
            session_id: None,
        }
    }
}

/// Serializa duraciones en formato humantime ("10s")
mod humantime_serde_compat {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&humantime::format_duration(*duration))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}
