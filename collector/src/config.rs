//! Collector configuration loaded from environment variables.

use anyhow::{bail, Context};
use std::net::SocketAddr;

/// Default bind host.
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Default OTLP gRPC port.
pub const DEFAULT_PORT: u16 = 4317;
/// Default maximum decoded message size in bytes (4 MiB).
pub const DEFAULT_MAX_MESSAGE_LENGTH: usize = 4 * 1024 * 1024;
/// Default span buffer capacity.
pub const DEFAULT_BUFFER_MAX_SIZE: usize = 10_000;

/// Runtime configuration for the collector.
#[derive(Debug, Clone)]
pub struct Config {
    /// Host address to bind the gRPC server to.
    pub host: String,
    /// Port to bind the gRPC server to.
    pub port: u16,
    /// Maximum decoded gRPC message size in bytes.
    pub max_message_length: usize,
    /// Maximum number of spans the ingest buffer holds.
    pub buffer_max_size: usize,
    /// Whether gRPC reflection was requested.
    pub enable_reflection: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_message_length: DEFAULT_MAX_MESSAGE_LENGTH,
            buffer_max_size: DEFAULT_BUFFER_MAX_SIZE,
            enable_reflection: false,
        }
    }
}

impl Config {
    /// Loads the configuration from `OTLP_*` environment variables,
    /// falling back to defaults for unset variables.
    ///
    /// # Errors
    ///
    /// Fails fast when a variable is set but unparseable, or when a
    /// parsed value is out of range (port 0, zero-sized limits).
    pub fn from_env() -> anyhow::Result<Self> {
        let host = std::env::var("OTLP_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());

        let port = match std::env::var("OTLP_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("invalid OTLP_PORT: {raw}"))?,
            Err(_) => DEFAULT_PORT,
        };
        if port == 0 {
            bail!("OTLP_PORT must be between 1 and 65535");
        }

        let max_message_length = match std::env::var("OTLP_MAX_MESSAGE_LENGTH") {
            Ok(raw) => raw
                .parse::<usize>()
                .with_context(|| format!("invalid OTLP_MAX_MESSAGE_LENGTH: {raw}"))?,
            Err(_) => DEFAULT_MAX_MESSAGE_LENGTH,
        };
        if max_message_length == 0 {
            bail!("OTLP_MAX_MESSAGE_LENGTH must be positive");
        }

        let buffer_max_size = match std::env::var("OTLP_BUFFER_MAX_SIZE") {
            Ok(raw) => raw
                .parse::<usize>()
                .with_context(|| format!("invalid OTLP_BUFFER_MAX_SIZE: {raw}"))?,
            Err(_) => DEFAULT_BUFFER_MAX_SIZE,
        };
        if buffer_max_size == 0 {
            bail!("OTLP_BUFFER_MAX_SIZE must be positive");
        }

        let enable_reflection = std::env::var("OTLP_ENABLE_REFLECTION")
            .map(|raw| {
                matches!(
                    raw.to_ascii_lowercase().as_str(),
                    "1" | "true" | "yes" | "on"
                )
            })
            .unwrap_or(false);

        Ok(Self {
            host,
            port,
            max_message_length,
            buffer_max_size,
            enable_reflection,
        })
    }

    /// The socket address to bind the server to.
    ///
    /// # Errors
    ///
    /// Fails when the host/port pair does not form a valid address.
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }
}
