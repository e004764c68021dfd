//! Server configuration loaded from environment variables

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Default port, matches what the front-end expects out of the box
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_MAX_TEXT_CHARS: usize = 2000;
pub const DEFAULT_MAX_NAME_CHARS: usize = 64;

/// Upper bounds applied to client-supplied payload fields.
///
/// A bound of 0 disables the check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadLimits {
    pub max_text_chars: usize,
    pub max_name_chars: usize,
}

impl Default for PayloadLimits {
    fn default() -> Self {
        Self {
            max_text_chars: DEFAULT_MAX_TEXT_CHARS,
            max_name_chars: DEFAULT_MAX_NAME_CHARS,
        }
    }
}

impl PayloadLimits {
    /// No bounds at all
    pub fn unbounded() -> Self {
        Self {
            max_text_chars: 0,
            max_name_chars: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub limits: PayloadLimits,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            limits: PayloadLimits::default(),
        }
    }
}

impl ServerConfig {
    /// Load config from environment variables
    ///
    /// HOST, PORT, MAX_TEXT_CHARS and MAX_NAME_CHARS are all optional.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let host = parse_env("HOST").unwrap_or(defaults.host);
        let port = parse_env("PORT").unwrap_or(defaults.port);
        let max_text_chars =
            parse_env("MAX_TEXT_CHARS").unwrap_or(defaults.limits.max_text_chars);
        let max_name_chars =
            parse_env("MAX_NAME_CHARS").unwrap_or(defaults.limits.max_name_chars);

        tracing::info!(
            %host,
            port,
            max_text_chars,
            max_name_chars,
            "Server config loaded"
        );

        Self {
            host,
            port,
            limits: PayloadLimits {
                max_text_chars,
                max_name_chars,
            },
        }
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Read and parse an env var, warning (and returning None) on garbage
fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = raw, "Ignoring unparseable config value");
            None
        }
    }
}
