use crate::validation::{valid_host, valid_port};
use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use serde_valid::Validate;
use std::{fmt, str::FromStr};

pub const DEFAULT_PROXY_HOST: &str = "localhost";
pub const DEFAULT_PROXY_PORT: u16 = 9050;

/// Policy for connecting to servers through onion addresses
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum OnionHosts {
    #[default]
    Never,
    Prefer,
    Required,
}

/// Transport isolation: one connection per user profile or one per contact/group
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionMode {
    #[default]
    User,
    Entity,
}

/// SOCKS proxy address
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProxyAddress {
    #[validate(min_length = 1)]
    #[validate(max_length = 253)]
    pub host: String,
    pub port: u16,
}

impl ProxyAddress {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Build an address from the raw form texts, rejecting anything the
    /// validators would reject.
    pub fn from_texts(host: &str, port: &str) -> Result<Self> {
        ensure!(valid_host(host), "failed to parse proxy host: {host:?}");
        ensure!(valid_port(port), "failed to parse proxy port: {port:?}");

        let port = port
            .parse::<u16>()
            .context("failed to parse proxy port")?;

        Ok(Self::new(host, port))
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl Default for ProxyAddress {
    fn default() -> Self {
        Self::new(DEFAULT_PROXY_HOST, DEFAULT_PROXY_PORT)
    }
}

impl fmt::Display for ProxyAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl FromStr for ProxyAddress {
    type Err = anyhow::Error;

    /// Parse `host:port`. A missing or empty half falls back to the default
    /// host or port.
    fn from_str(s: &str) -> Result<Self> {
        let (host, port) = match s.rsplit_once(':') {
            Some((host, port)) => (host, port),
            None => (s, ""),
        };

        let host = if host.is_empty() {
            DEFAULT_PROXY_HOST
        } else {
            host
        };
        let port = if port.is_empty() {
            DEFAULT_PROXY_PORT.to_string()
        } else {
            port.to_string()
        };

        Self::from_texts(host, &port)
    }
}

/// Advanced transport settings sent along with every configuration change
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TransportTimeouts {
    /// microseconds
    #[validate(minimum = 1_000_000)]
    #[validate(maximum = 600_000_000)]
    pub tcp_connect_timeout: u64,
    /// microseconds
    #[validate(minimum = 1_000_000)]
    #[validate(maximum = 600_000_000)]
    pub tcp_timeout: u64,
    /// microseconds
    #[validate(minimum = 10_000_000)]
    #[validate(maximum = 86_400_000_000)]
    pub ping_interval: u64,
    #[validate(minimum = 1)]
    #[validate(maximum = 100)]
    pub ping_count: u32,
    pub log_tls_errors: bool,
}

impl Default for TransportTimeouts {
    fn default() -> Self {
        Self {
            tcp_connect_timeout: 10_000_000,
            tcp_timeout: 7_000_000,
            ping_interval: 1_200_000_000,
            ping_count: 3,
            log_tls_errors: false,
        }
    }
}

/// Committed network configuration
///
/// Values of this type are only ever replaced as a whole. Every edit produces
/// a new candidate through one of the `with_*` builders.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    pub use_socks_proxy: bool,
    #[validate]
    pub proxy: ProxyAddress,
    pub onion_hosts: OnionHosts,
    pub session_mode: SessionMode,
    #[validate]
    #[serde(default)]
    pub timeouts: TransportTimeouts,
}

impl NetworkConfig {
    /// Direct connections, no onion hosts.
    pub fn defaults() -> Self {
        Self {
            use_socks_proxy: false,
            proxy: ProxyAddress::default(),
            onion_hosts: OnionHosts::Never,
            session_mode: SessionMode::default(),
            timeouts: TransportTimeouts::default(),
        }
    }

    /// SOCKS proxy on `localhost:9050`, onion hosts preferred.
    pub fn proxy_defaults() -> Self {
        Self {
            use_socks_proxy: true,
            onion_hosts: OnionHosts::Prefer,
            ..Self::defaults()
        }
    }

    /// Switch the proxy on or off using the proxy fields of the matching
    /// preset. Session mode and timeouts are kept.
    pub fn with_socks_proxy(&self, enable: bool) -> Self {
        let preset = if enable {
            Self::proxy_defaults()
        } else {
            Self::defaults()
        };

        Self {
            use_socks_proxy: preset.use_socks_proxy,
            proxy: preset.proxy,
            onion_hosts: preset.onion_hosts,
            ..self.clone()
        }
    }

    pub fn with_proxy(&self, proxy: ProxyAddress) -> Self {
        Self {
            proxy,
            ..self.clone()
        }
    }

    pub fn with_onion_hosts(&self, onion_hosts: OnionHosts) -> Self {
        Self {
            onion_hosts,
            ..self.clone()
        }
    }

    pub fn with_session_mode(&self, session_mode: SessionMode) -> Self {
        Self {
            session_mode,
            ..self.clone()
        }
    }

    pub fn with_timeouts(&self, timeouts: TransportTimeouts) -> Self {
        Self {
            timeouts,
            ..self.clone()
        }
    }

    /// Check the invariants that must hold before a config is sent anywhere.
    pub fn check(&self) -> Result<()> {
        self.validate().context("validation failed")?;

        ensure!(
            valid_host(&self.proxy.host),
            "failed to validate proxy host: {:?}",
            self.proxy.host
        );

        Ok(())
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::defaults()
    }
}
