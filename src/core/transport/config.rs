//! Transport configuration types.

use serde::{Deserialize, Serialize};

#[cfg(feature = "http")]
use crate::core::config::parse_flag;

/// Transport configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransportConfig {
    /// Standard input/output transport.
    #[cfg(feature = "stdio")]
    Stdio,

    /// HTTP transport serving the SSE (`/sse`) and direct (`/mcp`) channels.
    #[cfg(feature = "http")]
    Http(HttpConfig),
}

/// HTTP transport configuration.
#[cfg(feature = "http")]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Port number to listen on.
    pub port: u16,

    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Enable CORS for browser clients.
    #[serde(default = "default_cors")]
    pub enable_cors: bool,

    /// Interval between keep-alive comments on open SSE streams.
    #[serde(default = "default_sse_keep_alive_secs")]
    pub sse_keep_alive_secs: u64,
}

#[cfg(feature = "http")]
fn default_host() -> String {
    "127.0.0.1".to_string()
}

#[cfg(feature = "http")]
fn default_port() -> u16 {
    8787
}

#[cfg(feature = "http")]
fn default_cors() -> bool {
    true
}

#[cfg(feature = "http")]
fn default_sse_keep_alive_secs() -> u64 {
    15
}

impl Default for TransportConfig {
    fn default() -> Self {
        #[cfg(feature = "http")]
        {
            return Self::Http(HttpConfig::default());
        }

        #[cfg(all(not(feature = "http"), feature = "stdio"))]
        {
            return Self::Stdio;
        }

        #[cfg(not(any(feature = "stdio", feature = "http")))]
        {
            compile_error!("At least one transport feature must be enabled: stdio or http");
        }
    }
}

#[cfg(feature = "http")]
impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            enable_cors: default_cors(),
            sse_keep_alive_secs: default_sse_keep_alive_secs(),
        }
    }
}

#[cfg(feature = "http")]
impl HttpConfig {
    /// Get the bind address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl TransportConfig {
    /// Create an HTTP transport config.
    #[cfg(feature = "http")]
    pub fn http(port: u16, host: impl Into<String>) -> Self {
        Self::Http(HttpConfig {
            port,
            host: host.into(),
            ..Default::default()
        })
    }

    /// Load transport config from environment variables.
    pub fn from_env() -> Self {
        let transport = std::env::var("MCP_TRANSPORT")
            .unwrap_or_default()
            .to_lowercase();

        match transport.as_str() {
            #[cfg(feature = "stdio")]
            "stdio" => Self::Stdio,
            #[cfg(feature = "http")]
            "http" | "" => Self::Http(HttpConfig::from_env()),
            _ => Self::default(),
        }
    }

    /// Check transport settings the server cannot start with.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            #[cfg(feature = "stdio")]
            Self::Stdio => Ok(()),
            #[cfg(feature = "http")]
            Self::Http(cfg) if cfg.sse_keep_alive_secs == 0 => {
                Err("SSE keep-alive interval must be at least one second".to_string())
            }
            #[cfg(feature = "http")]
            Self::Http(_) => Ok(()),
        }
    }

    /// Get a description of this transport for logging.
    pub fn description(&self) -> String {
        match self {
            #[cfg(feature = "stdio")]
            Self::Stdio => "STDIO (standard MCP mode)".to_string(),
            #[cfg(feature = "http")]
            Self::Http(cfg) => format!("HTTP on {} (/sse, /mcp)", cfg.address()),
        }
    }
}

#[cfg(feature = "http")]
impl HttpConfig {
    /// Load HTTP settings from `MCP_HTTP_*` and `MCP_SSE_*` variables.
    pub fn from_env() -> Self {
        let port = std::env::var("MCP_HTTP_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or_else(default_port);
        let host = std::env::var("MCP_HTTP_HOST").unwrap_or_else(|_| default_host());
        let enable_cors = std::env::var("MCP_HTTP_CORS")
            .map(|v| parse_flag(&v, true))
            .unwrap_or_else(|_| default_cors());
        let sse_keep_alive_secs = std::env::var("MCP_SSE_KEEP_ALIVE_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_sse_keep_alive_secs);

        Self {
            port,
            host,
            enable_cors,
            sse_keep_alive_secs,
        }
    }
}
