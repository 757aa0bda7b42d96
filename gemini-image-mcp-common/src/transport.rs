//! MCP transport selection.
//!
//! The image server speaks MCP over one of two transports:
//!
//! - **Stdio**: default; the host launches the server as a subprocess
//! - **HTTP**: streamable HTTP for hosts that connect over the network
//!
//! # Example
//!
//! ```ignore
//! use gemini_image_mcp_common::transport::TransportArgs;
//! use clap::Parser;
//!
//! #[derive(Parser)]
//! struct Args {
//!     #[command(flatten)]
//!     transport: TransportArgs,
//! }
//!
//! let transport = Args::parse().transport.into_transport();
//! ```

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use clap::{Args, ValueEnum};

/// Default mount path of the streamable HTTP service.
pub const DEFAULT_HTTP_PATH: &str = "/mcp";

/// Transport used to serve MCP requests.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Transport {
    /// Standard input/output.
    #[default]
    Stdio,
    /// Streamable HTTP on `addr`, mounted at `path`.
    Http {
        /// Socket address to bind
        addr: SocketAddr,
        /// Route the MCP service is nested under
        path: String,
    },
}

impl Transport {
    /// Create a stdio transport.
    pub fn stdio() -> Self {
        Transport::Stdio
    }

    /// Create an HTTP transport on the loopback interface.
    pub fn http(port: u16) -> Self {
        Transport::Http {
            addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port),
            path: DEFAULT_HTTP_PATH.to_string(),
        }
    }

    /// Check if this is a stdio transport.
    pub fn is_stdio(&self) -> bool {
        matches!(self, Transport::Stdio)
    }

    /// Check if this is an HTTP transport.
    pub fn is_http(&self) -> bool {
        matches!(self, Transport::Http { .. })
    }

    /// Get the port if this is a network transport.
    pub fn port(&self) -> Option<u16> {
        match self {
            Transport::Stdio => None,
            Transport::Http { addr, .. } => Some(addr.port()),
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Stdio => write!(f, "stdio"),
            Transport::Http { addr, path } => write!(f, "http ({}{})", addr, path),
        }
    }
}

/// Transport mode selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TransportMode {
    /// Standard input/output
    #[default]
    Stdio,
    /// Streamable HTTP
    Http,
}

/// Command-line arguments for transport configuration.
#[derive(Args, Debug, Clone)]
pub struct TransportArgs {
    /// Transport mode
    #[arg(long, value_enum, default_value_t = TransportMode::Stdio)]
    pub transport: TransportMode,

    /// Interface to bind in HTTP mode
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub host: IpAddr,

    /// Port to bind in HTTP mode
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Route the MCP service is mounted under in HTTP mode
    #[arg(long, default_value = DEFAULT_HTTP_PATH)]
    pub path: String,
}

impl TransportArgs {
    /// Convert command-line arguments into a Transport.
    pub fn into_transport(self) -> Transport {
        match self.transport {
            TransportMode::Stdio => Transport::Stdio,
            TransportMode::Http => Transport::Http {
                addr: SocketAddr::new(self.host, self.port),
                path: normalize_path(&self.path),
            },
        }
    }
}

impl Default for TransportArgs {
    fn default() -> Self {
        Self {
            transport: TransportMode::Stdio,
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8080,
            path: DEFAULT_HTTP_PATH.to_string(),
        }
    }
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        DEFAULT_HTTP_PATH.to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}
