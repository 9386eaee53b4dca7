//! Server configuration from environment variables
//!
//! | Variable       | Default   |
//! |----------------|-----------|
//! | `CONTENT_ROOT` | `.`       |
//! | `STATIC_DIR`   | `static`  |
//! | `HOST`         | `0.0.0.0` |
//! | `PORT`         | `3000`    |

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Directory that content paths resolve against
    pub content_root: PathBuf,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    pub host: IpAddr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            content_root: PathBuf::from("."),
            static_dir: PathBuf::from("static"),
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 3000,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unparsable values keep their default
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let content_root = lookup("CONTENT_ROOT")
            .map(PathBuf::from)
            .unwrap_or(defaults.content_root);

        let static_dir = lookup("STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.static_dir);

        let host = parse_or_default("HOST", lookup("HOST"), defaults.host);
        let port = parse_or_default("PORT", lookup("PORT"), defaults.port);

        Self {
            content_root,
            static_dir,
            host,
            port,
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_or_default<T>(key: &str, raw: Option<String>, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display,
{
    match raw {
        None => default,
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid {}={:?}, using {}", key, value, default);
            default
        }),
    }
}
