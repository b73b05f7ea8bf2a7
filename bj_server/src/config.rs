//! Server configuration management.
//!
//! Consolidates the CLI flag and environment variable reads into one
//! validated configuration.

use anyhow::Context;
use pico_args::Arguments;
use std::net::SocketAddr;

/// Complete server configuration.
#[derive(Clone, Copy, Debug)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
}

impl ServerConfig {
    /// Resolve the bind address: `--bind` flag, then `SERVER_BIND`,
    /// then `PORT` (on all interfaces), then the default.
    pub fn load(pargs: &mut Arguments) -> anyhow::Result<Self> {
        let bind = match pargs.opt_value_from_str("--bind")? {
            Some(addr) => addr,
            None => {
                if let Ok(bind) = std::env::var("SERVER_BIND") {
                    bind.parse().context("invalid SERVER_BIND address")?
                } else if let Ok(port) = std::env::var("PORT") {
                    let port: u16 = port.parse().context("invalid PORT")?;
                    SocketAddr::from(([0, 0, 0, 0], port))
                } else {
                    SocketAddr::from(([127, 0, 0, 1], 3000))
                }
            }
        };
        Ok(Self { bind })
    }
}
