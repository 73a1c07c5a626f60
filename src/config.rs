use clap::Parser;
use envconfig::Envconfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{LoggerError, Result};

#[derive(Debug, Envconfig, Clone)]
pub struct Config {
    /// Server bind address
    #[envconfig(from = "BIND_ADDR", default = "0.0.0.0:8080")]
    pub bind_addr: SocketAddr,

    /// Directory served at the root path
    #[envconfig(from = "STATIC_DIR", default = "ui/dist")]
    pub static_dir: PathBuf,

    /// Seconds between periodic request counter ticks
    #[envconfig(from = "COUNTER_TICK_SECS", default = "300")]
    pub counter_tick_secs: u64,

    /// Log level for this crate when RUST_LOG is unset
    #[envconfig(from = "LOG_LEVEL", default = "info")]
    pub log_level: String,
}

/// Command line overrides for the environment configuration.
#[derive(Debug, Default, Parser)]
#[command(name = "request-logger", version, about = "In-memory request logging service")]
pub struct Cli {
    /// Address to listen on, overrides BIND_ADDR
    #[arg(long)]
    pub bind: Option<SocketAddr>,

    /// Static asset directory, overrides STATIC_DIR
    #[arg(long)]
    pub static_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            static_dir: PathBuf::from("ui/dist"),
            counter_tick_secs: 300,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let config = Config::init_from_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_overrides(mut self, cli: Cli) -> Self {
        if let Some(bind) = cli.bind {
            self.bind_addr = bind;
        }
        if let Some(static_dir) = cli.static_dir {
            self.static_dir = static_dir;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.counter_tick_secs == 0 {
            return Err(LoggerError::Config(
                "COUNTER_TICK_SECS must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.counter_tick_secs)
    }
}
