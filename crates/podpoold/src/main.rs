//! podpoold — the podpool daemon.
//!
//! Single binary that assembles the scaler:
//! - Scaler configuration (flags, env, optional TOML file)
//! - Docker runtime connection (degraded mode if unreachable)
//! - Startup top-up to the configured minimum
//! - REST API
//!
//! # Usage
//!
//! ```text
//! CONTAINER_IMAGE=nginx:alpine MAX_CONTAINERS=5 podpoold --port 5027
//! ```

mod daemon;

use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use podpool_core::ScalerConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "podpoold", about = "podpool daemon — HTTP-controlled container scaler")]
struct Cli {
    /// TOML file with scaler settings. Flags and env vars take precedence.
    #[arg(long, env = "PODPOOL_CONFIG")]
    config: Option<PathBuf>,

    /// Image every managed container is launched from.
    #[arg(long, env = "CONTAINER_IMAGE")]
    image: Option<String>,

    /// Name prefix identifying managed containers.
    #[arg(long, env = "CONTAINER_PREFIX")]
    prefix: Option<String>,

    /// Lower bound on running containers.
    #[arg(long, env = "MIN_CONTAINERS")]
    min_containers: Option<u32>,

    /// Upper bound on running containers.
    #[arg(long, env = "MAX_CONTAINERS")]
    max_containers: Option<u32>,

    /// Grace period in seconds before a stopping container is killed.
    #[arg(long, env = "STOP_TIMEOUT_SECS")]
    stop_timeout_secs: Option<u64>,

    /// Address to listen on.
    #[arg(long, env = "PODPOOL_HOST", default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port to listen on.
    #[arg(long, env = "PODPOOL_PORT", default_value = "5027")]
    port: u16,

    /// Log output format.
    #[arg(long, value_enum, default_value = "text")]
    log_format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

impl Cli {
    /// Defaults, then the config file, then flag/env overrides.
    fn scaler_config(&self) -> anyhow::Result<ScalerConfig> {
        let mut config = match &self.config {
            Some(path) => ScalerConfig::from_file(path)?,
            None => ScalerConfig::default(),
        };

        if let Some(image) = &self.image {
            config.image = image.clone();
        }
        if let Some(prefix) = &self.prefix {
            config.prefix = prefix.clone();
        }
        if let Some(min) = self.min_containers {
            config.min_containers = min;
        }
        if let Some(max) = self.max_containers {
            config.max_containers = max;
        }
        if let Some(secs) = self.stop_timeout_secs {
            config.stop_timeout_secs = secs;
        }

        config.validate()?;
        Ok(config)
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info,podpoold=debug,podpool_scaler=debug,podpool_runtime=debug")
    });

    match format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let config = cli.scaler_config()?;
    daemon::run(config, cli.host, cli.port).await
}
