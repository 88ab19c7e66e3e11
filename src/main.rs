use std::net::SocketAddr;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::Parser;
use secrets_courier::config::CourierConfig;
use secrets_courier::{telemetry, RuntimeConfig};

#[derive(Parser)]
struct CourierArgs {
    /// Path to the JSON config file holding the access policy
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override bind address
    #[arg(long)]
    bind: Option<String>,
    /// Verbose startup output
    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    if let Err(err) = real_main().await {
        eprintln!("courier exited with error: {err:#}");
        process::exit(1);
    }
}

async fn real_main() -> anyhow::Result<()> {
    telemetry::init()?;
    let args = CourierArgs::parse();
    let config = CourierConfig::load(args.config.as_deref())?;
    if args.verbose {
        println!(
            "config loaded (bind={}, secrets={}, delivery_timeout={}s)",
            config.bind,
            config.secrets.len(),
            config.delivery_timeout_secs
        );
    }

    let runtime = runtime_config(&config, &args);
    secrets_courier::run(runtime).await
}

fn runtime_config(config: &CourierConfig, args: &CourierArgs) -> RuntimeConfig {
    let bind = args
        .bind
        .clone()
        .or_else(|| std::env::var("COURIER__BIND_ADDRESS").ok())
        .unwrap_or_else(|| config.bind.clone());
    let http_addr = bind
        .parse()
        .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], 7000)));

    RuntimeConfig {
        http_addr,
        delivery_timeout: Duration::from_secs(config.delivery_timeout_secs),
        policy: config.access_policy(),
    }
}
