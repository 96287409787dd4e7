use clap::Parser;
use mocklab_server::config::DEFAULT_CONFIG_FILE;
use mocklab_server::{Config, ConfigOverrides, Mocklab};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mocklab")]
#[command(about = "Serve HTTP mock responses from a directory of fixture files")]
#[command(version)]
struct Args {
    /// Config file (JSON or YAML)
    #[arg(short, long, env = "MOCKLAB_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(flatten)]
    overrides: ConfigOverrides,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = Config::load(&args.config).with_overrides(&args.overrides);

    Mocklab::new(config)?.run().await
}
