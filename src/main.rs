use std::path::PathBuf;

use clap::Parser;
use longan::config::AppConfig;
use longan::{logging, server};

#[derive(Parser, Debug)]
#[command(name = "longan", about = "Turn prose into a PPTX deck that keeps your template's design")]
struct Cli {
    /// Address to bind, overrides LONGAN_HOST.
    #[arg(long)]
    host: Option<String>,

    /// Port to bind, overrides LONGAN_PORT.
    #[arg(long)]
    port: Option<u16>,

    /// Directory served under /static, overrides LONGAN_STATIC_DIR.
    #[arg(long)]
    static_dir: Option<PathBuf>,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::from_env()?;
    if let Some(host) = cli.host {
        config.server_host = host;
    }
    if let Some(port) = cli.port {
        config.server_port = port;
    }
    if let Some(static_dir) = cli.static_dir {
        config.static_dir = static_dir;
    }
    config.validate()?;

    logging::init(&config.log_level);
    tracing::info!(
        host = %config.server_host,
        port = config.server_port,
        static_dir = %config.static_dir.display(),
        "longan starting"
    );

    server::run(config).await?;
    Ok(())
}
