use std::path::PathBuf;

use clap::Parser;
use secure_headers::lifecycle::startup::{start, StartupOptions};

#[derive(Parser)]
#[command(name = "secure-headers")]
#[command(about = "HTTP server that adds default security headers without overriding handler-set ones", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Reload the security header policy when the configuration file changes.
    #[arg(short, long, requires = "config")]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    start(StartupOptions {
        config_path: cli.config,
        watch: cli.watch,
    })
    .await?;

    Ok(())
}
