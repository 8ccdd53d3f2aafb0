use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};
use venv_launcher::cli::{run, Cli};

#[tokio::main]
async fn main() {
    // Initialize logging; stdout is reserved for the launch banners
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    // Parse CLI
    let cli = Cli::parse();

    let exit_code = run(cli).await;
    std::process::exit(exit_code);
}
