use clap::Parser;

mod cli;
mod commands;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();
    let cli = cli::Cli::parse();
    commands::run_command(cli).await
}
