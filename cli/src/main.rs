use clap::Parser;
use shell_filter_cli::Cli;
use shell_filter_cli::run_main;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_main(cli).await?;

    Ok(())
}
