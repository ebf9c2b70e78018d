use clap::Parser;
use fuzzer_cli::args::Cli;
use fuzzer_cli::{config, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = config::resolve(cli)?;

    let _log_guard = logging::init(&config.log_level, config.log_to_file, &config.output_dir);

    fuzzer_cli::run(config).await
}
