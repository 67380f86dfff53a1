use clap::Parser;
use scripts::{cli::Cli, config::DeployConfig, errors::ScriptError};

#[tokio::main]
async fn main() -> Result<(), ScriptError> {
    let Cli { config, command } = Cli::parse();

    tracing_subscriber::fmt().pretty().init();

    let config = DeployConfig::load(&config)?;

    command.run(config).await
}
