//! Definitions of CLI arguments and commands for the deploy scripts

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{
    commands::{migrate, show_plan},
    config::{DeployConfig, PkPolicy},
    constants::{
        DEFAULT_ARTIFACTS_DIR, DEFAULT_DEPLOYMENTS_PATH, INFURA_ENV_VAR, MNEMONIC_ENV_VAR,
        PK_ENV_VAR, RINKEBY_NETWORK,
    },
    errors::ScriptError,
};

/// Deploy two fixed supply tokens and the crowdsale that sells them
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Deployment configuration
    #[command(flatten)]
    pub config: ConfigArgs,

    /// The command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Arguments validated into a [`DeployConfig`]
#[derive(Args, Clone, Debug)]
pub struct ConfigArgs {
    /// Name of the network to deploy to
    #[arg(short, long, default_value = RINKEBY_NETWORK)]
    pub network: String,

    /// Mnemonic of the deployer's wallet
    #[arg(long, env = MNEMONIC_ENV_VAR, hide_env_values = true)]
    pub mnemonic: Option<String>,

    /// Infura access key, appended to the network endpoint
    #[arg(long, env = INFURA_ENV_VAR, hide_env_values = true)]
    pub infura: Option<String>,

    /// Address of the crowdsale beneficiary
    #[arg(long, env = PK_ENV_VAR)]
    pub pk: Option<String>,

    /// What to do when no beneficiary is given
    #[arg(long, value_enum, default_value_t = PkPolicy::AllowEmpty)]
    pub pk_policy: PkPolicy,

    /// Index of the deployer account derived from the mnemonic
    #[arg(long, default_value_t = 0)]
    pub account_index: u32,

    /// RPC URL to use instead of the network's endpoint, e.g. a local node
    #[arg(short, long)]
    pub rpc_url: Option<String>,

    /// Directory containing the compiled contract artifacts
    #[arg(long, default_value = DEFAULT_ARTIFACTS_DIR)]
    pub artifacts_dir: PathBuf,

    /// File in which to record deployed addresses
    #[arg(short, long, default_value = DEFAULT_DEPLOYMENTS_PATH)]
    pub deployments_path: PathBuf,
}

/// The deploy script commands
#[derive(Subcommand)]
pub enum Command {
    /// Deploy both tokens and then the crowdsale
    Migrate,
    /// Print the deployment plan without connecting to the network
    Plan,
}

impl Command {
    /// Run the command against a validated configuration
    pub async fn run(self, config: DeployConfig) -> Result<(), ScriptError> {
        match self {
            Command::Migrate => migrate(config).await.map(|_| ()),
            Command::Plan => show_plan(&config),
        }
    }
}
