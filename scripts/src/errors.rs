//! Definitions of errors that can occur during the execution of the deploy scripts

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

/// Errors that can occur during the execution of the deploy scripts
#[derive(Debug)]
pub enum ScriptError {
    /// A required secret or variable was not provided
    MissingEnv(String),
    /// A configuration value could not be parsed
    InvalidConfig(String),
    /// Error initializing the signer or RPC client
    ClientInitialization(String),
    /// The connected node is not on the network the profile targets
    NetworkMismatch {
        /// The network ID the profile expects
        expected: u64,
        /// The chain ID reported by the node
        actual: u64,
    },
    /// The deployer cannot pay for the deployment
    InsufficientFunds(String),
    /// Error reading or parsing a compiled contract artifact
    ArtifactParsing(String),
    /// Error encoding constructor arguments for a contract
    CalldataConstruction(String),
    /// The deployment plan is not causally ordered
    InvalidPlan(String),
    /// Error deploying a contract
    ContractDeployment(String),
    /// Error reading the deployments file
    ReadDeployments(String),
    /// Error writing the deployments file
    WriteDeployments(String),
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::MissingEnv(s) => write!(f, "missing required value: {}", s),
            ScriptError::InvalidConfig(s) => write!(f, "invalid configuration: {}", s),
            ScriptError::ClientInitialization(s) => write!(f, "error initializing client: {}", s),
            ScriptError::NetworkMismatch { expected, actual } => write!(
                f,
                "network mismatch: expected network id {}, node reports chain id {}",
                expected, actual
            ),
            ScriptError::InsufficientFunds(s) => write!(f, "insufficient funds: {}", s),
            ScriptError::ArtifactParsing(s) => write!(f, "error parsing artifact: {}", s),
            ScriptError::CalldataConstruction(s) => write!(f, "error constructing calldata: {}", s),
            ScriptError::InvalidPlan(s) => write!(f, "invalid deployment plan: {}", s),
            ScriptError::ContractDeployment(s) => write!(f, "error deploying contract: {}", s),
            ScriptError::ReadDeployments(s) => write!(f, "error reading deployments: {}", s),
            ScriptError::WriteDeployments(s) => write!(f, "error writing deployments: {}", s),
        }
    }
}

impl Error for ScriptError {}
