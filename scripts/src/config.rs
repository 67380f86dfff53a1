//! Network profiles and the validated configuration of a deployment run

use std::{
    fmt::{self, Debug, Formatter},
    path::PathBuf,
    str::FromStr,
};

use alloy::{primitives::Address, transports::http::reqwest::Url};
use clap::ValueEnum;

use crate::{
    cli::ConfigArgs,
    constants::{
        DEFAULT_GAS_LIMIT, DEFAULT_GAS_PRICE, INFURA_ENV_VAR, MNEMONIC_ENV_VAR, PK_ENV_VAR,
        RINKEBY_ENDPOINT_BASE, RINKEBY_NETWORK, RINKEBY_NETWORK_ID,
    },
    errors::ScriptError,
};

/// The connection and transaction parameters of a named network
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkProfile {
    /// The name the network is selected by
    pub name: &'static str,
    /// The endpoint URL, to which the access key is appended
    pub endpoint_base: &'static str,
    /// The network ID the connected node must report
    pub network_id: u64,
    /// The gas limit of every transaction sent on this network
    pub gas_limit: u64,
    /// The gas price, in wei, of every transaction sent on this network
    pub gas_price: u128,
}

/// The networks a deployment can target
pub const NETWORKS: &[NetworkProfile] = &[NetworkProfile {
    name: RINKEBY_NETWORK,
    endpoint_base: RINKEBY_ENDPOINT_BASE,
    network_id: RINKEBY_NETWORK_ID,
    gas_limit: DEFAULT_GAS_LIMIT,
    gas_price: DEFAULT_GAS_PRICE,
}];

impl NetworkProfile {
    /// Look up a network profile by name
    pub fn by_name(name: &str) -> Result<&'static NetworkProfile, ScriptError> {
        NETWORKS.iter().find(|profile| profile.name == name).ok_or_else(|| {
            ScriptError::InvalidConfig(format!("unknown network `{}`", name))
        })
    }

    /// The endpoint of this network for the given access key
    pub fn endpoint(&self, access_key: &str) -> Result<Url, ScriptError> {
        Url::parse(&format!("{}{}", self.endpoint_base, access_key))
            .map_err(|e| ScriptError::InvalidConfig(e.to_string()))
    }

    /// The most gas, in wei, a single transaction on this network can consume
    pub fn max_fee_per_tx(&self) -> u128 {
        self.gas_limit as u128 * self.gas_price
    }
}

/// How to treat a missing crowdsale beneficiary (`PK`)
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PkPolicy {
    /// Deploy the crowdsale with the zero address
    #[default]
    AllowEmpty,
    /// Refuse to start the deployment
    Require,
}

/// A wallet mnemonic, kept out of logs
#[derive(Clone)]
pub struct Mnemonic(String);

impl Mnemonic {
    /// The phrase itself
    pub fn phrase(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Mnemonic {
    fn from(phrase: &str) -> Self {
        Mnemonic(phrase.to_string())
    }
}

impl Debug for Mnemonic {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Mnemonic(<redacted>)")
    }
}

/// The configuration of a deployment run, validated once at startup
#[derive(Clone)]
pub struct DeployConfig {
    /// The network being deployed to
    pub profile: NetworkProfile,
    /// The mnemonic the deployer account is derived from
    pub mnemonic: Mnemonic,
    /// The index of the deployer account under the mnemonic
    pub account_index: u32,
    /// The RPC endpoint transactions are sent to
    pub endpoint: Url,
    /// Whether the node must report the profile's network ID. Off when the
    /// endpoint is overridden
    pub enforce_network_id: bool,
    /// The crowdsale beneficiary, if provided
    pub beneficiary: Option<Address>,
    /// The directory compiled artifacts are read from
    pub artifacts_dir: PathBuf,
    /// The file deployed addresses are recorded in
    pub deployments_path: PathBuf,
}

impl Debug for DeployConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        // The endpoint path embeds the access key
        f.debug_struct("DeployConfig")
            .field("profile", &self.profile)
            .field("mnemonic", &self.mnemonic)
            .field("account_index", &self.account_index)
            .field("endpoint", &self.endpoint.host_str())
            .field("enforce_network_id", &self.enforce_network_id)
            .field("beneficiary", &self.beneficiary)
            .field("artifacts_dir", &self.artifacts_dir)
            .field("deployments_path", &self.deployments_path)
            .finish()
    }
}

impl DeployConfig {
    /// Validate the raw arguments into a deployment configuration.
    ///
    /// Fails if the mnemonic or access key is absent, if the beneficiary is
    /// not an address, or if it is absent under [`PkPolicy::Require`]. No
    /// network connection is made.
    pub fn load(args: &ConfigArgs) -> Result<Self, ScriptError> {
        let profile = NetworkProfile::by_name(&args.network)?.clone();

        let mnemonic = non_empty(&args.mnemonic)
            .map(Mnemonic::from)
            .ok_or_else(|| missing(MNEMONIC_ENV_VAR))?;

        let endpoint = match &args.rpc_url {
            Some(rpc_url) => {
                Url::parse(rpc_url).map_err(|e| ScriptError::InvalidConfig(e.to_string()))?
            }
            None => {
                let access_key = non_empty(&args.infura).ok_or_else(|| missing(INFURA_ENV_VAR))?;
                profile.endpoint(access_key)?
            }
        };

        let beneficiary = non_empty(&args.pk)
            .map(|pk| {
                Address::from_str(pk).map_err(|e| {
                    ScriptError::InvalidConfig(format!("{} is not an address: {}", PK_ENV_VAR, e))
                })
            })
            .transpose()?;
        if beneficiary.is_none() && args.pk_policy == PkPolicy::Require {
            return Err(missing(PK_ENV_VAR));
        }

        Ok(DeployConfig {
            profile,
            mnemonic,
            account_index: args.account_index,
            endpoint,
            enforce_network_id: args.rpc_url.is_none(),
            beneficiary,
            artifacts_dir: args.artifacts_dir.clone(),
            deployments_path: args.deployments_path.clone(),
        })
    }
}

/// Treat an empty or whitespace value the same as an unset one
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// The error for a required variable that is not set
fn missing(var: &str) -> ScriptError {
    ScriptError::MissingEnv(format!("`{}` is not set", var))
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;

    use super::*;
    use crate::constants::{DEFAULT_ARTIFACTS_DIR, DEFAULT_DEPLOYMENTS_PATH};

    /// The well known development mnemonic
    const TEST_MNEMONIC: &str = "test test test test test test test test test test test junk";

    /// Arguments that load successfully
    fn args() -> ConfigArgs {
        ConfigArgs {
            network: RINKEBY_NETWORK.to_string(),
            mnemonic: Some(TEST_MNEMONIC.to_string()),
            infura: Some("abc123".to_string()),
            pk: Some("0x00000000000000000000000000000000000000aB".to_string()),
            pk_policy: PkPolicy::AllowEmpty,
            account_index: 0,
            rpc_url: None,
            artifacts_dir: DEFAULT_ARTIFACTS_DIR.into(),
            deployments_path: DEFAULT_DEPLOYMENTS_PATH.into(),
        }
    }

    #[test]
    fn test_rinkeby_profile() {
        let profile = NetworkProfile::by_name("rinkeby").unwrap();
        assert_eq!(profile.network_id, 4);
        assert_eq!(profile.gas_limit, 4_500_000);
        assert_eq!(profile.gas_price, 10_000_000_000);
        assert_eq!(
            profile.endpoint("abc123").unwrap().as_str(),
            "https://rinkeby.infura.io/abc123"
        );
    }

    #[test]
    fn test_unknown_network() {
        let mut args = args();
        args.network = "mainnet".to_string();
        assert!(matches!(
            DeployConfig::load(&args),
            Err(ScriptError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_load_valid_config() {
        let config = DeployConfig::load(&args()).unwrap();
        assert_eq!(config.profile.name, RINKEBY_NETWORK);
        assert_eq!(
            config.endpoint.as_str(),
            "https://rinkeby.infura.io/abc123"
        );
        assert_eq!(
            config.beneficiary,
            Some(address!("00000000000000000000000000000000000000ab"))
        );
    }

    #[test]
    fn test_missing_mnemonic_fails_eagerly() {
        for mnemonic in [None, Some(String::new()), Some("   ".to_string())] {
            let mut args = args();
            args.mnemonic = mnemonic;
            assert!(matches!(
                DeployConfig::load(&args),
                Err(ScriptError::MissingEnv(_))
            ));
        }
    }

    #[test]
    fn test_missing_infura_fails_eagerly() {
        let mut args = args();
        args.infura = None;
        assert!(matches!(
            DeployConfig::load(&args),
            Err(ScriptError::MissingEnv(_))
        ));
    }

    #[test]
    fn test_rpc_override_does_not_need_infura() {
        let mut args = args();
        args.infura = None;
        args.rpc_url = Some("http://127.0.0.1:8545".to_string());

        let config = DeployConfig::load(&args).unwrap();
        assert_eq!(config.endpoint.as_str(), "http://127.0.0.1:8545/");
        assert!(!config.enforce_network_id);
    }

    #[test]
    fn test_missing_pk_policies() {
        let mut args = args();
        args.pk = None;
        assert_eq!(DeployConfig::load(&args).unwrap().beneficiary, None);

        args.pk_policy = PkPolicy::Require;
        assert!(matches!(
            DeployConfig::load(&args),
            Err(ScriptError::MissingEnv(_))
        ));
    }

    #[test]
    fn test_invalid_pk() {
        let mut args = args();
        args.pk = Some("0xnotanaddress".to_string());
        assert!(matches!(
            DeployConfig::load(&args),
            Err(ScriptError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let rendered = format!("{:?}", DeployConfig::load(&args()).unwrap());
        assert!(!rendered.contains("junk"));
        assert!(!rendered.contains("abc123"));
    }
}
