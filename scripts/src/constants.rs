//! Constants used in the deploy scripts

// ------------------------
// | Environment Variables |
// ------------------------

/// The environment variable holding the crowdsale beneficiary address
pub const PK_ENV_VAR: &str = "PK";

/// The environment variable holding the deployer's wallet mnemonic
pub const MNEMONIC_ENV_VAR: &str = "mnemonic";

/// The environment variable holding the Infura access key
pub const INFURA_ENV_VAR: &str = "infura";

// ------------
// | Networks |
// ------------

/// The name of the Rinkeby test network profile
pub const RINKEBY_NETWORK: &str = "rinkeby";

/// The Infura endpoint for Rinkeby, to which the access key is appended
pub const RINKEBY_ENDPOINT_BASE: &str = "https://rinkeby.infura.io/";

/// The network ID of Rinkeby
pub const RINKEBY_NETWORK_ID: u64 = 4;

/// The gas limit applied to every deployment transaction
pub const DEFAULT_GAS_LIMIT: u64 = 4_500_000;

/// The gas price, in wei, applied to every deployment transaction
pub const DEFAULT_GAS_PRICE: u128 = 10_000_000_000;

// -------------
// | Artifacts |
// -------------

/// The default directory containing compiled contract artifacts
pub const DEFAULT_ARTIFACTS_DIR: &str = "build/contracts";

/// The extension of a compiled contract artifact
pub const ARTIFACT_EXTENSION: &str = "json";

/// The artifact name of the fixed supply token contract
pub const FIXED_SUPPLY_TOKEN_ARTIFACT: &str = "FixedSupplyToken";

/// The artifact name of the crowdsale contract
pub const DAI_CROWDSALE_ARTIFACT: &str = "DaiCrowdsale";

// ---------------
// | Deployments |
// ---------------

/// The default path of the deployments file
pub const DEFAULT_DEPLOYMENTS_PATH: &str = "deployments.json";

/// The first token deployment label
pub const TOKEN_A_LABEL: &str = "TokenA";

/// The second token deployment label
pub const TOKEN_B_LABEL: &str = "TokenB";

/// The crowdsale deployment label
pub const CROWDSALE_LABEL: &str = "DaiCrowdsale";

/// The fixed first constructor argument of the crowdsale
pub const CROWDSALE_RATE: u64 = 1;

/// The HD derivation path prefix for Ethereum accounts; the account index is appended
pub const DERIVATION_PATH_PREFIX: &str = "m/44'/60'/0'/0/";
