//! The signing context and the deployer that submits contract creations

use alloy::{
    network::{EthereumWallet, TransactionBuilder},
    primitives::{Address, Bytes, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::{TransactionReceipt, TransactionRequest},
    signers::local::{coins_bip39::English, MnemonicBuilder, PrivateKeySigner},
    transports::http::reqwest::Url,
};
use async_trait::async_trait;
use tracing::{debug, info};

use crate::{config::DeployConfig, constants::DERIVATION_PATH_PREFIX, errors::ScriptError};

/// A request to create one contract
#[derive(Clone, Debug)]
pub struct DeployRequest {
    /// The label of the plan step issuing the request
    pub label: String,
    /// The creation bytecode with encoded constructor arguments
    pub code: Bytes,
    /// The gas limit of the creation transaction
    pub gas_limit: u64,
    /// The gas price, in wei, of the creation transaction
    pub gas_price: u128,
}

/// Submits contract creations to a network
#[async_trait]
pub trait ContractDeployer: Send + Sync {
    /// The account deployments are sent from
    fn deployer_address(&self) -> Address;

    /// Check that the network is the expected one and that the deployer
    /// holds at least `required_balance` wei before anything is sent
    async fn preflight(
        &self,
        expected_chain_id: Option<u64>,
        required_balance: U256,
    ) -> Result<(), ScriptError>;

    /// Create a contract, returning its address once the creation is mined
    async fn deploy(&self, request: DeployRequest) -> Result<Address, ScriptError>;
}

/// The deployer's signer, bound to the endpoint it will sign for.
///
/// No connection is made until [`SigningContext::connect`] is called.
pub struct SigningContext {
    /// The signer derived from the mnemonic
    signer: PrivateKeySigner,
    /// The RPC endpoint to connect to
    endpoint: Url,
}

impl SigningContext {
    /// Derive the deployer's signer from the configured mnemonic and account index
    pub fn new(config: &DeployConfig) -> Result<Self, ScriptError> {
        let signer = MnemonicBuilder::<English>::default()
            .phrase(config.mnemonic.phrase())
            .derivation_path(format!("{}{}", DERIVATION_PATH_PREFIX, config.account_index))
            .and_then(|builder| builder.build())
            .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;

        Ok(SigningContext {
            signer,
            endpoint: config.endpoint.clone(),
        })
    }

    /// The address of the deployer account
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Build the signing provider
    pub fn connect(self) -> RpcDeployer {
        let deployer = self.signer.address();
        debug!(
            "Connecting to {} as {:#x}",
            self.endpoint.host_str().unwrap_or_default(),
            deployer
        );

        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(self.signer))
            .on_http(self.endpoint);

        RpcDeployer {
            provider: DynProvider::new(provider),
            deployer,
        }
    }
}

/// A [`ContractDeployer`] sending signed transactions over JSON-RPC
pub struct RpcDeployer {
    /// The signing provider
    provider: DynProvider,
    /// The address of the signing account
    deployer: Address,
}

#[async_trait]
impl ContractDeployer for RpcDeployer {
    fn deployer_address(&self) -> Address {
        self.deployer
    }

    async fn preflight(
        &self,
        expected_chain_id: Option<u64>,
        required_balance: U256,
    ) -> Result<(), ScriptError> {
        if let Some(expected) = expected_chain_id {
            let actual = self
                .provider
                .get_chain_id()
                .await
                .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
            if actual != expected {
                return Err(ScriptError::NetworkMismatch { expected, actual });
            }
        }

        let balance = self
            .provider
            .get_balance(self.deployer)
            .await
            .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
        if balance < required_balance {
            return Err(ScriptError::InsufficientFunds(format!(
                "{:#x} holds {} wei, a deployment may cost up to {} wei",
                self.deployer, balance, required_balance
            )));
        }

        Ok(())
    }

    async fn deploy(&self, request: DeployRequest) -> Result<Address, ScriptError> {
        let tx = TransactionRequest::default()
            .with_from(self.deployer)
            .with_deploy_code(request.code)
            .with_gas_limit(request.gas_limit)
            .with_gas_price(request.gas_price);

        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| ScriptError::ContractDeployment(format!("{}: {}", request.label, e)))?;
        info!("{} sent in transaction {:#x}", request.label, pending.tx_hash());

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| ScriptError::ContractDeployment(format!("{}: {}", request.label, e)))?;
        created_address(&request.label, &receipt)
    }
}

/// The address of the contract a mined creation transaction produced
fn created_address(label: &str, receipt: &TransactionReceipt) -> Result<Address, ScriptError> {
    if !receipt.status() {
        return Err(ScriptError::ContractDeployment(format!(
            "{} reverted in transaction {:#x}",
            label, receipt.transaction_hash
        )));
    }

    receipt.contract_address.ok_or_else(|| {
        ScriptError::ContractDeployment(format!("{}: receipt has no contract address", label))
    })
}
