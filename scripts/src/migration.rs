//! Sequential execution of a deployment plan

use alloy::primitives::{Address, U256};
use tracing::{debug, info, warn};

use crate::{
    artifacts::ArtifactStore,
    config::NetworkProfile,
    deployer::{ContractDeployer, DeployRequest},
    errors::ScriptError,
    plan::DeploymentPlan,
};

/// A contract created by a migration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeployedContract {
    /// The label of the step that created it
    pub label: String,
    /// The artifact it was created from
    pub artifact: String,
    /// Its address
    pub address: Address,
}

/// The contracts a migration has deployed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeploymentReport {
    /// The network the contracts were deployed to
    pub network: String,
    /// The account that deployed them
    pub deployer: Address,
    /// The deployed contracts, in plan order
    pub deployed: Vec<DeployedContract>,
}

impl DeploymentReport {
    /// An empty report for the given network and deployer
    pub fn new(network: &str, deployer: Address) -> Self {
        DeploymentReport {
            network: network.to_string(),
            deployer,
            deployed: Vec::new(),
        }
    }

    /// The address deployed under the given label
    pub fn address_of(&self, label: &str) -> Option<Address> {
        self.deployed
            .iter()
            .find(|contract| contract.label == label)
            .map(|contract| contract.address)
    }
}

/// A deployment plan bound to the network it runs on
pub struct Migration {
    /// The steps to execute
    plan: DeploymentPlan,
    /// The network parameters applied to every step
    profile: NetworkProfile,
    /// Whether the node must report the profile's network ID
    enforce_network_id: bool,
}

impl Migration {
    /// Bind a plan to a network
    pub fn new(plan: DeploymentPlan, profile: NetworkProfile) -> Self {
        Migration {
            plan,
            profile,
            enforce_network_id: true,
        }
    }

    /// Do not check the node's chain ID against the profile
    pub fn skip_network_check(mut self) -> Self {
        self.enforce_network_id = false;
        self
    }

    /// Execute the plan one step at a time.
    ///
    /// Every artifact is loaded and the network is checked before the first
    /// request is sent. Each request is only issued once the previous one is
    /// mined, and the first failure aborts the remaining steps.
    pub async fn run<D: ContractDeployer + ?Sized>(
        &self,
        artifacts: &mut ArtifactStore,
        deployer: &D,
    ) -> Result<DeploymentReport, ScriptError> {
        let mut report = DeploymentReport::new(self.profile.name, deployer.deployer_address());
        self.run_into(artifacts, deployer, &mut report).await?;
        Ok(report)
    }

    /// Execute the plan like [`Migration::run`], appending each contract to
    /// `report` as soon as it is mined.
    ///
    /// On failure `report` holds every contract deployed before the failing
    /// step.
    pub async fn run_into<D: ContractDeployer + ?Sized>(
        &self,
        artifacts: &mut ArtifactStore,
        deployer: &D,
        report: &mut DeploymentReport,
    ) -> Result<(), ScriptError> {
        self.plan.validate()?;
        for step in self.plan.steps() {
            artifacts.load(&step.artifact)?;
        }

        // The node checks each transaction's maximum fee when it is sent
        let max_fee = self.profile.max_fee_per_tx();
        debug!(
            "Plan of {} steps may cost up to {} wei",
            self.plan.len(),
            U256::from(max_fee) * U256::from(self.plan.len())
        );
        let expected_chain_id = self.enforce_network_id.then_some(self.profile.network_id);
        if expected_chain_id.is_none() {
            warn!("Skipping the network ID check for {}", self.profile.name);
        }
        deployer
            .preflight(expected_chain_id, U256::from(max_fee))
            .await?;

        let mut addresses = Vec::with_capacity(self.plan.len());
        for step in self.plan.steps() {
            let args = step.resolve_args(&addresses)?;
            let code = artifacts.load(&step.artifact)?.deploy_code(&args)?;

            info!("Deploying {} ({})", step.label, step.artifact);
            let address = deployer
                .deploy(DeployRequest {
                    label: step.label.clone(),
                    code,
                    gas_limit: self.profile.gas_limit,
                    gas_price: self.profile.gas_price,
                })
                .await?;
            info!("{} deployed at {:#x}", step.label, address);

            addresses.push(address);
            report.deployed.push(DeployedContract {
                label: step.label.clone(),
                artifact: step.artifact.clone(),
                address,
            });
        }

        Ok(())
    }
}
