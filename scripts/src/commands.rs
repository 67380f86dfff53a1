//! Implementations of the deploy script commands

use std::path::Path;

use tracing::{debug, info, warn};

use crate::{
    artifacts::ArtifactStore,
    config::DeployConfig,
    deployer::{ContractDeployer, SigningContext},
    deployments::write_report,
    errors::ScriptError,
    migration::{DeploymentReport, Migration},
    plan::DeploymentPlan,
};

/// Build the crowdsale plan for the configured beneficiary
fn crowdsale_plan(config: &DeployConfig) -> DeploymentPlan {
    if config.beneficiary.is_none() {
        warn!("`PK` is not set, the crowdsale will be deployed with the zero address");
    }
    DeploymentPlan::crowdsale(config.beneficiary)
}

/// Deploy the tokens and the crowdsale, recording their addresses
pub async fn migrate(config: DeployConfig) -> Result<DeploymentReport, ScriptError> {
    let mut migration = Migration::new(crowdsale_plan(&config), config.profile.clone());
    if !config.enforce_network_id {
        migration = migration.skip_network_check();
    }

    let context = SigningContext::new(&config)?;
    info!(
        "Deploying to {} from {:#x}",
        config.profile.name,
        context.address()
    );
    let deployer = context.connect();

    let mut artifacts = ArtifactStore::new(&config.artifacts_dir);
    debug!("Reading artifacts from {}", artifacts.dir().display());
    let mut report = DeploymentReport::new(config.profile.name, deployer.deployer_address());
    let outcome = migration.run_into(&mut artifacts, &deployer, &mut report).await;

    record_deployments(&config.deployments_path, &report, outcome)?;
    for contract in &report.deployed {
        info!("{}: {:#x}", contract.label, contract.address);
    }
    info!(
        "Deployments written to {}",
        config.deployments_path.display()
    );

    Ok(report)
}

/// Write the contracts a migration deployed to the deployments file, then
/// return the migration's outcome.
///
/// Contracts mined before a failing step are recorded too.
fn record_deployments(
    path: &Path,
    report: &DeploymentReport,
    outcome: Result<(), ScriptError>,
) -> Result<(), ScriptError> {
    let Err(e) = outcome else {
        return write_report(path, report);
    };

    if !report.deployed.is_empty() {
        match write_report(path, report) {
            Ok(()) => warn!(
                "Recorded {} contracts deployed before the failure in {}",
                report.deployed.len(),
                path.display()
            ),
            Err(write_err) => warn!("Could not record the partial deployment: {}", write_err),
        }
    }
    Err(e)
}

/// Print the deployment plan without connecting to the network
pub fn show_plan(config: &DeployConfig) -> Result<(), ScriptError> {
    let plan = crowdsale_plan(config);
    plan.validate()?;

    let deployer = SigningContext::new(config)?.address();
    println!("Network: {}", config.profile.name);
    println!("Deployer: {:#x}", deployer);
    println!(
        "Gas: limit {}, price {} wei",
        config.profile.gas_limit, config.profile.gas_price
    );
    print!("{}", plan);

    Ok(())
}

#[cfg(test)]
mod tests {
    use alloy::primitives::Address;

    use super::*;
    use crate::{deployments::read_deployment, migration::DeployedContract};

    /// A report in which only the first token was deployed
    fn partial_report() -> DeploymentReport {
        let mut report = DeploymentReport::new("rinkeby", Address::ZERO);
        report.deployed.push(DeployedContract {
            label: "TokenA".to_string(),
            artifact: "FixedSupplyToken".to_string(),
            address: Address::repeat_byte(0x11),
        });
        report
    }

    #[test]
    fn test_failed_migration_records_deployed_contracts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployments.json");

        let outcome = Err(ScriptError::ContractDeployment("reverted".to_string()));
        let result = record_deployments(&path, &partial_report(), outcome);

        assert!(matches!(result, Err(ScriptError::ContractDeployment(_))));
        assert_eq!(
            read_deployment(&path, "rinkeby", "TokenA").unwrap(),
            Address::repeat_byte(0x11)
        );
    }

    #[test]
    fn test_failure_before_any_deployment_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployments.json");

        let report = DeploymentReport::new("rinkeby", Address::ZERO);
        let outcome = Err(ScriptError::InsufficientFunds("empty".to_string()));
        assert!(record_deployments(&path, &report, outcome).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_successful_migration_is_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployments.json");

        record_deployments(&path, &partial_report(), Ok(())).unwrap();
        assert!(read_deployment(&path, "rinkeby", "TokenA").is_ok());
    }
}
