//! Reading and writing deployed addresses in the deployments file
//!
//! The file maps network names to the addresses deployed there, keyed by
//! step label:
//!
//! ```json
//! { "rinkeby": { "TokenA": "0x…", "TokenB": "0x…", "DaiCrowdsale": "0x…" } }
//! ```

use std::{fs, path::Path, str::FromStr};

use alloy::primitives::Address;
use serde_json::{Map, Value};

use crate::{errors::ScriptError, migration::DeploymentReport};

/// Read the deployments file, or an empty object if it does not exist yet
fn read_deployments(path: &Path) -> Result<Map<String, Value>, ScriptError> {
    if !path.exists() {
        return Ok(Map::new());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| ScriptError::ReadDeployments(format!("{}: {}", path.display(), e)))?;
    match serde_json::from_str::<Value>(&content)
        .map_err(|e| ScriptError::ReadDeployments(format!("{}: {}", path.display(), e)))?
    {
        Value::Object(map) => Ok(map),
        _ => Err(ScriptError::ReadDeployments(format!(
            "{} is not a JSON object",
            path.display()
        ))),
    }
}

/// Record the addresses of a migration, keeping other networks' entries
pub fn write_report(path: &Path, report: &DeploymentReport) -> Result<(), ScriptError> {
    let mut deployments = read_deployments(path)?;

    let network = deployments
        .entry(report.network.clone())
        .or_insert_with(|| Value::Object(Map::new()));
    let Value::Object(network) = network else {
        return Err(ScriptError::WriteDeployments(format!(
            "entry for {} is not a JSON object",
            report.network
        )));
    };
    for contract in &report.deployed {
        network.insert(
            contract.label.clone(),
            Value::String(format!("{:#x}", contract.address)),
        );
    }

    let content = serde_json::to_string_pretty(&deployments)
        .map_err(|e| ScriptError::WriteDeployments(e.to_string()))?;
    fs::write(path, content)
        .map_err(|e| ScriptError::WriteDeployments(format!("{}: {}", path.display(), e)))
}

/// Read the address deployed under `label` on `network`
pub fn read_deployment(path: &Path, network: &str, label: &str) -> Result<Address, ScriptError> {
    let deployments = read_deployments(path)?;

    let addr_str = deployments
        .get(network)
        .and_then(|entries| entries.get(label))
        .and_then(Value::as_str)
        .ok_or_else(|| {
            ScriptError::ReadDeployments(format!("no {} deployment on {}", label, network))
        })?;

    Address::from_str(addr_str).map_err(|e| ScriptError::ReadDeployments(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::DeployedContract;

    /// A report of a single `TokenA` deployment
    fn report(network: &str, address: Address) -> DeploymentReport {
        DeploymentReport {
            network: network.to_string(),
            deployer: Address::ZERO,
            deployed: vec![DeployedContract {
                label: "TokenA".to_string(),
                artifact: "FixedSupplyToken".to_string(),
                address,
            }],
        }
    }

    #[test]
    fn test_write_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployments.json");
        let address = Address::repeat_byte(0x11);

        write_report(&path, &report("rinkeby", address)).unwrap();
        assert_eq!(read_deployment(&path, "rinkeby", "TokenA").unwrap(), address);
    }

    #[test]
    fn test_write_preserves_other_networks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployments.json");

        write_report(&path, &report("rinkeby", Address::repeat_byte(0x11))).unwrap();
        write_report(&path, &report("local", Address::repeat_byte(0x22))).unwrap();
        write_report(&path, &report("rinkeby", Address::repeat_byte(0x33))).unwrap();

        assert_eq!(
            read_deployment(&path, "local", "TokenA").unwrap(),
            Address::repeat_byte(0x22)
        );
        assert_eq!(
            read_deployment(&path, "rinkeby", "TokenA").unwrap(),
            Address::repeat_byte(0x33)
        );
    }

    #[test]
    fn test_missing_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployments.json");
        assert!(matches!(
            read_deployment(&path, "rinkeby", "TokenA"),
            Err(ScriptError::ReadDeployments(_))
        ));
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployments.json");
        fs::write(&path, "[1, 2, 3]").unwrap();
        assert!(matches!(
            write_report(&path, &report("rinkeby", Address::ZERO)),
            Err(ScriptError::ReadDeployments(_))
        ));
    }
}
