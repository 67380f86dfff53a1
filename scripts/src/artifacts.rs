//! Loading of compiled contract artifacts and construction of deploy code

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use alloy::{
    dyn_abi::{DynSolValue, JsonAbiExt},
    json_abi::JsonAbi,
    primitives::{hex, Bytes},
};
use serde::Deserialize;
use tracing::debug;

use crate::{constants::ARTIFACT_EXTENSION, errors::ScriptError};

/// A compiled contract: its ABI and creation bytecode
#[derive(Clone, Debug)]
pub struct ContractArtifact {
    /// The name of the contract
    pub contract_name: String,
    /// The contract ABI
    pub abi: JsonAbi,
    /// The creation bytecode, without constructor arguments
    pub bytecode: Bytes,
}

/// The subset of a compiler artifact we read
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArtifact {
    /// The contract name, absent from some Foundry output
    #[serde(default)]
    contract_name: Option<String>,
    /// The contract ABI
    abi: JsonAbi,
    /// The creation bytecode
    bytecode: RawBytecode,
}

/// Truffle emits the bytecode as a hex string, Foundry nests it under `object`
#[derive(Deserialize)]
#[serde(untagged)]
enum RawBytecode {
    /// A bare hex string
    Hex(String),
    /// An object carrying the hex string
    Object {
        /// The hex-encoded bytecode
        object: String,
    },
}

impl ContractArtifact {
    /// Parse an artifact from its JSON representation.
    ///
    /// `name` is used when the artifact does not carry a contract name.
    pub fn from_json(name: &str, json: &str) -> Result<Self, ScriptError> {
        let raw: RawArtifact = serde_json::from_str(json)
            .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {}", name, e)))?;

        let hex_code = match &raw.bytecode {
            RawBytecode::Hex(code) => code,
            RawBytecode::Object { object } => object,
        };
        let bytecode = hex::decode(hex_code)
            .map_err(|e| ScriptError::ArtifactParsing(format!("{} bytecode: {}", name, e)))?;
        if bytecode.is_empty() {
            return Err(ScriptError::ArtifactParsing(format!(
                "{} has no bytecode, is it abstract or an interface?",
                name
            )));
        }

        Ok(ContractArtifact {
            contract_name: raw.contract_name.unwrap_or_else(|| name.to_string()),
            abi: raw.abi,
            bytecode: bytecode.into(),
        })
    }

    /// The creation code for a deployment: the bytecode followed by the
    /// ABI-encoded constructor arguments
    pub fn deploy_code(&self, args: &[DynSolValue]) -> Result<Bytes, ScriptError> {
        let encoded_args = match &self.abi.constructor {
            Some(constructor) => constructor.abi_encode_input(args).map_err(|e| {
                ScriptError::CalldataConstruction(format!("{}: {}", self.contract_name, e))
            })?,
            None if args.is_empty() => Vec::new(),
            None => {
                return Err(ScriptError::CalldataConstruction(format!(
                    "{} has no constructor, but {} arguments were given",
                    self.contract_name,
                    args.len()
                )))
            }
        };

        let mut code = self.bytecode.to_vec();
        code.extend_from_slice(&encoded_args);
        Ok(code.into())
    }
}

/// Reads artifacts from a build directory, parsing each one at most once
pub struct ArtifactStore {
    /// The directory containing `<name>.json` artifacts
    dir: PathBuf,
    /// Artifacts parsed so far
    cache: HashMap<String, ContractArtifact>,
}

impl ArtifactStore {
    /// Create a store reading from the given directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        ArtifactStore {
            dir: dir.into(),
            cache: HashMap::new(),
        }
    }

    /// The directory artifacts are read from
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Add an already parsed artifact to the store
    pub fn insert(&mut self, artifact: ContractArtifact) {
        self.cache.insert(artifact.contract_name.clone(), artifact);
    }

    /// Get the artifact with the given name, reading it from disk if needed
    pub fn load(&mut self, name: &str) -> Result<&ContractArtifact, ScriptError> {
        if !self.cache.contains_key(name) {
            let path = self.dir.join(name).with_extension(ARTIFACT_EXTENSION);
            debug!("Reading artifact {}", path.display());

            let json = fs::read_to_string(&path).map_err(|e| {
                ScriptError::ArtifactParsing(format!("{}: {}", path.display(), e))
            })?;
            let artifact = ContractArtifact::from_json(name, &json)?;
            self.cache.insert(name.to_string(), artifact);
        }

        Ok(&self.cache[name])
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{address, Address, U256};

    use super::*;

    /// A Truffle-style artifact whose constructor takes no arguments
    const TOKEN_ARTIFACT: &str = r#"{
        "contractName": "FixedSupplyToken",
        "abi": [
            { "type": "constructor", "inputs": [], "stateMutability": "nonpayable" },
            {
                "type": "function",
                "name": "totalSupply",
                "inputs": [],
                "outputs": [{ "name": "", "type": "uint256" }],
                "stateMutability": "view"
            }
        ],
        "bytecode": "0x6080604052"
    }"#;

    /// A Foundry-style artifact with the crowdsale constructor
    const CROWDSALE_ARTIFACT: &str = r#"{
        "abi": [
            {
                "type": "constructor",
                "inputs": [
                    { "name": "_rate", "type": "uint256" },
                    { "name": "_wallet", "type": "address" },
                    { "name": "_token", "type": "address" },
                    { "name": "_dai", "type": "address" }
                ],
                "stateMutability": "nonpayable"
            }
        ],
        "bytecode": { "object": "0x60806040" }
    }"#;

    #[test]
    fn test_parse_truffle_artifact() {
        let artifact = ContractArtifact::from_json("Token", TOKEN_ARTIFACT).unwrap();
        assert_eq!(artifact.contract_name, "FixedSupplyToken");
        assert_eq!(artifact.bytecode.as_ref(), &[0x60, 0x80, 0x60, 0x40, 0x52]);
        assert_eq!(artifact.deploy_code(&[]).unwrap(), artifact.bytecode);
    }

    #[test]
    fn test_parse_foundry_artifact() {
        let artifact = ContractArtifact::from_json("DaiCrowdsale", CROWDSALE_ARTIFACT).unwrap();
        assert_eq!(artifact.contract_name, "DaiCrowdsale");
        assert_eq!(artifact.bytecode.len(), 4);
    }

    #[test]
    fn test_empty_bytecode_rejected() {
        let json = r#"{ "abi": [], "bytecode": "0x" }"#;
        assert!(matches!(
            ContractArtifact::from_json("IToken", json),
            Err(ScriptError::ArtifactParsing(_))
        ));
    }

    #[test]
    fn test_unlinked_bytecode_rejected() {
        let json = r#"{ "abi": [], "bytecode": "0x6080__SafeMath______________________________" }"#;
        assert!(matches!(
            ContractArtifact::from_json("Linked", json),
            Err(ScriptError::ArtifactParsing(_))
        ));
    }

    #[test]
    fn test_constructor_args_appended() {
        let artifact = ContractArtifact::from_json("DaiCrowdsale", CROWDSALE_ARTIFACT).unwrap();
        let wallet = address!("000000000000000000000000000000000000abcd");
        let args = [
            DynSolValue::Uint(U256::from(1), 256),
            DynSolValue::Address(wallet),
            DynSolValue::Address(Address::repeat_byte(0x11)),
            DynSolValue::Address(Address::repeat_byte(0x22)),
        ];

        let code = artifact.deploy_code(&args).unwrap();
        assert_eq!(code.len(), 4 + 4 * 32);
        assert_eq!(&code[..4], artifact.bytecode.as_ref());
        // Each argument occupies one word
        assert_eq!(code[4 + 31], 1);
        assert_eq!(&code[4 + 32 + 12..4 + 64], wallet.as_slice());
    }

    #[test]
    fn test_wrong_arity_rejected() {
        let artifact = ContractArtifact::from_json("DaiCrowdsale", CROWDSALE_ARTIFACT).unwrap();
        let args = [DynSolValue::Uint(U256::from(1), 256)];
        assert!(matches!(
            artifact.deploy_code(&args),
            Err(ScriptError::CalldataConstruction(_))
        ));

        let token = ContractArtifact::from_json("Token", TOKEN_ARTIFACT).unwrap();
        assert!(token.deploy_code(&args).is_err());
    }

    #[test]
    fn test_store_reads_and_caches() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("FixedSupplyToken.json");
        fs::write(&path, TOKEN_ARTIFACT).unwrap();

        let mut store = ArtifactStore::new(dir.path());
        assert_eq!(
            store.load("FixedSupplyToken").unwrap().contract_name,
            "FixedSupplyToken"
        );

        // A second load is served from the cache
        fs::remove_file(&path).unwrap();
        assert!(store.load("FixedSupplyToken").is_ok());
        assert!(matches!(
            store.load("DaiCrowdsale"),
            Err(ScriptError::ArtifactParsing(_))
        ));
    }
}
