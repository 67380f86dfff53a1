//! The ordered plan of contract deployments

use std::fmt::{self, Display, Formatter};

use alloy::{
    dyn_abi::DynSolValue,
    primitives::{Address, U256},
};

use crate::{
    constants::{
        CROWDSALE_LABEL, CROWDSALE_RATE, DAI_CROWDSALE_ARTIFACT, FIXED_SUPPLY_TOKEN_ARTIFACT,
        TOKEN_A_LABEL, TOKEN_B_LABEL,
    },
    errors::ScriptError,
};

/// The number of bits in a `uint256`
const UINT_BITS: usize = 256;

/// A constructor argument of a deployment step
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConstructorArg {
    /// A `uint256` literal
    Uint(U256),
    /// An address literal
    Address(Address),
    /// The address a previous step deployed to, by step index
    DeployedAddress(usize),
}

impl Display for ConstructorArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ConstructorArg::Uint(value) => write!(f, "{}", value),
            ConstructorArg::Address(address) => write!(f, "{:#x}", address),
            ConstructorArg::DeployedAddress(step) => write!(f, "<address of step {}>", step),
        }
    }
}

/// A single contract deployment
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeployStep {
    /// The name the deployed contract is recorded under
    pub label: String,
    /// The artifact to deploy
    pub artifact: String,
    /// The constructor arguments
    pub args: Vec<ConstructorArg>,
}

impl DeployStep {
    /// Create a deployment step
    pub fn new(label: &str, artifact: &str, args: Vec<ConstructorArg>) -> Self {
        DeployStep {
            label: label.to_string(),
            artifact: artifact.to_string(),
            args,
        }
    }

    /// Resolve the constructor arguments given the addresses of the steps
    /// deployed so far, in plan order
    pub fn resolve_args(&self, deployed: &[Address]) -> Result<Vec<DynSolValue>, ScriptError> {
        self.args
            .iter()
            .map(|arg| match arg {
                ConstructorArg::Uint(value) => Ok(DynSolValue::Uint(*value, UINT_BITS)),
                ConstructorArg::Address(address) => Ok(DynSolValue::Address(*address)),
                ConstructorArg::DeployedAddress(step) => deployed
                    .get(*step)
                    .map(|address| DynSolValue::Address(*address))
                    .ok_or_else(|| {
                        ScriptError::InvalidPlan(format!(
                            "{} needs the address of step {}, which has not been deployed",
                            self.label, step
                        ))
                    }),
            })
            .collect()
    }
}

/// An ordered sequence of deployments, each of which may depend on the
/// addresses of the steps before it
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeploymentPlan {
    /// The steps, in execution order
    steps: Vec<DeployStep>,
}

impl DeploymentPlan {
    /// An empty plan
    pub fn new() -> Self {
        Self::default()
    }

    /// The two tokens followed by the crowdsale selling them.
    ///
    /// A missing beneficiary is passed to the crowdsale as the zero address.
    pub fn crowdsale(beneficiary: Option<Address>) -> Self {
        let mut plan = Self::new();
        let token_a = plan.push(DeployStep::new(
            TOKEN_A_LABEL,
            FIXED_SUPPLY_TOKEN_ARTIFACT,
            vec![],
        ));
        let token_b = plan.push(DeployStep::new(
            TOKEN_B_LABEL,
            FIXED_SUPPLY_TOKEN_ARTIFACT,
            vec![],
        ));
        plan.push(DeployStep::new(
            CROWDSALE_LABEL,
            DAI_CROWDSALE_ARTIFACT,
            vec![
                ConstructorArg::Uint(U256::from(CROWDSALE_RATE)),
                ConstructorArg::Address(beneficiary.unwrap_or(Address::ZERO)),
                ConstructorArg::DeployedAddress(token_a),
                ConstructorArg::DeployedAddress(token_b),
            ],
        ));

        plan
    }

    /// Append a step, returning its index
    pub fn push(&mut self, step: DeployStep) -> usize {
        self.steps.push(step);
        self.steps.len() - 1
    }

    /// The steps, in execution order
    pub fn steps(&self) -> &[DeployStep] {
        &self.steps
    }

    /// The number of steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the plan has no steps
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Check that every step only references steps strictly before it, and
    /// that no two steps share a label
    pub fn validate(&self) -> Result<(), ScriptError> {
        for (index, step) in self.steps.iter().enumerate() {
            if self.steps[..index].iter().any(|prev| prev.label == step.label) {
                return Err(ScriptError::InvalidPlan(format!(
                    "label {} is used more than once",
                    step.label
                )));
            }

            for arg in &step.args {
                if let ConstructorArg::DeployedAddress(dep) = arg {
                    if *dep >= index {
                        return Err(ScriptError::InvalidPlan(format!(
                            "step {} ({}) references step {}, which does not precede it",
                            index, step.label, dep
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}

impl Display for DeploymentPlan {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (index, step) in self.steps.iter().enumerate() {
            let args = step
                .args
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(f, "{}. {} = {}({})", index, step.label, step.artifact, args)?;
        }
        Ok(())
    }
}
