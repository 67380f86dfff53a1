//! Scripts for deploying the crowdsale and the tokens it sells.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod artifacts;
pub mod cli;
mod commands;
pub mod config;
pub mod constants;
pub mod deployer;
pub mod deployments;
pub mod errors;
pub mod migration;
pub mod plan;
