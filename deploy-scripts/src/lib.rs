//! Scripts for compiling and deploying the project's smart contracts.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod artifacts;
pub mod cli;
pub mod commands;
pub mod constants;
pub mod errors;
pub mod solc;
pub mod sources;
pub mod types;
pub mod utils;
