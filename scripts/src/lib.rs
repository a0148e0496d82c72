//! Scripts for seeding a tokenized property against a deployed registry.

#![deny(missing_docs)]

pub mod budget;
pub mod cli;
pub mod commands;
pub mod constants;
pub mod diagnostics;
pub mod errors;
pub mod network;
pub mod sequencer;
mod solidity;
pub mod types;
pub mod utils;
pub mod verifier;
