//! The crate exposes the chain client used by the deployer to submit contract creations, poll
//! their receipts and verify deployed sources, along with its alloy and block explorer backed
//! implementations.

pub use chain::{ChainClient, ChainError, CreationReceipt, VerificationError, VerificationRequest};
mod chain;

pub use client::AlloyChainClient;
mod client;

pub use etherscan::{EtherscanVerifier, DEFAULT_STATUS_POLL_INTERVAL};
mod etherscan;

/// Test utilities for the chain client.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
