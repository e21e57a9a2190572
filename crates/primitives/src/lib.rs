//! Primitive types for the rollup contract deployer.

pub use config::{MaxTimeVariation, RollupConfig, MAX_DATA_SIZE};
mod config;

pub use contract::{ConstructorArg, ContractSpec, ResolvedContractSpec};
mod contract;

pub use deployment::DeploymentResult;
mod deployment;

pub use error::{ConfigError, PlanError};
mod error;

pub use manifest::{DeploymentManifest, ManifestError};
mod manifest;

pub use plan::DeploymentPlan;
mod plan;

pub use verifier::{
    VerifierKind, VerifierVariant, MR_ENCLAVE, MR_SIGNER, PCCS_ROUTER_ADDRESS,
    TEE_VERIFIER_CONTRACT, TEE_VERIFIER_MOCK_CONTRACT, V3_QUOTE_VERIFIER_ADDRESS,
};
mod verifier;

pub use alloy_dyn_abi::DynSolValue;
