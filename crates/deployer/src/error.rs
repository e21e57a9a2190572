use alloy_primitives::TxHash;
use rollup_deployer_artifacts::ArtifactError;
use rollup_deployer_primitives::{ConfigError, DeploymentManifest, PlanError};
use rollup_deployer_providers::ChainError;
use std::time::Duration;

/// An error while deploying a contract.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// Invalid configuration or environment.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The constructor arguments do not match the contract ABI.
    #[error("failed to encode constructor arguments of {contract}: {reason}")]
    Encoding {
        /// The contract.
        contract: String,
        /// The encoding failure.
        reason: String,
    },
    /// The artifact resolver does not know the contract or it has no creation code.
    #[error("no deployable artifact for contract {0}")]
    ArtifactNotFound(String),
    /// The artifact exists but could not be loaded.
    #[error(transparent)]
    Artifact(ArtifactError),
    /// The creation transaction was rejected before inclusion.
    #[error("failed to submit creation of {contract}: {source}")]
    Submission {
        /// The contract.
        contract: String,
        /// The chain client error.
        #[source]
        source: ChainError,
    },
    /// No receipt was observed within the maximum wait. The transaction may still be included.
    #[error(
        "no receipt for creation of {contract} after {waited:?} (tx {tx_hash}); the transaction may still be included"
    )]
    ConfirmationTimeout {
        /// The contract.
        contract: String,
        /// The pending creation transaction.
        tx_hash: TxHash,
        /// The time spent waiting.
        waited: Duration,
    },
    /// The creation transaction was included but reverted.
    #[error("creation of {contract} reverted (tx {tx_hash})")]
    CreationReverted {
        /// The contract.
        contract: String,
        /// The reverted transaction.
        tx_hash: TxHash,
    },
    /// The receipt of a successful creation carries no contract address.
    #[error("receipt of {contract} creation has no contract address (tx {tx_hash})")]
    MissingContractAddress {
        /// The contract.
        contract: String,
        /// The creation transaction.
        tx_hash: TxHash,
    },
    /// The plan references a contract that is not deployed before its use.
    #[error(transparent)]
    UnresolvedReference(#[from] PlanError),
    /// The deployment was cancelled before the next submission.
    #[error("deployment cancelled")]
    Cancelled,
}

impl DeployError {
    /// Returns true if the outcome on chain is unknown: the creation transaction was submitted
    /// and may still be included. Redeploying could produce a second contract instance.
    pub const fn is_indeterminate(&self) -> bool {
        matches!(self, Self::ConfirmationTimeout { .. })
    }

    /// Returns true if the error happened before any transaction was submitted, so the run can
    /// be retried once the input is fixed.
    pub const fn is_safe_to_retry(&self) -> bool {
        matches!(
            self,
            Self::Config(_) |
                Self::UnresolvedReference(_) |
                Self::Cancelled |
                Self::ArtifactNotFound(_) |
                Self::Encoding { .. }
        )
    }

    /// Returns the hash of the creation transaction the error relates to, if any.
    pub const fn tx_hash(&self) -> Option<TxHash> {
        match self {
            Self::ConfirmationTimeout { tx_hash, .. } |
            Self::CreationReverted { tx_hash, .. } |
            Self::MissingContractAddress { tx_hash, .. } => Some(*tx_hash),
            _ => None,
        }
    }
}

impl From<ArtifactError> for DeployError {
    fn from(err: ArtifactError) -> Self {
        match err {
            ArtifactError::NotFound(name) | ArtifactError::EmptyCreationCode(name) => {
                Self::ArtifactNotFound(name)
            }
            err => Self::Artifact(err),
        }
    }
}

/// A plan run that stopped on its first error.
///
/// `results` holds every deployment known when the run stopped, the prior ones included, so it
/// can be persisted and passed back to resume the plan.
#[derive(Debug, thiserror::Error)]
#[error("deployment stopped with {} contracts deployed: {error}", .results.len())]
pub struct PartialDeployment {
    /// The deployments known when the run stopped.
    pub results: DeploymentManifest,
    /// The error that stopped the run.
    #[source]
    pub error: DeployError,
}
