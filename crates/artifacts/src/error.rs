use std::path::PathBuf;

/// An error occurring while resolving a contract artifact.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    /// No artifact exists for the contract.
    #[error("artifact not found for contract {0}")]
    NotFound(String),
    /// More than one artifact matches the contract name.
    #[error("ambiguous artifact for contract {name}: {paths:?}")]
    Ambiguous {
        /// The contract name.
        name: String,
        /// The matching artifact files.
        paths: Vec<PathBuf>,
    },
    /// The artifact holds no creation code, e.g. for an interface or abstract contract.
    #[error("artifact for contract {0} has empty creation code")]
    EmptyCreationCode(String),
    /// The creation code is not valid hex, e.g. because libraries are not linked.
    #[error("invalid creation code in {path}: {reason}")]
    InvalidBytecode {
        /// The artifact file.
        path: PathBuf,
        /// The decoding error.
        reason: String,
    },
    /// The artifact file does not have the expected shape.
    #[error("malformed artifact {path}: {reason}")]
    Malformed {
        /// The artifact file.
        path: PathBuf,
        /// What is missing or wrong.
        reason: &'static str,
    },
    /// IO error.
    #[error("artifact io error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON error.
    #[error("artifact json error: {0}")]
    Json(#[from] serde_json::Error),
}

