//! Contract artifact resolution for the rollup contract deployer.
//!
//! Artifacts are produced by the contracts build toolchain. The deployer only consumes them: an
//! [`ArtifactResolver`] maps a contract name to its creation code and ABI, plus the compiler
//! input when it is available for block explorer verification.

use alloy_json_abi::JsonAbi;
use alloy_primitives::Bytes;

mod directory;
pub use directory::DirectoryArtifacts;

mod error;
pub use error::ArtifactError;

mod memory;
pub use memory::InMemoryArtifacts;

/// The build output of a single contract.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractArtifact {
    /// The contract name.
    pub name: String,
    /// The creation (init) code.
    pub creation_code: Bytes,
    /// The contract ABI.
    pub abi: JsonAbi,
    /// The compiler input, when known.
    pub source: Option<SourceBundle>,
}

/// Everything a block explorer needs to rebuild a contract from source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceBundle {
    /// The source file declaring the contract, e.g. `src/EspressoTEEVerifier.sol`.
    pub source_name: String,
    /// The full compiler version, e.g. `0.8.25+commit.b61c2a91`.
    pub compiler_version: String,
    /// The solc standard JSON input.
    pub standard_json_input: serde_json::Value,
}

impl SourceBundle {
    /// Returns the fully qualified contract name, `<source>:<contract>`.
    pub fn qualified_name(&self, contract: &str) -> String {
        format!("{}:{contract}", self.source_name)
    }
}

/// Resolves contract names to their build artifacts.
#[auto_impl::auto_impl(&, Arc, Box)]
pub trait ArtifactResolver {
    /// Returns the artifact of the named contract.
    fn resolve(&self, name: &str) -> Result<ContractArtifact, ArtifactError>;
}
