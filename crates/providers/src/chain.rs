use alloy_primitives::{Address, Bytes, TxHash};
use alloy_transport::{RpcError, TransportErrorKind};
use rollup_deployer_artifacts::SourceBundle;

/// An error returned by a [`ChainClient`].
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    /// RPC error.
    #[error(transparent)]
    Rpc(#[from] RpcError<TransportErrorKind>),
}

/// The parts of a transaction receipt relevant to a contract creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreationReceipt {
    /// The hash of the creation transaction.
    pub transaction_hash: TxHash,
    /// The block the transaction was included in.
    pub block_number: Option<u64>,
    /// Whether the transaction succeeded.
    pub success: bool,
    /// The address of the created contract.
    pub contract_address: Option<Address>,
}

/// A request to verify the source of a deployed contract on a block explorer.
#[derive(Debug, Clone)]
pub struct VerificationRequest {
    /// The deployed contract address.
    pub address: Address,
    /// The contract name.
    pub contract_name: String,
    /// The ABI encoded constructor arguments, without the creation code.
    pub constructor_args: Bytes,
    /// The compiler input of the contract, if the artifact provided one.
    pub source: Option<SourceBundle>,
}

/// An error during source verification. Never fatal to a deployment.
#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    /// The client has no verification backend configured.
    #[error("no source verification backend configured")]
    Unavailable,
    /// The artifact did not provide the compiler input.
    #[error("no compiler input available for {0}")]
    MissingSource(String),
    /// The block explorer rejected the request or the verification failed.
    #[error("verification rejected: {0}")]
    Rejected(String),
    /// The block explorer could not be reached.
    #[error("verification request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// A client to the chain contracts are deployed to.
///
/// The client carries the signer: every transaction it submits is signed by [`Self::signer`].
/// Callers must not submit through the same signer concurrently, nonces are assigned by the
/// client in submission order.
#[async_trait::async_trait]
#[auto_impl::auto_impl(&, Arc, Box)]
pub trait ChainClient: Send + Sync {
    /// Returns the address of the signer.
    fn signer(&self) -> Address;

    /// Submits a contract creation transaction carrying `code`, the creation code followed by the
    /// encoded constructor arguments. Returns once the transaction is accepted by the node.
    async fn submit_creation(&self, code: Bytes) -> Result<TxHash, ChainError>;

    /// Returns the receipt of the transaction if it has been included.
    async fn transaction_receipt(&self, hash: TxHash)
        -> Result<Option<CreationReceipt>, ChainError>;

    /// Verifies the source code of a deployed contract on the block explorer.
    async fn verify_source(&self, request: VerificationRequest) -> Result<(), VerificationError>;
}
