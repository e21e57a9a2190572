use alloy_primitives::{Address, TxHash};
use serde::{Deserialize, Serialize, Serializer};

/// The confirmed deployment of a contract.
///
/// A result is only created once the creation transaction has been included on chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[display("{contract_name} at {address} (tx {transaction_hash})")]
#[serde(rename_all = "camelCase")]
pub struct DeploymentResult {
    /// The deployed contract name.
    pub contract_name: String,
    /// The deployed address, serialized with its EIP-55 checksum.
    #[serde(serialize_with = "serialize_checksummed")]
    pub address: Address,
    /// The hash of the creation transaction.
    pub transaction_hash: TxHash,
    /// Whether the contract source was verified on the block explorer.
    pub verified: bool,
}

fn serialize_checksummed<S: Serializer>(address: &Address, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&address.to_checksum(None))
}
