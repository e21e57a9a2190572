use crate::{
    ChainClient, ChainError, CreationReceipt, EtherscanVerifier, VerificationError,
    VerificationRequest,
};
use alloy_network::{ReceiptResponse, TransactionBuilder};
use alloy_primitives::{Address, Bytes, TxHash};
use alloy_provider::Provider;
use alloy_rpc_types_eth::TransactionRequest;

/// A [`ChainClient`] over an alloy [`Provider`].
///
/// The provider is expected to sign the transactions it sends, i.e. to carry a wallet filler
/// for [`Self::signer`], and should implement some backoff strategy using
/// [`alloy_transport::layers::RetryBackoffLayer`] to absorb rate limiting on the RPC provider.
#[derive(Debug)]
pub struct AlloyChainClient<P> {
    /// The execution provider.
    provider: P,
    /// The address of the signer configured in the provider.
    signer: Address,
    /// The optional block explorer verifier.
    verifier: Option<EtherscanVerifier>,
}

impl<P> AlloyChainClient<P> {
    /// Returns a new [`AlloyChainClient`] sending transactions from `signer`.
    pub const fn new(provider: P, signer: Address) -> Self {
        Self { provider, signer, verifier: None }
    }

    /// Sets the block explorer used for source verification.
    pub fn with_verifier(mut self, verifier: EtherscanVerifier) -> Self {
        self.verifier = Some(verifier);
        self
    }

    /// Returns a reference to the provider.
    pub const fn provider(&self) -> &P {
        &self.provider
    }
}

#[async_trait::async_trait]
impl<P: Provider> ChainClient for AlloyChainClient<P> {
    fn signer(&self) -> Address {
        self.signer
    }

    async fn submit_creation(&self, code: Bytes) -> Result<TxHash, ChainError> {
        let tx = TransactionRequest::default().with_from(self.signer).with_deploy_code(code);
        let pending = self.provider.send_transaction(tx).await?;
        let hash = *pending.tx_hash();
        tracing::trace!(target: "rollup_deployer::providers", %hash, "Creation transaction accepted");
        Ok(hash)
    }

    async fn transaction_receipt(
        &self,
        hash: TxHash,
    ) -> Result<Option<CreationReceipt>, ChainError> {
        let receipt = self.provider.get_transaction_receipt(hash).await?;
        Ok(receipt.map(|receipt| CreationReceipt {
            transaction_hash: receipt.transaction_hash(),
            block_number: receipt.block_number(),
            success: receipt.status(),
            contract_address: receipt.contract_address(),
        }))
    }

    async fn verify_source(&self, request: VerificationRequest) -> Result<(), VerificationError> {
        match &self.verifier {
            Some(verifier) => verifier.verify(&request).await,
            None => Err(VerificationError::Unavailable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, b256};
    use alloy_provider::RootProvider;
    use serde_json::json;
    use wiremock::{
        matchers::{body_partial_json, method},
        Mock, MockServer, ResponseTemplate,
    };

    const SIGNER: Address = address!("0x57Ef5309de3c5433cEbFA644b3302c2b6e2d5C10");

    fn rpc_result(result: serde_json::Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({ "jsonrpc": "2.0", "id": 0, "result": result }))
    }

    fn client(server: &MockServer) -> AlloyChainClient<RootProvider> {
        let provider = RootProvider::new_http(server.uri().parse().expect("valid url"));
        AlloyChainClient::new(provider, SIGNER)
    }

    #[tokio::test]
    async fn test_submit_creation() -> eyre::Result<()> {
        let server = MockServer::start().await;
        let hash = b256!("0x1111111111111111111111111111111111111111111111111111111111111111");
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "method": "eth_sendTransaction" })))
            .respond_with(rpc_result(json!(hash)))
            .mount(&server)
            .await;

        let submitted = client(&server).submit_creation(Bytes::from_static(&[0x60, 0x80])).await?;
        assert_eq!(submitted, hash);
        Ok(())
    }

    #[tokio::test]
    async fn test_pending_receipt() -> eyre::Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "method": "eth_getTransactionReceipt" })))
            .respond_with(rpc_result(serde_json::Value::Null))
            .mount(&server)
            .await;

        let receipt = client(&server).transaction_receipt(TxHash::repeat_byte(1)).await?;
        assert!(receipt.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_creation_receipt() -> eyre::Result<()> {
        let server = MockServer::start().await;
        let hash = b256!("0x2222222222222222222222222222222222222222222222222222222222222222");
        let created = address!("0x8354db765810dF8F24f1477B06e91E5b17a408bF");
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "method": "eth_getTransactionReceipt" })))
            .respond_with(rpc_result(json!({
                "transactionHash": hash,
                "transactionIndex": "0x0",
                "blockHash": b256!("0x3333333333333333333333333333333333333333333333333333333333333333"),
                "blockNumber": "0x10",
                "from": SIGNER,
                "to": null,
                "cumulativeGasUsed": "0x5208",
                "gasUsed": "0x5208",
                "effectiveGasPrice": "0x1",
                "contractAddress": created,
                "logs": [],
                "logsBloom": format!("0x{}", "0".repeat(512)),
                "status": "0x1",
                "type": "0x2"
            })))
            .mount(&server)
            .await;

        let receipt = client(&server).transaction_receipt(hash).await?.expect("receipt");
        assert_eq!(
            receipt,
            CreationReceipt {
                transaction_hash: hash,
                block_number: Some(16),
                success: true,
                contract_address: Some(created),
            }
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_verify_without_backend() {
        let server = MockServer::start().await;
        let err = client(&server)
            .verify_source(VerificationRequest {
                address: SIGNER,
                contract_name: "EspressoTEEVerifierMock".into(),
                constructor_args: Bytes::new(),
                source: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, VerificationError::Unavailable));
    }
}
