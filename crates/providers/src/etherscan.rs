use crate::{VerificationError, VerificationRequest};
use alloy_primitives::hex;
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;

/// The default interval between two verification status checks.
pub const DEFAULT_STATUS_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// A source verifier for Etherscan compatible block explorer APIs.
///
/// The verifier submits the solc standard JSON input and then polls the verification status.
/// It never gives up on its own: callers bound the whole verification with a timeout.
#[derive(Debug, Clone)]
pub struct EtherscanVerifier {
    client: reqwest::Client,
    api_url: Url,
    api_key: String,
    chain_id: u64,
    poll_interval: Duration,
}

#[derive(Debug, Deserialize)]
struct EtherscanResponse {
    status: String,
    result: String,
}

impl EtherscanVerifier {
    /// Returns a new [`EtherscanVerifier`] for the chain `chain_id`.
    pub fn new(api_url: Url, api_key: impl Into<String>, chain_id: u64) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_key: api_key.into(),
            chain_id,
            poll_interval: DEFAULT_STATUS_POLL_INTERVAL,
        }
    }

    /// Sets the interval between two status checks.
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Verifies the contract described by `request`.
    pub async fn verify(&self, request: &VerificationRequest) -> Result<(), VerificationError> {
        let source = request
            .source
            .as_ref()
            .ok_or_else(|| VerificationError::MissingSource(request.contract_name.clone()))?;

        let form = [
            ("module", "contract".to_string()),
            ("action", "verifysourcecode".to_string()),
            ("apikey", self.api_key.clone()),
            ("contractaddress", request.address.to_checksum(None)),
            ("sourceCode", source.standard_json_input.to_string()),
            ("codeformat", "solidity-standard-json-input".to_string()),
            ("contractname", source.qualified_name(&request.contract_name)),
            ("compilerversion", format!("v{}", source.compiler_version)),
            ("constructorArguements", hex::encode(&request.constructor_args)),
        ];
        let response: EtherscanResponse = self
            .client
            .post(self.api_url.clone())
            .query(&[("chainid", self.chain_id)])
            .form(&form)
            .send()
            .await?
            .json()
            .await?;

        if response.status != "1" {
            if is_already_verified(&response.result) {
                tracing::info!(target: "rollup_deployer::providers", contract = %request.contract_name, "Source already verified");
                return Ok(());
            }
            return Err(VerificationError::Rejected(response.result));
        }

        let guid = response.result;
        tracing::debug!(target: "rollup_deployer::providers", contract = %request.contract_name, %guid, "Verification submitted");

        loop {
            tokio::time::sleep(self.poll_interval).await;

            let status: EtherscanResponse = self
                .client
                .get(self.api_url.clone())
                .query(&[
                    ("chainid", self.chain_id.to_string()),
                    ("module", "contract".to_string()),
                    ("action", "checkverifystatus".to_string()),
                    ("guid", guid.clone()),
                    ("apikey", self.api_key.clone()),
                ])
                .send()
                .await?
                .json()
                .await?;

            if status.result.starts_with("Pass") || is_already_verified(&status.result) {
                return Ok(());
            }
            if status.result.contains("Pending") || status.result.contains("in queue") {
                tracing::trace!(target: "rollup_deployer::providers", %guid, result = %status.result, "Verification pending");
                continue;
            }
            return Err(VerificationError::Rejected(status.result));
        }
    }
}

fn is_already_verified(result: &str) -> bool {
    result.to_ascii_lowercase().contains("already verified")
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, Bytes};
    use rollup_deployer_artifacts::SourceBundle;
    use serde_json::json;
    use wiremock::{
        matchers::{body_string_contains, method, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    fn request(source: Option<SourceBundle>) -> VerificationRequest {
        VerificationRequest {
            address: address!("0x8354db765810dF8F24f1477B06e91E5b17a408bF"),
            contract_name: "EspressoTEEVerifier".into(),
            constructor_args: Bytes::from_static(&[0xab; 32]),
            source,
        }
    }

    fn source() -> SourceBundle {
        SourceBundle {
            source_name: "src/EspressoTEEVerifier.sol".into(),
            compiler_version: "0.8.25+commit.b61c2a91".into(),
            standard_json_input: json!({ "language": "Solidity" }),
        }
    }

    fn verifier(server: &MockServer) -> EtherscanVerifier {
        EtherscanVerifier::new(server.uri().parse().expect("valid url"), "key", 1)
            .with_poll_interval(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_verification_passes() -> eyre::Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(query_param("chainid", "1"))
            .and(body_string_contains("action=verifysourcecode"))
            .and(body_string_contains("compilerversion=v0.8.25%2Bcommit.b61c2a91"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "status": "1", "message": "OK", "result": "guid-1" })),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("action", "checkverifystatus"))
            .and(query_param("guid", "guid-1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "status": "1", "message": "OK", "result": "Pass - Verified" })),
            )
            .mount(&server)
            .await;

        verifier(&server).verify(&request(Some(source()))).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_verification_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "status": "1", "message": "OK", "result": "guid-2" })),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!({ "status": "0", "message": "NOTOK", "result": "Fail - Unable to verify" }),
            ))
            .mount(&server)
            .await;

        let err = verifier(&server).verify(&request(Some(source()))).await.unwrap_err();
        assert!(matches!(err, VerificationError::Rejected(reason) if reason.starts_with("Fail")));
    }

    #[tokio::test]
    async fn test_already_verified() -> eyre::Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!({ "status": "0", "message": "NOTOK", "result": "Contract source code already verified" }),
            ))
            .mount(&server)
            .await;

        verifier(&server).verify(&request(Some(source()))).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_source() {
        let server = MockServer::start().await;
        let err = verifier(&server).verify(&request(None)).await.unwrap_err();
        assert!(matches!(err, VerificationError::MissingSource(_)));
    }
}
