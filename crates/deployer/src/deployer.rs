use crate::{
    poll::{PollTimeout, ReceiptPoller},
    DeployError, DeployerConfig, DeployerMetrics,
};
use alloy_dyn_abi::{DynSolType, DynSolValue, JsonAbiExt, Specifier};
use alloy_primitives::{Address, Bytes};
use rollup_deployer_artifacts::{ArtifactResolver, ContractArtifact, SourceBundle};
use rollup_deployer_primitives::{DeploymentManifest, DeploymentResult, ResolvedContractSpec};
use rollup_deployer_providers::{ChainClient, VerificationRequest};
use tokio::time::Instant;

/// Drives a single contract from "not deployed" to "confirmed deployed".
///
/// The deployer submits through the signer of its [`ChainClient`]. Deployments take `&mut self`,
/// so a deployer can only have one creation in flight and the signer's nonces are consumed in
/// order.
#[derive(Debug)]
pub struct Deployer<C, A> {
    /// The chain client carrying the signer.
    client: C,
    /// The artifact resolver.
    artifacts: A,
    /// The runtime settings.
    config: DeployerConfig,
    /// The receipt poller.
    poller: ReceiptPoller,
    /// The deployer metrics.
    metrics: DeployerMetrics,
}

impl<C, A> Deployer<C, A> {
    /// Creates a new [`Deployer`].
    pub fn new(client: C, artifacts: A, config: DeployerConfig) -> Self {
        Self {
            client,
            artifacts,
            poller: ReceiptPoller::new(config.receipt),
            config,
            metrics: DeployerMetrics::default(),
        }
    }

    /// Returns a reference to the chain client.
    pub const fn client(&self) -> &C {
        &self.client
    }

    /// Returns a reference to the artifact resolver.
    pub const fn artifacts(&self) -> &A {
        &self.artifacts
    }

    /// Returns the runtime settings.
    pub const fn config(&self) -> &DeployerConfig {
        &self.config
    }
}

impl<C: ChainClient, A: ArtifactResolver> Deployer<C, A> {
    /// Deploys the contract described by `spec`, unless `prior` already holds a deployment of
    /// it, in which case that deployment is returned unchanged.
    ///
    /// A rejected submission is returned as [`DeployError::Submission`] and never retried. A
    /// receipt that does not show up in time yields [`DeployError::ConfirmationTimeout`]: the
    /// transaction may still be included, so the deployment must not be retried blindly.
    /// Source verification is best effort and only degrades [`DeploymentResult::verified`].
    /// Invalid receipt polling bounds are reported as [`DeployError::Config`] before anything
    /// else.
    pub async fn deploy(
        &mut self,
        spec: &ResolvedContractSpec,
        prior: &DeploymentManifest,
    ) -> Result<DeploymentResult, DeployError> {
        self.config.receipt.validate()?;

        if let Some(result) = prior.get(&spec.name) {
            tracing::info!(target: "rollup_deployer::deployer", contract = %spec.name, address = %result.address, "Contract already deployed, skipping");
            self.metrics.skipped.increment(1);
            return Ok(result.clone());
        }

        let artifact = self.artifacts.resolve(&spec.name)?;
        let constructor_args = encode_constructor_args(&artifact, spec)?;
        let code: Bytes = [&artifact.creation_code[..], &constructor_args[..]].concat().into();

        tracing::info!(target: "rollup_deployer::deployer", contract = %spec.name, signer = %self.client.signer(), "Deploying contract");
        let tx_hash = self
            .client
            .submit_creation(code)
            .await
            .map_err(|source| DeployError::Submission { contract: spec.name.clone(), source })?;
        tracing::debug!(target: "rollup_deployer::deployer", contract = %spec.name, %tx_hash, "Creation transaction submitted");

        let start = Instant::now();
        let receipt = self.poller.wait(&self.client, tx_hash).await.map_err(
            |PollTimeout { waited }| DeployError::ConfirmationTimeout {
                contract: spec.name.clone(),
                tx_hash,
                waited,
            },
        )?;
        self.metrics.confirmation_duration.record(start.elapsed().as_secs_f64());

        if !receipt.success {
            return Err(DeployError::CreationReverted { contract: spec.name.clone(), tx_hash });
        }
        let address = receipt.contract_address.filter(|address| !address.is_zero()).ok_or_else(
            || DeployError::MissingContractAddress { contract: spec.name.clone(), tx_hash },
        )?;

        tracing::info!(target: "rollup_deployer::deployer", contract = %spec.name, %address, %tx_hash, block_number = ?receipt.block_number, "Contract deployed");
        self.metrics.deployments.increment(1);

        let verified = spec.verify &&
            self.verify(address, &spec.name, constructor_args, artifact.source).await;

        Ok(DeploymentResult {
            contract_name: spec.name.clone(),
            address,
            transaction_hash: tx_hash,
            verified,
        })
    }

    /// Verifies the source of a deployed contract. Returns whether the verification succeeded.
    async fn verify(
        &self,
        address: Address,
        contract: &str,
        constructor_args: Bytes,
        source: Option<SourceBundle>,
    ) -> bool {
        let request = VerificationRequest {
            address,
            contract_name: contract.to_string(),
            constructor_args,
            source,
        };

        let timeout = self.config.verification_timeout;
        match tokio::time::timeout(timeout, self.client.verify_source(request)).await {
            Ok(Ok(())) => {
                tracing::info!(target: "rollup_deployer::deployer", contract, %address, "Source verified");
                true
            }
            Ok(Err(error)) => {
                tracing::warn!(target: "rollup_deployer::deployer", contract, %address, %error, "Source verification failed, the contract stays deployed");
                self.metrics.verification_failures.increment(1);
                false
            }
            Err(_) => {
                tracing::warn!(target: "rollup_deployer::deployer", contract, %address, ?timeout, "Source verification timed out, the contract stays deployed");
                self.metrics.verification_failures.increment(1);
                false
            }
        }
    }
}

/// Encodes the constructor arguments of `spec` against the constructor of the artifact ABI.
fn encode_constructor_args(
    artifact: &ContractArtifact,
    spec: &ResolvedContractSpec,
) -> Result<Bytes, DeployError> {
    let encoding_error =
        |reason: String| DeployError::Encoding { contract: spec.name.clone(), reason };

    let Some(constructor) = &artifact.abi.constructor else {
        if spec.args.is_empty() {
            return Ok(Bytes::new());
        }
        return Err(encoding_error(format!(
            "the contract has no constructor but {} arguments were given",
            spec.args.len()
        )));
    };

    if constructor.inputs.len() != spec.args.len() {
        return Err(encoding_error(format!(
            "expected {} arguments, got {}",
            constructor.inputs.len(),
            spec.args.len()
        )));
    }
    let args = constructor
        .inputs
        .iter()
        .zip(&spec.args)
        .map(|(param, value)| {
            let ty = param.resolve().map_err(|err| err.to_string())?;
            coerce_to_type(value.clone(), &ty)
        })
        .collect::<Result<Vec<_>, _>>()
        .map_err(encoding_error)?;

    constructor
        .abi_encode_input(&args)
        .map(Into::into)
        .map_err(|err| encoding_error(err.to_string()))
}

/// Narrows the integers of `value` to the widths declared by `ty`, descending into tuples and
/// arrays. Values of any other shape are returned as is and checked by the encoder.
fn coerce_to_type(value: DynSolValue, ty: &DynSolType) -> Result<DynSolValue, String> {
    match (value, ty) {
        (DynSolValue::Uint(n, _), DynSolType::Uint(bits)) => {
            if n.bit_len() > *bits {
                return Err(format!("value {n} does not fit in uint{bits}"));
            }
            Ok(DynSolValue::Uint(n, *bits))
        }
        (DynSolValue::Tuple(values), DynSolType::Tuple(types)) if values.len() == types.len() => {
            values
                .into_iter()
                .zip(types)
                .map(|(value, ty)| coerce_to_type(value, ty))
                .collect::<Result<_, _>>()
                .map(DynSolValue::Tuple)
        }
        (DynSolValue::Array(values), DynSolType::Array(inner)) => values
            .into_iter()
            .map(|value| coerce_to_type(value, inner))
            .collect::<Result<_, _>>()
            .map(DynSolValue::Array),
        (DynSolValue::FixedArray(values), DynSolType::FixedArray(inner, _)) => values
            .into_iter()
            .map(|value| coerce_to_type(value, inner))
            .collect::<Result<_, _>>()
            .map(DynSolValue::FixedArray),
        (value, _) => Ok(value),
    }
}
