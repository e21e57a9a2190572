use crate::{DeployError, Deployer, PartialDeployment};
use rollup_deployer_artifacts::ArtifactResolver;
use rollup_deployer_primitives::{ContractSpec, DeploymentManifest, DeploymentPlan};
use rollup_deployer_providers::ChainClient;
use tokio_util::sync::CancellationToken;

/// Runs a [`DeploymentPlan`] contract by contract, in declared order.
///
/// The runner owns its [`Deployer`], and with it the signer: deployments are strictly
/// sequential. A cancellation requested through [`Self::cancellation_token`] is honoured before
/// the next contract only, an in-flight creation always runs to its receipt.
#[derive(Debug)]
pub struct PlanRunner<C, A> {
    deployer: Deployer<C, A>,
    cancellation: CancellationToken,
}

impl<C, A> PlanRunner<C, A> {
    /// Creates a new [`PlanRunner`].
    pub fn new(deployer: Deployer<C, A>) -> Self {
        Self { deployer, cancellation: CancellationToken::new() }
    }

    /// Uses `cancellation` to stop the runner.
    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Returns a token cancelling the runner.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Returns a reference to the deployer.
    pub const fn deployer(&self) -> &Deployer<C, A> {
        &self.deployer
    }
}

impl<C: ChainClient, A: ArtifactResolver> PlanRunner<C, A> {
    /// Runs `plan` on top of the `prior` deployments.
    ///
    /// The plan is validated against `prior` before anything is submitted. On the first failure
    /// the run stops and the deployments known at that point, `prior` included, are returned
    /// along with the error so the run can be resumed later.
    pub async fn run(
        &mut self,
        plan: &DeploymentPlan,
        prior: DeploymentManifest,
    ) -> Result<DeploymentManifest, PartialDeployment> {
        if let Err(err) = plan.validate(&prior) {
            tracing::error!(target: "rollup_deployer::runner", %err, "Invalid deployment plan");
            return Err(PartialDeployment { results: prior, error: err.into() });
        }

        tracing::info!(target: "rollup_deployer::runner", contracts = plan.len(), prior = prior.len(), "Running deployment plan");

        let mut results = prior;
        for spec in plan.contracts() {
            if let Err(error) = self.step(spec, &mut results).await {
                tracing::error!(target: "rollup_deployer::runner", contract = %spec.name, %error, deployed = results.len(), "Deployment plan stopped");
                return Err(PartialDeployment { results, error });
            }
        }

        Ok(results)
    }

    async fn step(
        &mut self,
        spec: &ContractSpec,
        results: &mut DeploymentManifest,
    ) -> Result<(), DeployError> {
        if self.cancellation.is_cancelled() {
            return Err(DeployError::Cancelled);
        }

        let resolved = spec.resolve(results)?;
        let result = self.deployer.deploy(&resolved, results).await?;
        results.insert(result);
        Ok(())
    }
}
