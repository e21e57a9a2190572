use metrics::{Counter, Histogram};
use metrics_derive::Metrics;

/// The metrics for the [`super::Deployer`].
#[derive(Metrics, Clone)]
#[metrics(scope = "deployer")]
pub(crate) struct DeployerMetrics {
    /// The number of contracts deployed.
    pub(crate) deployments: Counter,
    /// The number of contracts skipped because a prior deployment exists.
    pub(crate) skipped: Counter,
    /// The number of failed or abandoned source verifications.
    pub(crate) verification_failures: Counter,
    /// The time between submission and receipt of a creation transaction.
    pub(crate) confirmation_duration: Histogram,
}
