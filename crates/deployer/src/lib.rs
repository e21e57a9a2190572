//! The deployment orchestrator of the rollup contract deployer.
//!
//! A [`Deployer`] drives one contract from its artifact to a confirmed on-chain deployment. A
//! [`PlanRunner`] sequences the deployments of a [`DeploymentPlan`], resolving the addresses
//! contracts reference along the way, and hands back partial progress when a deployment fails.
//!
//! [`DeploymentPlan`]: rollup_deployer_primitives::DeploymentPlan

pub use config::{
    DeployerConfig, ReceiptPollConfig, DEFAULT_INITIAL_POLL_INTERVAL,
    DEFAULT_MAX_CONFIRMATION_WAIT, DEFAULT_MAX_POLL_INTERVAL, DEFAULT_VERIFICATION_TIMEOUT,
};
mod config;

pub use deployer::Deployer;
mod deployer;

pub use error::{DeployError, PartialDeployment};
mod error;

use metrics::DeployerMetrics;
mod metrics;

mod poll;

pub use runner::PlanRunner;
mod runner;
