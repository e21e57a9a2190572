use crate::constants;
use alloy_signer_local::PrivateKeySigner;
use rollup_deployer::{
    DeployerConfig, ReceiptPollConfig, DEFAULT_INITIAL_POLL_INTERVAL,
    DEFAULT_MAX_CONFIRMATION_WAIT, DEFAULT_MAX_POLL_INTERVAL, DEFAULT_VERIFICATION_TIMEOUT,
};
use rollup_deployer_primitives::{ConfigError, VerifierKind};
use std::{path::PathBuf, time::Duration};

/// Deploys the rollup contracts and their TEE verifier.
#[derive(Debug, clap::Parser)]
#[command(name = "rollup-deploy", version)]
pub struct Cli {
    /// The command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// The deployer commands.
#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Deploys the TEE verifier backed by the PCCS router at `PCCS_ROUTER_ADDRESS`.
    TeeVerifier(DeployArgs),
    /// Deploys the TEE verifier checking V3 quotes against `MR_ENCLAVE` and `MR_SIGNER`, using
    /// the quote verifier at `V3_QUOTE_VERIFIER_ADDRESS`.
    TeeVerifierQuote(DeployArgs),
    /// Deploys the mock TEE verifier.
    TeeVerifierMock(DeployArgs),
    /// Deploys a TEE verifier and the rollup contract configured by a config file.
    Rollup(RollupArgs),
    /// Validates a rollup config file without deploying anything.
    CheckConfig(CheckConfigArgs),
}

/// The arguments shared by all deploying commands.
#[derive(Debug, Clone, clap::Args)]
pub struct DeployArgs {
    /// The chain arguments.
    #[command(flatten)]
    pub chain: ChainArgs,
    /// The directory holding the contract build artifacts.
    #[arg(long, value_name = "DIR", default_value = "artifacts")]
    pub artifacts: PathBuf,
    /// The deployment manifest. Contracts it holds are not deployed again, new deployments are
    /// added to it.
    #[arg(long, value_name = "FILE", default_value = "deployments.json")]
    pub manifest: PathBuf,
    /// The block explorer arguments.
    #[command(flatten)]
    pub explorer: ExplorerArgs,
    /// The receipt polling arguments.
    #[command(flatten)]
    pub receipt: ReceiptPollArgs,
}

/// The arguments of the chain client.
#[derive(Debug, Clone, clap::Args)]
pub struct ChainArgs {
    /// The URL for the RPC of the chain to deploy to.
    #[arg(long = "rpc-url", value_name = "RPC_URL", env = constants::RPC_URL)]
    pub rpc_url: Option<reqwest::Url>,
    /// The private key of the deployer account.
    #[arg(long = "private-key", value_name = "KEY", env = constants::DEPLOYER_PRIVATE_KEY, hide_env_values = true)]
    pub private_key: Option<PrivateKeySigner>,
    /// The compute units per second for the provider.
    #[arg(long = "rpc.cups", value_name = "CUPS", default_value_t = constants::PROVIDER_COMPUTE_UNITS_PER_SECOND)]
    pub compute_units_per_second: u64,
    /// The max amount of retries for the provider.
    #[arg(long = "rpc.max-retries", value_name = "RETRIES", default_value_t = constants::PROVIDER_MAX_RETRIES)]
    pub max_retries: u32,
    /// The initial backoff for the provider, in milliseconds.
    #[arg(long = "rpc.initial-backoff", value_name = "MS", default_value_t = constants::PROVIDER_INITIAL_BACKOFF)]
    pub initial_backoff: u64,
}

/// The arguments of the block explorer used for source verification.
#[derive(Debug, Clone, clap::Args)]
pub struct ExplorerArgs {
    /// Skips source verification.
    #[arg(long = "no-verify")]
    pub no_verify: bool,
    /// The Etherscan compatible API endpoint.
    #[arg(long = "explorer-api-url", value_name = "URL", default_value = constants::DEFAULT_EXPLORER_API_URL)]
    pub api_url: reqwest::Url,
    /// The API key of the block explorer. Verification is skipped without it.
    #[arg(long = "explorer-api-key", value_name = "KEY", env = "ETHERSCAN_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
    /// The maximum time a verification may take, in seconds.
    #[arg(long = "verification-timeout", value_name = "SECS", default_value_t = DEFAULT_VERIFICATION_TIMEOUT.as_secs())]
    pub timeout: u64,
}

impl ExplorerArgs {
    /// Returns true if deployed sources should be verified.
    pub const fn verify(&self) -> bool {
        !self.no_verify && self.api_key.is_some()
    }
}

/// The bounds of the receipt polling.
#[derive(Debug, Clone, Copy, clap::Args)]
pub struct ReceiptPollArgs {
    /// The interval before the second receipt poll, in milliseconds.
    #[arg(long = "receipt.initial-interval", value_name = "MS", default_value_t = DEFAULT_INITIAL_POLL_INTERVAL.as_millis() as u64)]
    pub initial_interval: u64,
    /// The cap on the interval between two receipt polls, in milliseconds.
    #[arg(long = "receipt.max-interval", value_name = "MS", default_value_t = DEFAULT_MAX_POLL_INTERVAL.as_millis() as u64)]
    pub max_interval: u64,
    /// The maximum time to wait for a receipt, in seconds.
    #[arg(long = "receipt.max-wait", value_name = "SECS", default_value_t = DEFAULT_MAX_CONFIRMATION_WAIT.as_secs())]
    pub max_wait: u64,
}

impl DeployArgs {
    /// Returns the deployer settings, rejecting zero or inverted receipt polling bounds.
    pub fn deployer_config(&self) -> Result<DeployerConfig, ConfigError> {
        let receipt = ReceiptPollConfig::new(
            Duration::from_millis(self.receipt.initial_interval),
            Duration::from_millis(self.receipt.max_interval),
            Duration::from_secs(self.receipt.max_wait),
        );
        receipt.validate()?;
        Ok(DeployerConfig::new(receipt, Duration::from_secs(self.explorer.timeout)))
    }
}

/// The arguments of the rollup deployment.
#[derive(Debug, Clone, clap::Args)]
pub struct RollupArgs {
    /// The shared deployment arguments.
    #[command(flatten)]
    pub deploy: DeployArgs,
    /// The rollup config file.
    #[arg(long, value_name = "FILE")]
    pub config: PathBuf,
    /// The TEE verifier to deploy along the rollup: `pccs`, `quote` or `mock`. Required unless
    /// the config names an `espressoTEEVerifier`.
    #[arg(long, value_name = "KIND")]
    pub verifier: Option<VerifierKind>,
    /// The name of the rollup contract artifact.
    #[arg(long = "rollup-contract", value_name = "NAME", default_value = constants::DEFAULT_ROLLUP_CONTRACT)]
    pub rollup_contract: String,
}

/// The arguments of the config check.
#[derive(Debug, Clone, clap::Args)]
pub struct CheckConfigArgs {
    /// The rollup config file.
    #[arg(long, value_name = "FILE")]
    pub config: PathBuf,
}
