use crate::{
    args::{CheckConfigArgs, Cli, Command, DeployArgs, RollupArgs},
    constants,
    plan::{rollup_plan, verifier_plan},
};
use alloy_network::EthereumWallet;
use alloy_provider::{Provider, ProviderBuilder};
use alloy_rpc_client::RpcClient;
use alloy_signer::Signer;
use alloy_transport::layers::RetryBackoffLayer;
use eyre::{bail, WrapErr};
use rollup_deployer::{Deployer, PlanRunner};
use rollup_deployer_artifacts::DirectoryArtifacts;
use rollup_deployer_primitives::{
    ConfigError, DeploymentManifest, DeploymentPlan, RollupConfig, VerifierKind, VerifierVariant,
};
use rollup_deployer_providers::{AlloyChainClient, EtherscanVerifier};
use std::future::Future;

/// The exit code after a forced interrupt.
const INTERRUPTED_EXIT_CODE: i32 = 130;

impl Cli {
    /// Runs the command.
    ///
    /// Environment and config errors are reported before any chain interaction.
    pub async fn run(self) -> eyre::Result<()> {
        match self.command {
            Command::TeeVerifier(args) => deploy_verifier(VerifierKind::Pccs, args).await,
            Command::TeeVerifierQuote(args) => deploy_verifier(VerifierKind::Quote, args).await,
            Command::TeeVerifierMock(args) => deploy_verifier(VerifierKind::Mock, args).await,
            Command::Rollup(args) => deploy_rollup(args).await,
            Command::CheckConfig(args) => check_config(&args),
        }
    }
}

async fn deploy_verifier(kind: VerifierKind, args: DeployArgs) -> eyre::Result<()> {
    let variant = VerifierVariant::from_env(kind)?;
    let plan = verifier_plan(&variant, args.explorer.verify());
    deploy(args, plan).await
}

async fn deploy_rollup(args: RollupArgs) -> eyre::Result<()> {
    let config = load_config(&args.config)?;

    let verifier = match (config.espresso_tee_verifier, args.verifier) {
        (Some(address), Some(kind)) => {
            tracing::warn!(target: "rollup_deployer::cli", %kind, %address, "Config names a TEE verifier, --verifier is ignored");
            None
        }
        (_, Some(kind)) => Some(VerifierVariant::from_env(kind)?),
        (_, None) => None,
    };

    let Some(plan) = rollup_plan(
        &config,
        verifier.as_ref(),
        &args.rollup_contract,
        args.deploy.explorer.verify(),
    ) else {
        bail!("--verifier is required when the config names no espressoTEEVerifier")
    };
    deploy(args.deploy, plan).await
}

fn check_config(args: &CheckConfigArgs) -> eyre::Result<()> {
    let config = load_config(&args.config)?;
    println!(
        "Config {} is valid: chain id {}, owner {}, {} validators, {} batch posters",
        args.config.display(),
        config.chain_id,
        config.owner,
        config.validators.len(),
        config.batch_posters.len(),
    );
    Ok(())
}

fn load_config(path: &std::path::Path) -> eyre::Result<RollupConfig> {
    RollupConfig::load(path)
        .wrap_err_with(|| format!("invalid rollup config {}", path.display()))
}

/// Runs `plan` against the chain configured by `args`, persisting the manifest whatever the
/// outcome.
async fn deploy(args: DeployArgs, plan: DeploymentPlan) -> eyre::Result<()> {
    let rpc_url = args.chain.rpc_url.clone().ok_or(ConfigError::MissingEnv(constants::RPC_URL))?;
    let signer = args
        .chain
        .private_key
        .clone()
        .ok_or(ConfigError::MissingEnv(constants::DEPLOYER_PRIVATE_KEY))?;
    let deployer_config = args.deployer_config()?;
    let prior = DeploymentManifest::load(&args.manifest)
        .wrap_err_with(|| format!("failed to load manifest {}", args.manifest.display()))?;

    let address = signer.address();
    tracing::info!(target: "rollup_deployer::cli", %address, %rpc_url, contracts = plan.len(), prior = prior.len(), "Starting deployment");

    let client = RpcClient::builder()
        .layer(RetryBackoffLayer::new(
            args.chain.max_retries,
            args.chain.initial_backoff,
            args.chain.compute_units_per_second,
        ))
        .http(rpc_url);
    let provider = ProviderBuilder::new().wallet(EthereumWallet::from(signer)).connect_client(client);
    let mut chain = AlloyChainClient::new(provider, address);

    if args.explorer.verify() {
        let chain_id =
            chain.provider().get_chain_id().await.wrap_err("failed to fetch the chain id")?;
        let api_key = args.explorer.api_key.clone().unwrap_or_default();
        chain = chain.with_verifier(EtherscanVerifier::new(
            args.explorer.api_url.clone(),
            api_key,
            chain_id,
        ));
    } else if !args.explorer.no_verify {
        tracing::warn!(target: "rollup_deployer::cli", "No block explorer API key, source verification is skipped");
    }

    let deployer =
        Deployer::new(chain, DirectoryArtifacts::new(&args.artifacts), deployer_config);
    let mut runner = PlanRunner::new(deployer);

    let cancellation = runner.cancellation_token();
    tokio::spawn(async move {
        if watch_interrupts(tokio::signal::ctrl_c, move || cancellation.cancel()).await {
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    });

    match runner.run(&plan, prior).await {
        Ok(results) => {
            save_manifest(&results, &args)?;
            print_addresses(&plan, &results);
            Ok(())
        }
        Err(partial) => {
            if let Err(err) = save_manifest(&partial.results, &args) {
                tracing::error!(target: "rollup_deployer::cli", ?err, "Partial deployment could not be persisted");
            }
            print_addresses(&plan, &partial.results);
            if let Some(tx_hash) = partial.error.tx_hash().filter(|_| partial.error.is_indeterminate()) {
                tracing::warn!(target: "rollup_deployer::cli", %tx_hash, "The creation transaction may still be included, check it before running again");
            }
            Err(partial.error).wrap_err("deployment failed")
        }
    }
}

/// Calls `cancel` on the first interrupt and returns `true` on the second one. Returns `false`
/// if the interrupt listener fails.
async fn watch_interrupts<F, Fut>(mut interrupt: F, cancel: impl FnOnce()) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    if interrupt().await.is_err() {
        return false;
    }
    tracing::warn!(target: "rollup_deployer::cli", "Interrupted, stopping before the next deployment. Interrupt again to exit now");
    cancel();

    if interrupt().await.is_err() {
        return false;
    }
    tracing::warn!(target: "rollup_deployer::cli", "Interrupted again, exiting without saving the manifest; contracts deployed by this run are listed in the logs");
    true
}

fn save_manifest(results: &DeploymentManifest, args: &DeployArgs) -> eyre::Result<()> {
    results
        .save(&args.manifest)
        .wrap_err_with(|| format!("failed to save manifest {}", args.manifest.display()))?;
    tracing::debug!(target: "rollup_deployer::cli", path = %args.manifest.display(), contracts = results.len(), "Manifest saved");
    Ok(())
}

/// Prints the address of every contract of the plan that has a deployment.
fn print_addresses(plan: &DeploymentPlan, results: &DeploymentManifest) {
    for result in plan.contracts().iter().filter_map(|spec| results.get(&spec.name)) {
        println!("{} deployed at address: {}", result.contract_name, result.address);
    }
}
