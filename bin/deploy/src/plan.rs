//! The deployment plans of the deployer commands.

use rollup_deployer_primitives::{
    ConstructorArg, DeploymentPlan, RollupConfig, VerifierVariant,
};

/// Returns the plan deploying the TEE verifier `variant`.
pub fn verifier_plan(variant: &VerifierVariant, verify: bool) -> DeploymentPlan {
    DeploymentPlan::default().with_contract(variant.contract_spec(verify))
}

/// Returns the plan deploying the rollup contract `rollup_contract`.
///
/// When the config names an existing TEE verifier, the rollup uses it and only the rollup
/// contract is deployed. Otherwise `verifier` is deployed first and the rollup is constructed
/// with its address. Returns `None` if the config names no TEE verifier and `verifier` is
/// `None`.
pub fn rollup_plan(
    config: &RollupConfig,
    verifier: Option<&VerifierVariant>,
    rollup_contract: &str,
    verify: bool,
) -> Option<DeploymentPlan> {
    if let Some(address) = config.espresso_tee_verifier {
        return Some(
            DeploymentPlan::default()
                .with_contract(config.contract_spec(rollup_contract, address, verify)),
        );
    }

    let verifier = verifier?;
    Some(
        DeploymentPlan::default().with_contract(verifier.contract_spec(verify)).with_contract(
            config.contract_spec(
                rollup_contract,
                ConstructorArg::address_of(verifier.contract_name()),
                verify,
            ),
        ),
    )
}
