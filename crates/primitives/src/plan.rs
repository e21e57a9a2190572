use crate::{ContractSpec, DeploymentManifest, PlanError};
use std::collections::HashSet;

/// An ordered sequence of contracts to deploy.
///
/// Later entries may reference the addresses of earlier entries through
/// [`crate::ConstructorArg::AddressOf`]. The order is the execution order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeploymentPlan {
    contracts: Vec<ContractSpec>,
}

impl DeploymentPlan {
    /// Returns a new [`DeploymentPlan`] from the ordered contracts.
    pub const fn new(contracts: Vec<ContractSpec>) -> Self {
        Self { contracts }
    }

    /// Appends a contract to the plan.
    pub fn push(&mut self, spec: ContractSpec) {
        self.contracts.push(spec);
    }

    /// Appends a contract to the plan.
    pub fn with_contract(mut self, spec: ContractSpec) -> Self {
        self.push(spec);
        self
    }

    /// Returns the ordered contracts.
    pub fn contracts(&self) -> &[ContractSpec] {
        &self.contracts
    }

    /// Returns the number of contracts in the plan.
    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    /// Returns true if the plan is empty.
    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    /// Checks that every reference can be resolved when the plan is executed in order on top
    /// of `prior`, and that no contract appears twice.
    pub fn validate(&self, prior: &DeploymentManifest) -> Result<(), PlanError> {
        let mut available: HashSet<&str> = prior.iter().map(|r| r.contract_name.as_str()).collect();
        let mut seen = HashSet::new();

        for spec in &self.contracts {
            if !seen.insert(spec.name.as_str()) {
                return Err(PlanError::DuplicateContract(spec.name.clone()));
            }
            if let Some(reference) = spec.references().into_iter().find(|r| !available.contains(r))
            {
                return Err(PlanError::UnresolvedReference {
                    contract: spec.name.clone(),
                    reference: reference.to_string(),
                });
            }
            available.insert(spec.name.as_str());
        }

        Ok(())
    }
}

impl FromIterator<ContractSpec> for DeploymentPlan {
    fn from_iter<T: IntoIterator<Item = ContractSpec>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConstructorArg, DeploymentResult};
    use alloy_primitives::{Address, B256};

    #[test]
    fn test_forward_reference_rejected() {
        let plan = DeploymentPlan::default()
            .with_contract(ContractSpec::new("B", false).with_arg(ConstructorArg::address_of("A")))
            .with_contract(ContractSpec::new("A", false));

        assert_eq!(
            plan.validate(&DeploymentManifest::default()),
            Err(PlanError::UnresolvedReference { contract: "B".into(), reference: "A".into() })
        );
    }

    #[test]
    fn test_backward_reference_accepted() {
        let plan = DeploymentPlan::default()
            .with_contract(ContractSpec::new("A", false))
            .with_contract(ContractSpec::new("B", false).with_arg(ConstructorArg::address_of("A")));

        assert_eq!(plan.validate(&DeploymentManifest::default()), Ok(()));
    }

    #[test]
    fn test_reference_to_prior_result_accepted() {
        let prior: DeploymentManifest = [DeploymentResult {
            contract_name: "A".into(),
            address: Address::repeat_byte(1),
            transaction_hash: B256::ZERO,
            verified: false,
        }]
        .into_iter()
        .collect();
        let plan = DeploymentPlan::default()
            .with_contract(ContractSpec::new("B", false).with_arg(ConstructorArg::address_of("A")));

        assert_eq!(plan.validate(&prior), Ok(()));
    }

    #[test]
    fn test_duplicate_contract_rejected() {
        let plan = DeploymentPlan::default()
            .with_contract(ContractSpec::new("A", false))
            .with_contract(ContractSpec::new("A", true));

        assert_eq!(
            plan.validate(&DeploymentManifest::default()),
            Err(PlanError::DuplicateContract("A".into()))
        );
    }
}
