use crate::{DeploymentManifest, PlanError};
use alloy_dyn_abi::DynSolValue;
use alloy_primitives::Address;

/// A single constructor argument of a [`ContractSpec`].
///
/// Arguments are either concrete ABI values or late-bound references to the address of a
/// contract deployed earlier in the same plan. References may be nested inside tuples and
/// arrays so that struct arguments can carry them.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstructorArg {
    /// A concrete, ABI encodable value.
    Value(DynSolValue),
    /// The address produced by the deployment of the named contract.
    AddressOf(String),
    /// A tuple (struct) of arguments.
    Tuple(Vec<ConstructorArg>),
    /// A dynamic array of arguments.
    Array(Vec<ConstructorArg>),
}

impl ConstructorArg {
    /// Returns a reference to the address of the named contract.
    pub fn address_of(name: impl Into<String>) -> Self {
        Self::AddressOf(name.into())
    }

    /// Calls `f` for every contract name referenced by this argument.
    pub fn for_each_reference<'a>(&'a self, f: &mut impl FnMut(&'a str)) {
        match self {
            Self::Value(_) => {}
            Self::AddressOf(name) => f(name),
            Self::Tuple(args) | Self::Array(args) => {
                for arg in args {
                    arg.for_each_reference(f);
                }
            }
        }
    }

    /// Resolves the argument against the deployed contracts, replacing every reference by the
    /// deployed address.
    pub fn resolve(
        &self,
        contract: &str,
        deployed: &DeploymentManifest,
    ) -> Result<DynSolValue, PlanError> {
        Ok(match self {
            Self::Value(value) => value.clone(),
            Self::AddressOf(name) => {
                let result =
                    deployed.get(name).ok_or_else(|| PlanError::UnresolvedReference {
                        contract: contract.to_string(),
                        reference: name.clone(),
                    })?;
                DynSolValue::Address(result.address)
            }
            Self::Tuple(args) => DynSolValue::Tuple(
                args.iter().map(|arg| arg.resolve(contract, deployed)).collect::<Result<_, _>>()?,
            ),
            Self::Array(args) => DynSolValue::Array(
                args.iter().map(|arg| arg.resolve(contract, deployed)).collect::<Result<_, _>>()?,
            ),
        })
    }
}

impl From<DynSolValue> for ConstructorArg {
    fn from(value: DynSolValue) -> Self {
        Self::Value(value)
    }
}

impl From<Address> for ConstructorArg {
    fn from(address: Address) -> Self {
        Self::Value(DynSolValue::Address(address))
    }
}

/// The description of one contract to deploy.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractSpec {
    /// The contract name, as known to the artifact resolver.
    pub name: String,
    /// The ordered constructor arguments.
    pub constructor_args: Vec<ConstructorArg>,
    /// Whether the contract source should be verified on the block explorer.
    pub verify: bool,
}

impl ContractSpec {
    /// Returns a new [`ContractSpec`] without constructor arguments.
    pub fn new(name: impl Into<String>, verify: bool) -> Self {
        Self { name: name.into(), constructor_args: Vec::new(), verify }
    }

    /// Appends a constructor argument.
    pub fn with_arg(mut self, arg: impl Into<ConstructorArg>) -> Self {
        self.constructor_args.push(arg.into());
        self
    }

    /// Returns the names of all contracts referenced by the constructor arguments.
    pub fn references(&self) -> Vec<&str> {
        let mut references = Vec::new();
        for arg in &self.constructor_args {
            arg.for_each_reference(&mut |name| references.push(name));
        }
        references
    }

    /// Resolves all late-bound references against the already deployed contracts.
    pub fn resolve(&self, deployed: &DeploymentManifest) -> Result<ResolvedContractSpec, PlanError> {
        let args = self
            .constructor_args
            .iter()
            .map(|arg| arg.resolve(&self.name, deployed))
            .collect::<Result<_, _>>()?;
        Ok(ResolvedContractSpec { name: self.name.clone(), args, verify: self.verify })
    }
}

/// A [`ContractSpec`] whose constructor arguments hold only concrete values.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedContractSpec {
    /// The contract name.
    pub name: String,
    /// The ABI values of the constructor arguments.
    pub args: Vec<DynSolValue>,
    /// Whether the contract source should be verified on the block explorer.
    pub verify: bool,
}
