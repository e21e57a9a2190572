use crate::{ConfigError, ContractSpec};
use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, B256};
use std::{fmt, str::FromStr};

/// The environment variable holding the PCCS router address.
pub const PCCS_ROUTER_ADDRESS: &str = "PCCS_ROUTER_ADDRESS";
/// The environment variable holding the V3 quote verifier address.
pub const V3_QUOTE_VERIFIER_ADDRESS: &str = "V3_QUOTE_VERIFIER_ADDRESS";
/// The environment variable holding the enclave measurement.
pub const MR_ENCLAVE: &str = "MR_ENCLAVE";
/// The environment variable holding the enclave signer measurement.
pub const MR_SIGNER: &str = "MR_SIGNER";

/// The contract name of the TEE verifier.
pub const TEE_VERIFIER_CONTRACT: &str = "EspressoTEEVerifier";
/// The contract name of the mock TEE verifier.
pub const TEE_VERIFIER_MOCK_CONTRACT: &str = "EspressoTEEVerifierMock";

/// The kind of TEE verifier to deploy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifierKind {
    /// Verifier backed by a PCCS router.
    Pccs,
    /// Verifier checking V3 quotes against fixed enclave measurements.
    Quote,
    /// Mock verifier accepting every attestation.
    Mock,
}

impl FromStr for VerifierKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pccs" => Ok(Self::Pccs),
            "quote" => Ok(Self::Quote),
            "mock" => Ok(Self::Mock),
            _ => Err(format!("Expected 'pccs', 'quote' or 'mock', got '{s}'")),
        }
    }
}

impl fmt::Display for VerifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pccs => write!(f, "pccs"),
            Self::Quote => write!(f, "quote"),
            Self::Mock => write!(f, "mock"),
        }
    }
}

/// The TEE verifier variant together with its environment supplied parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifierVariant {
    /// Verifier backed by a PCCS router.
    Pccs {
        /// The PCCS router address.
        router: Address,
    },
    /// Verifier checking V3 quotes against fixed enclave measurements.
    Quote {
        /// The V3 quote verifier address.
        quote_verifier: Address,
        /// The expected enclave measurement.
        mr_enclave: B256,
        /// The expected enclave signer measurement.
        mr_signer: B256,
    },
    /// Mock verifier, no parameters.
    Mock,
}

impl VerifierVariant {
    /// Reads the parameters of the `kind` verifier from the process environment.
    pub fn from_env(kind: VerifierKind) -> Result<Self, ConfigError> {
        Self::from_lookup(kind, |name| std::env::var(name).ok())
    }

    /// Reads the parameters of the `kind` verifier through `lookup`.
    pub fn from_lookup(
        kind: VerifierKind,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        Ok(match kind {
            VerifierKind::Pccs => Self::Pccs { router: required(&lookup, PCCS_ROUTER_ADDRESS)? },
            VerifierKind::Quote => Self::Quote {
                quote_verifier: required(&lookup, V3_QUOTE_VERIFIER_ADDRESS)?,
                mr_enclave: required(&lookup, MR_ENCLAVE)?,
                mr_signer: required(&lookup, MR_SIGNER)?,
            },
            VerifierKind::Mock => Self::Mock,
        })
    }

    /// Returns the name of the verifier contract.
    pub const fn contract_name(&self) -> &'static str {
        match self {
            Self::Pccs { .. } | Self::Quote { .. } => TEE_VERIFIER_CONTRACT,
            Self::Mock => TEE_VERIFIER_MOCK_CONTRACT,
        }
    }

    /// Returns the [`ContractSpec`] deploying the verifier.
    pub fn contract_spec(&self, verify: bool) -> ContractSpec {
        let spec = ContractSpec::new(self.contract_name(), verify);
        match *self {
            Self::Pccs { router } => spec.with_arg(router),
            Self::Quote { quote_verifier, mr_enclave, mr_signer } => spec
                .with_arg(DynSolValue::FixedBytes(mr_enclave, 32))
                .with_arg(DynSolValue::FixedBytes(mr_signer, 32))
                .with_arg(quote_verifier),
            Self::Mock => spec,
        }
    }
}

fn required<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<T, ConfigError>
where
    T::Err: fmt::Display,
{
    let value = lookup(name).filter(|v| !v.trim().is_empty()).ok_or(ConfigError::MissingEnv(name))?;
    value.trim().parse().map_err(|err: T::Err| ConfigError::InvalidEnv {
        name,
        value,
        reason: err.to_string(),
    })
}
