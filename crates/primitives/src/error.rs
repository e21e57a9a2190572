/// An error in the configuration or environment, detected before any chain interaction.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("{0} not set")]
    MissingEnv(&'static str),
    /// An environment variable is set but can not be parsed.
    #[error("invalid value for {name}: {value:?} ({reason})")]
    InvalidEnv {
        /// The name of the variable.
        name: &'static str,
        /// The raw value.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },
    /// A config field still holds a template placeholder or is otherwise unparseable.
    #[error("config field `{field}` holds unresolved value {value:?}")]
    Placeholder {
        /// The config field.
        field: &'static str,
        /// The raw value found in the field.
        value: String,
    },
    /// The top level chain id differs from the one embedded in the chain config.
    #[error("chain id mismatch: config has {config}, chainConfig has {chain_config}")]
    ChainIdMismatch {
        /// The top level chain id.
        config: u64,
        /// The chain id found in the chain config JSON.
        chain_config: u64,
    },
    /// The embedded chain config is not valid JSON or lacks a numeric chain id.
    #[error("invalid chainConfig: {0}")]
    InvalidChainConfig(String),
    /// A config field failed a sanity check.
    #[error("invalid config field `{field}`: {reason}")]
    InvalidField {
        /// The config field.
        field: &'static str,
        /// Why the field was rejected.
        reason: &'static str,
    },
    /// The config file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// The config file is not valid JSON for the expected shape.
    #[error("failed to parse config file: {0}")]
    Json(#[from] serde_json::Error),
}

/// An error in the shape of a deployment plan.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    /// A constructor argument references a contract which has no deployment result at that
    /// point of the plan.
    #[error("{contract} references the address of {reference}, which is not deployed before it")]
    UnresolvedReference {
        /// The contract holding the reference.
        contract: String,
        /// The referenced contract.
        reference: String,
    },
    /// The same contract name appears twice in a plan.
    #[error("contract {0} appears more than once in the plan")]
    DuplicateContract(String),
}
