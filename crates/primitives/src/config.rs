use crate::{ConfigError, ConstructorArg, ContractSpec};
use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, B256, U256};
use serde::Deserialize;
use std::{fmt, path::Path, str::FromStr};

/// The max data size passed to the rollup contract: 90% of Geth's 128KB tx size limit, leaving
/// ~13KB for proving.
pub const MAX_DATA_SIZE: u64 = 104857;

/// The window within which the sequencer inbox accepts delayed and future messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxTimeVariation {
    /// Max blocks a delayed message can wait.
    pub delay_blocks: u64,
    /// Max blocks a message may be ahead of the L1 head.
    pub future_blocks: u64,
    /// Max seconds a delayed message can wait.
    pub delay_seconds: u64,
    /// Max seconds a message may be ahead of the L1 head.
    pub future_seconds: u64,
}

/// The validated configuration of the rollup to deploy.
///
/// Only [`RollupConfig::load`] and [`RollupConfig::from_json`] produce a value, so holding a
/// [`RollupConfig`] means the pre-flight checks passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollupConfig {
    /// Blocks before an assertion can be confirmed.
    pub confirm_period_blocks: u64,
    /// Extra blocks added to the challenge period.
    pub extra_challenge_time_blocks: u64,
    /// The token used for staking. Zero means the native currency.
    pub stake_token: Address,
    /// The base stake in wei.
    pub base_stake: U256,
    /// The WASM module root of the initial machine.
    pub wasm_module_root: B256,
    /// The rollup owner.
    pub owner: Address,
    /// The escrow that receives losing stakes.
    pub loser_stake_escrow: Address,
    /// The rollup chain id.
    pub chain_id: u64,
    /// The chain config JSON blob, passed verbatim to the contract.
    pub chain_config: String,
    /// The genesis block number.
    pub genesis_block_num: u64,
    /// The sequencer inbox time variation bounds.
    pub sequencer_inbox_max_time_variation: MaxTimeVariation,
    /// An already deployed TEE verifier. When unset, the verifier deployed by the same plan is
    /// used.
    pub espresso_tee_verifier: Option<Address>,
    /// The validator allow-list.
    pub validators: Vec<Address>,
    /// The batch poster allow-list.
    pub batch_posters: Vec<Address>,
    /// The batch poster manager.
    pub batch_poster_manager: Address,
}

impl RollupConfig {
    /// Loads and validates the rollup config at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parses and validates a rollup config from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let file: RollupConfigFile = serde_json::from_str(json)?;
        Self::try_from(file)
    }

    /// Returns the chain id embedded in the chain config JSON blob.
    pub fn embedded_chain_id(&self) -> Result<u64, ConfigError> {
        embedded_chain_id(&self.chain_config)
    }

    /// Returns the rollup `Config` struct argument, using `verifier` as the TEE verifier
    /// address.
    pub fn config_arg(&self, verifier: impl Into<ConstructorArg>) -> ConstructorArg {
        let variation = &self.sequencer_inbox_max_time_variation;
        ConstructorArg::Tuple(vec![
            uint(self.confirm_period_blocks).into(),
            uint(self.extra_challenge_time_blocks).into(),
            self.stake_token.into(),
            DynSolValue::Uint(self.base_stake, 256).into(),
            DynSolValue::FixedBytes(self.wasm_module_root, 32).into(),
            self.owner.into(),
            self.loser_stake_escrow.into(),
            uint(self.chain_id).into(),
            DynSolValue::String(self.chain_config.clone()).into(),
            uint(self.genesis_block_num).into(),
            DynSolValue::Tuple(vec![
                uint(variation.delay_blocks),
                uint(variation.future_blocks),
                uint(variation.delay_seconds),
                uint(variation.future_seconds),
            ])
            .into(),
            verifier.into(),
        ])
    }

    /// Returns the [`ContractSpec`] of the rollup contract `name`, constructed with
    /// `(config, validators, batchPosters, batchPosterManager, maxDataSize)`.
    pub fn contract_spec(
        &self,
        name: impl Into<String>,
        verifier: impl Into<ConstructorArg>,
        verify: bool,
    ) -> ContractSpec {
        ContractSpec::new(name, verify)
            .with_arg(self.config_arg(verifier))
            .with_arg(addresses(&self.validators))
            .with_arg(addresses(&self.batch_posters))
            .with_arg(self.batch_poster_manager)
            .with_arg(uint(MAX_DATA_SIZE))
    }
}

fn addresses(addresses: &[Address]) -> DynSolValue {
    DynSolValue::Array(addresses.iter().copied().map(DynSolValue::Address).collect())
}

fn uint(value: u64) -> DynSolValue {
    DynSolValue::Uint(U256::from(value), 256)
}

/// A number that may be written as a JSON number or as a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(u64),
    String(String),
}

impl fmt::Display for NumberOrString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

/// The on-disk form of the rollup config. Every value is kept raw so that template
/// placeholders surface as [`ConfigError::Placeholder`] rather than as a parse error.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RollupConfigFile {
    rollup_config: RawRollupConfig,
    validators: Vec<String>,
    batch_posters: Vec<String>,
    batch_poster_manager: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRollupConfig {
    confirm_period_blocks: NumberOrString,
    extra_challenge_time_blocks: NumberOrString,
    stake_token: String,
    base_stake: NumberOrString,
    wasm_module_root: String,
    owner: String,
    loser_stake_escrow: String,
    chain_id: NumberOrString,
    chain_config: String,
    genesis_block_num: NumberOrString,
    sequencer_inbox_max_time_variation: RawMaxTimeVariation,
    #[serde(rename = "espressoTEEVerifier", default)]
    espresso_tee_verifier: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMaxTimeVariation {
    delay_blocks: NumberOrString,
    future_blocks: NumberOrString,
    delay_seconds: NumberOrString,
    future_seconds: NumberOrString,
}

impl TryFrom<RollupConfigFile> for RollupConfig {
    type Error = ConfigError;

    fn try_from(file: RollupConfigFile) -> Result<Self, Self::Error> {
        let raw = file.rollup_config;
        let variation = raw.sequencer_inbox_max_time_variation;

        let config = Self {
            confirm_period_blocks: parse_u64("confirmPeriodBlocks", &raw.confirm_period_blocks)?,
            extra_challenge_time_blocks: parse_u64(
                "extraChallengeTimeBlocks",
                &raw.extra_challenge_time_blocks,
            )?,
            stake_token: parse("stakeToken", &raw.stake_token)?,
            base_stake: parse("baseStake", &raw.base_stake.to_string())?,
            wasm_module_root: parse("wasmModuleRoot", &raw.wasm_module_root)?,
            owner: parse("owner", &raw.owner)?,
            loser_stake_escrow: parse("loserStakeEscrow", &raw.loser_stake_escrow)?,
            chain_id: parse_u64("chainId", &raw.chain_id)?,
            chain_config: raw.chain_config,
            genesis_block_num: parse_u64("genesisBlockNum", &raw.genesis_block_num)?,
            sequencer_inbox_max_time_variation: MaxTimeVariation {
                delay_blocks: parse_u64("delayBlocks", &variation.delay_blocks)?,
                future_blocks: parse_u64("futureBlocks", &variation.future_blocks)?,
                delay_seconds: parse_u64("delaySeconds", &variation.delay_seconds)?,
                future_seconds: parse_u64("futureSeconds", &variation.future_seconds)?,
            },
            espresso_tee_verifier: raw
                .espresso_tee_verifier
                .map(|v| parse("espressoTEEVerifier", &v))
                .transpose()?,
            validators: file
                .validators
                .iter()
                .map(|v| parse("validators", v))
                .collect::<Result<_, _>>()?,
            batch_posters: file
                .batch_posters
                .iter()
                .map(|v| parse("batchPosters", v))
                .collect::<Result<_, _>>()?,
            batch_poster_manager: parse("batchPosterManager", &file.batch_poster_manager)?,
        };

        config.validate()?;
        Ok(config)
    }
}

impl RollupConfig {
    /// Runs the cross-field checks of the pre-flight validation.
    fn validate(&self) -> Result<(), ConfigError> {
        let embedded = self.embedded_chain_id()?;
        if embedded != self.chain_id {
            return Err(ConfigError::ChainIdMismatch {
                config: self.chain_id,
                chain_config: embedded,
            });
        }

        if let Some(initial_owner) = initial_chain_owner(&self.chain_config)? {
            if initial_owner != self.owner {
                tracing::warn!(target: "rollup_deployer::config", %initial_owner, owner = %self.owner, "InitialChainOwner differs from the rollup owner");
            }
        }

        if self.owner.is_zero() {
            return Err(ConfigError::InvalidField { field: "owner", reason: "must not be zero" });
        }
        if self.confirm_period_blocks == 0 {
            return Err(ConfigError::InvalidField {
                field: "confirmPeriodBlocks",
                reason: "must be positive",
            });
        }
        if self.validators.is_empty() {
            tracing::warn!(target: "rollup_deployer::config", "No validators configured");
        }
        if self.batch_posters.is_empty() {
            tracing::warn!(target: "rollup_deployer::config", "No batch posters configured");
        }

        Ok(())
    }
}

fn parse<T: FromStr>(field: &'static str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Placeholder { field, value: value.to_string() })
}

fn parse_u64(field: &'static str, value: &NumberOrString) -> Result<u64, ConfigError> {
    match value {
        NumberOrString::Number(n) => Ok(*n),
        NumberOrString::String(s) => parse(field, s),
    }
}

fn parse_chain_config(chain_config: &str) -> Result<serde_json::Value, ConfigError> {
    serde_json::from_str(chain_config).map_err(|err| ConfigError::InvalidChainConfig(err.to_string()))
}

fn embedded_chain_id(chain_config: &str) -> Result<u64, ConfigError> {
    parse_chain_config(chain_config)?
        .get("chainId")
        .and_then(serde_json::Value::as_u64)
        .ok_or_else(|| ConfigError::InvalidChainConfig("missing numeric chainId".to_string()))
}

fn initial_chain_owner(chain_config: &str) -> Result<Option<Address>, ConfigError> {
    let value = parse_chain_config(chain_config)?;
    value
        .get("arbitrum")
        .and_then(|arbitrum| arbitrum.get("InitialChainOwner"))
        .and_then(serde_json::Value::as_str)
        .map(|owner| parse("chainConfig.arbitrum.InitialChainOwner", owner))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    const CHAIN_CONFIG: &str = r#"{"chainId": 71717100,"homesteadBlock":0,"daoForkBlock":null,"daoForkSupport":true,"eip150Block":0,"eip150Hash":"0x0000000000000000000000000000000000000000000000000000000000000000","eip155Block":0,"eip158Block":0,"byzantiumBlock":0,"constantinopleBlock":0,"petersburgBlock":0,"istanbulBlock":0,"muirGlacierBlock":0,"berlinBlock":0,"londonBlock":0,"clique":{"period":0,"epoch":0},"arbitrum":{"EnableArbOS":true,"EnableEspresso":true,"AllowDebugPrecompiles":false,"DataAvailabilityCommittee":false,"InitialArbOSVersion":10,"InitialChainOwner":"0xdaFE88244735b360F26Ab97cA560853866E302E4","GenesisBlockNum":0}}"#;

    fn config_json(chain_id: &str, chain_config: &str, owner: &str) -> String {
        serde_json::json!({
            "rollupConfig": {
                "confirmPeriodBlocks": 1,
                "extraChallengeTimeBlocks": "1",
                "stakeToken": "0x0000000000000000000000000000000000000000",
                "baseStake": "10000000000000000",
                "wasmModuleRoot": "0x184884e1eb9fefdc158f6c8ac912bb183bf3cf83f0090317e0bc4ac5860baa39",
                "owner": owner,
                "loserStakeEscrow": "0x0000000000000000000000000000000000000000",
                "chainId": chain_id,
                "chainConfig": chain_config,
                "genesisBlockNum": 0,
                "sequencerInboxMaxTimeVariation": {
                    "delayBlocks": 5760,
                    "futureBlocks": 12,
                    "delaySeconds": 86400,
                    "futureSeconds": 3600
                },
                "espressoTEEVerifier": "0x8354db765810dF8F24f1477B06e91E5b17a408bF"
            },
            "validators": ["0x57Ef5309de3c5433cEbFA644b3302c2b6e2d5C10"],
            "batchPosters": ["0x651f519C4B2d02084E8Ee0848cd91e4E794C95e7"],
            "batchPosterManager": "0x651f519C4B2d02084E8Ee0848cd91e4E794C95e7"
        })
        .to_string()
    }

    const OWNER: &str = "0xdaFE88244735b360F26Ab97cA560853866E302E4";

    #[test]
    fn test_valid_config() -> eyre::Result<()> {
        let config = RollupConfig::from_json(&config_json("71717100", CHAIN_CONFIG, OWNER))?;

        assert_eq!(config.chain_id, 71717100);
        assert_eq!(config.owner, address!("0xdaFE88244735b360F26Ab97cA560853866E302E4"));
        assert_eq!(config.base_stake, U256::from(10_000_000_000_000_000u64));
        assert_eq!(config.sequencer_inbox_max_time_variation.delay_blocks, 5760);
        assert_eq!(
            config.espresso_tee_verifier,
            Some(address!("0x8354db765810dF8F24f1477B06e91E5b17a408bF"))
        );
        assert_eq!(config.validators.len(), 1);
        Ok(())
    }

    #[test]
    fn test_chain_id_mismatch() {
        let chain_config = CHAIN_CONFIG.replace("\"chainId\": 71717100", "\"chainId\": 1");
        let err = RollupConfig::from_json(&config_json("71717100", &chain_config, OWNER)).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ChainIdMismatch { config: 71717100, chain_config: 1 }
        ));
    }

    #[test]
    fn test_template_placeholders_rejected() {
        let err = RollupConfig::from_json(&config_json("71717100", CHAIN_CONFIG, "OWNER_ADDRESS"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Placeholder { field: "owner", .. }));

        let err = RollupConfig::from_json(&config_json("YOUR_CHAIN_ID", CHAIN_CONFIG, OWNER))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Placeholder { field: "chainId", .. }));
    }

    #[test]
    fn test_template_chain_config_rejected() {
        let chain_config = CHAIN_CONFIG.replace("\"chainId\": 71717100", "\"chainId\":YOUR_CHAIN_ID");
        let err = RollupConfig::from_json(&config_json("71717100", &chain_config, OWNER)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidChainConfig(_)));
    }

    #[test]
    fn test_zero_owner_rejected() {
        let chain_config = CHAIN_CONFIG.replace(
            "0xdaFE88244735b360F26Ab97cA560853866E302E4",
            "0x0000000000000000000000000000000000000000",
        );
        let err = RollupConfig::from_json(&config_json(
            "71717100",
            &chain_config,
            "0x0000000000000000000000000000000000000000",
        ))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidField { field: "owner", .. }));
    }

    fn with_field(json: &str, pointer: &str, value: serde_json::Value) -> String {
        let mut config: serde_json::Value = serde_json::from_str(json).expect("valid json");
        *config.pointer_mut(pointer).expect("field exists") = value;
        config.to_string()
    }

    fn example_path(file: &str) -> std::path::PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../..").join(file)
    }

    #[test]
    fn test_initial_chain_owner_placeholder_rejected() {
        let chain_config = CHAIN_CONFIG.replace(OWNER, "AN_OWNED_ADDRESS");
        let err = RollupConfig::from_json(&config_json("71717100", &chain_config, OWNER)).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Placeholder { field: "chainConfig.arbitrum.InitialChainOwner", .. }
        ));
    }

    #[test]
    fn test_differing_initial_chain_owner_accepted() -> eyre::Result<()> {
        let chain_config =
            CHAIN_CONFIG.replace(OWNER, "0x57Ef5309de3c5433cEbFA644b3302c2b6e2d5C10");
        let config = RollupConfig::from_json(&config_json("71717100", &chain_config, OWNER))?;
        assert_eq!(config.owner, address!("0xdaFE88244735b360F26Ab97cA560853866E302E4"));
        Ok(())
    }

    #[test]
    fn test_zero_confirm_period_rejected() {
        let json = with_field(
            &config_json("71717100", CHAIN_CONFIG, OWNER),
            "/rollupConfig/confirmPeriodBlocks",
            serde_json::json!(0),
        );
        let err = RollupConfig::from_json(&json).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidField { field: "confirmPeriodBlocks", .. }));
    }

    #[test]
    fn test_empty_allow_lists_accepted() -> eyre::Result<()> {
        let json = config_json("71717100", CHAIN_CONFIG, OWNER);
        let json = with_field(&json, "/validators", serde_json::json!([]));
        let json = with_field(&json, "/batchPosters", serde_json::json!([]));

        let config = RollupConfig::from_json(&json)?;
        assert!(config.validators.is_empty());
        assert!(config.batch_posters.is_empty());
        Ok(())
    }

    #[test]
    fn test_load_example_config() -> eyre::Result<()> {
        let config = RollupConfig::load(example_path("config.example.json"))?;

        assert_eq!(config.chain_id, 71717100);
        assert_eq!(config.embedded_chain_id()?, 71717100);
        assert_eq!(config.owner, address!("0xdaFE88244735b360F26Ab97cA560853866E302E4"));
        assert_eq!(config.base_stake, U256::from(10_000_000_000_000_000u64));
        assert_eq!(config.batch_poster_manager, config.batch_posters[0]);
        Ok(())
    }

    #[test]
    fn test_load_template_config_rejected() {
        let err = RollupConfig::load(example_path("config.template.json")).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Placeholder { .. } | ConfigError::InvalidChainConfig(_)
        ));
    }

    #[test]
    fn test_rollup_contract_spec() -> eyre::Result<()> {
        let config = RollupConfig::from_json(&config_json("71717100", CHAIN_CONFIG, OWNER))?;

        let spec = config.contract_spec(
            "EspressoRollup",
            ConstructorArg::address_of("EspressoTEEVerifier"),
            true,
        );

        assert_eq!(spec.constructor_args.len(), 5);
        assert_eq!(spec.references(), vec!["EspressoTEEVerifier"]);
        let ConstructorArg::Tuple(fields) = &spec.constructor_args[0] else {
            panic!("expected tuple");
        };
        assert_eq!(fields.len(), 12);
        assert_eq!(fields[7], DynSolValue::Uint(U256::from(71717100u64), 256).into());
        assert_eq!(
            spec.constructor_args[4],
            DynSolValue::Uint(U256::from(MAX_DATA_SIZE), 256).into()
        );
        Ok(())
    }
}
