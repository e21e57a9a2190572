/// The max retries for the RPC provider.
pub const PROVIDER_MAX_RETRIES: u32 = 10;

/// The initial backoff for the RPC provider, in milliseconds.
pub const PROVIDER_INITIAL_BACKOFF: u64 = 100;

/// The default provider compute units per second.
pub const PROVIDER_COMPUTE_UNITS_PER_SECOND: u64 = 50;

/// The default Etherscan v2 API endpoint.
pub const DEFAULT_EXPLORER_API_URL: &str = "https://api.etherscan.io/v2/api";

/// The default name of the rollup contract.
pub const DEFAULT_ROLLUP_CONTRACT: &str = "EspressoRollup";

/// The environment variable holding the deployer private key.
pub const DEPLOYER_PRIVATE_KEY: &str = "DEPLOYER_PRIVATE_KEY";

/// The environment variable holding the RPC url.
pub const RPC_URL: &str = "RPC_URL";
