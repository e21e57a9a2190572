use rollup_deployer_primitives::ConfigError;
use std::time::Duration;

/// The default first interval between two receipt polls.
pub const DEFAULT_INITIAL_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// The default cap on the interval between two receipt polls.
pub const DEFAULT_MAX_POLL_INTERVAL: Duration = Duration::from_secs(8);

/// The default maximum time spent waiting for a creation receipt.
pub const DEFAULT_MAX_CONFIRMATION_WAIT: Duration = Duration::from_secs(5 * 60);

/// The default timeout of a source verification.
pub const DEFAULT_VERIFICATION_TIMEOUT: Duration = Duration::from_secs(60);

/// The bounds of the receipt polling loop.
///
/// The interval starts at `initial_interval` and doubles after every empty poll, up to
/// `max_interval`. Polling stops once `max_wait` elapsed since the submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptPollConfig {
    /// The interval before the second poll.
    pub initial_interval: Duration,
    /// The cap on the interval.
    pub max_interval: Duration,
    /// The maximum total wait.
    pub max_wait: Duration,
}

impl Default for ReceiptPollConfig {
    fn default() -> Self {
        Self {
            initial_interval: DEFAULT_INITIAL_POLL_INTERVAL,
            max_interval: DEFAULT_MAX_POLL_INTERVAL,
            max_wait: DEFAULT_MAX_CONFIRMATION_WAIT,
        }
    }
}

impl ReceiptPollConfig {
    /// Creates a new [`ReceiptPollConfig`].
    pub const fn new(initial_interval: Duration, max_interval: Duration, max_wait: Duration) -> Self {
        Self { initial_interval, max_interval, max_wait }
    }

    /// Checks the intervals are positive and ordered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_interval.is_zero() {
            return Err(ConfigError::InvalidField {
                field: "receipt.initial-interval",
                reason: "must be positive",
            });
        }
        if self.max_interval.as_nanos() < self.initial_interval.as_nanos() {
            return Err(ConfigError::InvalidField {
                field: "receipt.max-interval",
                reason: "must not be below the initial interval",
            });
        }
        if self.max_wait.is_zero() {
            return Err(ConfigError::InvalidField {
                field: "receipt.max-wait",
                reason: "must be positive",
            });
        }
        Ok(())
    }
}

/// Runtime settings of the [`crate::Deployer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeployerConfig {
    /// The receipt polling bounds.
    pub receipt: ReceiptPollConfig,
    /// The maximum time a source verification may take before it is abandoned.
    pub verification_timeout: Duration,
}

impl Default for DeployerConfig {
    fn default() -> Self {
        Self {
            receipt: ReceiptPollConfig::default(),
            verification_timeout: DEFAULT_VERIFICATION_TIMEOUT,
        }
    }
}

impl DeployerConfig {
    /// Creates a new [`DeployerConfig`].
    pub const fn new(receipt: ReceiptPollConfig, verification_timeout: Duration) -> Self {
        Self { receipt, verification_timeout }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_receipt_config_is_valid() {
        assert!(ReceiptPollConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_receipt_config_rejected() {
        let second = Duration::from_secs(1);

        let zero_interval = ReceiptPollConfig::new(Duration::ZERO, second, second);
        assert!(matches!(
            zero_interval.validate(),
            Err(ConfigError::InvalidField { field: "receipt.initial-interval", .. })
        ));

        let inverted = ReceiptPollConfig::new(second * 2, second, second);
        assert!(matches!(
            inverted.validate(),
            Err(ConfigError::InvalidField { field: "receipt.max-interval", .. })
        ));

        let zero_wait = ReceiptPollConfig::new(second, second, Duration::ZERO);
        assert!(matches!(
            zero_wait.validate(),
            Err(ConfigError::InvalidField { field: "receipt.max-wait", .. })
        ));
    }
}
