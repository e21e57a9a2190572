//! Bounded receipt polling with exponential backoff.

use crate::ReceiptPollConfig;
use alloy_primitives::TxHash;
use rollup_deployer_providers::{ChainClient, CreationReceipt};
use std::time::Duration;
use tokio::time::Instant;

/// The deadline used when the maximum wait overflows the clock, roughly 30 years.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// Polls the receipt of a submitted transaction until it is available or the maximum wait is
/// exceeded.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ReceiptPoller {
    config: ReceiptPollConfig,
}

/// The receipt was not observed in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PollTimeout {
    /// The time spent polling.
    pub(crate) waited: Duration,
}

impl ReceiptPoller {
    /// Creates a new [`ReceiptPoller`].
    pub(crate) const fn new(config: ReceiptPollConfig) -> Self {
        Self { config }
    }

    /// Waits for the receipt of `tx_hash`.
    ///
    /// RPC errors while polling are logged and polled through: the transaction is already
    /// submitted and only the deadline ends the wait.
    pub(crate) async fn wait<C: ChainClient>(
        &self,
        client: &C,
        tx_hash: TxHash,
    ) -> Result<CreationReceipt, PollTimeout> {
        let start = Instant::now();
        let deadline =
            start.checked_add(self.config.max_wait).unwrap_or_else(|| start + FAR_FUTURE);
        let mut interval = self.config.initial_interval;
        let mut attempt: usize = 0;

        loop {
            attempt += 1;
            match tokio::time::timeout_at(deadline, client.transaction_receipt(tx_hash)).await {
                Ok(Ok(Some(receipt))) => return Ok(receipt),
                Ok(Ok(None)) => {
                    tracing::trace!(target: "rollup_deployer::deployer", %tx_hash, attempt, "Receipt not available yet");
                }
                Ok(Err(error)) => {
                    tracing::debug!(target: "rollup_deployer::deployer", %tx_hash, attempt, ?error, "Receipt poll failed");
                }
                Err(_) => return Err(PollTimeout { waited: start.elapsed() }),
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(PollTimeout { waited: now - start });
            }

            // Never sleep past the deadline, a last poll happens right at it.
            let wake = now.checked_add(interval).map_or(deadline, |wake| wake.min(deadline));
            tokio::time::sleep_until(wake).await;
            interval = interval.saturating_mul(2).min(self.config.max_interval);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Bytes;
    use rollup_deployer_providers::test_utils::MockChainClient;

    const CONFIG: ReceiptPollConfig = ReceiptPollConfig::new(
        Duration::from_millis(500),
        Duration::from_secs(8),
        Duration::from_secs(300),
    );

    #[tokio::test(start_paused = true)]
    async fn test_receipt_after_pending_polls() -> eyre::Result<()> {
        let client = MockChainClient::default().with_pending_polls(3);
        let hash = client.submit_creation(Bytes::from_static(&[0x60])).await?;

        let start = Instant::now();
        let receipt = ReceiptPoller::new(CONFIG).wait(&client, hash).await.expect("receipt");

        assert_eq!(receipt.transaction_hash, hash);
        assert_eq!(client.polls(hash), 4);
        // 500ms + 1s + 2s of backoff.
        assert_eq!(start.elapsed(), Duration::from_millis(3500));
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_through_rpc_errors() -> eyre::Result<()> {
        let client = MockChainClient::default().with_failing_polls(2);
        let hash = client.submit_creation(Bytes::from_static(&[0x60])).await?;

        let receipt = ReceiptPoller::new(CONFIG).wait(&client, hash).await.expect("receipt");

        assert!(receipt.success);
        assert_eq!(client.polls(hash), 3);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_unbounded_max_wait() -> eyre::Result<()> {
        let client = MockChainClient::default().with_pending_polls(2);
        let hash = client.submit_creation(Bytes::from_static(&[0x60])).await?;
        let config = ReceiptPollConfig::new(
            Duration::from_millis(500),
            Duration::MAX,
            Duration::from_secs(u64::MAX),
        );

        let receipt = ReceiptPoller::new(config).wait(&client, hash).await.expect("receipt");

        assert_eq!(receipt.transaction_hash, hash);
        assert_eq!(client.polls(hash), 3);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_at_max_wait() -> eyre::Result<()> {
        let client = MockChainClient::default().never_confirm();
        let hash = client.submit_creation(Bytes::from_static(&[0x60])).await?;

        let start = Instant::now();
        let timeout = ReceiptPoller::new(CONFIG).wait(&client, hash).await.unwrap_err();

        assert_eq!(timeout.waited, CONFIG.max_wait);
        assert_eq!(start.elapsed(), CONFIG.max_wait);
        // 500ms, 1s, 2s, 4s then 8s intervals, plus the final poll at the deadline.
        assert_eq!(client.polls(hash), 42);
        Ok(())
    }
}
