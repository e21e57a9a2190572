use crate::{
    ChainClient, ChainError, CreationReceipt, VerificationError, VerificationRequest,
};
use alloy_primitives::{keccak256, Address, Bytes, TxHash};
use alloy_transport::TransportErrorKind;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

/// The address used as signer by default in [`MockChainClient`].
pub const MOCK_SIGNER: Address = Address::new([0x11; 20]);

#[derive(Debug, Default)]
struct MockState {
    /// Submission attempts, rejected ones included.
    attempts: usize,
    /// Creation payloads in submission order.
    submissions: Vec<Bytes>,
    /// The nonce of each submitted transaction.
    nonces: HashMap<TxHash, u64>,
    /// The next nonce of the signer.
    nonce: u64,
    /// Receipt polls per transaction.
    polls: HashMap<TxHash, usize>,
    /// Verification requests received.
    verifications: Vec<VerificationRequest>,
}

/// A scripted in-memory [`ChainClient`].
///
/// Contracts are "deployed" at the CREATE address of the signer and nonce. Failures can be
/// injected per submission, receipts can be delayed or withheld and verification can be made to
/// fail.
#[derive(Debug)]
pub struct MockChainClient {
    signer: Address,
    state: Mutex<MockState>,
    /// 1-based submission attempts that are rejected.
    rejected_submissions: HashSet<usize>,
    /// The number of polls returning no receipt before the receipt is available.
    pending_polls: usize,
    /// The number of polls failing with an RPC error before the receipt is available.
    failing_polls: usize,
    /// Whether receipts are never returned.
    never_confirm: bool,
    /// Whether receipts report a reverted creation.
    revert: bool,
    /// Whether verification always fails.
    failing_verification: bool,
}

impl Default for MockChainClient {
    fn default() -> Self {
        Self::new(MOCK_SIGNER)
    }
}

impl MockChainClient {
    /// Returns a new [`MockChainClient`] signing with `signer`.
    pub fn new(signer: Address) -> Self {
        Self {
            signer,
            state: Mutex::new(MockState::default()),
            rejected_submissions: HashSet::new(),
            pending_polls: 0,
            failing_polls: 0,
            never_confirm: false,
            revert: false,
            failing_verification: false,
        }
    }

    /// Rejects the `n`-th submission attempt (1-based).
    pub fn reject_submission(mut self, n: usize) -> Self {
        self.rejected_submissions.insert(n);
        self
    }

    /// Returns no receipt for the first `polls` polls of each transaction.
    pub const fn with_pending_polls(mut self, polls: usize) -> Self {
        self.pending_polls = polls;
        self
    }

    /// Fails the first `polls` polls of each transaction with an RPC error.
    pub const fn with_failing_polls(mut self, polls: usize) -> Self {
        self.failing_polls = polls;
        self
    }

    /// Never returns a receipt.
    pub const fn never_confirm(mut self) -> Self {
        self.never_confirm = true;
        self
    }

    /// Returns receipts with a failed status.
    pub const fn reverting(mut self) -> Self {
        self.revert = true;
        self
    }

    /// Fails every verification request.
    pub const fn failing_verification(mut self) -> Self {
        self.failing_verification = true;
        self
    }

    /// Returns the number of submission attempts, rejected ones included.
    pub fn submission_attempts(&self) -> usize {
        self.state.lock().attempts
    }

    /// Returns the accepted creation payloads in submission order.
    pub fn submissions(&self) -> Vec<Bytes> {
        self.state.lock().submissions.clone()
    }

    /// Returns the verification requests received.
    pub fn verifications(&self) -> Vec<VerificationRequest> {
        self.state.lock().verifications.clone()
    }

    /// Returns the number of receipt polls of the transaction.
    pub fn polls(&self, hash: TxHash) -> usize {
        self.state.lock().polls.get(&hash).copied().unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl ChainClient for MockChainClient {
    fn signer(&self) -> Address {
        self.signer
    }

    async fn submit_creation(&self, code: Bytes) -> Result<TxHash, ChainError> {
        let mut state = self.state.lock();
        state.attempts += 1;
        let attempt = state.attempts;
        if self.rejected_submissions.contains(&attempt) {
            let reason = format!("insufficient funds (attempt {attempt})");
            return Err(TransportErrorKind::custom_str(&reason).into());
        }

        let nonce = state.nonce;
        state.nonce += 1;
        let hash = keccak256([&code[..], &nonce.to_be_bytes()[..]].concat());
        state.nonces.insert(hash, nonce);
        state.submissions.push(code);
        Ok(hash)
    }

    async fn transaction_receipt(
        &self,
        hash: TxHash,
    ) -> Result<Option<CreationReceipt>, ChainError> {
        let mut state = self.state.lock();
        let Some(nonce) = state.nonces.get(&hash).copied() else { return Ok(None) };
        let polls = state.polls.entry(hash).or_default();
        *polls += 1;
        let polls = *polls;

        if polls <= self.failing_polls {
            return Err(TransportErrorKind::custom_str("connection reset").into());
        }
        if self.never_confirm || polls <= self.failing_polls + self.pending_polls {
            return Ok(None);
        }

        Ok(Some(CreationReceipt {
            transaction_hash: hash,
            block_number: Some(nonce + 1),
            success: !self.revert,
            contract_address: (!self.revert).then(|| self.signer.create(nonce)),
        }))
    }

    async fn verify_source(&self, request: VerificationRequest) -> Result<(), VerificationError> {
        self.state.lock().verifications.push(request);
        if self.failing_verification {
            return Err(VerificationError::Rejected("Fail - Unable to verify".to_string()));
        }
        Ok(())
    }
}
