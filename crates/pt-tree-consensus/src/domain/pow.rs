//! Proof-of-work engine
//!
//! A proof is the decimal string of a non-negative integer. It is valid
//! against a parent proof when `sha256_hex(previous_proof ++ proof)` ends in
//! a run of `difficulty` copies of the target character. The same predicate
//! serves both mining and chain validation.

use crate::config::PowConfig;
use crate::error::MiningError;
use crate::utils::sha256_hex;
use std::sync::atomic::{AtomicBool, Ordering};

/// How often the bounded search looks at its cancel flag
const CANCEL_CHECK_INTERVAL: u64 = 1024;

/// A successful search
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MinedProof {
    pub proof: String,
    /// Nonces tried, including the winning one
    pub iterations: u64,
}

/// Brute-force nonce search against a fixed difficulty predicate
#[derive(Clone, Debug)]
pub struct ProofOfWork {
    config: PowConfig,
    suffix: String,
}

impl ProofOfWork {
    /// Engine for the given predicate
    pub fn new(config: PowConfig) -> Self {
        let suffix = std::iter::repeat(config.target_char)
            .take(config.difficulty)
            .collect();
        Self { config, suffix }
    }

    /// Predicate parameters
    pub fn config(&self) -> &PowConfig {
        &self.config
    }

    /// Whether `proof` is a valid successor of `previous_proof`
    #[inline]
    pub fn valid_proof(&self, previous_proof: &str, proof: &str) -> bool {
        let mut guess = String::with_capacity(previous_proof.len() + proof.len());
        guess.push_str(previous_proof);
        guess.push_str(proof);
        sha256_hex(guess.as_bytes()).ends_with(&self.suffix)
    }

    /// Smallest `n >= 0` whose decimal string is a valid successor.
    ///
    /// Unbounded: loops until a proof is found. Use
    /// [`proof_of_work_bounded`](Self::proof_of_work_bounded) where the
    /// caller needs a limit or cancellation.
    pub fn proof_of_work(&self, previous_proof: &str) -> String {
        let mut nonce: u64 = 0;
        loop {
            let candidate = nonce.to_string();
            if self.valid_proof(previous_proof, &candidate) {
                return candidate;
            }
            nonce += 1;
        }
    }

    /// Same search as [`proof_of_work`](Self::proof_of_work), stopping after
    /// `max_iterations` nonces or once `cancel` is raised.
    #[tracing::instrument(skip(self, cancel), fields(difficulty = self.config.difficulty))]
    pub fn proof_of_work_bounded(
        &self,
        previous_proof: &str,
        max_iterations: Option<u64>,
        cancel: &AtomicBool,
    ) -> Result<MinedProof, MiningError> {
        let limit = max_iterations.unwrap_or(u64::MAX);
        let mut nonce: u64 = 0;

        while nonce < limit {
            if nonce % CANCEL_CHECK_INTERVAL == 0 && cancel.load(Ordering::Relaxed) {
                tracing::debug!(iterations = nonce, "proof-of-work search cancelled");
                return Err(MiningError::Cancelled { iterations: nonce });
            }

            let candidate = nonce.to_string();
            if self.valid_proof(previous_proof, &candidate) {
                tracing::debug!(proof = %candidate, "proof-of-work found");
                return Ok(MinedProof {
                    proof: candidate,
                    iterations: nonce + 1,
                });
            }
            nonce += 1;
        }

        tracing::warn!(iterations = limit, "proof-of-work search exhausted");
        Err(MiningError::Exhausted { iterations: limit })
    }
}

impl Default for ProofOfWork {
    fn default() -> Self {
        Self::new(PowConfig::default())
    }
}
