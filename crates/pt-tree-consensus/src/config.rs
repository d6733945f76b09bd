//! Configuration types for the tree-consensus engine

use crate::domain::{GENESIS_CONTENT, GENESIS_TIMESTAMP};
use crate::error::{TreeError, TreeResult};
use serde::Deserialize;

/// Longest suffix a SHA-256 hex digest can satisfy
pub const MAX_DIFFICULTY: usize = 64;

/// Runtime configuration for a block tree node
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TreeConfig {
    /// Root block parameters
    pub genesis: GenesisConfig,

    /// Proof-of-work predicate
    pub pow: PowConfig,

    /// Mining limits
    pub mining: MiningConfig,
}

impl TreeConfig {
    /// Parse a TOML document; missing sections fall back to defaults
    pub fn from_toml_str(source: &str) -> TreeResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| TreeError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no digest could ever satisfy
    pub fn validate(&self) -> TreeResult<()> {
        self.pow.validate()?;
        if self.mining.max_iterations == Some(0) {
            return Err(TreeError::InvalidConfig(
                "mining.max_iterations must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Root block parameters.
///
/// Nodes only accept each other's chains when these match.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GenesisConfig {
    /// Root timestamp in unix millis
    pub timestamp: u64,

    /// Root post content
    pub content: String,
}

impl Default for GenesisConfig {
    fn default() -> Self {
        Self {
            timestamp: GENESIS_TIMESTAMP,
            content: GENESIS_CONTENT.to_string(),
        }
    }
}

/// Proof-of-work predicate: the digest of `previous_proof ++ proof` must end
/// in `difficulty` copies of `target_char`.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PowConfig {
    /// Length of the required trailing run (default: 4)
    pub difficulty: usize,

    /// Character of the trailing run (default: '0')
    pub target_char: char,
}

impl Default for PowConfig {
    fn default() -> Self {
        Self {
            difficulty: 4,
            target_char: '0',
        }
    }
}

impl PowConfig {
    /// Config with a custom difficulty and the default target character
    pub fn with_difficulty(difficulty: usize) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }

    /// Check the predicate is satisfiable by lowercase hex digests
    pub fn validate(&self) -> TreeResult<()> {
        if self.difficulty == 0 || self.difficulty > MAX_DIFFICULTY {
            return Err(TreeError::InvalidConfig(format!(
                "pow.difficulty must be within 1..={MAX_DIFFICULTY}, got {}",
                self.difficulty
            )));
        }
        if !matches!(self.target_char, '0'..='9' | 'a'..='f') {
            return Err(TreeError::InvalidConfig(format!(
                "pow.target_char must be a lowercase hex digit, got {:?}",
                self.target_char
            )));
        }
        Ok(())
    }
}

/// Mining limits used by the service
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MiningConfig {
    /// Nonces tried before a search gives up (`None` = unbounded)
    pub max_iterations: Option<u64>,

    /// Re-mining attempts when the tip moves during a search
    pub max_retries: u32,
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            max_iterations: Some(50_000_000),
            max_retries: 3,
        }
    }
}
