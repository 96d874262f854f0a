use clap::ValueEnum;
use std::fmt::{Display, Formatter};

/// What the knowledge base does when a sentence count leaves `[0, |cells|]`
/// or a cell is asserted to be both a mine and safe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum ConsistencyPolicy {
    /// Abort the operation and return the fault to the caller.
    Strict,
    /// Clamp the count (or drop the conflicting mark), log a warning and
    /// carry on.
    Clamp,
}

impl Default for ConsistencyPolicy {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Strict
        } else {
            Self::Clamp
        }
    }
}

impl Display for ConsistencyPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::Clamp => write!(f, "clamp"),
        }
    }
}

/// Knobs for an [`Agent`](crate::agent::ai::Agent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AgentConfig {
    /// Fault handling inside the knowledge base.
    pub policy: ConsistencyPolicy,
    /// Seed for random moves; `None` seeds from the environment.
    pub seed: Option<u64>,
}

impl AgentConfig {
    #[must_use]
    pub const fn new(policy: ConsistencyPolicy, seed: Option<u64>) -> Self {
        Self { policy, seed }
    }

    /// Same config with a fixed seed.
    #[must_use]
    pub const fn with_seed(self, seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..self
        }
    }

    /// Same config with a different policy.
    #[must_use]
    pub const fn with_policy(self, policy: ConsistencyPolicy) -> Self {
        Self { policy, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(debug_assertions)]
    fn test_default_policy_is_strict_in_tests() {
        assert_eq!(ConsistencyPolicy::default(), ConsistencyPolicy::Strict);
    }

    #[test]
    fn test_builders() {
        let config = AgentConfig::default()
            .with_seed(7)
            .with_policy(ConsistencyPolicy::Clamp);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.policy, ConsistencyPolicy::Clamp);
    }

    #[test]
    fn test_policy_parses_from_cli_value() {
        assert_eq!(
            ConsistencyPolicy::from_str("clamp", true),
            Ok(ConsistencyPolicy::Clamp)
        );
        assert_eq!(ConsistencyPolicy::Strict.to_string(), "strict");
    }
}
