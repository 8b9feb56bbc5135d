//! Tie-break for equal versions holding different values

use std::fmt;

use serde::{Deserialize, Serialize};

/// What reconciliation does when both replicas hold a key at the same
/// version but with different values.
///
/// Two writers that both advanced from the same base version land here. The
/// version counter cannot order them, so the choice is a policy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EqualVersionPolicy {
    /// Write the local value to the remote replica
    #[default]
    LocalWins,
    /// Write the remote value to the local replica
    RemoteWins,
    /// Write nothing and report the key as a conflict
    Report,
}

impl EqualVersionPolicy {
    pub fn name(self) -> &'static str {
        match self {
            EqualVersionPolicy::LocalWins => "local_wins",
            EqualVersionPolicy::RemoteWins => "remote_wins",
            EqualVersionPolicy::Report => "report",
        }
    }
}

impl fmt::Display for EqualVersionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for EqualVersionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local_wins" => Ok(EqualVersionPolicy::LocalWins),
            "remote_wins" => Ok(EqualVersionPolicy::RemoteWins),
            "report" => Ok(EqualVersionPolicy::Report),
            other => Err(format!("unknown equal-version policy: {}", other)),
        }
    }
}
