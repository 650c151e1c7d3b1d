use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Three-way outcome of a malware scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Clean,
    Infected,
    /// Engine missing, errored or timed out
    Unavailable,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Clean => f.write_str("clean"),
            Verdict::Infected => f.write_str("infected"),
            Verdict::Unavailable => f.write_str("unavailable"),
        }
    }
}

/// Verdict plus the scanner's diagnostic text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ScanOutcome {
    pub verdict: Verdict,
    pub detail: String,
}

impl ScanOutcome {
    pub fn clean(detail: impl Into<String>) -> Self {
        Self {
            verdict: Verdict::Clean,
            detail: detail.into(),
        }
    }

    pub fn infected(detail: impl Into<String>) -> Self {
        Self {
            verdict: Verdict::Infected,
            detail: detail.into(),
        }
    }

    pub fn unavailable(detail: impl Into<String>) -> Self {
        Self {
            verdict: Verdict::Unavailable,
            detail: detail.into(),
        }
    }
}
