//! The closed set of datasets files can be delivered into.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// A named partition in the shared bucket. Only used to build the
/// `dataset=<name>` path segment of a destination key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dataset {
    Winistry,
    Sparkloft,
}

impl Dataset {
    pub const ALL: [Dataset; 2] = [Dataset::Winistry, Dataset::Sparkloft];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dataset::Winistry => "winistry",
            Dataset::Sparkloft => "sparkloft",
        }
    }

    /// Identifiers accepted on the command line, in declaration order.
    pub fn names() -> [&'static str; 2] {
        Self::ALL.map(|d| d.as_str())
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown dataset '{0}' (expected one of: winistry, sparkloft)")]
pub struct ParseDatasetError(pub String);

impl FromStr for Dataset {
    type Err = ParseDatasetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| ParseDatasetError(s.to_string()))
    }
}
