//! Destination key layout.
//!
//! Every object delivered in one run lands under
//! `delivery/dataset=<dataset>/status=staged/delivery-date=<YYYY-MM-DD>/`.
//! The delivery date is captured once per invocation by the caller and
//! reused for every prefix, so a run crossing midnight stays in one partition.

use crate::dataset::Dataset;
use chrono::NaiveDate;
use std::fmt;

/// Key prefix for one dataset and delivery date. Always ends with a single `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPrefix(String);

impl KeyPrefix {
    pub fn new(dataset: Dataset, delivery_date: NaiveDate) -> Self {
        KeyPrefix(format!(
            "delivery/dataset={}/status=staged/delivery-date={}/",
            dataset,
            delivery_date.format("%Y-%m-%d")
        ))
    }

    /// Appends an object name to the prefix. A leading `./` or `/` on the name
    /// is dropped so the key never contains a double slash.
    ///
    /// Leading dots that are part of the name are kept: `.env` is keyed
    /// `<prefix>.env`, not `<prefix>env`.
    pub fn key_for(&self, name: &str) -> String {
        let name = name.strip_prefix("./").unwrap_or(name).trim_start_matches('/');
        format!("{}{}", self.0, name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeyPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
