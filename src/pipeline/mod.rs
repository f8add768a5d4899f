pub mod aggregator;
pub mod parser;

#[cfg(test)]
mod unit_tests;

use serde::Deserialize;

pub use aggregator::Aggregator;
pub use parser::{Phase, Pipeline, PREAMBLE_ROWS};

/// What a run does when a body row fails translation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorPolicy {
    /// Abort on the first bad row.
    #[default]
    FailFast,
    /// Read every row, then fail with all bad rows if there were any.
    CollectAll,
}
