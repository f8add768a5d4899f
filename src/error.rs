use std::collections::BTreeMap;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("can't read bill: {0}")]
    Io(#[from] std::io::Error),

    #[error("can't read bill row: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Error)]
#[error("can't get bill owner from {identity:?} with config {mapping:?}")]
pub struct OwnerResolutionError {
    pub identity: String,
    pub mapping: BTreeMap<String, String>,
}

/// Why a single body row could not become an order.
#[derive(Debug, Error, PartialEq)]
pub enum OrderError {
    #[error("expected 10 or 11 fields, found {found}")]
    FieldCount { found: usize },

    #[error("missing required field {field}")]
    MissingField { field: &'static str },

    #[error("invalid pay time {value:?}: {reason}")]
    InvalidTime { value: String, reason: String },

    #[error("invalid amount {value:?}")]
    InvalidAmount { value: String },

    #[error("unknown direction {value:?}")]
    InvalidDirection { value: String },

    #[error("amount overflows the bill totals")]
    AmountOverflow,
}

#[derive(Debug, Error, PartialEq)]
#[error("line {line}: {source}")]
pub struct RowTranslationError {
    pub line: usize,
    #[source]
    pub source: OrderError,
}

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Owner(#[from] OwnerResolutionError),

    #[error("failed to translate bill: {0}")]
    Row(#[from] RowTranslationError),

    #[error("failed to translate bill: {}", join_rows(.0))]
    Rows(Vec<RowTranslationError>),
}

impl TranslateError {
    /// Line numbers of every row that failed translation, in input order.
    pub fn failed_lines(&self) -> Vec<usize> {
        match self {
            TranslateError::Row(err) => vec![err.line],
            TranslateError::Rows(errs) => errs.iter().map(|e| e.line).collect(),
            _ => Vec::new(),
        }
    }
}

fn join_rows(errs: &[RowTranslationError]) -> String {
    errs.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("can't load config: {0}")]
    Load(#[from] config::ConfigError),

    #[error("owner {owner:?} has an empty display name")]
    EmptyDisplayName { owner: String },

    #[error("owners {first:?} ({first_name:?}) and {second:?} ({second_name:?}) overlap")]
    OverlappingOwners {
        first: String,
        first_name: String,
        second: String,
        second_name: String,
    },
}
