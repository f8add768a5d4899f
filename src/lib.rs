pub mod config;
pub mod diagnostics;
pub mod error;
pub mod ir;
pub mod order;
pub mod owner;
pub mod pipeline;
pub mod source;
pub mod statistics;

use crate::diagnostics::DiagnosticSink;
use crate::error::TranslateError;
use crate::ir::Ir;
use crate::owner::OwnerMapping;
use crate::pipeline::{ErrorPolicy, Pipeline};
use crate::source::CsvRowSource;
use std::path::Path;

/// Translates one exported WeChat bill into IR.
pub fn translate_file<D: DiagnosticSink>(
    path: impl AsRef<Path>,
    mapping: &OwnerMapping,
    policy: ErrorPolicy,
    sink: D,
) -> Result<Ir, TranslateError> {
    let mut source = CsvRowSource::open(path)?;

    Pipeline::new(mapping, sink)
        .with_policy(policy)
        .run(&mut source)
}
