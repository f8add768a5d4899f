use crate::diagnostics::DiagnosticSink;
use crate::error::{RowTranslationError, TranslateError};
use crate::ir::Ir;
use crate::order::Order;
use crate::owner::OwnerMapping;
use crate::pipeline::{Aggregator, ErrorPolicy};
use crate::source::{RawRow, RowSource};

/// Rows 1..=17 of a WeChat export are the metadata block and column header.
pub const PREAMBLE_ROWS: usize = 17;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    Preamble,
    Body,
    Done,
    Failed,
}

/// State of one translation run. Consumed by [`Pipeline::run`], so it can
/// never be reused for a second bill.
pub struct Pipeline<'a, D> {
    mapping: &'a OwnerMapping,
    policy: ErrorPolicy,
    sink: D,
    phase: Phase,
    line_num: usize,
    owner: Option<String>,
    orders: Vec<Order>,
    aggregator: Aggregator,
    row_errors: Vec<RowTranslationError>,
}

impl<'a, D: DiagnosticSink> Pipeline<'a, D> {
    pub fn new(mapping: &'a OwnerMapping, sink: D) -> Self {
        Self {
            mapping,
            policy: ErrorPolicy::default(),
            sink,
            phase: Phase::Init,
            line_num: 0,
            owner: None,
            orders: Vec::new(),
            aggregator: Aggregator::new(),
            row_errors: Vec::new(),
        }
    }

    pub fn with_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn run<S: RowSource>(mut self, source: &mut S) -> Result<Ir, TranslateError> {
        loop {
            let row = match source.next_row() {
                Ok(Some(row)) => row,
                Ok(None) => break,
                Err(e) => {
                    self.phase = Phase::Failed;
                    return Err(e.into());
                }
            };
            self.dispatch(row)?;
        }

        self.finish()
    }

    pub(crate) fn dispatch(&mut self, row: RawRow) -> Result<(), TranslateError> {
        let result = self.step(row);
        if result.is_err() {
            self.phase = Phase::Failed;
        }
        result
    }

    fn step(&mut self, row: RawRow) -> Result<(), TranslateError> {
        self.line_num += 1;

        if self.line_num == 1 {
            self.resolve_owner(&row)?;
        }

        if self.line_num <= PREAMBLE_ROWS {
            self.phase = Phase::Preamble;
            return Ok(());
        }

        self.phase = Phase::Body;
        let translated = Order::try_from(row.as_slice()).and_then(|order| {
            self.aggregator.update(&order)?;
            Ok(order)
        });
        match translated {
            Ok(order) => {
                self.orders.push(order);
                Ok(())
            }
            Err(source) => {
                let err = RowTranslationError {
                    line: self.line_num,
                    source,
                };
                match self.policy {
                    ErrorPolicy::FailFast => Err(err.into()),
                    ErrorPolicy::CollectAll => {
                        self.row_errors.push(err);
                        Ok(())
                    }
                }
            }
        }
    }

    fn resolve_owner(&mut self, row: &[String]) -> Result<(), TranslateError> {
        if self.owner.is_some() {
            return Ok(());
        }

        let identity = row.first().map(String::as_str).unwrap_or_default();
        let owner = self.mapping.resolve(identity)?;
        self.sink.owner_resolved(owner);
        self.owner = Some(owner.to_string());
        Ok(())
    }

    pub(crate) fn finish(mut self) -> Result<Ir, TranslateError> {
        if !self.row_errors.is_empty() {
            return Err(TranslateError::Rows(self.row_errors));
        }

        self.phase = Phase::Done;
        if self.owner.is_none() {
            self.sink.owner_unset();
        }
        self.sink.finished(self.line_num, self.orders.len());

        Ok(self.aggregator.finalize(self.owner, &self.orders))
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn line_num(&self) -> usize {
        self.line_num
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }
}
