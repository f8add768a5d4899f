use crate::diagnostics::{DiagnosticSink, NullSink};
use crate::error::{OrderError, SourceError, TranslateError};
use crate::order::sample_row;
use crate::owner::OwnerMapping;
use crate::pipeline::{ErrorPolicy, Phase, Pipeline, PREAMBLE_ROWS};
use crate::source::{MemoryRowSource, RawRow, RowSource};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

fn mapping(pairs: &[(&str, &str)]) -> OwnerMapping {
    let owners: BTreeMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    OwnerMapping::new(owners).unwrap()
}

fn owner_row(nickname: &str) -> RawRow {
    vec![format!("微信昵称：{}", nickname)]
}

/// Owner line plus filler up to the end of the preamble.
fn preamble(nickname: &str) -> Vec<RawRow> {
    let mut rows = vec![owner_row(nickname)];
    for i in 2..=PREAMBLE_ROWS {
        rows.push(vec![format!("preamble {}", i), String::new()]);
    }
    rows
}

fn body_row(minute: u32) -> RawRow {
    sample_row(&format!("2020-01-01 12:{:02}:00", minute), "支出", "¥1.00")
}

fn broken_row() -> RawRow {
    let mut row = body_row(0);
    row[7] = String::new();
    row
}

#[derive(Default)]
struct RecordingSink {
    owners: Vec<String>,
    unset: usize,
    finished: Option<(usize, usize)>,
}

impl DiagnosticSink for RecordingSink {
    fn owner_resolved(&mut self, owner: &str) {
        self.owners.push(owner.to_string());
    }

    fn owner_unset(&mut self) {
        self.unset += 1;
    }

    fn finished(&mut self, rows: usize, orders: usize) {
        self.finished = Some((rows, orders));
    }
}

struct FailingSource {
    rows: MemoryRowSource,
    reads: usize,
}

impl RowSource for FailingSource {
    fn next_row(&mut self) -> Result<Option<RawRow>, SourceError> {
        self.reads += 1;
        match self.rows.next_row()? {
            Some(row) => Ok(Some(row)),
            None => Err(SourceError::Io(std::io::Error::other("disk gone"))),
        }
    }
}

#[cfg(test)]
mod preamble_tests {
    use super::*;

    #[test]
    fn test_preamble_length_is_seventeen() {
        assert_eq!(PREAMBLE_ROWS, 17);
    }

    #[test]
    fn test_row_seventeen_is_preamble_and_eighteen_is_body() {
        let owners = mapping(&[("alice", "Alice")]);
        let mut pipeline = Pipeline::new(&owners, NullSink);
        assert_eq!(pipeline.phase(), Phase::Init);

        for row in preamble("Alice") {
            pipeline.dispatch(row).unwrap();
        }
        assert_eq!(pipeline.line_num(), 17);
        assert_eq!(pipeline.phase(), Phase::Preamble);
        assert!(pipeline.orders().is_empty());

        pipeline.dispatch(body_row(0)).unwrap();
        assert_eq!(pipeline.line_num(), 18);
        assert_eq!(pipeline.phase(), Phase::Body);
        assert_eq!(pipeline.orders().len(), 1);
    }

    #[test]
    fn test_short_input_has_no_orders() {
        let owners = mapping(&[("alice", "Alice")]);
        let mut rows = preamble("Alice");
        rows.truncate(9);

        let ir = Pipeline::new(&owners, NullSink)
            .run(&mut MemoryRowSource::new(rows))
            .unwrap();

        assert_eq!(ir.owner.as_deref(), Some("alice"));
        assert!(ir.orders.is_empty());
        assert_eq!(ir.statistics.parsed_items, 0);
    }

    #[test]
    fn test_preamble_rows_are_not_translated() {
        let owners = mapping(&[("alice", "Alice")]);
        let mut rows = vec![owner_row("Alice")];
        rows.extend((2..=PREAMBLE_ROWS).map(|_| vec!["garbage".to_string()]));

        let ir = Pipeline::new(&owners, NullSink)
            .run(&mut MemoryRowSource::new(rows))
            .unwrap();
        assert!(ir.orders.is_empty());
    }
}

#[cfg(test)]
mod owner_tests {
    use super::*;

    #[test]
    fn test_owner_resolved_once_from_first_row() {
        let owners = mapping(&[("alice", "Alice"), ("bob", "Bob")]);
        let mut sink = RecordingSink::default();
        let mut rows = preamble("Alice");
        rows[1] = owner_row("Bob");

        let ir = Pipeline::new(&owners, &mut sink)
            .run(&mut MemoryRowSource::new(rows))
            .unwrap();

        assert_eq!(ir.owner.as_deref(), Some("alice"));
        assert_eq!(sink.owners, vec!["alice".to_string()]);
        assert_eq!(sink.unset, 0);
    }

    #[test]
    fn test_owner_only_inspects_first_field() {
        let owners = mapping(&[("alice", "Alice")]);
        let rows = vec![vec!["微信昵称：Bob".to_string(), "Alice".to_string()]];

        let result = Pipeline::new(&owners, NullSink).run(&mut MemoryRowSource::new(rows));
        assert!(matches!(result, Err(TranslateError::Owner(_))));
    }

    #[test]
    fn test_owner_mismatch_stops_reading() {
        let owners = mapping(&[("bob", "Bob")]);
        let mut pipeline = Pipeline::new(&owners, NullSink);

        let err = pipeline.dispatch(owner_row("Alice")).unwrap_err();
        match err {
            TranslateError::Owner(e) => {
                assert!(e.mapping.contains_key("bob"));
                assert!(e.to_string().contains("Bob"));
            }
            other => panic!("Expected owner error, got {:?}", other),
        }
        assert_eq!(pipeline.phase(), Phase::Failed);
        assert_eq!(pipeline.owner(), None);
        assert!(pipeline.orders().is_empty());
    }

    #[test]
    fn test_empty_first_row_fails_resolution() {
        let owners = mapping(&[("alice", "Alice")]);
        let result =
            Pipeline::new(&owners, NullSink).run(&mut MemoryRowSource::new(vec![Vec::new()]));

        assert!(matches!(result, Err(TranslateError::Owner(_))));
    }

    #[test]
    fn test_zero_rows_leave_owner_unset() {
        let owners = mapping(&[("alice", "Alice")]);
        let mut sink = RecordingSink::default();

        let ir = Pipeline::new(&owners, &mut sink)
            .run(&mut MemoryRowSource::new(Vec::new()))
            .unwrap();

        assert_eq!(ir.owner, None);
        assert!(ir.orders.is_empty());
        assert_eq!(ir.statistics, Default::default());
        assert_eq!(sink.unset, 1);
        assert_eq!(sink.finished, Some((0, 0)));
    }
}

#[cfg(test)]
mod body_tests {
    use super::*;

    #[test]
    fn test_orders_preserve_input_order() {
        let owners = mapping(&[("alice", "Alice")]);
        let mut rows = preamble("Alice");
        rows.extend((0..5).rev().map(body_row));
        let mut sink = RecordingSink::default();

        let ir = Pipeline::new(&owners, &mut sink)
            .run(&mut MemoryRowSource::new(rows))
            .unwrap();

        let minutes: Vec<_> = ir
            .orders
            .iter()
            .map(|o| o.pay_time.format("%M").to_string())
            .collect();
        assert_eq!(minutes, vec!["04", "03", "02", "01", "00"]);
        assert_eq!(ir.statistics.total_out_money, Decimal::from(5));
        assert_eq!(sink.finished, Some((22, 5)));
    }

    #[test]
    fn test_rerun_is_identical() {
        let owners = mapping(&[("alice", "Alice")]);
        let mut rows = preamble("Alice");
        rows.extend((0..3).map(body_row));

        let first = Pipeline::new(&owners, NullSink)
            .run(&mut MemoryRowSource::new(rows.clone()))
            .unwrap();
        let second = Pipeline::new(&owners, NullSink)
            .run(&mut MemoryRowSource::new(rows))
            .unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_bad_row_fails_fast_with_line_number() {
        let owners = mapping(&[("alice", "Alice")]);
        let mut pipeline = Pipeline::new(&owners, NullSink);
        for row in preamble("Alice") {
            pipeline.dispatch(row).unwrap();
        }
        pipeline.dispatch(body_row(0)).unwrap();

        let err = pipeline.dispatch(broken_row()).unwrap_err();
        match &err {
            TranslateError::Row(e) => {
                assert_eq!(e.line, 19);
                assert_eq!(e.source, OrderError::MissingField { field: "status" });
            }
            other => panic!("Expected row error, got {:?}", other),
        }
        assert!(err.to_string().contains("line 19"));
        assert_eq!(pipeline.phase(), Phase::Failed);
        assert_eq!(pipeline.orders().len(), 1);
    }

    #[test]
    fn test_amount_overflow_is_a_row_error() {
        let owners = mapping(&[("alice", "Alice")]);
        let mut pipeline = Pipeline::new(&owners, NullSink);
        for row in preamble("Alice") {
            pipeline.dispatch(row).unwrap();
        }
        pipeline
            .dispatch(sample_row(
                "2020-01-01 12:00:00",
                "收入",
                "¥79228162514264337593543950335",
            ))
            .unwrap();

        let err = pipeline
            .dispatch(sample_row("2020-01-01 12:01:00", "收入", "¥1"))
            .unwrap_err();

        match &err {
            TranslateError::Row(e) => {
                assert_eq!(e.line, 19);
                assert_eq!(e.source, OrderError::AmountOverflow);
            }
            other => panic!("Expected row error, got {:?}", other),
        }
        assert_eq!(pipeline.phase(), Phase::Failed);
        assert_eq!(pipeline.orders().len(), 1);
    }

    #[test]
    fn test_amount_overflow_through_run() {
        let owners = mapping(&[("alice", "Alice")]);
        let mut rows = preamble("Alice");
        rows.push(sample_row(
            "2020-01-01 12:00:00",
            "支出",
            "¥79228162514264337593543950335",
        ));
        rows.push(sample_row("2020-01-01 12:01:00", "支出", "¥1"));

        let result = Pipeline::new(&owners, NullSink).run(&mut MemoryRowSource::new(rows));

        assert_eq!(result.unwrap_err().failed_lines(), vec![19]);
    }

    #[test]
    fn test_fail_fast_stops_reading() {
        let owners = mapping(&[("alice", "Alice")]);
        let mut rows = preamble("Alice");
        rows.push(broken_row());
        rows.push(body_row(1));
        let mut source = FailingSource {
            rows: MemoryRowSource::new(rows),
            reads: 0,
        };

        let result = Pipeline::new(&owners, NullSink).run(&mut source);

        assert_eq!(result.unwrap_err().failed_lines(), vec![18]);
        assert_eq!(source.reads, 18);
    }

    #[test]
    fn test_collect_all_reports_every_bad_row() {
        let owners = mapping(&[("alice", "Alice")]);
        let mut rows = preamble("Alice");
        rows.push(broken_row());
        rows.push(body_row(1));
        rows.push(vec!["short".to_string()]);

        let err = Pipeline::new(&owners, NullSink)
            .with_policy(ErrorPolicy::CollectAll)
            .run(&mut MemoryRowSource::new(rows))
            .unwrap_err();

        assert_eq!(err.failed_lines(), vec![18, 20]);
        let message = err.to_string();
        assert!(message.contains("line 18"));
        assert!(message.contains("line 20"));
    }

    #[test]
    fn test_collect_all_succeeds_on_clean_input() {
        let owners = mapping(&[("alice", "Alice")]);
        let mut rows = preamble("Alice");
        rows.push(body_row(1));

        let ir = Pipeline::new(&owners, NullSink)
            .with_policy(ErrorPolicy::CollectAll)
            .run(&mut MemoryRowSource::new(rows))
            .unwrap();
        assert_eq!(ir.orders.len(), 1);
    }

    #[test]
    fn test_source_error_aborts_run() {
        let owners = mapping(&[("alice", "Alice")]);
        let mut source = FailingSource {
            rows: MemoryRowSource::new(preamble("Alice")),
            reads: 0,
        };

        let result = Pipeline::new(&owners, NullSink).run(&mut source);
        assert!(matches!(result, Err(TranslateError::Source(_))));
    }
}
