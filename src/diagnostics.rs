use log::{info, warn};

/// Receives progress notices from a translation run. Notices are
/// informational only and never change the outcome of the run.
pub trait DiagnosticSink {
    fn owner_resolved(&mut self, owner: &str);

    fn owner_unset(&mut self) {}

    fn finished(&mut self, rows: usize, orders: usize);
}

impl<D: DiagnosticSink + ?Sized> DiagnosticSink for &mut D {
    fn owner_resolved(&mut self, owner: &str) {
        (**self).owner_resolved(owner)
    }

    fn owner_unset(&mut self) {
        (**self).owner_unset()
    }

    fn finished(&mut self, rows: usize, orders: usize) {
        (**self).finished(rows, orders)
    }
}

/// Forwards notices to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn owner_resolved(&mut self, owner: &str) {
        info!("Wechat bill with owner {}", owner);
    }

    fn owner_unset(&mut self) {
        warn!("Wechat bill ended before the owner line");
    }

    fn finished(&mut self, rows: usize, orders: usize) {
        info!("Finished parsing {} rows into {} orders", rows, orders);
    }
}

/// Discards every notice.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn owner_resolved(&mut self, _owner: &str) {}

    fn finished(&mut self, _rows: usize, _orders: usize) {}
}
