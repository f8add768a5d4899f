use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Statistics {
    pub parsed_items: usize,
    pub start: Option<DateTime<FixedOffset>>,
    pub end: Option<DateTime<FixedOffset>>,
    pub total_in_records: usize,
    pub total_in_money: Decimal,
    pub total_out_records: usize,
    pub total_out_money: Decimal,
    pub total_neutral_records: usize,
    pub by_category: BTreeMap<String, Rollup>,
    pub by_status: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Rollup {
    pub count: usize,
    pub amount: Decimal,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Income minus expenses over every parsed order.
    pub fn net(&self) -> Decimal {
        self.total_in_money - self.total_out_money
    }

    pub fn is_valid(&self) -> bool {
        let records =
            self.total_in_records + self.total_out_records + self.total_neutral_records;
        let category_records: usize = self.by_category.values().map(|r| r.count).sum();
        let status_records: usize = self.by_status.values().sum();

        records == self.parsed_items
            && category_records == self.parsed_items
            && status_records == self.parsed_items
    }
}
