use crate::error::OrderError;
use crate::ir::{self, Ir};
use crate::order::{Direction, Order};
use crate::statistics::Statistics;

use rust_decimal::Decimal;

/// Folds orders into running statistics and builds the final snapshot.
#[derive(Debug, Default)]
pub struct Aggregator {
    statistics: Statistics,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    /// Folds one order in. On overflow nothing is changed.
    pub fn update(&mut self, order: &Order) -> Result<(), OrderError> {
        let stats = &mut self.statistics;

        let category_amount = stats
            .by_category
            .get(&order.tx_type_original)
            .map_or(Decimal::ZERO, |rollup| rollup.amount)
            .checked_add(order.signed_amount())
            .ok_or(OrderError::AmountOverflow)?;

        match order.direction {
            Direction::Income => record_income(stats, order.money)?,
            Direction::Expense => record_expense(stats, order.money)?,
            Direction::Neutral => stats.total_neutral_records += 1,
        }
        stats.parsed_items += 1;

        let rollup = stats
            .by_category
            .entry(order.tx_type_original.clone())
            .or_default();
        rollup.count += 1;
        rollup.amount = category_amount;

        *stats.by_status.entry(order.status.clone()).or_insert(0) += 1;

        if stats.start.map_or(true, |start| order.pay_time < start) {
            stats.start = Some(order.pay_time);
        }
        if stats.end.map_or(true, |end| order.pay_time > end) {
            stats.end = Some(order.pay_time);
        }
        Ok(())
    }

    /// Builds the snapshot. Depends only on its inputs.
    pub fn finalize(self, owner: Option<String>, orders: &[Order]) -> Ir {
        Ir {
            owner,
            orders: orders.iter().map(ir::Order::from).collect(),
            statistics: self.statistics,
        }
    }
}

pub fn record_income(stats: &mut Statistics, amount: Decimal) -> Result<(), OrderError> {
    stats.total_in_money = stats
        .total_in_money
        .checked_add(amount)
        .ok_or(OrderError::AmountOverflow)?;
    stats.total_in_records += 1;
    Ok(())
}

pub fn record_expense(stats: &mut Statistics, amount: Decimal) -> Result<(), OrderError> {
    stats.total_out_money = stats
        .total_out_money
        .checked_add(amount)
        .ok_or(OrderError::AmountOverflow)?;
    stats.total_out_records += 1;
    Ok(())
}
