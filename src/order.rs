use crate::error::OrderError;

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;

/// Column layout of a body row.
const COL_PAY_TIME: usize = 0;
const COL_TX_TYPE: usize = 1;
const COL_PEER: usize = 2;
const COL_ITEM: usize = 3;
const COL_DIRECTION: usize = 4;
const COL_MONEY: usize = 5;
const COL_METHOD: usize = 6;
const COL_STATUS: usize = 7;
const COL_ORDER_ID: usize = 8;
const COL_MERCHANT_ORDER_ID: usize = 9;
const COL_NOTE: usize = 10;

const MIN_FIELDS: usize = 10;
const MAX_FIELDS: usize = 11;

const PAY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";
/// Bills are exported in China Standard Time.
const BILL_UTC_OFFSET: &str = "+0800";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub pay_time: DateTime<FixedOffset>,
    pub tx_type: TxType,
    pub tx_type_original: String,
    pub peer: String,
    pub item: String,
    pub direction: Direction,
    pub direction_original: String,
    pub money: Decimal,
    pub method: String,
    pub status: String,
    pub order_id: String,
    pub merchant_order_id: String,
    pub note: String,
}

/// 收/支 column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Income,
    Expense,
    Neutral,
}

impl FromStr for Direction {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "收入" => Ok(Direction::Income),
            "支出" => Ok(Direction::Expense),
            "/" => Ok(Direction::Neutral),
            other => Err(OrderError::InvalidDirection {
                value: other.to_string(),
            }),
        }
    }
}

/// 交易类型 column. Types the provider adds later land in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TxType {
    Consume,
    Lucky,
    Transfer,
    QrIncome,
    QrSend,
    Group,
    Refund,
    ChangeWithdraw,
    ChangeRecharge,
    Other(String),
}

impl From<&str> for TxType {
    fn from(s: &str) -> Self {
        match s {
            "商户消费" => TxType::Consume,
            "微信红包" => TxType::Lucky,
            "转账" => TxType::Transfer,
            "二维码收款" => TxType::QrIncome,
            "扫二维码付款" => TxType::QrSend,
            "群收款" => TxType::Group,
            "零钱提现" => TxType::ChangeWithdraw,
            "零钱充值" => TxType::ChangeRecharge,
            s if s.ends_with("退款") => TxType::Refund,
            other => TxType::Other(other.to_string()),
        }
    }
}

impl TryFrom<&[String]> for Order {
    type Error = OrderError;

    fn try_from(row: &[String]) -> Result<Self, Self::Error> {
        let fields = trim_trailing_empty(row);
        if !(MIN_FIELDS..=MAX_FIELDS).contains(&fields.len()) {
            return Err(OrderError::FieldCount { found: fields.len() });
        }

        let pay_time = parse_pay_time(required(fields, COL_PAY_TIME, "pay time")?)?;
        let tx_type_original = required(fields, COL_TX_TYPE, "transaction type")?;
        let direction_original = required(fields, COL_DIRECTION, "direction")?;
        let direction = direction_original.parse()?;
        let money = parse_money(required(fields, COL_MONEY, "amount")?)?;
        let status = required(fields, COL_STATUS, "status")?;
        let order_id = required(fields, COL_ORDER_ID, "order id")?;

        Ok(Order {
            pay_time,
            tx_type: TxType::from(tx_type_original),
            tx_type_original: tx_type_original.to_string(),
            peer: optional(fields, COL_PEER),
            item: optional(fields, COL_ITEM),
            direction,
            direction_original: direction_original.to_string(),
            money,
            method: optional(fields, COL_METHOD),
            status: status.to_string(),
            order_id: order_id.to_string(),
            merchant_order_id: optional(fields, COL_MERCHANT_ORDER_ID),
            note: optional(fields, COL_NOTE),
        })
    }
}

impl Order {
    /// Amount seen from the owner's side: expenses are negative.
    pub fn signed_amount(&self) -> Decimal {
        match self.direction {
            Direction::Expense => -self.money,
            Direction::Income | Direction::Neutral => self.money,
        }
    }
}

fn trim_trailing_empty(row: &[String]) -> &[String] {
    let mut end = row.len();
    while end > MAX_FIELDS && row[end - 1].trim().is_empty() {
        end -= 1;
    }
    &row[..end]
}

fn required<'a>(
    fields: &'a [String],
    idx: usize,
    field: &'static str,
) -> Result<&'a str, OrderError> {
    match fields.get(idx).map(|f| f.trim()) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(OrderError::MissingField { field }),
    }
}

fn optional(fields: &[String], idx: usize) -> String {
    fields
        .get(idx)
        .map(|f| f.trim().to_string())
        .unwrap_or_default()
}

fn parse_pay_time(value: &str) -> Result<DateTime<FixedOffset>, OrderError> {
    DateTime::parse_from_str(&format!("{value} {BILL_UTC_OFFSET}"), PAY_TIME_FORMAT).map_err(
        |e| OrderError::InvalidTime {
            value: value.to_string(),
            reason: e.to_string(),
        },
    )
}

fn parse_money(value: &str) -> Result<Decimal, OrderError> {
    let digits = value.trim_start_matches(['¥', '￥']).trim();
    match Decimal::from_str(digits) {
        Ok(amount) if amount >= Decimal::ZERO => Ok(amount),
        _ => Err(OrderError::InvalidAmount {
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
pub(crate) fn sample_row(pay_time: &str, direction: &str, money: &str) -> Vec<String> {
    [
        pay_time,
        "商户消费",
        "便利店",
        "矿泉水",
        direction,
        money,
        "零钱",
        "支付成功",
        "4200001234202001011234567890",
        "10001234",
        "/",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
