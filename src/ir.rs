//! Provider-agnostic ledger snapshot handed to renderers.

use crate::order::{self, Direction};
use crate::statistics::Statistics;

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

pub const SOURCE: &str = "微信支付";
pub const CURRENCY: &str = "CNY";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ir {
    pub owner: Option<String>,
    pub orders: Vec<Order>,
    pub statistics: Statistics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OrderType {
    Send,
    Recv,
    Unknown,
}

impl From<Direction> for OrderType {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Income => OrderType::Recv,
            Direction::Expense => OrderType::Send,
            Direction::Neutral => OrderType::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub order_type: OrderType,
    pub type_original: String,
    pub peer: String,
    pub item: String,
    pub category: String,
    pub method: String,
    pub pay_time: DateTime<FixedOffset>,
    pub money: Decimal,
    pub currency: String,
    pub order_id: String,
    pub merchant_order_id: String,
    pub note: String,
    pub status: String,
    pub metadata: BTreeMap<String, String>,
}

impl From<&order::Order> for Order {
    fn from(o: &order::Order) -> Self {
        let metadata = BTreeMap::from([
            ("source".to_string(), SOURCE.to_string()),
            ("status".to_string(), o.status.clone()),
            ("orderId".to_string(), o.order_id.clone()),
            ("merchantId".to_string(), o.merchant_order_id.clone()),
            ("type".to_string(), o.tx_type_original.clone()),
            ("method".to_string(), o.method.clone()),
        ]);

        Order {
            order_type: o.direction.into(),
            type_original: o.direction_original.clone(),
            peer: o.peer.clone(),
            item: o.item.clone(),
            category: o.tx_type_original.clone(),
            method: o.method.clone(),
            pay_time: o.pay_time,
            money: o.money,
            currency: CURRENCY.to_string(),
            order_id: o.order_id.clone(),
            merchant_order_id: o.merchant_order_id.clone(),
            note: o.note.clone(),
            status: o.status.clone(),
            metadata,
        }
    }
}
