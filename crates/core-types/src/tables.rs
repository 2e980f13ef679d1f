use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row of the time-ordered order/revenue series (e.g. one day).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodAggregate {
    /// Label of the period, such as `"2024-05-01"`.
    pub period: String,
    pub order_count: u64,
    pub revenue: Decimal,
}

impl PeriodAggregate {
    /// Revenue per order; `None` for periods without orders.
    pub fn average_order_value(&self) -> Option<Decimal> {
        (self.order_count > 0).then(|| self.revenue / Decimal::from(self.order_count))
    }
}

/// One row of the per-customer aggregate table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerAggregate {
    pub user_id: u64,
    pub order_count: u64,
    pub total_spent: Decimal,
    pub last_order: DateTime<Utc>,
}

impl CustomerAggregate {
    pub fn average_order_value(&self) -> Option<Decimal> {
        (self.order_count > 0).then(|| self.total_spent / Decimal::from(self.order_count))
    }

    /// Whole days between the last order and `as_of`, never negative.
    pub fn recency_days(&self, as_of: DateTime<Utc>) -> i64 {
        (as_of - self.last_order).num_days().max(0)
    }
}

/// One row of the per-product aggregate table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductAggregate {
    pub product_id: String,
    pub name: String,
    pub order_count: u64,
    pub revenue: Decimal,
}
