use chrono::{DateTime, Utc};
use configuration::SegmentationPolicy;
use core_types::{CustomerAggregate, SegmentLabel};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// RFM view of one customer, recomputed on every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSegmentRecord {
    pub user_id: u64,
    pub recency_days: i64,
    pub frequency: u64,
    pub monetary: Decimal,
    pub segment: SegmentLabel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChurnRisk {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChurnBuckets {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl ChurnBuckets {
    pub fn total(&self) -> usize {
        self.high + self.medium + self.low
    }

    /// Share of customers in the high bucket, `0` for an empty base.
    pub fn high_rate(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.high as f64 / total as f64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentationSummary {
    pub total_customers: usize,
    pub records: Vec<CustomerSegmentRecord>,
    pub segment_counts: BTreeMap<SegmentLabel, usize>,
    pub churn: ChurnBuckets,
    /// Mean of the per-customer average order values.
    pub average_order_value: Option<f64>,
    /// Mean orders per customer.
    pub average_frequency: Option<f64>,
}

impl SegmentationSummary {
    pub fn count(&self, segment: SegmentLabel) -> usize {
        self.segment_counts.get(&segment).copied().unwrap_or(0)
    }

    /// Fraction of customers in `segment`; `0` for an empty base.
    pub fn share(&self, segment: SegmentLabel) -> f64 {
        if self.total_customers == 0 {
            return 0.0;
        }
        self.count(segment) as f64 / self.total_customers as f64
    }
}

/// Assigns the RFM segment. Rules are checked in order: VIP, Loyal, At Risk,
/// New, then Regular.
pub fn classify(
    frequency: u64,
    monetary: Decimal,
    recency_days: i64,
    policy: &SegmentationPolicy,
) -> SegmentLabel {
    let meets = |rule: &configuration::SegmentRule| {
        frequency >= rule.min_orders
            && monetary >= rule.min_spent
            && recency_days <= rule.max_recency_days
    };

    if meets(&policy.vip) {
        SegmentLabel::Vip
    } else if meets(&policy.loyal) {
        SegmentLabel::Loyal
    } else if recency_days > policy.at_risk_after_days {
        SegmentLabel::AtRisk
    } else if frequency == policy.new_customer_orders {
        SegmentLabel::New
    } else {
        SegmentLabel::Regular
    }
}

pub fn churn_risk(recency_days: i64, policy: &SegmentationPolicy) -> ChurnRisk {
    if recency_days > policy.churn_high_after_days {
        ChurnRisk::High
    } else if recency_days > policy.churn_medium_after_days {
        ChurnRisk::Medium
    } else {
        ChurnRisk::Low
    }
}

/// `None` when there are no customers.
pub fn segment_customers(
    customers: &[CustomerAggregate],
    as_of: DateTime<Utc>,
    policy: &SegmentationPolicy,
) -> Option<SegmentationSummary> {
    if customers.is_empty() {
        return None;
    }

    let mut segment_counts = BTreeMap::new();
    let mut churn = ChurnBuckets::default();
    let mut records = Vec::with_capacity(customers.len());

    for customer in customers {
        let recency_days = customer.recency_days(as_of);
        let segment = classify(customer.order_count, customer.total_spent, recency_days, policy);
        *segment_counts.entry(segment).or_insert(0) += 1;

        match churn_risk(recency_days, policy) {
            ChurnRisk::High => churn.high += 1,
            ChurnRisk::Medium => churn.medium += 1,
            ChurnRisk::Low => churn.low += 1,
        }

        records.push(CustomerSegmentRecord {
            user_id: customer.user_id,
            recency_days,
            frequency: customer.order_count,
            monetary: customer.total_spent,
            segment,
        });
    }

    let order_values: Vec<f64> = customers
        .iter()
        .filter_map(|c| c.average_order_value().and_then(|v| v.to_f64()))
        .collect();
    let average_order_value = (!order_values.is_empty())
        .then(|| order_values.iter().sum::<f64>() / order_values.len() as f64);
    let average_frequency = Some(
        customers.iter().map(|c| c.order_count as f64).sum::<f64>() / customers.len() as f64,
    );

    tracing::debug!(
        customers = customers.len(),
        churn_high = churn.high,
        "Customer base segmented."
    );

    Some(SegmentationSummary {
        total_customers: customers.len(),
        records,
        segment_counts,
        churn,
        average_order_value,
        average_frequency,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 30, 0, 0, 0).unwrap()
    }

    fn customer(id: u64, orders: u64, spent: Decimal, days_ago: i64) -> CustomerAggregate {
        CustomerAggregate {
            user_id: id,
            order_count: orders,
            total_spent: spent,
            last_order: as_of() - Duration::days(days_ago),
        }
    }

    #[test]
    fn rfm_rules_apply_in_order() {
        let policy = SegmentationPolicy::default();
        assert_eq!(classify(12, dec!(1500), 10, &policy), SegmentLabel::Vip);
        // Misses VIP on recency only.
        assert_eq!(classify(12, dec!(1500), 45, &policy), SegmentLabel::Loyal);
        assert_eq!(classify(6, dec!(600), 60, &policy), SegmentLabel::Loyal);
        assert_eq!(classify(6, dec!(600), 61, &policy), SegmentLabel::Regular);
        assert_eq!(classify(1, dec!(20), 120, &policy), SegmentLabel::AtRisk);
        assert_eq!(classify(1, dec!(20), 5, &policy), SegmentLabel::New);
        assert_eq!(classify(3, dec!(90), 20, &policy), SegmentLabel::Regular);
    }

    #[test]
    fn churn_bucket_boundaries() {
        let policy = SegmentationPolicy::default();
        assert_eq!(churn_risk(60, &policy), ChurnRisk::Low);
        assert_eq!(churn_risk(61, &policy), ChurnRisk::Medium);
        assert_eq!(churn_risk(90, &policy), ChurnRisk::Medium);
        assert_eq!(churn_risk(91, &policy), ChurnRisk::High);
    }

    #[test]
    fn summary_counts_and_averages() {
        let customers = [
            customer(1, 12, dec!(1200), 3),
            customer(2, 1, dec!(50), 10),
            customer(3, 2, dec!(100), 100),
            customer(4, 5, dec!(250), 70),
        ];
        let summary = segment_customers(&customers, as_of(), &SegmentationPolicy::default()).unwrap();

        assert_eq!(summary.total_customers, 4);
        assert_eq!(summary.count(SegmentLabel::Vip), 1);
        assert_eq!(summary.count(SegmentLabel::New), 1);
        assert_eq!(summary.count(SegmentLabel::AtRisk), 1);
        assert_eq!(summary.count(SegmentLabel::Regular), 1);
        assert_eq!(summary.share(SegmentLabel::Vip), 0.25);
        assert_eq!(summary.churn, ChurnBuckets { high: 1, medium: 1, low: 2 });
        assert_eq!(summary.average_order_value, Some(62.5));
        assert_eq!(summary.average_frequency, Some(5.0));
    }

    #[test]
    fn no_customers_means_no_segmentation() {
        assert!(segment_customers(&[], as_of(), &SegmentationPolicy::default()).is_none());
    }
}
