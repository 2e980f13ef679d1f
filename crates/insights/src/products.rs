use analytics::math;
use configuration::ProductPolicy;
use core_types::ProductAggregate;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PerformanceCategory {
    Star,
    #[serde(rename = "Cash Cow")]
    CashCow,
    #[serde(rename = "Question Mark")]
    QuestionMark,
    Dog,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPerformance {
    pub product_id: String,
    pub name: String,
    pub order_count: u64,
    pub revenue: f64,
    pub category: PerformanceCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConcentrationPoint {
    pub rank: usize,
    pub product_id: String,
    pub revenue: f64,
    pub cumulative_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueConcentration {
    /// Products by revenue, highest first, with the running share of revenue.
    pub curve: Vec<ConcentrationPoint>,
    /// First (1-based) rank whose cumulative share reaches the Pareto share.
    pub pareto_rank: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MixConcentration {
    #[serde(rename = "Very Even")]
    VeryEven,
    Even,
    Moderate,
    Uneven,
    #[serde(rename = "Very Uneven")]
    VeryUneven,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Diversity {
    High,
    Moderate,
    Low,
}

/// How orders spread over the catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductMix {
    pub unique_products: usize,
    pub units_sold: u64,
    /// Gini index of the order counts, 0 for a perfectly even mix.
    pub gini_index: f64,
    pub concentration: MixConcentration,
    /// Shannon entropy of the order shares, in bits.
    pub entropy: f64,
    /// Entropy over its maximum `log2(n)`; `None` with a single product.
    pub normalized_entropy: Option<f64>,
    pub diversity: Diversity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductAnalysis {
    pub median_revenue: f64,
    pub median_order_count: f64,
    pub performance_matrix: Vec<ProductPerformance>,
    pub concentration: RevenueConcentration,
    /// `None` when no product has an order.
    pub mix: Option<ProductMix>,
}

impl ProductAnalysis {
    pub fn in_category(&self, category: PerformanceCategory) -> impl Iterator<Item = &ProductPerformance> {
        self.performance_matrix.iter().filter(move |p| p.category == category)
    }
}

fn median(values: impl Iterator<Item = f64>) -> f64 {
    let mut sorted: Vec<f64> = values.collect();
    sorted.sort_by(f64::total_cmp);
    math::median_of_sorted(&sorted)
}

fn categorize(revenue: f64, orders: f64, median_revenue: f64, median_orders: f64) -> PerformanceCategory {
    match (revenue >= median_revenue, orders >= median_orders) {
        (true, true) => PerformanceCategory::Star,
        (true, false) => PerformanceCategory::CashCow,
        (false, true) => PerformanceCategory::QuestionMark,
        (false, false) => PerformanceCategory::Dog,
    }
}

fn concentration(products: &[ProductAggregate], pareto_share_pct: f64) -> RevenueConcentration {
    let mut ranked: Vec<(&ProductAggregate, f64)> = products
        .iter()
        .map(|p| (p, p.revenue.to_f64().unwrap_or(0.0)))
        .collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    let total: f64 = ranked.iter().map(|(_, revenue)| revenue).sum();
    let mut cumulative = 0.0;
    let mut pareto_rank = None;
    let curve = ranked
        .into_iter()
        .enumerate()
        .map(|(i, (product, revenue))| {
            cumulative += revenue;
            let cumulative_percentage = if total > 0.0 { cumulative / total * 100.0 } else { 0.0 };
            if pareto_rank.is_none() && total > 0.0 && cumulative_percentage >= pareto_share_pct {
                pareto_rank = Some(i + 1);
            }
            ConcentrationPoint {
                rank: i + 1,
                product_id: product.product_id.clone(),
                revenue,
                cumulative_percentage,
            }
        })
        .collect();

    RevenueConcentration { curve, pareto_rank }
}

/// Gini index of non-negative counts: `2·Σ i·v_i / (n·Σv) - (n+1)/n` over the
/// ascending values with 1-based `i`. `None` when the counts sum to zero.
pub fn gini_index(counts: &[u64]) -> Option<f64> {
    let total: u64 = counts.iter().sum();
    if total == 0 {
        return None;
    }
    let mut sorted = counts.to_vec();
    sorted.sort_unstable();

    let n = sorted.len() as f64;
    let weighted: f64 = sorted
        .iter()
        .enumerate()
        .map(|(i, &count)| (i + 1) as f64 * count as f64)
        .sum();
    Some(2.0 * weighted / (n * total as f64) - (n + 1.0) / n)
}

/// Shannon entropy (bits) of the shares of `counts`. Zero counts add nothing.
pub fn shannon_entropy(counts: &[u64]) -> Option<f64> {
    let total: u64 = counts.iter().sum();
    if total == 0 {
        return None;
    }
    let entropy = counts
        .iter()
        .filter(|&&count| count > 0)
        .map(|&count| {
            let share = count as f64 / total as f64;
            -share * share.log2()
        })
        .sum::<f64>();
    Some(entropy.max(0.0))
}

fn mix_concentration(gini: f64, bands: &[f64; 4]) -> MixConcentration {
    match bands.iter().position(|&upper| gini < upper) {
        Some(0) => MixConcentration::VeryEven,
        Some(1) => MixConcentration::Even,
        Some(2) => MixConcentration::Moderate,
        Some(_) => MixConcentration::Uneven,
        None => MixConcentration::VeryUneven,
    }
}

/// Gini and entropy view of the order counts.
pub fn product_mix(products: &[ProductAggregate], policy: &ProductPolicy) -> Option<ProductMix> {
    let counts: Vec<u64> = products.iter().map(|p| p.order_count).collect();
    let gini = gini_index(&counts)?;
    let entropy = shannon_entropy(&counts)?;

    let normalized_entropy = (counts.len() > 1).then(|| entropy / (counts.len() as f64).log2());
    let diversity = match normalized_entropy {
        Some(h) if h > policy.high_diversity => Diversity::High,
        Some(h) if h > policy.moderate_diversity => Diversity::Moderate,
        _ => Diversity::Low,
    };

    Some(ProductMix {
        unique_products: counts.len(),
        units_sold: counts.iter().sum(),
        gini_index: gini,
        concentration: mix_concentration(gini, &policy.gini_bands),
        entropy,
        normalized_entropy,
        diversity,
    })
}

/// Performance matrix, revenue concentration and product mix; `None` without products.
pub fn analyze(products: &[ProductAggregate], policy: &ProductPolicy) -> Option<ProductAnalysis> {
    if products.is_empty() {
        return None;
    }

    let median_revenue = median(products.iter().map(|p| p.revenue.to_f64().unwrap_or(0.0)));
    let median_order_count = median(products.iter().map(|p| p.order_count as f64));

    let performance_matrix = products
        .iter()
        .map(|p| {
            let revenue = p.revenue.to_f64().unwrap_or(0.0);
            ProductPerformance {
                product_id: p.product_id.clone(),
                name: p.name.clone(),
                order_count: p.order_count,
                revenue,
                category: categorize(revenue, p.order_count as f64, median_revenue, median_order_count),
            }
        })
        .collect();

    Some(ProductAnalysis {
        median_revenue,
        median_order_count,
        performance_matrix,
        concentration: concentration(products, policy.pareto_share_pct),
        mix: product_mix(products, policy),
    })
}
