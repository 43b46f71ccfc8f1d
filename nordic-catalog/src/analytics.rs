use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::inventory::InventoryEntry;
use crate::pricing::round_to_cents;

/// Per product/country roll-up of inventory history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    #[serde(rename = "product_name")]
    pub product_name: String,
    pub country: String,
    pub total_sales: i64,
    pub avg_price: f64,
    pub avg_stock_qty: f64,
    pub count_months: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopSoldProduct {
    #[serde(rename = "product_name")]
    pub product_name: String,
    pub units_sold: i64,
    pub revenue: f64,
}

/// Sales figures are caller-supplied, so totals saturate instead of overflowing.
#[derive(Default)]
struct Accumulator {
    total_sales: i64,
    price_sum: f64,
    qty_sum: f64,
    count: i64,
}

/// Group entries by (product, country). Missing selling prices count as 0
/// in the average. Sorted by country, then product.
pub fn summarize<'a>(entries: impl IntoIterator<Item = &'a InventoryEntry>) -> Vec<ProductSummary> {
    let mut groups: BTreeMap<(String, String), Accumulator> = BTreeMap::new();

    for entry in entries {
        let acc = groups
            .entry((entry.country.clone(), entry.product_name.clone()))
            .or_default();
        acc.total_sales = acc.total_sales.saturating_add(entry.sales);
        acc.price_sum += entry.selling_price.unwrap_or(0.0);
        acc.qty_sum += entry.quantity as f64;
        acc.count += 1;
    }

    groups
        .into_iter()
        .map(|((country, product_name), acc)| {
            let n = acc.count.max(1) as f64;
            ProductSummary {
                product_name,
                country,
                total_sales: acc.total_sales,
                avg_price: round_to_cents(acc.price_sum / n),
                avg_stock_qty: round_to_cents(acc.qty_sum / n),
                count_months: acc.count,
            }
        })
        .collect()
}

/// Products ranked by units sold (ties broken by name), at most `limit`.
pub fn top_sold<'a>(entries: impl IntoIterator<Item = &'a InventoryEntry>, limit: usize) -> Vec<TopSoldProduct> {
    let mut totals: BTreeMap<String, (i64, f64)> = BTreeMap::new();

    for entry in entries {
        let total = totals.entry(entry.product_name.clone()).or_default();
        total.0 = total.0.saturating_add(entry.sales);
        total.1 += entry.sales as f64 * entry.selling_price.unwrap_or(0.0);
    }

    let mut ranked: Vec<TopSoldProduct> = totals
        .into_iter()
        .map(|(product_name, (units_sold, revenue))| TopSoldProduct {
            product_name,
            units_sold,
            revenue: round_to_cents(revenue),
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.units_sold.cmp(&a.units_sold).then_with(|| a.product_name.cmp(&b.product_name))
    });
    ranked.truncate(limit);
    ranked
}
