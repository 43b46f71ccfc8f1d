use serde::{Deserialize, Serialize};

pub const MARGIN_SUFFIX: &str = " | Adjusted to minimum profit margin.";
pub const DEMAND_UNKNOWN: &str = "demand unknown";

// Float noise from `cost * 1.1` (e.g. 27.500000000000004) must not push a
// price one cent above the floor or trip the floor on an equal price.
const EPSILON: f64 = 1e-9;

/// Thresholds and multipliers for stock-aware pricing.
///
/// Bands are checked in declaration order and the first match wins, so the
/// boundaries are: `< high_demand_ratio`, `< moderate_demand_ratio`,
/// `> overstock_ratio`, `> slight_overstock_ratio`, otherwise stable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    #[serde(default = "default_high_demand_ratio")]
    pub high_demand_ratio: f64,
    #[serde(default = "default_moderate_demand_ratio")]
    pub moderate_demand_ratio: f64,
    #[serde(default = "default_overstock_ratio")]
    pub overstock_ratio: f64,
    #[serde(default = "default_slight_overstock_ratio")]
    pub slight_overstock_ratio: f64,

    #[serde(default = "default_high_demand_multiplier")]
    pub high_demand_multiplier: f64,
    #[serde(default = "default_moderate_demand_multiplier")]
    pub moderate_demand_multiplier: f64,
    #[serde(default = "default_overstock_multiplier")]
    pub overstock_multiplier: f64,
    #[serde(default = "default_slight_overstock_multiplier")]
    pub slight_overstock_multiplier: f64,

    /// Minimum price as a multiple of cost price.
    #[serde(default = "default_margin_floor_factor")]
    pub margin_floor_factor: f64,
}

fn default_high_demand_ratio() -> f64 { 0.5 }
fn default_moderate_demand_ratio() -> f64 { 0.8 }
fn default_overstock_ratio() -> f64 { 1.5 }
fn default_slight_overstock_ratio() -> f64 { 1.2 }
fn default_high_demand_multiplier() -> f64 { 1.10 }
fn default_moderate_demand_multiplier() -> f64 { 1.05 }
fn default_overstock_multiplier() -> f64 { 0.90 }
fn default_slight_overstock_multiplier() -> f64 { 0.95 }
fn default_margin_floor_factor() -> f64 { 1.1 }

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            high_demand_ratio: default_high_demand_ratio(),
            moderate_demand_ratio: default_moderate_demand_ratio(),
            overstock_ratio: default_overstock_ratio(),
            slight_overstock_ratio: default_slight_overstock_ratio(),
            high_demand_multiplier: default_high_demand_multiplier(),
            moderate_demand_multiplier: default_moderate_demand_multiplier(),
            overstock_multiplier: default_overstock_multiplier(),
            slight_overstock_multiplier: default_slight_overstock_multiplier(),
            margin_floor_factor: default_margin_floor_factor(),
        }
    }
}

/// Pricing pressure derived from the stock/demand ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DemandBand {
    HighDemand,
    ModerateDemand,
    Overstock,
    SlightOverstock,
    Stable,
    Unknown,
}

impl DemandBand {
    pub fn reason(&self) -> &'static str {
        match self {
            DemandBand::HighDemand => "High demand / low stock",
            DemandBand::ModerateDemand => "Moderate demand",
            DemandBand::Overstock => "Overstock",
            DemandBand::SlightOverstock => "Slight overstock",
            DemandBand::Stable => "Stable demand",
            DemandBand::Unknown => DEMAND_UNKNOWN,
        }
    }
}

/// Outcome of one pricing run. Field names are part of the HTTP contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceAdjustmentResult {
    pub old_price: f64,
    pub new_price: f64,
    pub predicted_demand: f64,
    pub current_stock: i64,
    /// Rounded for display; `None` when demand is unknown.
    pub stock_demand_ratio: Option<f64>,
    pub reason: String,
}

impl PriceAdjustmentResult {
    pub fn margin_adjusted(&self) -> bool {
        self.reason.ends_with(MARGIN_SUFFIX)
    }
}

/// Stock-aware price adjuster. Stateless apart from its configuration.
#[derive(Debug, Clone, Default)]
pub struct PricingEngine {
    config: PricingConfig,
}

impl PricingEngine {
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Classify a stock/demand ratio. Order of the checks is significant.
    pub fn classify(&self, ratio: f64) -> DemandBand {
        let c = &self.config;
        if ratio < c.high_demand_ratio {
            DemandBand::HighDemand
        } else if ratio < c.moderate_demand_ratio {
            DemandBand::ModerateDemand
        } else if ratio > c.overstock_ratio {
            DemandBand::Overstock
        } else if ratio > c.slight_overstock_ratio {
            DemandBand::SlightOverstock
        } else {
            DemandBand::Stable
        }
    }

    pub fn multiplier(&self, band: DemandBand) -> f64 {
        let c = &self.config;
        match band {
            DemandBand::HighDemand => c.high_demand_multiplier,
            DemandBand::ModerateDemand => c.moderate_demand_multiplier,
            DemandBand::Overstock => c.overstock_multiplier,
            DemandBand::SlightOverstock => c.slight_overstock_multiplier,
            DemandBand::Stable | DemandBand::Unknown => 1.0,
        }
    }

    /// Compute the adjusted unit price. Total over all inputs: negative
    /// stock counts as zero, non-finite or negative prices count as zero,
    /// and a non-positive or non-finite demand skips the ratio bands.
    pub fn compute_adjusted_price(
        &self,
        current_stock: i64,
        predicted_demand: f64,
        base_price: f64,
        cost_price: f64,
    ) -> PriceAdjustmentResult {
        let current_stock = current_stock.max(0);
        let base_price = sanitize_price(base_price);
        let cost_price = sanitize_price(cost_price);
        let demand_known = predicted_demand.is_finite() && predicted_demand > 0.0;

        let (band, ratio) = if demand_known {
            let ratio = current_stock as f64 / predicted_demand;
            (self.classify(ratio), Some(ratio))
        } else {
            (DemandBand::Unknown, None)
        };

        let mut reason = band.reason().to_string();
        let mut price = base_price * self.multiplier(band);

        let floor = cost_price * self.config.margin_floor_factor;
        if price + EPSILON < floor {
            price = floor;
            reason.push_str(MARGIN_SUFFIX);
        }

        let mut new_price = round_to_cents(price);
        if new_price + EPSILON < floor {
            // Rounding half-away can land just under a floor like 33.333..
            new_price = ceil_to_cents(floor);
            if !reason.ends_with(MARGIN_SUFFIX) {
                reason.push_str(MARGIN_SUFFIX);
            }
        }

        PriceAdjustmentResult {
            old_price: round_to_cents(base_price),
            new_price,
            predicted_demand: if demand_known { predicted_demand } else { 0.0 },
            current_stock,
            stock_demand_ratio: ratio.map(round_to_cents),
            reason,
        }
    }
}

/// Convenience entry point with the default thresholds.
pub fn compute_adjusted_price(
    current_stock: i64,
    predicted_demand: f64,
    base_price: f64,
    cost_price: f64,
) -> PriceAdjustmentResult {
    PricingEngine::default().compute_adjusted_price(current_stock, predicted_demand, base_price, cost_price)
}

/// Round to 2 decimals, half away from zero.
pub fn round_to_cents(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    (value * 100.0).round() / 100.0
}

fn ceil_to_cents(value: f64) -> f64 {
    ((value * 100.0) - EPSILON).ceil() / 100.0
}

fn sanitize_price(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_high_demand_low_stock() {
        let result = compute_adjusted_price(100, 300.0, 50.0, 30.0);
        assert_eq!(result.reason, "High demand / low stock");
        assert_eq!(result.new_price, 55.00);
        assert_eq!(result.stock_demand_ratio, Some(0.33));
        assert_eq!(result.old_price, 50.0);
        assert!(!result.margin_adjusted());
    }

    #[test]
    fn test_overstock() {
        let result = compute_adjusted_price(500, 200.0, 50.0, 30.0);
        assert_eq!(result.reason, "Overstock");
        assert_eq!(result.new_price, 45.00);
        assert_eq!(result.stock_demand_ratio, Some(2.5));
    }

    #[test]
    fn test_unknown_demand_hits_margin_floor() {
        let result = compute_adjusted_price(50, 0.0, 20.0, 25.0);
        assert_eq!(result.new_price, 27.50);
        assert!(result.reason.starts_with(DEMAND_UNKNOWN));
        assert!(result.reason.contains("minimum profit margin"));
        assert_eq!(result.stock_demand_ratio, None);
    }

    #[test]
    fn test_unknown_demand_keeps_base_price() {
        let result = compute_adjusted_price(10, -5.0, 19.999, 5.0);
        assert_eq!(result.reason, DEMAND_UNKNOWN);
        assert_eq!(result.new_price, 20.00);

        let result = compute_adjusted_price(10, f64::NAN, 12.0, 0.0);
        assert_eq!(result.reason, DEMAND_UNKNOWN);
        assert_eq!(result.new_price, 12.0);
    }

    #[test]
    fn test_ratio_boundaries() {
        let engine = PricingEngine::default();
        assert_eq!(engine.classify(0.5), DemandBand::ModerateDemand);
        assert_eq!(engine.classify(0.4999), DemandBand::HighDemand);
        assert_eq!(engine.classify(0.8), DemandBand::Stable);
        assert_eq!(engine.classify(1.2), DemandBand::Stable);
        assert_eq!(engine.classify(1.5), DemandBand::SlightOverstock);
        assert_eq!(engine.classify(1.5001), DemandBand::Overstock);

        // 150 / 100 sits exactly on the overstock boundary and must not
        // take the overstock discount.
        let result = compute_adjusted_price(150, 100.0, 40.0, 0.0);
        assert_ne!(result.reason, "Overstock");
        assert_eq!(result.new_price, 38.00);

        let result = compute_adjusted_price(50, 100.0, 40.0, 0.0);
        assert_eq!(result.reason, "Moderate demand");
        assert_eq!(result.new_price, 42.00);
    }

    #[test]
    fn test_stable_demand() {
        let result = compute_adjusted_price(100, 100.0, 9.99, 1.0);
        assert_eq!(result.reason, "Stable demand");
        assert_eq!(result.new_price, 9.99);
        assert_eq!(result.stock_demand_ratio, Some(1.0));
    }

    #[test]
    fn test_negative_stock_counts_as_zero() {
        let result = compute_adjusted_price(-40, 100.0, 10.0, 0.0);
        assert_eq!(result.current_stock, 0);
        assert_eq!(result.stock_demand_ratio, Some(0.0));
        assert_eq!(result.reason, "High demand / low stock");
        assert_eq!(result.new_price, 11.0);
    }

    #[test]
    fn test_floor_rounding_never_undercuts_cost_margin() {
        // 30.30303 * 1.1 = 33.333333; half-away rounding alone would give 33.33
        let result = compute_adjusted_price(0, 0.0, 1.0, 30.30303);
        assert_eq!(result.new_price, 33.34);
        assert!(result.margin_adjusted());
    }

    #[test]
    fn test_price_equal_to_floor_is_not_adjusted() {
        let result = compute_adjusted_price(100, 100.0, 33.0, 30.0);
        assert_eq!(result.new_price, 33.0);
        assert!(!result.margin_adjusted());
    }

    #[test]
    fn test_non_finite_prices_degrade_to_zero() {
        let result = compute_adjusted_price(10, 10.0, f64::INFINITY, f64::NAN);
        assert_eq!(result.old_price, 0.0);
        assert_eq!(result.new_price, 0.0);
    }

    #[test]
    fn test_custom_config() {
        let engine = PricingEngine::new(PricingConfig {
            high_demand_multiplier: 1.25,
            ..PricingConfig::default()
        });
        let result = engine.compute_adjusted_price(10, 100.0, 80.0, 0.0);
        assert_eq!(result.new_price, 100.0);
    }

    #[test]
    fn test_round_to_cents() {
        assert_eq!(round_to_cents(2.346), 2.35);
        assert_eq!(round_to_cents(-0.125), -0.13);
        assert_eq!(round_to_cents(0.125), 0.13);
        assert_eq!(round_to_cents(f64::NAN), 0.0);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn margin_floor_always_holds(
                stock in -100i64..10_000,
                demand in -50.0f64..5_000.0,
                base in 0.0f64..1_000.0,
                cost in 0.0f64..1_000.0,
            ) {
                let result = compute_adjusted_price(stock, demand, base, cost);
                prop_assert!(result.new_price + 1e-6 >= cost * 1.1);
            }

            #[test]
            fn unknown_demand_returns_rounded_base(
                stock in 0i64..10_000,
                demand in -1_000.0f64..=0.0,
                base in 0.0f64..1_000.0,
                cost in 0.0f64..1_000.0,
            ) {
                let result = compute_adjusted_price(stock, demand, base, cost);
                prop_assert!(result.reason.starts_with(DEMAND_UNKNOWN));
                if !result.margin_adjusted() {
                    prop_assert_eq!(result.new_price, round_to_cents(base));
                }
            }

            #[test]
            fn pricing_is_idempotent(
                stock in 0i64..10_000,
                demand in 0.0f64..5_000.0,
                base in 0.0f64..1_000.0,
                cost in 0.0f64..1_000.0,
            ) {
                let first = compute_adjusted_price(stock, demand, base, cost);
                let second = compute_adjusted_price(stock, demand, base, cost);
                prop_assert_eq!(first, second);
            }
        }
    }
}
