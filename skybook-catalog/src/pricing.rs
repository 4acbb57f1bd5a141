use serde::{Deserialize, Serialize};
use skybook_core::{FareClass, Fares};

use crate::product::SelectedAddon;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Tax applied to the base fare only, never to add-ons.
    pub tax_rate: f64,

    /// ISO currency code shown next to every amount
    pub currency: String,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            tax_rate: 0.15,
            currency: "USD".to_string(),
        }
    }
}

/// Everything the price summary and the payment step display, in cents.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriceBreakdown {
    pub base_fare_per_passenger: i64,
    pub passenger_count: usize,
    pub total_base_fare: i64,
    pub taxes: i64,
    pub addons_cost: i64,
    pub total_amount: i64,
}

/// The one place booking totals are computed.
#[derive(Debug, Clone)]
pub struct PricingEngine {
    config: PricingConfig,
}

impl PricingEngine {
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    pub fn currency(&self) -> &str {
        &self.config.currency
    }

    pub fn quote(
        &self,
        fares: &Fares,
        fare_class: FareClass,
        passenger_count: usize,
        addons: &[SelectedAddon],
    ) -> PriceBreakdown {
        let base_fare_per_passenger = fares.base_fare(fare_class);
        let total_base_fare = base_fare_per_passenger * passenger_count as i64;
        let taxes = self.taxes_on(total_base_fare);
        let addons_cost = addons.iter().map(SelectedAddon::line_total_cents).sum::<i64>();

        PriceBreakdown {
            base_fare_per_passenger,
            passenger_count,
            total_base_fare,
            taxes,
            addons_cost,
            total_amount: total_base_fare + taxes + addons_cost,
        }
    }

    /// Rounded half away from zero to the nearest cent.
    fn taxes_on(&self, amount_cents: i64) -> i64 {
        (amount_cents as f64 * self.config.tax_rate).round() as i64
    }
}

impl Default for PricingEngine {
    fn default() -> Self {
        Self::new(PricingConfig::default())
    }
}

/// "507.70"
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}
