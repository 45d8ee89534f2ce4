use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Name given to the single tax derived from legacy tenant settings.
pub const LEGACY_TAX_NAME: &str = "Tax";

/// One configured tax.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaxRule {
    pub name: String,
    /// Rate in percent.
    pub percent: Decimal,
    /// Whether prices already contain the tax.
    #[serde(default)]
    pub inclusive: bool,
}

/// Immutable pricing version owned by a hub. Only `active` ever changes.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PricingConfig {
    pub id: i32,
    pub hub_id: i32,
    /// Sequential version number within the hub, starting at 1.
    pub version: i32,
    pub active: bool,
    pub taxes: Vec<TaxRule>,
    pub global_discount_percent: Decimal,
    pub service_charge_percent: Decimal,
    pub created_by: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Payload required to append a pricing version.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPricingConfig {
    pub hub_id: i32,
    pub taxes: Vec<TaxRule>,
    pub global_discount_percent: Decimal,
    pub service_charge_percent: Decimal,
    pub created_by: Option<String>,
    /// Activate the new version and deactivate all others.
    pub activate: bool,
}

impl NewPricingConfig {
    pub fn new(hub_id: i32) -> Self {
        Self {
            hub_id,
            taxes: Vec::new(),
            global_discount_percent: Decimal::ZERO,
            service_charge_percent: Decimal::ZERO,
            created_by: None,
            activate: false,
        }
    }

    pub fn with_tax(mut self, name: impl Into<String>, percent: Decimal) -> Self {
        self.taxes.push(TaxRule {
            name: name.into(),
            percent,
            inclusive: false,
        });
        self
    }

    pub fn with_percentages(mut self, discount: Decimal, service_charge: Decimal) -> Self {
        self.global_discount_percent = discount;
        self.service_charge_percent = service_charge;
        self
    }

    pub fn activated(mut self) -> Self {
        self.activate = true;
        self
    }
}

/// Flat single-object settings kept on hubs that predate versioned pricing.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TenantSettings {
    pub hub_id: i32,
    pub tax_percent: Decimal,
    pub service_charge_percent: Decimal,
    pub discount_percent: Decimal,
    pub updated_at: NaiveDateTime,
}

/// Pricing in effect for a hub at resolution time.
#[derive(Debug, Serialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPricing {
    pub taxes: Vec<TaxRule>,
    pub service_charge_percent: Decimal,
    pub global_discount_percent: Decimal,
    /// Set only when the pricing came from a versioned config.
    pub version: Option<i32>,
    pub config_id: Option<i32>,
}

impl From<&PricingConfig> for ResolvedPricing {
    fn from(config: &PricingConfig) -> Self {
        Self {
            taxes: config.taxes.clone(),
            service_charge_percent: config.service_charge_percent,
            global_discount_percent: config.global_discount_percent,
            version: Some(config.version),
            config_id: Some(config.id),
        }
    }
}

impl From<&TenantSettings> for ResolvedPricing {
    fn from(settings: &TenantSettings) -> Self {
        let taxes = if settings.tax_percent > Decimal::ZERO {
            vec![TaxRule {
                name: LEGACY_TAX_NAME.to_string(),
                percent: settings.tax_percent,
                inclusive: false,
            }]
        } else {
            Vec::new()
        };

        Self {
            taxes,
            service_charge_percent: settings.service_charge_percent,
            global_discount_percent: settings.discount_percent,
            version: None,
            config_id: None,
        }
    }
}
