use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::pricing::{NewPricingConfig, TaxRule};
use crate::forms::{lenient_decimal, sanitize_inline_text};

const MAX_TAXES: u64 = 16;
const TAX_NAME_MAX_LEN: u64 = 64;

/// Result type returned by the pricing form helpers.
pub type PricingFormResult<T> = Result<T, PricingFormError>;

/// Errors that can occur while processing pricing payloads.
#[derive(Debug, Error)]
pub enum PricingFormError {
    /// Validation failures from the `validator` crate.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("taxes[{index}].name cannot be empty")]
    EmptyTaxName { index: usize },
    /// Percentages must lie within 0..=100.
    #[error("{field} must be a percentage between 0 and 100")]
    InvalidPercent { field: String },
}

/// One tax in a pricing payload.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TaxPayload {
    #[validate(length(max = TAX_NAME_MAX_LEN))]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub percent: Option<Decimal>,
    #[serde(default)]
    pub inclusive: bool,
}

/// Body of `POST /{tenant}/pricing-configs`.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePricingConfigPayload {
    #[validate(length(max = MAX_TAXES))]
    #[serde(default)]
    pub taxes: Vec<TaxPayload>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub global_discount_percent: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub service_charge_percent: Option<Decimal>,
    #[serde(default)]
    pub activate: bool,
}

fn percent(value: Option<Decimal>, field: impl Into<String>) -> PricingFormResult<Decimal> {
    let value = value.unwrap_or_default();
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err(PricingFormError::InvalidPercent {
            field: field.into(),
        });
    }
    Ok(value)
}

impl CreatePricingConfigPayload {
    /// Validates the payload into a new pricing version authored by `created_by`.
    pub fn into_new_pricing_config(
        self,
        hub_id: i32,
        created_by: Option<String>,
    ) -> PricingFormResult<NewPricingConfig> {
        self.validate()?;

        let mut taxes = Vec::with_capacity(self.taxes.len());
        for (index, tax) in self.taxes.into_iter().enumerate() {
            tax.validate()?;
            let name = sanitize_inline_text(&tax.name);
            if name.is_empty() {
                return Err(PricingFormError::EmptyTaxName { index });
            }
            taxes.push(TaxRule {
                name,
                percent: percent(tax.percent, format!("taxes[{index}].percent"))?,
                inclusive: tax.inclusive,
            });
        }

        let mut config = NewPricingConfig::new(hub_id).with_percentages(
            percent(self.global_discount_percent, "globalDiscountPercent")?,
            percent(self.service_charge_percent, "serviceChargePercent")?,
        );
        config.taxes = taxes;
        config.created_by = created_by;
        if self.activate {
            config = config.activated();
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_new_pricing_version() {
        let payload: CreatePricingConfigPayload = serde_json::from_str(
            r#"{
                "taxes": [{"name": " GST ", "percent": "5"}, {"name": "VAT", "percent": 20, "inclusive": true}],
                "globalDiscountPercent": 10,
                "serviceChargePercent": "12.5",
                "activate": true
            }"#,
        )
        .unwrap();

        let config = payload
            .into_new_pricing_config(3, Some("owner".to_string()))
            .unwrap();

        assert_eq!(config.hub_id, 3);
        assert!(config.activate);
        assert_eq!(config.taxes.len(), 2);
        assert_eq!(config.taxes[0].name, "GST");
        assert!(!config.taxes[0].inclusive);
        assert!(config.taxes[1].inclusive);
        assert_eq!(config.global_discount_percent, Decimal::from(10));
        assert_eq!(config.service_charge_percent, Decimal::new(125, 1));
        assert_eq!(config.created_by.as_deref(), Some("owner"));
    }

    #[test]
    fn names_the_offending_tax() {
        let payload: CreatePricingConfigPayload = serde_json::from_str(
            r#"{"taxes": [{"name": "GST", "percent": 5}, {"name": "City", "percent": 150}]}"#,
        )
        .unwrap();

        let err = payload.into_new_pricing_config(1, None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "taxes[1].percent must be a percentage between 0 and 100"
        );
    }

    #[test]
    fn rejects_blank_tax_name() {
        let payload: CreatePricingConfigPayload =
            serde_json::from_str(r#"{"taxes": [{"name": "   ", "percent": 5}]}"#).unwrap();

        assert!(matches!(
            payload.into_new_pricing_config(1, None),
            Err(PricingFormError::EmptyTaxName { index: 0 })
        ));
    }
}
