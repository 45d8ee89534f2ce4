use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::money::{format_decimal, parse_decimal};
use crate::domain::pricing::{
    NewPricingConfig as DomainNewPricingConfig, PricingConfig as DomainPricingConfig,
    TenantSettings as DomainTenantSettings,
};
use crate::models::{decode_json, encode_json};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::pricing_configs)]
pub struct PricingConfig {
    pub id: i32,
    pub hub_id: i32,
    pub version: i32,
    pub active: bool,
    pub taxes: String,
    pub discount_percent: String,
    pub service_charge_percent: String,
    pub created_by: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::pricing_configs)]
pub struct NewPricingConfig<'a> {
    pub hub_id: i32,
    pub version: i32,
    pub active: bool,
    pub taxes: String,
    pub discount_percent: String,
    pub service_charge_percent: String,
    pub created_by: Option<&'a str>,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::tenant_settings)]
#[diesel(primary_key(hub_id))]
pub struct TenantSettings {
    pub hub_id: i32,
    pub tax_percent: String,
    pub service_charge_percent: String,
    pub discount_percent: String,
    pub updated_at: NaiveDateTime,
}

impl From<PricingConfig> for DomainPricingConfig {
    fn from(value: PricingConfig) -> Self {
        Self {
            id: value.id,
            hub_id: value.hub_id,
            version: value.version,
            active: value.active,
            taxes: decode_json(&value.taxes, "pricing_configs.taxes"),
            global_discount_percent: parse_decimal(&value.discount_percent),
            service_charge_percent: parse_decimal(&value.service_charge_percent),
            created_by: value.created_by,
            created_at: value.created_at,
        }
    }
}

impl<'a> NewPricingConfig<'a> {
    pub fn from_domain(value: &'a DomainNewPricingConfig, version: i32) -> Self {
        Self {
            hub_id: value.hub_id,
            version,
            active: value.activate,
            taxes: encode_json(&value.taxes),
            discount_percent: format_decimal(value.global_discount_percent),
            service_charge_percent: format_decimal(value.service_charge_percent),
            created_by: value.created_by.as_deref(),
        }
    }
}

impl From<TenantSettings> for DomainTenantSettings {
    fn from(value: TenantSettings) -> Self {
        Self {
            hub_id: value.hub_id,
            tax_percent: parse_decimal(&value.tax_percent),
            service_charge_percent: parse_decimal(&value.service_charge_percent),
            discount_percent: parse_decimal(&value.discount_percent),
            updated_at: value.updated_at,
        }
    }
}

impl From<&DomainTenantSettings> for TenantSettings {
    fn from(value: &DomainTenantSettings) -> Self {
        Self {
            hub_id: value.hub_id,
            tax_percent: format_decimal(value.tax_percent),
            service_charge_percent: format_decimal(value.service_charge_percent),
            discount_percent: format_decimal(value.discount_percent),
            updated_at: value.updated_at,
        }
    }
}
