use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::bill::{Bill as DomainBill, NewBill as DomainNewBill};
use crate::domain::money::{format_decimal, from_cents, parse_decimal, to_cents};
use crate::models::{decode_document, encode_json};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::bills)]
pub struct Bill {
    pub id: i32,
    pub hub_id: i32,
    pub order_id: Option<i32>,
    pub table_id: Option<i32>,
    pub table_number: Option<String>,
    pub session_id: Option<String>,
    pub items: String,
    pub extras: String,
    pub additional_discounts: String,
    pub discount_percent: String,
    pub service_charge_percent: String,
    pub subtotal_cents: i64,
    pub extras_cents: i64,
    pub discount_cents: i64,
    pub service_charge_cents: i64,
    pub tax_cents: i64,
    pub inclusive_tax_cents: i64,
    pub total_cents: i64,
    pub tax_breakdown: String,
    pub pricing_version: Option<i32>,
    pub pricing_config_id: Option<i32>,
    pub status: String,
    pub payment_status: String,
    pub audit_trail: String,
    pub staff_alias: Option<String>,
    pub finalized_by: Option<String>,
    pub finalized_at: Option<NaiveDateTime>,
    pub paid_by: Option<String>,
    pub paid_at: Option<NaiveDateTime>,
    pub version: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::bills)]
pub struct NewBill<'a> {
    pub hub_id: i32,
    pub order_id: Option<i32>,
    pub table_id: Option<i32>,
    pub table_number: Option<&'a str>,
    pub session_id: Option<&'a str>,
    pub items: String,
    pub extras: String,
    pub additional_discounts: String,
    pub discount_percent: String,
    pub service_charge_percent: String,
    pub subtotal_cents: i64,
    pub extras_cents: i64,
    pub discount_cents: i64,
    pub service_charge_cents: i64,
    pub tax_cents: i64,
    pub inclusive_tax_cents: i64,
    pub total_cents: i64,
    pub tax_breakdown: String,
    pub pricing_version: Option<i32>,
    pub pricing_config_id: Option<i32>,
    pub status: &'static str,
    pub payment_status: &'static str,
    pub audit_trail: String,
    pub staff_alias: Option<&'a str>,
    pub updated_at: NaiveDateTime,
}

/// Full rewrite of a bill's mutable state, bumping its version.
#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::bills)]
#[diesel(treat_none_as_null = true)]
pub struct SaveBill<'a> {
    pub table_id: Option<i32>,
    pub table_number: Option<&'a str>,
    pub items: String,
    pub extras: String,
    pub additional_discounts: String,
    pub discount_percent: String,
    pub service_charge_percent: String,
    pub subtotal_cents: i64,
    pub extras_cents: i64,
    pub discount_cents: i64,
    pub service_charge_cents: i64,
    pub tax_cents: i64,
    pub inclusive_tax_cents: i64,
    pub total_cents: i64,
    pub tax_breakdown: String,
    pub pricing_version: Option<i32>,
    pub pricing_config_id: Option<i32>,
    pub status: &'static str,
    pub payment_status: &'static str,
    pub audit_trail: String,
    pub staff_alias: Option<&'a str>,
    pub finalized_by: Option<&'a str>,
    pub finalized_at: Option<NaiveDateTime>,
    pub paid_by: Option<&'a str>,
    pub paid_at: Option<NaiveDateTime>,
    pub version: i32,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Bill> for DomainBill {
    type Error = diesel::result::Error;

    /// Fails when a sub-document column does not decode, so a damaged bill
    /// is never saved back or mirrored with empty content.
    fn try_from(value: Bill) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id,
            hub_id: value.hub_id,
            order_id: value.order_id,
            table_id: value.table_id,
            table_number: value.table_number,
            session_id: value.session_id,
            items: decode_document(&value.items, "bills.items")?,
            extras: decode_document(&value.extras, "bills.extras")?,
            additional_discounts: decode_document(
                &value.additional_discounts,
                "bills.additional_discounts",
            )?,
            applied_discount_percent: parse_decimal(&value.discount_percent),
            applied_service_charge_percent: parse_decimal(&value.service_charge_percent),
            subtotal: from_cents(value.subtotal_cents),
            extras_total: from_cents(value.extras_cents),
            discount_amount: from_cents(value.discount_cents),
            service_charge_amount: from_cents(value.service_charge_cents),
            tax_amount: from_cents(value.tax_cents),
            inclusive_tax_amount: from_cents(value.inclusive_tax_cents),
            total: from_cents(value.total_cents),
            tax_breakdown: decode_document(&value.tax_breakdown, "bills.tax_breakdown")?,
            pricing_version: value.pricing_version,
            pricing_config_id: value.pricing_config_id,
            status: value.status.as_str().into(),
            payment_status: value.payment_status.as_str().into(),
            audit_trail: decode_document(&value.audit_trail, "bills.audit_trail")?,
            staff_alias: value.staff_alias,
            finalized_by: value.finalized_by,
            finalized_at: value.finalized_at,
            paid_by: value.paid_by,
            paid_at: value.paid_at,
            version: value.version,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewBill> for NewBill<'a> {
    fn from(value: &'a DomainNewBill) -> Self {
        let totals = &value.totals;
        Self {
            hub_id: value.hub_id,
            order_id: value.order_id,
            table_id: value.table_id,
            table_number: value.table_number.as_deref(),
            session_id: value.session_id.as_deref(),
            items: encode_json(&value.items),
            extras: encode_json(&value.extras),
            additional_discounts: encode_json(&value.additional_discounts),
            discount_percent: format_decimal(totals.discount_percent),
            service_charge_percent: format_decimal(totals.service_charge_percent),
            subtotal_cents: to_cents(totals.subtotal),
            extras_cents: to_cents(totals.extras_total),
            discount_cents: to_cents(totals.discount_amount),
            service_charge_cents: to_cents(totals.service_charge_amount),
            tax_cents: to_cents(totals.tax_amount),
            inclusive_tax_cents: to_cents(totals.inclusive_tax_amount),
            total_cents: to_cents(totals.total),
            tax_breakdown: encode_json(&totals.tax_breakdown),
            pricing_version: value.pricing_version,
            pricing_config_id: value.pricing_config_id,
            status: "draft",
            payment_status: "unpaid",
            audit_trail: encode_json(&value.audit_trail),
            staff_alias: value.staff_alias.as_deref(),
            updated_at: value.updated_at,
        }
    }
}

impl<'a> From<&'a DomainBill> for SaveBill<'a> {
    fn from(value: &'a DomainBill) -> Self {
        Self {
            table_id: value.table_id,
            table_number: value.table_number.as_deref(),
            items: encode_json(&value.items),
            extras: encode_json(&value.extras),
            additional_discounts: encode_json(&value.additional_discounts),
            discount_percent: format_decimal(value.applied_discount_percent),
            service_charge_percent: format_decimal(value.applied_service_charge_percent),
            subtotal_cents: to_cents(value.subtotal),
            extras_cents: to_cents(value.extras_total),
            discount_cents: to_cents(value.discount_amount),
            service_charge_cents: to_cents(value.service_charge_amount),
            tax_cents: to_cents(value.tax_amount),
            inclusive_tax_cents: to_cents(value.inclusive_tax_amount),
            total_cents: to_cents(value.total),
            tax_breakdown: encode_json(&value.tax_breakdown),
            pricing_version: value.pricing_version,
            pricing_config_id: value.pricing_config_id,
            status: value.status.into(),
            payment_status: value.payment_status.into(),
            audit_trail: encode_json(&value.audit_trail),
            staff_alias: value.staff_alias.as_deref(),
            finalized_by: value.finalized_by.as_deref(),
            finalized_at: value.finalized_at,
            paid_by: value.paid_by.as_deref(),
            paid_at: value.paid_at,
            version: value.version + 1,
            updated_at: value.updated_at,
        }
    }
}
