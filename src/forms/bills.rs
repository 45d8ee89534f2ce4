use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::bill::{
    AdditionalDiscount, BillDraftUpdate, BillExtra, CreateBillFromOrder, CreateManualBill,
    LineItemInput,
};
use crate::forms::{lenient_decimal, lenient_id, sanitize_inline_text, sanitize_optional};

const STAFF_ALIAS_MAX_LEN: u64 = 64;
const SESSION_ID_MAX_LEN: u64 = 128;
const LABEL_MAX_CHARS: usize = 128;
const MAX_LINES: u64 = 500;

/// Label used when an extra is submitted without one.
pub const DEFAULT_EXTRA_LABEL: &str = "Extra";
/// Label given to the fixed discount supplied at bill creation.
pub const MANUAL_DISCOUNT_LABEL: &str = "Manual discount";

/// Result type returned by the bill form helpers.
pub type BillFormResult<T> = Result<T, BillFormError>;

/// Errors that can occur while processing bill payloads.
#[derive(Debug, Error)]
pub enum BillFormError {
    /// Validation failures from the `validator` crate.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    /// Manual bills are scoped by dining session.
    #[error("sessionId is required")]
    MissingSession,
}

/// Line item as sent by clients.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemPayload {
    #[serde(default, deserialize_with = "lenient_id")]
    pub item_id: Option<i32>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub menu_item_id: Option<i32>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<i32>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub quantity: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub price: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub price_at_order: Option<Decimal>,
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl From<LineItemPayload> for LineItemInput {
    fn from(value: LineItemPayload) -> Self {
        Self {
            item_id: value.item_id,
            menu_item_id: value.menu_item_id,
            line_id: value.id,
            name: sanitize_optional(value.name.as_deref()),
            quantity: value.quantity,
            price: value.price,
            price_at_order: value.price_at_order,
            modifiers: value
                .modifiers
                .iter()
                .map(|modifier| sanitize_inline_text(modifier))
                .filter(|modifier| !modifier.is_empty())
                .collect(),
            notes: sanitize_optional(value.notes.as_deref()),
            created_at: None,
        }
    }
}

/// Ad hoc charge as sent by clients.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtraPayload {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub amount: Option<Decimal>,
}

impl From<ExtraPayload> for BillExtra {
    fn from(value: ExtraPayload) -> Self {
        Self {
            label: sanitize_label(value.label.as_deref())
                .unwrap_or_else(|| DEFAULT_EXTRA_LABEL.to_string()),
            amount: value.amount.unwrap_or_default().max(Decimal::ZERO),
        }
    }
}

fn sanitize_label(label: Option<&str>) -> Option<String> {
    sanitize_optional(label).map(|label| label.chars().take(LABEL_MAX_CHARS).collect())
}

/// Fixed discount as sent by clients.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountPayload {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub amount: Option<Decimal>,
}

/// Discounts are stored as absolute values; empty ones are dropped.
fn into_discounts(payloads: Vec<DiscountPayload>) -> Vec<AdditionalDiscount> {
    payloads
        .into_iter()
        .filter_map(|payload| {
            let amount = payload.amount?.abs();
            (amount > Decimal::ZERO).then(|| AdditionalDiscount {
                label: sanitize_label(payload.label.as_deref()),
                amount,
            })
        })
        .collect()
}

/// Body of `POST /{tenant}/orders/{orderId}/bill`.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBillFromOrderPayload {
    #[validate(length(max = STAFF_ALIAS_MAX_LEN))]
    #[serde(default)]
    pub staff_alias: Option<String>,
    #[validate(length(max = MAX_LINES))]
    #[serde(default)]
    pub extras: Vec<ExtraPayload>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub discount_percent: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub discount_amount: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub service_charge_percent: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub service_charge_amount: Option<Decimal>,
}

impl CreateBillFromOrderPayload {
    /// Validates and sanitizes the payload into lifecycle options.
    pub fn into_domain(self) -> BillFormResult<CreateBillFromOrder> {
        self.validate()?;

        Ok(CreateBillFromOrder {
            staff_alias: sanitize_optional(self.staff_alias.as_deref()),
            extras: self.extras.into_iter().map(BillExtra::from).collect(),
            discount_percent: self.discount_percent,
            service_charge_percent: self.service_charge_percent,
            discount_amount: self.discount_amount.map(|amount| amount.abs()),
            service_charge_amount: self.service_charge_amount,
        })
    }
}

/// Body of `POST /{tenant}/bills`.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateManualBillPayload {
    #[serde(default, deserialize_with = "lenient_id")]
    pub table_id: Option<i32>,
    #[validate(length(max = SESSION_ID_MAX_LEN))]
    #[serde(default)]
    pub session_id: Option<String>,
    #[validate(length(max = MAX_LINES))]
    #[serde(default)]
    pub items: Vec<LineItemPayload>,
    #[validate(length(max = MAX_LINES))]
    #[serde(default)]
    pub extras: Vec<ExtraPayload>,
    #[validate(length(max = STAFF_ALIAS_MAX_LEN))]
    #[serde(default)]
    pub staff_alias: Option<String>,
}

impl CreateManualBillPayload {
    /// Validates and sanitizes the payload into a manual bill request.
    pub fn into_domain(self) -> BillFormResult<CreateManualBill> {
        self.validate()?;

        let session_id = self
            .session_id
            .as_deref()
            .map(str::trim)
            .filter(|session| !session.is_empty())
            .ok_or(BillFormError::MissingSession)?
            .to_string();

        Ok(CreateManualBill {
            table_id: self.table_id,
            session_id,
            items: self.items.into_iter().map(LineItemInput::from).collect(),
            extras: self.extras.into_iter().map(BillExtra::from).collect(),
            staff_alias: sanitize_optional(self.staff_alias.as_deref()),
        })
    }
}

/// Body of `PATCH /{tenant}/bills/{id}`.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBillPayload {
    #[validate(length(max = MAX_LINES))]
    #[serde(default)]
    pub items: Option<Vec<LineItemPayload>>,
    #[validate(length(max = MAX_LINES))]
    #[serde(default)]
    pub extras: Option<Vec<ExtraPayload>>,
    #[validate(length(max = MAX_LINES))]
    #[serde(default)]
    pub additional_discounts: Option<Vec<DiscountPayload>>,
    #[validate(length(max = STAFF_ALIAS_MAX_LEN))]
    #[serde(default)]
    pub staff_alias: Option<String>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub applied_discount_percent: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub applied_service_charge_percent: Option<Decimal>,
    #[serde(default)]
    pub refresh_pricing: bool,
}

impl UpdateBillPayload {
    /// Validates and sanitizes the payload into a draft update.
    pub fn into_domain(self) -> BillFormResult<BillDraftUpdate> {
        self.validate()?;

        Ok(BillDraftUpdate {
            items: self
                .items
                .map(|items| items.into_iter().map(LineItemInput::from).collect()),
            extras: self
                .extras
                .map(|extras| extras.into_iter().map(BillExtra::from).collect()),
            additional_discounts: self.additional_discounts.map(into_discounts),
            staff_alias: sanitize_optional(self.staff_alias.as_deref()),
            discount_percent: self.applied_discount_percent,
            service_charge_percent: self.applied_service_charge_percent,
            refresh_pricing: self.refresh_pricing,
        })
    }
}

/// Query of `GET /{tenant}/bills/active`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveBillsQuery {
    #[serde(default)]
    pub table_id: Option<i32>,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Query of `GET /{tenant}/bills/history`.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub page: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_payload_drops_empty_discounts_and_keeps_absolute_values() {
        let payload: UpdateBillPayload = serde_json::from_str(
            r#"{
                "additionalDiscounts": [
                    {"label": "Loyalty", "amount": -15},
                    {"amount": 0},
                    {"amount": "oops"},
                    {"amount": "2.5"}
                ]
            }"#,
        )
        .unwrap();

        let update = payload.into_domain().unwrap();
        let discounts = update.additional_discounts.unwrap();

        assert_eq!(discounts.len(), 2);
        assert_eq!(discounts[0].label.as_deref(), Some("Loyalty"));
        assert_eq!(discounts[0].amount, Decimal::from(15));
        assert_eq!(discounts[1].label, None);
        assert_eq!(discounts[1].amount, Decimal::new(25, 1));
        assert!(update.items.is_none());
        assert!(!update.refresh_pricing);
    }

    #[test]
    fn line_items_keep_every_identifier_candidate() {
        let payload: UpdateBillPayload = serde_json::from_str(
            r#"{"items": [
                {"menuItemId": "12", "id": 3, "name": "  Soup ", "quantity": "x", "priceAtOrder": 4.5}
            ]}"#,
        )
        .unwrap();

        let items = payload.into_domain().unwrap().items.unwrap();

        assert_eq!(items[0].item_id, None);
        assert_eq!(items[0].menu_item_id, Some(12));
        assert_eq!(items[0].line_id, Some(3));
        assert_eq!(items[0].name.as_deref(), Some("Soup"));
        assert_eq!(items[0].quantity, None);
        assert_eq!(items[0].price, None);
        assert_eq!(items[0].price_at_order, Some(Decimal::new(45, 1)));
    }

    #[test]
    fn manual_bill_requires_session() {
        let payload: CreateManualBillPayload =
            serde_json::from_str(r#"{"tableId": 4, "sessionId": "  ", "items": []}"#).unwrap();

        assert!(matches!(
            payload.into_domain(),
            Err(BillFormError::MissingSession)
        ));
    }

    #[test]
    fn create_payload_sanitizes_extras() {
        let payload: CreateBillFromOrderPayload = serde_json::from_str(
            r#"{"staffAlias": " Ann ", "extras": [{"amount": -4}, {"label": "Cake", "amount": "6"}], "discountAmount": -10}"#,
        )
        .unwrap();

        let options = payload.into_domain().unwrap();

        assert_eq!(options.staff_alias.as_deref(), Some("Ann"));
        assert_eq!(options.extras[0].label, DEFAULT_EXTRA_LABEL);
        assert_eq!(options.extras[0].amount, Decimal::ZERO);
        assert_eq!(options.extras[1].amount, Decimal::from(6));
        assert_eq!(options.discount_amount, Some(Decimal::from(10)));
    }

    #[test]
    fn rejects_overlong_staff_alias() {
        let payload = CreateBillFromOrderPayload {
            staff_alias: Some("x".repeat(200)),
            ..Default::default()
        };

        assert!(matches!(
            payload.into_domain(),
            Err(BillFormError::Validation(_))
        ));
    }
}
