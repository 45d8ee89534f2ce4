use chrono::NaiveDateTime;
use pushkind_common::pagination::Pagination;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::order::PaymentStatus;
use crate::domain::pricing::TaxRule;

/// Lifecycle state of a bill.
///
/// `Draft -> Finalized -> Paid`, with an admin reopen from either later
/// state back to `Draft`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BillStatus {
    /// Bill content may still change.
    #[default]
    Draft,
    /// Content frozen, awaiting payment.
    Finalized,
    /// Settled.
    Paid,
}

impl BillStatus {
    /// Statuses that count towards the one-active-bill rule.
    pub const ACTIVE: [BillStatus; 2] = [BillStatus::Draft, BillStatus::Finalized];

    pub fn is_active(self) -> bool {
        Self::ACTIVE.contains(&self)
    }
}

impl std::fmt::Display for BillStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value: &'static str = (*self).into();
        f.write_str(value)
    }
}

impl From<&str> for BillStatus {
    fn from(value: &str) -> Self {
        match value {
            "finalized" => Self::Finalized,
            "paid" => Self::Paid,
            _ => Self::Draft,
        }
    }
}

impl From<BillStatus> for &'static str {
    fn from(value: BillStatus) -> Self {
        match value {
            BillStatus::Draft => "draft",
            BillStatus::Finalized => "finalized",
            BillStatus::Paid => "paid",
        }
    }
}

/// Action recorded in a bill's audit trail.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BillAction {
    CreatedFromOrder,
    CreatedManual,
    Updated,
    Finalized,
    Paid,
    Reopened,
}

/// One audit trail record.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub actor: String,
    pub action: BillAction,
    pub at: NaiveDateTime,
}

/// Billed line. An independent copy of the ordered line, editable in draft.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BillItem {
    /// Resolved catalog identifier of the line.
    pub item_id: i32,
    pub name: String,
    pub quantity: i32,
    /// Unit price snapshot.
    pub price: Decimal,
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Creation time of the ordered line this one was copied from.
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

/// Ad hoc charge added on top of the ordered lines.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BillExtra {
    pub label: String,
    pub amount: Decimal,
}

/// Fixed-amount discount applied after the percentage discount.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalDiscount {
    #[serde(default)]
    pub label: Option<String>,
    pub amount: Decimal,
}

/// Computed amount for one configured tax.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaxLine {
    pub name: String,
    /// Rate in percent.
    pub rate: Decimal,
    /// Whether the tax is already contained in prices.
    #[serde(default)]
    pub inclusive: bool,
    pub amount: Decimal,
}

/// Rounded breakdown produced by the totals engine.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BillTotals {
    pub subtotal: Decimal,
    pub extras_total: Decimal,
    pub subtotal_with_extras: Decimal,
    pub discount_percent: Decimal,
    pub discount_amount: Decimal,
    pub amount_after_discount: Decimal,
    pub tax_breakdown: Vec<TaxLine>,
    /// Sum of exclusive taxes, part of `total`.
    pub tax_amount: Decimal,
    /// Sum of inclusive taxes, already contained in the prices.
    pub inclusive_tax_amount: Decimal,
    pub service_charge_percent: Decimal,
    pub service_charge_amount: Decimal,
    pub total: Decimal,
}

/// Authoritative monetary record for one order or one manual tab.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub id: i32,
    /// Owning hub identifier.
    pub hub_id: i32,
    /// Originating order, `None` for manual bills.
    pub order_id: Option<i32>,
    pub table_id: Option<i32>,
    pub table_number: Option<String>,
    pub session_id: Option<String>,
    pub items: Vec<BillItem>,
    pub extras: Vec<BillExtra>,
    pub additional_discounts: Vec<AdditionalDiscount>,
    pub applied_discount_percent: Decimal,
    pub applied_service_charge_percent: Decimal,
    pub subtotal: Decimal,
    pub extras_total: Decimal,
    pub discount_amount: Decimal,
    pub service_charge_amount: Decimal,
    pub tax_amount: Decimal,
    pub inclusive_tax_amount: Decimal,
    pub total: Decimal,
    pub tax_breakdown: Vec<TaxLine>,
    /// Version of the pricing config captured at creation or refresh.
    pub pricing_version: Option<i32>,
    pub pricing_config_id: Option<i32>,
    pub status: BillStatus,
    pub payment_status: PaymentStatus,
    pub audit_trail: Vec<AuditEntry>,
    pub staff_alias: Option<String>,
    pub finalized_by: Option<String>,
    pub finalized_at: Option<NaiveDateTime>,
    pub paid_by: Option<String>,
    pub paid_at: Option<NaiveDateTime>,
    /// Optimistic concurrency token, never exposed to clients.
    #[serde(skip)]
    pub version: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Bill {
    /// Tax rules the bill was priced with, recovered from its breakdown.
    pub fn tax_rules(&self) -> Vec<TaxRule> {
        self.tax_breakdown
            .iter()
            .map(|line| TaxRule {
                name: line.name.clone(),
                percent: line.rate,
                inclusive: line.inclusive,
            })
            .collect()
    }

    /// Sum of the fixed-amount discounts.
    pub fn additional_discount_total(&self) -> Decimal {
        self.additional_discounts
            .iter()
            .map(|discount| discount.amount)
            .sum()
    }

    /// Overwrite every monetary field from a fresh computation.
    pub fn apply_totals(&mut self, totals: BillTotals) {
        self.applied_discount_percent = totals.discount_percent;
        self.applied_service_charge_percent = totals.service_charge_percent;
        self.subtotal = totals.subtotal;
        self.extras_total = totals.extras_total;
        self.discount_amount = totals.discount_amount;
        self.service_charge_amount = totals.service_charge_amount;
        self.tax_amount = totals.tax_amount;
        self.inclusive_tax_amount = totals.inclusive_tax_amount;
        self.total = totals.total;
        self.tax_breakdown = totals.tax_breakdown;
    }

    /// Append one audit record and bump the modification time.
    pub fn record(&mut self, actor: impl Into<String>, action: BillAction, at: NaiveDateTime) {
        self.audit_trail.push(AuditEntry {
            actor: actor.into(),
            action,
            at,
        });
        self.updated_at = at;
    }
}

/// Payload required to insert a new bill.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBill {
    pub hub_id: i32,
    pub order_id: Option<i32>,
    pub table_id: Option<i32>,
    pub table_number: Option<String>,
    pub session_id: Option<String>,
    pub items: Vec<BillItem>,
    pub extras: Vec<BillExtra>,
    pub additional_discounts: Vec<AdditionalDiscount>,
    pub totals: BillTotals,
    pub pricing_version: Option<i32>,
    pub pricing_config_id: Option<i32>,
    pub staff_alias: Option<String>,
    pub audit_trail: Vec<AuditEntry>,
    pub updated_at: NaiveDateTime,
}

/// Result of an insert guarded by the one-active-bill rule.
#[derive(Debug, Clone, PartialEq)]
pub enum BillInsert {
    /// The bill was stored.
    Created(Bill),
    /// An active bill for the same order or manual session already existed.
    Existing(Bill),
}

/// Result of a compare-and-swap save.
#[derive(Debug, Clone, PartialEq)]
pub enum BillSave {
    /// Stored; carries the bill with its bumped version.
    Saved(Bill),
    /// The bill or its order changed since they were read.
    Stale,
    /// Another draft or finalized bill already occupies the order or
    /// manual session this bill would become active for.
    Conflict(Bill),
}

/// Query definition used to list bills for a hub.
#[derive(Debug, Clone)]
pub struct BillListQuery {
    /// Owning hub identifier.
    pub hub_id: i32,
    /// Statuses to include, empty for all.
    pub statuses: Vec<BillStatus>,
    pub table_id: Option<i32>,
    pub session_id: Option<String>,
    /// Optional pagination options applied to the query.
    pub pagination: Option<Pagination>,
}

impl BillListQuery {
    /// Construct a query that targets all bills belonging to `hub_id`.
    pub fn new(hub_id: i32) -> Self {
        Self {
            hub_id,
            statuses: Vec::new(),
            table_id: None,
            session_id: None,
            pagination: None,
        }
    }

    /// Restrict the results to the given statuses.
    pub fn statuses(mut self, statuses: &[BillStatus]) -> Self {
        self.statuses = statuses.to_vec();
        self
    }

    pub fn table_id(mut self, table_id: i32) -> Self {
        self.table_id = Some(table_id);
        self
    }

    pub fn session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Apply pagination to the query with the given page number and page size.
    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

/// Identifier a billed line resolved to, in resolution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemRef {
    /// Catalog item identifier.
    Item(i32),
    /// Menu entry identifier sent by older clients.
    MenuItem(i32),
    /// Identifier of the order line itself.
    Line(i32),
}

impl ItemRef {
    /// First identifier present in `item_id`, `menu_item_id`, `line_id` order.
    pub fn resolve(
        item_id: Option<i32>,
        menu_item_id: Option<i32>,
        line_id: Option<i32>,
    ) -> Option<Self> {
        item_id
            .map(ItemRef::Item)
            .or_else(|| menu_item_id.map(ItemRef::MenuItem))
            .or_else(|| line_id.map(ItemRef::Line))
    }

    pub fn id(self) -> i32 {
        match self {
            ItemRef::Item(id) | ItemRef::MenuItem(id) | ItemRef::Line(id) => id,
        }
    }
}

/// Raw line as received from a client or copied from an order, before
/// coercion into a [`BillItem`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineItemInput {
    pub item_id: Option<i32>,
    pub menu_item_id: Option<i32>,
    pub line_id: Option<i32>,
    pub name: Option<String>,
    /// `None` when the value was missing or not a number.
    pub quantity: Option<Decimal>,
    pub price: Option<Decimal>,
    pub price_at_order: Option<Decimal>,
    pub modifiers: Vec<String>,
    pub notes: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

/// Options accepted when billing an order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateBillFromOrder {
    pub staff_alias: Option<String>,
    pub extras: Vec<BillExtra>,
    pub discount_percent: Option<Decimal>,
    pub service_charge_percent: Option<Decimal>,
    /// Fixed discount recorded as the bill's first additional discount.
    pub discount_amount: Option<Decimal>,
    /// Accepted for compatibility, service charge is always a percentage.
    pub service_charge_amount: Option<Decimal>,
}

/// Ad hoc bill not backed by an order.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateManualBill {
    pub table_id: Option<i32>,
    pub session_id: String,
    pub items: Vec<LineItemInput>,
    pub extras: Vec<BillExtra>,
    pub staff_alias: Option<String>,
}

/// Changes applied to a draft bill. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BillDraftUpdate {
    pub items: Option<Vec<LineItemInput>>,
    pub extras: Option<Vec<BillExtra>>,
    pub additional_discounts: Option<Vec<AdditionalDiscount>>,
    pub staff_alias: Option<String>,
    pub discount_percent: Option<Decimal>,
    pub service_charge_percent: Option<Decimal>,
    /// Re-resolve the hub pricing instead of keeping the captured snapshot.
    pub refresh_pricing: bool,
}
