//! Bill to order mirroring.
//!
//! The bill is authoritative. When it is finalized or paid, the linked
//! order's items and money are overwritten from it and saved in the same
//! transaction as the bill.

use chrono::NaiveDateTime;

use crate::domain::bill::Bill;
use crate::domain::order::{
    AppliedTax, NewOrderItem, Order, OrderItemStatus, OrderMirror, OrderStatus, PaymentStatus,
};

/// Bill transition that triggers a mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    /// Order stays open for more service, still unpaid.
    Finalized,
    /// Order is settled and closed.
    Paid,
}

/// Uppercase code derived from a tax name, e.g. `"Service tax 5%"` -> `"SERVICE_TAX_5"`.
pub fn tax_code(name: &str) -> String {
    name.split(|ch: char| !ch.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_uppercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// Overwrite of `order` computed from `bill`, guarded by the order's version.
pub fn build_order_mirror(
    bill: &Bill,
    order: &Order,
    action: SyncAction,
    now: NaiveDateTime,
) -> OrderMirror {
    let items = bill
        .items
        .iter()
        .map(|item| NewOrderItem {
            item_id: Some(item.item_id),
            menu_item_id: None,
            name: item.name.clone(),
            quantity: item.quantity,
            price: Some(item.price),
            price_at_order: Some(item.price),
            modifiers: item.modifiers.clone(),
            notes: item.notes.clone(),
            status: OrderItemStatus::Served,
            created_at: item.created_at,
        })
        .collect();

    let applied_taxes = bill
        .tax_breakdown
        .iter()
        .map(|line| AppliedTax {
            code: tax_code(&line.name),
            name: line.name.clone(),
            rate: line.rate,
            amount: line.amount,
        })
        .collect();

    let (status, payment_status, is_completed) = match action {
        SyncAction::Finalized => (order.status, PaymentStatus::Unpaid, false),
        SyncAction::Paid => (OrderStatus::Done, PaymentStatus::Paid, true),
    };

    OrderMirror {
        order_id: order.id,
        hub_id: order.hub_id,
        expected_version: order.version,
        items,
        subtotal: bill.subtotal,
        discount_amount: bill.discount_amount,
        service_charge_amount: bill.service_charge_amount,
        tax_amount: bill.tax_amount,
        total: bill.total,
        applied_discount_percent: Some(bill.applied_discount_percent),
        applied_service_charge_percent: Some(bill.applied_service_charge_percent),
        applied_taxes,
        status,
        payment_status,
        is_completed,
        updated_at: now,
    }
}
