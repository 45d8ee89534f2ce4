use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::money::{format_decimal, from_cents, parse_decimal, to_cents};
use crate::domain::order::{
    NewOrder as DomainNewOrder, NewOrderItem as DomainNewOrderItem, Order as DomainOrder,
    OrderItem as DomainOrderItem, OrderMirror as DomainOrderMirror,
};
use crate::models::{decode_json, encode_json};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::orders)]
pub struct Order {
    pub id: i32,
    pub hub_id: i32,
    pub table_id: Option<i32>,
    pub table_number: Option<String>,
    pub session_id: String,
    pub status: String,
    pub payment_status: String,
    pub is_completed: bool,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub service_charge_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub applied_discount_percent: Option<String>,
    pub applied_service_charge_percent: Option<String>,
    pub applied_taxes: String,
    pub version: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(table_name = crate::schema::order_items)]
#[diesel(belongs_to(Order, foreign_key = order_id))]
pub struct OrderItem {
    pub id: i32,
    pub order_id: i32,
    pub item_id: Option<i32>,
    pub menu_item_id: Option<i32>,
    pub name: String,
    pub quantity: i32,
    pub price_cents: Option<i64>,
    pub price_at_order_cents: Option<i64>,
    pub modifiers: String,
    pub notes: Option<String>,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::orders)]
pub struct NewOrder<'a> {
    pub hub_id: i32,
    pub table_id: Option<i32>,
    pub table_number: Option<&'a str>,
    pub session_id: &'a str,
    pub status: &'static str,
    pub applied_discount_percent: Option<String>,
    pub applied_service_charge_percent: Option<String>,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::order_items)]
pub struct NewOrderItem<'a> {
    pub order_id: i32,
    pub item_id: Option<i32>,
    pub menu_item_id: Option<i32>,
    pub name: &'a str,
    pub quantity: i32,
    pub price_cents: Option<i64>,
    pub price_at_order_cents: Option<i64>,
    pub modifiers: String,
    pub notes: Option<&'a str>,
    pub status: &'static str,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Changeset written by the bill-to-order mirror.
#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::orders)]
#[diesel(treat_none_as_null = true)]
pub struct OrderMirror {
    pub status: &'static str,
    pub payment_status: &'static str,
    pub is_completed: bool,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub service_charge_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub applied_discount_percent: Option<String>,
    pub applied_service_charge_percent: Option<String>,
    pub applied_taxes: String,
    pub version: i32,
    pub updated_at: NaiveDateTime,
}

impl Order {
    pub fn into_domain(self, items: Vec<OrderItem>) -> DomainOrder {
        DomainOrder {
            id: self.id,
            hub_id: self.hub_id,
            table_id: self.table_id,
            table_number: self.table_number,
            session_id: self.session_id,
            items: items.into_iter().map(OrderItem::into_domain).collect(),
            subtotal: from_cents(self.subtotal_cents),
            discount_amount: from_cents(self.discount_cents),
            service_charge_amount: from_cents(self.service_charge_cents),
            tax_amount: from_cents(self.tax_cents),
            total: from_cents(self.total_cents),
            applied_discount_percent: self.applied_discount_percent.as_deref().map(parse_decimal),
            applied_service_charge_percent: self
                .applied_service_charge_percent
                .as_deref()
                .map(parse_decimal),
            applied_taxes: decode_json(&self.applied_taxes, "orders.applied_taxes"),
            status: self.status.as_str().into(),
            payment_status: self.payment_status.as_str().into(),
            is_completed: self.is_completed,
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl OrderItem {
    pub fn into_domain(self) -> DomainOrderItem {
        DomainOrderItem {
            id: self.id,
            item_id: self.item_id,
            menu_item_id: self.menu_item_id,
            name: self.name,
            quantity: self.quantity,
            price: self.price_cents.map(from_cents),
            price_at_order: self.price_at_order_cents.map(from_cents),
            modifiers: decode_json(&self.modifiers, "order_items.modifiers"),
            notes: self.notes,
            status: self.status.as_str().into(),
            created_at: self.created_at,
        }
    }
}

impl From<(Order, Vec<OrderItem>)> for DomainOrder {
    fn from(value: (Order, Vec<OrderItem>)) -> Self {
        value.0.into_domain(value.1)
    }
}

impl<'a> From<&'a DomainNewOrder> for NewOrder<'a> {
    fn from(value: &'a DomainNewOrder) -> Self {
        Self {
            hub_id: value.hub_id,
            table_id: value.table_id,
            table_number: value.table_number.as_deref(),
            session_id: value.session_id.as_str(),
            status: value.status.into(),
            applied_discount_percent: value.applied_discount_percent.map(format_decimal),
            applied_service_charge_percent: value
                .applied_service_charge_percent
                .map(format_decimal),
            updated_at: value.updated_at,
        }
    }
}

impl<'a> NewOrderItem<'a> {
    pub fn from_domain(order_id: i32, value: &'a DomainNewOrderItem, now: NaiveDateTime) -> Self {
        Self {
            order_id,
            item_id: value.item_id,
            menu_item_id: value.menu_item_id,
            name: value.name.as_str(),
            quantity: value.quantity,
            price_cents: value.price.map(to_cents),
            price_at_order_cents: value.price_at_order.map(to_cents),
            modifiers: encode_json(&value.modifiers),
            notes: value.notes.as_deref(),
            status: value.status.into(),
            created_at: value.created_at.unwrap_or(now),
            updated_at: now,
        }
    }
}

impl From<&DomainOrderMirror> for OrderMirror {
    fn from(value: &DomainOrderMirror) -> Self {
        Self {
            status: value.status.into(),
            payment_status: value.payment_status.into(),
            is_completed: value.is_completed,
            subtotal_cents: to_cents(value.subtotal),
            discount_cents: to_cents(value.discount_amount),
            service_charge_cents: to_cents(value.service_charge_amount),
            tax_cents: to_cents(value.tax_amount),
            total_cents: to_cents(value.total),
            applied_discount_percent: value.applied_discount_percent.map(format_decimal),
            applied_service_charge_percent: value
                .applied_service_charge_percent
                .map(format_decimal),
            applied_taxes: encode_json(&value.applied_taxes),
            version: value.expected_version + 1,
            updated_at: value.updated_at,
        }
    }
}
