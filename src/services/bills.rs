//! Bill lifecycle: creation from an order or by hand, draft edits,
//! finalization, payment and reopening.
//!
//! At most one draft or finalized bill exists per order (and, for manual
//! bills, per dining session). The cache lock narrows the race window but
//! the repository's atomic "insert unless active" is what guarantees it.
//! Every save is a compare-and-swap on the bill version; stale saves are
//! reloaded and re-applied a bounded number of times.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use pushkind_common::repository::errors::RepositoryError;
use pushkind_common::routes::check_role;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use thiserror::Error;

use crate::SERVICE_ACCESS_ROLE;
use crate::cache::{
    CacheGateway, LockGuard, NoopCache, order_idempotency_key, order_lock_key,
    session_idempotency_key, session_lock_key,
};
use crate::domain::bill::{
    AdditionalDiscount, AuditEntry, Bill, BillAction, BillDraftUpdate, BillInsert, BillItem,
    BillListQuery, BillSave, BillStatus, CreateBillFromOrder, CreateManualBill, ItemRef,
    LineItemInput, NewBill,
};
use crate::domain::event::{BillEvent, BusMessage, channel_for};
use crate::domain::order::{OrderItem, OrderItemStatus, OrderMirror, PaymentStatus};
use crate::events::{EventPublisher, NoopPublisher};
use crate::forms::bills::{BillFormError, MANUAL_DISCOUNT_LABEL};
use crate::repository::{BillReader, BillWriter, OrderReader, PricingReader, TableReader};
use crate::services::pricing::resolve_pricing;
use crate::services::sync::{SyncAction, build_order_mirror};
use crate::services::totals::{TotalsError, TotalsOptions, compute_totals};

/// Actor recorded when a bill is created without a staff alias.
pub const SYSTEM_ACTOR: &str = "system";

pub type BillResult<T> = Result<T, BillError>;

/// Errors returned by the bill lifecycle.
#[derive(Debug, Error)]
pub enum BillError {
    #[error("unauthorized")]
    Unauthorized,
    /// Malformed input; the message names the offending field.
    #[error("{0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("bill is {0} and can no longer be edited")]
    NotEditable(BillStatus),
    /// The idempotency key was already used; carries the bill it created.
    #[error("Duplicate request")]
    Duplicate(Box<Bill>),
    /// Another draft or finalized bill covers the same order or session.
    #[error("Active bill exists")]
    ActiveBillExists(Box<Bill>),
    #[error("bill cannot move from {from} to {to}")]
    InvalidTransition { from: BillStatus, to: BillStatus },
    #[error("bill was modified concurrently, retry the request")]
    ConcurrentModification,
    #[error("failed to compute bill totals: {0}")]
    Computation(#[from] TotalsError),
    #[error("storage failure: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<BillFormError> for BillError {
    fn from(value: BillFormError) -> Self {
        BillError::Validation(value.to_string())
    }
}

/// Tunables of the lifecycle, read from configuration at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillSettings {
    pub lock_ttl: Duration,
    pub idempotency_ttl: Duration,
    /// Saves attempted before giving up with `ConcurrentModification`.
    pub max_save_attempts: u32,
}

impl Default for BillSettings {
    fn default() -> Self {
        Self {
            lock_ttl: Duration::from_millis(5_000),
            idempotency_ttl: Duration::from_secs(24 * 60 * 60),
            max_save_attempts: 3,
        }
    }
}

/// Orchestrates bill operations over a repository, a cache gateway and an
/// event publisher.
pub struct BillService<R> {
    repo: R,
    cache: Arc<dyn CacheGateway>,
    events: Arc<dyn EventPublisher>,
    settings: BillSettings,
}

impl<R> BillService<R> {
    /// Service without locks, idempotency records or events.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            cache: Arc::new(NoopCache),
            events: Arc::new(NoopPublisher),
            settings: BillSettings::default(),
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn CacheGateway>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_events(mut self, events: Arc<dyn EventPublisher>) -> Self {
        self.events = events;
        self
    }

    pub fn with_settings(mut self, settings: BillSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }
}

fn now() -> NaiveDateTime {
    chrono::Local::now().naive_utc()
}

fn authorize(user: &AuthenticatedUser, hub_id: i32) -> BillResult<()> {
    if user.hub_id != hub_id {
        return Err(BillError::Unauthorized);
    }
    Ok(())
}

fn authorize_admin(user: &AuthenticatedUser, hub_id: i32) -> BillResult<()> {
    authorize(user, hub_id)?;
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(BillError::Unauthorized);
    }
    Ok(())
}

/// Name recorded in audit entries for actions taken by `user`.
fn actor_name(user: &AuthenticatedUser) -> String {
    let name = user.name.trim();
    if name.is_empty() {
        user.email.clone()
    } else {
        name.to_string()
    }
}

fn order_line(item: &OrderItem) -> LineItemInput {
    LineItemInput {
        item_id: item.item_id,
        menu_item_id: item.menu_item_id,
        line_id: Some(item.id),
        name: Some(item.name.clone()),
        quantity: Some(Decimal::from(item.quantity)),
        price: item.price,
        price_at_order: item.price_at_order,
        modifiers: item.modifiers.clone(),
        notes: item.notes.clone(),
        created_at: Some(item.created_at),
    }
}

/// Coerce one raw line into a bill line. Fails only when no identifier
/// can be resolved.
fn normalize_line(index: usize, input: &LineItemInput) -> BillResult<BillItem> {
    let reference = ItemRef::resolve(input.item_id, input.menu_item_id, input.line_id)
        .ok_or_else(|| BillError::Validation(format!("items[{index}] has no item identifier")))?;

    let quantity = input
        .quantity
        .and_then(|quantity| quantity.trunc().to_i32())
        .filter(|quantity| *quantity >= 1)
        .unwrap_or(1);

    let price = input
        .price
        .or(input.price_at_order)
        .unwrap_or_default()
        .max(Decimal::ZERO);

    Ok(BillItem {
        item_id: reference.id(),
        name: input
            .name
            .clone()
            .unwrap_or_else(|| format!("Item {}", reference.id())),
        quantity,
        price,
        modifiers: input.modifiers.clone(),
        notes: input.notes.clone(),
        created_at: input.created_at,
    })
}

fn normalize_lines(inputs: &[LineItemInput]) -> BillResult<Vec<BillItem>> {
    inputs
        .iter()
        .enumerate()
        .map(|(index, input)| normalize_line(index, input))
        .collect()
}

impl<R> BillService<R>
where
    R: OrderReader + TableReader + PricingReader + BillReader + BillWriter,
{
    /// Bills an order. Percentages come from the request, then from the
    /// order, then from the hub pricing; taxes always come from the hub
    /// pricing.
    pub fn create_from_order(
        &self,
        user: &AuthenticatedUser,
        hub_id: i32,
        order_id: i32,
        options: CreateBillFromOrder,
        idempotency: Option<&str>,
    ) -> BillResult<Bill> {
        authorize(user, hub_id)?;
        if order_id <= 0 {
            return Err(BillError::Validation(
                "orderId must be a positive integer".to_string(),
            ));
        }

        let idempotency = idempotency.map(|key| order_idempotency_key(hub_id, order_id, key));
        if let Some(key) = idempotency.as_deref() {
            self.reject_duplicate(hub_id, key)?;
        }

        let _lock = LockGuard::try_acquire(
            self.cache.as_ref(),
            order_lock_key(hub_id, order_id),
            self.settings.lock_ttl,
        );

        if let Some(existing) = self.repo.find_active_bill_for_order(hub_id, order_id)? {
            log::info!("Order {order_id} of hub {hub_id} already has active bill {}", existing.id);
            return Err(BillError::ActiveBillExists(Box::new(existing)));
        }

        let order = self
            .repo
            .get_order_by_id(order_id, hub_id)?
            .ok_or(BillError::NotFound("order"))?;

        let table_number = self.table_number(hub_id, order.table_id, order.table_number.clone());
        let pricing = resolve_pricing(&self.repo, hub_id);

        let discount_percent = options
            .discount_percent
            .or(order.applied_discount_percent)
            .unwrap_or(pricing.global_discount_percent);
        let service_charge_percent = options
            .service_charge_percent
            .or(order.applied_service_charge_percent)
            .unwrap_or(pricing.service_charge_percent);

        let lines: Vec<LineItemInput> = order
            .items
            .iter()
            .filter(|item| item.status != OrderItemStatus::Cancelled)
            .map(order_line)
            .collect();
        let items = normalize_lines(&lines)?;

        let additional_discounts: Vec<AdditionalDiscount> = options
            .discount_amount
            .map(|amount| amount.abs())
            .filter(|amount| *amount > Decimal::ZERO)
            .map(|amount| AdditionalDiscount {
                label: Some(MANUAL_DISCOUNT_LABEL.to_string()),
                amount,
            })
            .into_iter()
            .collect();

        if let Some(amount) = options.service_charge_amount {
            log::info!(
                "Ignoring fixed service charge {amount} for order {order_id}, service charge is a percentage"
            );
        }

        let totals = compute_totals(
            &items,
            &options.extras,
            &pricing.taxes,
            &TotalsOptions {
                discount_percent,
                service_charge_percent,
                additional_discount_amount: additional_discounts
                    .iter()
                    .map(|discount| discount.amount)
                    .sum(),
            },
        )
        .inspect_err(|err| {
            log::error!(
                "Failed to compute totals for order {order_id} of hub {hub_id}: {err}; \
                 items: {items:?}, extras: {:?}, taxes: {:?}, discount: {discount_percent}%, \
                 service charge: {service_charge_percent}%",
                options.extras,
                pricing.taxes
            );
        })?;

        let created_at = now();
        let actor = options
            .staff_alias
            .clone()
            .unwrap_or_else(|| SYSTEM_ACTOR.to_string());

        let new_bill = NewBill {
            hub_id,
            order_id: Some(order_id),
            table_id: order.table_id,
            table_number,
            session_id: Some(order.session_id.clone()),
            items,
            extras: options.extras,
            additional_discounts,
            totals,
            pricing_version: pricing.version,
            pricing_config_id: pricing.config_id,
            staff_alias: options.staff_alias,
            audit_trail: vec![AuditEntry {
                actor,
                action: BillAction::CreatedFromOrder,
                at: created_at,
            }],
            updated_at: created_at,
        };

        self.insert_bill(&new_bill, idempotency.as_deref())
    }

    /// Opens an ad hoc bill for a dining session without an order.
    pub fn create_manual(
        &self,
        user: &AuthenticatedUser,
        hub_id: i32,
        input: CreateManualBill,
        idempotency: Option<&str>,
    ) -> BillResult<Bill> {
        authorize_admin(user, hub_id)?;

        let idempotency =
            idempotency.map(|key| session_idempotency_key(hub_id, &input.session_id, key));
        if let Some(key) = idempotency.as_deref() {
            self.reject_duplicate(hub_id, key)?;
        }

        let _lock = LockGuard::try_acquire(
            self.cache.as_ref(),
            session_lock_key(hub_id, &input.session_id),
            self.settings.lock_ttl,
        );

        if let Some(existing) = self
            .repo
            .find_active_bill_for_session(hub_id, &input.session_id)?
        {
            log::info!(
                "Session {} of hub {hub_id} already has active bill {}",
                input.session_id,
                existing.id
            );
            return Err(BillError::ActiveBillExists(Box::new(existing)));
        }

        let table_number = match input.table_id {
            Some(table_id) => Some(
                self.repo
                    .get_table_by_id(table_id, hub_id)?
                    .ok_or(BillError::NotFound("table"))?
                    .number,
            ),
            None => None,
        };

        let items = normalize_lines(&input.items)?;
        let pricing = resolve_pricing(&self.repo, hub_id);

        let totals = compute_totals(
            &items,
            &input.extras,
            &pricing.taxes,
            &TotalsOptions {
                discount_percent: pricing.global_discount_percent,
                service_charge_percent: pricing.service_charge_percent,
                additional_discount_amount: Decimal::ZERO,
            },
        )
        .inspect_err(|err| {
            log::error!(
                "Failed to compute totals for manual bill of session {} in hub {hub_id}: {err}; \
                 items: {items:?}, extras: {:?}, pricing: {pricing:?}",
                input.session_id,
                input.extras
            );
        })?;

        let created_at = now();
        let actor = input
            .staff_alias
            .clone()
            .unwrap_or_else(|| SYSTEM_ACTOR.to_string());

        let new_bill = NewBill {
            hub_id,
            order_id: None,
            table_id: input.table_id,
            table_number,
            session_id: Some(input.session_id),
            items,
            extras: input.extras,
            additional_discounts: Vec::new(),
            totals,
            pricing_version: pricing.version,
            pricing_config_id: pricing.config_id,
            staff_alias: input.staff_alias,
            audit_trail: vec![AuditEntry {
                actor,
                action: BillAction::CreatedManual,
                at: created_at,
            }],
            updated_at: created_at,
        };

        self.insert_bill(&new_bill, idempotency.as_deref())
    }

    /// Applies edits to a draft bill and recomputes its totals.
    pub fn update_draft(
        &self,
        user: &AuthenticatedUser,
        hub_id: i32,
        bill_id: i32,
        update: BillDraftUpdate,
    ) -> BillResult<Bill> {
        authorize(user, hub_id)?;

        let items = update
            .items
            .as_deref()
            .map(normalize_lines)
            .transpose()?;
        let refreshed = update
            .refresh_pricing
            .then(|| resolve_pricing(&self.repo, hub_id));
        let actor = update
            .staff_alias
            .clone()
            .unwrap_or_else(|| actor_name(user));

        self.save_with_retry(hub_id, bill_id, BillEvent::Updated, |bill, at| {
            if bill.status != BillStatus::Draft {
                return Err(BillError::NotEditable(bill.status));
            }

            if let Some(items) = &items {
                bill.items = items.clone();
            }
            if let Some(extras) = &update.extras {
                bill.extras = extras.clone();
            }
            if let Some(discounts) = &update.additional_discounts {
                bill.additional_discounts = discounts
                    .iter()
                    .map(|discount| AdditionalDiscount {
                        label: discount.label.clone(),
                        amount: discount.amount.abs(),
                    })
                    .filter(|discount| discount.amount > Decimal::ZERO)
                    .collect();
            }
            if let Some(alias) = &update.staff_alias {
                bill.staff_alias = Some(alias.clone());
            }

            let taxes = match &refreshed {
                Some(pricing) => {
                    bill.pricing_version = pricing.version;
                    bill.pricing_config_id = pricing.config_id;
                    pricing.taxes.clone()
                }
                None => bill.tax_rules(),
            };

            let discount_percent = update
                .discount_percent
                .or(refreshed.as_ref().map(|pricing| pricing.global_discount_percent))
                .unwrap_or(bill.applied_discount_percent);
            let service_charge_percent = update
                .service_charge_percent
                .or(refreshed.as_ref().map(|pricing| pricing.service_charge_percent))
                .unwrap_or(bill.applied_service_charge_percent);

            let totals = compute_totals(
                &bill.items,
                &bill.extras,
                &taxes,
                &TotalsOptions {
                    discount_percent,
                    service_charge_percent,
                    additional_discount_amount: bill.additional_discount_total(),
                },
            )
            .inspect_err(|err| {
                log::error!(
                    "Failed to compute totals for bill {bill_id} of hub {hub_id}: {err}; \
                     items: {:?}, extras: {:?}, discounts: {:?}, taxes: {taxes:?}",
                    bill.items,
                    bill.extras,
                    bill.additional_discounts
                );
            })?;

            bill.apply_totals(totals);
            bill.record(actor.clone(), BillAction::Updated, at);

            Ok(None)
        })
    }

    /// `draft -> finalized`. Mirrors the bill into its order, which stays open.
    pub fn finalize(
        &self,
        user: &AuthenticatedUser,
        hub_id: i32,
        bill_id: i32,
    ) -> BillResult<Bill> {
        authorize(user, hub_id)?;
        let actor = actor_name(user);

        self.save_with_retry(hub_id, bill_id, BillEvent::Finalized, |bill, at| {
            if bill.status != BillStatus::Draft {
                return Err(BillError::InvalidTransition {
                    from: bill.status,
                    to: BillStatus::Finalized,
                });
            }

            bill.status = BillStatus::Finalized;
            bill.finalized_by = Some(actor.clone());
            bill.finalized_at = Some(at);
            bill.record(actor.clone(), BillAction::Finalized, at);

            self.order_mirror(bill, SyncAction::Finalized, at)
        })
    }

    /// `finalized -> paid`. Mirrors the bill into its order and closes it.
    pub fn mark_paid(
        &self,
        user: &AuthenticatedUser,
        hub_id: i32,
        bill_id: i32,
    ) -> BillResult<Bill> {
        authorize(user, hub_id)?;
        let actor = actor_name(user);

        self.save_with_retry(hub_id, bill_id, BillEvent::Paid, |bill, at| {
            if bill.status != BillStatus::Finalized {
                return Err(BillError::InvalidTransition {
                    from: bill.status,
                    to: BillStatus::Paid,
                });
            }

            bill.status = BillStatus::Paid;
            bill.payment_status = PaymentStatus::Paid;
            bill.paid_by = Some(actor.clone());
            bill.paid_at = Some(at);
            bill.record(actor.clone(), BillAction::Paid, at);

            self.order_mirror(bill, SyncAction::Paid, at)
        })
    }

    /// `finalized | paid -> draft`, clearing payment and finalization.
    /// The order mirror is left untouched. A paid bill no longer blocks new
    /// bills for its scope, so the save reports any bill opened since.
    pub fn reopen(&self, user: &AuthenticatedUser, hub_id: i32, bill_id: i32) -> BillResult<Bill> {
        authorize_admin(user, hub_id)?;
        let actor = actor_name(user);

        self.save_with_retry(hub_id, bill_id, BillEvent::Reopened, |bill, at| {
            if bill.status == BillStatus::Draft {
                return Err(BillError::InvalidTransition {
                    from: bill.status,
                    to: BillStatus::Draft,
                });
            }

            bill.status = BillStatus::Draft;
            bill.payment_status = PaymentStatus::Unpaid;
            bill.finalized_by = None;
            bill.finalized_at = None;
            bill.paid_by = None;
            bill.paid_at = None;
            bill.record(actor.clone(), BillAction::Reopened, at);

            Ok(None)
        })
    }

    pub fn get_bill(&self, user: &AuthenticatedUser, hub_id: i32, bill_id: i32) -> BillResult<Bill> {
        authorize(user, hub_id)?;

        self.repo
            .get_bill_by_id(bill_id, hub_id)?
            .ok_or(BillError::NotFound("bill"))
    }

    /// Draft and finalized bills of the hub, most recently changed first.
    pub fn list_active(
        &self,
        user: &AuthenticatedUser,
        hub_id: i32,
        table_id: Option<i32>,
        session_id: Option<&str>,
    ) -> BillResult<Vec<Bill>> {
        authorize(user, hub_id)?;

        let mut query = BillListQuery::new(hub_id).statuses(&BillStatus::ACTIVE);
        if let Some(table_id) = table_id {
            query = query.table_id(table_id);
        }
        if let Some(session_id) = session_id {
            query = query.session_id(session_id);
        }

        let (_, bills) = self.repo.list_bills(query)?;
        Ok(bills)
    }

    /// Paid bills of the hub, most recently changed first.
    pub fn list_history(
        &self,
        user: &AuthenticatedUser,
        hub_id: i32,
        page: usize,
    ) -> BillResult<Paginated<Bill>> {
        authorize(user, hub_id)?;

        let page = page.max(1);
        let query = BillListQuery::new(hub_id)
            .statuses(&[BillStatus::Paid])
            .paginate(page, DEFAULT_ITEMS_PER_PAGE);

        let (total, bills) = self.repo.list_bills(query)?;
        let total_pages = total.div_ceil(DEFAULT_ITEMS_PER_PAGE);

        Ok(Paginated::new(bills, page, total_pages))
    }

    fn reject_duplicate(&self, hub_id: i32, key: &str) -> BillResult<()> {
        let Some(stored) = self.cache.check_key(key) else {
            return Ok(());
        };

        let Ok(bill_id) = stored.parse::<i32>() else {
            log::warn!("Ignoring malformed idempotency record {key}: {stored:?}");
            return Ok(());
        };

        match self.repo.get_bill_by_id(bill_id, hub_id)? {
            Some(bill) => {
                log::info!("Duplicate request {key} answered with bill {bill_id}");
                Err(BillError::Duplicate(Box::new(bill)))
            }
            None => {
                log::warn!("Idempotency record {key} points to missing bill {bill_id}");
                Ok(())
            }
        }
    }

    fn insert_bill(&self, new_bill: &NewBill, idempotency: Option<&str>) -> BillResult<Bill> {
        match self.repo.insert_bill_if_absent(new_bill)? {
            BillInsert::Existing(existing) => {
                log::info!(
                    "Lost bill creation race in hub {} to bill {}",
                    new_bill.hub_id,
                    existing.id
                );
                Err(BillError::ActiveBillExists(Box::new(existing)))
            }
            BillInsert::Created(bill) => {
                if let Some(key) = idempotency {
                    self.cache
                        .store_key(key, &bill.id.to_string(), self.settings.idempotency_ttl);
                }
                log::info!("Created bill {} in hub {}", bill.id, bill.hub_id);
                self.announce(BillEvent::Created, &bill);
                Ok(bill)
            }
        }
    }

    /// Reload, mutate and compare-and-swap the bill until the save lands.
    fn save_with_retry<F>(
        &self,
        hub_id: i32,
        bill_id: i32,
        event: BillEvent,
        mut mutate: F,
    ) -> BillResult<Bill>
    where
        F: FnMut(&mut Bill, NaiveDateTime) -> BillResult<Option<OrderMirror>>,
    {
        let attempts = self.settings.max_save_attempts.max(1);

        for attempt in 1..=attempts {
            let mut bill = self
                .repo
                .get_bill_by_id(bill_id, hub_id)?
                .ok_or(BillError::NotFound("bill"))?;

            let mirror = mutate(&mut bill, now())?;

            match self.repo.save_bill(&bill, mirror.as_ref())? {
                BillSave::Saved(saved) => {
                    self.announce(event, &saved);
                    return Ok(saved);
                }
                BillSave::Stale => {
                    log::info!("Bill {bill_id} changed while saving, attempt {attempt}/{attempts}");
                }
                BillSave::Conflict(other) => {
                    log::info!(
                        "Bill {bill_id} of hub {hub_id} cannot become active, bill {} is",
                        other.id
                    );
                    return Err(BillError::ActiveBillExists(Box::new(other)));
                }
            }
        }

        log::warn!("Giving up on bill {bill_id} after {attempts} concurrent modifications");
        Err(BillError::ConcurrentModification)
    }

    fn order_mirror(
        &self,
        bill: &Bill,
        action: SyncAction,
        at: NaiveDateTime,
    ) -> BillResult<Option<OrderMirror>> {
        let Some(order_id) = bill.order_id else {
            log::debug!("Bill {} has no order to sync", bill.id);
            return Ok(None);
        };

        match self.repo.get_order_by_id(order_id, bill.hub_id)? {
            Some(order) => Ok(Some(build_order_mirror(bill, &order, action, at))),
            None => {
                log::warn!("Order {order_id} of bill {} is gone, skipping sync", bill.id);
                Ok(None)
            }
        }
    }

    fn table_number(
        &self,
        hub_id: i32,
        table_id: Option<i32>,
        known: Option<String>,
    ) -> Option<String> {
        if known.is_some() {
            return known;
        }
        let table_id = table_id?;
        match self.repo.get_table_by_id(table_id, hub_id) {
            Ok(table) => table.map(|table| table.number),
            Err(err) => {
                log::warn!("Failed to look up table {table_id} of hub {hub_id}: {err}");
                None
            }
        }
    }

    fn announce(&self, event: BillEvent, bill: &Bill) {
        let data = match serde_json::to_value(bill) {
            Ok(data) => data,
            Err(err) => {
                log::error!("Failed to serialize bill {} for {}: {err}", bill.id, event.name());
                return;
            }
        };

        self.events.publish(
            &channel_for(bill.hub_id, bill.table_id),
            BusMessage {
                event: event.name().to_string(),
                data,
            },
        );
    }
}
