use chrono::{NaiveDateTime, TimeDelta};
use pushkind_common::repository::errors::RepositoryError;
use rust_decimal::Decimal;
use serde_json::json;

use tablebill::domain::bill::{
    AuditEntry, BillAction, BillInsert, BillItem, BillListQuery, BillSave, BillStatus, NewBill,
};
use tablebill::domain::event::BusMessage;
use tablebill::domain::order::{
    NewOrder, NewOrderItem, OrderItemStatus, OrderListQuery, OrderMirror, OrderStatus,
    PaymentStatus,
};
use tablebill::domain::pricing::{NewPricingConfig, TenantSettings};
use tablebill::domain::table::NewDiningTable;
use tablebill::repository::{
    BillReader, BillWriter, CacheStore, DieselRepository, EventStore, OrderReader, OrderWriter,
    PricingReader, PricingWriter, TableReader, TableWriter,
};
use tablebill::services::totals::{TotalsOptions, compute_totals};

mod common;

fn now() -> NaiveDateTime {
    chrono::Local::now().naive_utc()
}

fn new_bill(hub_id: i32, order_id: Option<i32>, session_id: &str) -> NewBill {
    let items = vec![BillItem {
        item_id: 1,
        name: "Tea".to_string(),
        quantity: 2,
        price: Decimal::new(1250, 2),
        modifiers: Vec::new(),
        notes: None,
        created_at: None,
    }];
    let totals = compute_totals(&items, &[], &[], &TotalsOptions::default()).unwrap();

    NewBill {
        hub_id,
        order_id,
        table_id: None,
        table_number: None,
        session_id: Some(session_id.to_string()),
        items,
        extras: Vec::new(),
        additional_discounts: Vec::new(),
        totals,
        pricing_version: None,
        pricing_config_id: None,
        staff_alias: None,
        audit_trail: vec![AuditEntry {
            actor: "system".to_string(),
            action: BillAction::CreatedManual,
            at: now(),
        }],
        updated_at: now(),
    }
}

#[test]
fn test_pricing_versions_and_activation() {
    let test_db = common::TestDb::new("test_pricing_versions.db");
    let repo = DieselRepository::new(test_db.pool());

    let first = repo
        .create_pricing_config(
            &NewPricingConfig::new(1)
                .with_tax("GST", Decimal::from(5))
                .activated(),
        )
        .unwrap();
    let second = repo
        .create_pricing_config(&NewPricingConfig::new(1).with_tax("GST", Decimal::from(8)))
        .unwrap();
    let third = repo
        .create_pricing_config(
            &NewPricingConfig::new(1)
                .with_percentages(Decimal::from(10), Decimal::new(125, 1))
                .activated(),
        )
        .unwrap();
    repo.create_pricing_config(&NewPricingConfig::new(2).activated())
        .unwrap();

    assert_eq!((first.version, second.version, third.version), (1, 2, 3));

    let configs = repo.list_pricing_configs(1).unwrap();
    assert_eq!(configs.len(), 3);
    let active: Vec<i32> = configs
        .iter()
        .filter(|config| config.active)
        .map(|config| config.version)
        .collect();
    assert_eq!(active, vec![3]);
    assert_eq!(configs[2].service_charge_percent, Decimal::new(125, 1));
    assert_eq!(configs[0].taxes[0].name, "GST");

    let activated = repo.activate_pricing_config(second.id, 1).unwrap();
    assert!(activated.active);
    let active: Vec<i32> = repo
        .list_pricing_configs(1)
        .unwrap()
        .iter()
        .filter(|config| config.active)
        .map(|config| config.version)
        .collect();
    assert_eq!(active, vec![2]);

    let err = repo
        .activate_pricing_config(second.id, 2)
        .expect_err("expected hub-scoped activation to fail");
    assert!(matches!(err, RepositoryError::NotFound));

    // Other hubs keep their own versions.
    let other = repo.list_pricing_configs(2).unwrap();
    assert_eq!(other.len(), 1);
    assert_eq!(other[0].version, 1);
    assert!(other[0].active);
}

#[test]
fn test_tenant_settings_upsert() {
    let test_db = common::TestDb::new("test_tenant_settings.db");
    let repo = DieselRepository::new(test_db.pool());

    assert!(repo.get_tenant_settings(1).unwrap().is_none());

    let mut settings = TenantSettings {
        hub_id: 1,
        tax_percent: Decimal::from(5),
        service_charge_percent: Decimal::from(10),
        discount_percent: Decimal::ZERO,
        updated_at: now(),
    };
    repo.save_tenant_settings(&settings).unwrap();

    settings.tax_percent = Decimal::new(75, 1);
    repo.save_tenant_settings(&settings).unwrap();

    let stored = repo.get_tenant_settings(1).unwrap().unwrap();
    assert_eq!(stored.tax_percent, Decimal::new(75, 1));
    assert_eq!(stored.service_charge_percent, Decimal::from(10));
}

#[test]
fn test_orders_and_tables() {
    let test_db = common::TestDb::new("test_orders_and_tables.db");
    let repo = DieselRepository::new(test_db.pool());

    let table = repo.create_table(&NewDiningTable::new(1, " 12 ")).unwrap();
    assert_eq!(table.number, "12");
    assert!(repo.get_table_by_id(table.id, 2).unwrap().is_none());

    let order = repo
        .create_order(
            &NewOrder::new(1, "session-a")
                .with_table(table.id, Some(table.number.clone()))
                .with_item(NewOrderItem::new(5, "Soup", 2, Decimal::new(450, 2)))
                .with_item(
                    NewOrderItem::new(6, "Bread", 1, Decimal::from(2))
                        .with_status(OrderItemStatus::Cancelled),
                ),
        )
        .unwrap();
    repo.create_order(&NewOrder::new(1, "session-b")).unwrap();
    repo.create_order(&NewOrder::new(2, "session-a")).unwrap();

    let loaded = repo.get_order_by_id(order.id, 1).unwrap().unwrap();
    assert_eq!(loaded.items.len(), 2);
    assert_eq!(loaded.items[0].price, Some(Decimal::new(450, 2)));
    assert_eq!(loaded.items[1].status, OrderItemStatus::Cancelled);
    assert_eq!(loaded.table_number.as_deref(), Some("12"));
    assert!(repo.get_order_by_id(order.id, 2).unwrap().is_none());

    let (total, orders) = repo
        .list_orders(OrderListQuery::new(1).session_id("session-a"))
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(orders[0].id, order.id);

    let (total, _) = repo
        .list_orders(OrderListQuery::new(1).table_id(table.id))
        .unwrap();
    assert_eq!(total, 1);

    let (total, page) = repo
        .list_orders(OrderListQuery::new(1).paginate(1, 1))
        .unwrap();
    assert_eq!(total, 2);
    assert_eq!(page.len(), 1);
}

#[test]
fn test_insert_bill_if_absent_per_order() {
    let test_db = common::TestDb::new("test_insert_bill_per_order.db");
    let repo = DieselRepository::new(test_db.pool());
    let order = repo.create_order(&NewOrder::new(1, "session-a")).unwrap();

    let created = match repo
        .insert_bill_if_absent(&new_bill(1, Some(order.id), "session-a"))
        .unwrap()
    {
        BillInsert::Created(bill) => bill,
        BillInsert::Existing(bill) => panic!("unexpected existing bill {}", bill.id),
    };
    assert_eq!(created.status, BillStatus::Draft);
    assert_eq!(created.subtotal, Decimal::from(25));
    assert_eq!(created.items[0].name, "Tea");

    match repo
        .insert_bill_if_absent(&new_bill(1, Some(order.id), "session-a"))
        .unwrap()
    {
        BillInsert::Existing(existing) => assert_eq!(existing.id, created.id),
        BillInsert::Created(bill) => panic!("second active bill {} created", bill.id),
    }

    // Once paid the order may be billed again.
    let mut paid = created.clone();
    paid.status = BillStatus::Paid;
    assert!(matches!(
        repo.save_bill(&paid, None).unwrap(),
        BillSave::Saved(_)
    ));
    assert!(matches!(
        repo.insert_bill_if_absent(&new_bill(1, Some(order.id), "session-a"))
            .unwrap(),
        BillInsert::Created(_)
    ));

    // A manual bill on the same session is a different scope.
    assert!(matches!(
        repo.insert_bill_if_absent(&new_bill(1, None, "session-a"))
            .unwrap(),
        BillInsert::Created(_)
    ));
    assert!(matches!(
        repo.insert_bill_if_absent(&new_bill(1, None, "session-a"))
            .unwrap(),
        BillInsert::Existing(_)
    ));
}

#[test]
fn test_reopening_a_paid_bill_reports_the_newer_active_bill() {
    let test_db = common::TestDb::new("test_reopen_conflict.db");
    let repo = DieselRepository::new(test_db.pool());
    let order = repo.create_order(&NewOrder::new(1, "session-a")).unwrap();

    let BillInsert::Created(first) = repo
        .insert_bill_if_absent(&new_bill(1, Some(order.id), "session-a"))
        .unwrap()
    else {
        panic!("expected a new bill");
    };

    let mut paid = first.clone();
    paid.status = BillStatus::Paid;
    let BillSave::Saved(paid) = repo.save_bill(&paid, None).unwrap() else {
        panic!("expected the payment to be saved");
    };

    let BillInsert::Created(second) = repo
        .insert_bill_if_absent(&new_bill(1, Some(order.id), "session-a"))
        .unwrap()
    else {
        panic!("expected a second bill once the first was paid");
    };

    let mut reopened = paid.clone();
    reopened.status = BillStatus::Draft;
    match repo.save_bill(&reopened, None).unwrap() {
        BillSave::Conflict(other) => assert_eq!(other.id, second.id),
        other => panic!("unexpected save result: {other:?}"),
    }

    let stored = repo.get_bill_by_id(paid.id, 1).unwrap().unwrap();
    assert_eq!(stored.status, BillStatus::Paid);
    assert_eq!(stored.version, paid.version);

    // Same rule for manual bills sharing a session.
    let BillInsert::Created(manual) = repo
        .insert_bill_if_absent(&new_bill(1, None, "session-m"))
        .unwrap()
    else {
        panic!("expected a manual bill");
    };
    let mut manual_paid = manual.clone();
    manual_paid.status = BillStatus::Paid;
    let BillSave::Saved(manual_paid) = repo.save_bill(&manual_paid, None).unwrap() else {
        panic!("expected the manual payment to be saved");
    };
    repo.insert_bill_if_absent(&new_bill(1, None, "session-m"))
        .unwrap();
    let mut manual_reopened = manual_paid.clone();
    manual_reopened.status = BillStatus::Draft;
    assert!(matches!(
        repo.save_bill(&manual_reopened, None).unwrap(),
        BillSave::Conflict(_)
    ));
}

#[test]
fn test_malformed_bill_documents_fail_the_load() {
    use diesel::prelude::*;
    use tablebill::schema::bills;

    let test_db = common::TestDb::new("test_malformed_bill.db");
    let repo = DieselRepository::new(test_db.pool());

    let BillInsert::Created(bill) = repo.insert_bill_if_absent(&new_bill(1, None, "s-1")).unwrap()
    else {
        panic!("expected a new bill");
    };

    let mut conn = test_db.pool().get().unwrap();
    diesel::update(bills::table.filter(bills::id.eq(bill.id)))
        .set(bills::items.eq("{not json"))
        .execute(&mut conn)
        .unwrap();

    assert!(repo.get_bill_by_id(bill.id, 1).is_err());
    assert!(repo.list_bills(BillListQuery::new(1)).is_err());
}

#[test]
fn test_list_bills_filters() {
    let test_db = common::TestDb::new("test_list_bills.db");
    let repo = DieselRepository::new(test_db.pool());

    let mut with_table = new_bill(1, None, "s-1");
    with_table.table_id = Some(4);
    repo.insert_bill_if_absent(&with_table).unwrap();
    repo.insert_bill_if_absent(&new_bill(1, None, "s-2")).unwrap();
    repo.insert_bill_if_absent(&new_bill(2, None, "s-3")).unwrap();

    let (total, bills) = repo
        .list_bills(BillListQuery::new(1).statuses(&BillStatus::ACTIVE))
        .unwrap();
    assert_eq!(total, 2);
    assert!(bills.iter().all(|bill| bill.hub_id == 1));

    let (total, bills) = repo
        .list_bills(BillListQuery::new(1).table_id(4))
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(bills[0].session_id.as_deref(), Some("s-1"));

    let (total, _) = repo
        .list_bills(BillListQuery::new(1).statuses(&[BillStatus::Paid]))
        .unwrap();
    assert_eq!(total, 0);
}

#[test]
fn test_save_bill_compares_versions() {
    let test_db = common::TestDb::new("test_save_bill_versions.db");
    let repo = DieselRepository::new(test_db.pool());

    let BillInsert::Created(bill) = repo.insert_bill_if_absent(&new_bill(1, None, "s-1")).unwrap()
    else {
        panic!("expected a new bill");
    };

    let mut edited = bill.clone();
    edited.staff_alias = Some("Bob".to_string());
    let saved = match repo.save_bill(&edited, None).unwrap() {
        BillSave::Saved(saved) => saved,
        other => panic!("fresh bill not saved: {other:?}"),
    };
    assert_eq!(saved.version, bill.version + 1);
    assert_eq!(saved.staff_alias.as_deref(), Some("Bob"));

    // The original copy is now behind.
    assert_eq!(repo.save_bill(&bill, None).unwrap(), BillSave::Stale);

    let mut foreign = saved.clone();
    foreign.hub_id = 2;
    assert!(matches!(
        repo.save_bill(&foreign, None),
        Err(RepositoryError::NotFound)
    ));
}

#[test]
fn test_save_bill_mirrors_into_order() {
    let test_db = common::TestDb::new("test_save_bill_mirror.db");
    let repo = DieselRepository::new(test_db.pool());

    let order = repo
        .create_order(
            &NewOrder::new(1, "session-a")
                .with_item(NewOrderItem::new(1, "Tea", 1, Decimal::from(3))),
        )
        .unwrap();
    let BillInsert::Created(bill) = repo
        .insert_bill_if_absent(&new_bill(1, Some(order.id), "session-a"))
        .unwrap()
    else {
        panic!("expected a new bill");
    };

    let original_created_at = order.items[0].created_at;
    let mirror = OrderMirror {
        order_id: order.id,
        hub_id: 1,
        expected_version: order.version,
        items: vec![NewOrderItem {
            created_at: Some(original_created_at),
            ..NewOrderItem::new(1, "Tea", 2, Decimal::new(1250, 2))
                .with_status(OrderItemStatus::Served)
        }],
        subtotal: Decimal::from(25),
        discount_amount: Decimal::ZERO,
        service_charge_amount: Decimal::ZERO,
        tax_amount: Decimal::ZERO,
        total: Decimal::from(25),
        applied_discount_percent: Some(Decimal::ZERO),
        applied_service_charge_percent: Some(Decimal::ZERO),
        applied_taxes: Vec::new(),
        status: OrderStatus::Done,
        payment_status: PaymentStatus::Paid,
        is_completed: true,
        updated_at: now(),
    };

    // A stale order version rolls back the bill as well.
    let stale_mirror = OrderMirror {
        expected_version: order.version + 7,
        ..mirror.clone()
    };
    let mut paid = bill.clone();
    paid.status = BillStatus::Paid;
    assert_eq!(
        repo.save_bill(&paid, Some(&stale_mirror)).unwrap(),
        BillSave::Stale
    );
    let unchanged = repo.get_bill_by_id(bill.id, 1).unwrap().unwrap();
    assert_eq!(unchanged.status, BillStatus::Draft);
    assert_eq!(unchanged.version, bill.version);

    assert!(matches!(
        repo.save_bill(&paid, Some(&mirror)).unwrap(),
        BillSave::Saved(_)
    ));

    let synced = repo.get_order_by_id(order.id, 1).unwrap().unwrap();
    assert_eq!(synced.version, order.version + 1);
    assert_eq!(synced.status, OrderStatus::Done);
    assert_eq!(synced.payment_status, PaymentStatus::Paid);
    assert!(synced.is_completed);
    assert_eq!(synced.total, Decimal::from(25));
    assert_eq!(synced.items.len(), 1);
    assert_eq!(synced.items[0].quantity, 2);
    assert_eq!(synced.items[0].status, OrderItemStatus::Served);
    assert_eq!(synced.items[0].created_at, original_created_at);
}

#[test]
fn test_cache_entries_expire() {
    let test_db = common::TestDb::new("test_cache_entries.db");
    let repo = DieselRepository::new(test_db.pool());
    let start = now();
    let later = start + TimeDelta::seconds(10);

    assert!(
        repo.insert_cache_value_if_absent("lock", "1", start, later)
            .unwrap()
    );
    assert!(
        !repo
            .insert_cache_value_if_absent("lock", "1", start, later)
            .unwrap()
    );
    assert_eq!(
        repo.get_cache_value("lock", start).unwrap().as_deref(),
        Some("1")
    );

    // Expired entries are ignored and replaced.
    let after_expiry = later + TimeDelta::seconds(1);
    assert_eq!(repo.get_cache_value("lock", after_expiry).unwrap(), None);
    assert!(
        repo.insert_cache_value_if_absent(
            "lock",
            "2",
            after_expiry,
            after_expiry + TimeDelta::seconds(10)
        )
        .unwrap()
    );

    // Only the current owner removes the lock.
    assert!(!repo.delete_cache_value("lock", "1").unwrap());
    assert!(repo.delete_cache_value("lock", "2").unwrap());
    assert!(!repo.delete_cache_value("lock", "2").unwrap());

    repo.put_cache_value("idempotency:1:k", "5", start, later).unwrap();
    repo.put_cache_value("idempotency:1:k", "6", start, later).unwrap();
    assert_eq!(
        repo.get_cache_value("idempotency:1:k", start)
            .unwrap()
            .as_deref(),
        Some("6")
    );
}

#[test]
fn test_storing_cache_value_purges_expired_rows() {
    use diesel::prelude::*;
    use tablebill::schema::cache_entries;

    let test_db = common::TestDb::new("test_cache_purge.db");
    let repo = DieselRepository::new(test_db.pool());
    let start = now();
    let later = start + TimeDelta::seconds(10);

    for n in 0..5 {
        repo.put_cache_value(&format!("idempotency:1:order:1:k{n}"), "1", start, start)
            .unwrap();
    }
    assert!(
        repo.insert_cache_value_if_absent("bill-lock:1:order:9", "t", start, start)
            .unwrap()
    );

    repo.put_cache_value("idempotency:1:order:2:fresh", "2", later, later + TimeDelta::seconds(10))
        .unwrap();

    let mut conn = test_db.pool().get().unwrap();
    let remaining = cache_entries::table
        .select(cache_entries::key)
        .load::<String>(&mut conn)
        .unwrap();
    assert_eq!(remaining, vec!["idempotency:1:order:2:fresh".to_string()]);
}

#[test]
fn test_bus_events_are_appended_in_order() {
    let test_db = common::TestDb::new("test_bus_events.db");
    let repo = DieselRepository::new(test_db.pool());

    for event in ["billCreated", "billUpdated", "billFinalized"] {
        repo.append_bus_event(
            "restaurant:1:table:4",
            &BusMessage {
                event: event.to_string(),
                data: json!({ "id": 1 }),
            },
        )
        .unwrap();
    }

    let events = repo.list_bus_events(0, 10).unwrap();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].message.event, "billCreated");
    assert_eq!(events[2].message.data["id"], 1);
    assert_eq!(events[0].channel, "restaurant:1:table:4");

    let tail = repo.list_bus_events(events[0].id, 1).unwrap();
    assert_eq!(tail.len(), 1);
    assert_eq!(tail[0].message.event, "billUpdated");
}
