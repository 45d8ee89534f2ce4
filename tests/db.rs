mod common;

#[test]
fn test_creates_and_removes_db_files() {
    let path = {
        let test_db = common::TestDb::new("test_db_lifecycle.db");
        let conn = test_db.pool().get();
        assert!(conn.is_ok());
        assert!(test_db.path().exists());
        test_db.path().to_path_buf()
    };

    assert!(!path.exists());
    assert!(!path.with_extension("db-shm").exists());
    assert!(!path.with_extension("db-wal").exists());
}

#[test]
fn test_migrations_create_billing_tables() {
    use diesel::RunQueryDsl;
    use diesel::sql_types::Text;

    #[derive(diesel::QueryableByName)]
    struct TableName {
        #[diesel(sql_type = Text)]
        name: String,
    }

    let test_db = common::TestDb::new("test_migrations.db");
    let mut conn = test_db.pool().get().unwrap();

    let tables: Vec<String> =
        diesel::sql_query("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .load::<TableName>(&mut conn)
            .unwrap()
            .into_iter()
            .map(|table| table.name)
            .collect();

    for expected in [
        "bills",
        "bus_events",
        "cache_entries",
        "dining_tables",
        "order_items",
        "orders",
        "pricing_configs",
        "tenant_settings",
    ] {
        assert!(
            tables.iter().any(|name| name == expected),
            "missing table {expected}"
        );
    }
}
