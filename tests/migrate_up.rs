use edgemigrate::core::db::MigrationStore;
use edgemigrate::core::error::MigrateError;
use edgemigrate::core::{report, runner};
use std::path::Path;
use tempfile::TempDir;

fn open_store(dir: &Path) -> MigrationStore {
    let store = MigrationStore::open(dir).expect("open store");
    store.ensure_schema().expect("ensure schema");
    store
}

fn write_migration(dir: &Path, name: &str, sql: &str) {
    std::fs::write(dir.join(name), sql).expect("write migration file");
}

/// `(version, dirty)` rows in insertion order.
fn migration_rows(store: &MigrationStore) -> Vec<(String, i64)> {
    let mut stmt = store
        .conn()
        .prepare("SELECT version, dirty FROM migrations ORDER BY migration_id")
        .expect("prepare");
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .expect("query");
    rows.collect::<Result<Vec<_>, _>>().expect("collect rows")
}

fn table_exists(store: &MigrationStore, name: &str) -> bool {
    let count: i64 = store
        .conn()
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [name],
            |row| row.get(0),
        )
        .expect("query sqlite_master");
    count == 1
}

#[test]
fn up_applies_pending_migrations_in_order_and_advances_head() {
    let tmp = TempDir::new().expect("tempdir");
    let store = open_store(tmp.path());

    write_migration(
        tmp.path(),
        "0001_create_nodes.sql",
        "CREATE TABLE nodes (name TEXT NOT NULL, type INTEGER NOT NULL,
                             state INTEGER NOT NULL, plugin_name TEXT NOT NULL);",
    );
    write_migration(
        tmp.path(),
        "0002_create_groups.sql",
        "CREATE TABLE groups (driver_name TEXT NOT NULL, name TEXT NOT NULL,
                              interval INTEGER NOT NULL);",
    );
    write_migration(
        tmp.path(),
        "0003_add_group_index.sql",
        "CREATE INDEX idx_groups_driver ON groups(driver_name);",
    );

    runner::migrate_up(&store, tmp.path(), None).expect("up");

    let head = store.head().expect("head");
    assert_eq!(head.version.as_deref(), Some("0003"));
    assert!(!head.dirty);

    let rows = migration_rows(&store);
    assert_eq!(
        rows,
        vec![
            ("0001".to_string(), 0),
            ("0002".to_string(), 0),
            ("0003".to_string(), 0),
        ]
    );
    assert!(table_exists(&store, "nodes"));
    assert!(table_exists(&store, "groups"));
}

#[test]
fn up_twice_makes_no_additional_inserts() {
    let tmp = TempDir::new().expect("tempdir");
    let store = open_store(tmp.path());
    write_migration(tmp.path(), "0001_create_t.sql", "CREATE TABLE t (v TEXT);");

    runner::migrate_up(&store, tmp.path(), None).expect("first up");
    runner::migrate_up(&store, tmp.path(), None).expect("second up");

    let rows = migration_rows(&store);
    assert_eq!(rows, vec![("0001".to_string(), 0)]);
    let head = store.head().expect("head");
    assert_eq!(head.version.as_deref(), Some("0001"));
}

#[test]
fn dirty_head_blocks_up_with_zero_writes() {
    let tmp = TempDir::new().expect("tempdir");
    let store = open_store(tmp.path());

    store
        .conn()
        .execute(
            "INSERT INTO migrations (version, description, dirty) VALUES ('0001', 'broken', 1)",
            [],
        )
        .expect("seed dirty row");
    write_migration(tmp.path(), "0002_create_t.sql", "CREATE TABLE t (v TEXT);");

    let err = runner::migrate_up(&store, tmp.path(), None).expect_err("must refuse");
    assert!(matches!(err, MigrateError::DirtyState), "{err}");

    let rows = migration_rows(&store);
    assert_eq!(rows, vec![("0001".to_string(), 1)]);
    assert!(!table_exists(&store, "t"));
}

#[test]
fn unparseable_file_names_are_never_applied() {
    let tmp = TempDir::new().expect("tempdir");
    let store = open_store(tmp.path());

    write_migration(tmp.path(), "_missing_version.sql", "CREATE TABLE nope (v);");
    std::fs::write(tmp.path().join("README.md"), "# not a migration").expect("write");
    write_migration(tmp.path(), "0001_create_t.sql", "CREATE TABLE t (v TEXT);");

    runner::migrate_up(&store, tmp.path(), None).expect("up");

    let rows = migration_rows(&store);
    assert_eq!(rows, vec![("0001".to_string(), 0)]);
    assert!(!table_exists(&store, "nope"));
}

#[test]
fn target_version_bounds_the_batch_and_is_idempotent() {
    let tmp = TempDir::new().expect("tempdir");
    let store = open_store(tmp.path());
    write_migration(tmp.path(), "0001_a.sql", "CREATE TABLE a (v TEXT);");
    write_migration(tmp.path(), "0002_b.sql", "CREATE TABLE b (v TEXT);");
    write_migration(tmp.path(), "0003_c.sql", "CREATE TABLE c (v TEXT);");

    runner::migrate_up(&store, tmp.path(), Some("0002")).expect("targeted up");

    let head = store.head().expect("head");
    assert_eq!(head.version.as_deref(), Some("0002"));
    assert_eq!(migration_rows(&store).len(), 2);
    assert!(!table_exists(&store, "c"));

    // Re-invoking with the same target is a no-op.
    runner::migrate_up(&store, tmp.path(), Some("0002")).expect("targeted re-run");
    assert_eq!(migration_rows(&store).len(), 2);
}

#[test]
fn failing_script_halts_the_batch_and_leaves_a_dirty_record() {
    let tmp = TempDir::new().expect("tempdir");
    let store = open_store(tmp.path());
    write_migration(tmp.path(), "0001_a.sql", "CREATE TABLE a (v TEXT);");
    write_migration(tmp.path(), "0002_bad.sql", "THIS IS NOT SQL;");
    write_migration(tmp.path(), "0003_c.sql", "CREATE TABLE c (v TEXT);");

    let err = runner::migrate_up(&store, tmp.path(), None).expect_err("bad script must fail");
    match err {
        MigrateError::Script { file, .. } => assert_eq!(file, "0002_bad.sql"),
        other => panic!("unexpected error: {other}"),
    }

    // The earlier migration stays applied, the failing one stays dirty, the
    // rest of the batch never ran.
    let rows = migration_rows(&store);
    assert_eq!(rows, vec![("0001".to_string(), 0), ("0002".to_string(), 1)]);
    assert!(table_exists(&store, "a"));
    assert!(!table_exists(&store, "c"));

    // And the dirty breadcrumb blocks every later run until repaired.
    let err = runner::migrate_up(&store, tmp.path(), None).expect_err("must stay blocked");
    assert!(matches!(err, MigrateError::DirtyState), "{err}");
}

#[test]
fn head_on_empty_table_is_the_empty_sentinel() {
    let tmp = TempDir::new().expect("tempdir");
    let store = open_store(tmp.path());

    let head = store.head().expect("head");
    assert_eq!(head.version, None);
    assert_eq!(head.description, None);
    assert_eq!(head.created_at, None);
    assert!(!head.dirty);
}

#[test]
fn show_reports_without_error_on_empty_and_dirty_stores() {
    let tmp = TempDir::new().expect("tempdir");
    let store = open_store(tmp.path());

    report::print_head(&store).expect("show on empty store");

    store
        .conn()
        .execute(
            "INSERT INTO migrations (version, description, dirty) VALUES ('0001', 'broken', 1)",
            [],
        )
        .expect("seed dirty row");
    report::print_head(&store).expect("show on dirty store");
}
