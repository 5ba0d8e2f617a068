//! Integration tests for the rowtree-sqlite crate.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

use rowtree_core::{PropertyMap, PropertyValue, Resource, ResourceKind, ResourcePath, RootPath};
use rowtree_sqlite::{
    PutOutcome, ResourceDataFactory, SharedConnection, TABLE_NAME_PROPERTY, share,
};
use rusqlite::Connection;

/// Creates a factory rooted at `/x/` over a fresh in-memory database.
fn factory() -> ResourceDataFactory {
    let conn = share(Connection::open_in_memory().unwrap());
    ResourceDataFactory::new(conn, "/x/").unwrap()
}

fn account(name: &str, email: &str, balance: i64) -> PropertyMap {
    let mut props = PropertyMap::new();
    props.insert("name".into(), name.into());
    props.insert("email".into(), email.into());
    props.insert("balance".into(), balance.into());
    props
}

fn put(factory: &ResourceDataFactory, path: &str, props: PropertyMap) -> PutOutcome {
    factory
        .put(path, Some(&Resource::record(path, props)))
        .unwrap()
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn empty_table_resolves_and_has_no_children() {
    let factory = factory();

    let table = factory.get("/x/accounts").unwrap().unwrap();
    assert_eq!(table.kind, ResourceKind::Table);
    assert_eq!(
        table.get(TABLE_NAME_PROPERTY),
        Some(&PropertyValue::from("ACCOUNTS"))
    );
    assert!(factory.list_children("/x/accounts").unwrap().is_empty());
}

#[test]
fn put_full_record_then_get() {
    let factory = factory();
    put(&factory, "/x/accounts/u1", account("Ann", "a@x.com", 10));

    let row = factory.get("/x/accounts/u1").unwrap().unwrap();
    let mut expected = account("Ann", "a@x.com", 10);
    expected.insert("userid".into(), "u1".into());
    assert_eq!(row.properties(), &expected);
    assert_eq!(row.path, "/x/accounts/u1");
}

#[test]
fn put_empty_record_applies_defaults() {
    let factory = factory();
    put(&factory, "/x/accounts/u1", PropertyMap::new());

    let row = factory.get("/x/accounts/u1").unwrap().unwrap();
    assert_eq!(row.get("userid"), Some(&PropertyValue::from("u1")));
    assert_eq!(row.get("name"), Some(&PropertyValue::from("[no name]")));
    assert_eq!(row.get("email"), Some(&PropertyValue::from("[no email]")));
    assert_eq!(row.get("balance"), Some(&PropertyValue::from(0)));
}

#[test]
fn put_absent_deletes_record() {
    let factory = factory();
    put(&factory, "/x/accounts/u1", account("Ann", "a@x.com", 10));

    assert_eq!(
        factory.put("/x/accounts/u1", None).unwrap(),
        PutOutcome::Deleted
    );
    assert_eq!(factory.get("/x/accounts/u1").unwrap(), None);
}

#[test]
fn unsupported_table_is_absent() {
    let factory = factory();
    assert_eq!(factory.get("/x/other/u1").unwrap(), None);
    assert_eq!(factory.get("/x/other").unwrap(), None);
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[test]
fn missing_keys_are_absent() {
    let factory = factory();
    put(&factory, "/x/accounts/present", PropertyMap::new());

    for key in ["absent", "PRESENT", "present ", "u%", "' OR '1'='1"] {
        let path = format!("/x/accounts/{key}");
        assert_eq!(factory.get(&path).unwrap(), None, "key {key:?}");
    }
}

#[test]
fn delete_is_idempotent() {
    let factory = factory();
    assert_eq!(
        factory.put("/x/accounts/ghost", None).unwrap(),
        PutOutcome::Deleted
    );
    assert_eq!(factory.get("/x/accounts/ghost").unwrap(), None);
}

#[test]
fn repeated_put_overwrites() {
    let factory = factory();
    put(&factory, "/x/accounts/u1", account("Ann", "a@x.com", 10));
    put(&factory, "/x/accounts/u1", account("Ann", "ann@x.com", 15));

    let row = factory.get("/x/accounts/u1").unwrap().unwrap();
    assert_eq!(row.get("email"), Some(&PropertyValue::from("ann@x.com")));
    assert_eq!(row.get("balance"), Some(&PropertyValue::from(15)));
    assert_eq!(factory.list_children("/x/accounts").unwrap().len(), 1);
}

#[test]
fn children_match_findable_rows() {
    let factory = factory();
    for key in ["a", "b", "c", "d"] {
        put(&factory, &format!("/x/accounts/{key}"), PropertyMap::new());
    }
    factory.put("/x/accounts/c", None).unwrap();

    let children = factory.list_children("/x/accounts").unwrap();
    let unique: BTreeSet<_> = children.iter().cloned().collect();
    assert_eq!(unique.len(), children.len(), "duplicate children");
    assert_eq!(
        unique,
        BTreeSet::from([
            "/x/accounts/a".to_string(),
            "/x/accounts/b".to_string(),
            "/x/accounts/d".to_string(),
        ])
    );
    for child in &children {
        assert!(factory.get(child).unwrap().is_some(), "{child} not found");
    }
}

#[test]
fn rows_have_no_children() {
    let factory = factory();
    put(&factory, "/x/accounts/u1", PropertyMap::new());
    assert!(factory.list_children("/x/accounts/u1").unwrap().is_empty());
    assert!(factory.list_children("/x/accounts/missing").unwrap().is_empty());
}

#[test]
fn relative_paths_resolve_like_absolute_ones() {
    let factory = factory();
    put(&factory, "accounts/u1", account("Ann", "a@x.com", 10));

    let absolute = factory.get("/x/accounts/u1").unwrap().unwrap();
    let relative = factory.get("accounts/u1").unwrap().unwrap();
    assert_eq!(absolute.properties(), relative.properties());

    let root = RootPath::new("/x/").unwrap();
    assert_eq!(
        ResourcePath::resolve(&root, "/x/accounts/u1"),
        ResourcePath::resolve(&root, "accounts/u1")
    );
    assert_eq!(
        factory.list_children("accounts").unwrap(),
        ["accounts/u1"]
    );
}

#[test]
fn malformed_writes_change_nothing() {
    let factory = factory();
    assert!(matches!(
        put(&factory, "/x/accounts", PropertyMap::new()),
        PutOutcome::Rejected(_)
    ));
    assert!(matches!(
        put(&factory, "/x/accounts/u1/deeper", PropertyMap::new()),
        PutOutcome::Rejected(_)
    ));
    assert!(matches!(
        put(&factory, "/x/other/u1", PropertyMap::new()),
        PutOutcome::Rejected(_)
    ));
    assert!(factory.list_children("/x/accounts").unwrap().is_empty());
}

#[test]
fn non_integer_balance_is_a_storage_error() {
    let factory = factory();
    let mut props = PropertyMap::new();
    props.insert("balance".into(), "plenty".into());

    let err = factory
        .put("/x/accounts/u1", Some(&Resource::record("/x/accounts/u1", props)))
        .unwrap_err();
    assert!(err.to_string().contains("balance"));
    assert_eq!(factory.get("/x/accounts/u1").unwrap(), None);
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

#[test]
fn storage_failure_is_not_reported_as_absent() {
    let conn: SharedConnection = share(Connection::open_in_memory().unwrap());
    let factory = ResourceDataFactory::new(conn.clone(), "/x/").unwrap();
    conn.lock()
        .unwrap()
        .execute_batch("DROP TABLE ACCOUNTS;")
        .unwrap();

    assert!(factory.get("/x/accounts/u1").is_err());
    assert!(factory.list_children("/x/accounts").is_err());
    // Table-level metadata is static and needs no storage.
    assert!(factory.get("/x/accounts").unwrap().is_some());
}

#[test]
fn data_persists_across_connections() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("accounts.db");

    {
        let conn = share(Connection::open(&db).unwrap());
        let factory = ResourceDataFactory::new(conn, "/x/").unwrap();
        put(&factory, "/x/accounts/u1", account("Ann", "a@x.com", 10));
    }

    let conn = share(Connection::open(&db).unwrap());
    let factory = ResourceDataFactory::new(conn, "/x/").unwrap();
    let row = factory.get("/x/accounts/u1").unwrap().unwrap();
    assert_eq!(row.get("name"), Some(&PropertyValue::from("Ann")));
}

#[test]
fn existing_table_is_reused() {
    let conn = share(Connection::open_in_memory().unwrap());
    conn.lock()
        .unwrap()
        .execute_batch(
            "CREATE TABLE ACCOUNTS(USERID VARCHAR(63) PRIMARY KEY, NAME VARCHAR(255), \
             EMAIL VARCHAR(255), BALANCE INT);
             INSERT INTO ACCOUNTS VALUES ('legacy', 'Old', 'old@x.com', 3);",
        )
        .unwrap();

    let factory = ResourceDataFactory::new(conn, "/x/").unwrap();
    let row = factory.get("/x/accounts/legacy").unwrap().unwrap();
    assert_eq!(row.get("balance"), Some(&PropertyValue::from(3)));
}

#[test]
fn concurrent_writers_share_one_connection() {
    let factory = Arc::new(factory());

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let factory = Arc::clone(&factory);
            thread::spawn(move || {
                for i in 0..25 {
                    let path = format!("/x/accounts/w{worker}-{i}");
                    let mut props = PropertyMap::new();
                    props.insert("balance".into(), (i as i64).into());
                    factory
                        .put(&path, Some(&Resource::record(&path, props)))
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(factory.list_children("/x/accounts").unwrap().len(), 100);
    assert_eq!(factory.status().unwrap()[0].row_count, 100);
}
