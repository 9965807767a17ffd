//! End-to-end facade tests against SQLite.
//!
//! Every test opens its own in-memory adapter; the pool tests use a
//! file-backed temp directory because separate in-memory connections do
//! not share a database.

use std::collections::BTreeMap;

use rowmap::{args, error_code, Db, Error, ErrorCode, Json, Provider, Record, RowmapConfig, Table};
use rowmap_sqlite::{PooledSqliteAdapter, SqliteAdapter};
use serde::{Deserialize, Serialize};
use tempfile::TempDir;

const SCHEMA: &str = "
    CREATE TABLE users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        age INTEGER,
        nickname TEXT,
        created_at TEXT NOT NULL DEFAULT '2024-01-01'
    );
    CREATE TABLE customers (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        street TEXT NOT NULL,
        city TEXT NOT NULL,
        vip INTEGER NOT NULL DEFAULT 0,
        badge BLOB
    );
    CREATE TABLE memberships (
        user_id INTEGER NOT NULL,
        group_id INTEGER NOT NULL,
        role TEXT NOT NULL,
        PRIMARY KEY (user_id, group_id)
    );
    CREATE TABLE notes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        body TEXT NOT NULL
    );
    CREATE TABLE settings (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        prefs TEXT NOT NULL
    );
    CREATE TABLE events (
        label TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT '2024-01-01'
    );
    CREATE TABLE codes (
        code TEXT PRIMARY KEY,
        body TEXT NOT NULL
    );
";

#[derive(Debug, Default, Clone, PartialEq, Record)]
struct User {
    #[rowmap("id,pk")]
    id: i64,
    #[rowmap("name")]
    name: String,
    #[rowmap("age")]
    age: i32,
    #[rowmap("nickname")]
    nickname: Option<String>,
}

/// Same table, with the database default read back after insert.
#[derive(Debug, Default, Clone, PartialEq, Record)]
struct StampedUser {
    #[rowmap("id,pk")]
    id: i64,
    #[rowmap("name")]
    name: String,
    #[rowmap("created_at,generated")]
    created_at: String,
}

#[derive(Debug, Default, Clone, PartialEq, Record)]
struct Address {
    #[rowmap("street")]
    street: String,
    #[rowmap("city")]
    city: String,
}

#[derive(Debug, Default, Clone, PartialEq, Record)]
struct Customer {
    #[rowmap("id,pk")]
    id: i64,
    #[rowmap("name")]
    name: String,
    #[rowmap("address,embed")]
    address: Address,
    #[rowmap("extra,remainder")]
    extra: Json<BTreeMap<String, serde_json::Value>>,
}

#[derive(Debug, Default, Clone, PartialEq, Record)]
struct Membership {
    #[rowmap("user_id")]
    user_id: i64,
    #[rowmap("group_id")]
    group_id: i64,
    #[rowmap("role")]
    role: String,
}

/// No `pk` tag: the key falls back to the configured default id column.
#[derive(Debug, Default, Clone, PartialEq, Record)]
struct Note {
    #[rowmap("id")]
    id: i64,
    #[rowmap("body")]
    body: String,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
struct Prefs {
    theme: String,
    tabs: u8,
}

#[derive(Debug, Default, Clone, PartialEq, Record)]
struct Settings {
    #[rowmap("id,pk")]
    id: i64,
    #[rowmap("prefs")]
    prefs: Json<Prefs>,
}

/// A generated column but no key to find the row by.
#[derive(Debug, Default, Clone, PartialEq, Record)]
struct Event {
    #[rowmap("label")]
    label: String,
    #[rowmap("created_at,generated")]
    created_at: String,
}

/// Text primary key that the caller must assign.
#[derive(Debug, Default, Clone, PartialEq, Record)]
struct Code {
    #[rowmap("code,pk")]
    code: String,
    #[rowmap("body")]
    body: String,
}

fn users() -> Table {
    Table::new("users")
}

fn memory_db() -> Db {
    let adapter = SqliteAdapter::open_in_memory().unwrap();
    let db = Db::new(adapter).unwrap();
    for statement in SCHEMA.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        db.exec(statement, &[]).unwrap();
    }
    db
}

fn user(name: &str, age: i32) -> User {
    User {
        name: name.to_string(),
        age,
        ..Default::default()
    }
}

#[test]
fn insert_query_update_delete_lifecycle() {
    let db = memory_db();

    let mut record = user("a", 1);
    db.insert(&users(), &mut record).unwrap();
    assert_eq!(record.id, 1);

    let found: User = db.query_one(&users(), "id = ?", &args![1]).unwrap();
    assert_eq!(found, User { id: 1, ..user("a", 1) });

    db.update(&users(), &User { id: 1, ..user("b", 2) }).unwrap();
    let found: User = db.query_one(&users(), "id = ?", &args![1]).unwrap();
    assert_eq!(found, User { id: 1, ..user("b", 2) });

    db.delete(&users(), &found).unwrap();
    let err = db.query_one::<User>(&users(), "id = ?", &args![1]).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.error_code(), error_code::NOT_FOUND);
}

#[test]
fn insert_reads_back_generated_columns() {
    let db = memory_db();
    let mut stamped = StampedUser {
        name: "bob".to_string(),
        ..Default::default()
    };
    db.insert(&users(), &mut stamped).unwrap();
    assert_eq!(stamped.id, 1);
    assert_eq!(stamped.created_at, "2024-01-01");
}

#[test]
fn generated_column_without_key_is_rejected_before_insert() {
    let db = memory_db();
    let mut event = Event {
        label: "x".to_string(),
        ..Default::default()
    };
    let err = db.insert(&Table::new("events"), &mut event).unwrap_err();
    assert_eq!(err.error_code(), error_code::INVALID_MAPPING);
    assert!(err.to_string().contains("generated columns need a key"));

    let stored: Vec<Event> = db.query(&Table::new("events"), "", &[]).unwrap();
    assert!(stored.is_empty());
}

#[test]
fn empty_text_key_is_missing_before_insert() {
    let db = memory_db();
    let codes = Table::new("codes");

    let mut blank = Code {
        code: String::new(),
        body: "b".to_string(),
    };
    let err = db.insert(&codes, &mut blank).unwrap_err();
    assert!(matches!(err, Error::MissingPrimaryKey { ref column, .. } if column == "code"));
    let stored: Vec<Code> = db.query(&codes, "", &[]).unwrap();
    assert!(stored.is_empty());

    // One bad record stops the whole batch before any row is written.
    let mut batch = vec![
        Code {
            code: "c1".to_string(),
            body: "a".to_string(),
        },
        Code {
            code: String::new(),
            body: "b".to_string(),
        },
    ];
    let err = db.insert_all(&codes, &mut batch).unwrap_err();
    assert_eq!(err.error_code(), error_code::MISSING_PRIMARY_KEY);
    let stored: Vec<Code> = db.query(&codes, "", &[]).unwrap();
    assert!(stored.is_empty());

    let mut assigned = Code {
        code: "c1".to_string(),
        body: "a".to_string(),
    };
    db.insert(&codes, &mut assigned).unwrap();
    let found: Code = db.query_one(&codes, "code = ?", &args!["c1"]).unwrap();
    assert_eq!(found, assigned);
}

#[test]
fn insert_keeps_caller_assigned_key() {
    let db = memory_db();
    let mut carol = User {
        id: 42,
        ..user("carol", 5)
    };
    db.insert(&users(), &mut carol).unwrap();
    let found: User = db.query_one(&users(), "name = ?", &args!["carol"]).unwrap();
    assert_eq!(found.id, 42);
}

#[test]
fn insert_all_assigns_ids_in_order() {
    let db = memory_db();
    let mut batch = vec![user("a", 1), user("b", 2), user("c", 3)];
    db.insert_all(&users(), &mut batch).unwrap();
    let ids: Vec<i64> = batch.iter().map(|u| u.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn query_preserves_database_order_and_handles_empty_filter() {
    let db = memory_db();
    for (name, age) in [("x", 3), ("y", 1), ("z", 2)] {
        db.insert(&users(), &mut user(name, age)).unwrap();
    }

    let by_age: Vec<User> = db
        .query_sql("FROM users WHERE age > ? ORDER BY age", &args![0])
        .unwrap();
    let names: Vec<&str> = by_age.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, vec!["y", "z", "x"]);

    let all: Vec<User> = db.query(&users(), "", &[]).unwrap();
    assert_eq!(all.len(), 3);

    let none: Vec<User> = db.query(&users(), "age > ?", &args![100]).unwrap();
    assert!(none.is_empty());
}

#[test]
fn query_one_returns_first_of_several_rows() {
    let db = memory_db();
    db.insert(&users(), &mut user("first", 7)).unwrap();
    db.insert(&users(), &mut user("second", 7)).unwrap();

    let found: User = db
        .query_one_sql("SELECT * FROM users WHERE age = ? ORDER BY id", &args![7])
        .unwrap();
    assert_eq!(found.name, "first");
}

#[test]
fn null_columns_decode_to_zero_values_and_none() {
    let db = memory_db();
    db.exec("INSERT INTO users (name, age, nickname) VALUES (?, NULL, NULL)", &args!["n"])
        .unwrap();
    let found: User = db.query_one(&users(), "name = ?", &args!["n"]).unwrap();
    assert_eq!(found.age, 0);
    assert_eq!(found.nickname, None);
}

#[test]
fn update_of_missing_row_is_not_found() {
    let db = memory_db();
    let ghost = User {
        id: 99,
        ..user("ghost", 1)
    };
    assert!(db.update(&users(), &ghost).unwrap_err().is_not_found());
    assert!(db.delete(&users(), &ghost).unwrap_err().is_not_found());
}

#[test]
fn zero_key_is_rejected_before_touching_the_database() {
    let db = memory_db();
    let unsaved = user("nobody", 1);
    for err in [
        db.update(&users(), &unsaved).unwrap_err(),
        db.patch(&users(), &unsaved).unwrap_err(),
        db.delete(&users(), &unsaved).unwrap_err(),
    ] {
        match err {
            Error::MissingPrimaryKey { table, column } => {
                assert_eq!(table, "users");
                assert_eq!(column, "id");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

#[test]
fn patch_leaves_null_fields_untouched() {
    let db = memory_db();
    let mut dave = User {
        nickname: Some("d".to_string()),
        ..user("dave", 40)
    };
    db.insert(&users(), &mut dave).unwrap();

    let partial = User {
        id: dave.id,
        nickname: None,
        ..user("david", 41)
    };
    db.patch(&users(), &partial).unwrap();

    let found: User = db.query_one(&users(), "id = ?", &args![dave.id]).unwrap();
    assert_eq!(found.name, "david");
    assert_eq!(found.nickname.as_deref(), Some("d"));
}

#[test]
fn delete_by_id_uses_the_default_id_column() {
    let db = memory_db();
    let mut erin = user("erin", 2);
    db.insert(&users(), &mut erin).unwrap();

    db.delete_by_id(&users(), erin.id).unwrap();
    assert!(db.delete_by_id(&users(), erin.id).unwrap_err().is_not_found());
    assert!(matches!(
        db.delete_by_id(&users(), 0).unwrap_err(),
        Error::MissingPrimaryKey { .. }
    ));
}

#[test]
fn exec_returns_affected_rows_and_validates_placeholders() {
    let db = memory_db();
    for name in ["a", "b", "c"] {
        db.insert(&users(), &mut user(name, 1)).unwrap();
    }
    assert_eq!(db.exec("UPDATE users SET age = ? WHERE age = ?", &args![2, 1]).unwrap(), 3);

    let err = db.exec("UPDATE users SET age = ?", &[]).unwrap_err();
    assert_eq!(err.error_code(), error_code::INVALID_ARGUMENT);
}

#[test]
fn embedded_fields_and_remainder_round_trip() {
    let db = memory_db();
    let customers = Table::new("customers");
    let mut acme = Customer {
        name: "acme".to_string(),
        address: Address {
            street: "1 Main St".to_string(),
            city: "Oslo".to_string(),
        },
        ..Default::default()
    };
    db.insert(&customers, &mut acme).unwrap();
    db.exec(
        "UPDATE customers SET vip = 1, badge = ? WHERE id = ?",
        &args![b"hi".to_vec(), acme.id],
    )
    .unwrap();

    let found: Customer = db.query_one_sql("SELECT * FROM customers WHERE id = ?", &args![acme.id]).unwrap();
    assert_eq!(found.address, acme.address);
    assert_eq!(found.extra.0["vip"], serde_json::json!(1));
    assert_eq!(found.extra.0["badge"], serde_json::json!("aGk="));

    // A mapped-columns-only select leaves the remainder empty.
    let plain: Customer = db.query_one(&customers, "id = ?", &args![acme.id]).unwrap();
    assert!(plain.extra.0.is_empty());
}

#[test]
fn json_columns_round_trip() {
    let db = memory_db();
    let settings = Table::new("settings");
    let mut saved = Settings {
        prefs: Json(Prefs {
            theme: "dark".to_string(),
            tabs: 4,
        }),
        ..Default::default()
    };
    db.insert(&settings, &mut saved).unwrap();
    let found: Settings = db.query_one(&settings, "id = ?", &args![saved.id]).unwrap();
    assert_eq!(found, saved);
}

#[test]
fn explicit_id_columns_form_a_composite_key() {
    let db = memory_db();
    let memberships = Table::new("memberships").with_id_columns(["user_id", "group_id"]);
    let mut member = Membership {
        user_id: 1,
        group_id: 2,
        role: "owner".to_string(),
    };
    db.insert(&memberships, &mut member).unwrap();

    member.role = "admin".to_string();
    db.update(&memberships, &member).unwrap();
    let found: Membership = db
        .query_one(&memberships, "user_id = ? AND group_id = ?", &args![1, 2])
        .unwrap();
    assert_eq!(found.role, "admin");

    assert!(matches!(
        db.delete_by_id(&memberships, 1).unwrap_err(),
        Error::InvalidArgument(_)
    ));
    db.delete_by_key(&memberships, &args![1, 2]).unwrap();
    assert!(db.delete(&memberships, &member).unwrap_err().is_not_found());
}

#[test]
fn default_id_column_comes_from_config() {
    let adapter = SqliteAdapter::open_in_memory().unwrap();
    let config = RowmapConfig::from_toml("default_id_column = \"id\"").unwrap();
    let db = Db::with_config(adapter, config).unwrap();
    db.exec("CREATE TABLE notes (id INTEGER PRIMARY KEY AUTOINCREMENT, body TEXT NOT NULL)", &[])
        .unwrap();

    let notes = Table::new("notes");
    let mut note = Note {
        body: "hello".to_string(),
        ..Default::default()
    };
    db.insert(&notes, &mut note).unwrap();
    assert_eq!(note.id, 1);

    note.body = "bye".to_string();
    db.update(&notes, &note).unwrap();

    let renamed = Db::with_config(
        SqliteAdapter::open_in_memory().unwrap(),
        RowmapConfig {
            default_id_column: Some("uid".to_string()),
            ..Default::default()
        },
    )
    .unwrap();
    // `Note` maps no `uid` column, so it has no key at all.
    let err = renamed.update(&notes, &note).unwrap_err();
    assert_eq!(err.error_code(), error_code::INVALID_MAPPING);
}

#[test]
fn incompatible_column_type_is_a_scan_mismatch() {
    let db = memory_db();
    db.exec("INSERT INTO users (name, age) VALUES (?, ?)", &args!["weird", "not a number"])
        .unwrap();
    let err = db.query::<User>(&users(), "", &[]).unwrap_err();
    match err {
        Error::ScanTypeMismatch { column, field, .. } => {
            assert_eq!(column, "age");
            assert_eq!(field, "age");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn constraint_failures_surface_as_adapter_errors() {
    let db = memory_db();
    db.insert(&users(), &mut User { id: 5, ..user("a", 1) }).unwrap();
    let err = db.insert(&users(), &mut User { id: 5, ..user("b", 1) }).unwrap_err();
    assert_eq!(err.error_code(), error_code::CONSTRAINT_VIOLATION);
    assert!(err.to_string().contains("INSERT INTO users"));
}

#[test]
fn transaction_commits_and_returns_the_body_value() {
    let db = memory_db();
    let id = db
        .transaction(|tx| {
            let mut a = user("a", 1);
            tx.insert(&users(), &mut a)?;
            tx.insert(&users(), &mut user("b", 2))?;
            Ok(a.id)
        })
        .unwrap();
    assert_eq!(id, 1);
    assert_eq!(db.query::<User>(&users(), "", &[]).unwrap().len(), 2);
}

#[test]
fn transaction_rolls_back_on_error() {
    let db = memory_db();
    let err = db
        .transaction(|tx| {
            tx.insert(&users(), &mut user("a", 1))?;
            // Missing row: NotFound aborts the whole transaction.
            tx.update(&users(), &User { id: 99, ..user("x", 0) })?;
            Ok(())
        })
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(db.query::<User>(&users(), "", &[]).unwrap().is_empty());
}

#[test]
fn nested_transaction_joins_the_outer_one() {
    let db = memory_db();
    let result: Result<(), Error> = db.transaction(|tx| {
        tx.transaction(|inner| inner.insert(&users(), &mut user("inner", 1)))?;
        Err(Error::InvalidArgument("outer abort".to_string()))
    });
    assert!(result.is_err());
    assert!(db.query::<User>(&users(), "", &[]).unwrap().is_empty());
}

#[test]
fn closed_db_rejects_calls() {
    let db = memory_db();
    db.close().unwrap();
    let err = db.query::<User>(&users(), "", &[]).unwrap_err();
    assert_eq!(err.error_code(), error_code::ADAPTER_CLOSED);
}

#[test]
fn pooled_adapter_reads_through_readers() {
    let dir = TempDir::new().unwrap();
    let config = RowmapConfig {
        read_pool_size: Some(2),
        ..Default::default()
    };
    let pool = PooledSqliteAdapter::open(&dir.path().join("rowmap.db"), &config).unwrap();
    let db = Db::with_config(pool, config).unwrap();
    db.exec(
        "CREATE TABLE users (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL, age INTEGER, nickname TEXT)",
        &[],
    )
    .unwrap();

    for i in 0..5 {
        db.insert(&users(), &mut user(&format!("u{i}"), i)).unwrap();
    }
    for _ in 0..3 {
        let all: Vec<User> = db.query_sql("FROM users ORDER BY id", &[]).unwrap();
        assert_eq!(all.len(), 5);
        assert_eq!(all[4].name, "u4");
    }
}
