use rusqlite::Connection;
use todoshark_core::db::migrations::latest_version;
use todoshark_core::db::{open_db, open_db_in_memory, DbError};
use todoshark_core::store::document_store::DocumentStore;
use todoshark_core::store::document::{FieldValue, OrderBy};
use todoshark_core::SqliteDocumentStore;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "documents");
}

#[test]
fn reopening_a_store_file_keeps_documents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("todoshark.db");

    let store = SqliteDocumentStore::open(&path).unwrap();
    let id = store
        .add(
            "notes",
            [("title".to_string(), FieldValue::String("groceries".to_string()))]
                .into_iter()
                .collect(),
        )
        .unwrap();
    drop(store);

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    drop(conn);

    let reopened = SqliteDocumentStore::open(&path).unwrap();
    let docs = reopened.query("notes", &OrderBy::asc("title")).unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].id, id);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    assert!(err.to_string().contains("schema v999"));
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "expected table `{table_name}` to exist");
}
