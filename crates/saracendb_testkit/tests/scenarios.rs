//! End-to-end scenarios against real files.

use saracendb_core::{Config, CoreError, Database, Document, Value};
use saracendb_testkit::prelude::*;
use std::fs;

#[test]
fn put_query_remove_flush_reopen() {
    init_test_logging();
    with_file_db(|db, path| {
        assert!(!path.exists());

        db.put("name", "alice").unwrap();
        db.put("name", "bob").unwrap();
        assert_eq!(
            db.query("name", &Value::from("bob")),
            vec![&Document::new("name", "bob")]
        );

        db.remove(0).unwrap();
        assert_eq!(db.get(0).unwrap(), &Document::new("name", "bob"));
        db.flush().unwrap();

        let reopened = Database::open(path).unwrap();
        assert_eq!(reopened.get(0).unwrap(), &Document::new("name", "bob"));
        assert_eq!(reopened.len(), 1);
    });
}

#[test]
fn compaction_leaves_no_temp_file() {
    let mut test_db = TestDatabase::file();
    let path = test_db.path().unwrap();
    let temp = path.with_file_name(format!("{}.tmp", TestDatabase::FILE_NAME));

    test_db.put("k", 1i64).unwrap();
    test_db.put("k", 2i64).unwrap();
    test_db.remove(0).unwrap();
    test_db.flush().unwrap();

    assert!(!test_db.is_dirty());
    assert!(!temp.exists());
    assert_eq!(test_db.reopen().documents(), &[Document::new("k", 2i64)]);
}

#[test]
fn collections_are_isolated_and_persisted() {
    let (mut test_db, names) = scenarios::multi_collection_database(3);
    test_db.put("owner", "root").unwrap();
    test_db.flush().unwrap();

    let mut reopened = test_db.reopen();
    assert_eq!(reopened.documents(), &[Document::new("owner", "root")]);
    for name in &names {
        reopened.select_collection(name.as_str());
        assert_eq!(reopened.len(), 1);
        assert_eq!(
            reopened.query("collection", &Value::from(name.as_str())).len(),
            1
        );
    }
}

#[test]
fn removed_collection_is_gone_after_flush() {
    let mut test_db = TestDatabase::file();
    test_db.select_collection("users");
    test_db.put("name", "carol").unwrap();
    test_db.flush().unwrap();

    test_db.remove_collection().unwrap();
    assert!(matches!(
        test_db.remove_collection(),
        Err(CoreError::CollectionNotFound { .. })
    ));
    test_db.flush().unwrap();

    let reopened = test_db.reopen();
    assert!(!reopened.has_collection("users"));
    assert_eq!(reopened.collection_names().collect::<Vec<_>>(), vec!["default"]);
}

#[test]
fn corrupt_file_is_reported() {
    with_file_db(|_, path| {
        fs::write(path, [0xff, 0x00, 0x13]).unwrap();
        assert!(matches!(
            Database::open(path),
            Err(CoreError::CorruptStore { .. })
        ));
    });
}

#[test]
fn unflushed_writes_are_lost() {
    let mut test_db = TestDatabase::file();
    test_db.put("draft", true).unwrap();
    assert!(test_db.stored_bytes().is_none());

    let reopened = test_db.reopen();
    assert!(reopened.is_empty());
}

#[test]
fn configured_collection_is_selected_on_open() {
    with_file_db(|db, path| {
        db.flush().unwrap();
        let reopened =
            Database::open_with_config(path, Config::new().collection("logs")).unwrap();
        assert_eq!(reopened.active_collection(), "logs");
        assert!(reopened.has_collection("logs"));
        assert!(reopened.has_collection("default"));
    });
}
