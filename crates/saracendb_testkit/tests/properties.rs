//! Property tests for database behavior across crates.

use proptest::prelude::*;
use saracendb_core::{Database, Document, Value, DEFAULT_COLLECTION};
use saracendb_testkit::prelude::*;

/// State a fresh handle should see after a flush of `db`.
fn expected_after_reopen(db: &Database) -> saracendb_core::Collections {
    let mut expected = db.collections().clone();
    expected.materialize(DEFAULT_COLLECTION);
    expected
}

proptest! {
    #![proptest_config(PropTestConfig::default().to_proptest_config())]

    #[test]
    fn sequences_match_model(ops in operation_sequence_strategy(0, 64)) {
        init_test_logging();
        let mut test_db = TestDatabase::memory();
        let mut model = Model::default();

        for op in &ops {
            let result = op.apply(&mut test_db);
            let accepted = model.apply(op);
            prop_assert_eq!(result.is_ok(), accepted, "{:?}", op);
            if let Err(e) = result {
                prop_assert!(e.is_soft(), "{:?} failed hard: {}", op, e);
            }
        }

        prop_assert!(model.matches(&test_db), "{:?} vs {:?}", model, test_db.collections());
    }

    #[test]
    fn flush_then_reopen_restores_everything(ops in operation_sequence_strategy(0, 64)) {
        let mut test_db = TestDatabase::memory();
        for op in &ops {
            let _ = op.apply(&mut test_db);
        }
        test_db.flush().unwrap();
        prop_assert!(!test_db.is_dirty());

        let reopened = test_db.reopen();
        prop_assert_eq!(reopened.collections(), &expected_after_reopen(&test_db));
        prop_assert_eq!(reopened.active_collection(), DEFAULT_COLLECTION);
    }

    #[test]
    fn arbitrary_documents_survive_reopen(
        docs in prop::collection::vec((pooled_collection_strategy(), document_strategy()), 0..24)
    ) {
        let mut test_db = TestDatabase::memory();
        for (name, doc) in &docs {
            test_db.select_collection(name.as_str());
            let (key, value) = doc.clone().into_parts();
            test_db.put(key, value).unwrap();
        }
        test_db.flush().unwrap();

        let reopened = test_db.reopen();
        prop_assert_eq!(reopened.collections(), &expected_after_reopen(&test_db));
    }

    #[test]
    fn query_returns_exact_matches_in_order(
        pairs in prop::collection::vec((field_key_strategy(), small_value_strategy()), 0..32),
        key in field_key_strategy(),
        needle in small_value_strategy(),
    ) {
        let mut test_db = TestDatabase::memory();
        for (k, v) in &pairs {
            test_db.put(k.as_str(), v.clone()).unwrap();
        }

        let expected: Vec<Document> = pairs
            .iter()
            .filter(|(k, v)| *k == key && *v == needle)
            .map(|(k, v)| Document::new(k.as_str(), v.clone()))
            .collect();
        let found: Vec<Document> = test_db.query(&key, &needle).into_iter().cloned().collect();
        prop_assert_eq!(found, expected);
    }

    #[test]
    fn remove_shifts_later_documents(count in 1usize..20, index in 0usize..20) {
        prop_assume!(index < count);
        let mut test_db = scenarios::populated_database(count);
        let before: Vec<Document> = test_db.documents().to_vec();

        let removed = test_db.remove(index).unwrap();
        prop_assert_eq!(&removed, &before[index]);
        prop_assert_eq!(test_db.len(), count - 1);
        for j in index..count - 1 {
            prop_assert_eq!(test_db.get(j).unwrap(), &before[j + 1]);
        }
        prop_assert!(test_db.is_dirty());
    }

    #[test]
    fn compaction_is_idempotent(ops in operation_sequence_strategy(0, 32)) {
        let mut test_db = TestDatabase::memory();
        for op in &ops {
            let _ = op.apply(&mut test_db);
        }
        test_db.flush().unwrap();
        test_db.compact().unwrap();
        let first = test_db.stored_bytes().unwrap();

        test_db.compact().unwrap();
        prop_assert_eq!(test_db.stored_bytes().unwrap(), first.clone());

        let mut reopened = test_db.reopen();
        reopened.compact().unwrap();
        // Reopening materializes the default collection, which the first
        // handle may have removed.
        if test_db.has_collection(DEFAULT_COLLECTION) {
            prop_assert_eq!(test_db.stored_bytes().unwrap(), first);
        }
    }

    #[test]
    fn reads_on_unused_collection_are_empty(name in collection_name_strategy(), index in 0usize..4) {
        prop_assume!(name != DEFAULT_COLLECTION);
        let mut test_db = TestDatabase::memory();
        test_db.select_collection(name.as_str());

        prop_assert!(test_db.is_empty());
        prop_assert!(test_db.query("a", &Value::Null).is_empty());
        prop_assert!(test_db.get(index).unwrap_err().is_soft());
        prop_assert!(!test_db.has_collection(&name));

        test_db.put("a", Value::Null).unwrap();
        prop_assert!(test_db.has_collection(&name));
    }
}
