use std::{collections::HashSet, sync::Arc, thread};

use expense_tracker::error::ApiError;
use expense_tracker::store::{AccountStore, ExpenseStore, MemoryExpenseStore, apply_patch};
use expense_tracker::types::{AmountInput, Credentials, ExpensePatch, NewExpense};
use serde_json::{Map, json};

fn draft(amount: &str, date: &str, category: &str) -> NewExpense {
    NewExpense {
        amount: Some(AmountInput::from(amount)),
        date: Some(date.to_string()),
        category: Some(json!(category)),
        ..Default::default()
    }
}

fn credentials(username: &str, password: &str) -> Credentials {
    Credentials {
        username: username.to_string(),
        password: password.to_string(),
    }
}

#[test]
fn test_create_coerces_amount_and_normalizes_date() {
    let store = MemoryExpenseStore::new();

    let created = store
        .create(draft("12.50", "2024-01-05", "food"), None)
        .unwrap();

    assert_eq!(created.id, 1);
    assert_eq!(created.amount, 12.5);
    assert_eq!(created.date, "2024-01-05T00:00:00.000Z");
    assert_eq!(created.category, Some(json!("food")));

    // list returns exactly what was stored
    assert_eq!(store.list(), vec![created]);
}

#[test]
fn test_create_assigns_strictly_increasing_ids() {
    let store = MemoryExpenseStore::new();

    let ids: Vec<u64> = (0..5)
        .map(|i| {
            store
                .create(draft(&i.to_string(), "2024-01-05", "misc"), None)
                .unwrap()
                .id
        })
        .collect();

    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_ids_are_never_reused_after_delete() {
    let store = MemoryExpenseStore::new();
    let first = store.create(draft("1", "2024-01-05", "a"), None).unwrap();
    store.delete(first.id).unwrap();

    let second = store.create(draft("2", "2024-01-05", "b"), None).unwrap();
    assert_eq!(second.id, 2);
}

#[test]
fn test_concurrent_creates_get_unique_ids() {
    let store = Arc::new(MemoryExpenseStore::new());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                (0..50)
                    .map(|_| store.create(draft("1", "2024-01-05", "x"), None).unwrap().id)
                    .collect::<Vec<u64>>()
            })
        })
        .collect();

    let mut seen = HashSet::new();
    for handle in handles {
        for id in handle.join().unwrap() {
            assert!(seen.insert(id), "duplicate id {}", id);
        }
    }

    assert_eq!(seen.len(), 400);
    assert_eq!(store.count(), 400);

    // list order follows id order
    let listed: Vec<u64> = store.list().iter().map(|e| e.id).collect();
    let mut sorted = listed.clone();
    sorted.sort_unstable();
    assert_eq!(listed, sorted);
}

#[test]
fn test_create_rejects_invalid_input_without_consuming_ids() {
    let store = MemoryExpenseStore::new();

    let bad_date = store.create(draft("5", "yesterday", "food"), None);
    assert!(matches!(bad_date, Err(ApiError::Validation(_))));

    let bad_amount = store.create(draft("five", "2024-01-05", "food"), None);
    assert!(matches!(bad_amount, Err(ApiError::Validation(_))));

    let missing_date = store.create(
        NewExpense {
            amount: Some(AmountInput::Number(5.0)),
            ..Default::default()
        },
        None,
    );
    assert!(matches!(missing_date, Err(ApiError::Validation(_))));

    let missing_amount = store.create(
        NewExpense {
            date: Some("2024-01-05".to_string()),
            ..Default::default()
        },
        None,
    );
    assert!(matches!(missing_amount, Err(ApiError::Validation(_))));

    assert_eq!(store.count(), 0);
    let created = store.create(draft("5", "2024-01-05", "food"), None).unwrap();
    assert_eq!(created.id, 1);
}

#[test]
fn test_create_keeps_extra_fields_verbatim() {
    let store = MemoryExpenseStore::new();
    let mut extra = Map::new();
    extra.insert("merchant".to_string(), json!("Corner Deli"));
    extra.insert("tags".to_string(), json!(["lunch", "work"]));

    let created = store
        .create(
            NewExpense {
                extra,
                ..draft("9.99", "2024-01-05", "food")
            },
            None,
        )
        .unwrap();

    assert_eq!(created.extra["merchant"], json!("Corner Deli"));
    assert_eq!(created.extra["tags"], json!(["lunch", "work"]));
}

#[test]
fn test_idempotent_create_returns_original_record() {
    let store = MemoryExpenseStore::new();
    let key = Some("retry-key".to_string());

    let first = store
        .create(draft("12.50", "2024-01-05", "food"), key.clone())
        .unwrap();
    let second = store
        .create(draft("12.50", "2024-01-05", "food"), key)
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(store.count(), 1);

    let other = store
        .create(draft("12.50", "2024-01-05", "food"), Some("other-key".to_string()))
        .unwrap();
    assert_eq!(other.id, 2);
}

#[test]
fn test_update_partial_payload_preserves_other_fields() {
    let store = MemoryExpenseStore::new();
    let created = store
        .create(draft("12.50", "2024-01-05", "food"), None)
        .unwrap();

    let updated = store
        .update(
            created.id,
            ExpensePatch {
                amount: Some(AmountInput::from("20")),
                ..Default::default()
            },
        )
        .unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.amount, 20.0);
    assert_eq!(updated.category, Some(json!("food")));
    assert_eq!(updated.date, created.date);
    assert_eq!(store.get(created.id), Some(updated));
}

#[test]
fn test_update_renormalizes_date() {
    let store = MemoryExpenseStore::new();
    let created = store.create(draft("1", "2024-01-05", "food"), None).unwrap();

    let updated = store
        .update(
            created.id,
            ExpensePatch {
                date: Some("2024/02/10".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

    assert_eq!(updated.date, "2024-02-10T00:00:00.000Z");
    assert_eq!(updated.amount, 1.0);
}

#[test]
fn test_update_unknown_id_is_not_found_and_store_unchanged() {
    let store = MemoryExpenseStore::new();
    store.create(draft("12.50", "2024-01-05", "food"), None).unwrap();
    let before = store.list();

    let result = store.update(
        42,
        ExpensePatch {
            amount: Some(AmountInput::Number(1.0)),
            ..Default::default()
        },
    );

    assert_eq!(result, Err(ApiError::NotFound(42)));
    assert_eq!(store.list(), before);
}

#[test]
fn test_update_invalid_date_leaves_record_unchanged() {
    let store = MemoryExpenseStore::new();
    let created = store.create(draft("1", "2024-01-05", "food"), None).unwrap();

    let result = store.update(
        created.id,
        ExpensePatch {
            amount: Some(AmountInput::Number(99.0)),
            date: Some("31/31/2024".to_string()),
            ..Default::default()
        },
    );

    assert!(matches!(result, Err(ApiError::Validation(_))));
    assert_eq!(store.get(created.id), Some(created));
}

#[test]
fn test_apply_patch_merges_extra_fields() {
    let store = MemoryExpenseStore::new();
    let mut extra = Map::new();
    extra.insert("merchant".to_string(), json!("Deli"));
    extra.insert("note".to_string(), json!("old"));
    let created = store
        .create(
            NewExpense {
                extra,
                ..draft("3", "2024-01-05", "food")
            },
            None,
        )
        .unwrap();

    let mut patch_extra = Map::new();
    patch_extra.insert("note".to_string(), json!("new"));
    let merged = apply_patch(
        &created,
        ExpensePatch {
            id: Some(999),
            description: Some(json!("sandwich")),
            extra: patch_extra,
            ..Default::default()
        },
    )
    .unwrap();

    // id is never taken from the patch
    assert_eq!(merged.id, created.id);
    assert_eq!(merged.description, Some(json!("sandwich")));
    assert_eq!(merged.extra["merchant"], json!("Deli"));
    assert_eq!(merged.extra["note"], json!("new"));
}

#[test]
fn test_delete_removes_exactly_one_record() {
    let store = MemoryExpenseStore::new();
    let a = store.create(draft("1", "2024-01-05", "a"), None).unwrap();
    let b = store.create(draft("2", "2024-01-06", "b"), None).unwrap();

    store.delete(a.id).unwrap();

    assert_eq!(store.list(), vec![b]);
}

#[test]
fn test_delete_twice_is_not_found() {
    let store = MemoryExpenseStore::new();
    let created = store.create(draft("1", "2024-01-05", "a"), None).unwrap();

    assert_eq!(store.delete(created.id), Ok(()));
    assert_eq!(store.delete(created.id), Err(ApiError::NotFound(created.id)));
}

#[test]
fn test_list_empty_store() {
    let store = MemoryExpenseStore::new();
    assert!(store.list().is_empty());
    assert_eq!(store.count(), 0);
}

#[test]
fn test_signup_then_login() {
    let accounts = AccountStore::new(3600);

    let signed_up = accounts
        .signup(&credentials("Ada", "correct-horse"))
        .unwrap();
    assert_eq!(signed_up.username, "Ada");
    assert_eq!(signed_up.expires_in, 3600);
    assert_eq!(accounts.verify(&signed_up.token).unwrap(), "Ada");

    // usernames compare case-insensitively
    let logged_in = accounts.login(&credentials("ada", "correct-horse")).unwrap();
    assert_eq!(logged_in.username, "Ada");
    assert_ne!(logged_in.token, signed_up.token);
    assert_eq!(accounts.verify(&logged_in.token).unwrap(), "Ada");
}

#[test]
fn test_login_with_wrong_credentials_is_unauthorized() {
    let accounts = AccountStore::new(3600);
    accounts.signup(&credentials("ada", "correct-horse")).unwrap();

    let wrong_password = accounts.login(&credentials("ada", "battery-staple"));
    let unknown_user = accounts.login(&credentials("bob", "correct-horse"));

    assert!(matches!(wrong_password, Err(ApiError::Unauthorized(_))));
    // same message either way
    assert_eq!(wrong_password, unknown_user);
}

#[test]
fn test_signup_validation_and_duplicates() {
    let accounts = AccountStore::new(3600);

    assert!(matches!(
        accounts.signup(&credentials("  ", "correct-horse")),
        Err(ApiError::Validation(_))
    ));
    assert!(matches!(
        accounts.signup(&credentials("ada", "short")),
        Err(ApiError::Validation(_))
    ));

    accounts.signup(&credentials("ada", "correct-horse")).unwrap();
    assert!(matches!(
        accounts.signup(&credentials("ADA", "another-password")),
        Err(ApiError::Conflict(_))
    ));
}

#[test]
fn test_expired_and_revoked_sessions_are_rejected() {
    let expired = AccountStore::new(0);
    let credential = expired.signup(&credentials("ada", "correct-horse")).unwrap();
    assert!(matches!(
        expired.verify(&credential.token),
        Err(ApiError::Unauthorized(_))
    ));

    let accounts = AccountStore::new(3600);
    let credential = accounts.signup(&credentials("ada", "correct-horse")).unwrap();
    accounts.revoke(&credential.token).unwrap();
    assert!(matches!(
        accounts.verify(&credential.token),
        Err(ApiError::Unauthorized(_))
    ));
    assert!(matches!(
        accounts.revoke(&credential.token),
        Err(ApiError::Unauthorized(_))
    ));
    assert!(matches!(
        accounts.verify("made-up-token"),
        Err(ApiError::Unauthorized(_))
    ));
}

#[test]
fn test_create_ignores_caller_supplied_id() {
    let store = MemoryExpenseStore::new();
    let mut extra = Map::new();
    extra.insert("id".to_string(), json!(99));
    extra.insert("merchant".to_string(), json!("Deli"));

    let created = store
        .create(
            NewExpense {
                extra,
                ..draft("1", "2024-01-05", "food")
            },
            None,
        )
        .unwrap();

    assert_eq!(created.id, 1);
    assert!(!created.extra.contains_key("id"));
    assert_eq!(created.extra["merchant"], json!("Deli"));

    // the serialized record carries a single id and reads back intact
    let text = serde_json::to_string(&store.list()).unwrap();
    assert_eq!(text.matches("\"id\"").count(), 1);
    let decoded: Vec<expense_tracker::types::Expense> = serde_json::from_str(&text).unwrap();
    assert_eq!(decoded, vec![created]);
}

#[test]
fn test_reserved_keys_never_land_in_extra() {
    let store = MemoryExpenseStore::new();
    let created = store.create(draft("1", "2024-01-05", "food"), None).unwrap();

    let mut patch_extra = Map::new();
    for key in ["id", "amount", "date", "category", "description"] {
        patch_extra.insert(key.to_string(), json!("bogus"));
    }
    let updated = store
        .update(
            created.id,
            ExpensePatch {
                extra: patch_extra,
                ..Default::default()
            },
        )
        .unwrap();

    assert!(updated.extra.is_empty());
    assert_eq!(updated, created);
}

#[test]
fn test_non_string_category_is_stored_verbatim() {
    let store = MemoryExpenseStore::new();

    let created = store
        .create(
            NewExpense {
                category: Some(json!(5)),
                description: Some(json!({"note": "split with Bob"})),
                ..draft("1", "2024-01-05", "ignored")
            },
            None,
        )
        .unwrap();

    assert_eq!(created.category, Some(json!(5)));
    assert_eq!(created.description, Some(json!({"note": "split with Bob"})));
}

#[test]
fn test_huge_token_ttl_does_not_overflow() {
    let accounts = AccountStore::new(u64::MAX);

    let credential = accounts
        .signup(&credentials("ada", "correct-horse"))
        .unwrap();

    assert_eq!(credential.expires_in, u64::MAX);
    assert_eq!(accounts.verify(&credential.token).unwrap(), "ada");
    assert!(accounts.login(&credentials("ada", "correct-horse")).is_ok());
}
