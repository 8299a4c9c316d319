use std::{
    collections::{BTreeMap, HashMap},
    sync::{
        Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
};

use serde_json::{Map, Value};

use crate::{
    error::ApiError,
    types::{Expense, ExpensePatch, NewExpense},
    utils,
};

/// Keys owned by the record itself. They never survive in `extra`.
const RESERVED_FIELDS: [&str; 5] = ["id", "amount", "date", "category", "description"];

/// Storage behind the expense resource.
///
/// Implementations must make id allocation and insertion a single step so
/// concurrent creates never observe the same id.
pub trait ExpenseStore: Send + Sync {
    /// All records in insertion order.
    fn list(&self) -> Vec<Expense>;

    fn get(&self, id: u64) -> Option<Expense>;

    fn count(&self) -> usize;

    /// Validates `draft` and stores it under a freshly allocated id.
    ///
    /// # Arguments
    ///
    /// * `draft` - Create payload; `amount` and `date` are required
    /// * `idempotency_key` - Optional caller key identifying a retried request
    ///
    /// # Returns
    ///
    /// - `Ok(Expense)` - The stored record. A repeated `idempotency_key`
    ///   returns the record created the first time instead of inserting again.
    /// - `Err(ApiError::Validation)` - Missing or unparseable `amount`/`date`.
    ///   No id is consumed.
    fn create(
        &self,
        draft: NewExpense,
        idempotency_key: Option<String>,
    ) -> Result<Expense, ApiError>;

    /// Merges `patch` over the record stored under `id`.
    ///
    /// # Returns
    ///
    /// - `Ok(Expense)` - The merged record, already stored
    /// - `Err(ApiError::NotFound)` - No record has this id
    /// - `Err(ApiError::Validation)` - The patch carries an invalid `amount` or
    ///   `date`; the stored record is left unchanged
    fn update(&self, id: u64, patch: ExpensePatch) -> Result<Expense, ApiError>;

    /// Removes exactly the record stored under `id`, or fails with
    /// `ApiError::NotFound`.
    fn delete(&self, id: u64) -> Result<(), ApiError>;
}

/// Validates a create payload and builds the record it describes.
///
/// The returned expense carries id 0; the store assigns the real id. A
/// caller-supplied `id` is discarded.
pub fn prepare_expense(draft: NewExpense) -> Result<Expense, ApiError> {
    let amount = draft
        .amount
        .as_ref()
        .ok_or_else(|| ApiError::Validation("Field 'amount' is required".to_string()))
        .and_then(utils::coerce_amount)?;
    let date = draft
        .date
        .as_deref()
        .ok_or_else(|| ApiError::Validation("Field 'date' is required".to_string()))
        .and_then(utils::normalize_date)?;

    Ok(Expense {
        id: 0,
        amount,
        date,
        category: draft.category,
        description: draft.description,
        extra: without_reserved(draft.extra),
    })
}

/// Field-level merge of `patch` over `existing`.
///
/// Fields absent from the patch keep their stored value; `amount` and `date`
/// are re-validated when present. The id never changes.
pub fn apply_patch(existing: &Expense, patch: ExpensePatch) -> Result<Expense, ApiError> {
    let mut merged = existing.clone();

    if let Some(amount) = patch.amount.as_ref() {
        merged.amount = utils::coerce_amount(amount)?;
    }
    if let Some(date) = patch.date.as_deref() {
        merged.date = utils::normalize_date(date)?;
    }
    if let Some(category) = patch.category {
        merged.category = Some(category);
    }
    if let Some(description) = patch.description {
        merged.description = Some(description);
    }
    merged.extra.extend(without_reserved(patch.extra));

    Ok(merged)
}

fn without_reserved(mut extra: Map<String, Value>) -> Map<String, Value> {
    for key in RESERVED_FIELDS {
        extra.remove(key);
    }
    extra
}

#[derive(Default)]
struct Records {
    expenses: BTreeMap<u64, Expense>,
    idempotency: HashMap<String, u64>,
}

/// Process-lifetime store: a guarded ordered map plus an id sequence.
pub struct MemoryExpenseStore {
    next_id: AtomicU64,
    records: Mutex<Records>,
}

impl MemoryExpenseStore {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            records: Mutex::new(Records::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Records> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryExpenseStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpenseStore for MemoryExpenseStore {
    fn list(&self) -> Vec<Expense> {
        self.lock().expenses.values().cloned().collect()
    }

    fn get(&self, id: u64) -> Option<Expense> {
        self.lock().expenses.get(&id).cloned()
    }

    fn count(&self) -> usize {
        self.lock().expenses.len()
    }

    fn create(
        &self,
        draft: NewExpense,
        idempotency_key: Option<String>,
    ) -> Result<Expense, ApiError> {
        let mut expense = prepare_expense(draft)?;

        let mut records = self.lock();
        if let Some(key) = idempotency_key.as_ref() {
            if let Some(existing) = records
                .idempotency
                .get(key)
                .and_then(|id| records.expenses.get(id))
            {
                return Ok(existing.clone());
            }
        }

        // allocated under the lock so map order matches id order
        expense.id = self.next_id.fetch_add(1, Ordering::SeqCst);
        records.expenses.insert(expense.id, expense.clone());
        if let Some(key) = idempotency_key {
            records.idempotency.insert(key, expense.id);
        }

        Ok(expense)
    }

    fn update(&self, id: u64, patch: ExpensePatch) -> Result<Expense, ApiError> {
        let mut records = self.lock();
        let existing = records.expenses.get(&id).ok_or(ApiError::NotFound(id))?;

        let merged = apply_patch(existing, patch)?;
        records.expenses.insert(id, merged.clone());
        Ok(merged)
    }

    fn delete(&self, id: u64) -> Result<(), ApiError> {
        let mut records = self.lock();
        match records.expenses.remove(&id) {
            Some(_) => {
                records.idempotency.retain(|_, v| *v != id);
                Ok(())
            }
            None => Err(ApiError::NotFound(id)),
        }
    }
}
