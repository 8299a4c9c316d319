//! # Page Controller
//!
//! Orchestrates the expense page: authentication check, fetch-on-load,
//! create-or-update from the form, delete, and error reporting. Every
//! successful mutation is followed by a full re-fetch; nothing is updated
//! optimistically.
//!
//! ## Phases
//!
//! ```text
//! Authenticating ──(auth required, no credential)──> RedirectToLogin
//!       │
//!       └──> Loading ──(ok)──> Ready { expenses }
//!                    └─(err)─> Ready { empty, error }
//! ```
//!
//! Any failure carrying a 401 clears the credential and moves to
//! `RedirectToLogin`, where further operations are ignored.
//!
//! Failures have two separate effects: a diagnostic line sent to the
//! [`Reporter`] and a user-visible message exposed through
//! [`Controller::error`].

use serde_json::Value;

use crate::{
    client::ExpenseClient,
    error::ClientError,
    types::{AmountInput, Expense, ExpensePatch, ExpenseSummary, NewExpense},
    utils, warning,
};

/// Operations the controller needs from the API facade.
#[allow(async_fn_in_trait)]
pub trait ExpenseApi {
    fn has_credential(&self) -> bool;

    fn clear_credential(&mut self);

    async fn list(&self) -> Result<Vec<Expense>, ClientError>;

    async fn create(&self, expense: &NewExpense) -> Result<Expense, ClientError>;

    async fn update(&self, patch: &ExpensePatch) -> Result<Expense, ClientError>;

    async fn delete(&self, id: u64) -> Result<(), ClientError>;
}

impl ExpenseApi for ExpenseClient {
    fn has_credential(&self) -> bool {
        self.token().is_some()
    }

    fn clear_credential(&mut self) {
        self.clear_token();
    }

    async fn list(&self) -> Result<Vec<Expense>, ClientError> {
        self.list_expenses().await
    }

    async fn create(&self, expense: &NewExpense) -> Result<Expense, ClientError> {
        self.create_expense(expense).await
    }

    async fn update(&self, patch: &ExpensePatch) -> Result<Expense, ClientError> {
        self.update_expense(patch).await
    }

    async fn delete(&self, id: u64) -> Result<(), ClientError> {
        self.delete_expense(id).await.map(|_| ())
    }
}

/// Sink for diagnostic output.
pub trait Reporter {
    fn diagnostic(&mut self, message: &str);
}

pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn diagnostic(&mut self, message: &str) {
        warning!("{}", message);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Authenticating,
    Loading,
    Ready,
    RedirectToLogin,
}

/// Whether a form submission creates a record or edits `target`.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum EditMode {
    #[default]
    Create,
    Edit(Expense),
}

/// Raw form input. Values are sent as typed text; the server coerces and
/// validates them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseForm {
    pub amount: Option<String>,
    pub date: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
}

impl ExpenseForm {
    pub fn into_new_expense(self) -> NewExpense {
        NewExpense {
            amount: self.amount.map(AmountInput::Text),
            date: self.date,
            category: self.category.map(Value::String),
            description: self.description.map(Value::String),
            ..Default::default()
        }
    }

    pub fn into_patch(self, id: u64) -> ExpensePatch {
        ExpensePatch {
            id: Some(id),
            amount: self.amount.map(AmountInput::Text),
            date: self.date,
            category: self.category.map(Value::String),
            description: self.description.map(Value::String),
            ..Default::default()
        }
    }
}

pub struct Controller<A: ExpenseApi, R: Reporter = ConsoleReporter> {
    api: A,
    reporter: R,
    require_auth: bool,
    phase: Phase,
    expenses: Vec<Expense>,
    error: Option<String>,
    editing: EditMode,
}

impl<A: ExpenseApi, R: Reporter> Controller<A, R> {
    pub fn new(api: A, reporter: R, require_auth: bool) -> Self {
        Self {
            api,
            reporter,
            require_auth,
            phase: Phase::Authenticating,
            expenses: Vec::new(),
            error: None,
            editing: EditMode::Create,
        }
    }

    /// Initial cycle: authentication check, then fetch.
    pub async fn load(&mut self) {
        self.phase = Phase::Authenticating;
        if self.require_auth && !self.api.has_credential() {
            self.phase = Phase::RedirectToLogin;
            return;
        }

        self.refresh().await;
    }

    /// Selects a record for editing; the next submit updates it.
    pub fn begin_edit(&mut self, expense: Expense) {
        self.editing = EditMode::Edit(expense);
    }

    /// Selects a loaded record by id. Returns false when no loaded record
    /// matches. An error left by the last fetch is kept; otherwise a
    /// not-found message is surfaced.
    pub fn begin_edit_by_id(&mut self, id: u64) -> bool {
        match self.expenses.iter().find(|e| e.id == id).cloned() {
            Some(expense) => {
                self.begin_edit(expense);
                true
            }
            None => {
                if self.error.is_none() {
                    self.error = Some(format!("Expense {} not found", id));
                }
                false
            }
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editing = EditMode::Create;
    }

    /// Creates or updates depending on the edit mode, then re-fetches.
    pub async fn submit(&mut self, form: ExpenseForm) {
        if self.phase == Phase::RedirectToLogin {
            return;
        }

        let result = match &self.editing {
            EditMode::Create => self
                .api
                .create(&form.into_new_expense())
                .await
                .map(|_| ()),
            EditMode::Edit(target) => self
                .api
                .update(&form.into_patch(target.id))
                .await
                .map(|_| ()),
        };

        match result {
            Ok(()) => {
                self.editing = EditMode::Create;
                self.refresh().await;
            }
            Err(e) => self.fail(e, "Error saving expense"),
        }
    }

    pub async fn delete(&mut self, id: u64) {
        if self.phase == Phase::RedirectToLogin {
            return;
        }

        match self.api.delete(id).await {
            Ok(()) => {
                if matches!(&self.editing, EditMode::Edit(target) if target.id == id) {
                    self.editing = EditMode::Create;
                }
                self.refresh().await;
            }
            Err(e) => self.fail(e, "Error deleting expense"),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    /// User-visible error from the last failed operation.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn editing(&self) -> &EditMode {
        &self.editing
    }

    pub fn summary(&self) -> ExpenseSummary {
        utils::summarize(&self.expenses)
    }

    /// True once a missing or rejected credential sent the page to login.
    pub fn needs_login(&self) -> bool {
        self.phase == Phase::RedirectToLogin
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    async fn refresh(&mut self) {
        self.phase = Phase::Loading;
        self.error = None;

        match self.api.list().await {
            Ok(expenses) => self.expenses = expenses,
            Err(e) => {
                self.expenses.clear();
                self.fail(e, "Error fetching expenses");
            }
        }

        if self.phase == Phase::Loading {
            self.phase = Phase::Ready;
        }
    }

    fn fail(&mut self, error: ClientError, context: &str) {
        self.reporter
            .diagnostic(&format!("{}: {}", context, error));
        self.error = Some(error.message());

        if error.is_unauthorized() {
            self.api.clear_credential();
            self.expenses.clear();
            self.editing = EditMode::Create;
            self.phase = Phase::RedirectToLogin;
        }
    }
}
