//! # API Module
//!
//! HTTP endpoints for the expense tracker server, built on
//! [Axum](https://docs.rs/axum).
//!
//! ## Endpoints
//!
//! ### Expenses
//!
//! - `GET /expenses` - [`list_expenses`], all records in insertion order
//! - `POST /expenses` - [`create_expense`], honours an `Idempotency-Key` header
//! - `PUT /expenses` - [`update_expense`], target id taken from the body
//! - `PUT /expenses/{id}` - [`update_expense_by_id`], target id taken from the path
//! - `DELETE /expenses/{id}` - [`delete_expense`]
//!
//! ### Authentication
//!
//! - `POST /auth/signup` - [`signup`]
//! - `POST /auth/login` - [`login`]
//! - `POST /auth/logout` - [`logout`]
//!
//! When the server runs with `REQUIRE_AUTH`, the expense routes sit behind
//! [`require_session`], which resolves the bearer token before the handler runs.
//!
//! ### Monitoring
//!
//! - `GET /health` - [`health`], status, version and record count
//!
//! Every failure is an [`ApiError`](crate::error::ApiError) rendered as
//! `{"error": "<message>"}` with the matching status code.

mod auth;
mod expenses;
mod health;

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};

pub use auth::{login, logout, require_session, signup};
pub use expenses::{
    create_expense, delete_expense, list_expenses, update_expense, update_expense_by_id,
};
pub use health::health;

use crate::{
    error::ApiError,
    store::{AccountStore, ExpenseStore, MemoryExpenseStore},
};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub expenses: Arc<dyn ExpenseStore>,
    pub accounts: Arc<AccountStore>,
    pub require_auth: bool,
}

impl AppState {
    pub fn new(
        expenses: Arc<dyn ExpenseStore>,
        accounts: Arc<AccountStore>,
        require_auth: bool,
    ) -> Self {
        Self {
            expenses,
            accounts,
            require_auth,
        }
    }

    /// Fresh in-memory stores.
    pub fn in_memory(token_ttl: u64, require_auth: bool) -> Self {
        Self::new(
            Arc::new(MemoryExpenseStore::new()),
            Arc::new(AccountStore::new(token_ttl)),
            require_auth,
        )
    }
}

fn invalid_body(rejection: JsonRejection) -> ApiError {
    ApiError::Validation(rejection.body_text())
}

fn invalid_path(rejection: PathRejection) -> ApiError {
    ApiError::Validation(rejection.body_text())
}
