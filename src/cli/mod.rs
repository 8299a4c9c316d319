//! # CLI Module
//!
//! Command-line front end for the expense tracker. It plays the part of the
//! page: each command opens the expense page through the
//! [`Controller`](crate::controller::Controller), performs one action, and
//! renders the result with the views in [`views`].
//!
//! ## Command Categories
//!
//! ### Server
//!
//! - [`serve`] - Runs the in-memory expense API
//!
//! ### Authentication
//!
//! - [`signup`] - Creates an account and stores the issued session
//! - [`login`] - Logs in and stores the issued session
//! - [`logout`] - Revokes and removes the stored session
//!
//! ### Expenses
//!
//! - [`list_expenses`] - Shows all expenses, optionally with the summary
//! - [`add_expense`] - Creates an expense from form flags
//! - [`edit_expense`] - Updates the selected expense with the given fields
//! - [`delete_expense`] - Removes an expense
//! - [`summary`] - Shows totals per category
//!
//! ## Error Handling
//!
//! - A missing or rejected session clears the stored credential and asks the
//!   user to log in again.
//! - Fetch failures are shown as an error banner above an empty list.
//! - Failed mutations terminate with the server's message.
//!
//! ## Usage Patterns
//!
//! ```bash
//! expense-tracker serve                      # start the API
//! expense-tracker signup --username ada --password correct-horse
//! expense-tracker expenses add --amount 12.50 --date 2024-01-05 --category food
//! expense-tracker expenses edit 1 --amount 20
//! expense-tracker expenses --summary
//! expense-tracker expenses delete 1
//! ```

mod auth;
mod expenses;
mod serve;
pub mod views;

pub use auth::login;
pub use auth::logout;
pub use auth::signup;
pub use expenses::add_expense;
pub use expenses::delete_expense;
pub use expenses::edit_expense;
pub use expenses::list_expenses;
pub use expenses::summary;
pub use serve::serve;
