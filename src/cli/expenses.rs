use std::{future::Future, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    client::ExpenseClient,
    config,
    controller::{ConsoleReporter, Controller, ExpenseForm},
    error,
    session::SessionManager,
    success, warning,
};

use super::{auth::api_client, views};

type PageController = Controller<ExpenseClient, ConsoleReporter>;

pub async fn list_expenses(with_summary: bool) {
    let Some(ctrl) = open_page().await else {
        return;
    };

    show_banner(&ctrl);
    views::render_list(ctrl.expenses());
    if with_summary {
        views::render_summary(&ctrl.summary());
    }
}

pub async fn summary() {
    let Some(ctrl) = open_page().await else {
        return;
    };

    show_banner(&ctrl);
    views::render_summary(&ctrl.summary());
}

pub async fn add_expense(form: ExpenseForm) {
    let Some(mut ctrl) = open_page().await else {
        return;
    };

    with_spinner("Saving expense...", ctrl.submit(form)).await;
    if !ensure_session(&ctrl).await {
        return;
    }
    if let Some(e) = ctrl.error() {
        error!("Cannot save expense. Err: {}", e);
    }

    success!("Expense saved.");
    views::render_list(ctrl.expenses());
}

pub async fn edit_expense(id: u64, form: ExpenseForm) {
    let Some(mut ctrl) = open_page().await else {
        return;
    };

    if let Some(e) = ctrl.error() {
        error!("Cannot load expenses. Err: {}", e);
    }
    if !ctrl.begin_edit_by_id(id) {
        error!("Expense {} not found.", id);
    }

    with_spinner("Updating expense...", ctrl.submit(form)).await;
    if !ensure_session(&ctrl).await {
        return;
    }
    if let Some(e) = ctrl.error() {
        error!("Cannot update expense {}. Err: {}", id, e);
    }

    success!("Expense {} updated.", id);
    views::render_list(ctrl.expenses());
}

pub async fn delete_expense(id: u64) {
    let Some(mut ctrl) = open_page().await else {
        return;
    };

    with_spinner("Deleting expense...", ctrl.delete(id)).await;
    if !ensure_session(&ctrl).await {
        return;
    }
    if let Some(e) = ctrl.error() {
        error!("Cannot delete expense {}. Err: {}", id, e);
    }

    success!("Expense {} deleted.", id);
    views::render_list(ctrl.expenses());
}

/// Builds the controller with the stored session and runs the initial load.
/// Returns `None` when the user has to log in first.
async fn open_page() -> Option<PageController> {
    let token = SessionManager::load_valid_token().await;
    let client = api_client().with_token(token);

    let mut ctrl = Controller::new(client, ConsoleReporter, config::require_auth());
    with_spinner("Fetching expenses...", ctrl.load()).await;

    if ensure_session(&ctrl).await {
        Some(ctrl)
    } else {
        None
    }
}

async fn ensure_session(ctrl: &PageController) -> bool {
    if !ctrl.needs_login() {
        return true;
    }

    if let Err(e) = SessionManager::clear().await {
        warning!("Failed to remove stale session: {}", e);
    }
    warning!("Not logged in or session expired. Run `expense-tracker login`.");
    false
}

fn show_banner(ctrl: &PageController) {
    if let Some(message) = ctrl.error() {
        views::render_error(message);
    }
}

async fn with_spinner<F: Future<Output = ()>>(message: &'static str, task: F) {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }

    task.await;
    pb.finish_and_clear();
}
