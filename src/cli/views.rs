use tabled::Table;

use crate::{
    info,
    types::{CategoryTableRow, Expense, ExpenseSummary, ExpenseTableRow},
    utils, warning,
};

pub fn expense_rows(expenses: &[Expense]) -> Vec<ExpenseTableRow> {
    expenses
        .iter()
        .map(|e| ExpenseTableRow {
            id: e.id,
            // canonical dates always start with YYYY-MM-DD
            date: e.date.get(..10).unwrap_or(&e.date).to_string(),
            amount: utils::format_amount(e.amount),
            category: e.category.as_ref().map(utils::display_value).unwrap_or_default(),
            description: e
                .description
                .as_ref()
                .map(utils::display_value)
                .unwrap_or_default(),
        })
        .collect()
}

pub fn category_rows(summary: &ExpenseSummary) -> Vec<CategoryTableRow> {
    summary
        .by_category
        .iter()
        .map(|(category, total)| CategoryTableRow {
            category: category.clone(),
            total: utils::format_amount(*total),
        })
        .collect()
}

pub fn render_error(message: &str) {
    warning!("Error: {}", message);
}

pub fn render_list(expenses: &[Expense]) {
    if expenses.is_empty() {
        info!("No expenses recorded yet.");
        return;
    }

    println!("{}", Table::new(expense_rows(expenses)));
}

pub fn render_summary(summary: &ExpenseSummary) {
    info!(
        "Total: {} across {} expense(s)",
        utils::format_amount(summary.total),
        summary.count
    );

    if !summary.by_category.is_empty() {
        println!("{}", Table::new(category_rows(summary)));
    }
}
