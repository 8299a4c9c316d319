mod account;
mod expense;

pub use account::AccountStore;
pub use expense::ExpenseStore;
pub use expense::MemoryExpenseStore;
pub use expense::apply_patch;
pub use expense::prepare_expense;
