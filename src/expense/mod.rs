//! Expenses: an amount of money spent at a point in time, filed under a
//! category.

mod db;
mod domain;

pub use db::{
    create_expense, create_expense_table, delete_expense, get_all_expenses, get_expense,
    get_expenses_by_category, get_expenses_in_window, update_expense,
};
pub use domain::{Expense, ExpenseBuilder};
