//! Expense categories, e.g. 'Food', 'Travel', 'Rent'.

mod db;
mod domain;

pub use db::{
    create_category, create_category_table, delete_category, get_all_categories, get_category,
    get_category_by_name, get_category_id, update_category, update_category_description,
};
pub use domain::{Category, CategoryName};

pub(crate) use db::{check_name_not_blank, map_category_row};
