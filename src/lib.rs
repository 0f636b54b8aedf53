//! Expense Tracker is a small utility for recording personal expenses,
//! filing them under named categories and retrieving them by day, week,
//! month, year or category.
//!
//! The heart of the library is [ExpenseStore], which maps [Category] and
//! [Expense] values onto a SQLite database file and back again. Writing an
//! expense resolves its category by name and creates the category row on
//! demand. Reading an expense rebuilds the full category from a left join,
//! so an expense whose category has since been deleted is still readable.
//!
//! Timestamps are stored as whole Unix seconds, so any sub-second part of an
//! expense's timestamp is dropped on write.

#![warn(missing_docs)]

use std::path::PathBuf;

pub mod category;
pub mod cli;
mod database_id;
pub mod db;
pub mod expense;
pub mod logging;
pub mod period;
mod store;

pub use category::{Category, CategoryName};
pub use database_id::{CategoryId, DatabaseId, ExpenseId};
pub use expense::{Expense, ExpenseBuilder};
pub use period::{Period, TimeWindow, parse_date};
pub use store::ExpenseStore;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The database file could not be opened or its schema could not be
    /// created.
    ///
    /// The store is unusable after this error and the caller should not
    /// retry operations against it.
    #[error("could not open the database at {0:?}: {1}")]
    DatabaseOpen(PathBuf, rusqlite::Error),

    /// An empty string was used to create a category name.
    #[error("Category name cannot be empty")]
    EmptyCategoryName,

    /// A category with the given name already exists in the database.
    #[error("the category \"{0}\" already exists in the database")]
    DuplicateCategoryName(String),

    /// Tried to update a category that does not exist
    #[error("tried to update a category that is not in the database")]
    UpdateMissingCategory,

    /// Tried to delete a category that does not exist
    #[error("tried to delete a category that is not in the database")]
    DeleteMissingCategory,

    /// Tried to update an expense that does not exist
    #[error("tried to update an expense that is not in the database")]
    UpdateMissingExpense,

    /// Tried to delete an expense that does not exist
    #[error("tried to delete an expense that is not in the database")]
    DeleteMissingExpense,

    /// A date string could not be parsed.
    ///
    /// Callers should pass in the offending string.
    #[error("\"{0}\" is not a valid date, expected the format YYYY-MM-DD")]
    InvalidDate(String),

    /// A period was requested that cannot contain any point in time, e.g. a
    /// date range that ends before it starts.
    #[error("invalid period: {0}")]
    InvalidPeriod(String),

    /// Command output could not be written or serialized.
    #[error("could not write output: {0}")]
    OutputError(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

/// A coarse classification of [Error] for callers that need more than
/// success or failure but less than the full error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The row targeted by an update or delete does not exist.
    NotFound,
    /// The write would break a database constraint, e.g. a duplicate
    /// category name.
    ConstraintViolation,
    /// The database could not be opened or a statement failed to run.
    StoreUnavailable,
    /// The caller supplied a value that could not be parsed or validated.
    InvalidInput,
    /// Results could not be written out.
    Output,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UpdateMissingCategory
            | Error::DeleteMissingCategory
            | Error::UpdateMissingExpense
            | Error::DeleteMissingExpense => ErrorKind::NotFound,
            Error::DuplicateCategoryName(_) => ErrorKind::ConstraintViolation,
            Error::SqlError(rusqlite::Error::SqliteFailure(sql_error, _))
                if sql_error.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                ErrorKind::ConstraintViolation
            }
            Error::EmptyCategoryName | Error::InvalidDate(_) | Error::InvalidPeriod(_) => {
                ErrorKind::InvalidInput
            }
            Error::OutputError(_) => ErrorKind::Output,
            Error::DatabaseOpen(_, _) | Error::SqlError(_) => ErrorKind::StoreUnavailable,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        tracing::error!("an unhandled SQL error occurred: {}", value);
        Error::SqlError(value)
    }
}
