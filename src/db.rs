//! Schema setup for the expense database.

use std::path::Path;

use rusqlite::{Connection, TransactionBehavior, Transaction as SqlTransaction};

use crate::{Error, category::create_category_table, expense::create_expense_table};

/// Open the database file at `path`, creating it if it does not exist, and
/// make sure the schema is in place.
///
/// # Errors
/// Returns [Error::DatabaseOpen] if the file cannot be opened or either table
/// cannot be created.
pub fn open(path: &Path) -> Result<Connection, Error> {
    let connection =
        Connection::open(path).map_err(|error| Error::DatabaseOpen(path.to_owned(), error))?;

    initialize(&connection).map_err(|error| match error {
        Error::SqlError(error) => Error::DatabaseOpen(path.to_owned(), error),
        error => error,
    })?;

    tracing::info!("Opened expense database at {}", path.display());

    Ok(connection)
}

/// Create the category and expense tables if they do not exist yet.
///
/// Safe to call every time the application starts.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    // Deleting a category must leave its expenses in place, pointing at the
    // deleted ID. Must be set outside of a transaction to take effect.
    connection.pragma_update(None, "foreign_keys", false)?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_category_table(&transaction)?;
    create_expense_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Whether `error` is SQLite rejecting a write because of a UNIQUE constraint.
pub(crate) fn is_unique_violation(error: &rusqlite::Error) -> bool {
    matches!(
        error,
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
            },
            _,
        )
    )
}
