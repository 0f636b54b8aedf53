//! Database operations for expenses.
//!
//! Expenses reference their category by ID in the database, but carry the
//! whole [Category] in memory. Writes look the category up by name (creating
//! it when missing) and store its ID, reads rebuild the category from a left
//! join so that an expense with a missing category can still be read.

use rusqlite::{
    Connection, OptionalExtension, Row, TransactionBehavior, Transaction as SqlTransaction,
    named_params, types::Type,
};
use time::OffsetDateTime;

use crate::{
    Error,
    category::{
        Category, check_name_not_blank, create_category, get_category_by_name, map_category_row,
    },
    database_id::ExpenseId,
    expense::{Expense, ExpenseBuilder, domain::truncate_to_second},
};

const SELECT_EXPENSE: &str =
    "SELECT e.id, e.amount, e.timestamp, e.description, e.title, c.id, c.name, c.description
     FROM expense e
     LEFT JOIN category c ON e.category_id = c.id";

/// Save a new expense and return it with its generated ID.
///
/// The category is looked up by name and created if it does not exist yet.
/// The lookup, the category insert and the expense insert run in a single
/// immediate transaction. Either all of them take effect or none do, and no
/// other connection can write between the lookup and the insert.
///
/// The returned expense holds the category as stored in the database and the
/// timestamp truncated to whole seconds.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyCategoryName] if the category name is blank, e.g. for an
///   expense read back after its category was deleted,
/// - [Error::SqlError] if another connection holds a write lock on the
///   database (`SQLITE_BUSY`), in which case nothing is written,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_expense(builder: ExpenseBuilder, connection: &Connection) -> Result<Expense, Error> {
    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    let category = get_or_create_category(&builder.category, &transaction)?;
    let timestamp = truncate_to_second(builder.timestamp);

    transaction.execute(
        "INSERT INTO expense (amount, category_id, timestamp, description, title)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        (
            builder.amount,
            category.id,
            timestamp.unix_timestamp(),
            &builder.description,
            &builder.title,
        ),
    )?;
    let id = transaction.last_insert_rowid();

    transaction.commit()?;
    tracing::debug!("Created expense {id} in category \"{}\"", category.name);

    Ok(Expense {
        id,
        amount: builder.amount,
        category,
        timestamp,
        description: builder.description,
        title: builder.title,
    })
}

/// Retrieve an expense from the database by its `id`.
///
/// Returns `Ok(None)` if there is no expense with `id`.
pub fn get_expense(id: ExpenseId, connection: &Connection) -> Result<Option<Expense>, Error> {
    connection
        .prepare(&format!("{SELECT_EXPENSE} WHERE e.id = :id"))?
        .query_row(&[(":id", &id)], map_expense_row)
        .optional()
        .map_err(|error| error.into())
}

/// Retrieve all expenses, oldest first.
pub fn get_all_expenses(connection: &Connection) -> Result<Vec<Expense>, Error> {
    connection
        .prepare(&format!("{SELECT_EXPENSE} ORDER BY e.timestamp ASC, e.id ASC"))?
        .query_map([], map_expense_row)?
        .map(|maybe_expense| maybe_expense.map_err(|error| error.into()))
        .collect()
}

/// Retrieve the expenses filed under the category called `category_name`,
/// oldest first.
///
/// Expenses whose category no longer exists never match.
pub fn get_expenses_by_category(
    category_name: &str,
    connection: &Connection,
) -> Result<Vec<Expense>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_EXPENSE} WHERE c.name = :name ORDER BY e.timestamp ASC, e.id ASC"
        ))?
        .query_map(&[(":name", &category_name)], map_expense_row)?
        .map(|maybe_expense| maybe_expense.map_err(|error| error.into()))
        .collect()
}

/// Retrieve the expenses with a timestamp in `[start, end)`, oldest first.
///
/// A `None` bound leaves that side of the window open. If `category_name` is
/// given, only expenses in that category are returned.
pub fn get_expenses_in_window(
    start: Option<OffsetDateTime>,
    end: Option<OffsetDateTime>,
    category_name: Option<&str>,
    connection: &Connection,
) -> Result<Vec<Expense>, Error> {
    let start = start.map(OffsetDateTime::unix_timestamp);
    let end = end.map(OffsetDateTime::unix_timestamp);

    connection
        .prepare(&format!(
            "{SELECT_EXPENSE}
             WHERE (:start IS NULL OR e.timestamp >= :start)
               AND (:end IS NULL OR e.timestamp < :end)
               AND (:name IS NULL OR c.name = :name)
             ORDER BY e.timestamp ASC, e.id ASC"
        ))?
        .query_map(
            named_params! {":start": start, ":end": end, ":name": category_name},
            map_expense_row,
        )?
        .map(|maybe_expense| maybe_expense.map_err(|error| error.into()))
        .collect()
}

/// Replace every field of the expense with `id`.
///
/// The category is resolved the same way as in [create_expense].
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingExpense] if there is no expense with `id`, in which
///   case no category is created either,
/// - [Error::EmptyCategoryName] if the category name is blank,
/// - [Error::SqlError] if another connection holds a write lock on the
///   database,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_expense(
    id: ExpenseId,
    builder: ExpenseBuilder,
    connection: &Connection,
) -> Result<(), Error> {
    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    let category = get_or_create_category(&builder.category, &transaction)?;

    let rows_affected = transaction.execute(
        "UPDATE expense
         SET amount = ?1, category_id = ?2, timestamp = ?3, description = ?4, title = ?5
         WHERE id = ?6",
        (
            builder.amount,
            category.id,
            truncate_to_second(builder.timestamp).unix_timestamp(),
            &builder.description,
            &builder.title,
            id,
        ),
    )?;

    if rows_affected == 0 {
        // Dropping the transaction rolls back any category created above.
        return Err(Error::UpdateMissingExpense);
    }

    transaction.commit()?;
    tracing::debug!("Updated expense {id}");

    Ok(())
}

/// Delete an expense by ID.
///
/// # Errors
/// Returns [Error::DeleteMissingExpense] if the expense doesn't exist.
pub fn delete_expense(id: ExpenseId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM expense WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingExpense);
    }

    tracing::debug!("Deleted expense {id}");

    Ok(())
}

/// Create the expense table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS expense (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            amount REAL NOT NULL,
            category_id INTEGER,
            timestamp INTEGER NOT NULL,
            description TEXT,
            title TEXT,
            FOREIGN KEY(category_id) REFERENCES category(id)
        );

        CREATE INDEX IF NOT EXISTS idx_expense_timestamp ON expense(timestamp);",
    )?;

    Ok(())
}

fn get_or_create_category(category: &Category, connection: &Connection) -> Result<Category, Error> {
    check_name_not_blank(&category.name)?;

    if let Some(existing) = get_category_by_name(category.name.as_ref(), connection)? {
        return Ok(existing);
    }

    tracing::info!("Creating missing category \"{}\"", category.name);
    create_category(
        category.name.clone(),
        category.description.as_deref(),
        connection,
    )
}

fn map_expense_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    let id = row.get(0)?;
    let amount = row.get(1)?;
    let timestamp = map_timestamp(row, 2)?;
    let description = row.get(3)?;
    let title = row.get(4)?;
    let category = map_category_row(row, 5)?;

    Ok(Expense {
        id,
        amount,
        category,
        timestamp,
        description,
        title,
    })
}

fn map_timestamp(row: &Row, index: usize) -> Result<OffsetDateTime, rusqlite::Error> {
    let seconds: i64 = row.get(index)?;

    OffsetDateTime::from_unix_timestamp(seconds).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(index, Type::Integer, Box::new(error))
    })
}
