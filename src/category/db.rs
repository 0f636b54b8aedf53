//! Database operations for categories.

use rusqlite::{Connection, OptionalExtension, Row};

use crate::{
    Error,
    category::{Category, CategoryName},
    database_id::CategoryId,
    db::is_unique_violation,
};

/// Create a category and return it with its generated ID.
///
/// A `None` description is stored as `NULL`.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyCategoryName] if `name` is blank,
/// - [Error::DuplicateCategoryName] if a category called `name` already exists,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_category(
    name: CategoryName,
    description: Option<&str>,
    connection: &Connection,
) -> Result<Category, Error> {
    check_name_not_blank(&name)?;

    connection
        .execute(
            "INSERT INTO category (name, description) VALUES (?1, ?2);",
            (name.as_ref(), description),
        )
        .map_err(|error| map_name_conflict(error, &name))?;

    let id = connection.last_insert_rowid();
    tracing::debug!("Created category {id} \"{name}\"");

    Ok(Category {
        id: Some(id),
        name,
        description: description.map(str::to_owned),
    })
}

/// Look up the ID of the category called `name`.
///
/// Returns `Ok(None)` if there is no such category.
pub fn get_category_id(name: &str, connection: &Connection) -> Result<Option<CategoryId>, Error> {
    connection
        .prepare("SELECT id FROM category WHERE name = :name;")?
        .query_row(&[(":name", &name)], |row| row.get(0))
        .optional()
        .map_err(|error| error.into())
}

/// Retrieve a single category by ID.
///
/// Returns `Ok(None)` if there is no such category.
pub fn get_category(id: CategoryId, connection: &Connection) -> Result<Option<Category>, Error> {
    connection
        .prepare("SELECT id, name, description FROM category WHERE id = :id;")?
        .query_row(&[(":id", &id)], |row| map_category_row(row, 0))
        .optional()
        .map_err(|error| error.into())
}

/// Retrieve a single category by its name.
///
/// Returns `Ok(None)` if there is no such category.
pub fn get_category_by_name(
    name: &str,
    connection: &Connection,
) -> Result<Option<Category>, Error> {
    connection
        .prepare("SELECT id, name, description FROM category WHERE name = :name;")?
        .query_row(&[(":name", &name)], |row| map_category_row(row, 0))
        .optional()
        .map_err(|error| error.into())
}

/// Retrieve all categories ordered alphabetically by name.
pub fn get_all_categories(connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare("SELECT id, name, description FROM category ORDER BY name ASC;")?
        .query_map([], |row| map_category_row(row, 0))?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Rename the category with `id` to the name of `category`.
///
/// Only the name is written. The description of `category` is ignored, use
/// [update_category_description] to change it.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyCategoryName] if the new name is blank,
/// - [Error::UpdateMissingCategory] if there is no category with `id`,
/// - [Error::DuplicateCategoryName] if another category already has the new name,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_category(
    id: CategoryId,
    category: &Category,
    connection: &Connection,
) -> Result<(), Error> {
    check_name_not_blank(&category.name)?;

    let rows_affected = connection
        .execute(
            "UPDATE category SET name = ?1 WHERE id = ?2",
            (category.name.as_ref(), id),
        )
        .map_err(|error| map_name_conflict(error, &category.name))?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingCategory);
    }

    tracing::debug!("Renamed category {id} to \"{}\"", category.name);

    Ok(())
}

/// Replace the description of the category with `id`. `None` clears it.
///
/// # Errors
/// Returns [Error::UpdateMissingCategory] if there is no category with `id`.
pub fn update_category_description(
    id: CategoryId,
    description: Option<&str>,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE category SET description = ?1 WHERE id = ?2",
        (description, id),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingCategory);
    }

    Ok(())
}

/// Delete a category by ID.
///
/// Expenses in the category are kept and keep pointing at the deleted ID.
///
/// # Errors
/// Returns [Error::DeleteMissingCategory] if the category doesn't exist.
pub fn delete_category(id: CategoryId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM category WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingCategory);
    }

    tracing::debug!("Deleted category {id}");

    Ok(())
}

/// Initialize the category table.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            description TEXT
        );",
        (),
    )?;

    Ok(())
}

/// Map the `id, name, description` columns starting at `offset` to a
/// [Category].
///
/// All three columns may be `NULL` when the row comes from the right-hand
/// side of a left join. A missing category maps to an empty name with no ID
/// and no description.
pub(crate) fn map_category_row(row: &Row, offset: usize) -> Result<Category, rusqlite::Error> {
    let id = row.get(offset)?;
    let raw_name: Option<String> = row.get(offset + 1)?;
    let name = CategoryName::new_unchecked(raw_name.as_deref().unwrap_or_default());
    let description = row.get(offset + 2)?;

    Ok(Category {
        id,
        name,
        description,
    })
}

/// Reject a blank name before it reaches the database.
///
/// [map_category_row] reads a deleted category back with an empty name, so an
/// expense loaded after its category was deleted carries one. Writing that
/// name would create a real category that matches every such expense.
pub(crate) fn check_name_not_blank(name: &CategoryName) -> Result<(), Error> {
    if name.as_ref().trim().is_empty() {
        Err(Error::EmptyCategoryName)
    } else {
        Ok(())
    }
}

fn map_name_conflict(error: rusqlite::Error, name: &CategoryName) -> Error {
    if is_unique_violation(&error) {
        Error::DuplicateCategoryName(name.to_string())
    } else {
        error.into()
    }
}
