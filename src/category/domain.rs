//! Core category domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, database_id::CategoryId};

/// The name an expense is filed under, e.g. `Food`.
///
/// Names are trimmed and unique across the database, and they are what an
/// expense write uses to find its category. The one empty name in circulation
/// is the placeholder for an expense whose category was deleted. Writes reject
/// it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Trim `name` and wrap it.
    ///
    /// # Errors
    /// Returns [Error::EmptyCategoryName] if nothing is left after trimming.
    pub fn new(name: &str) -> Result<Self, Error> {
        match name.trim() {
            "" => Err(Error::EmptyCategoryName),
            trimmed => Ok(Self(trimmed.to_owned())),
        }
    }

    /// Wrap `name` as is. Used for names read from the database, including
    /// the empty name of a deleted category.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CategoryName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryName::new(s)
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A category for expenses, e.g. 'Groceries', 'Eating Out', 'Rent'.
///
/// A category without a description is different from one with an empty
/// description: the former is stored as `NULL`, the latter as `''`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Category {
    /// The ID assigned by the database, `None` until the category has been
    /// stored.
    pub id: Option<CategoryId>,
    /// The unique name of the category.
    pub name: CategoryName,
    /// An optional note about what belongs in the category.
    pub description: Option<String>,
}

impl Category {
    /// Create an unsaved category without a description.
    pub fn new(name: CategoryName) -> Self {
        Self {
            id: None,
            name,
            description: None,
        }
    }

    /// Create an unsaved category with a description.
    pub fn with_description(name: CategoryName, description: &str) -> Self {
        Self {
            id: None,
            name,
            description: Some(description.to_owned()),
        }
    }
}

#[cfg(test)]
mod category_name_tests {
    use crate::{Error, category::CategoryName};

    #[test]
    fn new_fails_on_empty_string() {
        let category_name = CategoryName::new("");

        assert_eq!(category_name, Err(Error::EmptyCategoryName));
    }

    #[test]
    fn new_fails_on_just_whitespace() {
        let category_name = CategoryName::new("\n\t \r");

        assert_eq!(category_name, Err(Error::EmptyCategoryName));
    }

    #[test]
    fn new_trims_surrounding_whitespace() {
        let category_name = CategoryName::new("  Food ").unwrap();

        assert_eq!(category_name.as_ref(), "Food");
    }

    #[test]
    fn new_succeeds_on_non_empty_string() {
        let category_name = CategoryName::new("🍕");

        assert!(category_name.is_ok())
    }
}
