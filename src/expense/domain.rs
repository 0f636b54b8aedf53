//! Core expense domain types.

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime, UtcOffset};

use crate::{category::Category, database_id::ExpenseId};

/// An amount of money spent on something at a point in time.
///
/// To create a new `Expense`, use [Expense::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// The ID of the expense.
    pub id: ExpenseId,
    /// The amount of money spent. Not validated, any sign or magnitude is
    /// accepted.
    pub amount: f64,
    /// The category the expense is filed under.
    ///
    /// If the category has been deleted since the expense was saved, this is
    /// a category with an empty name and no ID.
    pub category: Category,
    /// When the money was spent, in UTC and truncated to whole seconds.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// A longer note about the expense.
    pub description: Option<String>,
    /// A short label for the expense.
    pub title: Option<String>,
}

impl Expense {
    /// Create a new expense.
    ///
    /// Shortcut for [ExpenseBuilder] for discoverability.
    pub fn build(amount: f64, category: Category, timestamp: OffsetDateTime) -> ExpenseBuilder {
        ExpenseBuilder {
            amount,
            category,
            timestamp,
            description: None,
            title: None,
        }
    }
}

/// A builder for creating [Expense] instances.
///
/// The builder holds everything an expense needs except for its ID, which is
/// assigned by the database when the builder is passed to
/// [create_expense](crate::expense::create_expense).
///
/// # Examples
///
/// ```
/// use expense_tracker::{Category, CategoryName, Expense, ExpenseStore};
/// use time::macros::datetime;
///
/// let store = ExpenseStore::open_in_memory().unwrap();
/// let food = Category::new(CategoryName::new("Food").unwrap());
///
/// let expense = store
///     .create_expense(
///         Expense::build(15.50, food, datetime!(2024-06-15 12:00:00 UTC))
///             .description("Lunch at cafe")
///             .title("Lunch"),
///     )
///     .unwrap();
///
/// assert_eq!(expense.category.name.as_ref(), "Food");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseBuilder {
    /// The amount of money spent.
    pub amount: f64,

    /// The category to file the expense under.
    ///
    /// Only the name is used to find the category in the database. If no
    /// category with that name exists, one is created from this value,
    /// description included.
    pub category: Category,

    /// When the money was spent.
    ///
    /// Stored as whole Unix seconds, anything below a second is dropped.
    pub timestamp: OffsetDateTime,

    /// A longer note about the expense, e.g. `"Lunch at cafe"`.
    pub description: Option<String>,

    /// A short label for the expense, e.g. `"Lunch"`.
    pub title: Option<String>,
}

impl ExpenseBuilder {
    /// Set the description for the expense.
    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_owned());
        self
    }

    /// Set the title for the expense.
    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_owned());
        self
    }
}

/// Round `timestamp` down to the whole second and convert it to UTC.
///
/// This is the value an expense's timestamp has after it has been written
/// to and read back from the database.
pub(crate) fn truncate_to_second(timestamp: OffsetDateTime) -> OffsetDateTime {
    let truncated = timestamp - Duration::nanoseconds(i64::from(timestamp.nanosecond()));

    truncated.to_offset(UtcOffset::UTC)
}
