//! The expense store: one SQLite connection and every operation on the
//! category and expense tables.

use std::path::Path;

use rusqlite::Connection;

use crate::{
    Error,
    category::{self, Category},
    database_id::{CategoryId, ExpenseId},
    db,
    expense::{self, Expense, ExpenseBuilder},
    period::Period,
};

/// Creates, retrieves, updates and deletes categories and expenses in a
/// SQLite database.
///
/// The store owns a single connection and is meant to be driven by a single
/// caller. Every operation is one blocking call that has either completed or
/// failed when it returns. Writes that may create a category run in one
/// transaction, so several stores opened on the same file can add expenses
/// for the same new category without tripping over each other.
///
/// The connection is closed when the store is dropped.
#[derive(Debug)]
pub struct ExpenseStore {
    connection: Connection,
}

impl ExpenseStore {
    /// Open the database file at `path`, creating the file and the tables if
    /// needed.
    ///
    /// # Errors
    /// Returns [Error::DatabaseOpen] if the file cannot be opened or the
    /// tables cannot be created. The store must not be used in that case.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let connection = db::open(path.as_ref())?;

        Ok(Self { connection })
    }

    /// Open a store backed by a fresh in-memory database.
    ///
    /// # Errors
    /// Returns [Error::SqlError] if the tables cannot be created.
    pub fn open_in_memory() -> Result<Self, Error> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Wrap an existing connection, creating the tables if needed.
    ///
    /// # Errors
    /// Returns [Error::SqlError] if the tables cannot be created.
    pub fn from_connection(connection: Connection) -> Result<Self, Error> {
        db::initialize(&connection)?;

        Ok(Self { connection })
    }

    /// The underlying database connection.
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Save `category` and return it with its generated ID.
    ///
    /// # Errors
    /// Returns [Error::DuplicateCategoryName] if a category with the same name
    /// already exists.
    pub fn create_category(&self, category: &Category) -> Result<Category, Error> {
        category::create_category(
            category.name.clone(),
            category.description.as_deref(),
            &self.connection,
        )
    }

    /// Look up the ID of the category called `name`.
    pub fn get_category_id(&self, name: &str) -> Result<Option<CategoryId>, Error> {
        category::get_category_id(name, &self.connection)
    }

    /// Retrieve the category called `name`.
    pub fn get_category_by_name(&self, name: &str) -> Result<Option<Category>, Error> {
        category::get_category_by_name(name, &self.connection)
    }

    /// Retrieve the category with `id`.
    pub fn get_category(&self, id: CategoryId) -> Result<Option<Category>, Error> {
        category::get_category(id, &self.connection)
    }

    /// Retrieve every category.
    pub fn get_all_categories(&self) -> Result<Vec<Category>, Error> {
        category::get_all_categories(&self.connection)
    }

    /// Rename the category with `id` to the name of `category`. The
    /// description is left as it is.
    ///
    /// # Errors
    /// Returns [Error::UpdateMissingCategory] if there is no category with
    /// `id`, or [Error::DuplicateCategoryName] if the new name is taken.
    pub fn update_category(&self, id: CategoryId, category: &Category) -> Result<(), Error> {
        category::update_category(id, category, &self.connection)
    }

    /// Replace the description of the category with `id`.
    ///
    /// # Errors
    /// Returns [Error::UpdateMissingCategory] if there is no category with `id`.
    pub fn update_category_description(
        &self,
        id: CategoryId,
        description: Option<&str>,
    ) -> Result<(), Error> {
        category::update_category_description(id, description, &self.connection)
    }

    /// Delete the category with `id`. Its expenses are kept.
    ///
    /// # Errors
    /// Returns [Error::DeleteMissingCategory] if there is no category with `id`.
    pub fn delete_category(&self, id: CategoryId) -> Result<(), Error> {
        category::delete_category(id, &self.connection)
    }

    /// Save a new expense, creating its category if needed.
    pub fn create_expense(&self, builder: ExpenseBuilder) -> Result<Expense, Error> {
        expense::create_expense(builder, &self.connection)
    }

    /// Retrieve the expense with `id`.
    pub fn get_expense(&self, id: ExpenseId) -> Result<Option<Expense>, Error> {
        expense::get_expense(id, &self.connection)
    }

    /// Retrieve every expense, oldest first.
    pub fn get_all_expenses(&self) -> Result<Vec<Expense>, Error> {
        expense::get_all_expenses(&self.connection)
    }

    /// Retrieve the expenses in the category called `category_name`.
    pub fn get_expenses_by_category(&self, category_name: &str) -> Result<Vec<Expense>, Error> {
        expense::get_expenses_by_category(category_name, &self.connection)
    }

    /// Retrieve the expenses in `period`, optionally only those in the
    /// category called `category_name`.
    ///
    /// # Errors
    /// Returns [Error::InvalidPeriod] if `period` does not describe a valid
    /// span of time.
    pub fn get_expenses_in_period(
        &self,
        period: Period,
        category_name: Option<&str>,
    ) -> Result<Vec<Expense>, Error> {
        let window = period.window()?;

        expense::get_expenses_in_window(window.start, window.end, category_name, &self.connection)
    }

    /// Replace every field of the expense with `id`, creating its category if
    /// needed.
    ///
    /// # Errors
    /// Returns [Error::UpdateMissingExpense] if there is no expense with `id`.
    pub fn update_expense(&self, id: ExpenseId, builder: ExpenseBuilder) -> Result<(), Error> {
        expense::update_expense(id, builder, &self.connection)
    }

    /// Delete the expense with `id`.
    ///
    /// # Errors
    /// Returns [Error::DeleteMissingExpense] if there is no expense with `id`.
    pub fn delete_expense(&self, id: ExpenseId) -> Result<(), Error> {
        expense::delete_expense(id, &self.connection)
    }
}

#[cfg(test)]
mod expense_store_tests {
    use std::{collections::HashSet, time::Duration};

    use tempfile::tempdir;
    use time::{
        Month,
        macros::{date, datetime},
    };

    use crate::{Category, CategoryName, Error, ErrorKind, Expense, Period};

    use super::ExpenseStore;

    fn get_test_store() -> ExpenseStore {
        ExpenseStore::open_in_memory().expect("Could not open in-memory store")
    }

    fn category(name: &str) -> Category {
        Category::new(CategoryName::new_unchecked(name))
    }

    #[test]
    fn lunch_scenario() {
        let store = get_test_store();
        store.create_category(&category("Food")).unwrap();

        store
            .create_expense(
                Expense::build(15.50, category("Food"), datetime!(2024-06-15 12:00:00 UTC))
                    .description("Lunch at cafe")
                    .title("Lunch"),
            )
            .expect("Could not create expense");

        let expenses = store.get_all_expenses().unwrap();
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].amount, 15.50);
        assert_eq!(expenses[0].category.name.as_ref(), "Food");
        assert_eq!(expenses[0].title.as_deref(), Some("Lunch"));
    }

    #[test]
    fn expense_with_new_category_round_trips() {
        let store = get_test_store();
        let timestamp = datetime!(2024-03-10 18:45:12.345 UTC);

        let created = store
            .create_expense(
                Expense::build(42.0, category("Gifts"), timestamp)
                    .description("Birthday")
                    .title("Present"),
            )
            .unwrap();
        let selected = store.get_expense(created.id).unwrap().unwrap();

        assert_eq!(selected.amount, 42.0);
        assert_eq!(selected.category.name.as_ref(), "Gifts");
        assert_eq!(selected.timestamp, datetime!(2024-03-10 18:45:12 UTC));
        assert_eq!(selected.description.as_deref(), Some("Birthday"));
        assert_eq!(selected.title.as_deref(), Some("Present"));
        assert!(store.get_category_by_name("Gifts").unwrap().is_some());
    }

    #[test]
    fn duplicate_category_is_rejected() {
        let store = get_test_store();
        store.create_category(&category("Food")).unwrap();

        let result = store.create_category(&category("Food"));

        match result {
            Err(error) => {
                assert_eq!(error, Error::DuplicateCategoryName("Food".to_owned()));
                assert_eq!(error.kind(), ErrorKind::ConstraintViolation);
            }
            Ok(category) => panic!("Expected duplicate to fail, got {category:?}"),
        }
        let names: Vec<_> = store
            .get_all_categories()
            .unwrap()
            .into_iter()
            .filter(|category| category.name.as_ref() == "Food")
            .collect();
        assert_eq!(names.len(), 1);
    }

    #[test]
    fn category_lookups_agree() {
        let store = get_test_store();
        let created = store
            .create_category(&Category::with_description(
                CategoryName::new_unchecked("Travel"),
                "Trains and planes",
            ))
            .unwrap();
        let id = created.id.unwrap();

        assert_eq!(store.get_category_id("Travel"), Ok(Some(id)));
        assert_eq!(store.get_category(id), Ok(Some(created.clone())));
        assert_eq!(store.get_category_by_name("Travel"), Ok(Some(created)));
    }

    #[test]
    fn category_updates() {
        let store = get_test_store();
        let id = store.create_category(&category("Food")).unwrap().id.unwrap();

        store.update_category(id, &category("Groceries")).unwrap();
        store
            .update_category_description(id, Some("Supermarket"))
            .unwrap();

        let updated = store.get_category(id).unwrap().unwrap();
        assert_eq!(updated.name.as_ref(), "Groceries");
        assert_eq!(updated.description.as_deref(), Some("Supermarket"));
        assert_eq!(
            store.update_category(id + 1, &category("Nope")),
            Err(Error::UpdateMissingCategory)
        );
    }

    #[test]
    fn deleted_category_leaves_readable_expense() {
        let store = get_test_store();
        let created = store
            .create_expense(Expense::build(
                9.99,
                category("Music"),
                datetime!(2024-06-15 12:00 UTC),
            ))
            .unwrap();

        store
            .delete_category(created.category.id.unwrap())
            .expect("Could not delete category");

        let selected = store.get_expense(created.id).unwrap().unwrap();
        assert_eq!(selected.category.name.as_ref(), "");
        assert_eq!(store.delete_category(1), Err(Error::DeleteMissingCategory));
    }

    #[test]
    fn filter_by_category() {
        let store = get_test_store();
        let timestamp = datetime!(2024-06-15 12:00 UTC);
        let mut food_ids = HashSet::new();
        for amount in [1.0, 2.0, 3.0] {
            let expense = store
                .create_expense(Expense::build(amount, category("Food"), timestamp))
                .unwrap();
            food_ids.insert(expense.id);
            store
                .create_expense(Expense::build(amount * 100.0, category("Travel"), timestamp))
                .unwrap();
        }

        let food = store.get_expenses_by_category("Food").unwrap();

        let got_ids: HashSet<_> = food.iter().map(|expense| expense.id).collect();
        assert_eq!(got_ids, food_ids);
        assert!(food.iter().all(|expense| expense.category.name.as_ref() == "Food"));
    }

    #[test]
    fn expenses_in_period() {
        let store = get_test_store();
        for timestamp in [
            datetime!(2024-05-31 23:59:59 UTC),
            datetime!(2024-06-01 00:00 UTC),
            datetime!(2024-06-15 12:00 UTC),
            datetime!(2024-06-30 23:59:59 UTC),
            datetime!(2024-07-01 00:00 UTC),
        ] {
            store
                .create_expense(Expense::build(1.0, category("Food"), timestamp))
                .unwrap();
        }
        store
            .create_expense(Expense::build(
                1.0,
                category("Travel"),
                datetime!(2024-06-15 08:00 UTC),
            ))
            .unwrap();

        let count = |period: Period, category_name: Option<&str>| {
            store
                .get_expenses_in_period(period, category_name)
                .unwrap()
                .len()
        };

        let june = Period::Month {
            year: 2024,
            month: Month::June,
        };
        assert_eq!(count(june, None), 4);
        assert_eq!(count(june, Some("Food")), 3);
        assert_eq!(count(Period::Day(date!(2024 - 06 - 15)), None), 2);
        assert_eq!(count(Period::Week(date!(2024 - 06 - 25)), None), 2);
        assert_eq!(count(Period::Year(2024), None), 6);
        assert_eq!(count(Period::Year(2023), None), 0);
    }

    #[test]
    fn invalid_period_is_rejected() {
        let store = get_test_store();

        let result = store.get_expenses_in_period(
            Period::Between {
                from: Some(date!(2024 - 06 - 02)),
                to: Some(date!(2024 - 06 - 01)),
            },
            None,
        );

        assert!(matches!(result, Err(Error::InvalidPeriod(_))));
    }

    #[test]
    fn expense_update_and_delete() {
        let store = get_test_store();
        let created = store
            .create_expense(Expense::build(
                1.0,
                category("Food"),
                datetime!(2024-06-15 12:00 UTC),
            ))
            .unwrap();

        store
            .update_expense(
                created.id,
                Expense::build(2.0, category("Food"), datetime!(2024-06-16 12:00 UTC)),
            )
            .unwrap();
        assert_eq!(store.get_expense(created.id).unwrap().unwrap().amount, 2.0);

        store.delete_expense(created.id).unwrap();
        assert_eq!(store.get_expense(created.id), Ok(None));
        assert_eq!(
            store.delete_expense(created.id),
            Err(Error::DeleteMissingExpense)
        );
    }

    #[test]
    fn stores_sharing_a_file_reuse_the_same_category() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("expenses.db");
        let first = ExpenseStore::open(&path).unwrap();
        let second = ExpenseStore::open(&path).unwrap();
        let timestamp = datetime!(2024-06-15 12:00 UTC);

        let from_first = first
            .create_expense(Expense::build(1.0, category("Shared"), timestamp))
            .unwrap();
        let from_second = second
            .create_expense(Expense::build(2.0, category("Shared"), timestamp))
            .unwrap();

        assert_eq!(from_first.category, from_second.category);
        assert_eq!(first.get_all_categories().unwrap().len(), 1);
        assert_eq!(second.get_expenses_by_category("Shared").unwrap().len(), 2);
    }

    #[test]
    fn create_expense_fails_cleanly_while_another_connection_writes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("expenses.db");
        let store = ExpenseStore::open(&path).unwrap();
        store.connection().busy_timeout(Duration::ZERO).unwrap();
        let other = rusqlite::Connection::open(&path).unwrap();
        let timestamp = datetime!(2024-06-15 12:00 UTC);

        other.execute_batch("BEGIN IMMEDIATE").unwrap();
        other
            .execute("INSERT INTO category (name) VALUES ('Contested')", ())
            .unwrap();
        let blocked = store.create_expense(Expense::build(1.0, category("Contested"), timestamp));

        match blocked {
            Err(Error::SqlError(rusqlite::Error::SqliteFailure(error, _))) => {
                assert_eq!(error.code, rusqlite::ErrorCode::DatabaseBusy)
            }
            result => panic!("Expected a busy error, got {result:?}"),
        }
        assert_eq!(store.get_category_by_name("Contested"), Ok(None));
        assert_eq!(store.get_all_expenses(), Ok(vec![]));

        other.execute_batch("COMMIT").unwrap();
        let created = store
            .create_expense(Expense::build(1.0, category("Contested"), timestamp))
            .expect("Could not create expense after the lock was released");

        assert_eq!(store.get_all_categories().unwrap().len(), 1);
        assert_eq!(
            store.get_category_id("Contested"),
            Ok(created.category.id)
        );
    }

    #[test]
    fn data_survives_reopening() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("expenses.db");
        let created = {
            let store = ExpenseStore::open(&path).unwrap();
            store
                .create_expense(Expense::build(
                    7.0,
                    category("Food"),
                    datetime!(2024-06-15 12:00 UTC),
                ))
                .unwrap()
        };

        let store = ExpenseStore::open(&path).expect("Could not reopen store");

        assert_eq!(store.get_expense(created.id), Ok(Some(created)));
    }
}
