//! The command-line interface: argument parsing and running commands against
//! an [ExpenseStore].
//!
//! ```text
//! expense_tracker create category Food "Expenses for food"
//! expense_tracker add expense 15.50 Food 2024-06-15 "Lunch at cafe" Lunch
//! expense_tracker view expenses --category Food --from 2024-06-01 --to 2024-06-30
//! expense_tracker view categories
//! ```

use std::{io::Write, path::PathBuf};

use clap::{Parser, Subcommand};
use time::{
    Date, format_description::BorrowedFormatItem, macros::format_description,
};
use tracing_subscriber::filter::LevelFilter;

use crate::{
    Error, ExpenseStore,
    category::{Category, CategoryName},
    database_id::{CategoryId, ExpenseId},
    expense::Expense,
    period::{Period, parse_date},
};

const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Record and review personal expenses.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// File path to the expense SQLite database. Created if it does not exist.
    #[arg(
        long,
        global = true,
        env = "EXPENSE_TRACKER_DB",
        default_value = "expenses.db"
    )]
    pub db_path: PathBuf,

    /// The log level to use when `RUST_LOG` is not set.
    #[arg(long, global = true, default_value_t = LevelFilter::WARN)]
    pub log_level: LevelFilter,

    /// Print results as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    /// What to do.
    #[command(subcommand)]
    pub command: Command,
}

/// The top-level commands.
#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Add a record.
    Add {
        /// What to add.
        #[command(subcommand)]
        target: AddTarget,
    },
    /// Create a record.
    Create {
        /// What to create.
        #[command(subcommand)]
        target: CreateTarget,
    },
    /// Show stored records.
    View {
        /// What to show.
        #[command(subcommand)]
        target: ViewTarget,
    },
    /// Delete a record.
    Delete {
        /// What to delete.
        #[command(subcommand)]
        target: DeleteTarget,
    },
}

/// Records that can be added.
#[derive(Subcommand, Debug, PartialEq)]
pub enum AddTarget {
    /// Add an expense. The category is created if it does not exist.
    Expense {
        /// How much was spent.
        #[arg(allow_negative_numbers = true)]
        amount: f64,
        /// The name of the category to file the expense under.
        category: String,
        /// The day the money was spent, as YYYY-MM-DD.
        #[arg(value_parser = date_arg)]
        date: Date,
        /// A longer note about the expense.
        description: Option<String>,
        /// A short label for the expense.
        title: Option<String>,
    },
}

/// Records that can be created.
#[derive(Subcommand, Debug, PartialEq)]
pub enum CreateTarget {
    /// Create a category.
    Category {
        /// The unique name of the category.
        name: String,
        /// What belongs in the category.
        description: Option<String>,
    },
}

/// Records that can be shown.
#[derive(Subcommand, Debug, PartialEq)]
pub enum ViewTarget {
    /// Show expenses, oldest first.
    Expenses {
        /// Only show expenses in this category.
        #[arg(long)]
        category: Option<String>,
        /// Only show expenses on or after this day (YYYY-MM-DD).
        #[arg(long, value_parser = date_arg)]
        from: Option<Date>,
        /// Only show expenses on or before this day (YYYY-MM-DD).
        #[arg(long, value_parser = date_arg)]
        to: Option<Date>,
    },
    /// Show all categories.
    Categories,
}

/// Records that can be deleted.
#[derive(Subcommand, Debug, PartialEq)]
pub enum DeleteTarget {
    /// Delete an expense by ID.
    Expense {
        /// The ID of the expense.
        id: ExpenseId,
    },
    /// Delete a category by ID. Its expenses are kept.
    Category {
        /// The ID of the category.
        id: CategoryId,
    },
}

/// Run `command` against `store`, writing results to `out`.
///
/// # Errors
/// Returns any error from the store, an [Error::EmptyCategoryName] for blank
/// category names, or an [Error::OutputError] if `out` cannot be written to.
pub fn run(
    command: Command,
    json: bool,
    store: &ExpenseStore,
    out: &mut impl Write,
) -> Result<(), Error> {
    match command {
        Command::Add {
            target:
                AddTarget::Expense {
                    amount,
                    category,
                    date,
                    description,
                    title,
                },
        } => {
            let category = Category::new(CategoryName::new(&category)?);
            let mut builder = Expense::build(amount, category, date.midnight().assume_utc());
            builder.description = description;
            builder.title = title;

            let expense = store.create_expense(builder)?;

            if json {
                write_json(out, &expense)
            } else {
                write_line(out, &format!("Added expense #{}", expense.id))
            }
        }
        Command::Create {
            target: CreateTarget::Category { name, description },
        } => {
            let name = CategoryName::new(&name)?;
            let category = match description {
                Some(description) => Category::with_description(name, &description),
                None => Category::new(name),
            };

            let category = store.create_category(&category)?;

            if json {
                write_json(out, &category)
            } else {
                write_line(
                    out,
                    &format!(
                        "Created category #{} \"{}\"",
                        category.id.unwrap_or_default(),
                        category.name
                    ),
                )
            }
        }
        Command::View {
            target: ViewTarget::Expenses { category, from, to },
        } => {
            // Names are trimmed when stored, so the filter must be too.
            let category = category.as_deref().map(str::trim);

            let expenses = match (from, to, category) {
                (None, None, None) => store.get_all_expenses()?,
                (None, None, Some(name)) => store.get_expenses_by_category(name)?,
                (from, to, name) => {
                    store.get_expenses_in_period(Period::Between { from, to }, name)?
                }
            };

            if json {
                return write_json(out, &expenses);
            }

            for expense in &expenses {
                write_line(out, &format_expense(expense)?)?;
            }

            Ok(())
        }
        Command::View {
            target: ViewTarget::Categories,
        } => {
            let categories = store.get_all_categories()?;

            if json {
                return write_json(out, &categories);
            }

            for category in &categories {
                write_line(out, &format_category(category))?;
            }

            Ok(())
        }
        Command::Delete {
            target: DeleteTarget::Expense { id },
        } => {
            store.delete_expense(id)?;

            write_line(out, &format!("Deleted expense #{id}"))
        }
        Command::Delete {
            target: DeleteTarget::Category { id },
        } => {
            store.delete_category(id)?;

            write_line(out, &format!("Deleted category #{id}"))
        }
    }
}

fn date_arg(text: &str) -> Result<Date, String> {
    parse_date(text).map_err(|error| error.to_string())
}

fn format_expense(expense: &Expense) -> Result<String, Error> {
    let timestamp = expense
        .timestamp
        .format(TIMESTAMP_FORMAT)
        .map_err(|error| Error::OutputError(error.to_string()))?;

    let mut line = format!(
        "#{} {timestamp} {:.2} [{}]",
        expense.id, expense.amount, expense.category.name
    );

    if let Some(title) = &expense.title {
        line.push_str(&format!(" {title}"));
    }

    if let Some(description) = &expense.description {
        line.push_str(&format!(" - {description}"));
    }

    Ok(line)
}

fn format_category(category: &Category) -> String {
    let id = category.id.unwrap_or_default();

    match &category.description {
        Some(description) => format!("#{id} {} - {description}", category.name),
        None => format!("#{id} {}", category.name),
    }
}

fn write_line(out: &mut impl Write, line: &str) -> Result<(), Error> {
    writeln!(out, "{line}").map_err(|error| Error::OutputError(error.to_string()))
}

fn write_json(out: &mut impl Write, value: &impl serde::Serialize) -> Result<(), Error> {
    serde_json::to_writer_pretty(&mut *out, value)
        .map_err(|error| Error::OutputError(error.to_string()))?;

    write_line(out, "")
}
