//! Time periods for retrieving expenses by day, week, month, year or an
//! arbitrary range of dates.
//!
//! Every period is turned into a half-open window `[start, end)` of UTC
//! instants.

use serde::{Deserialize, Serialize};
use time::{
    Date, Duration, Month, OffsetDateTime, format_description::BorrowedFormatItem,
    macros::format_description,
};

use crate::Error;

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// A span of calendar days in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Period {
    /// A single day.
    Day(Date),
    /// Seven days starting on the given day.
    Week(Date),
    /// A calendar month.
    Month {
        /// The year the month is in.
        year: i32,
        /// The month.
        month: Month,
    },
    /// A calendar year.
    Year(i32),
    /// Every day from `from` to `to`, both inclusive. A missing bound leaves
    /// that side open.
    Between {
        /// The first day of the range.
        from: Option<Date>,
        /// The last day of the range.
        to: Option<Date>,
    },
}

/// The instants covered by a [Period]: `start` is inclusive, `end` is
/// exclusive and `None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    /// The first instant in the window.
    pub start: Option<OffsetDateTime>,
    /// The first instant after the window.
    pub end: Option<OffsetDateTime>,
}

impl Period {
    /// Get the window of instants covered by this period.
    ///
    /// # Errors
    /// Returns [Error::InvalidPeriod] if the period is empty (a range that
    /// ends before it starts) or lies outside the supported calendar.
    pub fn window(self) -> Result<TimeWindow, Error> {
        match self {
            Period::Day(day) => Ok(window_of_days(day, 1)),
            Period::Week(first_day) => Ok(window_of_days(first_day, 7)),
            Period::Month { year, month } => {
                let start = first_day(year, month)?;
                let end = match month {
                    Month::December => first_day(year + 1, Month::January).ok(),
                    month => first_day(year, month.next()).ok(),
                };

                Ok(TimeWindow {
                    start: Some(start_of_day(start)),
                    end: end.map(start_of_day),
                })
            }
            Period::Year(year) => {
                let start = first_day(year, Month::January)?;
                let end = first_day(year + 1, Month::January).ok();

                Ok(TimeWindow {
                    start: Some(start_of_day(start)),
                    end: end.map(start_of_day),
                })
            }
            Period::Between { from, to } => {
                if let (Some(from), Some(to)) = (from, to) {
                    if to < from {
                        return Err(Error::InvalidPeriod(format!(
                            "{to} is before {from}, the end of a range must not be before its start"
                        )));
                    }
                }

                Ok(TimeWindow {
                    start: from.map(start_of_day),
                    end: to.and_then(Date::next_day).map(start_of_day),
                })
            }
        }
    }
}

/// Parse a date in the format `YYYY-MM-DD`.
///
/// # Errors
/// Returns [Error::InvalidDate] if `text` is not a valid date in that format.
pub fn parse_date(text: &str) -> Result<Date, Error> {
    Date::parse(text.trim(), DATE_FORMAT).map_err(|_| Error::InvalidDate(text.to_owned()))
}

fn window_of_days(first_day: Date, days: i64) -> TimeWindow {
    TimeWindow {
        start: Some(start_of_day(first_day)),
        end: first_day.checked_add(Duration::days(days)).map(start_of_day),
    }
}

fn first_day(year: i32, month: Month) -> Result<Date, Error> {
    Date::from_calendar_date(year, month, 1)
        .map_err(|error| Error::InvalidPeriod(format!("{month} {year}: {error}")))
}

fn start_of_day(date: Date) -> OffsetDateTime {
    date.midnight().assume_utc()
}
