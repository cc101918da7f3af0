//! Date predicates over transaction sequences.
//!
//! All filters borrow their input, preserve input order and return an
//! empty vector when nothing matches. They accept any iterator of
//! `&Transaction`, so the output of one filter can be fed to another.

use crate::types::{DateWindow, Datasets, Transaction, YearMonth};
use chrono::NaiveDate;
use std::collections::BTreeSet;
use tracing::debug;

/// Records with `window.start <= date <= window.end`.
pub fn filter_by_range<'a, I>(records: I, window: DateWindow) -> Vec<&'a Transaction>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    if window.is_empty() {
        debug!(%window, "empty date window");
        return Vec::new();
    }
    records.into_iter().filter(|r| window.contains(r.date)).collect()
}

/// Records dated anywhere in `month`, first and last day included.
pub fn filter_by_month<'a, I>(records: I, month: YearMonth) -> Vec<&'a Transaction>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    filter_by_range(records, DateWindow::new(month.first_day(), month.last_day()))
}

/// Records dated on or after `start`, with no upper bound.
pub fn filter_since<'a, I>(records: I, start: NaiveDate) -> Vec<&'a Transaction>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    records.into_iter().filter(|r| r.date >= start).collect()
}

/// Distinct months present in either dataset, oldest first.
pub fn available_months(data: &Datasets) -> Vec<YearMonth> {
    let months: BTreeSet<YearMonth> = data
        .services
        .records
        .iter()
        .chain(&data.products.records)
        .map(|r| YearMonth::of(r.date))
        .collect();
    months.into_iter().collect()
}
