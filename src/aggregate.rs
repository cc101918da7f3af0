//! Group-and-sum / group-and-count over filtered transactions.
//!
//! Results are `BTreeMap`s so that iteration order, and with it every tie
//! decision, is stable from run to run.

use crate::filter::filter_since;
use crate::types::{Datasets, Source, Transaction, YearMonth};
use chrono::{Datelike, Days, NaiveDate};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::ops::AddAssign;

/// Sum `value` per `key`. Keys that never occur are absent, not zero.
pub fn sum_by<I, K, T, FK, FV>(records: I, key: FK, value: FV) -> BTreeMap<K, T>
where
    I: IntoIterator,
    K: Ord,
    T: AddAssign + Default,
    FK: Fn(&I::Item) -> K,
    FV: Fn(&I::Item) -> T,
{
    let mut totals = BTreeMap::new();
    for item in records {
        *totals.entry(key(&item)).or_insert_with(T::default) += value(&item);
    }
    totals
}

/// Number of items per `key`.
pub fn count_by<I, K, FK>(records: I, key: FK) -> BTreeMap<K, usize>
where
    I: IntoIterator,
    K: Ord,
    FK: Fn(&I::Item) -> K,
{
    sum_by(records, key, |_| 1usize)
}

/// Total of `value` over all items; the default (zero) for empty input.
pub fn scalar_sum<I, T, FV>(records: I, value: FV) -> T
where
    I: IntoIterator,
    T: AddAssign + Default,
    FV: Fn(&I::Item) -> T,
{
    let mut total = T::default();
    for item in records {
        total += value(&item);
    }
    total
}

pub fn revenue_by_category<'a, I>(records: I) -> BTreeMap<String, Decimal>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    sum_by(records, |r| r.category.clone(), |r| r.revenue)
}

/// Units sold per product. Rows without a quantity count as zero units.
pub fn quantity_by_category<'a, I>(records: I) -> BTreeMap<String, i64>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    sum_by(records, |r| r.category.clone(), |r| r.quantity.unwrap_or(0))
}

pub fn counts_by_category<'a, I>(records: I) -> BTreeMap<String, usize>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    count_by(records, |r| r.category.clone())
}

pub fn total_revenue<'a, I>(records: I) -> Decimal
where
    I: IntoIterator<Item = &'a Transaction>,
{
    scalar_sum(records, |r| r.revenue)
}

/// Category with the highest count. Ties go to the alphabetically first name.
pub fn most_popular(counts: &BTreeMap<String, usize>) -> Option<&str> {
    pick(counts, |candidate, best| candidate > best)
}

/// Category with the lowest count. Ties go to the alphabetically first name.
pub fn least_popular(counts: &BTreeMap<String, usize>) -> Option<&str> {
    pick(counts, |candidate, best| candidate < best)
}

// Keys arrive in ascending order, so keeping the incumbent on equality makes
// the alphabetically first category win a tie.
fn pick(counts: &BTreeMap<String, usize>, beats: impl Fn(usize, usize) -> bool) -> Option<&str> {
    let mut best: Option<(&str, usize)> = None;
    for (name, &count) in counts {
        match best {
            Some((_, best_count)) if !beats(count, best_count) => {}
            _ => best = Some((name.as_str(), count)),
        }
    }
    best.map(|(name, _)| name)
}

/// Counts ordered for a popularity bar chart: highest first, then by name.
pub fn ranked_counts(counts: &BTreeMap<String, usize>) -> Vec<(&str, usize)> {
    let mut ranked: Vec<(&str, usize)> = counts.iter().map(|(k, &v)| (k.as_str(), v)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
}

/// January 1st of the year containing `today`.
pub fn year_start(today: NaiveDate) -> NaiveDate {
    today - Days::new(u64::from(today.ordinal0()))
}

/// Revenue dated on or after January 1st of `today`'s year.
pub fn year_to_date_revenue<'a, I>(records: I, today: NaiveDate) -> Decimal
where
    I: IntoIterator<Item = &'a Transaction>,
{
    total_revenue(filter_since(records, year_start(today)))
}

/// Every record of both datasets, tagged with the dataset it came from.
pub fn tag_sources(data: &Datasets) -> impl Iterator<Item = (Source, &Transaction)> {
    Source::ALL
        .into_iter()
        .flat_map(move |source| data.get(source).records.iter().map(move |r| (source, r)))
}

pub fn monthly_revenue_by_source(data: &Datasets) -> BTreeMap<(YearMonth, Source), Decimal> {
    sum_by(tag_sources(data), |&(source, r)| (YearMonth::of(r.date), source), |(_, r)| r.revenue)
}

pub fn monthly_revenue_combined(data: &Datasets) -> BTreeMap<YearMonth, Decimal> {
    sum_by(tag_sources(data), |(_, r)| YearMonth::of(r.date), |(_, r)| r.revenue)
}
