// src/services/gap_fill.rs
use chrono::{Datelike, NaiveDate};
use log::warn;
use std::collections::{BTreeMap, BTreeSet};

use crate::models::{SeriesRow, TimeSeriesTable, Window};
use crate::services::calendar::year_ends_between;

/// Value written into every column of a synthesized year. It is a historical
/// default, not an observation.
pub const PLACEHOLDER_RATE: f64 = 0.5;

/// Years of `window` (by Dec 31) that have no row in `table`.
pub fn missing_years(table: &TimeSeriesTable, window: &Window) -> Vec<i32> {
    let present: BTreeSet<i32> = table.rows().iter().map(|r| r.date.year()).collect();
    year_ends_between(window.start, window.end)
        .into_iter()
        .filter(|year| !present.contains(year))
        .collect()
}

/// Adds a Jan 1 placeholder row for every gap year in `window` and returns
/// the merged table sorted by date. A real observation is never replaced by
/// a placeholder.
pub fn fill_missing_years(table: &TimeSeriesTable, window: &Window) -> TimeSeriesTable {
    let gaps = missing_years(table, window);
    if gaps.is_empty() {
        let mut out = table.clone();
        out.sort_by_date();
        return out;
    }

    warn!(
        "No observations for years {:?}; inserting placeholder rate {} (not sourced data)",
        gaps, PLACEHOLDER_RATE
    );

    let width = table.columns().len();
    let mut merged: BTreeMap<NaiveDate, SeriesRow> = BTreeMap::new();
    for row in table.rows() {
        merged.entry(row.date).or_insert_with(|| row.clone());
    }
    for year in gaps {
        if let Some(jan_first) = NaiveDate::from_ymd_opt(year, 1, 1) {
            merged
                .entry(jan_first)
                .or_insert_with(|| SeriesRow::new(jan_first, vec![PLACEHOLDER_RATE; width]));
        }
    }

    table.with_rows(merged.into_values().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn rates(rows: &[(NaiveDate, f64)]) -> TimeSeriesTable {
        TimeSeriesTable::from_rows(
            vec!["Rate".to_string()],
            rows.iter().map(|(date, v)| SeriesRow::new(*date, vec![*v])).collect(),
        )
        .unwrap()
    }

    #[test]
    fn fills_each_gap_year_once() {
        let table = rates(&[(d(2001, 8, 2), 5.25)]);
        let window = Window::new(d(2000, 1, 1), d(2003, 12, 31)).unwrap();

        let out = fill_missing_years(&table, &window);

        assert_eq!(
            out.dates(),
            vec![d(2000, 1, 1), d(2001, 8, 2), d(2002, 1, 1), d(2003, 1, 1)]
        );
        assert_eq!(out.column("Rate").unwrap(), vec![0.5, 5.25, 0.5, 0.5]);
    }

    #[test]
    fn no_gaps_only_sorts() {
        let table = rates(&[(d(2002, 3, 1), 4.0), (d(2001, 3, 1), 3.0)]);
        let window = Window::new(d(2001, 1, 1), d(2002, 12, 31)).unwrap();
        let out = fill_missing_years(&table, &window);
        assert_eq!(out.dates(), vec![d(2001, 3, 1), d(2002, 3, 1)]);
    }

    #[test]
    fn placeholder_fills_every_column() {
        let table = TimeSeriesTable::from_rows(vec!["a".into(), "b".into()], Vec::new()).unwrap();
        let window = Window::new(d(2010, 1, 1), d(2010, 12, 31)).unwrap();
        let out = fill_missing_years(&table, &window);
        assert_eq!(out.rows(), &[SeriesRow::new(d(2010, 1, 1), vec![0.5, 0.5])]);
    }

    #[test]
    fn real_jan_first_observation_is_kept() {
        let table = rates(&[(d(2005, 1, 1), 4.75)]);
        let window = Window::new(d(2004, 1, 1), d(2005, 12, 31)).unwrap();
        let out = fill_missing_years(&table, &window);
        assert_eq!(out.dates(), vec![d(2004, 1, 1), d(2005, 1, 1)]);
        assert_eq!(out.column("Rate").unwrap(), vec![0.5, 4.75]);
    }
}
