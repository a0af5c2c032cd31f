// src/services/loader.rs
use chrono::{Datelike, NaiveDate};
use csv::{ReaderBuilder, Writer};
use log::{debug, info};
use std::collections::HashSet;
use std::path::Path;

use crate::error::{Result, SeriesError};
use crate::models::{Cadence, SeriesRow, TimeSeriesTable, Window};
use crate::services::gap_fill::fill_missing_years;
use crate::services::resample::resample;

/// CPIH export: `"2001 Jan"`.
pub const CPIH_DATE_COLUMN: &str = "date";
pub const CPIH_DATE_FORMAT: &str = "%Y %b";

/// BoE official bank rate history: `"03 Aug 23"`.
pub const BOE_DATE_COLUMN: &str = "Date Changed";
pub const BOE_DATE_FORMAT: &str = "%d %b %y";
pub const BOE_RATE_COLUMN: &str = "Rate";

fn has_day_field(format: &str) -> bool {
    ["%d", "%e", "%j", "%F", "%D", "%x"]
        .iter()
        .any(|spec| format.contains(spec))
}

/// Two-digit years at or above this value belong to the 1900s (69 -> 1969).
const TWO_DIGIT_YEAR_PIVOT: i32 = 69;

/// Parses `raw` with a strftime-style `format`. Month-resolution formats
/// (no day field) resolve to the first of the month, and `%y` years follow
/// the strptime pivot: 69-99 are 19xx, 00-68 are 20xx.
pub fn parse_date(raw: &str, format: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    let parsed = if has_day_field(format) {
        NaiveDate::parse_from_str(raw, format)
    } else {
        NaiveDate::parse_from_str(&format!("{} 1", raw), &format!("{} %d", format))
    };
    let date = parsed.map_err(|e| {
        SeriesError::parse(format!("date '{}' does not match '{}': {}", raw, format, e))
    })?;
    if format.contains("%y") && date.year() >= TWO_DIGIT_YEAR_PIVOT + 2000 {
        return date.with_year(date.year() - 100).ok_or_else(|| {
            SeriesError::parse(format!("date '{}' has no counterpart a century earlier", raw))
        });
    }
    Ok(date)
}

/// Parses a numeric cell; blank cells are missing values.
pub fn parse_value(raw: &str, column: &str) -> Result<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(f64::NAN);
    }
    trimmed.parse::<f64>().map_err(|e| {
        SeriesError::parse(format!("value '{}' in column '{}': {}", trimmed, column, e))
    })
}

/// Reads CSV text whose `date_column` is parsed with `date_format`; every
/// other column becomes a numeric value column. Row order is preserved.
pub fn parse_dated_csv<R: std::io::Read>(
    reader: R,
    date_column: &str,
    date_format: &str,
) -> Result<TimeSeriesTable> {
    let mut rdr = ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers = rdr.headers()?.clone();
    let date_idx = headers
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}') == date_column)
        .ok_or_else(|| SeriesError::not_found(format!("no '{}' column in CSV", date_column)))?;

    let value_columns: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != date_idx)
        .map(|(idx, name)| (idx, name.to_string()))
        .collect();

    let mut table = TimeSeriesTable::new(value_columns.iter().map(|(_, n)| n.clone()).collect());
    let mut seen = HashSet::new();

    for record in rdr.records() {
        let record = record?;
        let raw_date = record
            .get(date_idx)
            .ok_or_else(|| SeriesError::parse("row is missing its date field"))?;
        let date = parse_date(raw_date, date_format)?;
        if !seen.insert(date) {
            return Err(SeriesError::parse(format!("duplicate date {}", date)));
        }

        let values = value_columns
            .iter()
            .map(|(idx, name)| parse_value(record.get(*idx).unwrap_or(""), name))
            .collect::<Result<Vec<f64>>>()?;
        table.push_row(SeriesRow::new(date, values));
    }

    Ok(table)
}

/// Loads a dated CSV from disk. Missing paths fail with `NotFound`.
pub fn load_dated_csv(
    path: impl AsRef<Path>,
    date_column: &str,
    date_format: &str,
) -> Result<TimeSeriesTable> {
    let path = path.as_ref();
    info!("Loading series from {}", path.display());
    let file = std::fs::File::open(path)
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                SeriesError::not_found(format!("file '{}'", path.display()))
            }
            _ => SeriesError::from(e),
        })?;
    let table = parse_dated_csv(file, date_column, date_format)?;
    debug!("Loaded {} rows with columns {:?}", table.len(), table.columns());
    Ok(table)
}

/// Writes a table in the same layout the loader reads.
pub fn write_csv(
    table: &TimeSeriesTable,
    path: impl AsRef<Path>,
    date_column: &str,
    date_format: &str,
) -> Result<()> {
    let mut wtr = Writer::from_path(path.as_ref())?;

    let mut header = vec![date_column.to_string()];
    header.extend(table.columns().iter().cloned());
    wtr.write_record(&header)?;

    for row in table.rows() {
        let mut record = vec![row.date.format(date_format).to_string()];
        record.extend(row.values.iter().map(|v| {
            if v.is_nan() {
                String::new()
            } else {
                v.to_string()
            }
        }));
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn load_cpih_csv(path: impl AsRef<Path>) -> Result<TimeSeriesTable> {
    load_dated_csv(path, CPIH_DATE_COLUMN, CPIH_DATE_FORMAT)
}

/// Loads the policy-rate change history sorted ascending.
pub fn load_boe_rate_csv(path: impl AsRef<Path>) -> Result<TimeSeriesTable> {
    let mut table = load_dated_csv(path, BOE_DATE_COLUMN, BOE_DATE_FORMAT)?;
    table.column_index(BOE_RATE_COLUMN)?;
    table.sort_by_date();
    Ok(table)
}

/// CPIH index: load, clip to `window`, forward-fill to `cadence`.
pub fn cpih_series(
    path: impl AsRef<Path>,
    cadence: Cadence,
    window: Option<&Window>,
) -> Result<TimeSeriesTable> {
    let table = load_cpih_csv(path)?;
    resample(&table, cadence, window)
}

/// Policy rate: load, clip, forward-fill, then give every year of the window
/// at least one row.
pub fn boe_rate_series(
    path: impl AsRef<Path>,
    cadence: Cadence,
    window: Option<&Window>,
) -> Result<TimeSeriesTable> {
    let table = load_boe_rate_csv(path)?;
    let resampled = resample(&table, cadence, window)?;
    Ok(match window {
        Some(w) => fill_missing_years(&resampled, w),
        None => resampled,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn month_resolution_dates_land_on_the_first() {
        assert_eq!(parse_date("2001 Jan", CPIH_DATE_FORMAT).unwrap(), d(2001, 1, 1));
        assert_eq!(parse_date("03 Aug 23", BOE_DATE_FORMAT).unwrap(), d(2023, 8, 3));
        assert_eq!(parse_date("05 Mar 09", BOE_DATE_FORMAT).unwrap(), d(2009, 3, 5));
        assert_eq!(parse_date("05 Mar 97", BOE_DATE_FORMAT).unwrap(), d(1997, 3, 5));
    }

    #[test]
    fn two_digit_years_pivot_at_69() {
        assert_eq!(parse_date("27 Feb 69", BOE_DATE_FORMAT).unwrap(), d(1969, 2, 27));
        assert_eq!(parse_date("31 Dec 68", BOE_DATE_FORMAT).unwrap(), d(2068, 12, 31));
        assert_eq!(parse_date("1969 Feb", CPIH_DATE_FORMAT).unwrap(), d(1969, 2, 1));
        assert_eq!(parse_date("2075 Jan", CPIH_DATE_FORMAT).unwrap(), d(2075, 1, 1));
    }

    #[test]
    fn bad_date_is_a_parse_error() {
        let csv = "date,CPIH\n2001-01-01,72.1\n";
        let err = parse_dated_csv(csv.as_bytes(), CPIH_DATE_COLUMN, CPIH_DATE_FORMAT).unwrap_err();
        assert!(matches!(err, SeriesError::Parse(_)));
    }

    #[test]
    fn bad_number_is_a_parse_error() {
        let csv = "date,CPIH\n2001 Jan,abc\n";
        let err = parse_dated_csv(csv.as_bytes(), CPIH_DATE_COLUMN, CPIH_DATE_FORMAT).unwrap_err();
        assert!(matches!(err, SeriesError::Parse(_)));
    }

    #[test]
    fn duplicate_dates_are_rejected() {
        let csv = "date,CPIH\n2001 Jan,1\n2001 Jan,2\n";
        let err = parse_dated_csv(csv.as_bytes(), CPIH_DATE_COLUMN, CPIH_DATE_FORMAT).unwrap_err();
        assert!(matches!(err, SeriesError::Parse(_)));
    }

    #[test]
    fn missing_date_column_is_not_found() {
        let csv = "when,CPIH\n2001 Jan,1\n";
        let err = parse_dated_csv(csv.as_bytes(), CPIH_DATE_COLUMN, CPIH_DATE_FORMAT).unwrap_err();
        assert!(matches!(err, SeriesError::NotFound(_)));
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load_cpih_csv("/definitely/not/here/cpih.csv").unwrap_err();
        assert!(matches!(err, SeriesError::NotFound(_)));
    }

    #[test]
    fn blank_cells_become_nan() {
        let csv = "date,CPIH,CPI\n2001 Jan,72.1,\n";
        let table = parse_dated_csv(csv.as_bytes(), CPIH_DATE_COLUMN, CPIH_DATE_FORMAT).unwrap();
        assert_eq!(table.columns(), &["CPIH".to_string(), "CPI".to_string()]);
        assert_eq!(table.rows()[0].values[0], 72.1);
        assert!(table.rows()[0].values[1].is_nan());
    }

    #[test]
    fn boe_rates_come_back_sorted() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Date Changed,Rate\n03 Aug 23,5.25\n22 Jun 23,5\n11 May 23,4.5\n").unwrap();

        let table = load_boe_rate_csv(file.path()).unwrap();
        assert_eq!(table.dates(), vec![d(2023, 5, 11), d(2023, 6, 22), d(2023, 8, 3)]);
        assert_eq!(table.column("Rate").unwrap(), vec![4.5, 5.0, 5.25]);
    }

    #[test]
    fn boe_file_without_rate_column_is_not_found() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Date Changed,Level\n03 Aug 23,5.25\n").unwrap();
        let err = load_boe_rate_csv(file.path()).unwrap_err();
        assert!(matches!(err, SeriesError::NotFound(_)));
    }
}
