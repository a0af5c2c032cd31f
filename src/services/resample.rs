// src/services/resample.rs
use log::debug;

use crate::error::Result;
use crate::models::{Cadence, SeriesRow, TimeSeriesTable, Window};
use crate::services::calendar::period_ends;

/// Keeps rows whose date lies in `[window.start, window.end]`.
pub fn clip(table: &TimeSeriesTable, window: &Window) -> TimeSeriesTable {
    let rows = table
        .rows()
        .iter()
        .filter(|r| window.contains(r.date))
        .cloned()
        .collect();
    table.with_rows(rows)
}

/// Clip to `window` (if any), then reindex to `cadence` period ends with
/// forward-fill.
///
/// Each output label takes the last observation dated on or before it, so
/// when several rows share a period the latest one wins. Labels run from the
/// period holding the first observation to the period holding the last one,
/// which means no label ever precedes the data. With a window, labels after
/// `window.end` are dropped, so a trailing partial period is left out and a
/// second pass over the output returns it unchanged. `Cadence::None` only
/// clips and sorts.
pub fn resample(
    table: &TimeSeriesTable,
    cadence: Cadence,
    window: Option<&Window>,
) -> Result<TimeSeriesTable> {
    let mut source = match window {
        Some(w) => clip(table, w),
        None => table.clone(),
    };
    source.sort_by_date();

    if cadence == Cadence::None || source.is_empty() {
        return Ok(source);
    }

    let rows = source.rows();
    let first = rows[0].date;
    let last = rows[rows.len() - 1].date;
    let mut labels = period_ends(first, last, cadence);
    if let Some(w) = window {
        labels.retain(|label| *label <= w.end);
    }
    debug!(
        "Resampling {} rows ({} to {}) into {} {} periods",
        rows.len(),
        first,
        last,
        labels.len(),
        cadence
    );

    let mut out = Vec::with_capacity(labels.len());
    let mut cursor = 0;
    let mut carried: Option<&SeriesRow> = None;
    for label in labels {
        while cursor < rows.len() && rows[cursor].date <= label {
            carried = Some(&rows[cursor]);
            cursor += 1;
        }
        if let Some(row) = carried {
            out.push(SeriesRow::new(label, row.values.clone()));
        }
    }

    Ok(source.with_rows(out))
}

/// Same as [`resample`] but takes the cadence as a string selector.
pub fn resample_str(
    table: &TimeSeriesTable,
    cadence: &str,
    window: Option<&Window>,
) -> Result<TimeSeriesTable> {
    let cadence: Cadence = cadence.parse()?;
    resample(table, cadence, window)
}
