// src/services/boe.rs
use log::{error, info};
use reqwest::Client;

use crate::error::{Result, SeriesError};
use crate::models::{TimeSeriesTable, Window};
use crate::services::loader::parse_dated_csv;

const IADB_URL: &str = "http://www.bankofengland.co.uk/boeapps/iadb/fromshowcolumns.asp?csv.x=yes";

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) \
AppleWebKit/537.36 (KHTML, like Gecko) \
Chrome/54.0.2840.90 \
Safari/537.36";

/// Quoted household mortgage rates (2y/3y/5y fixed, standard variable).
pub const DEFAULT_MORTGAGE_SERIES: [&str; 4] = ["IUMBV34", "IUMBV37", "IUMBV42", "IUMBV45"];

pub const IADB_DATE_COLUMN: &str = "DATE";
pub const IADB_DATE_FORMAT: &str = "%d %b %Y";

/// Query string for the IADB CSV export.
pub fn iadb_query(window: &Window, series_codes: &[String]) -> Vec<(&'static str, String)> {
    vec![
        ("Datefrom", window.start.format("%d/%b/%Y").to_string()),
        ("Dateto", window.end.format("%d/%b/%Y").to_string()),
        ("SeriesCodes", series_codes.join(",")),
        ("CSVF", "TN".to_string()),
        ("UsingCodes", "Y".to_string()),
        ("VPD", "Y".to_string()),
        ("VFD", "N".to_string()),
    ]
}

/// Parses an IADB CSV body: a `DATE` column plus one column per series code.
pub fn parse_mortgage_csv(body: &str) -> Result<TimeSeriesTable> {
    let mut table = parse_dated_csv(body.as_bytes(), IADB_DATE_COLUMN, IADB_DATE_FORMAT)?;
    table.sort_by_date();
    Ok(table)
}

/// Fetch monthly mortgage rates for `series_codes` over `window`.
pub async fn fetch_mortgage_rates(
    client: &Client,
    window: &Window,
    series_codes: &[String],
) -> Result<TimeSeriesTable> {
    if series_codes.is_empty() {
        return Err(SeriesError::invalid_argument("no IADB series codes requested"));
    }
    info!(
        "Fetching IADB series {:?} from {} to {}",
        series_codes, window.start, window.end
    );

    let response = client
        .get(IADB_URL)
        .query(&iadb_query(window, series_codes))
        .header("User-Agent", BROWSER_USER_AGENT)
        .send()
        .await?;

    let status = response.status();
    info!("IADB responded with status {}", status);
    if !status.is_success() {
        error!("IADB request failed with status {}", status);
        return Err(SeriesError::upstream(format!("IADB returned status {}", status)));
    }

    let body = response.text().await?;
    let table = parse_mortgage_csv(&body)?;
    info!("Parsed {} mortgage rate rows", table.len());
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const SAMPLE: &str = "\
DATE,IUMBV34,IUMBV37,IUMBV42,IUMBV45
29 Feb 2000,6.34,6.6,6.71,7.74
31 Jan 2000,6.23,6.52,6.64,7.49
31 Mar 2000,6.42,6.62,6.7,7.99
";

    #[test]
    fn parses_iadb_csv_sorted() {
        let table = parse_mortgage_csv(SAMPLE).unwrap();
        assert_eq!(table.columns().len(), 4);
        assert_eq!(table.dates()[0], NaiveDate::from_ymd_opt(2000, 1, 31).unwrap());
        assert_eq!(table.column("IUMBV45").unwrap(), vec![7.49, 7.74, 7.99]);
    }

    #[test]
    fn query_uses_iadb_date_style() {
        let window = Window::new(
            NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2018, 10, 1).unwrap(),
        )
        .unwrap();
        let codes: Vec<String> = DEFAULT_MORTGAGE_SERIES.iter().map(|s| s.to_string()).collect();
        let query = iadb_query(&window, &codes);

        assert_eq!(query[0], ("Datefrom", "01/Jan/2000".to_string()));
        assert_eq!(query[1], ("Dateto", "01/Oct/2018".to_string()));
        assert_eq!(query[2], ("SeriesCodes", "IUMBV34,IUMBV37,IUMBV42,IUMBV45".to_string()));
    }
}
