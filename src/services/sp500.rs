// src/services/sp500.rs
use log::{debug, info};
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use serde::Serialize;
use std::collections::HashMap;

use crate::error::{Result, SeriesError};
use crate::services::charts::{pie_chart, ChartSpec};

pub const SP500_WIKI_URL: &str = "https://en.wikipedia.org/wiki/List_of_S%26P_500_companies";
pub const SECTOR_COLUMN: &str = "GICS Sector";

/// Header names plus string cells, one row per company.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrapedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ScrapedTable {
    pub fn column(&self, name: &str) -> Result<Vec<&str>> {
        let idx = self
            .headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| SeriesError::not_found(format!("column '{}' in scraped table", name)))?;
        self.rows
            .iter()
            .enumerate()
            .map(|(i, r)| {
                r.get(idx).map(String::as_str).ok_or_else(|| {
                    SeriesError::parse(format!("row {} has no '{}' cell", i, name))
                })
            })
            .collect()
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| SeriesError::parse(format!("selector '{}': {:?}", css, e)))
}

fn clean_cell(footnote: &Regex, text: &str) -> String {
    footnote.replace_all(text, "").trim().to_string()
}

/// Extracts the first `wikitable sortable` table. Rows with fewer cells than
/// headers are skipped.
pub fn parse_constituents(html: &str) -> Result<ScrapedTable> {
    let document = Html::parse_document(html);
    let table_selector = selector("table.wikitable.sortable")?;
    let th_selector = selector("th")?;
    let tr_selector = selector("tr")?;
    let td_selector = selector("td")?;
    let footnote = Regex::new(r"\[\d+\]").map_err(|e| SeriesError::parse(e.to_string()))?;

    let table = document
        .select(&table_selector)
        .next()
        .ok_or_else(|| SeriesError::not_found("no 'wikitable sortable' table on page"))?;

    let headers: Vec<String> = table
        .select(&th_selector)
        .map(|th| clean_cell(&footnote, &th.text().collect::<String>()))
        .collect();

    let mut rows = Vec::new();
    for tr in table.select(&tr_selector).skip(1) {
        let cells: Vec<String> = tr
            .select(&td_selector)
            .map(|td| clean_cell(&footnote, &td.text().collect::<String>()))
            .collect();
        if cells.len() >= headers.len() {
            rows.push(cells.into_iter().take(headers.len()).collect());
        } else {
            debug!("Skipping row with {} cells, expected {}", cells.len(), headers.len());
        }
    }

    Ok(ScrapedTable { headers, rows })
}

/// Companies per sector, most common first, ties by name.
pub fn sector_counts(table: &ScrapedTable) -> Result<Vec<(String, f64)>> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for sector in table.column(SECTOR_COLUMN)? {
        *counts.entry(sector).or_insert(0) += 1;
    }
    let mut counts: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(sector, n)| (sector.to_string(), n))
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    Ok(counts.into_iter().map(|(sector, n)| (sector, n as f64)).collect())
}

pub fn sector_pie(table: &ScrapedTable) -> Result<ChartSpec> {
    Ok(pie_chart("Distribution of Sectors", &sector_counts(table)?))
}

pub async fn fetch_sp500_constituents(client: &Client) -> Result<ScrapedTable> {
    info!("Fetching S&P 500 constituents from {}", SP500_WIKI_URL);
    let html = client
        .get(SP500_WIKI_URL)
        .header("User-Agent", "Mozilla/5.0")
        .send()
        .await?
        .text()
        .await?;

    let table = parse_constituents(&html)?;
    info!("Scraped {} constituents", table.rows.len());
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
<html><body>
<table class="wikitable sortable" id="constituents">
<tbody>
<tr><th>Symbol</th><th>Security</th><th>GICS Sector</th></tr>
<tr><td><a href="/x">MMM</a></td><td>3M</td><td>Industrials</td></tr>
<tr><td>AOS</td><td>A. O. Smith</td><td>Industrials[4]</td></tr>
<tr><td>ABT</td><td>Abbott</td><td>Health Care</td></tr>
<tr><td>broken</td></tr>
</tbody>
</table>
<table class="wikitable sortable"><tr><th>Other</th></tr></table>
</body></html>
"#;

    #[test]
    fn scrapes_first_sortable_table() {
        let table = parse_constituents(PAGE).unwrap();
        assert_eq!(table.headers, vec!["Symbol", "Security", "GICS Sector"]);
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.column("Symbol").unwrap(), vec!["MMM", "AOS", "ABT"]);
        assert_eq!(table.rows[1][2], "Industrials");
    }

    #[test]
    fn short_row_is_an_error_not_a_panic() {
        let table = ScrapedTable {
            headers: vec!["Symbol".to_string(), "GICS Sector".to_string()],
            rows: vec![
                vec!["MMM".to_string(), "Industrials".to_string()],
                vec!["AOS".to_string()],
            ],
        };
        assert_eq!(table.column("Symbol").unwrap(), vec!["MMM", "AOS"]);
        let err = table.column("GICS Sector").unwrap_err();
        assert!(matches!(err, SeriesError::Parse(_)));
    }

    #[test]
    fn counts_sectors_descending() {
        let table = parse_constituents(PAGE).unwrap();
        let counts = sector_counts(&table).unwrap();
        assert_eq!(
            counts,
            vec![("Industrials".to_string(), 2.0), ("Health Care".to_string(), 1.0)]
        );
    }

    #[test]
    fn missing_table_or_column_is_not_found() {
        let err = parse_constituents("<html><body><p>nothing</p></body></html>").unwrap_err();
        assert!(matches!(err, SeriesError::NotFound(_)));

        let table = ScrapedTable { headers: vec!["Symbol".into()], rows: vec![] };
        assert!(matches!(sector_counts(&table), Err(SeriesError::NotFound(_))));
    }
}
