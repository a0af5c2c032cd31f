// src/services/investments.rs
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Result, SeriesError};
use crate::services::charts::{ChartSpec, Trace};

#[derive(Debug, Deserialize)]
struct Purchase {
    amount: f64,
    shares: f64,
}

#[derive(Debug, Deserialize)]
struct BuyHistory {
    date: BTreeMap<String, Purchase>,
}

#[derive(Debug, Deserialize)]
struct Holding {
    buy: BuyHistory,
}

/// One purchase of `shares` of `symbol` for `amount`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvestmentLot {
    pub symbol: String,
    pub date: String,
    pub amount: f64,
    pub shares: f64,
}

/// Parses `{symbol: {"buy": {"date": {date: {"amount", "shares"}}}}}`.
pub fn parse_investments(json: &str) -> Result<Vec<InvestmentLot>> {
    let holdings: BTreeMap<String, Holding> = serde_json::from_str(json)?;
    Ok(holdings
        .into_iter()
        .flat_map(|(symbol, holding)| {
            holding.buy.date.into_iter().map(move |(date, p)| InvestmentLot {
                symbol: symbol.clone(),
                date,
                amount: p.amount,
                shares: p.shares,
            })
        })
        .collect())
}

/// Reads `file_name` from `dir`. Only bare file names are accepted.
pub fn load_investments(dir: impl AsRef<Path>, file_name: &str) -> Result<Vec<InvestmentLot>> {
    if file_name.is_empty() || file_name.contains(['/', '\\']) || file_name.contains("..") {
        return Err(SeriesError::invalid_argument(format!(
            "investment file name '{}'",
            file_name
        )));
    }
    let path = dir.as_ref().join(file_name);
    info!("Loading investments from {}", path.display());
    let json = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => SeriesError::not_found(format!("file '{}'", path.display())),
        _ => SeriesError::from(e),
    })?;
    parse_investments(&json)
}

/// Grouped bars of purchase amount by date, one trace per symbol.
pub fn investment_chart(lots: &[InvestmentLot]) -> ChartSpec {
    let mut by_symbol: BTreeMap<&str, (Vec<String>, Vec<f64>)> = BTreeMap::new();
    for lot in lots {
        let entry = by_symbol.entry(lot.symbol.as_str()).or_default();
        entry.0.push(lot.date.clone());
        entry.1.push(lot.amount);
    }

    by_symbol.into_iter().fold(
        ChartSpec::new("Investment Amount by Symbol")
            .grouped()
            .axes("Date", "Amount")
            .size(600, 400),
        |chart, (symbol, (x, y))| {
            chart.with_trace(Trace::Bar {
                name: symbol.to_string(),
                x,
                y,
            })
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const PORTFOLIO: &str = r#"{
        "VWRL": {"buy": {"date": {
            "2023-01-05": {"amount": 500.0, "shares": 5.2},
            "2023-02-05": {"amount": 250.0, "shares": 2.5}
        }}},
        "AAPL": {"buy": {"date": {
            "2023-01-10": {"amount": 300, "shares": 2}
        }}}
    }"#;

    #[test]
    fn flattens_lots() {
        let lots = parse_investments(PORTFOLIO).unwrap();
        assert_eq!(lots.len(), 3);
        assert_eq!(lots[0].symbol, "AAPL");
        assert_eq!(lots[0].amount, 300.0);
        assert_eq!(lots[2].date, "2023-02-05");
    }

    #[test]
    fn chart_groups_by_symbol() {
        let chart = investment_chart(&parse_investments(PORTFOLIO).unwrap());
        assert_eq!(chart.data.len(), 2);
        assert_eq!(chart.layout.width, Some(600));
        match &chart.data[1] {
            Trace::Bar { name, x, y } => {
                assert_eq!(name, "VWRL");
                assert_eq!(x.len(), 2);
                assert_eq!(y, &vec![500.0, 250.0]);
            }
            other => panic!("unexpected trace {:?}", other),
        }
    }

    #[test]
    fn rejects_paths_and_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_investments(dir.path(), "../secrets.json"),
            Err(SeriesError::InvalidArgument(_))
        ));
        assert!(matches!(
            load_investments(dir.path(), "absent.json"),
            Err(SeriesError::NotFound(_))
        ));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(parse_investments("{\"X\": 1}"), Err(SeriesError::Parse(_))));
    }
}
