// src/services/stocks.rs
use chrono::{NaiveDate, NaiveDateTime};
use log::{info, warn};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

use crate::error::{Result, SeriesError};
use crate::services::charts::{ChartSpec, Trace};

const ALPHA_VANTAGE_URL: &str = "https://www.alphavantage.co/query";

/// Which Alpha Vantage time series to request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockFunction {
    Daily,
    Intraday { interval: String },
}

impl StockFunction {
    pub fn api_name(&self) -> &'static str {
        match self {
            StockFunction::Daily => "TIME_SERIES_DAILY",
            StockFunction::Intraday { .. } => "TIME_SERIES_INTRADAY",
        }
    }

    /// Key of the time-series object in the response payload.
    pub fn series_key(&self) -> String {
        match self {
            StockFunction::Daily => "Time Series (Daily)".to_string(),
            StockFunction::Intraday { interval } => format!("Time Series ({})", interval),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputSize {
    Compact,
    #[default]
    Full,
}

impl OutputSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputSize::Compact => "compact",
            OutputSize::Full => "full",
        }
    }
}

/// A batch request for one or more symbols. Either bound may be omitted.
#[derive(Debug, Clone)]
pub struct StockQuery {
    pub symbols: Vec<String>,
    pub function: StockFunction,
    pub output_size: OutputSize,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub api_key: String,
}

impl StockQuery {
    pub fn daily(symbols: Vec<String>, api_key: impl Into<String>) -> Self {
        StockQuery {
            symbols,
            function: StockFunction::Daily,
            output_size: OutputSize::Full,
            start: None,
            end: None,
            api_key: api_key.into(),
        }
    }

    pub fn params<'a>(&'a self, symbol: &'a str) -> Vec<(&'static str, &'a str)> {
        let mut params = vec![
            ("function", self.function.api_name()),
            ("symbol", symbol),
            ("outputsize", self.output_size.as_str()),
            ("apikey", self.api_key.as_str()),
            ("datatype", "json"),
        ];
        if let StockFunction::Intraday { interval } = &self.function {
            params.push(("interval", interval.as_str()));
        }
        params
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adjusted_close: Option<f64>,
    pub volume: f64,
}

impl Bar {
    /// Adjusted close when the feed provides it, plain close otherwise.
    pub fn price(&self) -> f64 {
        self.adjusted_close.unwrap_or(self.close)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolSeries {
    pub symbol: String,
    pub metadata: BTreeMap<String, String>,
    pub bars: Vec<Bar>,
}

fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Ok(ts);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| SeriesError::parse(format!("timestamp '{}'", raw)))
}

fn field(fields: &Value, keys: &[&str], timestamp: &str) -> Result<Option<f64>> {
    for key in keys {
        if let Some(raw) = fields.get(*key) {
            let parsed = match raw {
                Value::String(s) => s.trim().parse::<f64>().ok(),
                Value::Number(n) => n.as_f64(),
                _ => None,
            };
            return parsed.map(Some).ok_or_else(|| {
                SeriesError::parse(format!("field '{}' at {} is not numeric: {}", key, timestamp, raw))
            });
        }
    }
    Ok(None)
}

fn required(fields: &Value, key: &str, timestamp: &str) -> Result<f64> {
    field(fields, &[key], timestamp)?
        .ok_or_else(|| SeriesError::not_found(format!("field '{}' at {}", key, timestamp)))
}

/// Parses one symbol's payload. `Ok(None)` when the payload carries no
/// `Meta Data` (unknown symbol or a throttling notice).
pub fn parse_payload(
    symbol: &str,
    payload: &Value,
    function: &StockFunction,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<Option<SymbolSeries>> {
    let Some(meta) = payload.get("Meta Data").and_then(Value::as_object) else {
        return Ok(None);
    };
    let metadata = meta
        .iter()
        .map(|(k, v)| {
            let text = v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string());
            (k.clone(), text)
        })
        .collect();

    let key = function.series_key();
    let series = payload
        .get(&key)
        .and_then(Value::as_object)
        .ok_or_else(|| SeriesError::not_found(format!("'{}' in payload for {}", key, symbol)))?;

    let mut bars = Vec::with_capacity(series.len());
    for (raw_ts, fields) in series {
        let timestamp = parse_timestamp(raw_ts)?;
        let day = timestamp.date();
        if start.map_or(false, |s| day < s) || end.map_or(false, |e| day > e) {
            continue;
        }
        bars.push(Bar {
            timestamp,
            open: required(fields, "1. open", raw_ts)?,
            high: required(fields, "2. high", raw_ts)?,
            low: required(fields, "3. low", raw_ts)?,
            close: required(fields, "4. close", raw_ts)?,
            adjusted_close: field(fields, &["5. adjusted close"], raw_ts)?,
            volume: field(fields, &["6. volume", "5. volume"], raw_ts)?.unwrap_or(0.0),
        });
    }
    bars.sort_by_key(|b| b.timestamp);

    Ok(Some(SymbolSeries {
        symbol: symbol.to_string(),
        metadata,
        bars,
    }))
}

/// Fetches every symbol in turn. Symbols without data are logged and
/// skipped; an empty result is an error.
pub async fn fetch_stock_series(client: &Client, query: &StockQuery) -> Result<Vec<SymbolSeries>> {
    let mut out = Vec::new();
    for symbol in &query.symbols {
        info!("Fetching {} for {}", query.function.api_name(), symbol);
        let payload: Value = client
            .get(ALPHA_VANTAGE_URL)
            .query(&query.params(symbol))
            .send()
            .await?
            .json()
            .await?;

        match parse_payload(symbol, &payload, &query.function, query.start, query.end)? {
            Some(series) => {
                info!("Received {} bars for {}", series.bars.len(), symbol);
                out.push(series);
            }
            None => warn!("No data available for symbol: {}", symbol),
        }
    }

    if out.is_empty() {
        return Err(SeriesError::not_found(format!(
            "no data for any of {:?}",
            query.symbols
        )));
    }
    Ok(out)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub symbols: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

fn pearson(pairs: &[(f64, f64)]) -> f64 {
    if pairs.len() < 2 {
        return f64::NAN;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in pairs {
        cov += (x - mean_x) * (y - mean_y);
        var_x += (x - mean_x).powi(2);
        var_y += (y - mean_y).powi(2);
    }
    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    cov / (var_x.sqrt() * var_y.sqrt())
}

/// Pearson correlation of prices, pivoted by timestamp. Each pair uses the
/// timestamps both symbols have.
pub fn correlation_matrix(series: &[SymbolSeries]) -> CorrelationMatrix {
    let lookups: Vec<HashMap<NaiveDateTime, f64>> = series
        .iter()
        .map(|s| s.bars.iter().map(|b| (b.timestamp, b.price())).collect())
        .collect();

    let n = series.len();
    let mut values = vec![vec![f64::NAN; n]; n];
    for i in 0..n {
        for j in i..n {
            let pairs: Vec<(f64, f64)> = series[i]
                .bars
                .iter()
                .filter_map(|b| lookups[j].get(&b.timestamp).map(|other| (b.price(), *other)))
                .collect();
            let r = pearson(&pairs);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix {
        symbols: series.iter().map(|s| s.symbol.clone()).collect(),
        values,
    }
}

pub fn correlation_heatmap(matrix: &CorrelationMatrix) -> ChartSpec {
    ChartSpec::new("Correlation Matrix").with_trace(Trace::Heatmap {
        x: matrix.symbols.clone(),
        y: matrix.symbols.clone(),
        z: matrix.values.clone(),
        zmid: 0.0,
    })
}
