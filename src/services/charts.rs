// src/services/charts.rs
//! Chart specifications handed to the front-end. Field names follow the
//! Plotly figure JSON (`data` + `layout`) so the client can pass them
//! straight to its plotting library.
use serde::Serialize;

use crate::models::TimeSeriesTable;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Bar {
        name: String,
        x: Vec<String>,
        y: Vec<f64>,
    },
    Pie {
        labels: Vec<String>,
        values: Vec<f64>,
    },
    Heatmap {
        x: Vec<String>,
        y: Vec<String>,
        z: Vec<Vec<f64>>,
        zmid: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Layout {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barmode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

impl ChartSpec {
    pub fn new(title: impl Into<String>) -> Self {
        ChartSpec {
            data: Vec::new(),
            layout: Layout {
                title: title.into(),
                ..Layout::default()
            },
        }
    }

    pub fn with_trace(mut self, trace: Trace) -> Self {
        self.data.push(trace);
        self
    }

    pub fn axes(mut self, x: impl Into<String>, y: impl Into<String>) -> Self {
        self.layout.xaxis = Some(Axis { title: x.into() });
        self.layout.yaxis = Some(Axis { title: y.into() });
        self
    }

    pub fn grouped(mut self) -> Self {
        self.layout.barmode = Some("group".to_string());
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.layout.width = Some(width);
        self.layout.height = Some(height);
        self
    }
}

/// Pie chart from `(label, value)` pairs, in the given order.
pub fn pie_chart(title: &str, slices: &[(String, f64)]) -> ChartSpec {
    ChartSpec::new(title).with_trace(Trace::Pie {
        labels: slices.iter().map(|(label, _)| label.clone()).collect(),
        values: slices.iter().map(|(_, value)| *value).collect(),
    })
}

/// One bar trace per value column, x axis is the ISO date.
pub fn series_bar_chart(title: &str, table: &TimeSeriesTable) -> ChartSpec {
    let x: Vec<String> = table.dates().iter().map(|d| d.to_string()).collect();
    table
        .columns()
        .iter()
        .enumerate()
        .fold(ChartSpec::new(title).grouped().axes("Date", "Value"), |chart, (idx, name)| {
            chart.with_trace(Trace::Bar {
                name: name.clone(),
                x: x.clone(),
                y: table.rows().iter().map(|r| r.values[idx]).collect(),
            })
        })
}
