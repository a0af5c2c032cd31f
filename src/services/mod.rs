// src/services/mod.rs
pub mod boe;
pub mod calendar;
pub mod charts;
pub mod gap_fill;
pub mod investments;
pub mod loader;
pub mod resample;
pub mod sp500;
pub mod stocks;
