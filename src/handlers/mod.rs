// src/handlers/mod.rs
pub mod equity;
pub mod error;
pub mod investments;
pub mod series;
