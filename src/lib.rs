//! Daily equity indicators and rule-based trading signals.
//!
//! Bars come in through a [`services::market_data::BarSource`], indicators are derived
//! per ticker, signals are detected and materialized, and everything is written back
//! through the collaborator traits in [`db`].

pub mod common;
pub mod config;
pub mod core;
pub mod db;
pub mod indicators;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod signals;
