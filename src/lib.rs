//! wxdash library
//!
//! Exposes the refresh controller, forecast aggregator, upstream clients, and
//! dashboard for the binary and for integration tests.

pub mod app;
pub mod cache;
pub mod cli;
pub mod data;
pub mod forecast;
pub mod format;
pub mod logging;
pub mod refresh;
pub mod ui;
