//! Head-to-head comparison of two ticker symbols from Alpha Vantage intraday data.
//!
//! The core is [`features::extract`], which summarizes one raw series, and
//! [`comparator::compare`], which scores two summaries on four fixed factors. The remaining
//! modules wire those into an axum service.

pub mod alpha_vantage;
pub mod api;
pub mod comparator;
pub mod config;
pub mod constants;
pub mod data_structures;
pub mod error;
pub mod features;
pub mod server;
pub mod utils;
pub mod worker;

pub use comparator::compare;
pub use features::extract;
