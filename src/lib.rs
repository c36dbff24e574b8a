//! Library exports for updateip-metrics, shared between the binary and tests.

pub mod config;
pub mod connection;
pub mod error;
pub mod metrics;
pub mod providers;
pub mod routes;
pub mod startup;
pub mod state;
pub mod utils;

pub use error::{MetricsError, Result};
