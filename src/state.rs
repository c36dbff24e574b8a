//! Shared application state.
//!
//! Contains the state that is shared across all request handlers.

use crate::metrics::MetricsCollector;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request; the collector is frozen behind an `Arc` once
/// registration is over, so handlers can only read it.
#[derive(Clone)]
pub struct AppState {
    /// Registry of every instrument contributed at bootstrap.
    pub collector: Arc<MetricsCollector>,
}

impl AppState {
    pub fn new(collector: Arc<MetricsCollector>) -> Self {
        Self { collector }
    }
}
