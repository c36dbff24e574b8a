//! Metrics collection and exposition for Prometheus.
//!
//! Providers describe the instruments they own with a [`ProviderDescriptor`],
//! the [`MetricsCollector`] registers them, and the exposition route renders a
//! [`Snapshot`] on every scrape.

mod collector;
mod instrument;
mod provider;
mod snapshot;

pub use collector::{BUILD_INFO_GAUGE, EVENT_RECEIVE_COUNTER, MetricsCollector};
pub use instrument::{CounterHandle, GaugeHandle, HistogramHandle, Instrument, InstrumentKind};
pub use provider::{MetricsProvider, ProviderDescriptor};
pub use snapshot::{Snapshot, TEXT_CONTENT_TYPE};
