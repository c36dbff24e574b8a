//! Central registry that providers contribute their instruments to.

use std::collections::BTreeMap;

use prometheus::{Gauge, IntCounter, Opts, Registry};
use tracing::{debug, info};

use super::instrument::{Instrument, InstrumentKind};
use super::provider::{MetricsProvider, ProviderDescriptor};
use super::snapshot::Snapshot;
use crate::error::{MetricsError, Result};

/// Name of the counter every host process gets, provider or not.
pub const EVENT_RECEIVE_COUNTER: &str = "updateip_count_event_receive";

/// Name of the constant build information gauge.
pub const BUILD_INFO_GAUGE: &str = "updateip_build_info";

/// Owns the prometheus registry and the canonical metric namespace.
///
/// Registration takes `&mut self`; once the collector is shared behind an
/// `Arc` it can only be read, which keeps the registry write-once-then-read-many.
pub struct MetricsCollector {
    registry: Registry,
    instruments: BTreeMap<String, InstrumentKind>,
    event_received: IntCounter,
}

impl MetricsCollector {
    /// Creates a collector with the default event counter and build info registered.
    pub fn new() -> Result<Self> {
        let event_received = IntCounter::new(EVENT_RECEIVE_COUNTER, "Count of events received")?;
        let build_info = Gauge::with_opts(
            Opts::new(
                BUILD_INFO_GAUGE,
                "A metric with a constant '1' value labeled by the version updateip was built from.",
            )
            .const_label("version", env!("CARGO_PKG_VERSION")),
        )?;
        build_info.set(1.0);

        let mut collector = MetricsCollector {
            registry: Registry::new(),
            instruments: BTreeMap::new(),
            event_received: event_received.clone(),
        };
        collector.register(event_received)?;
        collector.register(build_info)?;
        Ok(collector)
    }

    /// Adds one instrument to the registry.
    ///
    /// # Errors
    ///
    /// [`MetricsError::DuplicateInstrument`] when the name is already taken,
    /// [`MetricsError::Registry`] when prometheus rejects the descriptor.
    pub fn register(&mut self, instrument: impl Into<Instrument>) -> Result<()> {
        let instrument = instrument.into();
        let name = instrument.name();

        if self.instruments.contains_key(&name) {
            return Err(MetricsError::DuplicateInstrument { name });
        }

        self.registry
            .register(instrument.boxed())
            .map_err(|e| match e {
                prometheus::Error::AlreadyReg => MetricsError::DuplicateInstrument {
                    name: name.clone(),
                },
                other => MetricsError::Registry(other),
            })?;

        debug!(
            instrument = %name,
            kind = %instrument.kind(),
            help = %instrument.help(),
            "Registered instrument"
        );
        self.instruments.insert(name, instrument.kind());
        Ok(())
    }

    /// Registers every instrument of a descriptor, counters first, then gauges,
    /// then histograms. Stops at the first failure.
    ///
    /// Returns the number of instruments registered.
    pub fn register_from_provider(&mut self, descriptor: ProviderDescriptor) -> Result<usize> {
        let mut registered = 0;
        for (_, instruments) in descriptor.into_entries() {
            for instrument in instruments {
                self.register(instrument)?;
                registered += 1;
            }
        }
        Ok(registered)
    }

    pub fn register_provider(&mut self, provider: &dyn MetricsProvider) -> Result<usize> {
        let registered = self.register_from_provider(provider.describe_metrics())?;
        info!(
            "Registered {} instrument(s) from provider '{}'",
            registered,
            provider.get_name()
        );
        Ok(registered)
    }

    /// Handle to the default event-received counter.
    pub fn event_received(&self) -> IntCounter {
        self.event_received.clone()
    }

    /// Registered names in sorted order.
    pub fn instrument_names(&self) -> impl Iterator<Item = &str> {
        self.instruments.keys().map(String::as_str)
    }

    pub fn kind_of(&self, name: &str) -> Option<InstrumentKind> {
        self.instruments.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    /// Current value of every registered instrument.
    ///
    /// Only takes the registry's read lock; values are read from atomics, so
    /// callers incrementing or observing are never held up.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.registry.gather())
    }

    /// Renders all metrics in Prometheus text format.
    pub fn render(&self) -> Result<String> {
        self.snapshot().encode()
    }
}
