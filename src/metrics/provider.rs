//! Contract between the collector and the modules that own domain metrics.

use std::collections::BTreeMap;

use super::instrument::{Instrument, InstrumentKind};

/// The instruments a provider wants registered, grouped by kind.
///
/// Each instrument is filed under its own kind when pushed, so the grouping
/// can never disagree with the payload.
#[derive(Clone, Debug, Default)]
pub struct ProviderDescriptor {
    entries: BTreeMap<InstrumentKind, Vec<Instrument>>,
}

impl ProviderDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style variant of [`ProviderDescriptor::push`].
    pub fn with(mut self, instrument: impl Into<Instrument>) -> Self {
        self.push(instrument);
        self
    }

    pub fn push(&mut self, instrument: impl Into<Instrument>) {
        let instrument = instrument.into();
        self.entries
            .entry(instrument.kind())
            .or_default()
            .push(instrument);
    }

    /// Instruments listed under `kind`, in insertion order.
    pub fn get(&self, kind: InstrumentKind) -> &[Instrument] {
        self.entries.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consumes the descriptor, yielding counters, then gauges, then histograms.
    pub fn into_entries(self) -> impl Iterator<Item = (InstrumentKind, Vec<Instrument>)> {
        self.entries.into_iter()
    }
}

/// A module that owns named instruments and hands them to the collector.
///
/// The collector never looks past the descriptor. Implementors keep their own
/// handles and update them as their domain events happen.
pub trait MetricsProvider: Send + Sync {
    /// The display name for logs.
    fn get_name(&self) -> &str;

    fn describe_metrics(&self) -> ProviderDescriptor;
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::{Gauge, HistogramOpts, HistogramVec, IntCounter};

    #[test]
    fn push_files_instruments_by_their_kind() {
        let descriptor = ProviderDescriptor::new()
            .with(
                HistogramVec::new(HistogramOpts::new("func_time", "timing"), &["where"]).unwrap(),
            )
            .with(Gauge::new("status", "status").unwrap())
            .with(IntCounter::new("update", "updates").unwrap())
            .with(IntCounter::new("errors", "errors").unwrap());

        assert_eq!(descriptor.len(), 4);
        assert_eq!(descriptor.get(InstrumentKind::Counter).len(), 2);
        assert_eq!(descriptor.get(InstrumentKind::Gauge).len(), 1);
        assert_eq!(descriptor.get(InstrumentKind::Histogram).len(), 1);
        assert_eq!(descriptor.get(InstrumentKind::Counter)[0].name(), "update");
    }

    #[test]
    fn entries_come_out_in_canonical_order() {
        let descriptor = ProviderDescriptor::new()
            .with(
                HistogramVec::new(HistogramOpts::new("func_time", "timing"), &["where"]).unwrap(),
            )
            .with(IntCounter::new("update", "updates").unwrap())
            .with(Gauge::new("status", "status").unwrap());

        let kinds: Vec<_> = descriptor.into_entries().map(|(kind, _)| kind).collect();
        assert_eq!(
            kinds,
            vec![
                InstrumentKind::Counter,
                InstrumentKind::Gauge,
                InstrumentKind::Histogram
            ]
        );
    }

    #[test]
    fn empty_descriptor() {
        let descriptor = ProviderDescriptor::new();
        assert!(descriptor.is_empty());
        assert!(descriptor.get(InstrumentKind::Gauge).is_empty());
    }
}
