//! Typed instrument handles accepted by the collector.

use std::fmt;

use prometheus::core::Collector;
use prometheus::{Gauge, GaugeVec, Histogram, HistogramVec, IntCounter, IntCounterVec};

/// The three canonical instrument kinds.
///
/// Ordering is the order in which a provider descriptor is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InstrumentKind {
    Counter,
    Gauge,
    Histogram,
}

impl InstrumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstrumentKind::Counter => "counter",
            InstrumentKind::Gauge => "gauge",
            InstrumentKind::Histogram => "histogram",
        }
    }
}

impl fmt::Display for InstrumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone)]
pub enum CounterHandle {
    Plain(IntCounter),
    Labelled(IntCounterVec),
}

#[derive(Clone)]
pub enum GaugeHandle {
    Plain(Gauge),
    Labelled(GaugeVec),
}

#[derive(Clone)]
pub enum HistogramHandle {
    Plain(Histogram),
    Labelled(HistogramVec),
}

/// A named instrument, tagged by kind with a strongly typed payload.
///
/// Handles are cheap clones sharing the same atomic storage, so the provider
/// keeps mutating its own copy after the collector has registered another.
#[derive(Clone)]
pub enum Instrument {
    Counter(CounterHandle),
    Gauge(GaugeHandle),
    Histogram(HistogramHandle),
}

impl Instrument {
    pub fn kind(&self) -> InstrumentKind {
        match self {
            Instrument::Counter(_) => InstrumentKind::Counter,
            Instrument::Gauge(_) => InstrumentKind::Gauge,
            Instrument::Histogram(_) => InstrumentKind::Histogram,
        }
    }

    /// Fully-qualified metric name, as it appears in the exposition output.
    pub fn name(&self) -> String {
        self.as_collector()
            .desc()
            .first()
            .map(|desc| desc.fq_name.clone())
            .unwrap_or_default()
    }

    /// Help text shown on the `# HELP` line.
    pub fn help(&self) -> String {
        self.as_collector()
            .desc()
            .first()
            .map(|desc| desc.help.clone())
            .unwrap_or_default()
    }

    fn as_collector(&self) -> &dyn Collector {
        match self {
            Instrument::Counter(CounterHandle::Plain(c)) => c,
            Instrument::Counter(CounterHandle::Labelled(c)) => c,
            Instrument::Gauge(GaugeHandle::Plain(g)) => g,
            Instrument::Gauge(GaugeHandle::Labelled(g)) => g,
            Instrument::Histogram(HistogramHandle::Plain(h)) => h,
            Instrument::Histogram(HistogramHandle::Labelled(h)) => h,
        }
    }

    /// Boxed collector handed to the prometheus registry.
    pub(crate) fn boxed(&self) -> Box<dyn Collector> {
        match self {
            Instrument::Counter(CounterHandle::Plain(c)) => Box::new(c.clone()),
            Instrument::Counter(CounterHandle::Labelled(c)) => Box::new(c.clone()),
            Instrument::Gauge(GaugeHandle::Plain(g)) => Box::new(g.clone()),
            Instrument::Gauge(GaugeHandle::Labelled(g)) => Box::new(g.clone()),
            Instrument::Histogram(HistogramHandle::Plain(h)) => Box::new(h.clone()),
            Instrument::Histogram(HistogramHandle::Labelled(h)) => Box::new(h.clone()),
        }
    }
}

impl fmt::Debug for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instrument")
            .field("kind", &self.kind())
            .field("name", &self.name())
            .finish()
    }
}

impl From<IntCounter> for Instrument {
    fn from(c: IntCounter) -> Self {
        Instrument::Counter(CounterHandle::Plain(c))
    }
}

impl From<IntCounterVec> for Instrument {
    fn from(c: IntCounterVec) -> Self {
        Instrument::Counter(CounterHandle::Labelled(c))
    }
}

impl From<Gauge> for Instrument {
    fn from(g: Gauge) -> Self {
        Instrument::Gauge(GaugeHandle::Plain(g))
    }
}

impl From<GaugeVec> for Instrument {
    fn from(g: GaugeVec) -> Self {
        Instrument::Gauge(GaugeHandle::Labelled(g))
    }
}

impl From<Histogram> for Instrument {
    fn from(h: Histogram) -> Self {
        Instrument::Histogram(HistogramHandle::Plain(h))
    }
}

impl From<HistogramVec> for Instrument {
    fn from(h: HistogramVec) -> Self {
        Instrument::Histogram(HistogramHandle::Labelled(h))
    }
}
