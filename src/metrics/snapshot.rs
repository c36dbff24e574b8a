//! Point-in-time view of every registered instrument.

use prometheus::proto::{Metric, MetricFamily};
use prometheus::{Encoder, TextEncoder};

use crate::error::{MetricsError, Result};

/// Content type of the text exposition format.
pub const TEXT_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Gathered metric families, sorted by name.
///
/// Labelled instruments that have never been touched have no samples yet and
/// are absent until their first label set is created.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    families: Vec<MetricFamily>,
}

impl Snapshot {
    pub(crate) fn new(families: Vec<MetricFamily>) -> Self {
        Self { families }
    }

    pub fn names(&self) -> Vec<&str> {
        self.families.iter().map(|f| f.get_name()).collect()
    }

    pub fn family(&self, name: &str) -> Option<&MetricFamily> {
        self.families.iter().find(|f| f.get_name() == name)
    }

    /// Current value of the counter sample matching exactly `labels`.
    pub fn counter_value(&self, name: &str, labels: &[(&str, &str)]) -> Option<f64> {
        self.sample(name, labels)
            .map(|m| m.get_counter().get_value())
    }

    pub fn gauge_value(&self, name: &str, labels: &[(&str, &str)]) -> Option<f64> {
        self.sample(name, labels).map(|m| m.get_gauge().get_value())
    }

    /// Number of observations recorded by a histogram for one label set.
    pub fn histogram_count(&self, name: &str, labels: &[(&str, &str)]) -> Option<u64> {
        self.sample(name, labels)
            .map(|m| m.get_histogram().get_sample_count())
    }

    fn sample(&self, name: &str, labels: &[(&str, &str)]) -> Option<&Metric> {
        self.family(name)?
            .get_metric()
            .iter()
            .find(|m| labels_match(m, labels))
    }

    /// Encodes the snapshot in the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.families, &mut buffer)
            .map_err(|e| MetricsError::Encode(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| MetricsError::Encode(e.to_string()))
    }
}

fn labels_match(metric: &Metric, labels: &[(&str, &str)]) -> bool {
    let pairs = metric.get_label();
    pairs.len() == labels.len()
        && labels.iter().all(|(name, value)| {
            pairs
                .iter()
                .any(|p| p.get_name() == *name && p.get_value() == *value)
        })
}
