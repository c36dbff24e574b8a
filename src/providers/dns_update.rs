//! Metrics owned by a DNS-update provider (AWS Route 53, Cloudflare, ...).

use std::time::Duration;

use prometheus::{Gauge, HistogramOpts, HistogramTimer, HistogramVec, IntCounter, Opts};

use crate::error::Result;
use crate::metrics::{MetricsProvider, ProviderDescriptor};

/// Label distinguishing the operation a timing sample belongs to.
pub const OPERATION_LABEL: &str = "where";

/// Instruments of one DNS-update provider.
///
/// Instrument names embed the provider name, e.g. `updateip_aws_update`.
/// Handles are shared with the collector once registered, so updates made
/// here show up on the next scrape.
pub struct DnsUpdateProvider {
    name: String,
    updates: IntCounter,
    status: Gauge,
    func_time: HistogramVec,
}

impl DnsUpdateProvider {
    pub fn new(provider: &str) -> Result<Self> {
        let label = provider.to_uppercase();

        let updates = IntCounter::with_opts(
            Opts::new("update", format!("Number of ip updated on {} provider.", label))
                .namespace("updateip")
                .subsystem(provider),
        )?;
        let status = Gauge::with_opts(
            Opts::new("status", format!("{} provider status.", label))
                .namespace("updateip")
                .subsystem(provider),
        )?;
        let func_time = HistogramVec::new(
            HistogramOpts::new(
                "func_time",
                format!("Time taken by {} provider operations, in seconds.", label),
            )
            .namespace("updateip")
            .subsystem(provider),
            &[OPERATION_LABEL],
        )?;

        Ok(Self {
            name: provider.to_string(),
            updates,
            status,
            func_time,
        })
    }

    /// Counts one successful record update.
    pub fn record_update(&self) {
        self.updates.inc();
    }

    pub fn set_status(&self, up: bool) {
        self.status.set(if up { 1.0 } else { 0.0 });
    }

    /// Records how long `operation` took.
    pub fn observe(&self, operation: &str, elapsed: Duration) {
        self.func_time
            .with_label_values(&[operation])
            .observe(elapsed.as_secs_f64());
    }

    /// Starts timing `operation`; the elapsed time is observed when the guard drops.
    pub fn time_track(&self, operation: &str) -> HistogramTimer {
        self.func_time.with_label_values(&[operation]).start_timer()
    }
}

impl MetricsProvider for DnsUpdateProvider {
    fn get_name(&self) -> &str {
        &self.name
    }

    fn describe_metrics(&self) -> ProviderDescriptor {
        ProviderDescriptor::new()
            .with(self.updates.clone())
            .with(self.status.clone())
            .with(self.func_time.clone())
    }
}
