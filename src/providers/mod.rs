//! Providers that contribute domain metrics to the collector.

pub mod dns_update;

pub use dns_update::DnsUpdateProvider;
