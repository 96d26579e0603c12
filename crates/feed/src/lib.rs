//! # `koban-feed` - market data adapters
//!
//! HTTP clients implementing the `SnapshotSource` and `WhaleSource` ports.

pub mod coingecko;
pub mod whale_alert;
