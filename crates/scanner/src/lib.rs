//! # `koban-scanner` - scan loop and its lifecycle
//!
//! `Scanner` runs one cycle over the tracked subjects (fetch, detect, evaluate,
//! dispatch, commit). `ScannerService` starts and stops the cooperative loop.

pub mod error;
pub mod scan;
pub mod service;

pub use scan::{Scanner, SharedEngine};
pub use service::ScannerService;
