//! # `koban-store` - alert history persistence
//!
//! SQLite and in-memory implementations of `AlertHistoryStore`.

pub mod config;
pub mod history;
pub mod memory;
