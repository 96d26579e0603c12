//! # `koban-core` - domain model and ports
//!
//! Entities, error enums and the trait boundaries (ports) that the rest of the
//! workspace plugs into. Nothing in here performs I/O; adapters live in
//! `koban-feed`, `koban-notify`, `koban-store` and `koban-cache`.

pub mod common;
pub mod config;

pub mod alert {
    pub mod entity;
    pub mod error;
}

pub mod market {
    pub mod entity;
    pub mod error;
    pub mod port;
}

pub mod whale {
    pub mod entity;
    pub mod port;
}

pub mod notify {
    pub mod error;
    pub mod port;
}

pub mod store {
    pub mod error;
    pub mod port;
}

pub mod cache {
    pub mod error;
    pub mod port;
}

#[cfg(feature = "test-utils")]
pub mod testing;
