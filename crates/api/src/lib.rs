//! # `koban-api` - HTTP control surface
//!
//! Read-only views (health, prices, alert history, statistics) and control
//! actions (start/stop monitoring, cleanup, counter reset, test notification)
//! over a running `ScannerService`. Routes are built with `axum`; the OpenAPI
//! document is collected by `utoipa` and served through Swagger UI.

pub mod error;
pub mod server;
pub mod types;

pub mod middleware {
    pub mod auth;
}

pub mod routes {
    pub mod alerts;
    pub mod health;
    pub mod monitoring;
    pub mod notify;
    pub mod prices;
}
