//! # `koban-notify` - notification channels
//!
//! `Notifier` adapters (Telegram, SMTP, log) and the fan-out dispatcher the
//! scanner sends approved alerts through.

pub mod dispatcher;
pub mod email;
pub mod log;
pub mod telegram;
