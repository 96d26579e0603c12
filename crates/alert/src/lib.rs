//! # `koban-alert` - alert decision core
//!
//! Decides whether a detected market condition becomes a notification.
//! Every gate is synchronous and clock-driven; the caller dispatches the
//! message and reports success back through `AlertDecisionEngine::commit`.

pub mod cooldown;
pub mod detector;
pub mod engine;
pub mod filter;
pub mod priority;
pub mod rate_limiter;
pub mod template;
pub mod whale;

pub use engine::AlertDecisionEngine;
