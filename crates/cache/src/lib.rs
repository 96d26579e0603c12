//! # `koban-cache` - in-memory `Cache` adapter
//!
//! Holds the latest market snapshot per tracked subject for the control surface.

pub mod mem;
