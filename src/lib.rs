//! storepulse: in-memory sales analytics for a retail point-of-sale dashboard.
//!
//! Sale events are recorded into a per-session aggregator which answers
//! windowed metric queries and derives threshold alerts on demand.

pub mod application;
pub mod config;
pub mod domain;
