//! In-memory caching for dashboard summaries.
//!
//! This module provides the `DashboardCache`: a single slot holding the
//! last successfully fetched summary, the period it was fetched for and
//! when. An entry is served only for the same period and for 60 seconds.
//!
//! The cache is an ordinary value. Whoever composes the application
//! creates one and hands an `Arc` of it to every `DashboardService` that
//! should share it.

pub mod dashboard;

pub use dashboard::{CacheEntry, DashboardCache, CACHE_TTL_MS};
