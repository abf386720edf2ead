//! REST API client module for the finora backend.
//!
//! This module provides the `ApiClient` for communicating with the
//! finora API to fetch dashboard, household, account and transaction data,
//! and the `DashboardSource` seam the dashboard services fetch through.
//!
//! The API uses bearer token authentication obtained from `/api/auth/login`.

pub mod client;
pub mod error;
pub mod source;

pub use client::ApiClient;
pub use error::{ApiError, ErrorBody, ErrorKind};
pub use source::{DashboardQuery, DashboardSource, DEFAULT_TREND_MONTHS};
