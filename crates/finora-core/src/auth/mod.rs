//! Authentication module for managing user sessions and tokens.
//!
//! This module provides:
//! - `Session`: the logged-in user and token expiry, persisted to disk
//! - `CredentialStore`: OS-level token storage via keyring
//!
//! Tokens are issued by `/api/auth/login` with a lifetime in seconds.

pub mod credentials;
pub mod session;

pub use credentials::CredentialStore;
pub use session::{Session, SessionData};
