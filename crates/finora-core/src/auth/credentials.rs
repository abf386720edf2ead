//! Access tokens in the OS keychain.

use anyhow::{Context, Result};
use keyring::Entry;

const SERVICE_NAME: &str = "finora";

/// Keychain entries for one API server.
///
/// Entries are keyed by email and server host, so logging in to a local
/// backend does not overwrite the token for a hosted one.
pub struct CredentialStore {
    server: String,
}

impl CredentialStore {
    pub fn new(base_url: &str) -> Self {
        let server = base_url
            .split_once("://")
            .map_or(base_url, |(_, rest)| rest)
            .trim_end_matches('/')
            .to_ascii_lowercase();
        Self { server }
    }

    /// Keychain account name: `"{email}@{host[:port]}"`, email lowercased.
    fn account(&self, email: &str) -> String {
        format!("{}@{}", email.trim().to_ascii_lowercase(), self.server)
    }

    fn entry(&self, email: &str) -> Result<Entry> {
        Entry::new(SERVICE_NAME, &self.account(email)).context("Failed to create keyring entry")
    }

    pub fn store_token(&self, email: &str, token: &str) -> Result<()> {
        self.entry(email)?
            .set_password(token)
            .context("Failed to store token in keychain")
    }

    /// The stored token, `None` when this email never logged in here.
    pub fn get_token(&self, email: &str) -> Result<Option<String>> {
        match self.entry(email)?.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to retrieve token from keychain"),
        }
    }

    /// Remove the stored token. Returns whether there was one.
    pub fn delete(&self, email: &str) -> Result<bool> {
        match self.entry(email)?.delete_credential() {
            Ok(()) => Ok(true),
            Err(keyring::Error::NoEntry) => Ok(false),
            Err(e) => Err(e).context("Failed to delete token from keychain"),
        }
    }
}
