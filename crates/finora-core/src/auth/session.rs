use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{AuthResponse, User};

/// Session file name in the data directory
const SESSION_FILE: &str = "session.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    /// Only written to disk when the keychain could not take it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

impl SessionData {
    pub fn from_auth(auth: &AuthResponse) -> Self {
        Self {
            token: Some(auth.access_token.clone()),
            token_type: auth.token_type.clone(),
            expires_at: Utc::now() + Duration::seconds(auth.expires_in),
            user: auth.user.clone(),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Get minutes remaining until expiry (for display)
    pub fn minutes_until_expiry(&self) -> i64 {
        (self.expires_at - Utc::now()).num_minutes().max(0)
    }
}

pub struct Session {
    data_dir: PathBuf,
    pub data: Option<SessionData>,
}

impl Session {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            data: None,
        }
    }

    /// Load session from disk. Returns false when there is none or it expired.
    pub fn load(&mut self) -> Result<bool> {
        let path = self.session_path();
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .context("Failed to read session file")?;
            let data: SessionData = serde_json::from_str(&contents)
                .context("Failed to parse session file")?;

            if !data.is_expired() {
                self.data = Some(data);
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Save session to disk
    pub fn save(&self) -> Result<()> {
        if let Some(ref data) = self.data {
            let path = self.session_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let contents = serde_json::to_string_pretty(data)?;
            std::fs::write(path, contents)?;
        }
        Ok(())
    }

    /// Clear session data
    pub fn clear(&mut self) -> Result<()> {
        self.data = None;
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    pub fn update(&mut self, data: SessionData) {
        self.data = Some(data);
    }

    pub fn user(&self) -> Option<&User> {
        self.data.as_ref().map(|d| &d.user)
    }

    pub fn household_id(&self) -> Option<&str> {
        self.user().and_then(|u| u.household_id.as_deref())
    }

    /// Check if session is valid (exists and not expired)
    pub fn is_valid(&self) -> bool {
        self.data.as_ref().map(|d| !d.is_expired()).unwrap_or(false)
    }

    fn session_path(&self) -> PathBuf {
        self.data_dir.join(SESSION_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn auth(expires_in: i64) -> AuthResponse {
        AuthResponse {
            access_token: "jwt".to_string(),
            token_type: "Bearer".to_string(),
            expires_in,
            user: User {
                id: "u1".to_string(),
                email: "ana@example.com".to_string(),
                first_name: "Ana".to_string(),
                last_name: "Silva".to_string(),
                household_id: Some("h1".to_string()),
            },
        }
    }

    #[test]
    fn test_expiry_from_lifetime() {
        let fresh = SessionData::from_auth(&auth(3600));
        assert!(!fresh.is_expired());
        assert!(fresh.minutes_until_expiry() >= 59);

        let expired = SessionData::from_auth(&auth(0));
        assert!(expired.is_expired());
        assert_eq!(expired.minutes_until_expiry(), 0);
    }

    #[test]
    fn test_session_round_trip_on_disk() {
        let dir = TempDir::new().expect("temp dir");
        let mut session = Session::new(dir.path().to_path_buf());
        let mut data = SessionData::from_auth(&auth(3600));
        data.token = None;
        session.update(data);
        session.save().expect("save");

        let mut reloaded = Session::new(dir.path().to_path_buf());
        assert!(reloaded.load().expect("load"));
        assert!(reloaded.is_valid());
        assert_eq!(reloaded.household_id(), Some("h1"));
        assert!(reloaded.data.as_ref().and_then(|d| d.token.clone()).is_none());

        reloaded.clear().expect("clear");
        let mut empty = Session::new(dir.path().to_path_buf());
        assert!(!empty.load().expect("load"));
    }

    #[test]
    fn test_expired_session_is_not_loaded() {
        let dir = TempDir::new().expect("temp dir");
        let mut session = Session::new(dir.path().to_path_buf());
        session.update(SessionData::from_auth(&auth(-60)));
        session.save().expect("save");

        let mut reloaded = Session::new(dir.path().to_path_buf());
        assert!(!reloaded.load().expect("load"));
        assert!(!reloaded.is_valid());
    }
}
