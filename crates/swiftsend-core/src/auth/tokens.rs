//! Persistent token storage.
//!
//! Tokens live in a single JSON file under the application data directory.
//! Each entry carries its own expiry timestamp, mirroring the cookie
//! semantics of the hosted front end: an expired entry is treated as absent
//! on load, and clearing removes the whole file so both tokens disappear
//! together.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Token file name in the data directory
const TOKEN_FILE: &str = "tokens.json";

/// Default access token lifetime when the server omits an expiry (15 minutes)
pub const ACCESS_TOKEN_TTL_MINUTES: i64 = 15;

/// Default refresh token lifetime when the server omits an expiry (7 days)
pub const REFRESH_TOKEN_TTL_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl StoredToken {
    pub fn new(value: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            expires_at,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct TokenFile {
    access: Option<StoredToken>,
    refresh: Option<StoredToken>,
}

/// File-backed store for the access/refresh token pair.
pub struct TokenStore {
    dir: PathBuf,
}

impl TokenStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Load both tokens, treating expired entries as absent.
    /// Returns `(access, refresh)`.
    pub fn load(&self) -> Result<(Option<StoredToken>, Option<StoredToken>)> {
        let file = self.read()?;
        let access = file.access.filter(|t| !t.is_expired());
        let refresh = file.refresh.filter(|t| !t.is_expired());
        Ok((access, refresh))
    }

    /// Persist a full token pair, replacing whatever was stored before.
    pub fn save_pair(&self, access: StoredToken, refresh: StoredToken) -> Result<()> {
        self.write(&TokenFile {
            access: Some(access),
            refresh: Some(refresh),
        })
    }

    /// Replace only the access token. The stored refresh entry is left
    /// untouched; a refresh never rotates the refresh token.
    pub fn save_access(&self, access: StoredToken) -> Result<()> {
        let mut file = self.read()?;
        file.access = Some(access);
        self.write(&file)
    }

    /// Remove both tokens. Deleting the file keeps the pair atomic: there is
    /// no state in which only one of the two survives.
    pub fn clear(&self) -> Result<()> {
        let path = self.token_path();
        if path.exists() {
            std::fs::remove_file(path).context("Failed to remove token file")?;
        }
        Ok(())
    }

    fn read(&self) -> Result<TokenFile> {
        let path = self.token_path();
        if !path.exists() {
            return Ok(TokenFile::default());
        }
        let contents = std::fs::read_to_string(&path).context("Failed to read token file")?;
        serde_json::from_str(&contents).context("Failed to parse token file")
    }

    fn write(&self, file: &TokenFile) -> Result<()> {
        let path = self.token_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(file)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn token_path(&self) -> PathBuf {
        self.dir.join(TOKEN_FILE)
    }
}
