//! Two-horizon credential storage.
//!
//! The persistent slot is a directory of JSON files and survives
//! process restarts; the ephemeral slot lives in memory and dies with
//! the process (the native analogue of a browser tab's session
//! storage). At most one slot holds a token pair at a time.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::models::User;

use super::{StorageHorizon, TokenPair};

/// Token pair file name in the persistent slot
const TOKENS_FILE: &str = "tokens.json";

/// User snapshot file name in the persistent slot
const USER_FILE: &str = "user.json";

/// Two-slot credential store with a fixed read priority: the persistent
/// slot wins over the ephemeral one, so a remembered login always beats
/// a stale process-local session.
pub struct CredentialStore {
    dir: PathBuf,
    ephemeral: Option<TokenPair>,
}

impl CredentialStore {
    /// Create a store whose persistent slot lives under `dir`. The
    /// directory is created lazily on first write.
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            ephemeral: None,
        }
    }

    /// Persist a token pair under the given horizon, clearing the other
    /// horizon so stale credentials cannot outlive a newer login.
    pub fn write(&mut self, horizon: StorageHorizon, pair: TokenPair) -> Result<()> {
        match horizon {
            StorageHorizon::Persistent => {
                self.ephemeral = None;
                self.save_json(TOKENS_FILE, &pair)?;
            }
            StorageHorizon::Ephemeral => {
                self.remove_file(TOKENS_FILE)?;
                self.ephemeral = Some(pair);
            }
        }
        debug!(?horizon, "Token pair stored");
        Ok(())
    }

    /// Swap the access token in the given horizon. The refresh token
    /// and the horizon itself are untouched.
    pub fn replace_access(&mut self, horizon: StorageHorizon, access: String) -> Result<()> {
        match horizon {
            StorageHorizon::Persistent => {
                let mut pair: TokenPair = self
                    .load_json(TOKENS_FILE)?
                    .context("No persistent token pair to update")?;
                pair.access = access;
                self.save_json(TOKENS_FILE, &pair)
            }
            StorageHorizon::Ephemeral => {
                let pair = self
                    .ephemeral
                    .as_mut()
                    .context("No ephemeral token pair to update")?;
                pair.access = access;
                Ok(())
            }
        }
    }

    /// Store the user snapshot. Always lands in the persistent slot:
    /// the snapshot is a read convenience, authority for "is there a
    /// session" rests with the token pair alone.
    pub fn write_user(&self, user: &User) -> Result<()> {
        self.save_json(USER_FILE, user)
    }

    /// Read the stored user snapshot, if any.
    pub fn read_user(&self) -> Result<Option<User>> {
        self.load_json(USER_FILE)
    }

    /// Read the stored token pair, persistent slot first.
    pub fn read(&self) -> Result<Option<(TokenPair, StorageHorizon)>> {
        if let Some(pair) = self.load_json::<TokenPair>(TOKENS_FILE)? {
            return Ok(Some((pair, StorageHorizon::Persistent)));
        }
        Ok(self
            .ephemeral
            .clone()
            .map(|pair| (pair, StorageHorizon::Ephemeral)))
    }

    /// Remove the token pair and user snapshot from both horizons.
    /// Idempotent: clearing an empty store is a no-op.
    pub fn clear(&mut self) -> Result<()> {
        self.ephemeral = None;
        self.remove_file(TOKENS_FILE)?;
        self.remove_file(USER_FILE)?;
        debug!("Credential store cleared");
        Ok(())
    }

    fn save_json<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        std::fs::create_dir_all(&self.dir).with_context(|| {
            format!("Failed to create credential directory {}", self.dir.display())
        })?;
        let contents = serde_json::to_string_pretty(value)?;
        std::fs::write(self.dir.join(name), contents)
            .with_context(|| format!("Failed to write {}", name))?;
        Ok(())
    }

    fn load_json<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        let path = self.dir.join(name);
        if !path.exists() {
            return Ok(None);
        }
        let contents =
            std::fs::read_to_string(&path).with_context(|| format!("Failed to read {}", name))?;
        let value =
            serde_json::from_str(&contents).with_context(|| format!("Failed to parse {}", name))?;
        Ok(Some(value))
    }

    fn remove_file(&self, name: &str) -> Result<()> {
        let path = self.dir.join(name);
        if path.exists() {
            std::fs::remove_file(&path).with_context(|| format!("Failed to remove {}", name))?;
        }
        Ok(())
    }
}
