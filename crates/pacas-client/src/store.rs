//! Client state that outlives a single run: cached contact details, account
//! flags, the property-view counter, and the backend session cookie.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Everything the lead gate remembers between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeadCaptureState {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub name: Option<String>,
    pub account_created: bool,
    pub email_verified: bool,
    pub view_count: u64,
    pub session_cookie: Option<String>,
    pub last_lead_at: Option<DateTime<Utc>>,
}

impl LeadCaptureState {
    #[must_use]
    pub fn has_email(&self) -> bool {
        self.email.as_deref().is_some_and(|e| !e.trim().is_empty())
    }
}

/// Where [`LeadCaptureState`] is kept.
pub trait StateStore: Send + Sync {
    /// Returns the stored state, or the default when nothing is stored yet.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when stored state exists but cannot be read.
    fn load(&self) -> Result<LeadCaptureState, StoreError>;

    /// # Errors
    ///
    /// Returns [`StoreError`] when the state cannot be written.
    fn save(&self, state: &LeadCaptureState) -> Result<(), StoreError>;
}

/// Pretty-printed JSON file, replaced atomically on save.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl StateStore for JsonFileStore {
    fn load(&self) -> Result<LeadCaptureState, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(LeadCaptureState::default()),
            Err(e) => return Err(self.io_error(e)),
        };
        serde_json::from_str(&content).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, state: &LeadCaptureState) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let content = serde_json::to_string_pretty(state).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;

        let temp_path = self.path.with_extension("json.tmp");
        std::fs::write(&temp_path, content).map_err(|e| self.io_error(e))?;
        std::fs::rename(&temp_path, &self.path).map_err(|e| self.io_error(e))?;
        tracing::debug!(path = %self.path.display(), "saved client state");
        Ok(())
    }
}

/// In-process store for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<LeadCaptureState>,
}

impl MemoryStore {
    #[must_use]
    pub fn new(state: LeadCaptureState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> LeadCaptureState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Result<LeadCaptureState, StoreError> {
        Ok(self.snapshot())
    }

    fn save(&self, state: &LeadCaptureState) -> Result<(), StoreError> {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state.clone();
        Ok(())
    }
}
