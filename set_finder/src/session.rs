//! Signed-in user state.
//!
//! `SessionService` owns the current session and broadcasts every change
//! over a `tokio::sync::watch` channel. Components that need the user get
//! the service passed in and either read `current()` or keep a
//! `SessionSubscription` for change notifications. The session can be
//! mirrored to a JSON file so the CLI stays signed in between runs.

use crate::error::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub signed_in_at: DateTime<Utc>,
}

pub struct SessionService {
    sender: watch::Sender<Option<Session>>,
    path: Option<PathBuf>,
}

impl Default for SessionService {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl SessionService {
    /// Starts signed out, nothing written to disk
    pub fn in_memory() -> Self {
        let (sender, _) = watch::channel(None);
        Self { sender, path: None }
    }

    /// Restores the session stored at `path`. A missing or unreadable file
    /// means signed out.
    pub fn with_file(path: &Path) -> Self {
        let restored = match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<Session>(&content) {
                Ok(session) => {
                    log::debug!("Restored session for {}", session.user_id);
                    Some(session)
                }
                Err(e) => {
                    log::warn!("Ignoring unreadable session file: {}", e);
                    None
                }
            },
            Err(_) => None,
        };
        let (sender, _) = watch::channel(restored);
        Self {
            sender,
            path: Some(path.to_path_buf()),
        }
    }

    /// The session as of now
    pub fn current(&self) -> Option<Session> {
        self.sender.borrow().clone()
    }

    /// Id of the signed-in user, or `NotSignedIn`
    pub fn require_user(&self) -> AppResult<String> {
        self.sender
            .borrow()
            .as_ref()
            .map(|s| s.user_id.clone())
            .ok_or(AppError::NotSignedIn)
    }

    pub fn sign_in(&self, user_id: &str) -> AppResult<Session> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(AppError::Validation("User id must not be empty".to_string()));
        }
        let session = Session {
            user_id: user_id.to_string(),
            signed_in_at: Utc::now(),
        };
        if let Some(path) = &self.path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, serde_json::to_string_pretty(&session)?)?;
        }
        log::info!("Signed in as {}", session.user_id);
        self.sender.send_replace(Some(session.clone()));
        Ok(session)
    }

    pub fn sign_out(&self) -> AppResult<()> {
        if let Some(path) = &self.path {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        if let Some(previous) = self.sender.send_replace(None) {
            log::info!("Signed out {}", previous.user_id);
        }
        Ok(())
    }

    /// Change notifications from now on; the current value counts as seen
    pub fn subscribe(&self) -> SessionSubscription {
        SessionSubscription {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Live view of the session. Dropping it, or calling `unsubscribe`, ends it.
pub struct SessionSubscription {
    receiver: watch::Receiver<Option<Session>>,
}

impl SessionSubscription {
    /// Latest value, marking it as seen
    pub fn latest(&mut self) -> Option<Session> {
        self.receiver.borrow_and_update().clone()
    }

    /// Whether the session changed since the last `latest`/`changed`
    pub fn has_changed(&self) -> bool {
        self.receiver.has_changed().unwrap_or(false)
    }

    /// Waits for the next change. `None` once the service is gone.
    pub async fn changed(&mut self) -> Option<Option<Session>> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    pub fn unsubscribe(self) {}
}
