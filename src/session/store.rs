//! In-memory session store.
//!
//! Sessions live for the process lifetime. The outer map is guarded by a
//! read-write lock and each session by its own mutex, so work on one
//! session never blocks another.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::SessionSettings;
use crate::error::{Error, Result};
use crate::persona::PersonaId;

use super::types::{Bucket, Note, Notes, Session, SessionId, SessionSnapshot};

/// Owns every live session, keyed by id.
pub struct SessionStore {
    settings: SessionSettings,
    sessions: RwLock<HashMap<SessionId, Arc<Mutex<Session>>>>,
}

impl SessionStore {
    pub fn new(settings: SessionSettings) -> Self {
        Self {
            settings,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Defaults applied to new sessions.
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Start a session with full patience and an empty notes board.
    pub fn create(&self, seed: i64) -> SessionId {
        let id = Uuid::new_v4().simple().to_string();
        let patience = PersonaId::all()
            .iter()
            .map(|p| (*p, self.settings.patience_for(*p)))
            .collect();
        let session = Session::new(id.clone(), seed, self.settings.time_limit(), patience);

        self.sessions
            .write()
            .insert(id.clone(), Arc::new(Mutex::new(session)));
        info!(session_id = %id, seed, "Session created");
        id
    }

    fn handle(&self, id: &str) -> Result<Arc<Mutex<Session>>> {
        self.sessions
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| Error::session_not_found(id))
    }

    /// Run `f` with exclusive access to one session.
    pub fn with_session<T>(&self, id: &str, f: impl FnOnce(&mut Session) -> T) -> Result<T> {
        let handle = self.handle(id)?;
        let mut session = handle.lock();
        Ok(f(&mut session))
    }

    /// Whole seconds left in the session's interview window.
    pub fn time_left(&self, id: &str) -> Result<u64> {
        self.with_session(id, |s| s.time_left_secs())
    }

    pub fn get(&self, id: &str) -> Result<SessionSnapshot> {
        self.with_session(id, |s| s.snapshot())
    }

    /// Append a note to `bucket` and return the full notes board.
    pub fn pin(
        &self,
        id: &str,
        bucket: &str,
        text: impl Into<String>,
        citations: Vec<String>,
    ) -> Result<Notes> {
        let handle = self.handle(id)?;
        let bucket = parse_bucket(bucket)?;
        let note = Note {
            text: text.into(),
            citations,
        };

        let mut session = handle.lock();
        session.pin(bucket, note);
        debug!(session_id = %id, bucket = %bucket, "Note pinned");
        Ok(session.notes.clone())
    }

    /// Pin the session's most recent reply and its citations.
    pub fn pin_last_reply(&self, id: &str, bucket: &str) -> Result<Notes> {
        let handle = self.handle(id)?;
        let bucket = parse_bucket(bucket)?;

        let mut session = handle.lock();
        if session.last_reply.is_empty() {
            return Err(Error::NothingToPin {
                session_id: id.to_string(),
            });
        }
        let note = Note {
            text: session.last_reply.clone(),
            citations: session.last_citations.clone(),
        };
        session.pin(bucket, note);
        debug!(session_id = %id, bucket = %bucket, "Last reply pinned");
        Ok(session.notes.clone())
    }

    pub fn notes(&self, id: &str) -> Result<Notes> {
        self.with_session(id, |s| s.notes.clone())
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }
}

fn parse_bucket(bucket: &str) -> Result<Bucket> {
    bucket.parse().map_err(|_| Error::InvalidBucket {
        bucket: bucket.to_string(),
        valid: Bucket::valid_names(),
    })
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
