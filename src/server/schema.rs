//! Request and response bodies for the HTTP API.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::persona::{PersonaCard, PersonaId};
use crate::session::{Notes, SessionId};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub sessions: usize,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateSessionRequest {
    /// Falls back to `session.default_seed` when omitted.
    pub seed: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateSessionResponse {
    pub session_id: SessionId,
    pub seed: i64,
}

#[derive(Debug, Serialize)]
pub struct PersonasResponse {
    pub personas: BTreeMap<PersonaId, PersonaCard>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(alias = "sessionId")]
    pub session_id: SessionId,

    /// Persona id, alias, or `auto`.
    #[serde(default = "default_persona")]
    pub persona: String,

    pub message: String,
}

fn default_persona() -> String {
    crate::dialogue::AUTO.to_string()
}

#[derive(Debug, Deserialize)]
pub struct PinRequest {
    #[serde(alias = "sessionId")]
    pub session_id: SessionId,

    pub bucket: String,

    /// Omit to pin the session's last reply.
    #[serde(default)]
    pub text: Option<String>,

    #[serde(default)]
    pub citations: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct NotesQuery {
    #[serde(alias = "sessionId")]
    pub session_id: SessionId,
}

#[derive(Debug, Serialize)]
pub struct NotesResponse {
    pub notes: Notes,
}
