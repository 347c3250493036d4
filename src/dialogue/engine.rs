//! Dialogue engine: patience bookkeeping and keyword-routed canned replies.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::persona::{Persona, PersonaCatalog, PersonaId};
use crate::session::{Session, SessionStore};

use super::rules::{
    is_vague, mentions_any, CLINICAL_TRIGGERS, FINANCE_TRIGGERS, OPERATIONS_TRIGGERS, REFUSAL,
};
use super::selector::choose_auto;

/// Persona argument that asks the engine to pick one.
pub const AUTO: &str = "auto";

/// Text and citations produced for one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub text: String,
    pub citations: Vec<String>,
}

impl Reply {
    fn refusal() -> Self {
        Self {
            text: REFUSAL.to_string(),
            citations: Vec::new(),
        }
    }

    fn cited(text: String, citation: String) -> Self {
        Self {
            text,
            citations: vec![citation],
        }
    }
}

/// Everything a client needs after one chat turn.
#[derive(Debug, Clone, Serialize)]
pub struct ChatOutcome {
    pub reply: String,
    pub persona: PersonaId,
    pub citations: Vec<String>,
    pub time_left_s: u64,
    pub patience_left: u32,
}

/// Answers messages on behalf of personas within a session.
#[derive(Clone)]
pub struct DialogueEngine {
    catalog: Arc<PersonaCatalog>,
    sessions: Arc<SessionStore>,
}

impl DialogueEngine {
    pub fn new(catalog: Arc<PersonaCatalog>, sessions: Arc<SessionStore>) -> Self {
        Self { catalog, sessions }
    }

    pub fn catalog(&self) -> &Arc<PersonaCatalog> {
        &self.catalog
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Answer `message` as `persona`, charging patience for vague input.
    ///
    /// The patience charge and the exhaustion check happen under one lock.
    /// Does not record the reply on the session; see [`DialogueEngine::chat`].
    pub fn reply(&self, session_id: &str, persona: PersonaId, message: &str) -> Result<Reply> {
        let definition = self.catalog.load(persona)?;
        self.sessions.with_session(session_id, |session| {
            respond(session, persona, &definition, message)
        })
    }

    /// One full chat turn: resolve `auto`, answer, and remember the reply so
    /// it can be pinned later.
    pub fn chat(&self, session_id: &str, persona: &str, message: &str) -> Result<ChatOutcome> {
        let persona = self.resolve(session_id, persona, message)?;
        let reply = self.reply(session_id, persona, message)?;

        self.sessions.with_session(session_id, |session| {
            session.last_reply = reply.text.clone();
            session.last_persona = Some(persona);
            session.last_citations = reply.citations.clone();

            ChatOutcome {
                reply: reply.text,
                persona,
                citations: reply.citations,
                time_left_s: session.time_left_secs(),
                patience_left: session.patience_for(persona),
            }
        })
    }

    /// Map a persona argument to an id, drawing from the session RNG for `auto`.
    fn resolve(&self, session_id: &str, persona: &str, message: &str) -> Result<PersonaId> {
        self.sessions.with_session(session_id, |session| {
            if persona.trim().eq_ignore_ascii_case(AUTO) {
                Ok(choose_auto(message, &mut session.rng))
            } else {
                persona
                    .parse::<PersonaId>()
                    .map_err(|_| Error::persona_not_found(persona))
            }
        })?
    }
}

/// Core reply rules, run with the session already locked.
fn respond(session: &mut Session, id: PersonaId, persona: &Persona, message: &str) -> Reply {
    if is_vague(message) {
        let left = session.decrement_patience(id);
        debug!(session_id = %session.id, persona = %id, patience_left = left, "Vague message");
    }

    if session.patience_for(id) == 0 {
        info!(session_id = %session.id, persona = %id, "Patience exhausted");
        return Reply::refusal();
    }

    let lower = message.to_lowercase();
    routed_fact(id, persona, &lower).unwrap_or_else(|| default_fact(persona))
}

/// The persona's topical canned fact, if the message asks for it.
fn routed_fact(id: PersonaId, persona: &Persona, lower: &str) -> Option<Reply> {
    match id {
        PersonaId::Finance if mentions_any(lower, FINANCE_TRIGGERS) => {
            let budget = persona.constraint_of_kind("budget")?;
            let margin = persona
                .objective_mentioning("margin")
                .map(|o| o.text.as_str())
                .unwrap_or("n/a");
            Some(Reply::cited(
                format!("Budget: {}. Margin target: {}", budget.text, margin),
                budget.citation_or_empty(),
            ))
        }
        PersonaId::Clinical if mentions_any(lower, CLINICAL_TRIGGERS) => {
            let c = persona.primary_constraint()?;
            Some(Reply::cited(
                format!("Clinical constraint: {}", c.text),
                c.citation_or_empty(),
            ))
        }
        PersonaId::Operations if mentions_any(lower, OPERATIONS_TRIGGERS) => {
            let c = persona.primary_constraint()?;
            Some(Reply::cited(
                format!("Ops policy: {}", c.text),
                c.citation_or_empty(),
            ))
        }
        _ => None,
    }
}

fn default_fact(persona: &Persona) -> Reply {
    let goal = persona
        .primary_objective()
        .map(|o| o.text.as_str())
        .unwrap_or_default();
    let (limit, citation) = persona
        .primary_constraint()
        .map(|c| (c.text.as_str(), c.citation_or_empty()))
        .unwrap_or_default();
    Reply::cited(
        format!("Goal: {}. Hard constraint: {}", goal, limit),
        citation,
    )
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
