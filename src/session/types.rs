//! Session state and note buckets.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::persona::PersonaId;

/// Opaque session identifier: 32 lowercase hex characters from a v4 UUID.
pub type SessionId = String;

// ─────────────────────────────────────────────────────────────────
// Buckets and Notes
// ─────────────────────────────────────────────────────────────────

/// The seven fixed categories pinned notes are filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    States,
    Actions,
    Transitions,
    Rewards,
    Constraints,
    Uncertainties,
    Tradeoffs,
}

impl Bucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::States => "states",
            Bucket::Actions => "actions",
            Bucket::Transitions => "transitions",
            Bucket::Rewards => "rewards",
            Bucket::Constraints => "constraints",
            Bucket::Uncertainties => "uncertainties",
            Bucket::Tradeoffs => "tradeoffs",
        }
    }

    pub fn all() -> &'static [Bucket] {
        &[
            Bucket::States,
            Bucket::Actions,
            Bucket::Transitions,
            Bucket::Rewards,
            Bucket::Constraints,
            Bucket::Uncertainties,
            Bucket::Tradeoffs,
        ]
    }

    /// Comma-separated list of valid bucket names, for error messages.
    pub fn valid_names() -> String {
        Bucket::all()
            .iter()
            .map(|b| b.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Bucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Bucket::all()
            .iter()
            .copied()
            .find(|b| b.as_str() == wanted)
            .ok_or_else(|| format!("Unknown bucket '{}'", s))
    }
}

/// A pinned snippet of persona dialogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub text: String,
    #[serde(default)]
    pub citations: Vec<String>,
}

/// Bucket → notes, in bucket declaration order. Every bucket is always present.
pub type Notes = BTreeMap<Bucket, Vec<Note>>;

/// Notes mapping with every bucket present and empty.
pub fn empty_notes() -> Notes {
    Bucket::all().iter().map(|b| (*b, Vec::new())).collect()
}

// ─────────────────────────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────────────────────────

/// Mutable state of one interview session.
#[derive(Debug)]
pub struct Session {
    pub id: SessionId,

    /// Wall-clock creation time, for display.
    pub created_at: DateTime<Utc>,

    /// Monotonic creation time, for the countdown.
    pub started: Instant,

    /// Length of the interview window.
    pub time_limit: Duration,

    /// Client-supplied seed, stored verbatim.
    pub seed: i64,

    /// Remaining patience per persona; only ever decreases.
    pub patience: HashMap<PersonaId, u32>,

    /// Most recent reply, kept so the client can pin it.
    pub last_reply: String,

    /// Persona that produced the most recent reply.
    pub last_persona: Option<PersonaId>,

    /// Citations attached to the most recent reply.
    pub last_citations: Vec<String>,

    pub notes: Notes,

    /// Drives the auto-selector fallback. Seeded from the bits of `seed`
    /// reinterpreted as `u64`, so negative seeds map to distinct stable streams.
    pub rng: StdRng,
}

impl Session {
    pub fn new(
        id: SessionId,
        seed: i64,
        time_limit: Duration,
        patience: HashMap<PersonaId, u32>,
    ) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            started: Instant::now(),
            time_limit,
            seed,
            patience,
            last_reply: String::new(),
            last_persona: None,
            last_citations: Vec::new(),
            notes: empty_notes(),
            // Two's-complement cast: -1 seeds as u64::MAX, never clamped.
            rng: StdRng::seed_from_u64(seed as u64),
        }
    }

    /// Whole seconds left in the interview window, never negative.
    pub fn time_left_secs(&self) -> u64 {
        self.time_limit
            .as_secs()
            .saturating_sub(self.started.elapsed().as_secs())
    }

    /// Current patience for a persona (0 if somehow untracked).
    pub fn patience_for(&self, persona: PersonaId) -> u32 {
        self.patience.get(&persona).copied().unwrap_or(0)
    }

    /// Lower a persona's patience by one, floored at zero. Returns the new value.
    pub fn decrement_patience(&mut self, persona: PersonaId) -> u32 {
        let left = self.patience.entry(persona).or_insert(0);
        *left = left.saturating_sub(1);
        *left
    }

    /// Append a note to a bucket.
    pub fn pin(&mut self, bucket: Bucket, note: Note) {
        self.notes.entry(bucket).or_default().push(note);
    }

    /// Read-only copy of the session for callers outside the store.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id.clone(),
            seed: self.seed,
            created_at: self.created_at,
            time_limit_s: self.time_limit.as_secs(),
            time_left_s: self.time_left_secs(),
            patience: self
                .patience
                .iter()
                .map(|(k, v)| (*k, *v))
                .collect(),
            last_reply: self.last_reply.clone(),
            last_persona: self.last_persona,
            notes: self.notes.clone(),
        }
    }
}

/// Serializable view of a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub seed: i64,
    pub created_at: DateTime<Utc>,
    pub time_limit_s: u64,
    pub time_left_s: u64,
    pub patience: BTreeMap<PersonaId, u32>,
    pub last_reply: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_persona: Option<PersonaId>,
    pub notes: Notes,
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn session(limit_secs: u64) -> Session {
        let patience = PersonaId::all().iter().map(|p| (*p, 2)).collect();
        Session::new("s1".into(), 7, Duration::from_secs(limit_secs), patience)
    }

    #[test]
    fn test_bucket_parse() {
        assert_eq!("Tradeoffs".parse::<Bucket>().unwrap(), Bucket::Tradeoffs);
        assert_eq!(" states ".parse::<Bucket>().unwrap(), Bucket::States);
        assert!("misc".parse::<Bucket>().is_err());
        assert_eq!(Bucket::all().len(), 7);
    }

    #[test]
    fn test_empty_notes_has_every_bucket() {
        let notes = empty_notes();
        assert_eq!(notes.len(), 7);
        assert!(notes.values().all(Vec::is_empty));

        let json = serde_json::to_value(&notes).unwrap();
        assert!(json["uncertainties"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_decrement_floors_at_zero() {
        let mut s = session(60);
        assert_eq!(s.decrement_patience(PersonaId::Finance), 1);
        assert_eq!(s.decrement_patience(PersonaId::Finance), 0);
        assert_eq!(s.decrement_patience(PersonaId::Finance), 0);
        assert_eq!(s.patience_for(PersonaId::Clinical), 2);
    }

    #[test]
    fn test_zero_limit_never_negative() {
        let s = session(0);
        assert_eq!(s.time_left_secs(), 0);
    }

    #[test]
    fn test_time_left_counts_down_and_saturates() {
        let mut s = session(420);
        s.started = Instant::now()
            .checked_sub(Duration::from_secs(100))
            .unwrap();
        let first = s.time_left_secs();
        assert!((319..=320).contains(&first), "got {}", first);
        assert!(s.time_left_secs() <= first);

        s.started = Instant::now()
            .checked_sub(Duration::from_secs(500))
            .unwrap();
        assert_eq!(s.time_left_secs(), 0);
        assert_eq!(s.snapshot().time_left_s, 0);
    }

    #[test]
    fn test_negative_seeds_give_distinct_streams() {
        use rand::Rng;

        let patience: HashMap<PersonaId, u32> = HashMap::new();
        let draw = |seed: i64| {
            let mut s = Session::new("s".into(), seed, Duration::from_secs(1), patience.clone());
            (0..4).map(|_| s.rng.gen::<u32>()).collect::<Vec<_>>()
        };
        assert_eq!(draw(-1), draw(-1));
        assert_ne!(draw(-1), draw(1));
        assert_ne!(draw(-1), draw(-2));
        assert_eq!(Session::new("s".into(), -9, Duration::ZERO, patience.clone()).seed, -9);
    }

    #[test]
    fn test_snapshot_serializes_lowercase_keys() {
        let mut s = session(420);
        s.pin(
            Bucket::Rewards,
            Note {
                text: "Margin held".into(),
                citations: vec!["fin-obj-02".into()],
            },
        );
        let json = serde_json::to_value(s.snapshot()).unwrap();
        assert_eq!(json["patience"]["operations"], 2);
        assert_eq!(json["notes"]["rewards"][0]["text"], "Margin held");
        assert!(json["time_left_s"].as_u64().unwrap() <= 420);
    }
}
