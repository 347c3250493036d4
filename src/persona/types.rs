//! Core types for the persona system.
//!
//! A persona is a scripted stakeholder: a fixed identity, a free-form speaking
//! style, and ordered lists of objectives and constraints. The dialogue engine
//! only ever reads these; nothing mutates a persona after it is loaded.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────
// Persona Id
// ─────────────────────────────────────────────────────────────────

/// The three stakeholders a user can interview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonaId {
    /// Chief financial officer: budgets, overtime spend, margin.
    Finance,
    /// Attending physician: staffing ratios and patient safety.
    Clinical,
    /// Nurse manager: schedules, shifts, union rules.
    Operations,
}

impl PersonaId {
    /// Slug used in file names, URLs and CLI args.
    pub fn slug(&self) -> &'static str {
        match self {
            PersonaId::Finance => "finance",
            PersonaId::Clinical => "clinical",
            PersonaId::Operations => "operations",
        }
    }

    /// Human-readable display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            PersonaId::Finance => "Finance (CFO)",
            PersonaId::Clinical => "Clinical (Physician)",
            PersonaId::Operations => "Operations (Nurse Manager)",
        }
    }

    /// All persona ids in listing order.
    pub fn all() -> &'static [PersonaId] {
        &[PersonaId::Finance, PersonaId::Clinical, PersonaId::Operations]
    }
}

impl fmt::Display for PersonaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for PersonaId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "finance" | "cfo" => Ok(PersonaId::Finance),
            "clinical" | "physician" => Ok(PersonaId::Clinical),
            "operations" | "ops" | "manager" => Ok(PersonaId::Operations),
            _ => Err(format!(
                "Unknown persona '{}'. Valid: finance, clinical, operations",
                s
            )),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Persona Definition (loaded from TOML)
// ─────────────────────────────────────────────────────────────────

/// Full persona definition, deserialized from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    /// Who the persona is.
    pub identity: Identity,

    /// Free-form speaking style attributes (tone, verbosity, pet phrases).
    #[serde(default)]
    pub style: toml::Table,

    /// What the persona is trying to achieve, most important first.
    #[serde(default)]
    pub objectives: Vec<Objective>,

    /// Hard limits the persona will defend, most important first.
    #[serde(default)]
    pub constraints: Vec<Constraint>,
}

/// Role, name and temperament of a persona.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub role: String,
    pub name: String,
    pub temperament: String,
}

/// A goal the persona states when asked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objective {
    pub text: String,

    /// Source chunk this fact is cited from.
    #[serde(default, alias = "chunk_id", skip_serializing_if = "Option::is_none")]
    pub citation: Option<String>,
}

/// A limit the persona holds to, tagged with a type such as `budget`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    pub text: String,

    #[serde(rename = "type", default)]
    pub kind: String,

    /// Source chunk this fact is cited from.
    #[serde(default, alias = "chunk_id", skip_serializing_if = "Option::is_none")]
    pub citation: Option<String>,
}

impl Constraint {
    /// Citation id, or an empty string when the definition has none.
    pub fn citation_or_empty(&self) -> String {
        self.citation.clone().unwrap_or_default()
    }
}

impl Persona {
    /// First objective; validated to exist at load time.
    pub fn primary_objective(&self) -> Option<&Objective> {
        self.objectives.first()
    }

    /// First constraint; validated to exist at load time.
    pub fn primary_constraint(&self) -> Option<&Constraint> {
        self.constraints.first()
    }

    /// First constraint whose type tag equals `kind`.
    pub fn constraint_of_kind(&self, kind: &str) -> Option<&Constraint> {
        self.constraints.iter().find(|c| c.kind == kind)
    }

    /// First objective whose text mentions `needle` (case-insensitive).
    pub fn objective_mentioning(&self, needle: &str) -> Option<&Objective> {
        let needle = needle.to_lowercase();
        self.objectives
            .iter()
            .find(|o| o.text.to_lowercase().contains(&needle))
    }

    /// Card shown to clients when listing personas.
    pub fn card(&self) -> PersonaCard {
        PersonaCard {
            role: self.identity.role.clone(),
            name: self.identity.name.clone(),
            temperament: self.identity.temperament.clone(),
            style: self.style.clone(),
            objectives: self.objectives.clone(),
            constraints: self.constraints.clone(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Persona Card
// ─────────────────────────────────────────────────────────────────

/// Flattened, client-facing view of a persona.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaCard {
    pub role: String,
    pub name: String,
    pub temperament: String,
    pub style: toml::Table,
    pub objectives: Vec<Objective>,
    pub constraints: Vec<Constraint>,
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
