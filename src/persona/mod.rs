//! Persona system: the three scripted stakeholders of the surge staffing interview.
//!
//! Definitions are static TOML documents (bundled, or overridden from a
//! directory) that are parsed once and shared read-only across sessions.

pub mod catalog;
pub mod registry;
pub mod types;

pub use catalog::PersonaCatalog;
pub use types::{Persona, PersonaCard, PersonaId};
