//! Bundled persona registry: default TOML definitions compiled into the binary.

use super::types::PersonaId;

/// Registry of bundled persona definitions.
pub struct PersonaRegistry;

impl PersonaRegistry {
    pub fn new() -> Self {
        Self
    }

    /// Get the bundled TOML definition for a persona.
    pub fn bundled_definition(&self, id: PersonaId) -> &'static str {
        match id {
            PersonaId::Finance => include_str!("../../config/personas/finance.toml"),
            PersonaId::Clinical => include_str!("../../config/personas/clinical.toml"),
            PersonaId::Operations => include_str!("../../config/personas/operations.toml"),
        }
    }

    /// File name a definition is stored under when exported or overridden.
    pub fn file_name(&self, id: PersonaId) -> String {
        format!("{}.toml", id.slug())
    }
}

impl Default for PersonaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::Persona;

    #[test]
    fn test_all_bundled_definitions_parse() {
        let registry = PersonaRegistry::new();
        for id in PersonaId::all() {
            let raw = registry.bundled_definition(*id);
            let persona: Persona = toml::from_str(raw)
                .unwrap_or_else(|e| panic!("bundled {} does not parse: {}", id, e));
            assert!(!persona.objectives.is_empty());
            assert!(!persona.constraints.is_empty());
        }
    }

    #[test]
    fn test_finance_has_budget_constraint_and_margin_objective() {
        let registry = PersonaRegistry::new();
        let persona: Persona =
            toml::from_str(registry.bundled_definition(PersonaId::Finance)).unwrap();
        assert!(persona.constraint_of_kind("budget").is_some());
        assert!(persona.objective_mentioning("margin").is_some());
    }

    #[test]
    fn test_file_name() {
        assert_eq!(
            PersonaRegistry::new().file_name(PersonaId::Operations),
            "operations.toml"
        );
    }
}
