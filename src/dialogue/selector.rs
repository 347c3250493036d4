//! Persona auto-selection from free text.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::persona::PersonaId;

use super::rules::{mentions_any, CLINICAL_TOPICS, FINANCE_TOPICS, OPERATIONS_TOPICS};

/// Topic tables in priority order; the first match wins.
const ROUTES: &[(PersonaId, &[&str])] = &[
    (PersonaId::Finance, FINANCE_TOPICS),
    (PersonaId::Clinical, CLINICAL_TOPICS),
    (PersonaId::Operations, OPERATIONS_TOPICS),
];

/// Persona whose topic keywords appear in `message`, if any.
pub fn match_topic(message: &str) -> Option<PersonaId> {
    let lower = message.to_lowercase();
    ROUTES
        .iter()
        .find(|(_, words)| mentions_any(&lower, words))
        .map(|(id, _)| *id)
}

/// Pick the persona best suited to `message`, falling back to a uniform
/// draw from `rng` when no topic matches.
pub fn choose_auto<R: Rng + ?Sized>(message: &str, rng: &mut R) -> PersonaId {
    if let Some(id) = match_topic(message) {
        debug!(persona = %id, "Auto-selected persona by keyword");
        return id;
    }

    let id = PersonaId::all()
        .choose(rng)
        .copied()
        .unwrap_or(PersonaId::Finance);
    debug!(persona = %id, "Auto-selected persona at random");
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_priority_finance_first() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(choose_auto("budget ratio", &mut rng), PersonaId::Finance);
        assert_eq!(choose_auto("ICU SAFETY and shifts", &mut rng), PersonaId::Clinical);
        assert_eq!(choose_auto("who writes the schedule", &mut rng), PersonaId::Operations);
    }

    #[test]
    fn test_ot_substring_routes_to_finance() {
        // "overtime" is an operations topic, but "ot" inside "not" is checked first
        assert_eq!(match_topic("can we not add overtime"), Some(PersonaId::Finance));
        assert_eq!(match_topic("overtime"), Some(PersonaId::Operations));
    }

    #[test]
    fn test_no_match() {
        assert_eq!(match_topic("hello there"), None);
    }

    #[test]
    fn test_fallback_is_seeded() {
        let draw = |seed: u64| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..20)
                .map(|_| choose_auto("hello", &mut rng))
                .collect::<Vec<_>>()
        };
        assert_eq!(draw(42), draw(42));

        let picks = draw(7);
        assert!(picks.iter().all(|p| PersonaId::all().contains(p)));
    }
}
