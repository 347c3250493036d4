//! Persona catalog: lazily load, validate, and cache persona definitions.
//!
//! Definitions come from `<dir>/<slug>.toml` when an override directory is
//! configured and the file exists, otherwise from the bundled registry.
//! Each persona is parsed at most once per process and then shared read-only.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::error::{Error, Result};

use super::registry::PersonaRegistry;
use super::types::{Persona, PersonaId};

/// Loads persona definitions on first use and caches them for the process lifetime.
pub struct PersonaCatalog {
    /// Optional directory of `<slug>.toml` overrides.
    persona_dir: Option<PathBuf>,

    /// Bundled fallback definitions.
    registry: PersonaRegistry,

    /// Parsed personas; never evicted.
    cache: RwLock<HashMap<PersonaId, Arc<Persona>>>,
}

impl PersonaCatalog {
    /// Create a catalog reading overrides from `persona_dir` when given.
    pub fn new(persona_dir: Option<PathBuf>) -> Self {
        Self {
            persona_dir,
            registry: PersonaRegistry::new(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Override directory, if any.
    pub fn persona_dir(&self) -> Option<&Path> {
        self.persona_dir.as_deref()
    }

    // ─────────────────────────────────────────────────────────────
    // Load
    // ─────────────────────────────────────────────────────────────

    /// Return the cached persona, loading and validating it on first use.
    pub fn load(&self, id: PersonaId) -> Result<Arc<Persona>> {
        if let Some(p) = self.cache.read().get(&id) {
            return Ok(Arc::clone(p));
        }

        let mut cache = self.cache.write();
        // Another caller may have populated it while we waited for the lock.
        if let Some(p) = cache.get(&id) {
            return Ok(Arc::clone(p));
        }

        let persona = Arc::new(self.read_definition(id)?);
        info!(
            persona = %id,
            name = %persona.identity.name,
            objectives = persona.objectives.len(),
            constraints = persona.constraints.len(),
            "Persona loaded"
        );
        cache.insert(id, Arc::clone(&persona));
        Ok(persona)
    }

    /// All three personas, in listing order.
    pub fn list(&self) -> Result<Vec<(PersonaId, Arc<Persona>)>> {
        PersonaId::all()
            .iter()
            .map(|id| self.load(*id).map(|p| (*id, p)))
            .collect()
    }

    /// Load every persona up front so a bad definition fails at startup.
    pub fn preload(&self) -> Result<()> {
        self.list().map(|_| ())
    }

    fn read_definition(&self, id: PersonaId) -> Result<Persona> {
        let (source, content) = match self.override_path(id) {
            Some(path) => {
                debug!(persona = %id, path = %path.display(), "Reading persona override");
                let content = fs::read_to_string(&path).map_err(|e| Error::IoRead {
                    path: path.clone(),
                    source: e,
                })?;
                (path.display().to_string(), content)
            }
            None => (
                format!("bundled:{}", id.slug()),
                self.registry.bundled_definition(id).to_string(),
            ),
        };

        let persona: Persona = toml::from_str(&content).map_err(|e| {
            Error::persona_invalid(id.slug(), format!("{}: {}", source, e.message()))
        })?;
        validate(id, &persona)?;
        Ok(persona)
    }

    fn override_path(&self, id: PersonaId) -> Option<PathBuf> {
        let dir = self.persona_dir.as_ref()?;
        let path = dir.join(self.registry.file_name(id));
        path.exists().then_some(path)
    }

    // ─────────────────────────────────────────────────────────────
    // Export
    // ─────────────────────────────────────────────────────────────

    /// Write the bundled definitions to `dir` so they can be edited and used
    /// as overrides. Existing files are kept unless `force` is set.
    pub fn export(&self, dir: &Path, force: bool) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dir).map_err(|e| Error::IoWrite {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let mut written = Vec::new();
        for id in PersonaId::all() {
            let dest = dir.join(self.registry.file_name(*id));
            if dest.exists() && !force {
                debug!(path = %dest.display(), "Keeping existing persona file");
                continue;
            }
            fs::write(&dest, self.registry.bundled_definition(*id)).map_err(|e| {
                Error::IoWrite {
                    path: dest.clone(),
                    source: e,
                }
            })?;
            info!(persona = %id, path = %dest.display(), "Persona exported");
            written.push(dest);
        }
        Ok(written)
    }
}

/// Check that a definition carries everything the dialogue engine reads.
fn validate(id: PersonaId, persona: &Persona) -> Result<()> {
    let invalid = |reason: &str| Err(Error::persona_invalid(id.slug(), reason));

    let identity = &persona.identity;
    if identity.role.trim().is_empty()
        || identity.name.trim().is_empty()
        || identity.temperament.trim().is_empty()
    {
        return invalid("identity.role, identity.name and identity.temperament must be set");
    }
    if persona.objectives.is_empty() {
        return invalid("at least one objective is required");
    }
    if persona.constraints.is_empty() {
        return invalid("at least one constraint is required");
    }
    if persona.objectives.iter().any(|o| o.text.trim().is_empty())
        || persona.constraints.iter().any(|c| c.text.trim().is_empty())
    {
        return invalid("objective and constraint text must not be empty");
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cached(catalog: &PersonaCatalog) -> usize {
        catalog.cache.read().len()
    }

    fn write(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(name), body).unwrap();
    }

    #[test]
    fn test_load_bundled_and_cache() {
        let catalog = PersonaCatalog::new(None);
        assert_eq!(cached(&catalog), 0);

        let first = catalog.load(PersonaId::Clinical).unwrap();
        let second = catalog.load(PersonaId::Clinical).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cached(&catalog), 1);
    }

    #[test]
    fn test_list_returns_fixed_order() {
        let catalog = PersonaCatalog::new(None);
        let ids: Vec<PersonaId> = catalog.list().unwrap().into_iter().map(|(id, _)| id).collect();
        assert_eq!(
            ids,
            vec![PersonaId::Finance, PersonaId::Clinical, PersonaId::Operations]
        );
        assert_eq!(cached(&catalog), 3);
    }

    #[test]
    fn test_override_directory_wins() {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            "operations.toml",
            r#"
[identity]
role = "Charge Nurse"
name = "Sam"
temperament = "steady"

[[objectives]]
text = "Cover nights"

[[constraints]]
text = "Max two nights in a row"
type = "schedule"
"#,
        );

        let catalog = PersonaCatalog::new(Some(tmp.path().to_path_buf()));
        let ops = catalog.load(PersonaId::Operations).unwrap();
        assert_eq!(ops.identity.name, "Sam");
        assert!(ops.style.is_empty());

        // No override file for finance, so the bundled one is used.
        let fin = catalog.load(PersonaId::Finance).unwrap();
        assert_eq!(fin.identity.role, "Chief Financial Officer");
    }

    #[test]
    fn test_malformed_override_fails_loudly() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "clinical.toml", "identity = [not toml");

        let catalog = PersonaCatalog::new(Some(tmp.path().to_path_buf()));
        let err = catalog.load(PersonaId::Clinical).unwrap_err();
        assert!(matches!(err, Error::PersonaInvalid { .. }));
        assert_eq!(cached(&catalog), 0);
    }

    #[test]
    fn test_override_without_constraints_rejected() {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            "finance.toml",
            r#"
[identity]
role = "CFO"
name = "Dana"
temperament = "blunt"

[[objectives]]
text = "Stay on budget"
"#,
        );

        let catalog = PersonaCatalog::new(Some(tmp.path().to_path_buf()));
        let err = catalog.preload().unwrap_err();
        assert!(err.to_string().contains("constraint"));
    }

    #[test]
    fn test_export_then_load() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("personas");
        let catalog = PersonaCatalog::new(Some(dir.clone()));

        let written = catalog.export(&dir, false).unwrap();
        assert_eq!(written.len(), 3);
        assert!(dir.join("finance.toml").exists());

        // Second export without force leaves files alone.
        assert!(catalog.export(&dir, false).unwrap().is_empty());
        assert_eq!(catalog.export(&dir, true).unwrap().len(), 3);

        catalog.preload().unwrap();
    }
}
