//! Diet model registry
//!
//! Maps model names to implementations. Unknown names are an error; there is
//! no fallback model.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::{DietModel, DietResult, LeanMassModel};
use crate::error::{EngineError, EngineResult};
use crate::models::AnthropometricProfile;

#[derive(Clone)]
pub struct DietModelRegistry {
    models: BTreeMap<&'static str, Arc<dyn DietModel>>,
}

impl DietModelRegistry {
    /// A registry with no models
    pub fn empty() -> Self {
        Self {
            models: BTreeMap::new(),
        }
    }

    /// A registry with every model shipped in this crate
    pub fn with_builtin_models() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(LeanMassModel));
        registry
    }

    /// Add or replace a model under its own name
    pub fn register(&mut self, model: Arc<dyn DietModel>) {
        self.models.insert(model.name(), model);
    }

    pub fn resolve(&self, name: &str) -> EngineResult<Arc<dyn DietModel>> {
        self.models
            .get(name.trim())
            .cloned()
            .ok_or_else(|| EngineError::UnsupportedModel(name.to_string()))
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.models.keys().copied().collect()
    }

    pub fn models(&self) -> impl Iterator<Item = &Arc<dyn DietModel>> {
        self.models.values()
    }

    /// Resolve, validate the user, validate the protocol, then calculate
    pub fn calculate(
        &self,
        name: &str,
        profile: &AnthropometricProfile,
        protocol: u32,
    ) -> EngineResult<DietResult> {
        let model = self.resolve(name)?;
        model.validate_user(profile)?;
        model.validate_protocol(protocol)?;
        Ok(model.calculate(profile, protocol))
    }
}

impl Default for DietModelRegistry {
    fn default() -> Self {
        Self::with_builtin_models()
    }
}

impl std::fmt::Debug for DietModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DietModelRegistry")
            .field("models", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActivityLevel, Gender};

    fn profile() -> AnthropometricProfile {
        AnthropometricProfile {
            age: 28,
            height_cm: 180.0,
            weight_kg: 75.0,
            body_fat_percent: Some(15.0),
            gender: Gender::Male,
            activity_level: ActivityLevel::Moderate,
        }
    }

    #[test]
    fn test_unknown_model_is_rejected() {
        let registry = DietModelRegistry::default();
        let err = registry.resolve("unknown").err().unwrap();
        assert!(matches!(err, EngineError::UnsupportedModel(name) if name == "unknown"));
    }

    #[test]
    fn test_resolve_builtin() {
        let registry = DietModelRegistry::default();
        assert_eq!(registry.names(), vec!["lean_mass"]);
        let model = registry.resolve("lean_mass").unwrap();
        assert_eq!(model.protocol_count(), 4);
    }

    #[test]
    fn test_validation_runs_before_calculation() {
        let registry = DietModelRegistry::default();
        let mut p = profile();
        p.body_fat_percent = Some(150.0);
        assert!(matches!(registry.calculate("lean_mass", &p, 1), Err(EngineError::Validation(_))));
        assert!(matches!(registry.calculate("lean_mass", &profile(), 5), Err(EngineError::Validation(_))));
        assert!(registry.calculate("lean_mass", &profile(), 3).is_ok());
    }

    #[test]
    fn test_empty_registry_has_no_fallback() {
        let registry = DietModelRegistry::empty();
        assert!(registry.resolve("lean_mass").is_err());
    }
}
