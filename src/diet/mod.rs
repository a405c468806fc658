//! Diet models
//!
//! Strategies that turn an anthropometric profile into calorie and macro
//! targets. Protocol-based models implement [`DietModel`] and are looked up by
//! name through [`DietModelRegistry`]; the simpler Mifflin-St Jeor
//! recommendation lives in [`recommendation`].

pub mod activity;
pub mod lean_mass;
pub mod recommendation;
pub mod registry;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{round2, AnthropometricProfile};

pub use activity::{activity_multiplier, tdee};
pub use lean_mass::LeanMassModel;
pub use recommendation::{compute_recommendation, mifflin_st_jeor, Recommendation};
pub use registry::DietModelRegistry;

/// Kilocalories per gram of protein and carbohydrate
pub const KCAL_PER_G_PROTEIN: f64 = 4.0;
pub const KCAL_PER_G_CARBS: f64 = 4.0;
/// Kilocalories per gram of fat
pub const KCAL_PER_G_FAT: f64 = 9.0;

/// A protocol-based diet model.
///
/// Callers validate before calculating; `calculate` trusts its input.
pub trait DietModel: Send + Sync {
    /// Registry key
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Protocols are numbered `1..=protocol_count()`
    fn protocol_count(&self) -> u32;

    fn validate_user(&self, profile: &AnthropometricProfile) -> EngineResult<()>;

    fn validate_protocol(&self, protocol: u32) -> EngineResult<()> {
        if (1..=self.protocol_count()).contains(&protocol) {
            Ok(())
        } else {
            Err(EngineError::validation(format!(
                "protocol must be between 1 and {} for model '{}', got {}",
                self.protocol_count(),
                self.name(),
                protocol
            )))
        }
    }

    fn protocol_name(&self, protocol: u32) -> Option<&'static str>;

    fn calculate(&self, profile: &AnthropometricProfile, protocol: u32) -> DietResult;
}

/// Targets for one phase of a protocol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseResult {
    /// 1-based
    pub phase: u32,
    pub calorie_delta: f64,
    pub duration_weeks: u32,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    /// Carbs came out negative and were clamped to zero
    pub carbs_clamped: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DietResult {
    pub model: String,
    pub protocol: u32,
    pub protocol_name: String,
    pub bmr: f64,
    pub maintenance_calories: f64,
    pub lean_mass: f64,
    pub phases: Vec<PhaseResult>,
    pub warnings: Vec<String>,
}

impl DietResult {
    pub fn phase(&self, phase: u32) -> Option<&PhaseResult> {
        self.phases.iter().find(|p| p.phase == phase)
    }

    pub fn rounded(&self) -> Self {
        Self {
            bmr: round2(self.bmr),
            maintenance_calories: round2(self.maintenance_calories),
            lean_mass: round2(self.lean_mass),
            phases: self
                .phases
                .iter()
                .map(|p| PhaseResult {
                    calorie_delta: round2(p.calorie_delta),
                    calories: round2(p.calories),
                    protein: round2(p.protein),
                    carbs: round2(p.carbs),
                    fat: round2(p.fat),
                    ..p.clone()
                })
                .collect(),
            ..self.clone()
        }
    }
}

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Range checks shared by every calculator
pub fn validate_anthropometrics(
    profile: &AnthropometricProfile,
    require_body_fat: bool,
) -> EngineResult<()> {
    if profile.age == 0 {
        return Err(EngineError::validation("age must be greater than 0"));
    }
    if !positive(profile.height_cm) {
        return Err(EngineError::validation("height must be greater than 0 cm"));
    }
    if !positive(profile.weight_kg) {
        return Err(EngineError::validation("weight must be greater than 0 kg"));
    }
    match profile.body_fat_percent {
        Some(bf) if !(bf.is_finite() && bf > 0.0 && bf < 100.0) => Err(EngineError::validation(
            format!("body fat percentage must be between 0 and 100 (exclusive), got {}", bf),
        )),
        None if require_body_fat => Err(EngineError::validation(
            "body fat percentage is required for this diet model",
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActivityLevel, Gender};

    fn profile() -> AnthropometricProfile {
        AnthropometricProfile {
            age: 30,
            height_cm: 170.0,
            weight_kg: 65.0,
            body_fat_percent: Some(22.0),
            gender: Gender::Female,
            activity_level: ActivityLevel::Light,
        }
    }

    #[test]
    fn test_validate_anthropometrics() {
        assert!(validate_anthropometrics(&profile(), true).is_ok());

        let mut p = profile();
        p.body_fat_percent = None;
        assert!(validate_anthropometrics(&p, false).is_ok());
        assert!(validate_anthropometrics(&p, true).is_err());

        for bf in [0.0, 100.0, -3.0] {
            let mut p = profile();
            p.body_fat_percent = Some(bf);
            assert!(matches!(validate_anthropometrics(&p, false), Err(EngineError::Validation(_))));
        }

        let mut p = profile();
        p.age = 0;
        assert!(validate_anthropometrics(&p, false).is_err());

        let mut p = profile();
        p.weight_kg = 0.0;
        assert!(validate_anthropometrics(&p, false).is_err());
    }
}
