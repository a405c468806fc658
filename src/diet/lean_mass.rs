//! Lean-mass diet model
//!
//! BMR is the mean of a Harris-Benedict style equation and a
//! Katch-McArdle style lean-mass equation; maintenance is BMR x 1.5. Each of
//! the four protocols is a fixed list of phases, each phase a calorie delta
//! from maintenance held for a number of weeks.

use super::{validate_anthropometrics, DietModel, DietResult, PhaseResult};
use super::{KCAL_PER_G_CARBS, KCAL_PER_G_FAT, KCAL_PER_G_PROTEIN};
use crate::error::EngineResult;
use crate::models::AnthropometricProfile;

const MAINTENANCE_FACTOR: f64 = 1.5;

struct Phase {
    calorie_delta: f64,
    weeks: u32,
}

struct Protocol {
    name: &'static str,
    phases: &'static [Phase],
}

const PROTOCOLS: [Protocol; 4] = [
    Protocol {
        name: "Fat loss",
        phases: &[
            Phase { calorie_delta: -300.0, weeks: 4 },
            Phase { calorie_delta: -500.0, weeks: 8 },
        ],
    },
    Protocol {
        name: "Muscle gain",
        phases: &[
            Phase { calorie_delta: 0.0, weeks: 2 },
            Phase { calorie_delta: 200.0, weeks: 4 },
            Phase { calorie_delta: 400.0, weeks: 6 },
        ],
    },
    Protocol {
        name: "Maintenance",
        phases: &[Phase { calorie_delta: 0.0, weeks: 4 }],
    },
    Protocol {
        name: "Recomposition",
        phases: &[
            Phase { calorie_delta: -200.0, weeks: 4 },
            Phase { calorie_delta: 0.0, weeks: 2 },
            Phase { calorie_delta: 200.0, weeks: 4 },
        ],
    },
];

#[derive(Debug, Clone, Copy, Default)]
pub struct LeanMassModel;

impl LeanMassModel {
    pub const NAME: &'static str = "lean_mass";

    fn lean_fraction(profile: &AnthropometricProfile) -> f64 {
        1.0 - profile.body_fat_percent.unwrap_or_default() / 100.0
    }

    pub fn bmr(profile: &AnthropometricProfile) -> f64 {
        let w = profile.weight_kg;
        let h = profile.height_cm / 100.0;
        let age = f64::from(profile.age);

        let variant_a = 13.707 * w + 492.3 * h - 6.673 * age + 77.607;
        let variant_b = 21.6 * w * Self::lean_fraction(profile) + 370.0;
        (variant_a + variant_b) / 2.0
    }
}

impl DietModel for LeanMassModel {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Body-fat aware model with fat loss, muscle gain, maintenance and recomposition protocols"
    }

    fn protocol_count(&self) -> u32 {
        PROTOCOLS.len() as u32
    }

    fn validate_user(&self, profile: &AnthropometricProfile) -> EngineResult<()> {
        validate_anthropometrics(profile, true)
    }

    fn protocol_name(&self, protocol: u32) -> Option<&'static str> {
        let index = usize::try_from(protocol).ok()?.checked_sub(1)?;
        PROTOCOLS.get(index).map(|p| p.name)
    }

    fn calculate(&self, profile: &AnthropometricProfile, protocol: u32) -> DietResult {
        let table = &PROTOCOLS[protocol as usize - 1];
        let w = profile.weight_kg;

        let bmr = Self::bmr(profile);
        let lean_mass = w * Self::lean_fraction(profile);
        let maintenance = bmr * MAINTENANCE_FACTOR;

        // Protein and fat depend only on the body, not on the phase
        let protein = (w * 1.5 + lean_mass * 2.0) / 2.0;
        let fat = 1.2 * w * Self::lean_fraction(profile);

        let mut warnings = Vec::new();
        let phases = table
            .phases
            .iter()
            .enumerate()
            .map(|(i, phase)| {
                let calories = maintenance + phase.calorie_delta;
                let raw_carbs =
                    (calories - protein * KCAL_PER_G_PROTEIN - fat * KCAL_PER_G_FAT) / KCAL_PER_G_CARBS;
                let carbs_clamped = raw_carbs < 0.0;
                if carbs_clamped {
                    tracing::warn!(
                        model = Self::NAME,
                        protocol,
                        phase = i + 1,
                        raw_carbs,
                        "protein and fat exceed phase calories; clamping carbs to zero"
                    );
                    warnings.push(format!(
                        "Phase {}: protein and fat alone exceed {:.0} kcal; carbs clamped from {:.1} g to 0 g",
                        i + 1,
                        calories,
                        raw_carbs
                    ));
                }
                PhaseResult {
                    phase: i as u32 + 1,
                    calorie_delta: phase.calorie_delta,
                    duration_weeks: phase.weeks,
                    calories,
                    protein,
                    carbs: raw_carbs.max(0.0),
                    fat,
                    carbs_clamped,
                }
            })
            .collect();

        DietResult {
            model: Self::NAME.to_string(),
            protocol,
            protocol_name: table.name.to_string(),
            bmr,
            maintenance_calories: maintenance,
            lean_mass,
            phases,
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::models::{ActivityLevel, Gender};

    fn athlete() -> AnthropometricProfile {
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
    fn test_protocol_bounds() {
        let model = LeanMassModel;
        assert!(matches!(model.validate_protocol(0), Err(EngineError::Validation(_))));
        assert!(matches!(model.validate_protocol(5), Err(EngineError::Validation(_))));
        for protocol in 1..=4 {
            assert!(model.validate_protocol(protocol).is_ok());
            assert!(model.protocol_name(protocol).is_some());
        }
        assert_eq!(model.protocol_name(0), None);
        assert_eq!(model.protocol_name(5), None);
    }

    #[test]
    fn test_reference_values() {
        let result = LeanMassModel.calculate(&athlete(), 2);

        // A = 1804.928, B = 1747.0
        assert!((result.bmr - 1775.964).abs() < 1e-6);
        assert!((result.lean_mass - 63.75).abs() < 1e-9);
        assert!((result.maintenance_calories - 2663.946).abs() < 1e-6);
        assert_eq!(result.protocol_name, "Muscle gain");

        let deltas: Vec<f64> = result.phases.iter().map(|p| p.calorie_delta).collect();
        assert_eq!(deltas, vec![0.0, 200.0, 400.0]);

        let first = &result.phases[0];
        assert!((first.protein - 120.0).abs() < 1e-9);
        assert!((first.fat - 76.5).abs() < 1e-9);
        assert!((first.carbs - (2663.946 - 480.0 - 688.5) / 4.0).abs() < 1e-6);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_phase_energy_balances() {
        let result = LeanMassModel.calculate(&athlete(), 4);
        for phase in &result.phases {
            let kcal = phase.protein * 4.0 + phase.carbs * 4.0 + phase.fat * 9.0;
            assert!((kcal - phase.calories).abs() < 1e-6);
        }
    }

    #[test]
    fn test_negative_carbs_are_clamped() {
        let frail = AnthropometricProfile {
            age: 120,
            height_cm: 100.0,
            weight_kg: 40.0,
            body_fat_percent: Some(10.0),
            gender: Gender::Female,
            activity_level: ActivityLevel::Sedentary,
        };
        let result = LeanMassModel.calculate(&frail, 1);

        assert!(!result.phases[0].carbs_clamped);
        let deep_cut = &result.phases[1];
        assert!(deep_cut.carbs_clamped);
        assert_eq!(deep_cut.carbs, 0.0);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_requires_body_fat() {
        let mut p = athlete();
        p.body_fat_percent = None;
        assert!(LeanMassModel.validate_user(&p).is_err());
    }
}
