//! Simple goal recommendation
//!
//! Model-free path: Mifflin-St Jeor BMR, activity-adjusted TDEE, a capped
//! deficit or surplus toward a target weight, then a fixed 30/40/30 split.

use serde::{Deserialize, Serialize};

use super::{activity_multiplier, validate_anthropometrics};
use super::{KCAL_PER_G_CARBS, KCAL_PER_G_FAT, KCAL_PER_G_PROTEIN};
use crate::error::{EngineError, EngineResult};
use crate::models::{round2, AnthropometricProfile, Gender};

/// Energy stored in one kilogram of body weight
pub const KCAL_PER_KG: f64 = 7700.0;
pub const MAX_DAILY_DEFICIT: f64 = 1000.0;
pub const MAX_DAILY_SURPLUS: f64 = 500.0;

const PROTEIN_SHARE: f64 = 0.30;
const CARBS_SHARE: f64 = 0.40;
const FAT_SHARE: f64 = 0.30;
const FIBER_G_PER_1000_KCAL: f64 = 14.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub bmr: f64,
    pub activity_multiplier: f64,
    pub tdee: f64,
    /// Negative for a deficit, positive for a surplus
    pub daily_adjustment: f64,
    /// The requested pace exceeded the deficit/surplus cap
    pub adjustment_capped: bool,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: f64,
}

/// Daily fiber for a calorie target
pub fn fiber_target(calories: f64) -> f64 {
    calories / 1000.0 * FIBER_G_PER_1000_KCAL
}

/// Mifflin-St Jeor BMR
pub fn mifflin_st_jeor(profile: &AnthropometricProfile) -> f64 {
    let base = 10.0 * profile.weight_kg + 6.25 * profile.height_cm - 5.0 * f64::from(profile.age);
    match profile.gender {
        Gender::Male => base + 5.0,
        Gender::Female => base - 161.0,
    }
}

/// Recommend daily targets, optionally moving toward `target_weight` kg
/// over `weeks_to_goal` weeks.
pub fn compute_recommendation(
    profile: &AnthropometricProfile,
    target_weight: Option<f64>,
    weeks_to_goal: Option<u32>,
) -> EngineResult<Recommendation> {
    validate_anthropometrics(profile, false)?;

    let bmr = mifflin_st_jeor(profile);
    let multiplier = activity_multiplier(profile.activity_level);
    let tdee = bmr * multiplier;

    let (daily_adjustment, adjustment_capped) = match target_weight {
        Some(target) if !(target.is_finite() && target > 0.0) => {
            return Err(EngineError::validation("target weight must be greater than 0 kg"));
        }
        Some(target) if target != profile.weight_kg => {
            let weeks = weeks_to_goal
                .filter(|w| *w > 0)
                .ok_or_else(|| EngineError::validation("weeks to goal must be greater than 0"))?;
            let wanted = (target - profile.weight_kg) * KCAL_PER_KG / (f64::from(weeks) * 7.0);
            let capped = wanted.clamp(-MAX_DAILY_DEFICIT, MAX_DAILY_SURPLUS);
            (capped, capped != wanted)
        }
        _ => (0.0, false),
    };

    let calories = tdee + daily_adjustment;

    Ok(Recommendation {
        bmr: round2(bmr),
        activity_multiplier: multiplier,
        tdee: round2(tdee),
        daily_adjustment: round2(daily_adjustment),
        adjustment_capped,
        calories: round2(calories),
        protein: round2(calories * PROTEIN_SHARE / KCAL_PER_G_PROTEIN),
        carbs: round2(calories * CARBS_SHARE / KCAL_PER_G_CARBS),
        fat: round2(calories * FAT_SHARE / KCAL_PER_G_FAT),
        fiber: round2(fiber_target(calories)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ActivityLevel;

    fn male() -> AnthropometricProfile {
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
    fn test_macros_add_up_to_calories() {
        let rec = compute_recommendation(&male(), Some(70.0), Some(8)).unwrap();
        let kcal = rec.protein * 4.0 + rec.carbs * 4.0 + rec.fat * 9.0;
        assert!((kcal - rec.calories).abs() <= 1.0);
    }

    #[test]
    fn test_reference_deficit() {
        let rec = compute_recommendation(&male(), Some(70.0), Some(8)).unwrap();
        assert_eq!(rec.bmr, 1740.0);
        assert_eq!(rec.tdee, 2697.0);
        // 5 kg * 7700 / 56 days
        assert_eq!(rec.daily_adjustment, -687.5);
        assert!(!rec.adjustment_capped);
        assert_eq!(rec.calories, 2009.5);
        assert_eq!(rec.fiber, 28.13);
    }

    #[test]
    fn test_deficit_and_surplus_caps() {
        let cut = compute_recommendation(&male(), Some(60.0), Some(4)).unwrap();
        assert_eq!(cut.daily_adjustment, -1000.0);
        assert!(cut.adjustment_capped);

        let bulk = compute_recommendation(&male(), Some(85.0), Some(4)).unwrap();
        assert_eq!(bulk.daily_adjustment, 500.0);
        assert!(bulk.adjustment_capped);
    }

    #[test]
    fn test_female_offset() {
        let mut p = male();
        p.gender = Gender::Female;
        assert_eq!(mifflin_st_jeor(&male()) - mifflin_st_jeor(&p), 166.0);
    }

    #[test]
    fn test_no_target_is_maintenance() {
        let rec = compute_recommendation(&male(), None, None).unwrap();
        assert_eq!(rec.calories, rec.tdee);
        assert_eq!(rec.daily_adjustment, 0.0);
    }

    #[test]
    fn test_target_needs_weeks() {
        assert!(matches!(
            compute_recommendation(&male(), Some(70.0), Some(0)),
            Err(EngineError::Validation(_))
        ));
        assert!(compute_recommendation(&male(), Some(70.0), None).is_err());
        assert!(compute_recommendation(&male(), Some(-1.0), Some(4)).is_err());
    }
}
