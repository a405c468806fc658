//! Shared nutrient value types
//!
//! `Nutrition` is an absolute amount (what was eaten, what a goal targets).
//! `NutrientProfile` is the same five values expressed per 100 grams.

use serde::{Deserialize, Serialize};

/// Round to two decimal places. Applied only where values leave the engine.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Absolute nutrient amounts
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrition {
    pub calories: f64, // kcal
    pub protein: f64,  // grams
    pub carbs: f64,    // grams
    pub fat: f64,      // grams
    pub fiber: f64,    // grams
}

impl Nutrition {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Scale nutrition values by a multiplier
    pub fn scale(&self, multiplier: f64) -> Self {
        Self {
            calories: self.calories * multiplier,
            protein: self.protein * multiplier,
            carbs: self.carbs * multiplier,
            fat: self.fat * multiplier,
            fiber: self.fiber * multiplier,
        }
    }

    pub fn add(&self, other: &Nutrition) -> Self {
        Self {
            calories: self.calories + other.calories,
            protein: self.protein + other.protein,
            carbs: self.carbs + other.carbs,
            fat: self.fat + other.fat,
            fiber: self.fiber + other.fiber,
        }
    }

    pub fn sub(&self, other: &Nutrition) -> Self {
        self.add(&other.scale(-1.0))
    }

    pub fn rounded(&self) -> Self {
        Self {
            calories: round2(self.calories),
            protein: round2(self.protein),
            carbs: round2(self.carbs),
            fat: round2(self.fat),
            fiber: round2(self.fiber),
        }
    }

    /// Field-wise comparison within an absolute tolerance
    pub fn approx_eq(&self, other: &Nutrition, tolerance: f64) -> bool {
        (self.calories - other.calories).abs() <= tolerance
            && (self.protein - other.protein).abs() <= tolerance
            && (self.carbs - other.carbs).abs() <= tolerance
            && (self.fat - other.fat).abs() <= tolerance
            && (self.fiber - other.fiber).abs() <= tolerance
    }
}

impl std::ops::Add for Nutrition {
    type Output = Nutrition;

    fn add(self, other: Nutrition) -> Nutrition {
        Nutrition::add(&self, &other)
    }
}

impl std::ops::Mul<f64> for Nutrition {
    type Output = Nutrition;

    fn mul(self, multiplier: f64) -> Nutrition {
        self.scale(multiplier)
    }
}

impl std::iter::Sum for Nutrition {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Nutrition::zero(), |acc, n| acc + n)
    }
}

/// Nutrient values per 100 grams of a food or inline item
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NutrientProfile(Nutrition);

impl NutrientProfile {
    pub fn per_100g(values: Nutrition) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &Nutrition {
        &self.0
    }

    /// Negative or non-finite per-100g values are never valid catalog data
    pub fn is_valid(&self) -> bool {
        [
            self.0.calories,
            self.0.protein,
            self.0.carbs,
            self.0.fat,
            self.0.fiber,
        ]
        .iter()
        .all(|v| v.is_finite() && *v >= 0.0)
    }
}
