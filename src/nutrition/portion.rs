//! Portion calculation
//!
//! Scales per-100g nutrient profiles to gram quantities, for single foods and
//! for proportional slices of multi-ingredient recipes. Nothing here rounds;
//! rounding happens where values leave the engine.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{NutrientProfile, Nutrition};

/// A food resolved from some catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedFood {
    pub name: String,
    pub profile: NutrientProfile,
}

/// Resolves food ids to their per-100g profiles.
///
/// Implemented for the SQLite connection (the catalog) and for plain maps.
pub trait FoodLookup {
    fn lookup_food(&self, food_id: i64) -> EngineResult<Option<ResolvedFood>>;
}

impl FoodLookup for HashMap<i64, ResolvedFood> {
    fn lookup_food(&self, food_id: i64) -> EngineResult<Option<ResolvedFood>> {
        Ok(self.get(&food_id).cloned())
    }
}

/// One (food, grams) line of a recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeLine {
    pub food_id: i64,
    pub quantity_grams: f64,
}

/// Ordered ingredients of a recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeComposition {
    pub name: String,
    pub ingredients: Vec<RecipeLine>,
}

impl RecipeComposition {
    pub fn total_weight(&self) -> f64 {
        self.ingredients.iter().map(|i| i.quantity_grams).sum()
    }
}

/// What one ingredient contributed to a recipe portion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientSnapshot {
    pub food_id: i64,
    pub food_name: String,
    pub quantity_grams: f64,
    pub nutrition: Nutrition,
}

impl IngredientSnapshot {
    pub fn rounded(&self) -> Self {
        Self {
            food_id: self.food_id,
            food_name: self.food_name.clone(),
            quantity_grams: crate::models::round2(self.quantity_grams),
            nutrition: self.nutrition.rounded(),
        }
    }
}

fn check_quantity(quantity_grams: f64) -> EngineResult<()> {
    if quantity_grams.is_finite() && quantity_grams > 0.0 {
        Ok(())
    } else {
        Err(EngineError::InvalidQuantity(quantity_grams))
    }
}

/// Nutrients in `quantity_grams` of a food with the given per-100g profile
pub fn scale_food(profile: &NutrientProfile, quantity_grams: f64) -> EngineResult<Nutrition> {
    check_quantity(quantity_grams)?;
    Ok(profile.values().scale(quantity_grams / 100.0))
}

/// Nutrients in `consumed_grams` of a recipe.
///
/// Each ingredient contributes `quantity * consumed / total_weight` grams.
/// A single unresolvable ingredient fails the whole computation.
pub fn scale_recipe_portion<L>(
    composition: &RecipeComposition,
    consumed_grams: f64,
    foods: &L,
) -> EngineResult<(Nutrition, Vec<IngredientSnapshot>)>
where
    L: FoodLookup + ?Sized,
{
    let total_weight = composition.total_weight();
    if composition.ingredients.is_empty() || !(total_weight.is_finite() && total_weight > 0.0) {
        return Err(EngineError::EmptyRecipe(composition.name.clone()));
    }
    check_quantity(consumed_grams)?;

    let portion = consumed_grams / total_weight;

    let mut breakdown = Vec::with_capacity(composition.ingredients.len());
    for line in &composition.ingredients {
        let food = foods
            .lookup_food(line.food_id)?
            .ok_or(EngineError::MissingIngredient { food_id: line.food_id })?;

        let grams = line.quantity_grams * portion;
        let nutrition = scale_food(&food.profile, grams)?;

        breakdown.push(IngredientSnapshot {
            food_id: line.food_id,
            food_name: food.name,
            quantity_grams: grams,
            nutrition,
        });
    }

    let total = breakdown.iter().map(|i| i.nutrition).sum();
    Ok((total, breakdown))
}
