//! Diary entry nutrient aggregation
//!
//! Computes the snapshot stored on a diary entry. The snapshot is taken once,
//! at write time, and is deliberately not refreshed when the food or recipe it
//! came from is edited later.

use serde::{Deserialize, Serialize};

use super::portion::{scale_food, scale_recipe_portion, FoodLookup, IngredientSnapshot, RecipeComposition};
use crate::error::EngineResult;
use crate::models::{round2, NutrientProfile, Nutrition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Food,
    Recipe,
    Inline,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Food => "food",
            SourceKind::Recipe => "recipe",
            SourceKind::Inline => "inline",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "food" => Some(SourceKind::Food),
            "recipe" => Some(SourceKind::Recipe),
            "inline" => Some(SourceKind::Inline),
            _ => None,
        }
    }
}

/// Where a logged quantity comes from, already resolved to nutrient data
#[derive(Debug, Clone, Copy)]
pub enum EntrySource<'a> {
    /// Catalog food
    Food(&'a NutrientProfile),
    /// Portion of a recipe; ingredients are resolved through a `FoodLookup`
    Recipe(&'a RecipeComposition),
    /// Ad hoc item with a caller-supplied profile and no catalog row
    Inline(&'a NutrientProfile),
}

impl EntrySource<'_> {
    pub fn kind(&self) -> SourceKind {
        match self {
            EntrySource::Food(_) => SourceKind::Food,
            EntrySource::Recipe(_) => SourceKind::Recipe,
            EntrySource::Inline(_) => SourceKind::Inline,
        }
    }
}

/// Nutrients of one diary entry, rounded to two decimals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiaryNutrientSnapshot {
    pub source_kind: SourceKind,
    pub quantity_grams: f64,
    pub nutrition: Nutrition,
    /// Per-ingredient contributions; empty unless the source is a recipe
    pub ingredients: Vec<IngredientSnapshot>,
}

/// Compute the snapshot for `quantity_grams` of `source`
pub fn compute_entry_snapshot<L>(
    source: EntrySource<'_>,
    quantity_grams: f64,
    foods: &L,
) -> EngineResult<DiaryNutrientSnapshot>
where
    L: FoodLookup + ?Sized,
{
    let (nutrition, ingredients) = match source {
        EntrySource::Food(profile) | EntrySource::Inline(profile) => {
            (scale_food(profile, quantity_grams)?, Vec::new())
        }
        EntrySource::Recipe(composition) => scale_recipe_portion(composition, quantity_grams, foods)?,
    };

    tracing::debug!(
        source = source.kind().as_str(),
        quantity_grams,
        calories = nutrition.calories,
        "computed diary snapshot"
    );

    Ok(DiaryNutrientSnapshot {
        source_kind: source.kind(),
        quantity_grams: round2(quantity_grams),
        nutrition: nutrition.rounded(),
        ingredients: ingredients.iter().map(IngredientSnapshot::rounded).collect(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::error::EngineError;
    use crate::nutrition::portion::{RecipeLine, ResolvedFood};

    fn soup() -> NutrientProfile {
        NutrientProfile::per_100g(Nutrition {
            calories: 350.0,
            protein: 12.345,
            carbs: 40.0,
            fat: 15.5,
            fiber: 3.333,
        })
    }

    #[test]
    fn test_inline_matches_food_branch() {
        let foods: HashMap<i64, ResolvedFood> = HashMap::new();
        let profile = soup();
        let inline = compute_entry_snapshot(EntrySource::Inline(&profile), 250.0, &foods).unwrap();
        let food = compute_entry_snapshot(EntrySource::Food(&profile), 250.0, &foods).unwrap();

        assert_eq!(inline.nutrition, food.nutrition);
        assert_eq!(inline.source_kind, SourceKind::Inline);
        assert!(inline.ingredients.is_empty());
    }

    #[test]
    fn test_rounds_only_at_return() {
        let foods: HashMap<i64, ResolvedFood> = HashMap::new();
        let snap = compute_entry_snapshot(EntrySource::Food(&soup()), 33.0, &foods).unwrap();
        // 12.345 * 0.33 = 4.07385, 3.333 * 0.33 = 1.09989
        assert_eq!(snap.nutrition.protein, 4.07);
        assert_eq!(snap.nutrition.fiber, 1.1);
        assert_eq!(snap.nutrition.calories, 115.5);
    }

    #[test]
    fn test_recipe_branch_keeps_breakdown() {
        let mut foods = HashMap::new();
        foods.insert(1, ResolvedFood { name: "Lentils".into(), profile: soup() });
        foods.insert(2, ResolvedFood {
            name: "Water".into(),
            profile: NutrientProfile::per_100g(Nutrition::zero()),
        });
        let composition = RecipeComposition {
            name: "Dal".into(),
            ingredients: vec![
                RecipeLine { food_id: 1, quantity_grams: 200.0 },
                RecipeLine { food_id: 2, quantity_grams: 600.0 },
            ],
        };

        let snap = compute_entry_snapshot(EntrySource::Recipe(&composition), 400.0, &foods).unwrap();
        assert_eq!(snap.source_kind, SourceKind::Recipe);
        assert_eq!(snap.ingredients.len(), 2);
        assert_eq!(snap.ingredients[0].quantity_grams, 100.0);
        assert_eq!(snap.nutrition.calories, 350.0);
    }

    #[test]
    fn test_invalid_quantity_surfaces() {
        let foods: HashMap<i64, ResolvedFood> = HashMap::new();
        let result = compute_entry_snapshot(EntrySource::Inline(&soup()), -1.0, &foods);
        assert!(matches!(result, Err(EngineError::InvalidQuantity(q)) if q == -1.0));
    }
}
