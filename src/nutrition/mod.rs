//! Nutrition calculation module
//!
//! Gram-based portion scaling, recipe slicing and diary snapshots.

pub mod aggregator;
pub mod portion;
pub mod units;

pub use aggregator::{compute_entry_snapshot, DiaryNutrientSnapshot, EntrySource, SourceKind};
pub use portion::{
    scale_food, scale_recipe_portion, FoodLookup, IngredientSnapshot, RecipeComposition,
    RecipeLine, ResolvedFood,
};
pub use units::to_grams;
