//! Data models
//!
//! Rust structs representing database entities.

mod diary_entry;
mod food;
mod goal;
mod nutrition;
mod profile;
mod recipe;

pub use diary_entry::{
    DailySummary, DiaryEntry, DiaryEntryCreate, DiaryEntryUpdate, DiarySource, MealTotals,
    MealType,
};
pub use food::{Food, FoodCreate, FoodUpdate};
pub use goal::{NutritionGoal, NutritionGoalCreate};
pub use nutrition::{round2, NutrientProfile, Nutrition};
pub use profile::{ActivityLevel, AnthropometricProfile, Gender, UserProfile};
pub use recipe::{
    IngredientInput, Recipe, RecipeCreate, RecipeIngredient, RecipeIngredientDetail,
};
