//! Recipe tools
//!
//! Recipes are stored as ingredient lists only. Their nutrition is derived
//! on demand from the current catalog.

use rusqlite::Connection;
use serde::Serialize;

use crate::db::Database;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    Food, IngredientInput, Nutrition, Recipe, RecipeCreate, RecipeIngredient,
    RecipeIngredientDetail,
};
use crate::nutrition::scale_recipe_portion;

/// Response for create_recipe
#[derive(Debug, Serialize)]
pub struct CreateRecipeResponse {
    pub id: i64,
    pub name: String,
    pub ingredient_count: usize,
    pub total_weight_grams: f64,
    pub created_at: String,
}

/// Full recipe detail with ingredients and derived nutrition
#[derive(Debug, Serialize)]
pub struct RecipeDetail {
    pub id: i64,
    pub name: String,
    pub ingredients: Vec<RecipeIngredientDetail>,
    pub total_weight_grams: f64,
    /// Whole recipe, from current catalog values
    pub nutrition_total: Option<Nutrition>,
    pub nutrition_per_100g: Option<Nutrition>,
    /// Why nutrition could not be derived (empty recipe, missing food)
    pub problem: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub times_logged: i64,
}

/// Response for add_recipe_ingredient
#[derive(Debug, Serialize)]
pub struct AddIngredientResponse {
    pub id: i64,
    pub recipe_id: i64,
    pub food_id: i64,
    pub quantity_grams: f64,
    pub position: i64,
}

fn check_ingredient(conn: &Connection, ingredient: &IngredientInput) -> EngineResult<()> {
    let q = ingredient.quantity_grams;
    if !(q.is_finite() && q > 0.0) {
        return Err(EngineError::InvalidQuantity(q));
    }
    if Food::get_by_id(conn, ingredient.food_id)?.is_none() {
        return Err(EngineError::NotFound(format!("Food {}", ingredient.food_id)));
    }
    Ok(())
}

/// Create a recipe from (food, grams) lines
pub fn create_recipe(db: &Database, data: RecipeCreate) -> EngineResult<CreateRecipeResponse> {
    let name = data.name.trim();
    if name.is_empty() {
        return Err(EngineError::validation("Recipe name cannot be empty"));
    }
    let data = RecipeCreate { name: name.to_string(), ..data };

    let recipe = db.with_transaction(|tx| {
        for ingredient in &data.ingredients {
            check_ingredient(tx, ingredient)?;
        }
        Ok::<_, EngineError>(Recipe::create(tx, &data)?)
    })?;

    tracing::info!(recipe_id = recipe.id, ingredients = data.ingredients.len(), "recipe created");

    Ok(CreateRecipeResponse {
        id: recipe.id,
        name: recipe.name,
        ingredient_count: data.ingredients.len(),
        total_weight_grams: data.ingredients.iter().map(|i| i.quantity_grams).sum(),
        created_at: recipe.created_at,
    })
}

/// Append an ingredient to an existing recipe
pub fn add_recipe_ingredient(
    db: &Database,
    recipe_id: i64,
    ingredient: IngredientInput,
) -> EngineResult<AddIngredientResponse> {
    let added = db.with_transaction(|tx| {
        if Recipe::get_by_id(tx, recipe_id)?.is_none() {
            return Err(EngineError::NotFound(format!("Recipe {}", recipe_id)));
        }
        check_ingredient(tx, &ingredient)?;
        Ok(RecipeIngredient::add(tx, recipe_id, &ingredient)?)
    })?;

    Ok(AddIngredientResponse {
        id: added.id,
        recipe_id: added.recipe_id,
        food_id: added.food_id,
        quantity_grams: added.quantity_grams,
        position: added.position,
    })
}

/// Get a recipe with its ingredients and derived nutrition
pub fn get_recipe(db: &Database, id: i64) -> EngineResult<RecipeDetail> {
    db.with_conn(|conn| {
        let recipe = Recipe::get_by_id(conn, id)?
            .ok_or_else(|| EngineError::NotFound(format!("Recipe {}", id)))?;
        let ingredients = RecipeIngredient::get_details_for_recipe(conn, id)?;
        let times_logged = Recipe::get_times_logged(conn, id)?;
        let composition = Recipe::composition(conn, id)?
            .ok_or_else(|| EngineError::NotFound(format!("Recipe {}", id)))?;
        let total_weight = composition.total_weight();

        let (nutrition_total, nutrition_per_100g, problem) =
            match scale_recipe_portion(&composition, total_weight, conn) {
                Ok((total, _)) => (
                    Some(total.rounded()),
                    Some(total.scale(100.0 / total_weight).rounded()),
                    None,
                ),
                Err(e) if e.is_caller_error() || matches!(e, EngineError::Database(_)) => return Err(e),
                Err(e) => (None, None, Some(e.to_string())),
            };

        Ok(RecipeDetail {
            id: recipe.id,
            name: recipe.name,
            ingredients,
            total_weight_grams: total_weight,
            nutrition_total,
            nutrition_per_100g,
            problem,
            notes: recipe.notes,
            created_at: recipe.created_at,
            updated_at: recipe.updated_at,
            times_logged,
        })
    })
}
