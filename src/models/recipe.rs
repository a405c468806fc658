//! Recipe model
//!
//! A recipe is an ordered list of catalog foods with gram quantities. Its
//! nutrition is never cached; diary entries compute it at write time.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;
use crate::nutrition::{RecipeComposition, RecipeLine};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,
    pub name: String,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub id: i64,
    pub recipe_id: i64,
    pub food_id: i64,
    pub quantity_grams: f64,
    pub position: i64,
}

/// Ingredient joined with its food name; `food_name` is None when the food
/// row no longer exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeIngredientDetail {
    pub id: i64,
    pub food_id: i64,
    pub food_name: Option<String>,
    pub quantity_grams: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientInput {
    pub food_id: i64,
    pub quantity_grams: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeCreate {
    pub name: String,
    pub notes: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<IngredientInput>,
}

impl Recipe {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            notes: row.get("notes")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Insert a recipe with its ingredients. Callers wrap this in a
    /// transaction so a failed ingredient insert leaves no half recipe.
    pub fn create(conn: &Connection, data: &RecipeCreate) -> DbResult<Self> {
        conn.execute(
            "INSERT INTO recipes (name, notes) VALUES (?1, ?2)",
            params![data.name, data.notes],
        )?;
        let id = conn.last_insert_rowid();

        for ingredient in &data.ingredients {
            RecipeIngredient::add(conn, id, ingredient)?;
        }

        Self::get_by_id(conn, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM recipes WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(recipe) => Ok(Some(recipe)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Load the recipe as a composition for portion calculation
    pub fn composition(conn: &Connection, id: i64) -> DbResult<Option<RecipeComposition>> {
        let Some(recipe) = Self::get_by_id(conn, id)? else {
            return Ok(None);
        };

        let ingredients = RecipeIngredient::get_for_recipe(conn, id)?
            .into_iter()
            .map(|i| RecipeLine {
                food_id: i.food_id,
                quantity_grams: i.quantity_grams,
            })
            .collect();

        Ok(Some(RecipeComposition {
            name: recipe.name,
            ingredients,
        }))
    }

    /// Number of diary entries that reference this recipe
    pub fn get_times_logged(conn: &Connection, id: i64) -> DbResult<i64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM diary_entries WHERE recipe_id = ?1",
            [id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

impl RecipeIngredient {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            recipe_id: row.get("recipe_id")?,
            food_id: row.get("food_id")?,
            quantity_grams: row.get("quantity_grams")?,
            position: row.get("position")?,
        })
    }

    /// Append an ingredient at the end of the recipe
    pub fn add(conn: &Connection, recipe_id: i64, data: &IngredientInput) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO recipe_ingredients (recipe_id, food_id, quantity_grams, position)
            VALUES (?1, ?2, ?3,
                (SELECT COALESCE(MAX(position), -1) + 1 FROM recipe_ingredients WHERE recipe_id = ?1))
            "#,
            params![recipe_id, data.food_id, data.quantity_grams],
        )?;
        let id = conn.last_insert_rowid();

        conn.execute(
            "UPDATE recipes SET updated_at = datetime('now') WHERE id = ?1",
            [recipe_id],
        )?;

        let mut stmt = conn.prepare("SELECT * FROM recipe_ingredients WHERE id = ?1")?;
        Ok(stmt.query_row([id], Self::from_row)?)
    }

    pub fn get_for_recipe(conn: &Connection, recipe_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM recipe_ingredients WHERE recipe_id = ?1 ORDER BY position, id",
        )?;

        let ingredients = stmt
            .query_map([recipe_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ingredients)
    }

    pub fn get_details_for_recipe(
        conn: &Connection,
        recipe_id: i64,
    ) -> DbResult<Vec<RecipeIngredientDetail>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT ri.id, ri.food_id, f.name AS food_name, ri.quantity_grams
            FROM recipe_ingredients ri
            LEFT JOIN foods f ON ri.food_id = f.id
            WHERE ri.recipe_id = ?1
            ORDER BY ri.position, ri.id
            "#,
        )?;

        let details = stmt
            .query_map([recipe_id], |row| {
                Ok(RecipeIngredientDetail {
                    id: row.get("id")?,
                    food_id: row.get("food_id")?,
                    food_name: row.get("food_name")?,
                    quantity_grams: row.get("quantity_grams")?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(details)
    }
}
