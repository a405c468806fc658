//! Food catalog tools
//!
//! Catalog edits never reach back into the diary: entries keep the snapshot
//! taken when they were logged.

use serde::Serialize;

use super::clamp_limit;
use crate::db::Database;
use crate::error::{EngineError, EngineResult};
use crate::models::{Food, FoodCreate, FoodUpdate};

/// Response for add_food
#[derive(Debug, Serialize)]
pub struct AddFoodResponse {
    pub id: i64,
    pub name: String,
    pub brand: Option<String>,
    pub created_at: String,
}

/// Summary of a food for search results
#[derive(Debug, Serialize)]
pub struct FoodSummary {
    pub id: i64,
    pub name: String,
    pub brand: Option<String>,
    pub calories_per_100g: f64,
}

impl From<&Food> for FoodSummary {
    fn from(food: &Food) -> Self {
        Self {
            id: food.id,
            name: food.name.clone(),
            brand: food.brand.clone(),
            calories_per_100g: food.per_100g.values().calories,
        }
    }
}

/// Response for search_foods
#[derive(Debug, Serialize)]
pub struct SearchFoodsResponse {
    pub items: Vec<FoodSummary>,
    pub total: usize,
}

/// Response for update_food
#[derive(Debug, Serialize)]
pub struct UpdateFoodResponse {
    pub success: bool,
    pub food: Food,
    /// Entries logged against this food; their snapshots are unchanged
    pub diary_entries_unchanged: i64,
}

fn check_nutrient(name: &str, value: f64) -> EngineResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(EngineError::validation(format!("{} cannot be negative", name)))
    }
}

/// Add a food with per-100g nutrients
pub fn add_food(db: &Database, data: FoodCreate) -> EngineResult<AddFoodResponse> {
    let name = data.name.trim();
    if name.is_empty() {
        return Err(EngineError::validation("Food name cannot be empty"));
    }
    if !data.profile().is_valid() {
        return Err(EngineError::validation(
            "nutrient values per 100 g must be finite and not negative",
        ));
    }

    let data = FoodCreate { name: name.to_string(), ..data };
    let food = db.with_conn(|conn| Ok::<_, EngineError>(Food::create(conn, &data)?))?;
    tracing::info!(food_id = food.id, name = %food.name, "food added");

    Ok(AddFoodResponse {
        id: food.id,
        name: food.name,
        brand: food.brand,
        created_at: food.created_at,
    })
}

pub fn get_food(db: &Database, id: i64) -> EngineResult<Food> {
    db.with_conn(|conn| Ok::<_, EngineError>(Food::get_by_id(conn, id)?))?
        .ok_or_else(|| EngineError::NotFound(format!("Food {}", id)))
}

/// Search foods by name or brand
pub fn search_foods(db: &Database, query: &str, limit: i64) -> EngineResult<SearchFoodsResponse> {
    let limit = clamp_limit(limit, 100);
    let foods = db.with_conn(|conn| Ok::<_, EngineError>(Food::search(conn, query, limit)?))?;

    let items: Vec<FoodSummary> = foods.iter().map(FoodSummary::from).collect();
    let total = items.len();
    Ok(SearchFoodsResponse { items, total })
}

/// Update a food's name, brand, notes or per-100g nutrients
pub fn update_food(db: &Database, id: i64, data: FoodUpdate) -> EngineResult<UpdateFoodResponse> {
    for (name, value) in [
        ("calories", data.calories),
        ("protein", data.protein),
        ("carbs", data.carbs),
        ("fat", data.fat),
        ("fiber", data.fiber),
    ] {
        if let Some(value) = value {
            check_nutrient(name, value)?;
        }
    }
    if data.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(EngineError::validation("Food name cannot be empty"));
    }

    db.with_conn(|conn| {
        let food = Food::update(conn, id, &data)?
            .ok_or_else(|| EngineError::NotFound(format!("Food {}", id)))?;
        let logged: i64 = conn.query_row(
            "SELECT COUNT(*) FROM diary_entries WHERE food_id = ?1",
            [id],
            |row| row.get(0),
        )?;

        Ok(UpdateFoodResponse {
            success: true,
            food,
            diary_entries_unchanged: logged,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::database;

    fn banana() -> FoodCreate {
        FoodCreate {
            name: "  Banana ".to_string(),
            brand: None,
            calories: 89.0,
            protein: 1.1,
            carbs: 22.8,
            fat: 0.3,
            fiber: 2.6,
            notes: None,
        }
    }

    #[test]
    fn test_add_trims_and_finds() {
        let db = database();
        let added = add_food(&db, banana()).unwrap();
        assert_eq!(added.name, "Banana");

        let found = search_foods(&db, "nan", 500).unwrap();
        assert_eq!(found.total, 1);
        assert_eq!(found.items[0].calories_per_100g, 89.0);
        assert_eq!(get_food(&db, added.id).unwrap().per_100g.values().fiber, 2.6);
    }

    #[test]
    fn test_rejects_negative_nutrients() {
        let db = database();
        let mut bad = banana();
        bad.fat = -1.0;
        assert!(matches!(add_food(&db, bad), Err(EngineError::Validation(_))));

        let id = add_food(&db, banana()).unwrap().id;
        let update = FoodUpdate { protein: Some(-2.0), ..Default::default() };
        assert!(matches!(update_food(&db, id, update), Err(EngineError::Validation(_))));
        assert!(matches!(
            update_food(&db, id + 1, FoodUpdate::default()),
            Err(EngineError::NotFound(_))
        ));
    }
}
