//! Food model
//!
//! Catalog foods with nutrient values stored per 100 grams.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use super::{NutrientProfile, Nutrition};
use crate::db::DbResult;
use crate::error::EngineResult;
use crate::nutrition::{FoodLookup, ResolvedFood};

/// A catalog food
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Food {
    pub id: i64,
    pub name: String,
    pub brand: Option<String>,
    pub per_100g: NutrientProfile,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating a food
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodCreate {
    pub name: String,
    pub brand: Option<String>,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    #[serde(default)]
    pub fiber: f64,
    pub notes: Option<String>,
}

impl FoodCreate {
    pub fn profile(&self) -> NutrientProfile {
        NutrientProfile::per_100g(Nutrition {
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fat: self.fat,
            fiber: self.fiber,
        })
    }
}

/// Data for updating a food
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FoodUpdate {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub fiber: Option<f64>,
    pub notes: Option<String>,
}

impl Food {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            brand: row.get("brand")?,
            per_100g: NutrientProfile::per_100g(Nutrition {
                calories: row.get("calories")?,
                protein: row.get("protein")?,
                carbs: row.get("carbs")?,
                fat: row.get("fat")?,
                fiber: row.get("fiber")?,
            }),
            notes: row.get("notes")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    pub fn create(conn: &Connection, data: &FoodCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO foods (name, brand, calories, protein, carbs, fat, fiber, notes)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                data.name,
                data.brand,
                data.calories,
                data.protein,
                data.carbs,
                data.fat,
                data.fiber,
                data.notes,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM foods WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(food) => Ok(Some(food)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Search foods by name or brand
    pub fn search(conn: &Connection, query: &str, limit: i64) -> DbResult<Vec<Self>> {
        let pattern = format!("%{}%", query);
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM foods
            WHERE name LIKE ?1 OR brand LIKE ?1
            ORDER BY name ASC
            LIMIT ?2
            "#,
        )?;

        let foods = stmt
            .query_map(params![pattern, limit], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(foods)
    }

    /// Update a food.
    ///
    /// Diary entries already logged against this food keep their snapshot;
    /// nothing is cascaded.
    pub fn update(conn: &Connection, id: i64, data: &FoodUpdate) -> DbResult<Option<Self>> {
        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        macro_rules! add_update {
            ($field:ident) => {
                if let Some(ref val) = data.$field {
                    updates.push(format!("{} = ?{}", stringify!($field), params_vec.len() + 1));
                    params_vec.push(Box::new(val.clone()));
                }
            };
        }

        add_update!(name);
        add_update!(brand);
        add_update!(calories);
        add_update!(protein);
        add_update!(carbs);
        add_update!(fat);
        add_update!(fiber);
        add_update!(notes);

        if updates.is_empty() {
            return Self::get_by_id(conn, id);
        }

        updates.push("updated_at = datetime('now')".to_string());

        let sql = format!(
            "UPDATE foods SET {} WHERE id = ?{}",
            updates.join(", "),
            params_vec.len() + 1
        );
        params_vec.push(Box::new(id));

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;

        Self::get_by_id(conn, id)
    }
}

impl FoodLookup for Connection {
    fn lookup_food(&self, food_id: i64) -> EngineResult<Option<ResolvedFood>> {
        Ok(Food::get_by_id(self, food_id)?.map(|food| ResolvedFood {
            name: food.name,
            profile: food.per_100g,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn oats() -> FoodCreate {
        FoodCreate {
            name: "Rolled oats".to_string(),
            brand: None,
            calories: 379.0,
            protein: 13.2,
            carbs: 67.7,
            fat: 6.5,
            fiber: 10.1,
            notes: None,
        }
    }

    #[test]
    fn test_create_search_update() {
        let conn = setup();
        let food = Food::create(&conn, &oats()).unwrap();
        assert_eq!(food.per_100g.values().calories, 379.0);

        let found = Food::search(&conn, "oat", 10).unwrap();
        assert_eq!(found.len(), 1);

        let update = FoodUpdate { calories: Some(380.0), ..Default::default() };
        let updated = Food::update(&conn, food.id, &update).unwrap().unwrap();
        assert_eq!(updated.per_100g.values().calories, 380.0);
        assert_eq!(updated.per_100g.values().protein, 13.2);
    }

    #[test]
    fn test_connection_food_lookup() {
        let conn = setup();
        let food = Food::create(&conn, &oats()).unwrap();

        let resolved = conn.lookup_food(food.id).unwrap().unwrap();
        assert_eq!(resolved.name, "Rolled oats");
        assert!(conn.lookup_food(food.id + 100).unwrap().is_none());
    }
}
