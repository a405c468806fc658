//! Diary entry model
//!
//! A logged quantity of a catalog food, a recipe, or an inline item. The
//! nutrient snapshot is computed once when the entry is written and stored
//! on the row; later edits to foods or recipes never touch it.

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use super::{Food, NutrientProfile, Nutrition, NutritionGoal, Recipe};
use crate::db::DbResult;
use crate::error::{EngineError, EngineResult};
use crate::nutrition::{
    compute_entry_snapshot, DiaryNutrientSnapshot, EntrySource, IngredientSnapshot, SourceKind,
};

/// Meal type enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
    #[default]
    Unspecified,
}

impl MealType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
            MealType::Unspecified => "unspecified",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => Some(MealType::Breakfast),
            "lunch" => Some(MealType::Lunch),
            "dinner" => Some(MealType::Dinner),
            "snack" => Some(MealType::Snack),
            "unspecified" => Some(MealType::Unspecified),
            _ => None,
        }
    }
}

/// What a new entry is logged against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DiarySource {
    Food { food_id: i64 },
    Recipe { recipe_id: i64 },
    Inline { name: String, per_100g: NutrientProfile },
}

/// A diary entry with its stored snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiaryEntry {
    pub id: i64,
    pub user_id: i64,
    pub entry_date: NaiveDate,
    pub meal_type: MealType,
    pub source_kind: SourceKind,
    pub food_id: Option<i64>,
    pub recipe_id: Option<i64>,
    /// Food name, recipe name, or the inline item's name, captured with the snapshot
    pub source_name: String,
    pub inline_per_100g: Option<NutrientProfile>,
    pub quantity_grams: f64,
    pub nutrition: Nutrition,
    /// Recipe breakdown captured with the snapshot
    pub ingredients: Vec<IngredientSnapshot>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating a diary entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiaryEntryCreate {
    pub user_id: i64,
    pub entry_date: NaiveDate,
    #[serde(default)]
    pub meal_type: MealType,
    pub source: DiarySource,
    pub quantity_grams: f64,
    pub notes: Option<String>,
}

/// Data for updating a diary entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiaryEntryUpdate {
    pub entry_date: Option<NaiveDate>,
    pub meal_type: Option<MealType>,
    /// A new quantity re-snapshots the entry from its current source
    pub quantity_grams: Option<f64>,
    pub notes: Option<String>,
}

/// One day's intake against the goal in effect on that day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySummary {
    pub user_id: i64,
    pub date: NaiveDate,
    pub entry_count: usize,
    pub totals: Nutrition,
    pub by_meal: Vec<MealTotals>,
    pub goal: Option<NutritionGoal>,
    /// Goal minus totals; negative when over target
    pub remaining: Option<Nutrition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealTotals {
    pub meal_type: MealType,
    pub nutrition: Nutrition,
}

const ENTRY_SELECT: &str = "SELECT e.* FROM diary_entries e";

impl DiarySource {
    fn validate(&self) -> EngineResult<()> {
        if let DiarySource::Inline { name, per_100g } = self {
            if name.trim().is_empty() {
                return Err(EngineError::validation("inline item needs a name"));
            }
            if !per_100g.is_valid() {
                return Err(EngineError::validation(
                    "inline nutrients must be finite and not negative",
                ));
            }
        }
        Ok(())
    }

    /// Resolve against the catalog and compute the snapshot for
    /// `quantity_grams`, along with the source's current name
    fn snapshot(&self, conn: &Connection, quantity_grams: f64) -> EngineResult<(String, DiaryNutrientSnapshot)> {
        match self {
            DiarySource::Food { food_id } => {
                let food = Food::get_by_id(conn, *food_id)?
                    .ok_or_else(|| EngineError::NotFound(format!("Food {}", food_id)))?;
                let snapshot = compute_entry_snapshot(EntrySource::Food(&food.per_100g), quantity_grams, conn)?;
                Ok((food.name, snapshot))
            }
            DiarySource::Recipe { recipe_id } => {
                let composition = Recipe::composition(conn, *recipe_id)?
                    .ok_or_else(|| EngineError::NotFound(format!("Recipe {}", recipe_id)))?;
                let snapshot = compute_entry_snapshot(EntrySource::Recipe(&composition), quantity_grams, conn)?;
                Ok((composition.name, snapshot))
            }
            DiarySource::Inline { name, per_100g } => {
                let snapshot = compute_entry_snapshot(EntrySource::Inline(per_100g), quantity_grams, conn)?;
                Ok((name.trim().to_string(), snapshot))
            }
        }
    }
}

impl DiaryEntry {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let meal_type: String = row.get("meal_type")?;
        let source_kind: String = row.get("source_kind")?;
        let inline_calories: Option<f64> = row.get("inline_calories")?;

        let inline_per_100g = match inline_calories {
            Some(calories) => Some(NutrientProfile::per_100g(Nutrition {
                calories,
                protein: row.get::<_, Option<f64>>("inline_protein")?.unwrap_or_default(),
                carbs: row.get::<_, Option<f64>>("inline_carbs")?.unwrap_or_default(),
                fat: row.get::<_, Option<f64>>("inline_fat")?.unwrap_or_default(),
                fiber: row.get::<_, Option<f64>>("inline_fiber")?.unwrap_or_default(),
            })),
            None => None,
        };

        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            entry_date: row.get("entry_date")?,
            // CHECK constraint keeps meal_type to known values
            meal_type: MealType::parse(&meal_type).unwrap_or_default(),
            // CHECK constraint keeps source_kind to known values
            source_kind: SourceKind::parse(&source_kind).unwrap_or(SourceKind::Inline),
            food_id: row.get("food_id")?,
            recipe_id: row.get("recipe_id")?,
            source_name: row.get("source_name")?,
            inline_per_100g,
            quantity_grams: row.get("quantity_grams")?,
            nutrition: Nutrition {
                calories: row.get("snapshot_calories")?,
                protein: row.get("snapshot_protein")?,
                carbs: row.get("snapshot_carbs")?,
                fat: row.get("snapshot_fat")?,
                fiber: row.get("snapshot_fiber")?,
            },
            ingredients: Vec::new(),
            notes: row.get("notes")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// The source this entry was logged against, for re-snapshotting
    pub fn source(&self) -> EngineResult<DiarySource> {
        let source = match self.source_kind {
            SourceKind::Food => self.food_id.map(|food_id| DiarySource::Food { food_id }),
            SourceKind::Recipe => self.recipe_id.map(|recipe_id| DiarySource::Recipe { recipe_id }),
            SourceKind::Inline => self.inline_per_100g.map(|per_100g| DiarySource::Inline {
                name: self.source_name.clone(),
                per_100g,
            }),
        };
        source.ok_or_else(|| {
            EngineError::validation(format!("diary entry {} has an incomplete source", self.id))
        })
    }

    /// Compute the snapshot and insert the entry with its recipe breakdown.
    ///
    /// Callers run this in a transaction so the breakdown rows are written
    /// together with the entry.
    pub fn create(conn: &Connection, data: &DiaryEntryCreate) -> EngineResult<Self> {
        data.source.validate()?;
        let (source_name, snapshot) = data.source.snapshot(conn, data.quantity_grams)?;

        let (food_id, recipe_id, inline) = match &data.source {
            DiarySource::Food { food_id } => (Some(*food_id), None, None),
            DiarySource::Recipe { recipe_id } => (None, Some(*recipe_id), None),
            DiarySource::Inline { per_100g, .. } => (None, None, Some(*per_100g.values())),
        };

        conn.execute(
            r#"
            INSERT INTO diary_entries (
                user_id, entry_date, meal_type, source_kind,
                food_id, recipe_id,
                source_name, inline_calories, inline_protein, inline_carbs, inline_fat, inline_fiber,
                quantity_grams,
                snapshot_calories, snapshot_protein, snapshot_carbs, snapshot_fat, snapshot_fiber,
                notes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)
            "#,
            params![
                data.user_id,
                data.entry_date,
                data.meal_type.as_str(),
                snapshot.source_kind.as_str(),
                food_id,
                recipe_id,
                source_name,
                inline.map(|n| n.calories),
                inline.map(|n| n.protein),
                inline.map(|n| n.carbs),
                inline.map(|n| n.fat),
                inline.map(|n| n.fiber),
                snapshot.quantity_grams,
                snapshot.nutrition.calories,
                snapshot.nutrition.protein,
                snapshot.nutrition.carbs,
                snapshot.nutrition.fat,
                snapshot.nutrition.fiber,
                data.notes,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::insert_ingredients(conn, id, &snapshot.ingredients)?;

        tracing::info!(
            entry_id = id,
            user_id = data.user_id,
            source = snapshot.source_kind.as_str(),
            calories = snapshot.nutrition.calories,
            "logged diary entry"
        );

        Self::get_by_id(conn, id)?
            .ok_or_else(|| EngineError::NotFound(format!("Diary entry {}", id)))
    }

    fn insert_ingredients(conn: &Connection, entry_id: i64, ingredients: &[IngredientSnapshot]) -> DbResult<()> {
        conn.execute("DELETE FROM diary_entry_ingredients WHERE entry_id = ?1", [entry_id])?;

        let mut stmt = conn.prepare(
            r#"
            INSERT INTO diary_entry_ingredients (
                entry_id, food_id, food_name, quantity_grams, calories, protein, carbs, fat, fiber
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )?;
        for i in ingredients {
            stmt.execute(params![
                entry_id,
                i.food_id,
                i.food_name,
                i.quantity_grams,
                i.nutrition.calories,
                i.nutrition.protein,
                i.nutrition.carbs,
                i.nutrition.fat,
                i.nutrition.fiber,
            ])?;
        }
        Ok(())
    }

    fn load_ingredients(conn: &Connection, entry_id: i64) -> DbResult<Vec<IngredientSnapshot>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM diary_entry_ingredients WHERE entry_id = ?1 ORDER BY id ASC",
        )?;

        let ingredients = stmt
            .query_map([entry_id], |row| {
                Ok(IngredientSnapshot {
                    food_id: row.get("food_id")?,
                    food_name: row.get("food_name")?,
                    quantity_grams: row.get("quantity_grams")?,
                    nutrition: Nutrition {
                        calories: row.get("calories")?,
                        protein: row.get("protein")?,
                        carbs: row.get("carbs")?,
                        fat: row.get("fat")?,
                        fiber: row.get("fiber")?,
                    },
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ingredients)
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let sql = format!("{} WHERE e.id = ?1", ENTRY_SELECT);
        let entry = conn.query_row(&sql, [id], Self::from_row).optional()?;

        match entry {
            Some(mut entry) => {
                entry.ingredients = Self::load_ingredients(conn, entry.id)?;
                Ok(Some(entry))
            }
            None => Ok(None),
        }
    }

    /// A user's entries for one day, in logging order
    pub fn list_for_date(conn: &Connection, user_id: i64, date: NaiveDate) -> DbResult<Vec<Self>> {
        let sql = format!(
            "{} WHERE e.user_id = ?1 AND e.entry_date = ?2 ORDER BY e.id ASC",
            ENTRY_SELECT
        );
        let mut stmt = conn.prepare(&sql)?;

        let mut entries = stmt
            .query_map(params![user_id, date], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        for entry in &mut entries {
            entry.ingredients = Self::load_ingredients(conn, entry.id)?;
        }

        Ok(entries)
    }

    /// Update an entry. Only a quantity change recomputes the snapshot, and
    /// it does so from the source's current catalog data.
    pub fn update(conn: &Connection, id: i64, data: &DiaryEntryUpdate) -> EngineResult<Option<Self>> {
        let Some(existing) = Self::get_by_id(conn, id)? else {
            return Ok(None);
        };

        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        macro_rules! add_update {
            ($column:expr, $val:expr) => {
                updates.push(format!("{} = ?{}", $column, params_vec.len() + 1));
                params_vec.push(Box::new($val));
            };
        }

        if let Some(date) = data.entry_date {
            add_update!("entry_date", date);
        }
        if let Some(meal_type) = data.meal_type {
            add_update!("meal_type", meal_type.as_str());
        }
        if let Some(ref notes) = data.notes {
            add_update!("notes", notes.clone());
        }

        let mut resnapshot = None;
        if let Some(quantity) = data.quantity_grams {
            let (source_name, snapshot) = existing.source()?.snapshot(conn, quantity)?;
            add_update!("source_name", source_name);
            add_update!("quantity_grams", snapshot.quantity_grams);
            add_update!("snapshot_calories", snapshot.nutrition.calories);
            add_update!("snapshot_protein", snapshot.nutrition.protein);
            add_update!("snapshot_carbs", snapshot.nutrition.carbs);
            add_update!("snapshot_fat", snapshot.nutrition.fat);
            add_update!("snapshot_fiber", snapshot.nutrition.fiber);
            resnapshot = Some(snapshot);
        }

        if updates.is_empty() {
            return Ok(Some(existing));
        }

        updates.push("updated_at = datetime('now')".to_string());

        let sql = format!(
            "UPDATE diary_entries SET {} WHERE id = ?{}",
            updates.join(", "),
            params_vec.len() + 1
        );
        params_vec.push(Box::new(id));

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;

        if let Some(snapshot) = resnapshot {
            Self::insert_ingredients(conn, id, &snapshot.ingredients)?;
            tracing::info!(
                entry_id = id,
                quantity_grams = snapshot.quantity_grams,
                calories = snapshot.nutrition.calories,
                "re-snapshotted diary entry"
            );
        }

        Ok(Self::get_by_id(conn, id)?)
    }

    /// Delete an entry and its breakdown. Returns false if it did not exist.
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM diary_entries WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

impl DailySummary {
    /// Sum a day's snapshots and compare them with the goal covering that day
    pub fn for_date(conn: &Connection, user_id: i64, date: NaiveDate) -> DbResult<Self> {
        let entries = DiaryEntry::list_for_date(conn, user_id, date)?;

        let totals: Nutrition = entries.iter().map(|e| e.nutrition).sum();

        let mut by_meal: Vec<MealTotals> = Vec::new();
        for entry in &entries {
            match by_meal.iter_mut().find(|m| m.meal_type == entry.meal_type) {
                Some(meal) => meal.nutrition = meal.nutrition + entry.nutrition,
                None => by_meal.push(MealTotals {
                    meal_type: entry.meal_type,
                    nutrition: entry.nutrition,
                }),
            }
        }
        for meal in &mut by_meal {
            meal.nutrition = meal.nutrition.rounded();
        }

        let goal = NutritionGoal::get_for_date(conn, user_id, date)?;
        let remaining = goal.as_ref().map(|g| {
            Nutrition {
                calories: g.calories,
                protein: g.protein,
                carbs: g.carbs,
                fat: g.fat,
                fiber: g.fiber,
            }
            .sub(&totals)
            .rounded()
        });

        Ok(Self {
            user_id,
            date,
            entry_count: entries.len(),
            totals: totals.rounded(),
            by_meal,
            goal,
            remaining,
        })
    }
}
