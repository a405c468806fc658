//! Database migrations
//!
//! Schema creation and migration logic.

use rusqlite::Connection;

use super::connection::DbResult;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
        tracing::info!("applied schema migration v1");
    }

    Ok(())
}

/// Migration v1: Initial schema
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- USER PROFILES
        -- Anthropometric data, one row per user
        -- ============================================
        CREATE TABLE user_profiles (
            user_id INTEGER PRIMARY KEY,
            age INTEGER NOT NULL CHECK(age > 0),
            height_cm REAL NOT NULL CHECK(height_cm > 0),
            weight_kg REAL NOT NULL CHECK(weight_kg > 0),
            body_fat_percent REAL,               -- nullable, required only by body-fat based models
            gender TEXT NOT NULL CHECK(gender IN ('male', 'female')),
            activity_level TEXT NOT NULL CHECK(activity_level IN
                ('sedentary', 'light', 'moderate', 'active', 'very_active')),
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- ============================================
        -- FOODS
        -- Catalog items, nutrients stored per 100 grams
        -- ============================================
        CREATE TABLE foods (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            brand TEXT,
            calories REAL NOT NULL DEFAULT 0,
            protein REAL NOT NULL DEFAULT 0,
            carbs REAL NOT NULL DEFAULT 0,
            fat REAL NOT NULL DEFAULT 0,
            fiber REAL NOT NULL DEFAULT 0,
            notes TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_foods_name ON foods(name);

        -- ============================================
        -- RECIPES
        -- ============================================
        CREATE TABLE recipes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            notes TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_recipes_name ON recipes(name);

        -- No FK on food_id: a dangling ingredient must surface as an error
        -- at computation time, not be hidden by the schema.
        CREATE TABLE recipe_ingredients (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            recipe_id INTEGER NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
            food_id INTEGER NOT NULL,
            quantity_grams REAL NOT NULL CHECK(quantity_grams > 0),
            position INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_recipe_ingredients_recipe ON recipe_ingredients(recipe_id);

        -- ============================================
        -- DIARY ENTRIES
        -- Denormalized nutrient snapshot taken at write time
        -- ============================================
        CREATE TABLE diary_entries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            entry_date TEXT NOT NULL,            -- ISO date: "2025-01-09"
            meal_type TEXT NOT NULL CHECK(meal_type IN ('breakfast', 'lunch', 'dinner', 'snack', 'unspecified')),
            source_kind TEXT NOT NULL CHECK(source_kind IN ('food', 'recipe', 'inline')),

            food_id INTEGER,
            recipe_id INTEGER,

            -- Food, recipe or inline item name as it was when logged
            source_name TEXT NOT NULL,

            -- Inline items carry their own per-100g profile
            inline_calories REAL,
            inline_protein REAL,
            inline_carbs REAL,
            inline_fat REAL,
            inline_fiber REAL,

            quantity_grams REAL NOT NULL CHECK(quantity_grams > 0),

            snapshot_calories REAL NOT NULL,
            snapshot_protein REAL NOT NULL,
            snapshot_carbs REAL NOT NULL,
            snapshot_fat REAL NOT NULL,
            snapshot_fiber REAL NOT NULL,

            notes TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),

            CHECK ((source_kind = 'food' AND food_id IS NOT NULL AND recipe_id IS NULL) OR
                   (source_kind = 'recipe' AND recipe_id IS NOT NULL AND food_id IS NULL) OR
                   (source_kind = 'inline' AND inline_calories IS NOT NULL
                        AND food_id IS NULL AND recipe_id IS NULL))
        );

        CREATE INDEX idx_diary_entries_user_date ON diary_entries(user_id, entry_date);

        CREATE TABLE diary_entry_ingredients (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            entry_id INTEGER NOT NULL REFERENCES diary_entries(id) ON DELETE CASCADE,
            food_id INTEGER NOT NULL,
            food_name TEXT NOT NULL,
            quantity_grams REAL NOT NULL,
            calories REAL NOT NULL,
            protein REAL NOT NULL,
            carbs REAL NOT NULL,
            fat REAL NOT NULL,
            fiber REAL NOT NULL
        );

        CREATE INDEX idx_diary_entry_ingredients_entry ON diary_entry_ingredients(entry_id);

        -- ============================================
        -- NUTRITION GOALS
        -- ============================================
        CREATE TABLE nutrition_goals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            calories REAL NOT NULL,
            protein REAL NOT NULL,
            carbs REAL NOT NULL,
            fat REAL NOT NULL,
            fiber REAL NOT NULL DEFAULT 0,
            start_date TEXT NOT NULL,
            end_date TEXT,
            is_active INTEGER NOT NULL DEFAULT 0,
            diet_model_name TEXT,
            protocol_number INTEGER,
            phase_number INTEGER,
            expiration_date TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            CHECK (end_date IS NULL OR end_date >= start_date)
        );

        CREATE INDEX idx_nutrition_goals_user ON nutrition_goals(user_id, start_date);
        -- Backstop only; goal creation deactivates inside a write transaction.
        CREATE UNIQUE INDEX idx_nutrition_goals_one_active
            ON nutrition_goals(user_id) WHERE is_active = 1;
        "#,
    )?;

    Ok(())
}

/// Get the current schema version
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Check if the database needs migration
pub fn needs_migration(conn: &Connection) -> DbResult<bool> {
    let current = get_schema_version(conn)?;
    Ok(current < SCHEMA_VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
        assert!(!needs_migration(&conn).unwrap());
    }
}
