//! Nutrition goal model
//!
//! Row-level access to `nutrition_goals`. The single-active-goal rule is
//! enforced by `GoalLifecycleManager`, which calls these inside one
//! write transaction.

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;
use crate::diet::Recommendation;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionGoal {
    pub id: i64,
    pub user_id: i64,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: f64,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
    pub diet_model_name: Option<String>,
    pub protocol_number: Option<u32>,
    pub phase_number: Option<u32>,
    pub expiration_date: Option<NaiveDate>,
    pub created_at: String,
}

/// Data for a new goal. New goals are always created active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionGoalCreate {
    pub user_id: i64,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    #[serde(default)]
    pub fiber: f64,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub diet_model_name: Option<String>,
    #[serde(default)]
    pub protocol_number: Option<u32>,
    #[serde(default)]
    pub phase_number: Option<u32>,
    #[serde(default)]
    pub expiration_date: Option<NaiveDate>,
}

impl NutritionGoalCreate {
    /// A manual goal taken straight from a recommendation
    pub fn from_recommendation(user_id: i64, rec: &Recommendation, start_date: NaiveDate) -> Self {
        Self {
            user_id,
            calories: rec.calories,
            protein: rec.protein,
            carbs: rec.carbs,
            fat: rec.fat,
            fiber: rec.fiber,
            start_date,
            end_date: None,
            diet_model_name: None,
            protocol_number: None,
            phase_number: None,
            expiration_date: None,
        }
    }
}

impl NutritionGoal {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            calories: row.get("calories")?,
            protein: row.get("protein")?,
            carbs: row.get("carbs")?,
            fat: row.get("fat")?,
            fiber: row.get("fiber")?,
            start_date: row.get("start_date")?,
            end_date: row.get("end_date")?,
            is_active: row.get::<_, i32>("is_active")? != 0,
            diet_model_name: row.get("diet_model_name")?,
            protocol_number: row.get("protocol_number")?,
            phase_number: row.get("phase_number")?,
            expiration_date: row.get("expiration_date")?,
            created_at: row.get("created_at")?,
        })
    }

    /// Clear the active flag on every goal of a user. Returns rows changed.
    pub fn deactivate_all(conn: &Connection, user_id: i64) -> DbResult<usize> {
        let rows = conn.execute(
            "UPDATE nutrition_goals SET is_active = 0 WHERE user_id = ?1 AND is_active = 1",
            [user_id],
        )?;
        Ok(rows)
    }

    /// Insert a goal with `is_active = 1`
    pub fn insert_active(conn: &Connection, data: &NutritionGoalCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO nutrition_goals (
                user_id, calories, protein, carbs, fat, fiber,
                start_date, end_date, is_active,
                diet_model_name, protocol_number, phase_number, expiration_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 1, ?9, ?10, ?11, ?12)
            "#,
            params![
                data.user_id,
                data.calories,
                data.protein,
                data.carbs,
                data.fat,
                data.fiber,
                data.start_date,
                data.end_date,
                data.diet_model_name,
                data.protocol_number,
                data.phase_number,
                data.expiration_date,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let goal = conn
            .query_row("SELECT * FROM nutrition_goals WHERE id = ?1", [id], Self::from_row)
            .optional()?;
        Ok(goal)
    }

    pub fn get_active(conn: &Connection, user_id: i64) -> DbResult<Option<Self>> {
        let goal = conn
            .query_row(
                "SELECT * FROM nutrition_goals WHERE user_id = ?1 AND is_active = 1",
                [user_id],
                Self::from_row,
            )
            .optional()?;
        Ok(goal)
    }

    /// The goal whose inclusive `[start_date, end_date]` range contains
    /// `date`. Ties go to the active goal, then the latest start, then the
    /// newest row.
    pub fn get_for_date(conn: &Connection, user_id: i64, date: NaiveDate) -> DbResult<Option<Self>> {
        let goal = conn
            .query_row(
                r#"
                SELECT * FROM nutrition_goals
                WHERE user_id = ?1
                  AND start_date <= ?2
                  AND (end_date IS NULL OR end_date >= ?2)
                ORDER BY is_active DESC, start_date DESC, id DESC
                LIMIT 1
                "#,
                params![user_id, date],
                Self::from_row,
            )
            .optional()?;
        Ok(goal)
    }

    /// All goals of a user, newest first
    pub fn list_for_user(conn: &Connection, user_id: i64, limit: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM nutrition_goals WHERE user_id = ?1 ORDER BY start_date DESC, id DESC LIMIT ?2",
        )?;

        let goals = stmt
            .query_map(params![user_id, limit], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(goals)
    }

    pub fn count_active(conn: &Connection, user_id: i64) -> DbResult<i64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM nutrition_goals WHERE user_id = ?1 AND is_active = 1",
            [user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
