//! User profile model
//!
//! Anthropometric data used by the diet models, one row per user.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Some(Gender::Male),
            "female" | "f" => Some(Gender::Female),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    #[default]
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Light => "light",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::Active => "active",
            ActivityLevel::VeryActive => "very_active",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "sedentary" => Some(ActivityLevel::Sedentary),
            "light" | "lightly_active" => Some(ActivityLevel::Light),
            "moderate" | "moderately_active" => Some(ActivityLevel::Moderate),
            "active" => Some(ActivityLevel::Active),
            "very_active" | "very active" => Some(ActivityLevel::VeryActive),
            _ => None,
        }
    }
}

/// Anthropometric inputs for the diet calculators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnthropometricProfile {
    pub age: u32,
    pub height_cm: f64,
    pub weight_kg: f64,
    /// Exclusive (0, 100). Optional because only body-fat based models need it.
    pub body_fat_percent: Option<f64>,
    pub gender: Gender,
    #[serde(default)]
    pub activity_level: ActivityLevel,
}

/// A stored profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: i64,
    pub profile: AnthropometricProfile,
    pub created_at: String,
    pub updated_at: String,
}

impl UserProfile {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let gender: String = row.get("gender")?;
        let activity: String = row.get("activity_level")?;
        Ok(Self {
            user_id: row.get("user_id")?,
            profile: AnthropometricProfile {
                age: row.get("age")?,
                height_cm: row.get("height_cm")?,
                weight_kg: row.get("weight_kg")?,
                body_fat_percent: row.get("body_fat_percent")?,
                // CHECK constraints keep these columns to known values
                gender: Gender::parse(&gender).unwrap_or(Gender::Male),
                activity_level: ActivityLevel::parse(&activity).unwrap_or_default(),
            },
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    pub fn get(conn: &Connection, user_id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM user_profiles WHERE user_id = ?1")?;

        let result = stmt.query_row([user_id], Self::from_row);
        match result {
            Ok(profile) => Ok(Some(profile)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set or replace a user's profile (upsert)
    pub fn set(conn: &Connection, user_id: i64, profile: &AnthropometricProfile) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO user_profiles (
                user_id, age, height_cm, weight_kg, body_fat_percent, gender, activity_level
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(user_id) DO UPDATE SET
                age = excluded.age,
                height_cm = excluded.height_cm,
                weight_kg = excluded.weight_kg,
                body_fat_percent = excluded.body_fat_percent,
                gender = excluded.gender,
                activity_level = excluded.activity_level,
                updated_at = datetime('now')
            "#,
            params![
                user_id,
                profile.age,
                profile.height_cm,
                profile.weight_kg,
                profile.body_fat_percent,
                profile.gender.as_str(),
                profile.activity_level.as_str(),
            ],
        )?;

        Self::get(conn, user_id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn sample() -> AnthropometricProfile {
        AnthropometricProfile {
            age: 28,
            height_cm: 180.0,
            weight_kg: 75.0,
            body_fat_percent: Some(15.0),
            gender: Gender::Male,
            activity_level: ActivityLevel::Moderate,
        }
    }

    #[test]
    fn test_profile_upsert() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let stored = UserProfile::set(&conn, 7, &sample()).unwrap();
        assert_eq!(stored.profile, sample());

        let mut lighter = sample();
        lighter.weight_kg = 72.5;
        lighter.body_fat_percent = None;
        let updated = UserProfile::set(&conn, 7, &lighter).unwrap();
        assert_eq!(updated.profile.weight_kg, 72.5);
        assert_eq!(updated.profile.body_fat_percent, None);

        assert!(UserProfile::get(&conn, 8).unwrap().is_none());
    }

    #[test]
    fn test_activity_level_parse() {
        assert_eq!(ActivityLevel::parse("Very_Active"), Some(ActivityLevel::VeryActive));
        assert_eq!(ActivityLevel::parse("lightly_active"), Some(ActivityLevel::Light));
        assert_eq!(ActivityLevel::parse("couch"), None);
    }
}
