//! Diary tools
//!
//! Every write runs in one transaction: source lookup, snapshot computation
//! and the entry plus its recipe breakdown either all land or none do.

use chrono::NaiveDate;
use serde::Serialize;

use crate::db::Database;
use crate::error::{EngineError, EngineResult};
use crate::models::{DailySummary, DiaryEntry, DiaryEntryCreate, DiaryEntryUpdate};

/// Response for delete_diary_entry
#[derive(Debug, Serialize)]
pub struct DeleteDiaryEntryResponse {
    pub success: bool,
    pub deleted_id: i64,
}

/// Log a food, recipe portion or inline item
pub fn log_entry(db: &Database, data: DiaryEntryCreate) -> EngineResult<DiaryEntry> {
    db.with_transaction(|tx| DiaryEntry::create(tx, &data))
}

pub fn get_diary_entry(db: &Database, id: i64) -> EngineResult<DiaryEntry> {
    db.with_conn(|conn| Ok::<_, EngineError>(DiaryEntry::get_by_id(conn, id)?))?
        .ok_or_else(|| EngineError::NotFound(format!("Diary entry {}", id)))
}

/// Update date, meal, notes or quantity. A new quantity re-snapshots the
/// entry from its source's current values.
pub fn update_diary_entry(db: &Database, id: i64, data: DiaryEntryUpdate) -> EngineResult<DiaryEntry> {
    db.with_transaction(|tx| DiaryEntry::update(tx, id, &data))?
        .ok_or_else(|| EngineError::NotFound(format!("Diary entry {}", id)))
}

pub fn delete_diary_entry(db: &Database, id: i64) -> EngineResult<DeleteDiaryEntryResponse> {
    let deleted = db.with_transaction(|tx| Ok::<_, EngineError>(DiaryEntry::delete(tx, id)?))?;
    if !deleted {
        return Err(EngineError::NotFound(format!("Diary entry {}", id)));
    }
    tracing::info!(entry_id = id, "deleted diary entry");

    Ok(DeleteDiaryEntryResponse { success: true, deleted_id: id })
}

/// Totals for a day against the goal covering it
pub fn get_daily_summary(db: &Database, user_id: i64, date: NaiveDate) -> EngineResult<DailySummary> {
    db.with_conn(|conn| Ok::<_, EngineError>(DailySummary::for_date(conn, user_id, date)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DiarySource, FoodCreate, MealType};
    use crate::tools::foods::add_food;
    use crate::tools::parse_date;
    use crate::tools::test_support::database;

    fn egg(db: &Database) -> i64 {
        add_food(
            db,
            FoodCreate {
                name: "Egg".to_string(),
                brand: None,
                calories: 143.0,
                protein: 12.6,
                carbs: 0.7,
                fat: 9.5,
                fiber: 0.0,
                notes: None,
            },
        )
        .unwrap()
        .id
    }

    fn entry(food_id: i64, grams: f64) -> DiaryEntryCreate {
        DiaryEntryCreate {
            user_id: 1,
            entry_date: parse_date("2025-02-14").unwrap(),
            meal_type: MealType::Breakfast,
            source: DiarySource::Food { food_id },
            quantity_grams: grams,
            notes: None,
        }
    }

    #[test]
    fn test_log_update_delete() {
        let db = database();
        let food_id = egg(&db);

        let logged = log_entry(&db, entry(food_id, 100.0)).unwrap();
        assert_eq!(logged.nutrition.calories, 143.0);

        let update = DiaryEntryUpdate { quantity_grams: Some(50.0), ..Default::default() };
        let updated = update_diary_entry(&db, logged.id, update).unwrap();
        assert_eq!(updated.nutrition.calories, 71.5);
        assert_eq!(get_diary_entry(&db, logged.id).unwrap().quantity_grams, 50.0);

        delete_diary_entry(&db, logged.id).unwrap();
        assert!(matches!(get_diary_entry(&db, logged.id), Err(EngineError::NotFound(_))));
        assert!(matches!(delete_diary_entry(&db, logged.id), Err(EngineError::NotFound(_))));
    }

    #[test]
    fn test_failed_update_keeps_snapshot() {
        let db = database();
        let logged = log_entry(&db, entry(egg(&db), 100.0)).unwrap();

        let bad = DiaryEntryUpdate {
            quantity_grams: Some(-10.0),
            notes: Some("oops".into()),
            ..Default::default()
        };
        assert!(matches!(update_diary_entry(&db, logged.id, bad), Err(EngineError::InvalidQuantity(_))));

        let reloaded = get_diary_entry(&db, logged.id).unwrap();
        assert_eq!(reloaded.nutrition.calories, 143.0);
        assert!(reloaded.notes.is_none());
    }

    #[test]
    fn test_summary_for_empty_day() {
        let db = database();
        let summary = get_daily_summary(&db, 1, parse_date("2025-02-14").unwrap()).unwrap();
        assert_eq!(summary.entry_count, 0);
        assert_eq!(summary.totals.calories, 0.0);
        assert!(summary.by_meal.is_empty());
    }
}
