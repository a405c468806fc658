//! Goal lifecycle
//!
//! Creating a goal deactivates every other goal of the same user in the same
//! IMMEDIATE transaction, so at most one goal per user is ever active, even
//! with concurrent writers.

use chrono::{Duration, NaiveDate};

use crate::db::Database;
use crate::diet::{recommendation::fiber_target, DietModelRegistry};
use crate::error::{EngineError, EngineResult};
use crate::models::{round2, AnthropometricProfile, NutritionGoal, NutritionGoalCreate};

#[derive(Clone)]
pub struct GoalLifecycleManager {
    database: Database,
    registry: DietModelRegistry,
}

fn validate_goal(goal: &NutritionGoalCreate) -> EngineResult<()> {
    if !(goal.calories.is_finite() && goal.calories > 0.0) {
        return Err(EngineError::validation("goal calories must be greater than 0"));
    }
    for (name, value) in [
        ("protein", goal.protein),
        ("carbs", goal.carbs),
        ("fat", goal.fat),
        ("fiber", goal.fiber),
    ] {
        if !(value.is_finite() && value >= 0.0) {
            return Err(EngineError::validation(format!("goal {} cannot be negative", name)));
        }
    }
    if let Some(end) = goal.end_date {
        if end < goal.start_date {
            return Err(EngineError::validation("goal end date is before its start date"));
        }
    }
    Ok(())
}

impl GoalLifecycleManager {
    pub fn new(database: Database, registry: DietModelRegistry) -> Self {
        Self { database, registry }
    }

    pub fn registry(&self) -> &DietModelRegistry {
        &self.registry
    }

    /// Deactivate the user's current goals and insert `goal` as the active one
    pub fn create_goal(&self, goal: &NutritionGoalCreate) -> EngineResult<NutritionGoal> {
        validate_goal(goal)?;

        self.database.with_transaction(|tx| {
            let deactivated = NutritionGoal::deactivate_all(tx, goal.user_id)?;
            let created = NutritionGoal::insert_active(tx, goal)?;
            tracing::info!(
                user_id = goal.user_id,
                goal_id = created.id,
                deactivated,
                "created nutrition goal"
            );
            Ok(created)
        })
    }

    pub fn get_active_goal(&self, user_id: i64) -> EngineResult<NutritionGoal> {
        self.database
            .with_conn(|conn| Ok::<_, EngineError>(NutritionGoal::get_active(conn, user_id)?))?
            .ok_or_else(|| EngineError::NotFound(format!("Active goal for user {}", user_id)))
    }

    pub fn get_goal_for_date(&self, user_id: i64, date: NaiveDate) -> EngineResult<NutritionGoal> {
        self.database
            .with_conn(|conn| Ok::<_, EngineError>(NutritionGoal::get_for_date(conn, user_id, date)?))?
            .ok_or_else(|| EngineError::NotFound(format!("Goal for user {} on {}", user_id, date)))
    }

    pub fn list_goals(&self, user_id: i64, limit: i64) -> EngineResult<Vec<NutritionGoal>> {
        self.database
            .with_conn(|conn| Ok(NutritionGoal::list_for_user(conn, user_id, limit)?))
    }

    /// Run a diet model and turn one of its phases into the active goal.
    ///
    /// The goal records which model, protocol and phase produced it, and
    /// expires when the phase's duration has elapsed.
    pub fn create_goal_from_protocol(
        &self,
        user_id: i64,
        profile: &AnthropometricProfile,
        model_name: &str,
        protocol: u32,
        phase: u32,
        start_date: NaiveDate,
    ) -> EngineResult<NutritionGoal> {
        let result = self.registry.calculate(model_name, profile, protocol)?;
        let selected = result.phase(phase).ok_or_else(|| {
            EngineError::validation(format!(
                "phase must be between 1 and {} for protocol {}, got {}",
                result.phases.len(),
                protocol,
                phase
            ))
        })?;

        let expiration = start_date
            .checked_add_signed(Duration::weeks(i64::from(selected.duration_weeks)))
            .ok_or_else(|| {
                EngineError::validation(format!(
                    "start date {} plus {} weeks is out of range",
                    start_date, selected.duration_weeks
                ))
            })?;

        let goal = NutritionGoalCreate {
            user_id,
            calories: round2(selected.calories),
            protein: round2(selected.protein),
            carbs: round2(selected.carbs),
            fat: round2(selected.fat),
            fiber: round2(fiber_target(selected.calories)),
            start_date,
            end_date: None,
            diet_model_name: Some(result.model.clone()),
            protocol_number: Some(protocol),
            phase_number: Some(phase),
            expiration_date: Some(expiration),
        };

        self.create_goal(&goal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::{ActivityLevel, Gender};

    fn manager() -> GoalLifecycleManager {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| run_migrations(conn)).unwrap();
        GoalLifecycleManager::new(db, DietModelRegistry::default())
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn goal(user_id: i64, calories: f64, start: &str, end: Option<&str>) -> NutritionGoalCreate {
        NutritionGoalCreate {
            user_id,
            calories,
            protein: 150.0,
            carbs: 200.0,
            fat: 70.0,
            fiber: 30.0,
            start_date: date(start),
            end_date: end.map(date),
            diet_model_name: None,
            protocol_number: None,
            phase_number: None,
            expiration_date: None,
        }
    }

    #[test]
    fn test_three_goals_leave_only_the_last_active() {
        let m = manager();
        m.create_goal(&goal(1, 2000.0, "2025-01-01", None)).unwrap();
        m.create_goal(&goal(1, 2100.0, "2025-02-01", None)).unwrap();
        let third = m.create_goal(&goal(1, 2200.0, "2025-03-01", None)).unwrap();

        let goals = m.list_goals(1, 10).unwrap();
        let active: Vec<_> = goals.iter().filter(|g| g.is_active).collect();
        assert_eq!(goals.len(), 3);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, third.id);
        assert_eq!(m.get_active_goal(1).unwrap().calories, 2200.0);
    }

    #[test]
    fn test_users_are_independent() {
        let m = manager();
        m.create_goal(&goal(1, 2000.0, "2025-01-01", None)).unwrap();
        m.create_goal(&goal(2, 1800.0, "2025-01-01", None)).unwrap();
        assert!(m.get_active_goal(1).is_ok());
        assert!(m.get_active_goal(2).is_ok());
        assert!(matches!(m.get_active_goal(3), Err(EngineError::NotFound(_))));
    }

    #[test]
    fn test_goal_for_date_boundaries_are_inclusive() {
        let m = manager();
        let january = m.create_goal(&goal(1, 2000.0, "2025-01-01", Some("2025-01-31"))).unwrap();
        m.create_goal(&goal(1, 2500.0, "2025-03-01", None)).unwrap();

        assert_eq!(m.get_goal_for_date(1, date("2025-01-01")).unwrap().id, january.id);
        assert_eq!(m.get_goal_for_date(1, date("2025-01-31")).unwrap().id, january.id);
        assert!(matches!(m.get_goal_for_date(1, date("2025-02-01")), Err(EngineError::NotFound(_))));
        assert!(matches!(m.get_goal_for_date(1, date("2024-12-31")), Err(EngineError::NotFound(_))));
        // Open-ended goal covers everything after its start
        assert_eq!(m.get_goal_for_date(1, date("2030-06-15")).unwrap().calories, 2500.0);
    }

    #[test]
    fn test_overlapping_goals_prefer_the_active_one() {
        let m = manager();
        m.create_goal(&goal(1, 2500.0, "2025-06-01", None)).unwrap();
        // Starts earlier but is created last, so it is the active goal
        let active = m.create_goal(&goal(1, 1800.0, "2025-01-01", None)).unwrap();

        let on_date = m.get_goal_for_date(1, date("2025-07-01")).unwrap();
        assert_eq!(on_date.id, active.id);
        assert_eq!(on_date.calories, 1800.0);
    }

    #[test]
    fn test_overlapping_inactive_goals_prefer_latest_start_then_newest() {
        let m = manager();
        let early = m.create_goal(&goal(1, 2000.0, "2025-01-01", Some("2025-12-31"))).unwrap();
        let later = m.create_goal(&goal(1, 2100.0, "2025-03-01", Some("2025-12-31"))).unwrap();
        let same_start = m.create_goal(&goal(1, 2200.0, "2025-03-01", Some("2025-12-31"))).unwrap();
        // Active goal that does not cover the dates below
        m.create_goal(&goal(1, 2400.0, "2026-01-01", None)).unwrap();

        // Two inactive goals start on 2025-03-01; the newer row wins
        let picked = m.get_goal_for_date(1, date("2025-04-15")).unwrap();
        assert_eq!(picked.id, same_start.id);
        assert_ne!(picked.id, later.id);
        assert!(!picked.is_active);

        // Only the earliest goal covers February
        assert_eq!(m.get_goal_for_date(1, date("2025-02-10")).unwrap().id, early.id);
    }

    #[test]
    fn test_protocol_goal_rejects_out_of_range_start() {
        let m = manager();
        let profile = AnthropometricProfile {
            age: 28,
            height_cm: 180.0,
            weight_kg: 75.0,
            body_fat_percent: Some(15.0),
            gender: Gender::Male,
            activity_level: ActivityLevel::Moderate,
        };

        assert!(matches!(
            m.create_goal_from_protocol(1, &profile, "lean_mass", 1, 1, NaiveDate::MAX),
            Err(EngineError::Validation(_))
        ));
        assert!(matches!(m.get_active_goal(1), Err(EngineError::NotFound(_))));
    }

    #[test]
    fn test_invalid_goal_changes_nothing() {
        let m = manager();
        m.create_goal(&goal(1, 2000.0, "2025-01-01", None)).unwrap();
        assert!(m.create_goal(&goal(1, 0.0, "2025-02-01", None)).is_err());
        assert!(m.create_goal(&goal(1, 2000.0, "2025-02-01", Some("2025-01-01"))).is_err());
        assert_eq!(m.get_active_goal(1).unwrap().calories, 2000.0);
    }

    #[test]
    fn test_protocol_goal_records_origin() {
        let m = manager();
        let profile = AnthropometricProfile {
            age: 28,
            height_cm: 180.0,
            weight_kg: 75.0,
            body_fat_percent: Some(15.0),
            gender: Gender::Male,
            activity_level: ActivityLevel::Moderate,
        };

        let created = m
            .create_goal_from_protocol(1, &profile, "lean_mass", 1, 2, date("2025-01-06"))
            .unwrap();
        assert_eq!(created.diet_model_name.as_deref(), Some("lean_mass"));
        assert_eq!(created.protocol_number, Some(1));
        assert_eq!(created.phase_number, Some(2));
        // Fat loss phase 2 runs 8 weeks
        assert_eq!(created.expiration_date, Some(date("2025-03-03")));
        assert!((created.calories - 2163.95).abs() < 0.01);

        assert!(matches!(
            m.create_goal_from_protocol(1, &profile, "lean_mass", 1, 3, date("2025-01-06")),
            Err(EngineError::Validation(_))
        ));
        assert!(matches!(
            m.create_goal_from_protocol(1, &profile, "keto", 1, 1, date("2025-01-06")),
            Err(EngineError::UnsupportedModel(_))
        ));
        assert_eq!(m.get_active_goal(1).unwrap().id, created.id);
    }

    #[test]
    fn test_concurrent_creates_keep_one_active() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("goals.db")).unwrap();
        db.with_conn(|conn| run_migrations(conn)).unwrap();
        let m = GoalLifecycleManager::new(db, DietModelRegistry::default());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let m = m.clone();
                std::thread::spawn(move || {
                    for j in 0..5 {
                        let calories = 1800.0 + (i * 10 + j) as f64;
                        m.create_goal(&goal(42, calories, "2025-01-01", None)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let goals = m.list_goals(42, 100).unwrap();
        assert_eq!(goals.len(), 40);
        assert_eq!(goals.iter().filter(|g| g.is_active).count(), 1);

        let active = m
            .database
            .with_conn(|conn| NutritionGoal::count_active(conn, 42))
            .unwrap();
        assert_eq!(active, 1);
    }
}
