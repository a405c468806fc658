//! Diet calculation and goal tools
//!
//! Calculations read the user's stored profile. Goal writes go through
//! [`GoalLifecycleManager`] so the single-active-goal rule always holds.

use chrono::NaiveDate;
use serde::Serialize;

use super::clamp_limit;
use super::profiles::get_profile;
use crate::db::Database;
use crate::diet::{compute_recommendation, DietModelRegistry, DietResult, Recommendation};
use crate::error::EngineResult;
use crate::goals::GoalLifecycleManager;
use crate::models::{NutritionGoal, NutritionGoalCreate};

#[derive(Debug, Serialize)]
pub struct ProtocolInfo {
    pub number: u32,
    pub name: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DietModelInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub protocols: Vec<ProtocolInfo>,
}

/// Response for recommend_goal
#[derive(Debug, Serialize)]
pub struct RecommendGoalResponse {
    pub user_id: i64,
    pub current_weight_kg: f64,
    pub target_weight_kg: Option<f64>,
    pub weeks_to_goal: Option<u32>,
    pub recommendation: Recommendation,
    /// Set when the recommendation was saved as the active goal
    pub created_goal: Option<NutritionGoal>,
}

pub fn list_diet_models(registry: &DietModelRegistry) -> Vec<DietModelInfo> {
    registry
        .models()
        .map(|model| DietModelInfo {
            name: model.name(),
            description: model.description(),
            protocols: (1..=model.protocol_count())
                .filter_map(|number| {
                    model
                        .protocol_name(number)
                        .map(|name| ProtocolInfo { number, name })
                })
                .collect(),
        })
        .collect()
}

/// Run a diet model protocol against the user's stored profile
pub fn calculate_diet(
    db: &Database,
    registry: &DietModelRegistry,
    user_id: i64,
    model_name: &str,
    protocol: u32,
) -> EngineResult<DietResult> {
    let stored = get_profile(db, user_id)?;
    let result = registry.calculate(model_name, &stored.profile, protocol)?;
    Ok(result.rounded())
}

/// Recommend targets from the stored profile. With `create_from` set, the
/// recommendation also becomes the active goal starting that day.
pub fn recommend_goal(
    db: &Database,
    manager: &GoalLifecycleManager,
    user_id: i64,
    target_weight: Option<f64>,
    weeks_to_goal: Option<u32>,
    create_from: Option<NaiveDate>,
) -> EngineResult<RecommendGoalResponse> {
    let stored = get_profile(db, user_id)?;
    let recommendation = compute_recommendation(&stored.profile, target_weight, weeks_to_goal)?;

    if recommendation.adjustment_capped {
        tracing::info!(
            user_id,
            daily_adjustment = recommendation.daily_adjustment,
            "requested pace capped"
        );
    }

    let created_goal = match create_from {
        Some(start) => Some(manager.create_goal(&NutritionGoalCreate::from_recommendation(
            user_id,
            &recommendation,
            start,
        ))?),
        None => None,
    };

    Ok(RecommendGoalResponse {
        user_id,
        current_weight_kg: stored.profile.weight_kg,
        target_weight_kg: target_weight,
        weeks_to_goal,
        recommendation,
        created_goal,
    })
}

pub fn create_goal(manager: &GoalLifecycleManager, data: NutritionGoalCreate) -> EngineResult<NutritionGoal> {
    manager.create_goal(&data)
}

/// Turn one phase of a model protocol into the active goal
pub fn create_protocol_goal(
    db: &Database,
    manager: &GoalLifecycleManager,
    user_id: i64,
    model_name: &str,
    protocol: u32,
    phase: u32,
    start_date: NaiveDate,
) -> EngineResult<NutritionGoal> {
    let stored = get_profile(db, user_id)?;
    manager.create_goal_from_protocol(user_id, &stored.profile, model_name, protocol, phase, start_date)
}

pub fn get_active_goal(manager: &GoalLifecycleManager, user_id: i64) -> EngineResult<NutritionGoal> {
    manager.get_active_goal(user_id)
}

pub fn get_goal_for_date(
    manager: &GoalLifecycleManager,
    user_id: i64,
    date: NaiveDate,
) -> EngineResult<NutritionGoal> {
    manager.get_goal_for_date(user_id, date)
}

pub fn list_goals(manager: &GoalLifecycleManager, user_id: i64, limit: i64) -> EngineResult<Vec<NutritionGoal>> {
    manager.list_goals(user_id, clamp_limit(limit, 200))
}
