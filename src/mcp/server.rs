//! macrotrack MCP Server Implementation
//!
//! Implements the MCP server with all macrotrack tools.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};

use crate::db::Database;
use crate::diet::DietModelRegistry;
use crate::error::EngineError;
use crate::goals::GoalLifecycleManager;
use crate::models::{
    ActivityLevel, AnthropometricProfile, DiaryEntryCreate, DiaryEntryUpdate, DiarySource,
    FoodCreate, FoodUpdate, Gender, IngredientInput, MealType, NutrientProfile, Nutrition,
    NutritionGoalCreate, RecipeCreate,
};
use crate::nutrition::to_grams;
use crate::tools::status::StatusTracker;
use crate::tools::{diary, foods, goals, parse_date, profiles, recipes};

/// macrotrack MCP Service
#[derive(Clone)]
pub struct MacrotrackService {
    status_tracker: Arc<StatusTracker>,
    database: Database,
    goals: GoalLifecycleManager,
    tool_router: ToolRouter<MacrotrackService>,
}

impl MacrotrackService {
    pub fn new(database_path: PathBuf, database: Database, registry: DietModelRegistry) -> Self {
        Self {
            status_tracker: Arc::new(StatusTracker::new(database_path)),
            goals: GoalLifecycleManager::new(database.clone(), registry),
            database,
            tool_router: Self::tool_router(),
        }
    }
}

/// Map engine errors onto MCP error codes
fn to_mcp_error(e: EngineError) -> McpError {
    match e {
        EngineError::NotFound(_) => McpError::resource_not_found(e.to_string(), None),
        e if e.is_caller_error() => McpError::invalid_params(e.to_string(), None),
        e => {
            tracing::error!(error = %e, "tool failed");
            McpError::internal_error(e.to_string(), None)
        }
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn date_param(value: &str) -> Result<chrono::NaiveDate, McpError> {
    parse_date(value).map_err(to_mcp_error)
}

fn grams_param(quantity: f64, unit: &str) -> Result<f64, McpError> {
    to_grams(quantity, unit).map_err(to_mcp_error)
}

fn meal_type_param(value: Option<&str>) -> Result<Option<MealType>, McpError> {
    value
        .map(|v| {
            MealType::parse(v).ok_or_else(|| {
                McpError::invalid_params(
                    format!("unknown meal type '{}': use breakfast, lunch, dinner, snack or unspecified", v),
                    None,
                )
            })
        })
        .transpose()
}

fn default_unit() -> String { "g".to_string() }
fn default_search_limit() -> i64 { 20 }
fn default_model() -> String { "lean_mass".to_string() }

// ============================================================================
// Profile Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetProfileParams {
    pub user_id: i64,
    pub age: u32,
    pub height_cm: f64,
    pub weight_kg: f64,
    /// Required only by body-fat based diet models
    pub body_fat_percent: Option<f64>,
    /// "male" or "female"
    pub gender: String,
    /// sedentary, light, moderate, active, very_active (default moderate)
    pub activity_level: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UserParams {
    pub user_id: i64,
}

// ============================================================================
// Food Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddFoodParams {
    pub name: String,
    pub brand: Option<String>,
    /// Per 100 g
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    #[serde(default)]
    pub fiber: f64,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct IdParams {
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchFoodsParams {
    pub query: String,
    #[serde(default = "default_search_limit")]
    pub limit: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateFoodParams {
    pub id: i64,
    pub name: Option<String>,
    pub brand: Option<String>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub fiber: Option<f64>,
    pub notes: Option<String>,
}

// ============================================================================
// Recipe Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct IngredientParams {
    pub food_id: i64,
    pub quantity: f64,
    /// g, kg, oz, lb or an annotated unit like "cup (240g)"
    #[serde(default = "default_unit")]
    pub unit: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateRecipeParams {
    pub name: String,
    pub notes: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<IngredientParams>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddRecipeIngredientParams {
    pub recipe_id: i64,
    pub food_id: i64,
    pub quantity: f64,
    #[serde(default = "default_unit")]
    pub unit: String,
}

// ============================================================================
// Diary Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LogFoodParams {
    pub user_id: i64,
    /// YYYY-MM-DD
    pub date: String,
    /// breakfast, lunch, dinner, snack
    pub meal_type: Option<String>,
    pub food_id: i64,
    pub quantity: f64,
    #[serde(default = "default_unit")]
    pub unit: String,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LogRecipeParams {
    pub user_id: i64,
    pub date: String,
    pub meal_type: Option<String>,
    pub recipe_id: i64,
    /// Amount of the finished dish eaten
    pub quantity: f64,
    #[serde(default = "default_unit")]
    pub unit: String,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LogInlineParams {
    pub user_id: i64,
    pub date: String,
    pub meal_type: Option<String>,
    pub name: String,
    /// Per 100 g
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    #[serde(default)]
    pub fiber: f64,
    pub quantity: f64,
    #[serde(default = "default_unit")]
    pub unit: String,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateDiaryEntryParams {
    pub id: i64,
    pub date: Option<String>,
    pub meal_type: Option<String>,
    /// A new quantity recomputes the entry from the source's current values
    pub quantity: Option<f64>,
    #[serde(default = "default_unit")]
    pub unit: String,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UserDateParams {
    pub user_id: i64,
    /// YYYY-MM-DD
    pub date: String,
}

// ============================================================================
// Diet and Goal Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CalculateDietParams {
    pub user_id: i64,
    #[serde(default = "default_model")]
    pub model: String,
    pub protocol: u32,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RecommendGoalParams {
    pub user_id: i64,
    pub target_weight_kg: Option<f64>,
    pub weeks_to_goal: Option<u32>,
    /// When set, the recommendation is saved as the active goal from this date
    pub start_date: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateGoalParams {
    pub user_id: i64,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    #[serde(default)]
    pub fiber: f64,
    pub start_date: String,
    /// Inclusive; omit for an open-ended goal
    pub end_date: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateProtocolGoalParams {
    pub user_id: i64,
    #[serde(default = "default_model")]
    pub model: String,
    pub protocol: u32,
    pub phase: u32,
    pub start_date: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListGoalsParams {
    pub user_id: i64,
    #[serde(default = "default_search_limit")]
    pub limit: i64,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl MacrotrackService {
    // --- Status ---

    #[tool(description = "Get the current status of the engine including build info, database status, registered diet models and process information")]
    fn engine_status(&self) -> Result<CallToolResult, McpError> {
        let status = self.status_tracker.get_status(self.goals.registry().names());
        json_result(&status)
    }

    #[tool(description = "Get instructions for logging food and managing goals. Call this when starting a logging session.")]
    fn logging_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::LOGGING_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(LOGGING_INSTRUCTIONS)]))
    }

    // --- Profiles ---

    #[tool(description = "Set or replace a user's profile: age, height, weight, gender, activity level and optional body fat percentage")]
    fn set_profile(&self, Parameters(p): Parameters<SetProfileParams>) -> Result<CallToolResult, McpError> {
        let gender = Gender::parse(&p.gender).ok_or_else(|| {
            McpError::invalid_params(format!("gender must be 'male' or 'female', got '{}'", p.gender), None)
        })?;
        let activity_level = match p.activity_level.as_deref() {
            Some(level) => ActivityLevel::parse(level).ok_or_else(|| {
                McpError::invalid_params(format!("unknown activity level '{}'", level), None)
            })?,
            None => ActivityLevel::default(),
        };
        let profile = AnthropometricProfile {
            age: p.age,
            height_cm: p.height_cm,
            weight_kg: p.weight_kg,
            body_fat_percent: p.body_fat_percent,
            gender,
            activity_level,
        };
        let result = profiles::set_profile(&self.database, p.user_id, profile).map_err(to_mcp_error)?;
        json_result(&result)
    }

    #[tool(description = "Get a user's stored profile")]
    fn get_profile(&self, Parameters(p): Parameters<UserParams>) -> Result<CallToolResult, McpError> {
        let result = profiles::get_profile(&self.database, p.user_id).map_err(to_mcp_error)?;
        json_result(&result)
    }

    // --- Foods ---

    #[tool(description = "Add a catalog food with nutrients per 100 g")]
    fn add_food(&self, Parameters(p): Parameters<AddFoodParams>) -> Result<CallToolResult, McpError> {
        let data = FoodCreate {
            name: p.name, brand: p.brand,
            calories: p.calories, protein: p.protein, carbs: p.carbs, fat: p.fat, fiber: p.fiber,
            notes: p.notes,
        };
        let result = foods::add_food(&self.database, data).map_err(to_mcp_error)?;
        json_result(&result)
    }

    #[tool(description = "Get a food with its per-100g nutrients")]
    fn get_food(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let result = foods::get_food(&self.database, p.id).map_err(to_mcp_error)?;
        json_result(&result)
    }

    #[tool(description = "Search foods by name or brand")]
    fn search_foods(&self, Parameters(p): Parameters<SearchFoodsParams>) -> Result<CallToolResult, McpError> {
        let result = foods::search_foods(&self.database, &p.query, p.limit).map_err(to_mcp_error)?;
        json_result(&result)
    }

    #[tool(description = "Update a food. Diary entries already logged keep their original nutrients.")]
    fn update_food(&self, Parameters(p): Parameters<UpdateFoodParams>) -> Result<CallToolResult, McpError> {
        let data = FoodUpdate {
            name: p.name, brand: p.brand,
            calories: p.calories, protein: p.protein, carbs: p.carbs, fat: p.fat, fiber: p.fiber,
            notes: p.notes,
        };
        let result = foods::update_food(&self.database, p.id, data).map_err(to_mcp_error)?;
        json_result(&result)
    }

    // --- Recipes ---

    #[tool(description = "Create a recipe from catalog foods and their quantities")]
    fn create_recipe(&self, Parameters(p): Parameters<CreateRecipeParams>) -> Result<CallToolResult, McpError> {
        let ingredients = p
            .ingredients
            .iter()
            .map(|i| -> Result<IngredientInput, McpError> {
                Ok(IngredientInput { food_id: i.food_id, quantity_grams: grams_param(i.quantity, &i.unit)? })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let data = RecipeCreate { name: p.name, notes: p.notes, ingredients };
        let result = recipes::create_recipe(&self.database, data).map_err(to_mcp_error)?;
        json_result(&result)
    }

    #[tool(description = "Append an ingredient to a recipe")]
    fn add_recipe_ingredient(&self, Parameters(p): Parameters<AddRecipeIngredientParams>) -> Result<CallToolResult, McpError> {
        let ingredient = IngredientInput { food_id: p.food_id, quantity_grams: grams_param(p.quantity, &p.unit)? };
        let result = recipes::add_recipe_ingredient(&self.database, p.recipe_id, ingredient).map_err(to_mcp_error)?;
        json_result(&result)
    }

    #[tool(description = "Get a recipe with its ingredients, total weight and nutrition from current food values")]
    fn get_recipe(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::get_recipe(&self.database, p.id).map_err(to_mcp_error)?;
        json_result(&result)
    }

    // --- Diary ---

    #[tool(description = "Log a quantity of a catalog food")]
    fn log_food(&self, Parameters(p): Parameters<LogFoodParams>) -> Result<CallToolResult, McpError> {
        let data = DiaryEntryCreate {
            user_id: p.user_id,
            entry_date: date_param(&p.date)?,
            meal_type: meal_type_param(p.meal_type.as_deref())?.unwrap_or_default(),
            source: DiarySource::Food { food_id: p.food_id },
            quantity_grams: grams_param(p.quantity, &p.unit)?,
            notes: p.notes,
        };
        let result = diary::log_entry(&self.database, data).map_err(to_mcp_error)?;
        json_result(&result)
    }

    #[tool(description = "Log a portion of a recipe. The quantity is how much of the finished dish was eaten; each ingredient is scaled proportionally.")]
    fn log_recipe(&self, Parameters(p): Parameters<LogRecipeParams>) -> Result<CallToolResult, McpError> {
        let data = DiaryEntryCreate {
            user_id: p.user_id,
            entry_date: date_param(&p.date)?,
            meal_type: meal_type_param(p.meal_type.as_deref())?.unwrap_or_default(),
            source: DiarySource::Recipe { recipe_id: p.recipe_id },
            quantity_grams: grams_param(p.quantity, &p.unit)?,
            notes: p.notes,
        };
        let result = diary::log_entry(&self.database, data).map_err(to_mcp_error)?;
        json_result(&result)
    }

    #[tool(description = "Log a one-off item with its own per-100g nutrients, without adding it to the catalog")]
    fn log_inline(&self, Parameters(p): Parameters<LogInlineParams>) -> Result<CallToolResult, McpError> {
        let per_100g = NutrientProfile::per_100g(Nutrition {
            calories: p.calories, protein: p.protein, carbs: p.carbs, fat: p.fat, fiber: p.fiber,
        });
        let data = DiaryEntryCreate {
            user_id: p.user_id,
            entry_date: date_param(&p.date)?,
            meal_type: meal_type_param(p.meal_type.as_deref())?.unwrap_or_default(),
            source: DiarySource::Inline { name: p.name, per_100g },
            quantity_grams: grams_param(p.quantity, &p.unit)?,
            notes: p.notes,
        };
        let result = diary::log_entry(&self.database, data).map_err(to_mcp_error)?;
        json_result(&result)
    }

    #[tool(description = "Get a diary entry with its stored nutrients and recipe breakdown")]
    fn get_diary_entry(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let result = diary::get_diary_entry(&self.database, p.id).map_err(to_mcp_error)?;
        json_result(&result)
    }

    #[tool(description = "Update a diary entry's date, meal, notes or quantity. A quantity change recomputes nutrients from the source's current values.")]
    fn update_diary_entry(&self, Parameters(p): Parameters<UpdateDiaryEntryParams>) -> Result<CallToolResult, McpError> {
        let data = DiaryEntryUpdate {
            entry_date: p.date.as_deref().map(date_param).transpose()?,
            meal_type: meal_type_param(p.meal_type.as_deref())?,
            quantity_grams: p.quantity.map(|q| grams_param(q, &p.unit)).transpose()?,
            notes: p.notes,
        };
        let result = diary::update_diary_entry(&self.database, p.id, data).map_err(to_mcp_error)?;
        json_result(&result)
    }

    #[tool(description = "Delete a diary entry")]
    fn delete_diary_entry(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let result = diary::delete_diary_entry(&self.database, p.id).map_err(to_mcp_error)?;
        json_result(&result)
    }

    #[tool(description = "Get a day's entries, totals per meal and overall, and what remains of the goal in effect that day")]
    fn get_daily_summary(&self, Parameters(p): Parameters<UserDateParams>) -> Result<CallToolResult, McpError> {
        let date = date_param(&p.date)?;
        let result = diary::get_daily_summary(&self.database, p.user_id, date).map_err(to_mcp_error)?;
        json_result(&result)
    }

    // --- Diet models ---

    #[tool(description = "List registered diet models and their protocols")]
    fn list_diet_models(&self) -> Result<CallToolResult, McpError> {
        json_result(&goals::list_diet_models(self.goals.registry()))
    }

    #[tool(description = "Calculate every phase of a diet model protocol for a user's stored profile")]
    fn calculate_diet(&self, Parameters(p): Parameters<CalculateDietParams>) -> Result<CallToolResult, McpError> {
        let result = goals::calculate_diet(&self.database, self.goals.registry(), p.user_id, &p.model, p.protocol)
            .map_err(to_mcp_error)?;
        json_result(&result)
    }

    // --- Goals ---

    #[tool(description = "Recommend daily calorie and macro targets (Mifflin-St Jeor, capped pace toward a target weight). Pass start_date to save it as the active goal.")]
    fn recommend_goal(&self, Parameters(p): Parameters<RecommendGoalParams>) -> Result<CallToolResult, McpError> {
        let start = p.start_date.as_deref().map(date_param).transpose()?;
        let result = goals::recommend_goal(
            &self.database, &self.goals, p.user_id, p.target_weight_kg, p.weeks_to_goal, start,
        )
        .map_err(to_mcp_error)?;
        json_result(&result)
    }

    #[tool(description = "Create a goal with explicit targets. It becomes the user's only active goal.")]
    fn create_goal(&self, Parameters(p): Parameters<CreateGoalParams>) -> Result<CallToolResult, McpError> {
        let data = NutritionGoalCreate {
            user_id: p.user_id,
            calories: p.calories, protein: p.protein, carbs: p.carbs, fat: p.fat, fiber: p.fiber,
            start_date: date_param(&p.start_date)?,
            end_date: p.end_date.as_deref().map(date_param).transpose()?,
            diet_model_name: None,
            protocol_number: None,
            phase_number: None,
            expiration_date: None,
        };
        let result = goals::create_goal(&self.goals, data).map_err(to_mcp_error)?;
        json_result(&result)
    }

    #[tool(description = "Create the active goal from one phase of a diet model protocol; it expires when the phase ends")]
    fn create_protocol_goal(&self, Parameters(p): Parameters<CreateProtocolGoalParams>) -> Result<CallToolResult, McpError> {
        let start = date_param(&p.start_date)?;
        let result = goals::create_protocol_goal(
            &self.database, &self.goals, p.user_id, &p.model, p.protocol, p.phase, start,
        )
        .map_err(to_mcp_error)?;
        json_result(&result)
    }

    #[tool(description = "Get the user's active goal")]
    fn get_active_goal(&self, Parameters(p): Parameters<UserParams>) -> Result<CallToolResult, McpError> {
        let result = goals::get_active_goal(&self.goals, p.user_id).map_err(to_mcp_error)?;
        json_result(&result)
    }

    #[tool(description = "Get the goal whose date range covers a given day")]
    fn get_goal_for_date(&self, Parameters(p): Parameters<UserDateParams>) -> Result<CallToolResult, McpError> {
        let date = date_param(&p.date)?;
        let result = goals::get_goal_for_date(&self.goals, p.user_id, date).map_err(to_mcp_error)?;
        json_result(&result)
    }

    #[tool(description = "List a user's goals, newest first")]
    fn list_goals(&self, Parameters(p): Parameters<ListGoalsParams>) -> Result<CallToolResult, McpError> {
        let result = goals::list_goals(&self.goals, p.user_id, p.limit).map_err(to_mcp_error)?;
        json_result(&result)
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for MacrotrackService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "macrotrack".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("macrotrack nutrition engine".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "macrotrack - food diary and nutrition goals. \
                 Call logging_instructions first. \
                 Profiles: set_profile/get_profile. \
                 Foods (per 100 g): add_food/get_food/search_foods/update_food. \
                 Recipes: create_recipe/add_recipe_ingredient/get_recipe. \
                 Diary: log_food/log_recipe/log_inline, get/update/delete_diary_entry, get_daily_summary. \
                 Diet: list_diet_models/calculate_diet. \
                 Goals: recommend_goal, create_goal, create_protocol_goal, get_active_goal, get_goal_for_date, list_goals."
                    .into(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::ErrorCode;

    #[test]
    fn test_error_mapping() {
        assert_eq!(
            to_mcp_error(EngineError::NotFound("Food 1".into())).code,
            ErrorCode::RESOURCE_NOT_FOUND
        );
        assert_eq!(
            to_mcp_error(EngineError::InvalidQuantity(0.0)).code,
            ErrorCode::INVALID_PARAMS
        );
        assert_eq!(
            to_mcp_error(EngineError::UnsupportedModel("keto".into())).code,
            ErrorCode::INVALID_PARAMS
        );
        let db_error = EngineError::from(rusqlite::Error::QueryReturnedNoRows);
        assert_eq!(to_mcp_error(db_error).code, ErrorCode::INTERNAL_ERROR);
    }

    #[test]
    fn test_meal_type_param() {
        assert_eq!(meal_type_param(None).unwrap(), None);
        assert_eq!(meal_type_param(Some("Dinner")).unwrap(), Some(MealType::Dinner));
        assert_eq!(meal_type_param(Some("unspecified")).unwrap(), Some(MealType::Unspecified));
    }

    #[test]
    fn test_unknown_meal_type_is_rejected() {
        let err = meal_type_param(Some("diner")).unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert!(err.message.contains("diner"));
    }

    #[test]
    fn test_update_with_misspelled_meal_keeps_stored_meal() {
        let database = crate::tools::test_support::database();
        let service = MacrotrackService::new(
            PathBuf::from(":memory:"),
            database.clone(),
            DietModelRegistry::default(),
        );
        let entry = diary::log_entry(
            &database,
            DiaryEntryCreate {
                user_id: 1,
                entry_date: chrono::NaiveDate::from_ymd_opt(2025, 1, 9).unwrap(),
                meal_type: MealType::Dinner,
                source: DiarySource::Inline {
                    name: "Soup".into(),
                    per_100g: NutrientProfile::per_100g(Nutrition {
                        calories: 50.0,
                        protein: 2.0,
                        carbs: 6.0,
                        fat: 1.0,
                        fiber: 1.0,
                    }),
                },
                quantity_grams: 300.0,
                notes: None,
            },
        )
        .unwrap();

        let params = UpdateDiaryEntryParams {
            id: entry.id,
            date: None,
            meal_type: Some("diner".into()),
            quantity: None,
            unit: "g".into(),
            notes: None,
        };
        let err = service.update_diary_entry(Parameters(params)).unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);

        let stored = diary::get_diary_entry(&database, entry.id).unwrap();
        assert_eq!(stored.meal_type, MealType::Dinner);
    }
}
