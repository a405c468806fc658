//! macrotrack status tool
//!
//! Provides runtime status information about the engine.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;

/// Logging instructions for AI assistants
pub const LOGGING_INSTRUCTIONS: &str = r#"
# macrotrack Logging Instructions

## Overview

1. **Profile** - `set_profile` once per user (age, height, weight, gender,
   activity level, and body fat % if the lean_mass model will be used)
2. **Foods** - catalog items with nutrients **per 100 g**
3. **Recipes** (optional) - lists of foods with gram quantities
4. **Diary entries** - what was eaten, logged against a food, a recipe, or
   an inline item

## Logging

- `log_food`: food_id + quantity + unit
- `log_recipe`: recipe_id + quantity of the finished dish eaten. The portion
  is proportional: eating 200 g of an 800 g pot is a quarter of every
  ingredient.
- `log_inline`: name + per-100g nutrients, for one-off items not worth
  adding to the catalog

Units: `g`, `kg`, `oz`, `lb`, or a household unit with its weight in
parentheses, e.g. `slice (28g)`. Volumes without a weight are rejected.

## Snapshots

Each entry stores its nutrients when it is logged. Editing a food later does
NOT change past entries. Changing an entry's quantity recomputes it from the
food's current values.

## Goals

- `recommend_goal`: Mifflin-St Jeor with a target weight and weeks; pass
  `start_date` to save it as the active goal
- `list_diet_models` / `calculate_diet`: protocol-based plans
- `create_protocol_goal`: save one phase of a protocol as the active goal
- Only one goal per user is active. Creating a goal deactivates the others.
- `get_daily_summary` compares a day's totals with the goal covering it.

Dates use ISO format: YYYY-MM-DD
"#;

/// Runtime status of the engine
#[derive(Debug, Clone, Serialize)]
pub struct EngineStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,

    pub diet_models: Vec<&'static str>,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
}

impl StatusTracker {
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
        }
    }

    /// Get the current status
    pub fn get_status(&self, diet_models: Vec<&'static str>) -> EngineStatus {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        EngineStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            diet_models,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_for_missing_database_file() {
        let tracker = StatusTracker::new(PathBuf::from("/nonexistent/macrotrack.db"));
        let status = tracker.get_status(vec!["lean_mass"]);
        assert!(status.database_size_bytes.is_none());
        assert_eq!(status.process_id, std::process::id());
        assert_eq!(status.diet_models, vec!["lean_mass"]);
    }
}
