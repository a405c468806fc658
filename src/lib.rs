//! macrotrack library
//!
//! Nutrition goal and diary entry computation: portion scaling, diary
//! snapshots, diet models, recommendations and the goal lifecycle, with an
//! MCP server on top.

pub mod build_info;
pub mod config;
pub mod db;
pub mod diet;
pub mod error;
pub mod goals;
pub mod mcp;
pub mod models;
pub mod nutrition;
pub mod tools;

pub use error::{EngineError, EngineResult};
pub use goals::GoalLifecycleManager;
