//! Engine error types
//!
//! Every error here is deterministic for a given input; none are retried.

use thiserror::Error;

use crate::db::DbError;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Bad anthropometric data, protocol or phase out of range, bad goal fields
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid quantity: {0} g (must be a positive number of grams)")]
    InvalidQuantity(f64),

    #[error("Unsupported diet model: {0}")]
    UnsupportedModel(String),

    /// Recipe has no ingredients or a zero total weight
    #[error("Recipe '{0}' has no consumable weight")]
    EmptyRecipe(String),

    #[error("Recipe ingredient references missing food {food_id}")]
    MissingIngredient { food_id: i64 },

    #[error("{0} not found")]
    NotFound(String),

    #[error(transparent)]
    Database(#[from] DbError),
}

impl EngineError {
    pub fn validation(msg: impl Into<String>) -> Self {
        EngineError::Validation(msg.into())
    }

    /// True for errors the caller fixes by correcting its input
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            EngineError::Validation(_)
                | EngineError::InvalidQuantity(_)
                | EngineError::UnsupportedModel(_)
                | EngineError::EmptyRecipe(_)
                | EngineError::MissingIngredient { .. }
        )
    }
}

impl From<rusqlite::Error> for EngineError {
    fn from(e: rusqlite::Error) -> Self {
        EngineError::Database(DbError::Sqlite(e))
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
