//! macrotrack tools module
//!
//! Tool implementations behind the MCP server. Each takes the shared
//! database (and registry or goal manager where needed) and returns a
//! serializable response.

pub mod diary;
pub mod foods;
pub mod goals;
pub mod profiles;
pub mod recipes;
pub mod status;

use chrono::NaiveDate;

use crate::error::{EngineError, EngineResult};

/// Parse an ISO `YYYY-MM-DD` date
pub fn parse_date(value: &str) -> EngineResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        EngineError::validation(format!("invalid date '{}', expected YYYY-MM-DD", value))
    })
}

/// Clamp a caller-supplied page size
pub(crate) fn clamp_limit(limit: i64, max: i64) -> i64 {
    limit.clamp(1, max)
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::db::{migrations::run_migrations, Database};

    pub fn database() -> Database {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| run_migrations(conn)).unwrap();
        db
    }
}
