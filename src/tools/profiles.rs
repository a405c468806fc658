//! Profile tools

use serde::Serialize;

use crate::db::Database;
use crate::diet::validate_anthropometrics;
use crate::error::{EngineError, EngineResult};
use crate::models::{AnthropometricProfile, UserProfile};

/// Response for set_profile
#[derive(Debug, Serialize)]
pub struct SetProfileResponse {
    pub success: bool,
    pub profile: UserProfile,
    /// Models that cannot run until the profile has a body fat estimate
    pub missing_body_fat: bool,
}

/// Store or replace a user's anthropometric profile
pub fn set_profile(
    db: &Database,
    user_id: i64,
    profile: AnthropometricProfile,
) -> EngineResult<SetProfileResponse> {
    validate_anthropometrics(&profile, false)?;

    let stored = db.with_conn(|conn| Ok::<_, EngineError>(UserProfile::set(conn, user_id, &profile)?))?;
    tracing::info!(user_id, "profile updated");

    Ok(SetProfileResponse {
        success: true,
        missing_body_fat: stored.profile.body_fat_percent.is_none(),
        profile: stored,
    })
}

pub fn get_profile(db: &Database, user_id: i64) -> EngineResult<UserProfile> {
    db.with_conn(|conn| Ok::<_, EngineError>(UserProfile::get(conn, user_id)?))?
        .ok_or_else(|| EngineError::NotFound(format!("Profile for user {}", user_id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActivityLevel, Gender};
    use crate::tools::test_support::database;

    fn profile() -> AnthropometricProfile {
        AnthropometricProfile {
            age: 40,
            height_cm: 165.0,
            weight_kg: 62.0,
            body_fat_percent: None,
            gender: Gender::Female,
            activity_level: ActivityLevel::Light,
        }
    }

    #[test]
    fn test_set_then_get() {
        let db = database();
        let response = set_profile(&db, 7, profile()).unwrap();
        assert!(response.missing_body_fat);

        let stored = get_profile(&db, 7).unwrap();
        assert_eq!(stored.profile, profile());
        assert!(matches!(get_profile(&db, 8), Err(EngineError::NotFound(_))));
    }

    #[test]
    fn test_invalid_profile_is_not_stored() {
        let db = database();
        let mut bad = profile();
        bad.weight_kg = 0.0;
        assert!(matches!(set_profile(&db, 7, bad), Err(EngineError::Validation(_))));
        assert!(get_profile(&db, 7).is_err());
    }
}
