//! Profile endpoints.

use crate::auth::gate::AuthenticatedSession;
use crate::error::AppError;
use crate::models::ApiResponse;
use crate::validation::{evaluate, Constraint, RuleDescriptor, RuleSet};
use axum::{Form, Json};
use serde::Serialize;
use std::collections::HashMap;

/// Profile as accepted after validation.
#[derive(Debug, Serialize)]
pub struct ProfileUpdate {
    pub session_id: String,
    pub nickname: String,
    pub email: Option<String>,
    pub age: Option<i64>,
    pub birthday: Option<String>,
}

pub fn profile_rules() -> RuleSet {
    RuleSet::new()
        .field(
            "nickname",
            RuleDescriptor::required("Nickname")
                .with(Constraint::MinLength { min: 2 })
                .with(Constraint::MaxLength { max: 20 }),
        )
        .field(
            "email",
            RuleDescriptor::optional("Email").with(Constraint::Email),
        )
        .field(
            "age",
            RuleDescriptor::optional("Age")
                .with(Constraint::Integer)
                .with(Constraint::Between {
                    min: 13.0,
                    max: 130.0,
                }),
        )
        .field(
            "birthday",
            RuleDescriptor::optional("Birthday").with(Constraint::DateFormat {
                format: "%Y-%m-%d".to_string(),
            }),
        )
}

/// POST /api/profile: validate and accept a profile update
pub async fn update_profile(
    session: AuthenticatedSession,
    Form(payload): Form<HashMap<String, String>>,
) -> Result<Json<ApiResponse<ProfileUpdate>>, AppError> {
    let errors = evaluate(&payload, &profile_rules());
    if !errors.is_empty() {
        tracing::info!(
            action = "validation_failed",
            session_id = %session.session_id,
            violations = errors.len(),
            "Profile update rejected"
        );
        return Err(AppError::Validation(errors));
    }

    let non_empty = |key: &str| payload.get(key).filter(|v| !v.is_empty()).cloned();

    let age = match non_empty("age") {
        Some(age) => Some(
            age.parse::<i64>()
                .map_err(|e| AppError::BadRequest(format!("Invalid age: {}", e)))?,
        ),
        None => None,
    };

    Ok(Json(ApiResponse::success(ProfileUpdate {
        session_id: session.session_id,
        nickname: non_empty("nickname").unwrap_or_default(),
        email: non_empty("email"),
        age,
        birthday: non_empty("birthday"),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_rules_are_consistent() {
        assert!(profile_rules().check().is_ok());
    }

    #[test]
    fn test_minimal_profile_is_valid() {
        let mut payload = HashMap::new();
        payload.insert("nickname".to_string(), "ada".to_string());
        assert!(evaluate(&payload, &profile_rules()).is_empty());
    }
}
