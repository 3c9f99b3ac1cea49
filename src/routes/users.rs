//! User profile endpoints
//!
//! Clients address users by their raw handle; only the salted hash is
//! stored or returned.

use hyper::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::db::schemas::{to_rfc3339, PreferenceUpdate, UserDoc, DEFAULT_LANGUAGE};
use crate::routes::response::{into_response, parse_json, FullBody};
use crate::server::AppState;
use crate::types::{HealthBotError, Result};

#[derive(Debug, Deserialize)]
struct CreateUserRequest {
    /// Raw handle chosen by the client; generated when absent
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    district: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    age: Option<i32>,
    #[serde(default)]
    phone: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreateUserResponse {
    user_id: String,
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct UserProfile {
    user_id: String,
    district: String,
    language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    age: Option<i32>,
    has_phone: bool,
    receive_alerts: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    updated_at: Option<String>,
}

impl From<UserDoc> for UserProfile {
    fn from(user: UserDoc) -> Self {
        Self {
            user_id: user.user_id,
            district: user.district,
            language: user.language,
            age: user.age,
            has_phone: user.phone.is_some(),
            receive_alerts: user.receive_alerts.unwrap_or(false),
            created_at: user.metadata.created_at.map(to_rfc3339),
            updated_at: user.metadata.updated_at.map(to_rfc3339),
        }
    }
}

#[derive(Debug, Serialize)]
struct UpdatedResponse {
    message: &'static str,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

async fn create_user(state: &AppState, body: &[u8]) -> Result<CreateUserResponse> {
    let request: CreateUserRequest = parse_json(body)?;
    let district = request.district.trim();
    if district.is_empty() {
        return Err(HealthBotError::BadRequest("district is required".into()));
    }
    if request.age.is_some_and(|age| !(0..=150).contains(&age)) {
        return Err(HealthBotError::BadRequest("age must be between 0 and 150".into()));
    }

    let raw_id = non_blank(request.user_id).unwrap_or_else(|| Uuid::new_v4().to_string());
    let anon_id = state.anonymizer.anonymize(&raw_id);
    let language = non_blank(request.language).unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

    state
        .store
        .insert_user(UserDoc::new(
            anon_id.clone(),
            district.to_string(),
            language,
            request.age,
            non_blank(request.phone),
        ))
        .await?;
    info!(user = %anon_id, district = %district, "User created");

    Ok(CreateUserResponse {
        user_id: raw_id,
        message: "User created successfully",
    })
}

/// POST /users
pub async fn handle_create_user(state: &AppState, body: &[u8]) -> Response<FullBody> {
    into_response(StatusCode::CREATED, create_user(state, body).await)
}

async fn get_user(state: &AppState, user_id: &str) -> Result<UserProfile> {
    let anon_id = state.anonymizer.anonymize(user_id);
    state
        .store
        .find_user(&anon_id)
        .await?
        .map(UserProfile::from)
        .ok_or_else(|| HealthBotError::NotFound("User not found".into()))
}

/// GET /users/{user_id}
pub async fn handle_get_user(state: &AppState, user_id: &str) -> Response<FullBody> {
    into_response(StatusCode::OK, get_user(state, user_id).await)
}

async fn update_preferences(
    state: &AppState,
    user_id: &str,
    body: &[u8],
) -> Result<UpdatedResponse> {
    let update: PreferenceUpdate = parse_json(body)?;
    if update == PreferenceUpdate::default() {
        return Err(HealthBotError::BadRequest(
            "Provide at least one of district, language, receive_alerts".into(),
        ));
    }

    let anon_id = state.anonymizer.anonymize(user_id);
    if !state.store.update_user_preferences(&anon_id, &update).await? {
        return Err(HealthBotError::NotFound("User not found".into()));
    }
    info!(user = %anon_id, "User preferences updated");

    Ok(UpdatedResponse {
        message: "Preferences updated successfully",
    })
}

/// PUT /users/{user_id}/preferences
pub async fn handle_update_preferences(
    state: &AppState,
    user_id: &str,
    body: &[u8],
) -> Response<FullBody> {
    into_response(StatusCode::OK, update_preferences(state, user_id, body).await)
}
