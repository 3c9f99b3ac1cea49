//! Reference data endpoints
//!
//! - GET /health/outbreak-alerts/{district}
//! - GET /health/disease-info/{disease}
//! - GET /health/vaccination-schedule?age=
//!
//! Each accepts `?language=`; Odia and Hindi answers are translated field by
//! field.

use futures::future::join_all;
use hyper::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::db::schemas::DEFAULT_LANGUAGE;
use crate::reference::{outbreak_alerts, DiseaseInfo};
use crate::routes::response::{into_response, parse_query, FullBody};
use crate::server::AppState;
use crate::services::needs_translation;
use crate::types::{HealthBotError, Result};

#[derive(Debug, Deserialize)]
struct LanguageQuery {
    #[serde(default = "default_language")]
    language: String,
}

#[derive(Debug, Deserialize)]
struct ScheduleQuery {
    age: Option<u32>,
    #[serde(default = "default_language")]
    language: String,
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

#[derive(Debug, Serialize)]
struct AlertsResponse {
    district: String,
    alerts: Vec<String>,
    timestamp: String,
}

#[derive(Debug, Serialize)]
struct ScheduleResponse {
    age: u32,
    schedule: String,
}

/// Translate each text from English when the language calls for it
async fn localize_all(state: &AppState, texts: Vec<String>, language: &str) -> Vec<String> {
    if !needs_translation(language) {
        return texts;
    }
    join_all(
        texts
            .iter()
            .map(|text| state.translator.translate(text, "en", language)),
    )
    .await
}

async fn alerts(state: &AppState, district: &str, query: Option<&str>) -> Result<AlertsResponse> {
    let params: LanguageQuery = parse_query(query)?;
    let alerts = localize_all(state, outbreak_alerts(district), &params.language).await;
    info!(district = %district, language = %params.language, "Fetched outbreak alerts");
    Ok(AlertsResponse {
        district: district.to_string(),
        alerts,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// GET /health/outbreak-alerts/{district}?language=
pub async fn handle_outbreak_alerts(
    state: &AppState,
    district: &str,
    query: Option<&str>,
) -> Response<FullBody> {
    into_response(StatusCode::OK, alerts(state, district, query).await)
}

async fn disease_info(state: &AppState, disease: &str, query: Option<&str>) -> Result<DiseaseInfo> {
    let params: LanguageQuery = parse_query(query)?;
    let info = state.reference.disease_info(disease).await?;
    let mut fields = localize_all(
        state,
        vec![info.symptoms, info.prevention, info.treatment],
        &params.language,
    )
    .await
    .into_iter();
    info!(disease = %disease, language = %params.language, "Fetched disease info");

    let mut next = || fields.next().unwrap_or_default();
    Ok(DiseaseInfo {
        symptoms: next(),
        prevention: next(),
        treatment: next(),
    })
}

/// GET /health/disease-info/{disease}?language=
pub async fn handle_disease_info(
    state: &AppState,
    disease: &str,
    query: Option<&str>,
) -> Response<FullBody> {
    into_response(StatusCode::OK, disease_info(state, disease, query).await)
}

async fn vaccination_schedule(state: &AppState, query: Option<&str>) -> Result<ScheduleResponse> {
    let params: ScheduleQuery = parse_query(query)?;
    let age = params
        .age
        .ok_or_else(|| HealthBotError::BadRequest("age is required".into()))?;

    let schedule = state.reference.vaccination_schedule(age).await;
    let schedule = localize_all(state, vec![schedule], &params.language)
        .await
        .pop()
        .unwrap_or_default();
    info!(age, language = %params.language, "Fetched vaccination schedule");

    Ok(ScheduleResponse { age, schedule })
}

/// GET /health/vaccination-schedule?age=&language=
pub async fn handle_vaccination_schedule(
    state: &AppState,
    query: Option<&str>,
) -> Response<FullBody> {
    into_response(StatusCode::OK, vaccination_schedule(state, query).await)
}
