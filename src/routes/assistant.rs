//! Symptom assistant endpoints
//!
//! Direct JSON access to the symptom advice generator and its sibling
//! actions. Text answers are translated when the request asks for Odia or
//! Hindi.

use hyper::{Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::assistant::symptoms::{
    advise, assess_emergency, assess_urgency, next_steps, prevention_tips,
};
use crate::assistant::{SymptomQuery, Urgency};
use crate::routes::response::{into_response, parse_json, FullBody};
use crate::server::AppState;
use crate::services::needs_translation;
use crate::types::Result;

#[derive(Debug, Deserialize)]
struct SymptomRequest {
    #[serde(flatten)]
    query: SymptomQuery,
    #[serde(default)]
    language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PreventionRequest {
    #[serde(default)]
    symptom: Option<String>,
    #[serde(default)]
    language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EmergencyRequest {
    #[serde(default)]
    symptom: Option<String>,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Serialize)]
struct AdviceResponse {
    advice: String,
}

#[derive(Debug, Serialize)]
struct TipsResponse {
    tips: String,
}

#[derive(Debug, Serialize)]
struct NextStepsResponse {
    urgency: Urgency,
    next_steps: String,
}

#[derive(Debug, Serialize)]
struct EmergencyResponse {
    emergency: bool,
}

async fn localize(state: &AppState, text: String, language: Option<&str>) -> String {
    match language {
        Some(lang) if needs_translation(lang) => state.translator.translate(&text, "en", lang).await,
        _ => text,
    }
}

async fn symptom_advice(state: &AppState, body: &[u8]) -> Result<AdviceResponse> {
    let request: SymptomRequest = parse_json(body)?;
    let advice = advise(&request.query);
    Ok(AdviceResponse {
        advice: localize(state, advice, request.language.as_deref()).await,
    })
}

/// POST /assistant/symptom-advice
pub async fn handle_symptom_advice(state: &AppState, body: &[u8]) -> Response<FullBody> {
    into_response(StatusCode::OK, symptom_advice(state, body).await)
}

async fn tips(state: &AppState, body: &[u8]) -> Result<TipsResponse> {
    let request: PreventionRequest = parse_json(body)?;
    let tips = prevention_tips(request.symptom.as_deref());
    Ok(TipsResponse {
        tips: localize(state, tips, request.language.as_deref()).await,
    })
}

/// POST /assistant/prevention-tips
pub async fn handle_prevention_tips(state: &AppState, body: &[u8]) -> Response<FullBody> {
    into_response(StatusCode::OK, tips(state, body).await)
}

async fn steps(state: &AppState, body: &[u8]) -> Result<NextStepsResponse> {
    let request: SymptomRequest = parse_json(body)?;
    let urgency = assess_urgency(&request.query);
    Ok(NextStepsResponse {
        urgency,
        next_steps: localize(state, next_steps(urgency), request.language.as_deref()).await,
    })
}

/// POST /assistant/next-steps
pub async fn handle_next_steps(state: &AppState, body: &[u8]) -> Response<FullBody> {
    into_response(StatusCode::OK, steps(state, body).await)
}

/// POST /assistant/emergency-check
pub fn handle_emergency_check(body: &[u8]) -> Response<FullBody> {
    let result = parse_json::<EmergencyRequest>(body).map(|request| EmergencyResponse {
        emergency: assess_emergency(request.symptom.as_deref().unwrap_or(""), &request.message),
    });
    into_response(StatusCode::OK, result)
}
