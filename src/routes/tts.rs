//! Text-to-speech endpoint

use hyper::header::{HeaderValue, CONTENT_DISPOSITION};
use hyper::{Response, StatusCode};
use serde::Deserialize;
use tracing::{info, warn};

use crate::db::schemas::DEFAULT_LANGUAGE;
use crate::routes::response::{bytes_response, error_response, parse_json, FullBody};
use crate::server::AppState;
use crate::types::HealthBotError;

#[derive(Debug, Deserialize)]
struct TtsRequest {
    #[serde(default)]
    text: String,
    #[serde(default = "default_language")]
    language: String,
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

/// POST /tts - MP3 audio as an attachment
pub async fn handle_tts(state: &AppState, body: &[u8]) -> Response<FullBody> {
    let request: TtsRequest = match parse_json(body) {
        Ok(r) => r,
        Err(e) => return error_response(&e),
    };

    match state.speech.synthesize(&request.text, &request.language).await {
        Ok(audio) => {
            info!(bytes = audio.len(), language = %request.language, "Speech synthesized");
            let mut response = bytes_response(StatusCode::OK, "audio/mpeg", audio);
            response.headers_mut().insert(
                CONTENT_DISPOSITION,
                HeaderValue::from_static("attachment; filename=\"speech.mp3\""),
            );
            response
        }
        Err(e) => {
            warn!(error = %e, "Speech synthesis failed");
            error_response(&HealthBotError::from(e))
        }
    }
}
