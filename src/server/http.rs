//! HTTP server implementation
//!
//! Uses hyper http1 with TokioIo; one task per connection.

use bytes::Bytes;
use http_body_util::{BodyExt, Full, Limited};
use hyper::body::Incoming;
use hyper::header::{
    HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN,
};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::assistant::{FallbackResponder, LlmSettings, ResponderChain};
use crate::auth::Anonymizer;
use crate::config::Args;
use crate::db::HealthStore;
use crate::gamification::GamificationService;
use crate::reference::ReferenceCache;
use crate::routes::{self, response::path_segment, FullBody, MAX_BODY_BYTES};
use crate::services::{
    BhashiniTranslator, GoogleTts, OpenRouterBackend, RasaClassifier, SpeechSynthesizer,
    Translator, TwilioCredentials, TwilioNotifier,
};
use crate::types::HealthBotError;

/// Shared application state
pub struct AppState {
    pub args: Args,
    pub store: Arc<dyn HealthStore>,
    /// Classifier → LLM → keyword fallback
    pub chain: ResponderChain,
    pub translator: Arc<dyn Translator>,
    pub speech: Arc<dyn SpeechSynthesizer>,
    /// File-backed disease info and vaccination schedule
    pub reference: ReferenceCache,
    pub gamification: GamificationService,
    pub anonymizer: Anonymizer,
    pub started_at: Instant,
}

impl AppState {
    /// Build the upstream clients from configuration around an existing store
    pub fn new(args: Args, store: Arc<dyn HealthStore>) -> Self {
        let anonymizer = Anonymizer::new(args.anonymization_salt());

        let classifier = Arc::new(RasaClassifier::new(
            args.classifier.classifier_url.clone(),
            args.classifier_timeout(),
        ));
        let llm = Arc::new(OpenRouterBackend::new(
            args.llm.llm_api_url.clone(),
            args.llm.llm_model.clone(),
            args.llm.llm_api_key.clone(),
            args.llm_timeout(),
        )
        .with_app_title(format!("{} Health Chatbot", args.region_name)));
        let translator: Arc<dyn Translator> = Arc::new(BhashiniTranslator::new(
            args.translation.translation_url.clone(),
            args.translation.translation_api_key.clone(),
            args.translation_timeout(),
        ));
        let notifier = Arc::new(TwilioNotifier::new(
            args.messaging.twilio_api_url.clone(),
            twilio_credentials(&args),
            args.messaging_timeout(),
        ));
        let speech = Arc::new(GoogleTts::new(args.tts.tts_url.clone(), args.tts_timeout()));

        let chain = ResponderChain::standard(
            classifier,
            args.classifier.classifier_min_confidence,
            llm,
            LlmSettings {
                region: args.region_name.clone(),
                max_tokens: args.llm.llm_max_tokens,
                temperature: args.llm.llm_temperature,
            },
            FallbackResponder::new(),
            Arc::clone(&store),
            Arc::clone(&translator),
            anonymizer.clone(),
        );

        let gamification = GamificationService::new(
            Arc::clone(&store),
            Arc::clone(&translator),
            notifier,
            args.messaging.notify_channel,
            anonymizer.clone(),
        );

        let reference = ReferenceCache::new(args.cache_dir.clone());

        Self {
            args,
            store,
            chain,
            translator,
            speech,
            reference,
            gamification,
            anonymizer,
            started_at: Instant::now(),
        }
    }
}

/// Twilio credentials when all three settings are present
fn twilio_credentials(args: &Args) -> Option<TwilioCredentials> {
    let messaging = &args.messaging;
    match (
        messaging.twilio_account_sid.as_deref(),
        messaging.twilio_auth_token.as_deref(),
        messaging.whatsapp_number.as_deref(),
    ) {
        (Some(sid), Some(token), Some(from))
            if !sid.is_empty() && !token.is_empty() && !from.is_empty() =>
        {
            Some(TwilioCredentials {
                account_sid: sid.to_string(),
                auth_token: token.to_string(),
                from_number: from.to_string(),
            })
        }
        _ => None,
    }
}

/// Start the HTTP server and run until Ctrl-C
pub async fn run(state: Arc<AppState>) -> Result<(), HealthBotError> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!("Healthbot listening on {}", state.args.listen);
    if state.args.dev_mode {
        warn!("Development mode enabled");
    }
    if state.args.llm.llm_api_key.is_none() {
        warn!("LLM_API_KEY not set - LLM source will always decline");
    }
    if twilio_credentials(&state.args).is_none() {
        info!("Twilio not configured - quiz notifications disabled");
    }

    serve(listener, state, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    })
    .await
}

/// Accept connections on `listener` until `shutdown` resolves, then release
/// the store
pub async fn serve(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: impl Future<Output = ()>,
) -> Result<(), HealthBotError> {
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown signal received, stopping accept loop");
                break;
            }
            accepted = listener.accept() => match accepted {
                Ok((stream, addr)) => {
                    let state = Arc::clone(&state);
                    tokio::spawn(async move {
                        let io = TokioIo::new(stream);

                        let service = service_fn(move |req| {
                            let state = Arc::clone(&state);
                            async move { handle_request(state, addr, req).await }
                        });

                        if let Err(err) = http1::Builder::new()
                            .serve_connection(io, service)
                            .await
                        {
                            error!("Error serving connection from {}: {:?}", addr, err);
                        }
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {:?}", e);
                }
            }
        }
    }

    state.store.shutdown().await;
    info!("Store shut down");
    Ok(())
}

/// Collect a request body, refusing anything over [`MAX_BODY_BYTES`]
async fn read_body(req: Request<Incoming>) -> Result<Bytes, HealthBotError> {
    Limited::new(req.into_body(), MAX_BODY_BYTES)
        .collect()
        .await
        .map(|collected| collected.to_bytes())
        .map_err(|e| HealthBotError::BadRequest(format!("Unreadable request body: {}", e)))
}

/// Route incoming HTTP requests
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> Result<Response<FullBody>, Infallible> {
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(str::to_string);

    info!(peer = %addr, method = %method, path = %path, "Request");

    let response = route(&state, req, &method, &path, query.as_deref()).await;

    debug!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Response"
    );
    Ok(response)
}

async fn route(
    state: &AppState,
    req: Request<Incoming>,
    method: &Method,
    path: &str,
    query: Option<&str>,
) -> Response<FullBody> {
    // CORS preflight
    if method == Method::OPTIONS {
        return preflight_response();
    }

    let body = if method == Method::POST || method == Method::PUT {
        match read_body(req).await {
            Ok(body) => body,
            Err(e) => return routes::error_response(&e),
        }
    } else {
        Bytes::new()
    };

    let segments = match path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(path_segment)
        .collect::<Result<Vec<String>, _>>()
    {
        Ok(segments) => segments,
        Err(e) => return routes::error_response(&e),
    };
    let segments: Vec<&str> = segments.iter().map(String::as_str).collect();

    match (method.clone(), segments.as_slice()) {
        // Liveness check
        (Method::GET, ["health"]) | (Method::GET, ["healthz"]) => routes::health_check(state),

        // Version info for deployment verification
        (Method::GET, ["version"]) => routes::version_info(),

        // Responder chain
        (Method::POST, ["chat"]) => routes::handle_chat(state, &body).await,
        (Method::GET, ["chat", user_id, "history"]) => {
            routes::handle_history(state, user_id, query).await
        }

        // Symptom assistant
        (Method::POST, ["assistant", "symptom-advice"]) => {
            routes::handle_symptom_advice(state, &body).await
        }
        (Method::POST, ["assistant", "prevention-tips"]) => {
            routes::handle_prevention_tips(state, &body).await
        }
        (Method::POST, ["assistant", "next-steps"]) => {
            routes::handle_next_steps(state, &body).await
        }
        (Method::POST, ["assistant", "emergency-check"]) => routes::handle_emergency_check(&body),

        // Users
        (Method::POST, ["users"]) => routes::handle_create_user(state, &body).await,
        (Method::GET, ["users", user_id]) => routes::handle_get_user(state, user_id).await,
        (Method::PUT, ["users", user_id, "preferences"]) => {
            routes::handle_update_preferences(state, user_id, &body).await
        }

        // Quizzes
        (Method::GET, ["gamification", "quizzes"]) => routes::handle_list_quizzes(state).await,
        (Method::POST, ["gamification", "quiz"]) => routes::handle_submit_quiz(state, &body).await,
        (Method::GET, ["gamification", user_id, "results"]) => {
            routes::handle_results(state, user_id).await
        }

        // Reference data
        (Method::GET, ["health", "outbreak-alerts", district]) => {
            routes::handle_outbreak_alerts(state, district, query).await
        }
        (Method::GET, ["health", "disease-info", disease]) => {
            routes::handle_disease_info(state, disease, query).await
        }
        (Method::GET, ["health", "vaccination-schedule"]) => {
            routes::handle_vaccination_schedule(state, query).await
        }

        // Speech
        (Method::POST, ["tts"]) => routes::handle_tts(state, &body).await,

        _ => not_found_response(path),
    }
}

/// CORS preflight response
fn preflight_response() -> Response<FullBody> {
    let mut response = Response::new(Full::new(Bytes::new()));
    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, PUT, OPTIONS"),
    );
    response
}

/// Not found response
fn not_found_response(path: &str) -> Response<FullBody> {
    routes::error_response(&HealthBotError::NotFound(format!("No route for {}", path)))
}
