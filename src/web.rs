use crate::cache::{DetailResponse, VocabCache};
use crate::client::{TranslateRequest, TranslateResponse};
use crate::gemini::{GeminiClient, GeminiConfig, LanguageModel, ModelError};
use crate::model::Sentence;
use crate::nlp::{extract_vocab, split_sentences};
use crate::request::DetailRequest;
use axum::{
    Json, Router,
    extract::State,
    http::{HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::json;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, warn};

type SharedState = Arc<AppState>;

pub struct AppState {
    pub model: Arc<dyn LanguageModel>,
    pub cache: VocabCache,
}

#[derive(Clone)]
pub struct WebConfig {
    pub addr: SocketAddr,
    pub frontend_origin: String,
    pub gemini: GeminiConfig,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            frontend_origin: "http://localhost:5173".to_string(),
            gemini: GeminiConfig::default(),
        }
    }
}

#[derive(Debug)]
pub enum WebError {
    Io(std::io::Error),
    Model(ModelError),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebError::Io(err) => write!(f, "io error: {err}"),
            WebError::Model(err) => write!(f, "language model setup failed: {err}"),
        }
    }
}

impl std::error::Error for WebError {}

impl From<std::io::Error> for WebError {
    fn from(value: std::io::Error) -> Self {
        WebError::Io(value)
    }
}

impl From<ModelError> for WebError {
    fn from(value: ModelError) -> Self {
        WebError::Model(value)
    }
}

pub async fn serve(config: WebConfig) -> Result<(), WebError> {
    let model = GeminiClient::new(config.gemini.clone())?;
    let state = Arc::new(AppState {
        model: Arc::new(model),
        cache: VocabCache::default(),
    });
    let router = build_router(state, &config.frontend_origin);
    info!(
        %config.addr,
        origin = %config.frontend_origin,
        model = %config.gemini.model,
        "Binding HTTP listener"
    );
    let listener = TcpListener::bind(config.addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP server exited");
    Ok(())
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_gateway(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<ModelError> for ApiError {
    fn from(value: ModelError) -> Self {
        warn!(error = %value, "language model call failed");
        ApiError::bad_gateway(value.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let payload = json!({ "error": self.message });
        (self.status, Json(payload)).into_response()
    }
}

pub fn build_router(state: SharedState, frontend_origin: &str) -> Router {
    let cors = match frontend_origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true),
        Err(_) => {
            warn!(origin = frontend_origin, "invalid frontend origin, CORS disabled");
            CorsLayer::new()
        }
    };
    Router::new()
        .route("/api/health", get(health))
        .route("/api/debug/split", post(debug_split))
        .route("/api/translate", post(translate))
        .route("/api/vocab/detail", post(vocab_detail))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .layer(CompressionLayer::new())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        if let Ok(mut stream) = signal(SignalKind::terminate()) {
            let _ = stream.recv().await;
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Serialize)]
struct SplitPayload {
    count: usize,
    sentences: Vec<String>,
}

async fn debug_split(Json(request): Json<TranslateRequest>) -> Json<SplitPayload> {
    let sentences = split_sentences(&request.text);
    Json(SplitPayload {
        count: sentences.len(),
        sentences,
    })
}

async fn translate(
    State(state): State<SharedState>,
    Json(request): Json<TranslateRequest>,
) -> Result<Json<TranslateResponse>, ApiError> {
    let raw = request.text.trim();
    if raw.is_empty() {
        return Ok(Json(TranslateResponse::default()));
    }
    let parts = split_sentences(raw);
    let translations = state
        .model
        .translate_list(&parts, &request.target_lang, request.mode)
        .await?;
    let sentences = parts
        .into_iter()
        .zip(translations)
        .enumerate()
        .map(|(i, (original, translation))| {
            let tokens = extract_vocab(&original);
            Sentence::new(i as u32, original, translation).with_tokens(tokens)
        })
        .collect::<Vec<_>>();
    info!(count = sentences.len(), "translated passage");
    Ok(Json(TranslateResponse { sentences }))
}

async fn vocab_detail(
    State(state): State<SharedState>,
    Json(request): Json<DetailRequest>,
) -> Result<Json<DetailResponse>, ApiError> {
    if request.lemma.trim().is_empty() {
        return Err(ApiError::bad_request("lemma must not be empty"));
    }
    let response = state
        .cache
        .get_vocab_detail(&request, state.model.as_ref())
        .await?;
    Ok(Json(response))
}

#[cfg(all(test, feature = "web"))]
mod tests {
    use super::*;
    use crate::client::TranslationMode;
    use crate::model::{DetailFields, DetailFlags, Token};
    use async_trait::async_trait;
    use axum::{body, body::Body, http::Request};
    use tower::ServiceExt;

    struct EchoModel {
        fail: bool,
    }

    #[async_trait]
    impl LanguageModel for EchoModel {
        async fn translate_list(
            &self,
            sentences: &[String],
            target_lang: &str,
            _mode: TranslationMode,
        ) -> Result<Vec<String>, ModelError> {
            if self.fail {
                return Err(ModelError::MissingApiKey);
            }
            Ok(sentences
                .iter()
                .map(|s| format!("[{target_lang}] {s}"))
                .collect())
        }

        async fn fill_vocab_fields(
            &self,
            lemma: &str,
            _pos: &str,
            _options: DetailFlags,
        ) -> Result<DetailFields, ModelError> {
            if self.fail {
                return Err(ModelError::MissingApiKey);
            }
            Ok(DetailFields {
                translation: Some(format!("zh:{lemma}")),
                definition: Some(format!("en:{lemma}")),
                example: Some(String::new()),
                level: Some("B1".into()),
            })
        }
    }

    fn test_router(fail: bool) -> Router {
        let state = Arc::new(AppState {
            model: Arc::new(EchoModel { fail }),
            cache: VocabCache::default(),
        });
        build_router(state, "http://localhost:5173")
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn read_json(response: Response) -> serde_json::Value {
        let bytes = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let response = test_router(false)
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.status().is_success());
        assert_eq!(read_json(response).await, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn translate_returns_sentences_with_vocab() {
        let response = test_router(false)
            .oneshot(post_json(
                "/api/translate",
                json!({ "text": "I like apples.  I like bananas." }),
            ))
            .await
            .unwrap();
        assert!(response.status().is_success());
        let bytes = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let payload: TranslateResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(payload.sentences.len(), 2);
        let second = &payload.sentences[1];
        assert_eq!(second.id, 1);
        assert_eq!(second.original, "I like bananas.");
        assert_eq!(second.translation, "[zh-TW] I like bananas.");
        assert!(second.tokens.contains(&Token::new("bananas", "banana", "NOUN")));
    }

    #[tokio::test]
    async fn blank_text_translates_to_nothing() {
        let response = test_router(true)
            .oneshot(post_json("/api/translate", json!({ "text": "   " })))
            .await
            .unwrap();
        assert!(response.status().is_success());
        assert_eq!(read_json(response).await, json!({ "sentences": [] }));
    }

    #[tokio::test]
    async fn model_failure_maps_to_bad_gateway() {
        let response = test_router(true)
            .oneshot(post_json("/api/translate", json!({ "text": "Hello there." })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let payload = read_json(response).await;
        assert!(payload["error"].as_str().unwrap().contains("API key"));
    }

    #[tokio::test]
    async fn vocab_detail_returns_requested_fields_only() {
        let response = test_router(false)
            .oneshot(post_json(
                "/api/vocab/detail",
                json!({
                    "lemma": "banana",
                    "pos": "NOUN",
                    "options": { "translation": true, "definition": false, "example": true, "level": false }
                }),
            ))
            .await
            .unwrap();
        assert!(response.status().is_success());
        assert_eq!(
            read_json(response).await,
            json!({ "lemma": "banana", "pos": "NOUN", "translation": "zh:banana" })
        );
    }

    #[tokio::test]
    async fn debug_split_counts_sentences() {
        let response = test_router(false)
            .oneshot(post_json(
                "/api/debug/split",
                json!({ "text": "One. Two!\nThree?" }),
            ))
            .await
            .unwrap();
        assert_eq!(
            read_json(response).await,
            json!({ "count": 3, "sentences": ["One.", "Two!", "Three?"] })
        );
    }
}
