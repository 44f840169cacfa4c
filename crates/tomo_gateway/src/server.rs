use crate::types::{ErrorBody, GenerateBody, TargetOption, TargetsResponse, TtsBody};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tomo_core::{display_for, targets_for, GenerationRequest, NarrationSynth, PhaseGenerator};
use tomo_reasoning::GenerationError;
use tower_http::cors::CorsLayer;

/// Services the HTTP handlers call into.
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<dyn PhaseGenerator>,
    /// `None` when narration is not configured.
    pub narration: Option<Arc<dyn NarrationSynth>>,
}

/// The HTTP API server.
///
/// - `POST /api/generate`: six-phase script for a journey
/// - `POST /api/tts`: MP3 narration for a text
/// - `GET /api/emotions/:id/targets`: directions offered for an emotion
/// - `GET /health`: health check
pub struct GatewayServer {
    state: AppState,
    host: String,
    port: u16,
}

impl GatewayServer {
    pub fn new(state: AppState, host: &str, port: u16) -> Self {
        Self {
            state,
            host: host.to_string(),
            port,
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Start the server. This spawns a background task and returns the join handle.
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        let app = router(self.state.clone());
        let addr = self.addr();

        tokio::spawn(async move {
            let listener = match tokio::net::TcpListener::bind(&addr).await {
                Ok(l) => l,
                Err(e) => {
                    tracing::error!("Gateway failed to bind {}: {}", addr, e);
                    return;
                }
            };
            tracing::info!("Gateway listening on {}", addr);
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("Gateway server error: {}", e);
            }
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/generate", post(generate))
        .route("/api/tts", post(tts))
        .route("/api/emotions/:id/targets", get(targets))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn error(status: StatusCode, body: ErrorBody) -> Response {
    (status, Json(body)).into_response()
}

// ============================================================================
// Route handlers
// ============================================================================

async fn health() -> &'static str {
    "ok"
}

/// POST /api/generate
async fn generate(State(state): State<AppState>, Json(body): Json<GenerateBody>) -> Response {
    let request = GenerationRequest::from(body);
    match state.generator.generate(&request).await {
        Ok(phases) => Json(phases).into_response(),
        Err(e) => match e.downcast_ref::<GenerationError>() {
            Some(GenerationError::MissingEmotion) => {
                error(StatusCode::BAD_REQUEST, ErrorBody::new(e.to_string()))
            }
            Some(failure) if failure.is_malformed_output() => {
                tracing::warn!("generate: {}", failure);
                error(
                    StatusCode::BAD_GATEWAY,
                    ErrorBody {
                        error: failure.to_string(),
                        raw: failure.raw().map(str::to_string),
                    },
                )
            }
            _ => {
                tracing::error!("generate failed: {:#}", e);
                error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::new(format!("{:#}", e)),
                )
            }
        },
    }
}

/// POST /api/tts
async fn tts(State(state): State<AppState>, Json(body): Json<TtsBody>) -> Response {
    let text = body.text.unwrap_or_default();
    if text.trim().is_empty() {
        return error(StatusCode::BAD_REQUEST, ErrorBody::new("text is required"));
    }
    let Some(synth) = state.narration else {
        return error(
            StatusCode::SERVICE_UNAVAILABLE,
            ErrorBody::new("narration is not configured"),
        );
    };
    match synth.synthesize(&text).await {
        Ok(audio) => ([(header::CONTENT_TYPE, "audio/mpeg")], audio).into_response(),
        Err(e) => {
            tracing::warn!("tts via {} failed: {:#}", synth.provider_name(), e);
            error(StatusCode::BAD_GATEWAY, ErrorBody::new(format!("{:#}", e)))
        }
    }
}

/// GET /api/emotions/:id/targets
async fn targets(Path(id): Path<String>) -> Json<TargetsResponse> {
    let current = id.trim().to_lowercase();
    let targets = targets_for(Some(&current))
        .iter()
        .map(|t| TargetOption::new(t, display_for(t)))
        .collect();
    Json(TargetsResponse { current, targets })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::to_bytes;
    use tomo_core::{MeditationPhase, PhaseName};

    struct FixedGenerator(fn() -> anyhow::Result<Vec<MeditationPhase>>);

    #[async_trait]
    impl PhaseGenerator for FixedGenerator {
        async fn generate(
            &self,
            request: &GenerationRequest,
        ) -> anyhow::Result<Vec<MeditationPhase>> {
            if request.current_emotion.is_empty() || request.target_emotion.is_none() {
                return Err(GenerationError::MissingEmotion.into());
            }
            (self.0)()
        }
    }

    struct Speech(bool);

    #[async_trait]
    impl NarrationSynth for Speech {
        async fn synthesize(&self, _text: &str) -> anyhow::Result<Vec<u8>> {
            if self.0 {
                Ok(vec![0xFF, 0xFB])
            } else {
                anyhow::bail!("upstream 500")
            }
        }
        fn voice_id(&self) -> &str {
            "alloy"
        }
        fn provider_name(&self) -> &'static str {
            "test"
        }
    }

    fn ok_phases() -> anyhow::Result<Vec<MeditationPhase>> {
        Ok(PhaseName::ALL
            .iter()
            .map(|p| MeditationPhase::new(p.as_str(), "breathe", Some(30)))
            .collect())
    }

    fn short_phases() -> anyhow::Result<Vec<MeditationPhase>> {
        Err(GenerationError::WrongPhaseCount {
            count: 2,
            raw: "[1,2]".into(),
        }
        .into())
    }

    fn broken() -> anyhow::Result<Vec<MeditationPhase>> {
        anyhow::bail!("database unreachable")
    }

    fn state(
        generator: fn() -> anyhow::Result<Vec<MeditationPhase>>,
        speech: Option<bool>,
    ) -> AppState {
        AppState {
            generator: Arc::new(FixedGenerator(generator)),
            narration: speech.map(|ok| Arc::new(Speech(ok)) as Arc<dyn NarrationSynth>),
        }
    }

    fn body(current: Option<&str>, target: Option<&str>) -> Json<GenerateBody> {
        Json(GenerateBody {
            current_emotion: current.map(str::to_string),
            target_emotion: target.map(str::to_string),
            note: None,
        })
    }

    async fn json_of(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        assert_eq!(health().await, "ok");
    }

    #[tokio::test]
    async fn test_generate_ok() {
        let response = generate(
            State(state(ok_phases, None)),
            body(Some("sad"), Some("hopeful")),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_of(response).await;
        assert_eq!(json.as_array().unwrap().len(), 6);
        assert_eq!(json[0]["phase"], "Awareness");
        assert_eq!(json[0]["theme"]["duration"], 30);
    }

    #[tokio::test]
    async fn test_generate_missing_emotion() {
        let response = generate(State(state(ok_phases, None)), body(Some("sad"), None)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_of(response).await;
        assert_eq!(json["error"], "currentEmotion and targetEmotion are required");
    }

    #[tokio::test]
    async fn test_generate_malformed_output() {
        let response = generate(
            State(state(short_phases, None)),
            body(Some("sad"), Some("calm")),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let json = json_of(response).await;
        assert_eq!(json["error"], "AI did not return 6 phases");
        assert_eq!(json["raw"], "[1,2]");
    }

    #[tokio::test]
    async fn test_generate_other_failure() {
        let response = generate(State(state(broken, None)), body(Some("sad"), Some("calm"))).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(json_of(response).await.get("raw").is_none());
    }

    #[tokio::test]
    async fn test_tts_statuses() {
        let text = || Json(TtsBody { text: Some("Breathe.".into()) });

        let response = tts(State(state(ok_phases, Some(true))), text()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/mpeg");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], &[0xFF, 0xFB]);

        let response = tts(State(state(ok_phases, Some(true))), Json(TtsBody { text: None })).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = tts(State(state(ok_phases, None)), text()).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = tts(State(state(ok_phases, Some(false))), text()).await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_targets() {
        let Json(resp) = targets(Path("Anxious".to_string())).await;
        assert_eq!(resp.current, "anxious");
        let ids: Vec<_> = resp.targets.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["calm", "grounded", "peaceful"]);
        assert!(!resp.targets[0].emoji.is_empty());

        let Json(resp) = targets(Path("???".to_string())).await;
        let ids: Vec<_> = resp.targets.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["calm", "peaceful", "content"]);
    }

    #[tokio::test]
    async fn test_gateway_server_creates() {
        let server = GatewayServer::new(state(ok_phases, None), "127.0.0.1", 0);
        assert_eq!(server.addr(), "127.0.0.1:0");
        let _router = router(server.state.clone());
    }
}
