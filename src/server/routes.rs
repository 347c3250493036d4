//! Router and request handlers.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::dialogue::{ChatOutcome, DialogueEngine};
use crate::session::SessionSnapshot;
use crate::version;

use super::error::{ApiError, ApiJson, ApiQuery};
use super::schema::{
    ChatRequest, CreateSessionRequest, CreateSessionResponse, HealthResponse, NotesQuery,
    NotesResponse, PersonasResponse, PinRequest,
};

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub engine: DialogueEngine,
}

impl AppState {
    pub fn new(engine: DialogueEngine) -> Self {
        Self { engine }
    }
}

/// Build the API router with CORS and request tracing.
pub fn app_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/session", post(create_session))
        .route("/session/{id}", get(get_session))
        .route("/personas", get(list_personas))
        .route("/chat", post(chat))
        .route("/pin", post(pin))
        .route("/notes", get(notes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: version::build_info().version,
        sessions: state.engine.sessions().len(),
    })
}

async fn create_session(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateSessionRequest>,
) -> ApiResult<CreateSessionResponse> {
    let sessions = state.engine.sessions();
    let seed = req.seed.unwrap_or(sessions.settings().default_seed);
    let session_id = sessions.create(seed);
    Ok(Json(CreateSessionResponse { session_id, seed }))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<SessionSnapshot> {
    Ok(Json(state.engine.sessions().get(&id)?))
}

async fn list_personas(State(state): State<AppState>) -> ApiResult<PersonasResponse> {
    let personas = state
        .engine
        .catalog()
        .list()?
        .into_iter()
        .map(|(id, p)| (id, p.card()))
        .collect();
    Ok(Json(PersonasResponse { personas }))
}

async fn chat(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ChatRequest>,
) -> ApiResult<ChatOutcome> {
    let outcome = state
        .engine
        .chat(&req.session_id, &req.persona, &req.message)?;
    info!(
        session_id = %req.session_id,
        persona = %outcome.persona,
        patience_left = outcome.patience_left,
        "Chat turn"
    );
    Ok(Json(outcome))
}

async fn pin(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<PinRequest>,
) -> ApiResult<NotesResponse> {
    let sessions = state.engine.sessions();
    let notes = match req.text {
        Some(text) => sessions.pin(&req.session_id, &req.bucket, text, req.citations)?,
        None => sessions.pin_last_reply(&req.session_id, &req.bucket)?,
    };
    Ok(Json(NotesResponse { notes }))
}

async fn notes(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<NotesQuery>,
) -> ApiResult<NotesResponse> {
    let notes = state.engine.sessions().notes(&query.session_id)?;
    Ok(Json(NotesResponse { notes }))
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::SessionSettings;
    use crate::persona::PersonaCatalog;
    use crate::session::SessionStore;

    fn app() -> Router {
        let engine = DialogueEngine::new(
            Arc::new(PersonaCatalog::new(None)),
            Arc::new(SessionStore::new(SessionSettings::default())),
        );
        app_router(AppState::new(engine))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(b) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    async fn new_session(app: &Router) -> String {
        let (status, body) = send(app, "POST", "/session", Some(json!({"seed": 42}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["seed"], 42);
        body["session_id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let app = app();
        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["sessions"], 0);
    }

    #[tokio::test]
    async fn test_session_default_seed() {
        let app = app();
        let (status, body) = send(&app, "POST", "/session", Some(json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["seed"], 42);

        let id = body["session_id"].as_str().unwrap();
        let (status, snap) = send(&app, "GET", &format!("/session/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(snap["patience"]["finance"], 5);
        assert_eq!(snap["notes"]["tradeoffs"], json!([]));
    }

    #[tokio::test]
    async fn test_personas_listing() {
        let app = app();
        let (status, body) = send(&app, "GET", "/personas", None).await;
        assert_eq!(status, StatusCode::OK);
        let personas = body["personas"].as_object().unwrap();
        assert_eq!(personas.len(), 3);
        assert_eq!(body["personas"]["finance"]["constraints"][0]["type"], "budget");
        assert!(body["personas"]["clinical"]["name"].is_string());
    }

    #[tokio::test]
    async fn test_chat_then_pin_last_reply() {
        let app = app();
        let sid = new_session(&app).await;

        let (status, body) = send(
            &app,
            "POST",
            "/chat",
            Some(json!({
                "session_id": sid,
                "persona": "auto",
                "message": "What about cost overruns this quarter given the current budget?"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["persona"], "finance");
        assert_eq!(body["citations"], json!(["fin-con-01"]));
        assert_eq!(body["patience_left"], 5);
        let reply = body["reply"].as_str().unwrap().to_string();
        assert!(reply.starts_with("Budget: "));

        let (status, body) = send(
            &app,
            "POST",
            "/pin",
            Some(json!({"sessionId": sid, "bucket": "constraints"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["notes"]["constraints"][0]["text"], reply);
        assert_eq!(body["notes"]["constraints"][0]["citations"], json!(["fin-con-01"]));
    }

    #[tokio::test]
    async fn test_pin_explicit_text_and_notes() {
        let app = app();
        let sid = new_session(&app).await;

        for text in ["A", "B"] {
            let (status, _) = send(
                &app,
                "POST",
                "/pin",
                Some(json!({"session_id": sid, "bucket": "constraints", "text": text, "citations": []})),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, body) = send(&app, "GET", &format!("/notes?session_id={sid}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["notes"]["constraints"][0]["text"], "A");
        assert_eq!(body["notes"]["constraints"][1]["text"], "B");
        assert_eq!(body["notes"].as_object().unwrap().len(), 7);
    }

    #[tokio::test]
    async fn test_pin_errors() {
        let app = app();
        let sid = new_session(&app).await;

        let (status, body) = send(
            &app,
            "POST",
            "/pin",
            Some(json!({"session_id": sid, "bucket": "misc", "text": "x"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "E401");

        let (status, body) = send(
            &app,
            "POST",
            "/pin",
            Some(json!({"session_id": sid, "bucket": "states"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "E402");
    }

    #[tokio::test]
    async fn test_unknown_session_is_404_everywhere() {
        let app = app();
        let chat = json!({"session_id": "nope", "persona": "finance", "message": "hello"});
        let pin = json!({"session_id": "nope", "bucket": "states", "text": "x"});

        let cases = [
            send(&app, "POST", "/chat", Some(chat)).await,
            send(&app, "POST", "/pin", Some(pin)).await,
            send(&app, "GET", "/notes?session_id=nope", None).await,
            send(&app, "GET", "/session/nope", None).await,
        ];
        for (status, body) in cases {
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body["error"]["code"], "E400");
            assert_eq!(body["error"]["message"], "Unknown session: nope");
        }
    }

    #[tokio::test]
    async fn test_unknown_persona_is_404() {
        let app = app();
        let sid = new_session(&app).await;
        let (status, body) = send(
            &app,
            "POST",
            "/chat",
            Some(json!({"session_id": sid, "persona": "pharmacist", "message": "hi"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "E300");
    }

    #[tokio::test]
    async fn test_malformed_requests_use_error_envelope() {
        let app = app();
        let sid = new_session(&app).await;

        let cases = [
            send(&app, "POST", "/chat", Some(json!({"session_id": sid}))).await,
            send(&app, "POST", "/pin", Some(json!({"bucket": "states"}))).await,
            send(&app, "POST", "/session", Some(json!({"seed": "forty-two"}))).await,
            send(&app, "GET", "/notes", None).await,
        ];
        for (status, body) in cases {
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"]["code"], "E502");
            assert!(body["error"]["message"]
                .as_str()
                .unwrap()
                .starts_with("Invalid request: "));
        }
    }

    #[tokio::test]
    async fn test_missing_content_type_is_rejected_as_json() {
        let app = app();
        let request = Request::builder()
            .method("POST")
            .uri("/chat")
            .body(Body::from("session_id=x"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "E502");
    }
}
