use axum::{
    Json, Router,
    body::Body,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{HeaderValue, StatusCode, header},
    response::{Html, Response},
    routing::{get, post},
};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use tracing::info;

use crate::AppState;
use crate::chat::{
    ChatSession, ChatSessions, DEFAULT_IDLE_TIMEOUT, ReplyView, Role, SendOutcome,
    SystemUiData, split_reply,
};
use crate::config::AppConfig;
use crate::content::{Content, Language, SiteContent};
use crate::events::{ChatEvent, sse_event};
use crate::genai::{GeminiDriver, GenAiSettings, TextStreamer};
use crate::rate_limit::{SimpleRateLimiter, rate_limit_middleware};
use crate::store::{FileStore, validate_name};
use crate::ui;
use crate::visuals::{Visual, VisualService};

/// How often idle chat sessions are dropped from memory.
const EVICTION_INTERVAL: Duration = Duration::from_secs(60);

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>, settings: GenAiSettings) -> anyhow::Result<()> {
    info!(
        name: "genai.config.loaded",
        base_url = %settings.base_url,
        model = %settings.model,
        image_model = %settings.image_model,
        api_key_present = settings.api_key.is_some(),
        "GenAI configuration loaded"
    );
    if settings.api_key.is_none() {
        tracing::warn!(
            name: "genai.api_key.missing",
            "GEMINI_API_KEY is not set; chat turns will fail and visuals fall back"
        );
    }

    let content = SiteContent::load(config.content.path.as_deref())?;
    info!(
        name: "content.loaded",
        source = %config
            .content
            .path
            .as_ref()
            .map_or_else(|| "embedded".to_string(), |p| p.display().to_string()),
        "Site content loaded"
    );

    let store = Arc::new(FileStore::new(config.storage.data_dir.clone()));
    let sessions = ChatSessions::new(store);
    let driver = Arc::new(GeminiDriver::new(settings));

    let rate_limiter = Arc::new(SimpleRateLimiter::new(
        config.resilience.requests_per_second,
        config.resilience.burst_size,
    ));

    let state = AppState {
        sessions: sessions.clone(),
        streamer: Arc::clone(&driver) as Arc<dyn TextStreamer>,
        visuals: VisualService::new(driver),
        content: Arc::new(content),
        rate_limiter,
        config: Arc::clone(&config),
    };

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(EVICTION_INTERVAL);
        loop {
            ticker.tick().await;
            let removed = sessions.evict_idle(DEFAULT_IDLE_TIMEOUT);
            if removed > 0 {
                tracing::debug!(
                    name: "chat.sessions.evicted",
                    removed,
                    remaining = sessions.len(),
                    "Evicted idle chat sessions"
                );
            }
        }
    });

    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        data_dir = %config.storage.data_dir.display(),
        rate_limit = config.resilience.rate_limit_enabled,
        "Server started"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/content/{lang}", get(api_content))
        .route("/chat", post(api_chat))
        .route("/chat/prompts", get(api_prompts))
        .route(
            "/chat/history",
            get(api_get_history).delete(api_clear_history),
        )
        .route("/chat/history/fragment", get(api_history_fragment))
        .route("/visuals/project", post(api_project_visual))
        .route("/visuals/service", post(api_service_visual))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    Router::new()
        .route("/", get(page))
        .route("/healthz", get(healthz))
        .nest("/api", api)
        .nest_service("/static", ServeDir::new("static"))
        .layer(DefaultBodyLimit::max(64 * 1024))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

// ─────────────────────────────────────────────────────────────────────────────
// Page
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct LangQuery {
    #[serde(default)]
    lang: Option<String>,
}

impl LangQuery {
    /// Unknown or missing codes fall back to English.
    fn language(&self) -> Language {
        self.lang
            .as_deref()
            .and_then(|code| code.parse().ok())
            .unwrap_or_default()
    }
}

/// GET / - Page shell in the requested language.
async fn page(State(state): State<AppState>, Query(query): Query<LangQuery>) -> Html<String> {
    let lang = query.language();
    Html(ui::page::render(state.content.get(lang), lang))
}

async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

// ─────────────────────────────────────────────────────────────────────────────
// API Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET /api/content/{lang} - Site copy as JSON.
async fn api_content(
    State(state): State<AppState>,
    Path(lang): Path<String>,
) -> Result<Json<Content>, (StatusCode, String)> {
    let lang: Language = lang
        .parse()
        .map_err(|e: crate::content::UnknownLanguage| (StatusCode::NOT_FOUND, e.to_string()))?;
    Ok(Json(state.content.get(lang).clone()))
}

#[derive(Debug, Serialize)]
struct PromptsResponse {
    lang: Language,
    prompts: &'static [&'static str],
}

/// GET /api/chat/prompts - Suggested prompts for the empty widget.
async fn api_prompts(Query(query): Query<LangQuery>) -> Json<PromptsResponse> {
    let lang = query.language();
    Json(PromptsResponse {
        lang,
        prompts: lang.suggested_prompts(),
    })
}

/// Request body for chat API.
#[derive(Debug, Deserialize)]
struct ChatRequest {
    /// User message content.
    message: String,
    #[serde(default)]
    lang: Language,
    /// Visitor id; a new one is assigned when absent.
    #[serde(default)]
    visitor_id: Option<String>,
}

/// POST /api/chat - Send a message and stream the answer as SSE.
async fn api_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Response, (StatusCode, String)> {
    let visitor_id = match req.visitor_id.filter(|id| !id.is_empty()) {
        Some(id) => checked_visitor_id(id)?,
        None => ChatSessions::new_visitor_id(),
    };

    tracing::info!(
        visitor_id = %visitor_id,
        lang = %req.lang,
        chars = req.message.chars().count(),
        "Received chat request"
    );

    let session = state.sessions.get_or_open(&visitor_id).await;
    let outcome = session
        .send(&req.message, req.lang, Arc::clone(&state.streamer))
        .await;

    let stream = match outcome {
        SendOutcome::Rejected(reason) => {
            return Ok(single_event_sse(&ChatEvent::Rejected { reason }));
        }
        SendOutcome::Started(stream) => stream,
    };

    let sse_stream = stream.map(|event| Ok::<String, Infallible>(sse_event(&event)));
    Ok(build_sse_response(Body::from_stream(sse_stream)))
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    visitor_id: String,
    #[serde(default)]
    lang: Option<String>,
}

/// Message DTO for API responses.
#[derive(Debug, Serialize)]
struct MessageDto {
    role: Role,
    text: String,
    /// Display prose; for AI messages the annotation is cut out.
    prose: String,
    panel: Option<SystemUiData>,
}

/// GET /api/chat/history - Stored messages with the prose/panel split.
async fn api_get_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<MessageDto>>, (StatusCode, String)> {
    let session = open_session(&state, query.visitor_id).await?;
    let messages = session
        .messages()
        .into_iter()
        .map(|m| {
            let ReplyView { prose, panel } = match m.role {
                Role::Ai => split_reply(&m.text),
                Role::User => ReplyView {
                    prose: m.text.clone(),
                    panel: None,
                },
            };
            MessageDto {
                role: m.role,
                text: m.text,
                prose,
                panel,
            }
        })
        .collect();
    Ok(Json(messages))
}

/// GET /api/chat/history/fragment - Rendered history for the widget.
async fn api_history_fragment(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Html<String>, (StatusCode, String)> {
    let lang = LangQuery { lang: query.lang }.language();
    let session = open_session(&state, query.visitor_id).await?;
    Ok(Html(ui::history::render(&session.messages(), lang)))
}

/// DELETE /api/chat/history - Clear a visitor's history.
async fn api_clear_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<StatusCode, (StatusCode, String)> {
    let session = open_session(&state, query.visitor_id).await?;
    session.clear().await;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct ProjectVisualRequest {
    title: String,
    category: String,
}

/// POST /api/visuals/project - Regenerate a portfolio visual.
async fn api_project_visual(
    State(state): State<AppState>,
    Json(req): Json<ProjectVisualRequest>,
) -> Result<Json<Visual>, (StatusCode, String)> {
    if req.title.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "title is required".to_string()));
    }
    Ok(Json(
        state
            .visuals
            .project_visual(req.title.trim(), req.category.trim())
            .await,
    ))
}

#[derive(Debug, Deserialize)]
struct ServiceVisualRequest {
    name: String,
}

/// POST /api/visuals/service - Regenerate a service visual.
async fn api_service_visual(
    State(state): State<AppState>,
    Json(req): Json<ServiceVisualRequest>,
) -> Result<Json<Visual>, (StatusCode, String)> {
    if req.name.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "name is required".to_string()));
    }
    Ok(Json(state.visuals.service_visual(req.name.trim()).await))
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn checked_visitor_id(id: String) -> Result<String, (StatusCode, String)> {
    validate_name(&id).map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    Ok(id)
}

async fn open_session(
    state: &AppState,
    visitor_id: String,
) -> Result<ChatSession, (StatusCode, String)> {
    let visitor_id = checked_visitor_id(visitor_id)?;
    Ok(state.sessions.get_or_open(&visitor_id).await)
}

fn single_event_sse(event: &ChatEvent) -> Response {
    let payload = format!("{}{}", sse_event(event), sse_event(&ChatEvent::Done));
    build_sse_response(Body::from(payload))
}

fn build_sse_response(body: Body) -> Response {
    let mut resp = Response::new(body);
    let h = resp.headers_mut();
    h.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/event-stream"));
    h.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    h.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    h.insert("X-Accel-Buffering", HeaderValue::from_static("no"));
    resp
}
