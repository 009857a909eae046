use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use clap::Parser;
use log::{error, info};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use wavecourse::config::{DEFAULT_WIDTH, ServerConfig, SimParams};
use wavecourse::content::{self, Panel, Topic};
use wavecourse::quiz::{AttemptState, QUESTIONS, QuizError, ReviewEntry};
use wavecourse::render::FrameStats;
use wavecourse::shell::{CourseCard, CourseTab, Route, Shell};
use wavecourse::store::{FileStore, KeyValueStore, MemoryStore};
use wavecourse::surface::png_data_url;
use wavecourse::validate::{LoginForm, User};

type DynStore = Box<dyn KeyValueStore + Send>;

struct AppState {
    shell: Mutex<Shell<DynStore>>,
}

type Shared = State<Arc<AppState>>;
type ApiResult = (StatusCode, Json<Value>);

#[derive(Parser)]
#[command(name = "wavecourse-server")]
#[command(about = "Serve the waves course API and front-end")]
struct Args {
    /// Address to bind
    #[arg(long)]
    addr: Option<SocketAddr>,
    /// Directory with the built front-end
    #[arg(long)]
    frontend: Option<PathBuf>,
    /// JSON file that keeps the session across restarts (memory only if unset)
    #[arg(long)]
    store: Option<PathBuf>,
}

impl Args {
    fn into_config(self) -> ServerConfig {
        let d = ServerConfig::default();
        ServerConfig {
            addr: self.addr.unwrap_or(d.addr),
            frontend_dir: self.frontend.unwrap_or(d.frontend_dir),
            store_path: self.store.or(d.store_path),
        }
    }
}

#[derive(Serialize)]
struct SessionResponse {
    user: Option<User>,
    route: Route,
    path: &'static str,
    tab: CourseTab,
}

#[derive(Deserialize)]
struct NavigateParams {
    path: String,
}

#[derive(Deserialize)]
struct TabRequest {
    tab: String,
}

#[derive(Serialize)]
struct QuestionView {
    id: u32,
    prompt: &'static str,
    options: [&'static str; 4],
}

#[derive(Serialize)]
struct QuizResponse {
    questions: Vec<QuestionView>,
    state: AttemptState,
    answers: Vec<(u32, usize)>,
    answered: usize,
    total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    feedback: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    review: Option<Vec<ReviewEntry>>,
}

#[derive(Deserialize)]
struct AnswerRequest {
    question_id: u32,
    option: usize,
}

#[derive(Deserialize)]
struct FrameRequest {
    #[serde(default)]
    params: SimParams,
    #[serde(default)]
    time_ms: f64,
    width: Option<u32>,
    dpr: Option<f64>,
}

#[derive(Serialize)]
struct FrameResponse {
    data_url: String,
    stats: FrameStats,
    timings: Vec<TimingEntry>,
    width: u32,
    height: u32,
}

#[derive(Serialize)]
struct TimingEntry {
    name: String,
    ms: f64,
}

fn session_of(shell: &Shell<DynStore>) -> SessionResponse {
    SessionResponse {
        user: shell.user().cloned(),
        route: shell.route(),
        path: shell.route().path(),
        tab: shell.tab(),
    }
}

fn quiz_of(shell: &Shell<DynStore>) -> QuizResponse {
    let attempt = shell.quiz();
    QuizResponse {
        questions: QUESTIONS
            .iter()
            .map(|q| QuestionView {
                id: q.id,
                prompt: q.prompt,
                options: q.options,
            })
            .collect(),
        state: attempt.state(),
        answers: QUESTIONS
            .iter()
            .filter_map(|q| attempt.answer(q.id).map(|a| (q.id, a)))
            .collect(),
        answered: attempt.answered_count(),
        total: QUESTIONS.len(),
        score: attempt.score(),
        feedback: attempt.feedback(),
        review: attempt.review(),
    }
}

fn unauthorized() -> ApiResult {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": "not signed in" })))
}

fn ok<T: Serialize>(body: T) -> ApiResult {
    match serde_json::to_value(body) {
        Ok(v) => (StatusCode::OK, Json(v)),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        ),
    }
}

fn quiz_error(e: QuizError) -> ApiResult {
    let status = match e {
        QuizError::UnknownQuestion(_) | QuizError::InvalidOption { .. } => StatusCode::BAD_REQUEST,
        QuizError::Incomplete { .. } | QuizError::AlreadySubmitted => StatusCode::CONFLICT,
    };
    (status, Json(json!({ "error": e.to_string() })))
}

async fn login_handler(State(state): Shared, Json(form): Json<LoginForm>) -> ApiResult {
    let mut shell = state.shell.lock().await;
    let result = shell.login(&form).map(|_| ());
    match result {
        Ok(()) => ok(session_of(&shell)),
        Err(errors) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "errors": errors })),
        ),
    }
}

async fn logout_handler(State(state): Shared) -> ApiResult {
    let mut shell = state.shell.lock().await;
    shell.logout();
    ok(session_of(&shell))
}

async fn session_handler(State(state): Shared) -> ApiResult {
    let shell = state.shell.lock().await;
    ok(session_of(&shell))
}

async fn navigate_handler(State(state): Shared, Query(p): Query<NavigateParams>) -> ApiResult {
    let mut shell = state.shell.lock().await;
    shell.navigate_path(&p.path);
    ok(session_of(&shell))
}

async fn courses_handler(State(state): Shared) -> ApiResult {
    let shell = state.shell.lock().await;
    match shell.courses() {
        Some(c) => ok::<&[CourseCard]>(c),
        None => unauthorized(),
    }
}

async fn content_handler(State(state): Shared, Path(topic): Path<String>) -> ApiResult {
    let mut shell = state.shell.lock().await;
    if shell.user().is_none() {
        return unauthorized();
    }
    let Some(topic) = Topic::parse(&topic) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("unknown topic {topic}") })),
        );
    };
    shell.set_topic(topic);
    let panels: &[Panel] = content::panels(topic);
    ok(json!({ "topic": topic, "title": topic.label(), "panels": panels }))
}

async fn tab_handler(State(state): Shared, Json(req): Json<TabRequest>) -> ApiResult {
    let mut shell = state.shell.lock().await;
    if shell.user().is_none() {
        return unauthorized();
    }
    shell.set_tab(CourseTab::parse_or_default(&req.tab));
    ok(session_of(&shell))
}

async fn quiz_handler(State(state): Shared) -> ApiResult {
    let shell = state.shell.lock().await;
    if shell.user().is_none() {
        return unauthorized();
    }
    ok(quiz_of(&shell))
}

async fn answer_handler(State(state): Shared, Json(req): Json<AnswerRequest>) -> ApiResult {
    let mut shell = state.shell.lock().await;
    if shell.user().is_none() {
        return unauthorized();
    }
    match shell.quiz_mut().select_answer(req.question_id, req.option) {
        Ok(()) => ok(quiz_of(&shell)),
        Err(e) => quiz_error(e),
    }
}

async fn submit_handler(State(state): Shared) -> ApiResult {
    let mut shell = state.shell.lock().await;
    if shell.user().is_none() {
        return unauthorized();
    }
    match shell.quiz_mut().submit() {
        Ok(_) => ok(quiz_of(&shell)),
        Err(e) => quiz_error(e),
    }
}

async fn retake_handler(State(state): Shared) -> ApiResult {
    let mut shell = state.shell.lock().await;
    if shell.user().is_none() {
        return unauthorized();
    }
    shell.quiz_mut().retake();
    ok(quiz_of(&shell))
}

async fn frame_handler(Json(req): Json<FrameRequest>) -> ApiResult {
    let params = req.params.clamped();
    let width = req.width.unwrap_or(DEFAULT_WIDTH).clamp(1, 4096);
    let dpr = req.dpr.unwrap_or(1.0);
    let elapsed = req.time_ms.max(0.0) / 1000.0;

    let rendered = tokio::task::spawn_blocking(move || {
        let (frame, png, timings) = wavecourse::render_frame(&params, width, dpr, elapsed, true)?;
        let data_url = png.as_deref().map(png_data_url).unwrap_or_default();
        Ok::<_, wavecourse::Error>(FrameResponse {
            data_url,
            stats: frame.stats,
            timings: timings
                .iter()
                .map(|t| TimingEntry {
                    name: t.name.to_string(),
                    ms: t.ms,
                })
                .collect(),
            width: frame.surface.w as u32,
            height: frame.surface.h as u32,
        })
    })
    .await;

    match rendered {
        Ok(Ok(resp)) => ok(resp),
        Ok(Err(e)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        ),
        Err(e) => {
            error!("frame task failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "frame task failed" })),
            )
        }
    }
}

fn open_store(config: &ServerConfig) -> Result<DynStore, wavecourse::Error> {
    Ok(match &config.store_path {
        Some(path) => {
            let store = FileStore::open(path)?;
            info!("session store at {}", store.path().display());
            Box::new(store)
        }
        None => {
            info!("session kept in memory only");
            Box::new(MemoryStore::new())
        }
    })
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Args::parse().into_config();
    let store = match open_store(&config) {
        Ok(s) => s,
        Err(e) => {
            error!("{}", e);
            return std::process::ExitCode::FAILURE;
        }
    };

    let state = Arc::new(AppState {
        shell: Mutex::new(Shell::new(store)),
    });

    let app = Router::new()
        .route("/api/login", post(login_handler))
        .route("/api/logout", post(logout_handler))
        .route("/api/session", get(session_handler))
        .route("/api/navigate", get(navigate_handler))
        .route("/api/courses", get(courses_handler))
        .route("/api/content/{topic}", get(content_handler))
        .route("/api/course/tab", post(tab_handler))
        .route("/api/quiz", get(quiz_handler))
        .route("/api/quiz/answer", post(answer_handler))
        .route("/api/quiz/submit", post(submit_handler))
        .route("/api/quiz/retake", post(retake_handler))
        .route("/api/wave/frame", post(frame_handler))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .fallback_service(ServeDir::new(&config.frontend_dir));

    let listener = match tokio::net::TcpListener::bind(config.addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("bind {}: {}", config.addr, e);
            return std::process::ExitCode::FAILURE;
        }
    };
    info!("wavecourse server at http://{}", config.addr);

    if let Err(e) = axum::serve(listener, app).await {
        error!("server error: {}", e);
        return std::process::ExitCode::FAILURE;
    }
    std::process::ExitCode::SUCCESS
}
