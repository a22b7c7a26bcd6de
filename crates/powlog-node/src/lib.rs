//! HTTP shell around a [`Chain`]: user registration, authenticated appends
//! and chain verification.

pub mod users;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use powlog_core::{Block, Chain, ChainError, ChainStore};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::{Arc, Mutex};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub use users::UserRegistry;

pub type SharedChain = Arc<Mutex<Chain<dyn ChainStore>>>;

#[derive(Clone)]
pub struct AppState {
    pub chain: SharedChain,
    pub users: Arc<UserRegistry>,
}

impl AppState {
    pub fn new(chain: Chain<dyn ChainStore>) -> Self {
        Self {
            chain: Arc::new(Mutex::new(chain)),
            users: Arc::new(UserRegistry::new()),
        }
    }
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

#[derive(Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct AddBlock {
    pub username: String,
    pub password: String,
    pub data: String,
    pub fee: f64,
}

#[derive(Serialize)]
struct ChainView {
    difficulty: usize,
    length: usize,
    blocks: Vec<Block>,
}

/// Anything that went wrong on our side; always a 500.
pub struct ApiError(anyhow::Error);

impl<E: Into<anyhow::Error>> From<E> for ApiError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!("request failed: {:#}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "success": false, "message": format!("{:#}", self.0) })),
        )
            .into_response()
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(Health { status: "ok" }) }))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/add_block", post(add_block))
        .route("/verify_chain", get(verify_chain))
        .route("/chain", get(show_chain))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run `f` on the blocking pool; mining and password hashing are CPU-bound.
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(f).await??)
}

fn lock(chain: &SharedChain) -> anyhow::Result<std::sync::MutexGuard<'_, Chain<dyn ChainStore>>> {
    chain
        .lock()
        .map_err(|_| anyhow::anyhow!("chain lock poisoned"))
}

async fn register(
    State(state): State<AppState>,
    Form(form): Form<Credentials>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let users = state.users.clone();
    let username = form.username.clone();
    let success = blocking(move || users.register(&form.username, &form.password)).await?;
    if success {
        info!("registered user {username}");
    }
    Ok(Json(json!({ "success": success })))
}

async fn login(
    State(state): State<AppState>,
    Form(form): Form<Credentials>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let users = state.users.clone();
    let success = blocking(move || users.authenticate(&form.username, &form.password)).await?;
    Ok(Json(json!({ "success": success })))
}

async fn add_block(
    State(state): State<AppState>,
    Form(form): Form<AddBlock>,
) -> Result<Response, ApiError> {
    let AddBlock {
        username,
        password,
        data,
        fee,
    } = form;

    let users = state.users.clone();
    let who = username.clone();
    if !blocking(move || users.authenticate(&who, &password)).await? {
        warn!("rejected append from {username}: bad credentials");
        let body = json!({ "success": false, "message": "Authentication failed!" });
        return Ok((StatusCode::UNAUTHORIZED, Json(body)).into_response());
    }

    // One lock across read-tip, mine, append and persist.
    let chain = state.chain.clone();
    let appended = blocking(move || {
        let mut chain = lock(&chain)?;
        let appended = chain.append(data, fee).map(Block::clone);
        Ok(appended)
    })
    .await?;
    let block = match appended {
        Ok(block) => block,
        Err(e @ ChainError::InvalidFee(_)) => {
            let body = json!({ "success": false, "message": e.to_string() });
            return Ok((StatusCode::BAD_REQUEST, Json(body)).into_response());
        }
        Err(e) => return Err(e.into()),
    };

    info!("{username} appended block {}", block.hash());
    let body = json!({
        "success": true,
        "message": "Block added successfully!",
        "block": block,
    });
    Ok(Json(body).into_response())
}

async fn verify_chain(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let chain = state.chain.clone();
    let valid = blocking(move || {
        let chain = lock(&chain)?;
        Ok(chain.verify())
    })
    .await?;
    Ok(Json(json!({ "valid": valid })))
}

async fn show_chain(State(state): State<AppState>) -> Result<Json<ChainView>, ApiError> {
    let chain = state.chain.clone();
    let view = blocking(move || {
        let chain = lock(&chain)?;
        let view = ChainView {
            difficulty: chain.difficulty(),
            length: chain.len(),
            blocks: chain.blocks().to_vec(),
        };
        Ok(view)
    })
    .await?;
    Ok(Json(view))
}
