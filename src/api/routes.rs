use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Router,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::api::extract::ApiJson;
use crate::wager::{
    Bet, BetId, BetStatus, Group, GroupId, LedgerEntry, NewBet, Resolution, Side, User, UserId,
    WagerError, WagerStore,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<WagerStore>>,
}

impl AppState {
    pub fn new(store: WagerStore) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
        }
    }
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/users", post(create_user).get(find_user))
        .route("/api/users/:id", get(get_user))
        .route("/api/users/:id/avatar", put(update_avatar))
        .route("/api/users/:id/groups", get(user_groups))
        .route("/api/users/:id/bets", get(user_bets))
        .route("/api/users/:id/balance", get(user_balance))
        .route("/api/users/:id/ledger", get(user_ledger))
        .route("/api/groups", post(create_group))
        .route("/api/groups/join", post(join_group))
        .route("/api/groups/:id", get(get_group))
        .route("/api/groups/:id/bets", get(group_bets))
        .route("/api/bets", post(create_bet))
        .route("/api/bets/:id", get(get_bet))
        .route("/api/bets/:id/accept", post(accept_bet))
        .route("/api/bets/:id/proof", post(submit_proof))
        .route("/api/bets/:id/vote", post(vote_on_bet))
        .route("/api/bets/:id/resolve", post(resolve_bet))
        .route("/api/bets/:id/status", post(update_bet_status))
        .route("/api/bets/:id/progress", post(progress_bet))
        .route("/api/bets/:id/ledger", get(bet_ledger))
        .route("/api/ledger", post(add_ledger_entry))
        .with_state(state)
}

// ===== Route Handlers =====

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// Users

async fn create_user(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = state
        .store
        .write()
        .create_user(&req.email, &req.display_name, req.avatar)?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn find_user(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<User>, ApiError> {
    state
        .store
        .read()
        .get_user_by_email(&query.email)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No user with email {}", query.email)))
}

async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<Json<User>, ApiError> {
    state
        .store
        .read()
        .get_user(&id)
        .cloned()
        .map(Json)
        .ok_or(ApiError::Wager(WagerError::UserNotFound { user_id: id }))
}

async fn update_avatar(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    ApiJson(req): ApiJson<AvatarRequest>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.store.write().update_avatar(&id, req.avatar)?))
}

async fn user_groups(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<Json<Vec<Group>>, ApiError> {
    let store = state.store.read();
    if store.get_user(&id).is_none() {
        return Err(WagerError::UserNotFound { user_id: id }.into());
    }
    Ok(Json(store.user_groups(&id)))
}

async fn user_bets(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<Json<Vec<Bet>>, ApiError> {
    let store = state.store.read();
    if store.get_user(&id).is_none() {
        return Err(WagerError::UserNotFound { user_id: id }.into());
    }
    Ok(Json(store.user_bets(&id)))
}

async fn user_balance(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let balance = state.store.read().user_balance(&id)?;
    Ok(Json(BalanceResponse {
        user_id: id,
        balance,
    }))
}

async fn user_ledger(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<Json<Vec<LedgerEntry>>, ApiError> {
    Ok(Json(state.store.read().user_ledger(&id)?))
}

// Groups

async fn create_group(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateGroupRequest>,
) -> Result<(StatusCode, Json<Group>), ApiError> {
    let group = state.store.write().create_group(&req.name, req.creator_id)?;
    Ok((StatusCode::CREATED, Json(group)))
}

async fn join_group(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<JoinGroupRequest>,
) -> Result<Json<Group>, ApiError> {
    Ok(Json(state.store.write().join_group(&req.code, req.user_id)?))
}

async fn get_group(
    State(state): State<AppState>,
    Path(id): Path<GroupId>,
) -> Result<Json<Group>, ApiError> {
    state
        .store
        .read()
        .get_group(&id)
        .cloned()
        .map(Json)
        .ok_or(ApiError::Wager(WagerError::GroupNotFound { group_id: id }))
}

async fn group_bets(
    State(state): State<AppState>,
    Path(id): Path<GroupId>,
) -> Result<Json<Vec<Bet>>, ApiError> {
    Ok(Json(state.store.read().group_bets(&id)?))
}

// Bets

async fn create_bet(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<NewBet>,
) -> Result<(StatusCode, Json<Bet>), ApiError> {
    let bet = state.store.write().create_bet(req)?;
    Ok((StatusCode::CREATED, Json(bet)))
}

async fn get_bet(
    State(state): State<AppState>,
    Path(id): Path<BetId>,
) -> Result<Json<Bet>, ApiError> {
    state
        .store
        .read()
        .get_bet(&id)
        .cloned()
        .map(Json)
        .ok_or(ApiError::Wager(WagerError::BetNotFound { bet_id: id }))
}

async fn accept_bet(
    State(state): State<AppState>,
    Path(id): Path<BetId>,
    ApiJson(req): ApiJson<SideRequest>,
) -> Result<Json<Bet>, ApiError> {
    let bet = state.store.write().accept_bet(&id, req.user_id, req.side)?;
    Ok(Json(bet))
}

async fn submit_proof(
    State(state): State<AppState>,
    Path(id): Path<BetId>,
    ApiJson(req): ApiJson<ProofRequest>,
) -> Result<Json<Bet>, ApiError> {
    let bet = state.store.write().submit_proof(&id, req.user_id, &req.text)?;
    Ok(Json(bet))
}

async fn vote_on_bet(
    State(state): State<AppState>,
    Path(id): Path<BetId>,
    ApiJson(req): ApiJson<SideRequest>,
) -> Result<Json<Resolution>, ApiError> {
    let resolution = state.store.write().vote_on_bet(&id, req.user_id, req.side)?;
    Ok(Json(resolution))
}

async fn resolve_bet(
    State(state): State<AppState>,
    Path(id): Path<BetId>,
    ApiJson(req): ApiJson<ResolveRequest>,
) -> Result<Json<Resolution>, ApiError> {
    Ok(Json(state.store.write().resolve_bet(&id, req.winner)?))
}

async fn update_bet_status(
    State(state): State<AppState>,
    Path(id): Path<BetId>,
    ApiJson(req): ApiJson<StatusRequest>,
) -> Result<Json<Bet>, ApiError> {
    let status = BetStatus::from_str(&req.status).ok_or_else(|| WagerError::InvalidInput {
        field: "status",
        reason: format!("unknown status {:?}", req.status),
    })?;
    Ok(Json(state.store.write().update_bet_status(&id, status)?))
}

async fn progress_bet(
    State(state): State<AppState>,
    Path(id): Path<BetId>,
) -> Result<Json<ProgressResponse>, ApiError> {
    let status = state.store.write().check_and_progress_bet(&id)?;
    Ok(Json(ProgressResponse { bet_id: id, status }))
}

async fn bet_ledger(
    State(state): State<AppState>,
    Path(id): Path<BetId>,
) -> Result<Json<Vec<LedgerEntry>>, ApiError> {
    Ok(Json(state.store.read().bet_ledger(&id)?))
}

// Ledger

async fn add_ledger_entry(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LedgerEntryRequest>,
) -> Result<(StatusCode, Json<LedgerEntry>), ApiError> {
    let entry = state
        .store
        .write()
        .add_ledger_entry(req.user_id, req.bet_id, req.amount)?;
    Ok((StatusCode::CREATED, Json(entry)))
}

// ===== Request/Response Types =====

#[derive(Deserialize)]
struct CreateUserRequest {
    email: String,
    display_name: String,
    avatar: Option<String>,
}

#[derive(Deserialize)]
struct UserQuery {
    email: String,
}

#[derive(Deserialize)]
struct AvatarRequest {
    avatar: Option<String>,
}

#[derive(Deserialize)]
struct CreateGroupRequest {
    name: String,
    creator_id: UserId,
}

#[derive(Deserialize)]
struct JoinGroupRequest {
    code: String,
    user_id: UserId,
}

/// Body for accepting a side or voting for one
#[derive(Deserialize)]
struct SideRequest {
    user_id: UserId,
    side: Side,
}

#[derive(Deserialize)]
struct ProofRequest {
    user_id: UserId,
    text: String,
}

#[derive(Deserialize)]
struct ResolveRequest {
    winner: Side,
}

#[derive(Deserialize)]
struct StatusRequest {
    status: String,
}

#[derive(Deserialize)]
struct LedgerEntryRequest {
    user_id: UserId,
    bet_id: BetId,
    amount: f64,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

#[derive(Serialize)]
struct BalanceResponse {
    user_id: UserId,
    balance: f64,
}

#[derive(Serialize)]
struct ProgressResponse {
    bet_id: BetId,
    status: BetStatus,
}
