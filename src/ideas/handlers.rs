use axum::{
    extract::{Path, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::jwt::AuthUser,
    error::ApiError,
    ideas::{
        dto::{CreateIdeaRequest, IdeaResponse, UpdateIdeaRequest},
        services::{self, Vote},
    },
    state::AppState,
    users::dto::UserProfile,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/ideas", get(list_ideas))
        .route("/ideas/:id", get(get_idea))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/ideas", post(create_idea))
        .route("/ideas/:id", put(update_idea).delete(delete_idea))
        .route("/ideas/:id/upvote", post(upvote_idea))
        .route("/ideas/:id/downvote", post(downvote_idea))
        .route("/ideas/:id/bookmark", post(bookmark_idea).delete(unbookmark_idea))
}

#[instrument(skip(state))]
pub async fn list_ideas(
    State(state): State<AppState>,
) -> Result<Json<Vec<IdeaResponse>>, ApiError> {
    let ideas = services::list(&state.db).await?;
    Ok(Json(ideas))
}

#[instrument(skip(state, payload))]
pub async fn create_idea(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateIdeaRequest>,
) -> Result<Json<IdeaResponse>, ApiError> {
    let idea = services::create(&state.db, user_id, payload).await?;
    Ok(Json(idea))
}

#[instrument(skip(state))]
pub async fn get_idea(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<IdeaResponse>, ApiError> {
    let idea = services::read(&state.db, &id).await?;
    Ok(Json(idea))
}

#[instrument(skip(state, payload))]
pub async fn update_idea(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateIdeaRequest>,
) -> Result<Json<IdeaResponse>, ApiError> {
    let idea = services::update(&state.db, &id, user_id, payload).await?;
    Ok(Json(idea))
}

#[instrument(skip(state))]
pub async fn delete_idea(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<IdeaResponse>, ApiError> {
    let idea = services::destroy(&state.db, &id, user_id).await?;
    Ok(Json(idea))
}

#[instrument(skip(state))]
pub async fn upvote_idea(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<IdeaResponse>, ApiError> {
    let idea = services::cast_vote(&state.db, &id, user_id, Vote::Up).await?;
    Ok(Json(idea))
}

#[instrument(skip(state))]
pub async fn downvote_idea(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<IdeaResponse>, ApiError> {
    let idea = services::cast_vote(&state.db, &id, user_id, Vote::Down).await?;
    Ok(Json(idea))
}

#[instrument(skip(state))]
pub async fn bookmark_idea(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<UserProfile>, ApiError> {
    let profile = services::bookmark(&state.db, &id, user_id).await?;
    Ok(Json(profile))
}

#[instrument(skip(state))]
pub async fn unbookmark_idea(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<UserProfile>, ApiError> {
    let profile = services::unbookmark(&state.db, &id, user_id).await?;
    Ok(Json(profile))
}
