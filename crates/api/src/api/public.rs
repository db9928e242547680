// Public poll routes (unauthenticated voter channel)
//
// Anonymous voters keep their identity on the device; the server only mints
// it and accepts it back with each vote.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use gatherpoll_core::identity::mint_anonymous;
use gatherpoll_core::{
    Availability, AnonymousVoter, EventAggregate, PollEngine, PollError, Vote, VoteIntent,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

use super::common::{poll_error, ApiError, ErrorResponse};
use super::events::load_aggregate;

/// Request to register as an anonymous voter for one event
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegisterVoterRequest {
    #[schema(example = "Grace")]
    pub name: String,
    #[schema(example = "grace@example.com")]
    pub email: String,
}

/// Vote cast by an anonymous voter
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PublicVoteRequest {
    /// Identity previously returned by the voters endpoint
    pub voter: AnonymousVoter,
    pub slot_id: String,
    pub availability: Availability,
}

/// App state for public routes
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<PollEngine>,
}

impl AppState {
    pub fn new(engine: Arc<PollEngine>) -> Self {
        Self { engine }
    }
}

/// Create public routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/public/events/:event_id", get(get_public_event))
        .route("/v1/public/events/:event_id/voters", post(register_voter))
        .route("/v1/public/events/:event_id/votes", post(cast_public_vote))
        .with_state(state)
}

/// GET /v1/public/events/{event_id} - Poll view for voters
#[utoipa::path(
    get,
    path = "/v1/public/events/{event_id}",
    params(
        ("event_id" = String, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Event aggregate", body = EventAggregate),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "public"
)]
pub async fn get_public_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<Json<EventAggregate>, ApiError> {
    load_aggregate(&state.engine, &event_id).await.map(Json)
}

/// POST /v1/public/events/{event_id}/voters - Mint an anonymous voter identity
#[utoipa::path(
    post,
    path = "/v1/public/events/{event_id}/voters",
    params(
        ("event_id" = String, Path, description = "Event ID")
    ),
    request_body = RegisterVoterRequest,
    responses(
        (status = 201, description = "Voter identity to store on the device", body = AnonymousVoter),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 422, description = "Name or email missing", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "public"
)]
pub async fn register_voter(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    Json(req): Json<RegisterVoterRequest>,
) -> Result<(StatusCode, Json<AnonymousVoter>), ApiError> {
    let voter = mint_anonymous(&req.name, &req.email)
        .map_err(|e| poll_error("Failed to register voter", e))?;

    let exists = state
        .engine
        .event_exists(&event_id)
        .await
        .map_err(|e| poll_error("Failed to register voter", e))?;
    if !exists {
        return Err(poll_error(
            "Failed to register voter",
            PollError::event_not_found(&event_id),
        ));
    }

    tracing::info!(event_id = %event_id, voter_id = %voter.id, "Minted anonymous voter");
    Ok((StatusCode::CREATED, Json(voter)))
}

/// POST /v1/public/events/{event_id}/votes - Vote as an anonymous voter
#[utoipa::path(
    post,
    path = "/v1/public/events/{event_id}/votes",
    params(
        ("event_id" = String, Path, description = "Event ID")
    ),
    request_body = PublicVoteRequest,
    responses(
        (status = 200, description = "Vote recorded", body = Vote),
        (status = 404, description = "Event or slot not found", body = ErrorResponse),
        (status = 409, description = "Poll closed", body = ErrorResponse),
        (status = 422, description = "Voter identity incomplete or not issued by registration", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "public"
)]
pub async fn cast_public_vote(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    Json(req): Json<PublicVoteRequest>,
) -> Result<Json<Vote>, ApiError> {
    let voter = req.voter.to_identity();
    let intent = VoteIntent {
        slot_id: req.slot_id,
        availability: req.availability,
    };

    let vote = state
        .engine
        .upsert_vote(&event_id, &voter, intent)
        .await
        .map_err(|e| poll_error("Failed to record vote", e))?;

    Ok(Json(vote))
}
