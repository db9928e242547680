// Organizer event routes (authenticated channel)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use gatherpoll_core::{
    ids, DashboardSummary, Event, EventAggregate, NewEvent, PollEngine, PollError, SlotCandidate,
    TimeSlot, Vote, VoteIntent,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use super::common::{poll_error, ApiError, ErrorResponse, ListResponse};
use crate::auth::{AuthState, AuthUser, FromRef};

/// Request to create a new event, optionally with its candidate slots
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateEventRequest {
    /// Client-chosen id; minted when omitted.
    #[serde(default)]
    #[schema(example = "evt_0193a1b2c3d4")]
    pub id: Option<String>,
    #[schema(example = "Team dinner")]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Candidate slots; incomplete entries are dropped.
    #[serde(default)]
    pub slots: Vec<SlotCandidate>,
}

/// Newly created event together with its slots
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventWithSlots {
    pub event: Event,
    pub slots: Vec<TimeSlot>,
}

/// Request to add candidate slots to an existing event
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateSlotsRequest {
    pub slots: Vec<SlotCandidate>,
}

/// Request to fix the event on one slot
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ConfirmSlotRequest {
    pub slot_id: String,
}

/// App state for organizer routes
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<PollEngine>,
    pub auth: AuthState,
}

impl AppState {
    pub fn new(engine: Arc<PollEngine>, auth: AuthState) -> Self {
        Self { engine, auth }
    }
}

impl FromRef<AppState> for AuthState {
    fn from_ref(input: &AppState) -> Self {
        input.auth.clone()
    }
}

/// Create organizer routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/events", post(create_event).get(list_events))
        .route("/v1/events/summary", get(get_summary))
        .route("/v1/events/:event_id", get(get_event))
        .route("/v1/events/:event_id/slots", post(create_slots))
        .route("/v1/events/:event_id/votes", post(cast_vote))
        .route("/v1/events/:event_id/confirm", post(confirm_slot))
        .with_state(state)
}

/// POST /v1/events - Create an event and its slots
#[utoipa::path(
    post,
    path = "/v1/events",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created", body = EventWithSlots),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 422, description = "Invalid event or slots", body = ErrorResponse),
        (status = 502, description = "Event created but slots were not; body carries the event", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "events"
)]
pub async fn create_event(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<EventWithSlots>), ApiError> {
    let organizer = user.to_authenticated();
    let input = NewEvent {
        id: req
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(ids::event_id),
        title: req.title,
        description: req.description,
    };

    let created = if req.slots.is_empty() {
        state
            .engine
            .create_event(&organizer, input)
            .await
            .map(|event| EventWithSlots {
                event,
                slots: Vec::new(),
            })
    } else {
        state
            .engine
            .create_event_with_slots(&organizer, input, &req.slots)
            .await
            .map(|(event, slots)| EventWithSlots { event, slots })
    };

    let created = created.map_err(|e| poll_error("Failed to create event", e))?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /v1/events - List the organizer's events, newest first
#[utoipa::path(
    get,
    path = "/v1/events",
    responses(
        (status = 200, description = "Organizer's events", body = ListResponse<Event>),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "events"
)]
pub async fn list_events(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ListResponse<Event>>, ApiError> {
    let events = state
        .engine
        .list_organizer_events(&user.to_authenticated())
        .await
        .map_err(|e| poll_error("Failed to list events", e))?;

    Ok(Json(ListResponse::new(events)))
}

/// GET /v1/events/summary - Dashboard counts for the organizer
#[utoipa::path(
    get,
    path = "/v1/events/summary",
    responses(
        (status = 200, description = "Event counts", body = DashboardSummary),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "events"
)]
pub async fn get_summary(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<DashboardSummary>, ApiError> {
    let summary = state
        .engine
        .dashboard_summary(&user.to_authenticated())
        .await
        .map_err(|e| poll_error("Failed to load dashboard summary", e))?;

    Ok(Json(summary))
}

/// GET /v1/events/{event_id} - Event with tallied slots
#[utoipa::path(
    get,
    path = "/v1/events/{event_id}",
    params(
        ("event_id" = String, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Event aggregate", body = EventAggregate),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "events"
)]
pub async fn get_event(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(event_id): Path<String>,
) -> Result<Json<EventAggregate>, ApiError> {
    load_aggregate(&state.engine, &event_id).await.map(Json)
}

/// POST /v1/events/{event_id}/slots - Add candidate slots
#[utoipa::path(
    post,
    path = "/v1/events/{event_id}/slots",
    params(
        ("event_id" = String, Path, description = "Event ID")
    ),
    request_body = CreateSlotsRequest,
    responses(
        (status = 201, description = "Slots created", body = ListResponse<TimeSlot>),
        (status = 403, description = "Not the organizer", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 422, description = "No complete slot supplied", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "events"
)]
pub async fn create_slots(
    State(state): State<AppState>,
    user: AuthUser,
    Path(event_id): Path<String>,
    Json(req): Json<CreateSlotsRequest>,
) -> Result<(StatusCode, Json<ListResponse<TimeSlot>>), ApiError> {
    let slots = state
        .engine
        .create_slots(&user.to_authenticated(), &event_id, &req.slots)
        .await
        .map_err(|e| poll_error("Failed to create time slots", e))?;

    Ok((StatusCode::CREATED, Json(ListResponse::new(slots))))
}

/// POST /v1/events/{event_id}/votes - Vote as the signed-in user
#[utoipa::path(
    post,
    path = "/v1/events/{event_id}/votes",
    params(
        ("event_id" = String, Path, description = "Event ID")
    ),
    request_body = VoteIntent,
    responses(
        (status = 200, description = "Vote recorded", body = Vote),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 404, description = "Event or slot not found", body = ErrorResponse),
        (status = 409, description = "Poll closed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "events"
)]
pub async fn cast_vote(
    State(state): State<AppState>,
    user: AuthUser,
    Path(event_id): Path<String>,
    Json(intent): Json<VoteIntent>,
) -> Result<Json<Vote>, ApiError> {
    let voter = user.to_authenticated().to_identity();
    let vote = state
        .engine
        .upsert_vote(&event_id, &voter, intent)
        .await
        .map_err(|e| poll_error("Failed to record vote", e))?;

    Ok(Json(vote))
}

/// POST /v1/events/{event_id}/confirm - Confirm the final slot
#[utoipa::path(
    post,
    path = "/v1/events/{event_id}/confirm",
    params(
        ("event_id" = String, Path, description = "Event ID")
    ),
    request_body = ConfirmSlotRequest,
    responses(
        (status = 200, description = "Event confirmed", body = Event),
        (status = 403, description = "Not the organizer", body = ErrorResponse),
        (status = 404, description = "Event or slot not found", body = ErrorResponse),
        (status = 409, description = "Already confirmed on another slot", body = ErrorResponse),
        (status = 422, description = "Slot has no yes votes", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "events"
)]
pub async fn confirm_slot(
    State(state): State<AppState>,
    user: AuthUser,
    Path(event_id): Path<String>,
    Json(req): Json<ConfirmSlotRequest>,
) -> Result<Json<Event>, ApiError> {
    let event = state
        .engine
        .confirm_slot(&user.to_authenticated(), &event_id, &req.slot_id)
        .await
        .map_err(|e| poll_error("Failed to confirm slot", e))?;

    Ok(Json(event))
}

/// Shared by both channels: aggregate or 404
pub(crate) async fn load_aggregate(
    engine: &PollEngine,
    event_id: &str,
) -> Result<EventAggregate, ApiError> {
    engine
        .load_aggregate(event_id)
        .await
        .map_err(|e| poll_error("Failed to load event", e))?
        .ok_or_else(|| poll_error("Failed to load event", PollError::event_not_found(event_id)))
}
