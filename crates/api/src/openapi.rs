// OpenAPI specification
//
// Served by the API server through Swagger UI.

use crate::api;
use crate::api::{ErrorResponse, ListResponse};
use gatherpoll_core::{
    AnonymousVoter, Availability, DashboardSummary, Event, EventAggregate, EventStatus,
    SlotCandidate, SlotWithVotes, TimeSlot, Vote, VoteIntent,
};
use utoipa::OpenApi;

/// OpenAPI documentation for the Gatherpoll API
#[derive(OpenApi)]
#[openapi(
    paths(
        api::events::create_event,
        api::events::list_events,
        api::events::get_summary,
        api::events::get_event,
        api::events::create_slots,
        api::events::cast_vote,
        api::events::confirm_slot,
        api::public::get_public_event,
        api::public::register_voter,
        api::public::cast_public_vote,
    ),
    components(
        schemas(
            Event, EventStatus, TimeSlot, SlotCandidate, Vote, Availability, VoteIntent,
            SlotWithVotes, EventAggregate, DashboardSummary, AnonymousVoter,
            api::events::CreateEventRequest, api::events::EventWithSlots,
            api::events::CreateSlotsRequest, api::events::ConfirmSlotRequest,
            api::public::RegisterVoterRequest, api::public::PublicVoteRequest,
            ErrorResponse,
            ListResponse<Event>,
            ListResponse<TimeSlot>,
        )
    ),
    tags(
        (name = "events", description = "Organizer event, slot and confirmation endpoints"),
        (name = "public", description = "Public poll endpoints for voters without an account")
    ),
    info(
        title = "Gatherpoll API",
        version = "0.1.0",
        description = "Availability polls: propose time slots, collect votes, confirm the best slot",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
pub struct ApiDoc;
