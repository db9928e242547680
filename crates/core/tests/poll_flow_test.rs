// Integration tests for the poll flow on the in-memory store
//
// Covers vote uniqueness, re-tallying, confirmation rules and the split
// between the authenticated and public channels.
//
// Run with: cargo test -p gatherpoll-core --test poll_flow_test

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gatherpoll_core::identity::{mint_anonymous, storage_key};
use gatherpoll_core::{
    AnonymousIdentityProvider, AnonymousIdentityStorage, Availability, AuthenticatedUser,
    ConfirmOutcome, Event, EventStatus, EventStore, InMemoryIdentityStorage, InMemoryPollStore,
    NewEvent, PollClient, PollEngine, PollError, Resolution, SessionIdentityProvider,
    SharedPollStore, SlotCandidate, TimeSlot, TimeSlotStore, Vote, VoteIntent, VoteStore,
    VoteUpsert, VoterIdentity,
};

fn organizer() -> AuthenticatedUser {
    AuthenticatedUser {
        id: "user_org".to_string(),
        email: "org@example.com".to_string(),
        display_name: Some("Olivia".to_string()),
    }
}

fn stranger() -> AuthenticatedUser {
    AuthenticatedUser {
        id: "user_other".to_string(),
        email: "other@example.com".to_string(),
        display_name: None,
    }
}

fn voter(id: &str) -> VoterIdentity {
    mint_anonymous(id, &format!("{id}@example.com"))
        .map(|mut v| {
            v.id = id.to_string();
            v.to_identity()
        })
        .unwrap()
}

fn new_event(id: &str) -> NewEvent {
    NewEvent {
        id: id.to_string(),
        title: "Team dinner".to_string(),
        description: Some("Somewhere nice".to_string()),
    }
}

fn candidates() -> Vec<SlotCandidate> {
    vec![
        SlotCandidate::new("2026-11-01", "18:00", "20:00"),
        SlotCandidate::new("2026-11-02", "18:00", "20:00"),
        SlotCandidate::new("2026-11-03", "18:00", "20:00"),
        SlotCandidate::new("2026-11-04", "18:00", "20:00"),
    ]
}

/// Authenticated and public engines sharing one store
fn engines() -> (PollEngine, PollEngine, Arc<InMemoryPollStore>) {
    let store = Arc::new(InMemoryPollStore::new());
    let shared: SharedPollStore = store.clone();
    (
        PollEngine::new(PollClient::authenticated(shared.clone())),
        PollEngine::new(PollClient::public(shared)),
        store,
    )
}

async fn seeded(engine: &PollEngine) -> (Event, Vec<TimeSlot>) {
    engine
        .create_event_with_slots(&organizer(), new_event("evt_dinner"), &candidates())
        .await
        .unwrap()
}

async fn vote(engine: &PollEngine, event_id: &str, user: &str, slot_id: &str, a: Availability) -> Vote {
    engine
        .upsert_vote(
            event_id,
            &voter(user),
            VoteIntent {
                slot_id: slot_id.to_string(),
                availability: a,
            },
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn test_create_event_with_slots_starts_active() {
    let (auth, _, _) = engines();
    let (event, slots) = seeded(&auth).await;

    assert_eq!(event.status, EventStatus::Active);
    assert_eq!(event.organizer_name, "Olivia");
    assert!(event.confirmed_slot_id.is_none());
    assert_eq!(slots.len(), 4);

    let aggregate = auth.load_aggregate(&event.id).await.unwrap().unwrap();
    assert_eq!(aggregate.slots.len(), 4);
    assert!(aggregate.best_slot_id.is_none());
    assert!(aggregate.slots.iter().all(|s| s.total_votes == 0));
}

#[tokio::test]
async fn test_create_event_rejects_blank_input_before_writing() {
    let (auth, _, store) = engines();

    let err = auth
        .create_event(
            &organizer(),
            NewEvent {
                id: "evt_blank".to_string(),
                title: "   ".to_string(),
                description: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PollError::ValidationFailed(_)));

    let err = auth
        .create_event_with_slots(
            &organizer(),
            new_event("evt_no_slots"),
            &[SlotCandidate::new("2026-11-01", "", "20:00")],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PollError::ValidationFailed(_)));
    assert!(store.get_event("evt_no_slots").await.unwrap().is_none());
}

#[tokio::test]
async fn test_repeated_vote_overwrites_and_retallies() {
    let (auth, public, store) = engines();
    let (event, slots) = seeded(&auth).await;
    let s1 = &slots[0].id;

    let first = vote(&public, &event.id, "voter_u", s1, Availability::Yes).await;
    let second = vote(&public, &event.id, "voter_u", s1, Availability::No).await;

    assert_eq!(first.id, second.id);
    assert_eq!(first.created_at, second.created_at);
    assert!(second.updated_at >= first.updated_at);
    assert_eq!(store.vote_count().await, 1);

    let aggregate = public.load_aggregate(&event.id).await.unwrap().unwrap();
    let tallied = aggregate.slot(s1).unwrap();
    assert_eq!(tallied.yes_count, 0);
    assert_eq!(tallied.no_count, 1);
    assert_eq!(tallied.total_votes, 1);
    assert_eq!(
        tallied.vote_for("voter_u").map(|v| v.availability),
        Some(Availability::No)
    );
}

#[tokio::test]
async fn test_concurrent_upserts_keep_one_vote() {
    let (auth, public, store) = engines();
    let (event, slots) = seeded(&auth).await;
    let public = Arc::new(public);
    let slot_id = slots[1].id.clone();

    let mut handles = Vec::new();
    for i in 0..16 {
        let engine = public.clone();
        let event_id = event.id.clone();
        let slot_id = slot_id.clone();
        handles.push(tokio::spawn(async move {
            let availability = Availability::ALL[i % Availability::ALL.len()];
            engine
                .upsert_vote(
                    &event_id,
                    &voter("voter_race"),
                    VoteIntent {
                        slot_id,
                        availability,
                    },
                )
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(store.vote_count().await, 1);
    let aggregate = public.load_aggregate(&event.id).await.unwrap().unwrap();
    assert_eq!(aggregate.slot(&slot_id).unwrap().total_votes, 1);
}

#[tokio::test]
async fn test_best_option_prefers_earliest_on_tie() {
    let (auth, public, _) = engines();
    let (event, slots) = seeded(&auth).await;
    let yes_per_slot = [2, 1, 3, 3];

    for (slot, yes) in slots.iter().zip(yes_per_slot) {
        for n in 0..yes {
            vote(&public, &event.id, &format!("voter_{n}"), &slot.id, Availability::Yes).await;
        }
    }

    let aggregate = public.load_aggregate(&event.id).await.unwrap().unwrap();
    assert_eq!(aggregate.best_slot_id.as_deref(), Some(slots[2].id.as_str()));
    assert_eq!(aggregate.best_option().unwrap().yes_count, 3);
}

#[tokio::test]
async fn test_confirm_by_non_organizer_leaves_event_untouched() {
    let (auth, public, _) = engines();
    let (event, slots) = seeded(&auth).await;
    vote(&public, &event.id, "voter_a", &slots[0].id, Availability::Yes).await;

    let err = auth
        .confirm_slot(&stranger(), &event.id, &slots[0].id)
        .await
        .unwrap_err();
    assert!(matches!(err, PollError::Unauthorized(_)));

    let aggregate = auth.load_aggregate(&event.id).await.unwrap().unwrap();
    assert_eq!(aggregate.event.status, EventStatus::Active);
    assert!(aggregate.event.confirmed_slot_id.is_none());
}

#[tokio::test]
async fn test_confirm_requires_a_yes_vote() {
    let (auth, public, _) = engines();
    let (event, slots) = seeded(&auth).await;
    vote(&public, &event.id, "voter_a", &slots[0].id, Availability::Maybe).await;

    let err = auth
        .confirm_slot(&organizer(), &event.id, &slots[0].id)
        .await
        .unwrap_err();
    assert!(matches!(err, PollError::ValidationFailed(_)));
}

#[tokio::test]
async fn test_confirm_is_idempotent_and_closes_the_poll() {
    let (auth, public, _) = engines();
    let (event, slots) = seeded(&auth).await;
    let s2 = &slots[1].id;
    vote(&public, &event.id, "voter_a", s2, Availability::Yes).await;
    vote(&public, &event.id, "voter_b", s2, Availability::Yes).await;
    vote(&public, &event.id, "voter_a", &slots[0].id, Availability::Yes).await;

    let confirmed = auth.confirm_slot(&organizer(), &event.id, s2).await.unwrap();
    assert_eq!(confirmed.status, EventStatus::Confirmed);
    assert_eq!(confirmed.confirmed_slot_id.as_deref(), Some(s2.as_str()));

    let again = auth.confirm_slot(&organizer(), &event.id, s2).await.unwrap();
    assert_eq!(again.status, EventStatus::Confirmed);
    assert_eq!(again.confirmed_slot_id, confirmed.confirmed_slot_id);

    let err = auth
        .confirm_slot(&organizer(), &event.id, &slots[0].id)
        .await
        .unwrap_err();
    assert!(matches!(err, PollError::PollClosed(_)));

    let err = public
        .upsert_vote(
            &event.id,
            &voter("voter_c"),
            VoteIntent {
                slot_id: s2.clone(),
                availability: Availability::Yes,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PollError::PollClosed(_)));

    let aggregate = auth.load_aggregate(&event.id).await.unwrap().unwrap();
    assert_eq!(aggregate.confirmed_slot().unwrap().id(), s2.as_str());
    assert_eq!(aggregate.confirmed_slot().unwrap().yes_count, 2);
}

#[tokio::test]
async fn test_unknown_references() {
    let (auth, public, _) = engines();
    let (event, _) = seeded(&auth).await;

    assert!(public.load_aggregate("evt_missing").await.unwrap().is_none());

    let err = public
        .upsert_vote(
            &event.id,
            &voter("voter_a"),
            VoteIntent {
                slot_id: "slot_missing".to_string(),
                availability: Availability::Yes,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PollError::NotFound { entity: "Slot", .. }));

    let err = public
        .upsert_vote(
            "evt_missing",
            &voter("voter_a"),
            VoteIntent {
                slot_id: "slot_missing".to_string(),
                availability: Availability::Yes,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PollError::NotFound { entity: "Event", .. }));

    let err = auth
        .confirm_slot(&organizer(), &event.id, "slot_missing")
        .await
        .unwrap_err();
    assert!(matches!(err, PollError::NotFound { .. }));
}

#[tokio::test]
async fn test_vote_requires_voter_name() {
    let (auth, public, store) = engines();
    let (event, slots) = seeded(&auth).await;
    let mut nameless = voter("voter_a");
    nameless.name = "  ".to_string();

    let err = public
        .upsert_vote(
            &event.id,
            &nameless,
            VoteIntent {
                slot_id: slots[0].id.clone(),
                availability: Availability::Yes,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PollError::ValidationFailed(_)));
    assert_eq!(store.vote_count().await, 0);
}

#[tokio::test]
async fn test_anonymous_vote_requires_email() {
    let (auth, public, store) = engines();
    let (event, slots) = seeded(&auth).await;
    let mut no_email = voter("voter_x");
    no_email.email = " ".to_string();

    let err = public
        .upsert_vote(
            &event.id,
            &no_email,
            VoteIntent {
                slot_id: slots[0].id.clone(),
                availability: Availability::Yes,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PollError::ValidationFailed(_)));
    assert_eq!(store.vote_count().await, 0);
}

#[tokio::test]
async fn test_public_channel_cannot_write_as_a_session_user() {
    let (auth, public, _) = engines();
    let (event, slots) = seeded(&auth).await;
    let s1 = &slots[0].id;
    auth.upsert_vote(
        &event.id,
        &organizer().to_identity(),
        VoteIntent {
            slot_id: s1.clone(),
            availability: Availability::Yes,
        },
    )
    .await
    .unwrap();

    // Anonymous profile claiming the organizer's id
    let mut impostor = voter("voter_m");
    impostor.id = "user_org".to_string();
    impostor.name = "Mallory".to_string();
    let intent = VoteIntent {
        slot_id: s1.clone(),
        availability: Availability::No,
    };
    let err = public
        .upsert_vote(&event.id, &impostor, intent.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, PollError::ValidationFailed(_)));

    let err = public
        .upsert_vote(&event.id, &organizer().to_identity(), intent)
        .await
        .unwrap_err();
    assert!(matches!(err, PollError::Unauthorized(_)));

    let aggregate = auth.load_aggregate(&event.id).await.unwrap().unwrap();
    let tallied = aggregate.slot(s1).unwrap();
    assert_eq!(tallied.total_votes, 1);
    let kept = tallied.vote_for("user_org").unwrap();
    assert_eq!(kept.availability, Availability::Yes);
    assert_eq!(kept.user_name, "Olivia");
}

#[tokio::test]
async fn test_event_exists() {
    let (auth, public, _) = engines();
    let (event, _) = seeded(&auth).await;

    assert!(public.event_exists(&event.id).await.unwrap());
    assert!(!public.event_exists("evt_missing").await.unwrap());
}

#[tokio::test]
async fn test_public_channel_rejects_organizer_operations() {
    let (auth, public, _) = engines();
    let (event, slots) = seeded(&auth).await;
    vote(&public, &event.id, "voter_a", &slots[0].id, Availability::Yes).await;

    let err = public
        .create_event(&organizer(), new_event("evt_public"))
        .await
        .unwrap_err();
    assert!(matches!(err, PollError::Unauthorized(_)));

    let err = public
        .create_slots(&organizer(), &event.id, &candidates())
        .await
        .unwrap_err();
    assert!(matches!(err, PollError::Unauthorized(_)));

    let err = public
        .confirm_slot(&organizer(), &event.id, &slots[0].id)
        .await
        .unwrap_err();
    assert!(matches!(err, PollError::Unauthorized(_)));

    assert!(matches!(
        public.list_organizer_events(&organizer()).await,
        Err(PollError::Unauthorized(_))
    ));
}

#[tokio::test]
async fn test_only_organizer_adds_slots() {
    let (auth, _, _) = engines();
    let event = auth.create_event(&organizer(), new_event("evt_slots")).await.unwrap();

    let err = auth
        .create_slots(&stranger(), &event.id, &candidates())
        .await
        .unwrap_err();
    assert!(matches!(err, PollError::Unauthorized(_)));

    let created = auth
        .create_slots(&organizer(), &event.id, &candidates()[..2])
        .await
        .unwrap();
    assert_eq!(created.len(), 2);

    let err = auth
        .create_slots(&organizer(), "evt_missing", &candidates())
        .await
        .unwrap_err();
    assert!(matches!(err, PollError::NotFound { .. }));
}

#[tokio::test]
async fn test_dashboard_lists_own_events_newest_first() {
    let (auth, public, _) = engines();
    let (first, slots) = seeded(&auth).await;

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = auth.create_event(&organizer(), new_event("evt_second")).await.unwrap();
    auth.create_event(&stranger(), new_event("evt_foreign")).await.unwrap();

    vote(&public, &first.id, "voter_a", &slots[0].id, Availability::Yes).await;
    auth.confirm_slot(&organizer(), &first.id, &slots[0].id).await.unwrap();

    let ids: Vec<String> = auth
        .list_organizer_events(&organizer())
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.id)
        .collect();
    assert_eq!(ids, vec![second.id.clone(), first.id.clone()]);

    let summary = auth.dashboard_summary(&organizer()).await.unwrap();
    assert_eq!(summary.total, 2);
    assert_eq!(summary.active, 1);
    assert_eq!(summary.confirmed, 1);
}

#[tokio::test]
async fn test_identity_resolution_paths() {
    let (auth, public, _) = engines();
    let (event, _) = seeded(&auth).await;

    let session = SessionIdentityProvider::new();
    assert!(matches!(
        auth.resolve_identity(&session, &event.id).await,
        Err(PollError::Unauthorized(_))
    ));
    session.sign_in(organizer());
    match auth.resolve_identity(&session, &event.id).await.unwrap() {
        Resolution::Identified(identity) => assert_eq!(identity.id, "user_org"),
        other => panic!("unexpected resolution: {other:?}"),
    }

    let storage = InMemoryIdentityStorage::new();
    let anonymous = AnonymousIdentityProvider::new(storage.clone());
    assert_eq!(
        public.resolve_identity(&anonymous, &event.id).await.unwrap(),
        Resolution::NeedsRegistration
    );
    let registered = anonymous
        .register(&event.id, "Grace", "grace@example.com")
        .await
        .unwrap();
    assert!(storage
        .get(&storage_key(&event.id))
        .await
        .unwrap()
        .is_some());
    assert_eq!(
        public.resolve_identity(&anonymous, &event.id).await.unwrap(),
        Resolution::Identified(registered)
    );
}

/// Delegates to the in-memory store but always fails slot batches
struct FailingSlotStore {
    inner: InMemoryPollStore,
}

#[async_trait]
impl EventStore for FailingSlotStore {
    async fn create_event(&self, event: Event) -> gatherpoll_core::Result<Event> {
        self.inner.create_event(event).await
    }

    async fn get_event(&self, event_id: &str) -> gatherpoll_core::Result<Option<Event>> {
        self.inner.get_event(event_id).await
    }

    async fn list_events_by_organizer(&self, organizer_id: &str) -> gatherpoll_core::Result<Vec<Event>> {
        self.inner.list_events_by_organizer(organizer_id).await
    }

    async fn confirm_event(
        &self,
        event_id: &str,
        slot_id: &str,
        at: DateTime<Utc>,
    ) -> gatherpoll_core::Result<ConfirmOutcome> {
        self.inner.confirm_event(event_id, slot_id, at).await
    }
}

#[async_trait]
impl TimeSlotStore for FailingSlotStore {
    async fn create_slots(&self, _slots: Vec<TimeSlot>) -> gatherpoll_core::Result<Vec<TimeSlot>> {
        Err(PollError::persistence("connection reset"))
    }

    async fn list_slots(&self, event_id: &str) -> gatherpoll_core::Result<Vec<TimeSlot>> {
        self.inner.list_slots(event_id).await
    }

    async fn get_slot(&self, event_id: &str, slot_id: &str) -> gatherpoll_core::Result<Option<TimeSlot>> {
        self.inner.get_slot(event_id, slot_id).await
    }
}

#[async_trait]
impl VoteStore for FailingSlotStore {
    async fn upsert_vote(&self, upsert: VoteUpsert) -> gatherpoll_core::Result<Vote> {
        self.inner.upsert_vote(upsert).await
    }

    async fn list_votes(&self, event_id: &str) -> gatherpoll_core::Result<Vec<Vote>> {
        self.inner.list_votes(event_id).await
    }
}

#[tokio::test]
async fn test_slot_failure_reports_partial_creation() {
    let inner = InMemoryPollStore::new();
    let engine = PollEngine::new(PollClient::authenticated(Arc::new(FailingSlotStore {
        inner: inner.clone(),
    })));

    let err = engine
        .create_event_with_slots(&organizer(), new_event("evt_partial"), &candidates())
        .await
        .unwrap_err();

    match err {
        PollError::PartialCreation { event, source } => {
            assert_eq!(event.id, "evt_partial");
            assert!(matches!(*source, PollError::Persistence(_)));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // The event row was written; its slots were not
    assert!(inner.get_event("evt_partial").await.unwrap().is_some());
    assert!(inner.list_slots("evt_partial").await.unwrap().is_empty());
}

/// Confirms the event the moment a vote looks up its slot, so the
/// confirmation lands between the ledger's status read and its write
struct ConfirmOnSlotLookup {
    inner: InMemoryPollStore,
}

#[async_trait]
impl EventStore for ConfirmOnSlotLookup {
    async fn create_event(&self, event: Event) -> gatherpoll_core::Result<Event> {
        self.inner.create_event(event).await
    }

    async fn get_event(&self, event_id: &str) -> gatherpoll_core::Result<Option<Event>> {
        self.inner.get_event(event_id).await
    }

    async fn list_events_by_organizer(&self, organizer_id: &str) -> gatherpoll_core::Result<Vec<Event>> {
        self.inner.list_events_by_organizer(organizer_id).await
    }

    async fn confirm_event(
        &self,
        event_id: &str,
        slot_id: &str,
        at: DateTime<Utc>,
    ) -> gatherpoll_core::Result<ConfirmOutcome> {
        self.inner.confirm_event(event_id, slot_id, at).await
    }
}

#[async_trait]
impl TimeSlotStore for ConfirmOnSlotLookup {
    async fn create_slots(&self, slots: Vec<TimeSlot>) -> gatherpoll_core::Result<Vec<TimeSlot>> {
        self.inner.create_slots(slots).await
    }

    async fn list_slots(&self, event_id: &str) -> gatherpoll_core::Result<Vec<TimeSlot>> {
        self.inner.list_slots(event_id).await
    }

    async fn get_slot(&self, event_id: &str, slot_id: &str) -> gatherpoll_core::Result<Option<TimeSlot>> {
        self.inner.confirm_event(event_id, slot_id, Utc::now()).await?;
        self.inner.get_slot(event_id, slot_id).await
    }
}

#[async_trait]
impl VoteStore for ConfirmOnSlotLookup {
    async fn upsert_vote(&self, upsert: VoteUpsert) -> gatherpoll_core::Result<Vote> {
        self.inner.upsert_vote(upsert).await
    }

    async fn list_votes(&self, event_id: &str) -> gatherpoll_core::Result<Vec<Vote>> {
        self.inner.list_votes(event_id).await
    }
}

#[tokio::test]
async fn test_vote_racing_a_confirmation_is_rejected() {
    let inner = InMemoryPollStore::new();
    let shared: SharedPollStore = Arc::new(ConfirmOnSlotLookup {
        inner: inner.clone(),
    });
    let auth = PollEngine::new(PollClient::authenticated(shared.clone()));
    let public = PollEngine::new(PollClient::public(shared));
    let (event, slots) = seeded(&auth).await;

    let err = public
        .upsert_vote(
            &event.id,
            &voter("voter_late"),
            VoteIntent {
                slot_id: slots[0].id.clone(),
                availability: Availability::Yes,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PollError::PollClosed(_)));

    let stored = inner.get_event(&event.id).await.unwrap().unwrap();
    assert_eq!(stored.status, EventStatus::Confirmed);
    assert_eq!(inner.vote_count().await, 0);
}
