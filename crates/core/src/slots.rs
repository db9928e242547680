// Slot Store
//
// Creates the organizer-proposed candidate slots of an event in one batch.
// Slots are immutable once created.

use chrono::Utc;

use crate::error::{PollError, Result};
use crate::ids;
use crate::time_slot::{SlotCandidate, TimeSlot};
use crate::traits::SharedPollStore;

pub struct SlotService {
    store: SharedPollStore,
}

impl SlotService {
    pub fn new(store: SharedPollStore) -> Self {
        Self { store }
    }

    /// Keep complete candidates (trimmed); an empty result is an error
    pub fn validate(candidates: &[SlotCandidate]) -> Result<Vec<SlotCandidate>> {
        let valid: Vec<SlotCandidate> = candidates
            .iter()
            .filter(|c| c.is_complete())
            .map(|c| SlotCandidate::new(c.date.trim(), c.start_time.trim(), c.end_time.trim()))
            .collect();

        if valid.is_empty() {
            return Err(PollError::validation(
                "At least one time slot with date, start and end time is required",
            ));
        }
        Ok(valid)
    }

    /// Mint ids and persist the batch; returned in the supplied order
    pub async fn create_slots(
        &self,
        event_id: &str,
        candidates: &[SlotCandidate],
    ) -> Result<Vec<TimeSlot>> {
        let valid = Self::validate(candidates)?;
        let now = Utc::now();
        let slots: Vec<TimeSlot> = valid
            .into_iter()
            .map(|c| TimeSlot {
                id: ids::slot_id(),
                event_id: event_id.to_string(),
                date: c.date,
                start_time: c.start_time,
                end_time: c.end_time,
                created_at: now,
            })
            .collect();

        self.store.create_slots(slots).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryPollStore;
    use crate::traits::TimeSlotStore;
    use std::sync::Arc;

    #[test]
    fn test_validate_drops_incomplete_candidates() {
        let valid = SlotService::validate(&[
            SlotCandidate::new("2026-11-01", "10:00", "11:00"),
            SlotCandidate::new("", "10:00", "11:00"),
            SlotCandidate::new("2026-11-02", " ", "11:00"),
            SlotCandidate::new(" 2026-11-03 ", "12:00", "13:00 "),
        ])
        .unwrap();

        assert_eq!(
            valid,
            vec![
                SlotCandidate::new("2026-11-01", "10:00", "11:00"),
                SlotCandidate::new("2026-11-03", "12:00", "13:00"),
            ]
        );
    }

    #[test]
    fn test_validate_rejects_empty_batch() {
        assert!(matches!(
            SlotService::validate(&[]),
            Err(PollError::ValidationFailed(_))
        ));
        assert!(matches!(
            SlotService::validate(&[SlotCandidate::new("", "", "")]),
            Err(PollError::ValidationFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_create_slots_preserves_order_and_owner() {
        let store = Arc::new(InMemoryPollStore::new());
        let service = SlotService::new(store.clone());

        let created = service
            .create_slots(
                "evt_1",
                &[
                    SlotCandidate::new("2026-11-05", "18:00", "20:00"),
                    SlotCandidate::new("2026-11-01", "18:00", "20:00"),
                ],
            )
            .await
            .unwrap();

        assert_eq!(created.len(), 2);
        assert_eq!(created[0].date, "2026-11-05");
        assert_eq!(created[1].date, "2026-11-01");
        assert!(created.iter().all(|s| s.event_id == "evt_1"));
        assert_ne!(created[0].id, created[1].id);

        // Listing is date-ordered
        let listed = store.list_slots("evt_1").await.unwrap();
        assert_eq!(listed[0].id, created[1].id);
    }
}
