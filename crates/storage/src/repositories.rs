// Repository layer for database operations

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::*;

const EVENT_COLUMNS: &str = "id, title, description, organizer_id, organizer_name, status, confirmed_slot_id, created_at, updated_at";
const SLOT_COLUMNS: &str = "id, event_id, date, start_time, end_time, position, created_at";
const VOTE_COLUMNS: &str = "id, event_id, slot_id, user_id, user_name, availability, created_at, updated_at";

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create database connection from URL
    pub async fn from_url(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    /// Apply pending schema migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Database migrations applied");
        Ok(())
    }

    // ============================================
    // Events
    // ============================================

    pub async fn create_event(&self, input: CreateEventRow) -> Result<EventRow> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            r#"
            INSERT INTO events (id, title, description, organizer_id, organizer_name, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(&input.id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.organizer_id)
        .bind(&input.organizer_name)
        .bind(&input.status)
        .bind(input.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_event(&self, id: &str) -> Result<Option<EventRow>> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_events_by_organizer(&self, organizer_id: &str) -> Result<Vec<EventRow>> {
        let rows = sqlx::query_as::<_, EventRow>(&format!(
            r#"
            SELECT {EVENT_COLUMNS}
            FROM events
            WHERE organizer_id = $1
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(organizer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Conditional confirm; `None` when the event is missing or already confirmed
    pub async fn confirm_event(
        &self,
        id: &str,
        slot_id: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<EventRow>> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            r#"
            UPDATE events
            SET status = 'confirmed', confirmed_slot_id = $2, updated_at = $3
            WHERE id = $1 AND status <> 'confirmed'
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(slot_id)
        .bind(at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    // ============================================
    // Time slots
    // ============================================

    /// Insert a batch of slots in one transaction
    pub async fn create_time_slots(&self, inputs: Vec<CreateTimeSlotRow>) -> Result<Vec<TimeSlotRow>> {
        let mut tx = self.pool.begin().await?;
        let mut rows = Vec::with_capacity(inputs.len());

        for input in inputs {
            let row = sqlx::query_as::<_, TimeSlotRow>(&format!(
                r#"
                INSERT INTO time_slots (id, event_id, date, start_time, end_time, position, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING {SLOT_COLUMNS}
                "#
            ))
            .bind(&input.id)
            .bind(&input.event_id)
            .bind(&input.date)
            .bind(&input.start_time)
            .bind(&input.end_time)
            .bind(input.position)
            .bind(input.created_at)
            .fetch_one(&mut *tx)
            .await?;
            rows.push(row);
        }

        tx.commit().await?;
        Ok(rows)
    }

    pub async fn list_time_slots(&self, event_id: &str) -> Result<Vec<TimeSlotRow>> {
        let rows = sqlx::query_as::<_, TimeSlotRow>(&format!(
            r#"
            SELECT {SLOT_COLUMNS}
            FROM time_slots
            WHERE event_id = $1
            ORDER BY date ASC, created_at ASC, position ASC
            "#
        ))
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn get_time_slot(&self, event_id: &str, slot_id: &str) -> Result<Option<TimeSlotRow>> {
        let row = sqlx::query_as::<_, TimeSlotRow>(&format!(
            "SELECT {SLOT_COLUMNS} FROM time_slots WHERE event_id = $1 AND id = $2"
        ))
        .bind(event_id)
        .bind(slot_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    // ============================================
    // Votes
    // ============================================

    /// Insert or overwrite the vote for (slot_id, user_id)
    ///
    /// On conflict the existing id and created_at are kept. `None` when the
    /// event is missing or no longer accepts votes; the event row is share
    /// locked so a concurrent confirm cannot slip in between.
    pub async fn upsert_vote(&self, input: UpsertVoteRow) -> Result<Option<VoteRow>> {
        let row = sqlx::query_as::<_, VoteRow>(&format!(
            r#"
            INSERT INTO votes (id, event_id, slot_id, user_id, user_name, availability, created_at, updated_at)
            SELECT $1, $2, $3, $4, $5, $6, $7, $7
            WHERE EXISTS (
                SELECT 1 FROM events
                WHERE id = $2 AND status IN ('draft', 'active')
                FOR SHARE
            )
            ON CONFLICT (slot_id, user_id) DO UPDATE
            SET availability = EXCLUDED.availability,
                user_name = EXCLUDED.user_name,
                updated_at = EXCLUDED.updated_at
            RETURNING {VOTE_COLUMNS}
            "#
        ))
        .bind(&input.id)
        .bind(&input.event_id)
        .bind(&input.slot_id)
        .bind(&input.user_id)
        .bind(&input.user_name)
        .bind(&input.availability)
        .bind(input.now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_votes(&self, event_id: &str) -> Result<Vec<VoteRow>> {
        let rows = sqlx::query_as::<_, VoteRow>(&format!(
            r#"
            SELECT {VOTE_COLUMNS}
            FROM votes
            WHERE event_id = $1
            ORDER BY created_at ASC, id ASC
            "#
        ))
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
