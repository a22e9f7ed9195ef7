//! Persistence layer for profiles and swap requests
//!
//! Provides SQLite-based persistence for:
//! - Member profiles
//! - Swap requests, indexed by `(recipient_id, status)` and `(requester_id, status)`
//!
//! Timestamps are stored as epoch milliseconds so request ordering survives a round trip.

use crate::store::{ProfileStore, StoreError, StoreResult, SwapStore};
use crate::{
    Availability, Profile, ProfileId, RatingSummary, RequestId, SkillSet, SwapRequest,
    SwapStatus, Visibility,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// SQLite-backed profile and swap request store
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `db_path`
    pub async fn open(db_path: impl AsRef<Path>) -> StoreResult<Self> {
        let db_path = db_path.as_ref();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let options =
            SqliteConnectOptions::from_str(&format!("sqlite://{}?mode=rwc", db_path.display()))?
                .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let store = SqliteStore { pool };
        store.initialize_schema().await?;

        info!("Persistence layer initialized at: {:?}", db_path);
        Ok(store)
    }

    /// Private in-memory database, mostly for tests
    pub async fn open_in_memory() -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;

        // every connection to :memory: is a separate database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let store = SqliteStore { pool };
        store.initialize_schema().await?;
        Ok(store)
    }

    async fn initialize_schema(&self) -> StoreResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS profiles (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                location TEXT NOT NULL,
                availability TEXT NOT NULL,
                skills_offered TEXT NOT NULL,
                skills_wanted TEXT NOT NULL,
                visibility TEXT NOT NULL,
                rating_average REAL NOT NULL,
                review_count INTEGER NOT NULL,
                joined_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS swap_requests (
                id TEXT PRIMARY KEY,
                requester_id TEXT NOT NULL,
                recipient_id TEXT NOT NULL,
                offered_skill TEXT NOT NULL,
                wanted_skill TEXT NOT NULL,
                message TEXT,
                status TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                last_transitioned_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_requests_recipient_status
            ON swap_requests(recipient_id, status)
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_requests_requester_status
            ON swap_requests(requester_id, status)
            "#,
        )
        .execute(&self.pool)
        .await?;

        debug!("Database schema initialized");
        Ok(())
    }

    fn row_to_profile(row: SqliteRow) -> StoreResult<Profile> {
        let availability: String = row.get("availability");
        let visibility: String = row.get("visibility");
        let skills_offered: String = row.get("skills_offered");
        let skills_wanted: String = row.get("skills_wanted");
        let rating_average: f64 = row.get("rating_average");
        let review_count: i64 = row.get("review_count");
        let joined_at: i64 = row.get("joined_at");

        Ok(Profile {
            id: ProfileId::from(row.get::<String, _>("id")),
            name: row.get("name"),
            location: row.get("location"),
            availability: Availability::from_str(&availability)
                .map_err(|e| StoreError::InvalidData(e.to_string()))?,
            skills_offered: serde_json::from_str::<SkillSet>(&skills_offered)?,
            skills_wanted: serde_json::from_str::<SkillSet>(&skills_wanted)?,
            visibility: Visibility::from_str(&visibility)
                .map_err(|e| StoreError::InvalidData(e.to_string()))?,
            rating: RatingSummary {
                average: rating_average as f32,
                review_count: u32::try_from(review_count)
                    .map_err(|_| StoreError::InvalidData("Invalid review count".to_string()))?,
            },
            joined_at: millis_to_datetime(joined_at)?,
        })
    }

    fn row_to_request(row: SqliteRow) -> StoreResult<SwapRequest> {
        let status: String = row.get("status");
        let created_at: i64 = row.get("created_at");
        let last_transitioned_at: i64 = row.get("last_transitioned_at");

        Ok(SwapRequest {
            id: RequestId::from(row.get::<String, _>("id")),
            requester_id: ProfileId::from(row.get::<String, _>("requester_id")),
            recipient_id: ProfileId::from(row.get::<String, _>("recipient_id")),
            offered_skill: row.get("offered_skill"),
            wanted_skill: row.get("wanted_skill"),
            message: row.get("message"),
            status: SwapStatus::from_str(&status)
                .map_err(|e| StoreError::InvalidData(e.to_string()))?,
            created_at: millis_to_datetime(created_at)?,
            last_transitioned_at: millis_to_datetime(last_transitioned_at)?,
        })
    }

    /// Get database statistics
    pub async fn stats(&self) -> StoreResult<PersistenceStats> {
        let total_profiles: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profiles")
            .fetch_one(&self.pool)
            .await?;

        let public_profiles: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM profiles WHERE visibility = 'public'")
                .fetch_one(&self.pool)
                .await?;

        let total_requests: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM swap_requests")
            .fetch_one(&self.pool)
            .await?;

        let pending_requests: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM swap_requests WHERE status = 'pending'")
                .fetch_one(&self.pool)
                .await?;

        Ok(PersistenceStats {
            total_profiles: total_profiles as usize,
            public_profiles: public_profiles as usize,
            total_requests: total_requests as usize,
            pending_requests: pending_requests as usize,
        })
    }

    /// Close the database connection
    pub async fn close(self) {
        self.pool.close().await;
        info!("Persistence layer closed");
    }
}

#[async_trait]
impl ProfileStore for SqliteStore {
    async fn save_profile(&self, profile: &Profile) -> StoreResult<()> {
        let now = Utc::now().timestamp_millis();
        let skills_offered = serde_json::to_string(&profile.skills_offered)?;
        let skills_wanted = serde_json::to_string(&profile.skills_wanted)?;

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO profiles (
                id, name, location, availability, skills_offered, skills_wanted,
                visibility, rating_average, review_count, joined_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(profile.id.as_str())
        .bind(&profile.name)
        .bind(&profile.location)
        .bind(profile.availability.to_string())
        .bind(skills_offered)
        .bind(skills_wanted)
        .bind(profile.visibility.to_string())
        .bind(profile.rating.average as f64)
        .bind(profile.rating.review_count as i64)
        .bind(profile.joined_at.timestamp_millis())
        .bind(now)
        .execute(&self.pool)
        .await?;

        debug!("Saved profile: {}", profile.id);
        Ok(())
    }

    async fn load_profiles(&self) -> StoreResult<Vec<Profile>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM profiles ORDER BY joined_at, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_profile).collect()
    }
}

#[async_trait]
impl SwapStore for SqliteStore {
    async fn insert_request(&self, request: &SwapRequest) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO swap_requests (
                id, requester_id, recipient_id, offered_skill, wanted_skill,
                message, status, created_at, last_transitioned_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(request.id.as_str())
        .bind(request.requester_id.as_str())
        .bind(request.recipient_id.as_str())
        .bind(&request.offered_skill)
        .bind(&request.wanted_skill)
        .bind(&request.message)
        .bind(request.status.to_string())
        .bind(request.created_at.timestamp_millis())
        .bind(request.last_transitioned_at.timestamp_millis())
        .execute(&self.pool)
        .await?;

        debug!("Inserted swap request: {}", request.id);
        Ok(())
    }

    async fn get_request(&self, id: &RequestId) -> StoreResult<Option<SwapRequest>> {
        let row = sqlx::query(
            r#"
            SELECT * FROM swap_requests WHERE id = ?1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_request).transpose()
    }

    async fn compare_and_set(
        &self,
        expected: SwapStatus,
        updated: &SwapRequest,
    ) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE swap_requests
            SET status = ?1, last_transitioned_at = ?2
            WHERE id = ?3 AND status = ?4
            "#,
        )
        .bind(updated.status.to_string())
        .bind(updated.last_transitioned_at.timestamp_millis())
        .bind(updated.id.as_str())
        .bind(expected.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn requests_involving(&self, member: &ProfileId) -> StoreResult<Vec<SwapRequest>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM swap_requests
            WHERE requester_id = ?1 OR recipient_id = ?1
            "#,
        )
        .bind(member.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_request).collect()
    }

    async fn request_count(&self) -> StoreResult<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM swap_requests")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as usize)
    }
}

fn millis_to_datetime(ms: i64) -> StoreResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| StoreError::InvalidData("Invalid timestamp".to_string()))
}

/// Persistence statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceStats {
    pub total_profiles: usize,
    pub public_profiles: usize,
    pub total_requests: usize,
    pub pending_requests: usize,
}
