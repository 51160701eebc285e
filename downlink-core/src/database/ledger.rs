use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use downlink_model::{DispatchRequest, NewDispatchRequest, NodeId, RequestId};

use super::LedgerRepository;
use crate::error::Result;

#[derive(Clone, Debug)]
pub struct PostgresLedgerRepository {
    pool: PgPool,
}

impl PostgresLedgerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct RequestRow {
    id: i64,
    target_id: String,
    capture_interval: i32,
    scheduled_time: Option<i64>,
    cycles: i32,
    seen: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<RequestRow> for DispatchRequest {
    fn from(row: RequestRow) -> Self {
        DispatchRequest {
            id: RequestId(row.id),
            target_id: NodeId(row.target_id),
            interval: row.capture_interval,
            scheduled_time: row.scheduled_time,
            cycles: row.cycles,
            seen: row.seen,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl LedgerRepository for PostgresLedgerRepository {
    async fn insert_request(&self, request: NewDispatchRequest) -> Result<DispatchRequest> {
        let row = sqlx::query_as::<_, RequestRow>(
            r#"
            INSERT INTO dispatch_requests (target_id, capture_interval, scheduled_time, cycles)
            VALUES ($1, $2, $3, $4)
            RETURNING id, target_id, capture_interval, scheduled_time, cycles,
                      seen, created_at, updated_at
            "#,
        )
        .bind(&request.target_id)
        .bind(request.interval)
        .bind(request.scheduled_time)
        .bind(request.cycles)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn claim_unseen(&self) -> Result<Vec<DispatchRequest>> {
        // Claim-then-send: the flip to seen = true happens in the same
        // statement that reads the batch. A request whose later dispatch
        // fails stays claimed; delivery is at-most-once.
        let rows = sqlx::query_as::<_, RequestRow>(
            r#"
            WITH claimed AS (
                UPDATE dispatch_requests
                SET seen = TRUE, updated_at = now()
                WHERE seen = FALSE
                RETURNING id, target_id, capture_interval, scheduled_time, cycles,
                          seen, created_at, updated_at
            )
            SELECT id, target_id, capture_interval, scheduled_time, cycles,
                   seen, created_at, updated_at
            FROM claimed
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get_request(&self, id: RequestId) -> Result<Option<DispatchRequest>> {
        let row = sqlx::query_as::<_, RequestRow>(
            r#"
            SELECT id, target_id, capture_interval, scheduled_time, cycles,
                   seen, created_at, updated_at
            FROM dispatch_requests
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn count_unseen(&self) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM dispatch_requests WHERE seen = FALSE")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}
