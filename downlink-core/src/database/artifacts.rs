use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, QueryBuilder};

use downlink_model::{
    Artifact, ArtifactId, ArtifactRecord, ExportFilter, NewArtifact, NodeId, RequestId,
};

use super::ArtifactRepository;
use crate::error::Result;

#[derive(Clone, Debug)]
pub struct PostgresArtifactRepository {
    pool: PgPool,
}

impl PostgresArtifactRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ArtifactRow {
    id: i64,
    request_id: i64,
    target_id: String,
    request_timestamp: DateTime<Utc>,
    filename: String,
    data: Vec<u8>,
    seen: bool,
}

impl From<ArtifactRow> for Artifact {
    fn from(row: ArtifactRow) -> Self {
        Artifact {
            id: ArtifactId(row.id),
            request_id: RequestId(row.request_id),
            target_id: NodeId(row.target_id),
            request_timestamp: row.request_timestamp,
            filename: row.filename,
            data: row.data,
            seen: row.seen,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ArtifactRecordRow {
    id: i64,
    request_id: i64,
    target_id: String,
    request_timestamp: DateTime<Utc>,
    filename: String,
    seen: bool,
    created_at: DateTime<Utc>,
}

impl From<ArtifactRecordRow> for ArtifactRecord {
    fn from(row: ArtifactRecordRow) -> Self {
        ArtifactRecord {
            id: ArtifactId(row.id),
            request_id: RequestId(row.request_id),
            target_id: NodeId(row.target_id),
            request_timestamp: row.request_timestamp,
            filename: row.filename,
            seen: row.seen,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl ArtifactRepository for PostgresArtifactRepository {
    async fn insert_artifact(&self, artifact: NewArtifact) -> Result<ArtifactRecord> {
        let row = sqlx::query_as::<_, ArtifactRecordRow>(
            r#"
            INSERT INTO artifacts (request_id, target_id, request_timestamp, filename, data)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, request_id, target_id, request_timestamp, filename, seen, created_at
            "#,
        )
        .bind(artifact.request_id)
        .bind(&artifact.target_id)
        .bind(artifact.request_timestamp)
        .bind(&artifact.filename)
        .bind(&artifact.data)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn query(&self, filter: &ExportFilter) -> Result<Vec<Artifact>> {
        let mut builder = QueryBuilder::new(
            "SELECT id, request_id, target_id, request_timestamp, filename, data, seen \
             FROM artifacts WHERE TRUE",
        );

        // Conjunctive optional predicates; ranges inclusive on both ends.
        if let Some(start) = filter.request_timestamp_start {
            builder.push(" AND request_timestamp >= ");
            builder.push_bind(start);
        }
        if let Some(end) = filter.request_timestamp_end {
            builder.push(" AND request_timestamp <= ");
            builder.push_bind(end);
        }
        if let Some(start) = filter.request_id_start {
            builder.push(" AND request_id >= ");
            builder.push_bind(start);
        }
        if let Some(end) = filter.request_id_end {
            builder.push(" AND request_id <= ");
            builder.push_bind(end);
        }
        if let Some(ref target) = filter.target_id {
            builder.push(" AND target_id = ");
            builder.push_bind(target.clone());
        }
        builder.push(" ORDER BY id");

        let rows = builder
            .build_query_as::<ArtifactRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM artifacts")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
