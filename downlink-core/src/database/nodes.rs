use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use downlink_model::{CaptureNodeRecord, NodeId};

use super::{NodeRegistry, map_insert_error};
use crate::error::Result;

#[derive(Clone, Debug)]
pub struct PostgresNodeRegistry {
    pool: PgPool,
}

impl PostgresNodeRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct NodeRow {
    id: String,
    client: String,
    registered_at: DateTime<Utc>,
}

impl From<NodeRow> for CaptureNodeRecord {
    fn from(row: NodeRow) -> Self {
        CaptureNodeRecord {
            id: NodeId(row.id),
            client: row.client,
            registered_at: row.registered_at,
        }
    }
}

#[async_trait]
impl NodeRegistry for PostgresNodeRegistry {
    async fn register(&self, id: &NodeId, client: &str) -> Result<CaptureNodeRecord> {
        let row = sqlx::query_as::<_, NodeRow>(
            r#"
            INSERT INTO capture_nodes (id, client)
            VALUES ($1, $2)
            RETURNING id, client, registered_at
            "#,
        )
        .bind(id)
        .bind(client)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| map_insert_error(err, &format!("capture node '{id}'")))?;

        Ok(row.into())
    }

    async fn exists(&self, id: &NodeId) -> Result<bool> {
        let found: Option<i32> =
            sqlx::query_scalar("SELECT 1 FROM capture_nodes WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(found.is_some())
    }

    async fn list(&self) -> Result<Vec<CaptureNodeRecord>> {
        let rows = sqlx::query_as::<_, NodeRow>(
            "SELECT id, client, registered_at FROM capture_nodes ORDER BY registered_at",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
