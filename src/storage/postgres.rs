use crate::models::{ClientIdentity, LedgerStats, VisitRecord, COUNTER_ROW_ID};
use crate::storage::{Storage, StorageResult};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;

pub struct PostgresStorage {
    pool: Arc<PgPool>,
}

impl PostgresStorage {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }
}

#[async_trait]
impl Storage for PostgresStorage {
    async fn ensure_schema(&self) -> StorageResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS visit_counter (
                id BIGINT PRIMARY KEY,
                count BIGINT NOT NULL DEFAULT 0
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS visit_records (
                ip TEXT NOT NULL,
                user_agent TEXT NOT NULL,
                visit_time BIGINT NOT NULL,
                PRIMARY KEY (ip, user_agent)
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn get_count(&self) -> StorageResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT count FROM visit_counter WHERE id = $1")
            .bind(COUNTER_ROW_ID)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(count.unwrap_or(0))
    }

    async fn find_recent_record(
        &self,
        identity: &ClientIdentity,
        window_start: i64,
    ) -> StorageResult<Option<VisitRecord>> {
        let record = sqlx::query_as::<_, VisitRecord>(
            r#"
            SELECT ip, user_agent, visit_time AS last_visit_at
            FROM visit_records
            WHERE ip = $1 AND user_agent = $2 AND visit_time > $3
            "#,
        )
        .bind(&identity.ip)
        .bind(&identity.user_agent)
        .bind(window_start)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(record)
    }

    async fn increment_and_record(
        &self,
        identity: &ClientIdentity,
        now: i64,
    ) -> StorageResult<i64> {
        let mut tx = self.pool.begin().await?;

        let count = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO visit_counter (id, count)
            VALUES ($1, 1)
            ON CONFLICT (id) DO UPDATE SET count = visit_counter.count + 1
            RETURNING count
            "#,
        )
        .bind(COUNTER_ROW_ID)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO visit_records (ip, user_agent, visit_time)
            VALUES ($1, $2, $3)
            ON CONFLICT (ip, user_agent) DO UPDATE SET visit_time = EXCLUDED.visit_time
            "#,
        )
        .bind(&identity.ip)
        .bind(&identity.user_agent)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(count)
    }

    async fn get_record(&self, identity: &ClientIdentity) -> StorageResult<Option<VisitRecord>> {
        let record = sqlx::query_as::<_, VisitRecord>(
            r#"
            SELECT ip, user_agent, visit_time AS last_visit_at
            FROM visit_records
            WHERE ip = $1 AND user_agent = $2
            "#,
        )
        .bind(&identity.ip)
        .bind(&identity.user_agent)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(record)
    }

    async fn stats(&self) -> StorageResult<LedgerStats> {
        let (counter_rows, record_rows) = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM visit_counter),
                (SELECT COUNT(*) FROM visit_records)
            "#,
        )
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(LedgerStats {
            count: self.get_count().await?,
            counter_rows,
            record_rows,
        })
    }
}
