//! Postgres-backed store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use eyre::{eyre, Result, WrapErr};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;

use super::RelayStore;
use crate::types::{BridgeEventRecord, MessageId, RecordStatus};

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect and run pending migrations from `migrations/`.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .wrap_err("Failed to connect to database")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .wrap_err("Failed to run database migrations")?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn row_to_record(row: &PgRow) -> Result<BridgeEventRecord> {
    let id_bytes: Vec<u8> = row.try_get("message_id")?;
    if id_bytes.len() != 32 {
        return Err(eyre!("message_id column holds {} bytes", id_bytes.len()));
    }
    let mut message_id = [0u8; 32];
    message_id.copy_from_slice(&id_bytes);

    // amount is NUMERIC(78,0), selected as text and parsed into u128
    let amount_text: String = row.try_get("net_amount")?;
    let net_amount = amount_text
        .parse::<u128>()
        .wrap_err("net_amount column is not a valid u128")?;

    let status_text: String = row.try_get("status")?;
    let status = RecordStatus::parse(&status_text)
        .ok_or_else(|| eyre!("unknown status value: {}", status_text))?;

    Ok(BridgeEventRecord {
        message_id,
        source_chain_id: row.try_get::<i64, _>("source_chain_id")? as u64,
        source_block: row.try_get::<i64, _>("source_block")? as u64,
        token: row.try_get("token")?,
        sender: row.try_get("sender")?,
        recipient: row.try_get("recipient")?,
        net_amount,
        target_chain_id: row.try_get::<i64, _>("target_chain_id")? as u64,
        confirmation_count: row.try_get::<i64, _>("confirmation_count")? as u64,
        status,
        attempts: row.try_get::<i32, _>("attempts")? as u32,
        next_retry_at: row.try_get("next_retry_at")?,
        last_error: row.try_get("last_error")?,
    })
}

const RECORD_COLUMNS: &str = "message_id, source_chain_id, source_block, token, sender, \
     recipient, net_amount::TEXT AS net_amount, target_chain_id, confirmation_count, status, \
     attempts, next_retry_at, last_error";

#[async_trait]
impl RelayStore for PgStore {
    async fn watermark(&self, chain_id: u64) -> Result<Option<u64>> {
        let row = sqlx::query(
            "SELECT last_processed_block FROM watermarks WHERE chain_id = $1",
        )
        .bind(chain_id as i64)
        .fetch_optional(&self.pool)
        .await
        .wrap_err("Failed to read watermark")?;

        Ok(row
            .map(|r| r.try_get::<i64, _>("last_processed_block"))
            .transpose()?
            .map(|block| block as u64))
    }

    async fn set_watermark(&self, chain_id: u64, block: u64) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO watermarks (chain_id, last_processed_block, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (chain_id)
            DO UPDATE SET last_processed_block = $2, updated_at = now()
            "#,
        )
        .bind(chain_id as i64)
        .bind(block as i64)
        .execute(&self.pool)
        .await
        .wrap_err("Failed to persist watermark")?;
        Ok(())
    }

    async fn insert_record(&self, record: &BridgeEventRecord) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO bridge_events (message_id, source_chain_id, source_block, token,
                sender, recipient, net_amount, target_chain_id, confirmation_count,
                status, attempts, next_retry_at, last_error)
            VALUES ($1, $2, $3, $4, $5, $6, $7::NUMERIC, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (message_id) DO NOTHING
            "#,
        )
        .bind(&record.message_id[..])
        .bind(record.source_chain_id as i64)
        .bind(record.source_block as i64)
        .bind(&record.token)
        .bind(&record.sender)
        .bind(&record.recipient)
        .bind(record.net_amount.to_string())
        .bind(record.target_chain_id as i64)
        .bind(record.confirmation_count as i64)
        .bind(record.status.as_str())
        .bind(record.attempts as i32)
        .bind(record.next_retry_at)
        .bind(&record.last_error)
        .execute(&self.pool)
        .await
        .wrap_err("Failed to insert bridge event record")?;

        Ok(result.rows_affected() > 0)
    }

    async fn get_record(&self, message_id: &MessageId) -> Result<Option<BridgeEventRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM bridge_events WHERE message_id = $1",
            RECORD_COLUMNS
        ))
        .bind(&message_id[..])
        .fetch_optional(&self.pool)
        .await
        .wrap_err("Failed to read bridge event record")?;

        row.as_ref().map(row_to_record).transpose()
    }

    async fn update_record(&self, record: &BridgeEventRecord) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE bridge_events
            SET confirmation_count = $2, status = $3, attempts = $4,
                next_retry_at = $5, last_error = $6, updated_at = now()
            WHERE message_id = $1
            "#,
        )
        .bind(&record.message_id[..])
        .bind(record.confirmation_count as i64)
        .bind(record.status.as_str())
        .bind(record.attempts as i32)
        .bind(record.next_retry_at)
        .bind(&record.last_error)
        .execute(&self.pool)
        .await
        .wrap_err("Failed to update bridge event record")?;
        Ok(())
    }

    async fn claimable_records(&self, now: DateTime<Utc>) -> Result<Vec<BridgeEventRecord>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM bridge_events
            WHERE status IN ('observed', 'ready_to_claim')
               OR (status = 'failed' AND next_retry_at IS NOT NULL AND next_retry_at <= $1)
            ORDER BY created_at
            "#,
            RECORD_COLUMNS
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .wrap_err("Failed to scan claimable records")?;

        rows.iter().map(row_to_record).collect()
    }

    async fn inflight_records(&self) -> Result<Vec<BridgeEventRecord>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM bridge_events
            WHERE status = 'claim_submitted'
            ORDER BY created_at
            "#,
            RECORD_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .wrap_err("Failed to scan in-flight records")?;

        rows.iter().map(row_to_record).collect()
    }

    async fn failed_records(&self) -> Result<Vec<BridgeEventRecord>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM bridge_events
            WHERE status = 'failed' AND next_retry_at IS NULL
            ORDER BY created_at
            "#,
            RECORD_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .wrap_err("Failed to scan failed records")?;

        rows.iter().map(row_to_record).collect()
    }
}
