//! Subscription persistence

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePool;
use sqlx::FromRow;
use uuid::Uuid;

use super::model::{Subscription, SubscriptionUpsert};
use crate::{Error, Result};

#[derive(Debug, FromRow)]
struct SubscriptionRow {
    id: String,
    account_id: String,
    external_subscription_id: String,
    external_price_id: String,
    status: String,
    current_period_start: Option<DateTime<Utc>>,
    current_period_end: Option<DateTime<Utc>>,
    cancel_at_period_end: bool,
    canceled_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SubscriptionRow {
    fn try_into_subscription(self) -> Result<Subscription> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| Error::Storage(format!("invalid subscription id: {e}")))?;
        let account_id = Uuid::parse_str(&self.account_id)
            .map_err(|e| Error::Storage(format!("invalid account id: {e}")))?;
        Ok(Subscription {
            id,
            account_id,
            external_subscription_id: self.external_subscription_id,
            external_price_id: self.external_price_id,
            status: self.status,
            current_period_start: self.current_period_start,
            current_period_end: self.current_period_end,
            cancel_at_period_end: self.cancel_at_period_end,
            canceled_at: self.canceled_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SQLite-backed subscription store.
#[derive(Clone)]
pub struct SubscriptionStore {
    pool: SqlitePool,
}

impl SubscriptionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert or update, keyed by the unique external subscription
    /// reference. The internal id and creation timestamp of an existing
    /// row are preserved.
    pub async fn upsert(&self, input: SubscriptionUpsert) -> Result<Subscription> {
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO subscriptions (
                id, account_id, external_subscription_id, external_price_id,
                status, current_period_start, current_period_end,
                cancel_at_period_end, canceled_at, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (external_subscription_id) DO UPDATE SET
                status = excluded.status,
                current_period_start = excluded.current_period_start,
                current_period_end = excluded.current_period_end,
                cancel_at_period_end = excluded.cancel_at_period_end,
                canceled_at = excluded.canceled_at,
                updated_at = excluded.updated_at",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(input.account_id.to_string())
        .bind(&input.external_subscription_id)
        .bind(&input.external_price_id)
        .bind(&input.status)
        .bind(input.current_period_start)
        .bind(input.current_period_end)
        .bind(input.cancel_at_period_end)
        .bind(input.canceled_at)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get_by_external_id(&input.external_subscription_id)
            .await?
            .ok_or_else(|| Error::NotFound(input.external_subscription_id.clone()))
    }

    pub async fn get_by_external_id(&self, external_id: &str) -> Result<Option<Subscription>> {
        let row = sqlx::query_as::<_, SubscriptionRow>(
            "SELECT * FROM subscriptions WHERE external_subscription_id = ?",
        )
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(SubscriptionRow::try_into_subscription).transpose()
    }

    /// Subscriptions belonging to one account, newest period first.
    pub async fn list_for_account(&self, account_id: Uuid) -> Result<Vec<Subscription>> {
        let rows = sqlx::query_as::<_, SubscriptionRow>(
            "SELECT * FROM subscriptions WHERE account_id = ? ORDER BY created_at DESC",
        )
        .bind(account_id.to_string())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter()
            .map(SubscriptionRow::try_into_subscription)
            .collect()
    }
}
