//! Account persistence

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePool;
use sqlx::{FromRow, QueryBuilder, Sqlite};
use uuid::Uuid;

use super::model::{Account, AccountPatch, NewAccount, SubscriptionStatus};
use crate::patch::Patch;
use crate::{Error, Result};

#[derive(Debug, FromRow)]
struct AccountRow {
    id: String,
    external_id: String,
    email: String,
    first_name: Option<String>,
    last_name: Option<String>,
    billing_customer_id: Option<String>,
    subscription_status: String,
    subscription_end_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AccountRow {
    fn try_into_account(self) -> Result<Account> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| Error::Storage(format!("invalid account id: {e}")))?;
        Ok(Account {
            id,
            external_id: self.external_id,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            billing_customer_id: self.billing_customer_id,
            subscription_status: SubscriptionStatus::parse(&self.subscription_status)?,
            subscription_end_date: self.subscription_end_date,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SQLite-backed account store.
#[derive(Clone)]
pub struct AccountStore {
    pool: SqlitePool,
}

impl AccountStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create an account for a newly-seen external identity.
    ///
    /// New accounts start without an entitlement.
    pub async fn create(&self, new: NewAccount) -> Result<Account> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO accounts (
                id, external_id, email, first_name, last_name,
                subscription_status, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, 'inactive', ?, ?)",
        )
        .bind(id.to_string())
        .bind(&new.external_id)
        .bind(&new.email)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get(id)
            .await?
            .ok_or_else(|| Error::AccountNotFound(id.to_string()))
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>("SELECT * FROM accounts WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.map(AccountRow::try_into_account).transpose()
    }

    pub async fn get_by_external_id(&self, external_id: &str) -> Result<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>("SELECT * FROM accounts WHERE external_id = ?")
            .bind(external_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(AccountRow::try_into_account).transpose()
    }

    pub async fn get_by_billing_customer_id(&self, customer_id: &str) -> Result<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(
            "SELECT * FROM accounts WHERE billing_customer_id = ?",
        )
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(AccountRow::try_into_account).transpose()
    }

    /// Partial update keyed by the external identity reference.
    ///
    /// Returns `Ok(None)` when no such account exists.
    pub async fn update(
        &self,
        external_id: &str,
        patch: &AccountPatch,
    ) -> Result<Option<Account>> {
        let mut qb: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new("UPDATE accounts SET updated_at = ");
        qb.push_bind(Utc::now());
        if let Patch::Set(email) = &patch.email {
            qb.push(", email = ").push_bind(email.clone());
        }
        if let Patch::Set(first_name) = &patch.first_name {
            qb.push(", first_name = ").push_bind(first_name.clone());
        }
        if let Patch::Set(last_name) = &patch.last_name {
            qb.push(", last_name = ").push_bind(last_name.clone());
        }
        if let Patch::Set(customer_id) = &patch.billing_customer_id {
            qb.push(", billing_customer_id = ")
                .push_bind(customer_id.clone());
        }
        if let Patch::Set(status) = &patch.subscription_status {
            qb.push(", subscription_status = ").push_bind(status.as_str());
        }
        if let Patch::Set(end_date) = &patch.subscription_end_date {
            qb.push(", subscription_end_date = ").push_bind(*end_date);
        }
        qb.push(" WHERE external_id = ").push_bind(external_id);

        let result = qb.build().execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_by_external_id(external_id).await
    }

    /// Normalized projection of a billing-subscription transition.
    pub async fn set_subscription(
        &self,
        id: Uuid,
        status: SubscriptionStatus,
        end_date: Option<DateTime<Utc>>,
    ) -> Result<Option<Account>> {
        sqlx::query(
            "UPDATE accounts SET subscription_status = ?, subscription_end_date = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(status.as_str())
        .bind(end_date)
        .bind(Utc::now())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;
        self.get(id).await
    }

    /// Remove an account (driven by the `user.deleted` webhook).
    pub async fn delete_by_external_id(&self, external_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM accounts WHERE external_id = ?")
            .bind(external_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
