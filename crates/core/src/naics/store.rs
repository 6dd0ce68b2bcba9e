//! NAICS reference-data reads

use sqlx::sqlite::SqlitePool;
use uuid::Uuid;

use super::model::NaicsCode;
use crate::Result;

/// Read-only store over the seeded NAICS taxonomy.
#[derive(Clone)]
pub struct NaicsStore {
    pool: SqlitePool,
}

impl NaicsStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// The full taxonomy, ordered by code.
    pub async fn list(&self) -> Result<Vec<NaicsCode>> {
        let codes = sqlx::query_as::<_, NaicsCode>(
            "SELECT code, title FROM naics_codes ORDER BY code",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(codes)
    }

    /// Codes associated with one company. No ordering guarantee is made
    /// to consumers; code order is used for determinism only.
    pub async fn for_company(&self, company_id: Uuid) -> Result<Vec<NaicsCode>> {
        let codes = sqlx::query_as::<_, NaicsCode>(
            "SELECT nc.code, nc.title FROM naics_codes nc
             JOIN company_naics cn ON nc.code = cn.naics_code
             WHERE cn.company_id = ?
             ORDER BY nc.code",
        )
        .bind(company_id.to_string())
        .fetch_all(&self.pool)
        .await?;
        Ok(codes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::company::{CmmcLevel, CompanyStore, NewCompany};
    use crate::db;
    use chrono::Utc;

    async fn seeded_pool() -> SqlitePool {
        let pool = db::connect_in_memory().await.unwrap();
        for (code, title) in [
            ("541519", "Other Computer Related Services"),
            ("334111", "Electronic Computer Manufacturing"),
            ("541512", "Computer Systems Design Services"),
        ] {
            sqlx::query("INSERT INTO naics_codes (code, title) VALUES (?, ?)")
                .bind(code)
                .bind(title)
                .execute(&pool)
                .await
                .unwrap();
        }
        pool
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_code() {
        let pool = seeded_pool().await;
        let store = NaicsStore::new(pool);

        let codes = store.list().await.unwrap();
        let ordered: Vec<&str> = codes.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(ordered, ["334111", "541512", "541519"]);
    }

    #[tokio::test]
    async fn test_for_company_joins_through_associations() {
        let pool = seeded_pool().await;
        let owner = Uuid::new_v4();
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO accounts (id, external_id, email, created_at, updated_at)
             VALUES (?, 'user_1', 'user_1@example.com', ?, ?)",
        )
        .bind(owner.to_string())
        .bind(now)
        .bind(now)
        .execute(&pool)
        .await
        .unwrap();

        let companies = CompanyStore::new(pool.clone());
        let company = companies
            .create(
                owner,
                NewCompany {
                    name: "Acme".to_string(),
                    cmmc_level: CmmcLevel::Two,
                    ..Default::default()
                },
                Some(&["541512".to_string(), "334111".to_string()]),
            )
            .await
            .unwrap();

        let store = NaicsStore::new(pool);
        let codes = store.for_company(company.id).await.unwrap();
        let ordered: Vec<&str> = codes.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(ordered, ["334111", "541512"]);

        assert!(store.for_company(Uuid::new_v4()).await.unwrap().is_empty());
    }
}
