//! Company persistence: filtered reads and ownership-scoped writes
//!
//! Reads go through [`CompanyFilter`] so the list and count queries share
//! one predicate set. Writes enforce ownership with a single conditional
//! `UPDATE ... WHERE id = ? AND account_id = ?` and a rows-affected check,
//! so a non-owner can never win a check-then-act race. The company row and
//! its industry-code association set are written in one transaction.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::SqlitePool;
use sqlx::{FromRow, QueryBuilder, Sqlite};
use uuid::Uuid;

use super::filter::{CompanyFilter, CompanyPage};
use super::model::{AssessmentType, Company, CompanyPatch, CompanyStatus, NewCompany};
use crate::patch::Patch;
use crate::{Error, Result};

/// Raw database row; UUIDs and enums arrive as TEXT and are converted in
/// [`CompanyRow::try_into_company`].
#[derive(Debug, FromRow)]
struct CompanyRow {
    id: String,
    account_id: Option<String>,
    name: String,
    description: Option<String>,
    website: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    address_line1: Option<String>,
    address_line2: Option<String>,
    city: Option<String>,
    state: Option<String>,
    zip_code: Option<String>,
    country: String,
    cmmc_level: i64,
    certification_date: Option<NaiveDate>,
    certification_expiry: Option<NaiveDate>,
    assessment_type: Option<String>,
    c3pao_name: Option<String>,
    status: String,
    is_featured: bool,
    logo_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CompanyRow {
    fn try_into_company(self) -> Result<Company> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| Error::Storage(format!("invalid company id: {e}")))?;
        let account_id = self
            .account_id
            .map(|raw| Uuid::parse_str(&raw))
            .transpose()
            .map_err(|e| Error::Storage(format!("invalid account id: {e}")))?;
        let cmmc_level = self
            .cmmc_level
            .try_into()
            .map_err(|e| Error::Storage(format!("{e}")))?;
        let assessment_type = self
            .assessment_type
            .as_deref()
            .map(AssessmentType::parse)
            .transpose()?;

        Ok(Company {
            id,
            account_id,
            name: self.name,
            description: self.description,
            website: self.website,
            email: self.email,
            phone: self.phone,
            address_line1: self.address_line1,
            address_line2: self.address_line2,
            city: self.city,
            state: self.state,
            zip_code: self.zip_code,
            country: self.country,
            cmmc_level,
            certification_date: self.certification_date,
            certification_expiry: self.certification_expiry,
            assessment_type,
            c3pao_name: self.c3pao_name,
            status: CompanyStatus::parse(&self.status)?,
            is_featured: self.is_featured,
            logo_url: self.logo_url,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SQLite-backed company store.
#[derive(Clone)]
pub struct CompanyStore {
    pool: SqlitePool,
}

impl CompanyStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a listing owned by `account_id`.
    ///
    /// Status starts at `pending` and the featured flag off. When an
    /// industry-code list is supplied the association set is written in
    /// the same transaction as the row.
    pub async fn create(
        &self,
        account_id: Uuid,
        new: NewCompany,
        naics_codes: Option<&[String]>,
    ) -> Result<Company> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO companies (
                id, account_id, name, description, website, email, phone,
                address_line1, address_line2, city, state, zip_code,
                cmmc_level, certification_date, certification_expiry,
                assessment_type, c3pao_name, status, is_featured, logo_url,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 'pending', 0, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(account_id.to_string())
        .bind(&new.name)
        .bind(&new.description)
        .bind(&new.website)
        .bind(&new.email)
        .bind(&new.phone)
        .bind(&new.address_line1)
        .bind(&new.address_line2)
        .bind(&new.city)
        .bind(&new.state)
        .bind(&new.zip_code)
        .bind(new.cmmc_level.as_i64())
        .bind(new.certification_date)
        .bind(new.certification_expiry)
        .bind(new.assessment_type.map(AssessmentType::as_str))
        .bind(&new.c3pao_name)
        .bind(&new.logo_url)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if let Some(codes) = naics_codes {
            replace_naics_codes(&mut tx, id, codes).await?;
        }

        tx.commit().await?;

        self.get(id)
            .await?
            .ok_or_else(|| Error::CompanyNotFound(id.to_string()))
    }

    /// Ownership-scoped partial update.
    ///
    /// Returns `Ok(None)` when the listing does not exist *or* is not
    /// owned by `account_id`; callers cannot tell the two apart. Fields
    /// left at [`Patch::Keep`] retain their stored value. An industry-code
    /// list, when supplied (even empty), fully replaces the association
    /// set; an omitted list leaves it untouched.
    pub async fn update(
        &self,
        id: Uuid,
        account_id: Uuid,
        patch: &CompanyPatch,
        naics_codes: Option<&[String]>,
    ) -> Result<Option<Company>> {
        let mut tx = self.pool.begin().await?;

        // The ownership check and the write are one conditional statement;
        // updated_at is always touched so the statement never degenerates
        // to an empty SET list.
        let mut qb: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new("UPDATE companies SET updated_at = ");
        qb.push_bind(Utc::now());
        push_set_clauses(&mut qb, patch);
        qb.push(" WHERE id = ").push_bind(id.to_string());
        qb.push(" AND account_id = ").push_bind(account_id.to_string());

        let result = qb.build().execute(&mut *tx).await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }

        if let Some(codes) = naics_codes {
            replace_naics_codes(&mut tx, id, codes).await?;
        }

        tx.commit().await?;
        self.get(id).await
    }

    /// Fetch a listing by id, regardless of status or owner.
    pub async fn get(&self, id: Uuid) -> Result<Option<Company>> {
        let row = sqlx::query_as::<_, CompanyRow>("SELECT * FROM companies WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.map(CompanyRow::try_into_company).transpose()
    }

    /// Public detail view: only verified listings are visible.
    pub async fn get_verified(&self, id: Uuid) -> Result<Option<Company>> {
        let row = sqlx::query_as::<_, CompanyRow>(
            "SELECT * FROM companies WHERE id = ? AND status = 'verified'",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        row.map(CompanyRow::try_into_company).transpose()
    }

    /// Owner detail view: any status, but only the owner's listing.
    pub async fn get_owned(&self, id: Uuid, account_id: Uuid) -> Result<Option<Company>> {
        let row = sqlx::query_as::<_, CompanyRow>(
            "SELECT * FROM companies WHERE id = ? AND account_id = ?",
        )
        .bind(id.to_string())
        .bind(account_id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        row.map(CompanyRow::try_into_company).transpose()
    }

    /// Matching listings, featured first then name ascending.
    pub async fn list(&self, filter: &CompanyFilter) -> Result<Vec<Company>> {
        let mut qb = QueryBuilder::new("SELECT * FROM companies");
        filter.push_predicates(&mut qb);
        filter.push_order_and_pagination(&mut qb);

        let rows = qb
            .build_query_as::<CompanyRow>()
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter()
            .map(CompanyRow::try_into_company)
            .collect()
    }

    /// Count of all matching listings, ignoring pagination.
    pub async fn count(&self, filter: &CompanyFilter) -> Result<i64> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM companies");
        filter.push_predicates(&mut qb);

        let count = qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// One page of results plus the unclipped total, from one filter.
    pub async fn page(&self, filter: &CompanyFilter) -> Result<CompanyPage> {
        let companies = self.list(filter).await?;
        let total_count = self.count(filter).await?;
        Ok(CompanyPage {
            companies,
            total_count,
        })
    }
}

/// Append a `, column = value` clause for every supplied patch field.
fn push_set_clauses(qb: &mut QueryBuilder<'_, Sqlite>, patch: &CompanyPatch) {
    if let Patch::Set(name) = &patch.name {
        qb.push(", name = ").push_bind(name.clone());
    }
    if let Patch::Set(description) = &patch.description {
        qb.push(", description = ").push_bind(description.clone());
    }
    if let Patch::Set(website) = &patch.website {
        qb.push(", website = ").push_bind(website.clone());
    }
    if let Patch::Set(email) = &patch.email {
        qb.push(", email = ").push_bind(email.clone());
    }
    if let Patch::Set(phone) = &patch.phone {
        qb.push(", phone = ").push_bind(phone.clone());
    }
    if let Patch::Set(line1) = &patch.address_line1 {
        qb.push(", address_line1 = ").push_bind(line1.clone());
    }
    if let Patch::Set(line2) = &patch.address_line2 {
        qb.push(", address_line2 = ").push_bind(line2.clone());
    }
    if let Patch::Set(city) = &patch.city {
        qb.push(", city = ").push_bind(city.clone());
    }
    if let Patch::Set(state) = &patch.state {
        qb.push(", state = ").push_bind(state.clone());
    }
    if let Patch::Set(zip) = &patch.zip_code {
        qb.push(", zip_code = ").push_bind(zip.clone());
    }
    if let Patch::Set(level) = &patch.cmmc_level {
        qb.push(", cmmc_level = ").push_bind(level.as_i64());
    }
    if let Patch::Set(date) = &patch.certification_date {
        qb.push(", certification_date = ").push_bind(*date);
    }
    if let Patch::Set(expiry) = &patch.certification_expiry {
        qb.push(", certification_expiry = ").push_bind(*expiry);
    }
    if let Patch::Set(assessment) = &patch.assessment_type {
        qb.push(", assessment_type = ")
            .push_bind(assessment.map(AssessmentType::as_str));
    }
    if let Patch::Set(c3pao) = &patch.c3pao_name {
        qb.push(", c3pao_name = ").push_bind(c3pao.clone());
    }
    if let Patch::Set(logo) = &patch.logo_url {
        qb.push(", logo_url = ").push_bind(logo.clone());
    }
}

/// Delete-then-insert replacement of a company's industry-code set.
///
/// Runs inside the caller's transaction so no reader ever observes the
/// empty intermediate state. Duplicate codes in the input collapse via
/// `INSERT OR IGNORE` against the composite primary key.
async fn replace_naics_codes(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    company_id: Uuid,
    codes: &[String],
) -> Result<()> {
    sqlx::query("DELETE FROM company_naics WHERE company_id = ?")
        .bind(company_id.to_string())
        .execute(&mut **tx)
        .await?;

    for code in codes {
        sqlx::query("INSERT OR IGNORE INTO company_naics (company_id, naics_code) VALUES (?, ?)")
            .bind(company_id.to_string())
            .bind(code)
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}
