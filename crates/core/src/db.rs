//! Database connection and schema bootstrap

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::Result;

/// Schema statements, safe to re-run on every startup.
///
/// All identifiers and timestamps are written by the application (UUIDs as
/// hyphenated TEXT, timestamps bound as `chrono` values), so no column
/// carries a database-side default for them.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS accounts (
    id TEXT PRIMARY KEY,
    external_id TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL,
    first_name TEXT,
    last_name TEXT,
    billing_customer_id TEXT,
    subscription_status TEXT NOT NULL DEFAULT 'inactive',
    subscription_end_date TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS companies (
    id TEXT PRIMARY KEY,
    account_id TEXT REFERENCES accounts(id),
    name TEXT NOT NULL,
    description TEXT,
    website TEXT,
    email TEXT,
    phone TEXT,
    address_line1 TEXT,
    address_line2 TEXT,
    city TEXT,
    state TEXT,
    zip_code TEXT,
    country TEXT NOT NULL DEFAULT 'US',
    cmmc_level INTEGER NOT NULL CHECK (cmmc_level IN (1, 2, 3)),
    certification_date TEXT,
    certification_expiry TEXT,
    assessment_type TEXT,
    c3pao_name TEXT,
    status TEXT NOT NULL DEFAULT 'pending',
    is_featured INTEGER NOT NULL DEFAULT 0,
    logo_url TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_companies_status ON companies(status);
CREATE INDEX IF NOT EXISTS idx_companies_state ON companies(state);
CREATE INDEX IF NOT EXISTS idx_companies_account ON companies(account_id);

CREATE TABLE IF NOT EXISTS naics_codes (
    code TEXT PRIMARY KEY,
    title TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS company_naics (
    company_id TEXT NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    naics_code TEXT NOT NULL REFERENCES naics_codes(code),
    PRIMARY KEY (company_id, naics_code)
);

CREATE TABLE IF NOT EXISTS subscriptions (
    id TEXT PRIMARY KEY,
    account_id TEXT NOT NULL REFERENCES accounts(id),
    external_subscription_id TEXT NOT NULL UNIQUE,
    external_price_id TEXT NOT NULL,
    status TEXT NOT NULL,
    current_period_start TEXT,
    current_period_end TEXT,
    cancel_at_period_end INTEGER NOT NULL DEFAULT 0,
    canceled_at TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

/// Open (creating if necessary) the database at `url` and run the schema.
pub async fn connect(url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    init_schema(&pool).await?;
    tracing::info!(url, "database ready");
    Ok(pool)
}

/// In-memory database for tests.
///
/// Pinned to a single connection: every connection to `:memory:` is its own
/// database, so a larger pool would scatter state across databases.
pub async fn connect_in_memory() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;
    init_schema(&pool).await?;
    Ok(pool)
}

/// Apply the schema. Idempotent.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    Ok(())
}
