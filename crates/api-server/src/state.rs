//! Application state

use std::sync::Arc;

use sqlx::sqlite::SqlitePool;

use cmmc_core::account::AccountStore;
use cmmc_core::company::CompanyStore;
use cmmc_core::naics::NaicsStore;

use crate::notify::Notifier;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    account_store: AccountStore,
    company_store: CompanyStore,
    naics_store: NaicsStore,
    notifier: Arc<dyn Notifier>,
}

impl AppState {
    /// Create a new AppState over an initialized pool
    pub fn new(pool: SqlitePool, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                account_store: AccountStore::new(pool.clone()),
                company_store: CompanyStore::new(pool.clone()),
                naics_store: NaicsStore::new(pool),
                notifier,
            }),
        }
    }

    pub fn account_store(&self) -> &AccountStore {
        &self.inner.account_store
    }

    pub fn company_store(&self) -> &CompanyStore {
        &self.inner.company_store
    }

    pub fn naics_store(&self) -> &NaicsStore {
        &self.inner.naics_store
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.inner.notifier.as_ref()
    }
}
