//! Directory filter and predicate assembly
//!
//! A [`CompanyFilter`] is built once per request and handed to both the
//! list and count queries. Both call the same [`push_predicates`] routine,
//! so the two can never disagree about which rows match.
//!
//! [`push_predicates`]: CompanyFilter::push_predicates

use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite};
use uuid::Uuid;

use super::model::{CmmcLevel, Company, CompanyStatus};

/// Optional predicates for directory queries, AND-combined.
#[derive(Debug, Clone, Default)]
pub struct CompanyFilter {
    status: Option<CompanyStatus>,
    level: Option<CmmcLevel>,
    state: Option<String>,
    search: Option<String>,
    naics_code: Option<String>,
    account_id: Option<Uuid>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl CompanyFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to a lifecycle status (public directory uses `verified`).
    pub fn with_status(mut self, status: CompanyStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Restrict to a certification level.
    pub fn with_level(mut self, level: CmmcLevel) -> Self {
        self.level = Some(level);
        self
    }

    /// Restrict to a 2-letter state/region code. Unknown codes simply
    /// match zero rows; value validation happens at the API boundary.
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Case-insensitive substring match against name or description.
    ///
    /// An empty or whitespace-only string means "no search constraint",
    /// not "match nothing".
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        let search = search.into();
        let trimmed = search.trim();
        self.search = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        self
    }

    /// Restrict to companies associated with an industry code.
    pub fn with_naics_code(mut self, code: impl Into<String>) -> Self {
        self.naics_code = Some(code.into());
        self
    }

    /// Restrict to listings owned by an account.
    pub fn with_owner(mut self, account_id: Uuid) -> Self {
        self.account_id = Some(account_id);
        self
    }

    /// Standard SQL pagination; when never called, all matching rows are
    /// returned unclipped.
    pub fn paginate(mut self, limit: i64, offset: i64) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }

    /// Append the WHERE clause for this filter, binding every value.
    ///
    /// Shared between the list and count queries.
    pub(crate) fn push_predicates(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        let mut prefix = " WHERE ";
        if let Some(status) = self.status {
            qb.push(prefix).push("status = ").push_bind(status.as_str());
            prefix = " AND ";
        }
        if let Some(level) = self.level {
            qb.push(prefix)
                .push("cmmc_level = ")
                .push_bind(level.as_i64());
            prefix = " AND ";
        }
        if let Some(state) = &self.state {
            qb.push(prefix).push("state = ").push_bind(state.clone());
            prefix = " AND ";
        }
        if let Some(account_id) = self.account_id {
            qb.push(prefix)
                .push("account_id = ")
                .push_bind(account_id.to_string());
            prefix = " AND ";
        }
        if let Some(code) = &self.naics_code {
            qb.push(prefix)
                .push("EXISTS (SELECT 1 FROM company_naics cn WHERE cn.company_id = companies.id AND cn.naics_code = ")
                .push_bind(code.clone())
                .push(")");
            prefix = " AND ";
        }
        if let Some(search) = &self.search {
            let pattern = format!("%{search}%");
            qb.push(prefix)
                .push("(name LIKE ")
                .push_bind(pattern.clone())
                .push(" OR description LIKE ")
                .push_bind(pattern)
                .push(")");
        }
    }

    /// Append deterministic ordering and the LIMIT/OFFSET clause.
    ///
    /// Featured listings first, then alphabetical by name. SQLite needs a
    /// LIMIT to accept an OFFSET, so a bare offset gets `LIMIT -1`.
    pub(crate) fn push_order_and_pagination(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        qb.push(" ORDER BY is_featured DESC, name ASC");
        match (self.limit, self.offset) {
            (Some(limit), Some(offset)) => {
                qb.push(" LIMIT ").push_bind(limit);
                qb.push(" OFFSET ").push_bind(offset);
            }
            (Some(limit), None) => {
                qb.push(" LIMIT ").push_bind(limit);
            }
            (None, Some(offset)) => {
                qb.push(" LIMIT -1 OFFSET ").push_bind(offset);
            }
            (None, None) => {}
        }
    }
}

/// One page of directory results plus the unclipped match count.
#[derive(Debug, Clone, Serialize)]
pub struct CompanyPage {
    pub companies: Vec<Company>,
    pub total_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(filter: &CompanyFilter) -> String {
        let mut qb = QueryBuilder::new("SELECT * FROM companies");
        filter.push_predicates(&mut qb);
        qb.into_sql()
    }

    #[test]
    fn test_empty_filter_has_no_where_clause() {
        assert_eq!(rendered(&CompanyFilter::new()), "SELECT * FROM companies");
    }

    #[test]
    fn test_empty_search_is_no_constraint() {
        assert_eq!(
            rendered(&CompanyFilter::new().with_search("")),
            "SELECT * FROM companies"
        );
        assert_eq!(
            rendered(&CompanyFilter::new().with_search("   ")),
            "SELECT * FROM companies"
        );
    }

    #[test]
    fn test_predicates_are_and_combined() {
        let sql = rendered(
            &CompanyFilter::new()
                .with_status(CompanyStatus::Verified)
                .with_level(CmmcLevel::Two)
                .with_state("VA")
                .with_search("cyber"),
        );
        assert!(sql.contains("WHERE status = "));
        assert!(sql.contains(" AND cmmc_level = "));
        assert!(sql.contains(" AND state = "));
        assert!(sql.contains(" AND (name LIKE "));
        assert!(sql.contains(" OR description LIKE "));
    }

    #[test]
    fn test_search_values_are_bound_not_inlined() {
        let sql = rendered(&CompanyFilter::new().with_search("'; DROP TABLE companies; --"));
        assert!(!sql.contains("DROP TABLE"));
    }
}
