//! NAICS code model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One entry of the NAICS taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct NaicsCode {
    /// Short numeric code, e.g. `541512`
    pub code: String,
    /// Human-readable title
    pub title: String,
}
