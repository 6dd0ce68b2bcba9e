//! Company model definitions

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::patch::Patch;
use crate::Error;

/// CMMC certification level.
///
/// A closed enum rather than a bare integer so an out-of-range level can
/// never reach the persistence layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum CmmcLevel {
    One,
    Two,
    Three,
}

impl CmmcLevel {
    pub fn as_i64(self) -> i64 {
        match self {
            CmmcLevel::One => 1,
            CmmcLevel::Two => 2,
            CmmcLevel::Three => 3,
        }
    }
}

impl TryFrom<i64> for CmmcLevel {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self, Error> {
        match value {
            1 => Ok(CmmcLevel::One),
            2 => Ok(CmmcLevel::Two),
            3 => Ok(CmmcLevel::Three),
            other => Err(Error::InvalidInput(format!(
                "CMMC level must be 1, 2 or 3, got {other}"
            ))),
        }
    }
}

impl From<CmmcLevel> for i64 {
    fn from(level: CmmcLevel) -> Self {
        level.as_i64()
    }
}

impl Default for CmmcLevel {
    fn default() -> Self {
        CmmcLevel::One
    }
}

/// Listing lifecycle status.
///
/// Transitions away from `Pending` belong to the verification workflow; the
/// mutation layer only ever writes `Pending` at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompanyStatus {
    Pending,
    Verified,
    Rejected,
    Expired,
}

impl CompanyStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CompanyStatus::Pending => "pending",
            CompanyStatus::Verified => "verified",
            CompanyStatus::Rejected => "rejected",
            CompanyStatus::Expired => "expired",
        }
    }

    pub fn parse(value: &str) -> Result<Self, Error> {
        match value {
            "pending" => Ok(CompanyStatus::Pending),
            "verified" => Ok(CompanyStatus::Verified),
            "rejected" => Ok(CompanyStatus::Rejected),
            "expired" => Ok(CompanyStatus::Expired),
            other => Err(Error::Storage(format!("unknown company status: {other}"))),
        }
    }
}

/// How the CMMC assessment was performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssessmentType {
    /// Self-assessment (level 1 and some level 2).
    #[serde(rename = "self")]
    SelfAssessment,
    /// Certified third-party assessor organization.
    #[serde(rename = "c3pao")]
    C3pao,
    /// Government-led assessment (DIBCAC).
    #[serde(rename = "dibcac")]
    Dibcac,
}

impl AssessmentType {
    pub fn as_str(self) -> &'static str {
        match self {
            AssessmentType::SelfAssessment => "self",
            AssessmentType::C3pao => "c3pao",
            AssessmentType::Dibcac => "dibcac",
        }
    }

    pub fn parse(value: &str) -> Result<Self, Error> {
        match value {
            "self" => Ok(AssessmentType::SelfAssessment),
            "c3pao" => Ok(AssessmentType::C3pao),
            "dibcac" => Ok(AssessmentType::Dibcac),
            other => Err(Error::Storage(format!("unknown assessment type: {other}"))),
        }
    }
}

/// A company listing in the directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    /// Unique listing identifier
    pub id: Uuid,

    /// Owning account. Set at creation; nullable only at the schema level.
    pub account_id: Option<Uuid>,

    /// Company name
    pub name: String,

    /// Free-text description
    pub description: Option<String>,

    /// Contact fields, each independently optional
    pub website: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,

    /// Postal address
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    /// 2-letter state/region code
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: String,

    /// Certification details
    pub cmmc_level: CmmcLevel,
    pub certification_date: Option<NaiveDate>,
    pub certification_expiry: Option<NaiveDate>,
    pub assessment_type: Option<AssessmentType>,
    pub c3pao_name: Option<String>,

    /// Lifecycle status, `pending` at creation
    pub status: CompanyStatus,

    /// Featured listings sort first in directory results
    pub is_featured: bool,

    pub logo_url: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Business fields for a new listing.
///
/// Status, featured flag, and timestamps are assigned by the store.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewCompany {
    pub name: String,
    pub description: Option<String>,
    pub website: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub cmmc_level: CmmcLevel,
    pub certification_date: Option<NaiveDate>,
    pub certification_expiry: Option<NaiveDate>,
    pub assessment_type: Option<AssessmentType>,
    pub c3pao_name: Option<String>,
    pub logo_url: Option<String>,
}

/// Partial update of a listing's business fields.
///
/// There is deliberately no `status` or `is_featured` here: owners cannot
/// touch either through the update path.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompanyPatch {
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default)]
    pub description: Patch<Option<String>>,
    #[serde(default)]
    pub website: Patch<Option<String>>,
    #[serde(default)]
    pub email: Patch<Option<String>>,
    #[serde(default)]
    pub phone: Patch<Option<String>>,
    #[serde(default)]
    pub address_line1: Patch<Option<String>>,
    #[serde(default)]
    pub address_line2: Patch<Option<String>>,
    #[serde(default)]
    pub city: Patch<Option<String>>,
    #[serde(default)]
    pub state: Patch<Option<String>>,
    #[serde(default)]
    pub zip_code: Patch<Option<String>>,
    #[serde(default)]
    pub cmmc_level: Patch<CmmcLevel>,
    #[serde(default)]
    pub certification_date: Patch<Option<NaiveDate>>,
    #[serde(default)]
    pub certification_expiry: Patch<Option<NaiveDate>>,
    #[serde(default)]
    pub assessment_type: Patch<Option<AssessmentType>>,
    #[serde(default)]
    pub c3pao_name: Patch<Option<String>>,
    #[serde(default)]
    pub logo_url: Patch<Option<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmmc_level_round_trip() {
        assert_eq!(CmmcLevel::try_from(2).unwrap(), CmmcLevel::Two);
        assert_eq!(CmmcLevel::Two.as_i64(), 2);
        assert!(CmmcLevel::try_from(0).is_err());
        assert!(CmmcLevel::try_from(4).is_err());
    }

    #[test]
    fn test_status_strings() {
        for status in [
            CompanyStatus::Pending,
            CompanyStatus::Verified,
            CompanyStatus::Rejected,
            CompanyStatus::Expired,
        ] {
            assert_eq!(CompanyStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(CompanyStatus::parse("active").is_err());
    }

    #[test]
    fn test_assessment_type_wire_names() {
        let parsed: AssessmentType = serde_json::from_str("\"c3pao\"").unwrap();
        assert_eq!(parsed, AssessmentType::C3pao);
        assert_eq!(
            serde_json::to_string(&AssessmentType::SelfAssessment).unwrap(),
            "\"self\""
        );
    }

    #[test]
    fn test_patch_ignores_status_field() {
        // A caller attempting to smuggle a status change through the patch
        // body has the field silently dropped by the patch shape itself.
        let patch: CompanyPatch =
            serde_json::from_str(r#"{"name": "Acme", "status": "verified"}"#).unwrap();
        assert_eq!(patch.name, Patch::Set("Acme".to_string()));
    }
}
