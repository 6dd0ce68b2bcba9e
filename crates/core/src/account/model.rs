//! Account model definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::patch::Patch;
use crate::Error;

/// Normalized subscription state, a fixed subset of the billing
/// processor's vocabulary. Entitlement checks compare against `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Inactive,
    PastDue,
    Canceled,
}

impl SubscriptionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Inactive => "inactive",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Canceled => "canceled",
        }
    }

    pub fn parse(value: &str) -> Result<Self, Error> {
        match value {
            "active" => Ok(SubscriptionStatus::Active),
            "inactive" => Ok(SubscriptionStatus::Inactive),
            "past_due" => Ok(SubscriptionStatus::PastDue),
            "canceled" => Ok(SubscriptionStatus::Canceled),
            other => Err(Error::Storage(format!(
                "unknown subscription status: {other}"
            ))),
        }
    }
}

/// A registered user of the directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Internal identifier
    pub id: Uuid,

    /// Opaque reference issued by the identity provider.
    /// Unique and immutable after creation.
    pub external_id: String,

    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,

    /// Opaque reference issued by the billing processor
    pub billing_customer_id: Option<String>,

    pub subscription_status: SubscriptionStatus,
    pub subscription_end_date: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Entitlement check used by the registration and directory surfaces.
    pub fn has_active_subscription(&self) -> bool {
        self.subscription_status == SubscriptionStatus::Active
    }
}

/// Fields for account creation (driven by the `user.created` webhook).
#[derive(Debug, Clone, Deserialize)]
pub struct NewAccount {
    pub external_id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Partial account update; the external identity reference is immutable
/// and therefore absent here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountPatch {
    #[serde(default)]
    pub email: Patch<String>,
    #[serde(default)]
    pub first_name: Patch<Option<String>>,
    #[serde(default)]
    pub last_name: Patch<Option<String>>,
    #[serde(default)]
    pub billing_customer_id: Patch<Option<String>>,
    #[serde(default)]
    pub subscription_status: Patch<SubscriptionStatus>,
    #[serde(default)]
    pub subscription_end_date: Patch<Option<DateTime<Utc>>>,
}
