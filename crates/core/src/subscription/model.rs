//! Subscription model definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Mirror of the billing processor's subscription object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: Uuid,
    pub account_id: Uuid,

    /// Opaque subscription reference from the billing processor, unique
    pub external_subscription_id: String,
    /// Opaque price/plan reference from the billing processor
    pub external_price_id: String,

    /// Status in the processor's vocabulary, stored verbatim
    pub status: String,

    pub current_period_start: Option<DateTime<Utc>>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub cancel_at_period_end: bool,
    pub canceled_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for the webhook-driven upsert, keyed by the external
/// subscription reference.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionUpsert {
    pub account_id: Uuid,
    pub external_subscription_id: String,
    pub external_price_id: String,
    pub status: String,
    pub current_period_start: Option<DateTime<Utc>>,
    pub current_period_end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cancel_at_period_end: bool,
    pub canceled_at: Option<DateTime<Utc>>,
}
