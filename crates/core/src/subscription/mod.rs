//! Billing-subscription mirror records
//!
//! Written only by the billing-webhook collaborator; the status string
//! here carries the processor's own vocabulary, unlike the normalized
//! [`SubscriptionStatus`](crate::account::SubscriptionStatus) on accounts.

mod model;
mod store;

pub use model::{Subscription, SubscriptionUpsert};
pub use store::SubscriptionStore;
