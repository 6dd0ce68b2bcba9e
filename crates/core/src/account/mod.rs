//! Accounts keyed by an external identity reference
//!
//! Created, updated and deleted by the identity-provider webhook
//! collaborator; subscription fields are projected in by the billing
//! webhook collaborator.

mod model;
mod store;

pub use model::{Account, AccountPatch, NewAccount, SubscriptionStatus};
pub use store::AccountStore;
