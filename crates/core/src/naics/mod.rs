//! NAICS industry-code reference data
//!
//! Read-only from the application's perspective; the taxonomy is seeded
//! out of band. Association writes live with the company store so they
//! share the ownership-scoped transaction.

mod model;
mod store;

pub use model::NaicsCode;
pub use store::NaicsStore;
