//! Company directory listings
//!
//! Models, filtered search, and the ownership-scoped mutation layer.

mod filter;
mod model;
mod store;

pub use filter::{CompanyFilter, CompanyPage};
pub use model::{
    AssessmentType, CmmcLevel, Company, CompanyPatch, CompanyStatus, NewCompany,
};
pub use store::CompanyStore;
