//! Core library for the CMMC company directory
//!
//! This crate contains the core business logic, including:
//! - Account management (driven by identity/billing webhooks)
//! - Company listings with filtered search and ownership-scoped updates
//! - NAICS industry-code reference data and company associations
//! - Subscription records mirrored from the billing processor

pub mod account;
pub mod company;
pub mod db;
pub mod error;
pub mod naics;
pub mod patch;
pub mod subscription;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
