//! pagecheck - social page metadata checker.
//!
//! Collects public page metadata (name, followers, category, last post,
//! contact and social links) from a list of page URLs, classifies how
//! recently each page posted, and writes a report.

pub mod analysis;
pub mod config;
pub mod input;
pub mod models;
pub mod report;
pub mod scrapers;
pub mod services;
