//! Apotheca App Services
//!
//! Remote table access, query caching, notifications and the per-entity
//! services (prescriptions, CMS pages, blog posts).
//! Depends on the `apotheca` core crate.

pub mod cache;
pub mod config;
pub mod error;
pub mod network;
pub mod notify;
pub mod records;
pub mod remote;
pub mod services;

pub use error::{AppError, Result};
