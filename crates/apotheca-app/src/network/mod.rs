//! Network operations
//!
//! HTTP client shared by the remote backends.

pub mod client;

pub use client::HttpClient;
