// src/lib.rs

//! jobwatch library
//!
//! Fetches a job-listings page, extracts structured records from its
//! tabular markup, filters them by qualification category and recency,
//! and pushes alerts for records not yet announced.

pub mod error;
pub mod models;
pub mod notify;
pub mod pipeline;
pub mod utils;
