//! Core domain types for actionsusage.
//!
//! This crate contains:
//! - Job identifiers and repository slugs
//! - Intervals and regions
//! - The concurrency region engine
//! - Worker-minute accounting
//! - The `ActionsSource` trait implemented by CI providers

pub mod engine;
pub mod error;
pub mod id;
pub mod region;
pub mod repository;
pub mod source;
pub mod usage;

pub use engine::RegionEngine;
pub use error::{Error, Result};
pub use id::JobId;
pub use region::{Interval, Region};
pub use repository::RepoSlug;
pub use usage::UsageAccumulator;
