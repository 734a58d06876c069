//! Listing scoring, ranking and tiering.
//!
//! This module normalizes raw listing records, computes composite and
//! archetype scores, ranks the pooled listings across keyword sources,
//! partitions them into A/B/C tiers and buckets them by age.

pub mod age;
pub mod analyzer;
pub mod normalize;
pub mod rank;
pub mod score;
pub mod summary;
pub mod tier;
pub mod types;
pub mod utility;
