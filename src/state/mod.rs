//! State module for tracking crawl progress
//!
//! This module defines the lifecycle of crawl targets.
//!
//! # Components
//!
//! - `TargetState`: Tracks where a target is (discovered, accepted, fetching, saved, ...)
//! - `TargetKind`: Whether a target is a navigable page or an embedded asset
//! - `SkipReason` / `FailureKind`: Why a target was skipped or failed

mod target_state;

// Re-export main types
pub use target_state::{FailureKind, SkipReason, TargetKind, TargetState};
