//! URL handling module for Sumi-Mirror
//!
//! This module provides link normalization, root-host confinement and domain
//! extraction. Everything that enters the frontier passes through
//! [`normalize`].

mod domain;
mod normalize;

// Re-export main functions
pub use domain::{extract_domain, RootHost};
pub use normalize::{normalize, parse_root_url, Rejection};
