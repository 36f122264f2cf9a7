//! Crawl target state definitions
//!
//! This module defines the lifecycle of a single crawl target and the reasons
//! a target can end up skipped or failed.

use std::fmt;

/// What a crawl target is fetched for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    /// A navigable page; HTML pages are parsed for further links
    Page,
    /// An embedded resource (image, script, stylesheet, icon, ...)
    Asset,
}

impl TargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Asset => "asset",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a target was not fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// The link resolved to another host
    CrossDomain,
    /// The link could not be turned into a fetchable HTTP(S) URL
    Unfetchable,
    /// The URL was already fetched or enqueued in this run
    AlreadyVisited,
    /// The target is deeper than the configured maximum depth
    DepthExceeded,
    /// The page budget was exhausted
    BudgetExceeded,
    /// Fetched, but another URL already saved to the same local path
    PathCollision,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CrossDomain => "cross_domain",
            Self::Unfetchable => "unfetchable",
            Self::AlreadyVisited => "already_visited",
            Self::DepthExceeded => "depth_exceeded",
            Self::BudgetExceeded => "budget_exceeded",
            Self::PathCollision => "path_collision",
        }
    }

    /// Returns all skip reasons in reporting order
    pub fn all() -> [Self; 6] {
        [
            Self::CrossDomain,
            Self::Unfetchable,
            Self::AlreadyVisited,
            Self::DepthExceeded,
            Self::BudgetExceeded,
            Self::PathCollision,
        ]
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classified failure of a single target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Timeout, connection reset, HTTP 403/429/5xx (only seen per attempt)
    NetworkTransient,
    /// HTTP 4xx other than 403/429; never retried
    NetworkTerminal,
    /// Transient failures persisted through every attempt
    FetchFailed,
    /// Fetched HTML could not be parsed for links
    ParseFailure,
    /// The fetched bytes could not be written to disk
    IoFailure,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NetworkTransient => "network_transient",
            Self::NetworkTerminal => "network_terminal",
            Self::FetchFailed => "fetch_failed",
            Self::ParseFailure => "parse_failure",
            Self::IoFailure => "io_failure",
        }
    }

    /// Returns true if another attempt may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NetworkTransient)
    }

    /// Returns all failure kinds in reporting order
    pub fn all() -> [Self; 5] {
        [
            Self::NetworkTransient,
            Self::NetworkTerminal,
            Self::FetchFailed,
            Self::ParseFailure,
            Self::IoFailure,
        ]
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents the current state of a crawl target
///
/// ```text
/// Discovered -> Accepted -> Fetching -> Saved
///      |            |           +----> FailedTerminal
///      \------------+-----------+----> Skipped
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetState {
    // ===== Active States =====
    /// Raw link emitted by the extractor, not yet normalized
    Discovered,

    /// Passed normalization and budget checks; in the visited set and frontier
    Accepted,

    /// Handed to the fetcher
    Fetching,

    // ===== Terminal States =====
    /// Fetched and written to the mirror
    Saved,

    /// Never fetched
    Skipped(SkipReason),

    /// Fetched unsuccessfully or could not be stored
    FailedTerminal(FailureKind),
}

impl TargetState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }

    /// Returns true if this is an active state (target may still be processed)
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Discovered | Self::Accepted | Self::Fetching)
    }

    /// Returns true if this represents a successful completion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Saved)
    }

    /// Returns true if this represents an error state
    pub fn is_error(&self) -> bool {
        matches!(self, Self::FailedTerminal(_))
    }

    /// Returns true if moving from `self` to `next` follows the lifecycle
    pub fn can_transition_to(&self, next: TargetState) -> bool {
        match (self, next) {
            (Self::Discovered, Self::Accepted) | (Self::Discovered, Self::Skipped(_)) => true,
            (Self::Accepted, Self::Fetching) | (Self::Accepted, Self::Skipped(_)) => true,
            (Self::Fetching, Self::Saved) | (Self::Fetching, Self::FailedTerminal(_)) => true,
            (Self::Fetching, Self::Skipped(SkipReason::PathCollision)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for TargetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discovered => f.write_str("discovered"),
            Self::Accepted => f.write_str("accepted"),
            Self::Fetching => f.write_str("fetching"),
            Self::Saved => f.write_str("saved"),
            Self::Skipped(reason) => write!(f, "skipped({})", reason),
            Self::FailedTerminal(kind) => write!(f, "failed({})", kind),
        }
    }
}
