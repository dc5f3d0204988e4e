//! Common types and utilities for the ts2py declaration compiler.
//!
//! This crate provides foundational types used across all ts2py crates:
//! - Diagnostics with severities and stable codes
//! - Line/column mapping for byte offsets
//! - Comment ranges and comment-to-Python rendering
//! - Parser and compiler limits

// Diagnostics shared by scanner, parser, lowering and compiler
pub mod diagnostics;
pub use diagnostics::{Diagnostic, Severity, diagnostic_codes};

// Position types for line/column source locations
pub mod position;
pub use position::{LineMap, Position};

// Comment ranges collected as scanner trivia
pub mod comments;
pub use comments::CommentRange;

// Centralized limits and thresholds
pub mod limits;
