//! Error types for the extractor.
//!
//! Mirrors the closed error-kind list the core is allowed to produce. Most of
//! these never escape `extract()` as an `Err` — they're recorded on the DUE
//! (see [`crate::due::NonFatalFailure`]) instead. `ExtractError` exists for
//! the handful of call sites that build configuration or drive the CLI,
//! where a real `Result` is the right shape.

use thiserror::Error;

/// Errors surfaced by configuration construction, the CLI, and the few
/// extractor internals that genuinely need `Result` rather than a recorded
/// non-fatal failure.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("malformed URI: {0}")]
    BadUri(String),

    #[error("read error on content replay: {0}")]
    ReadError(String),

    #[error("charset decode error: {0}")]
    DecodeError(String),

    #[error("extraction aborted by meta robots nofollow")]
    MetaRobotsNoFollowAbort,

    #[error("unknown charset: {0}")]
    UnknownCharset(String),

    #[error("attribute value exceeded cap and was truncated: {0} bytes")]
    OversizeValue(usize),

    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] fancy_regex::Error),

    #[error("invalid regex: {0}")]
    InvalidRegex(#[from] regex::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
