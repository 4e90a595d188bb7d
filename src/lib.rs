//! HTML link extractor: tag/attribute scanning, URI heuristics, and
//! crawl-context outlink discovery for a web-crawler fetch pipeline.
//!
//! The public surface is small and deliberately flat: build a [`Due`]
//! (document-under-extraction) from fetched bytes, configure an
//! [`ExtractorConfig`], and call [`extractor::extract`]. Everything else —
//! the tag scanner, the bucket-classification tag-handler, the charset
//! sniffer, the URI model — is an implementation detail the orchestration
//! module composes on your behalf.

pub mod charset;
pub mod config;
pub mod due;
pub mod error;
pub mod extractor;
pub mod handler;
pub mod heuristics;
pub mod implied;
pub mod replay;
pub mod scan;
pub mod subextract;
pub mod uri;

pub use config::{ExtractorConfig, ExtractorConfigBuilder, ImpliedUriPattern};
pub use due::{DataValue, DiscoveredLink, Due, Hop, NonFatalFailure, NonFatalFailureRecord};
pub use error::ExtractError;
pub use extractor::{extract, extract_with, CancellationFlag, NeverCancel};
pub use replay::ContentSequence;
pub use subextract::{ImpliedUri, RegexSubExtractor, UriSubExtractor};
pub use uri::Uri;
