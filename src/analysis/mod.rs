//! Per-identifier analysis: extraction from parsed files, normalization of
//! the recorded chains, and per-package insight.

pub mod extraction;
pub mod insight;
pub mod normalization;

pub use extraction::{extract_identifiers, IdentifierExtractor};
pub use insight::{overall, package_key, Insight, InsightAggregator, ALL_PACKAGES};
pub use normalization::{reconstruct_word, DictionaryCoverage, Normalizer, ScoreStrategy};
