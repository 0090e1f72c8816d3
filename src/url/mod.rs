//! URL handling module for Patent-Harvester
//!
//! This module provides URL validation and the canonical form used to detect
//! pages that were already visited.

mod normalize;

pub use normalize::{canonical_key, parse_http_url};
