//! Text normalization for extracted page content
//!
//! Every string that reaches the search index passes through one of these
//! functions, which guarantees that stored values are 7-bit clean, free of
//! whitespace runs and never empty (absent values become `None`).
//!
//! The ASCII fold is lossy: characters outside 7-bit ASCII are dropped rather
//! than transliterated, so `café` is stored as `caf`.

mod text;

pub use text::{normalize_fragment_list, normalize_line, strip_label_punctuation};
