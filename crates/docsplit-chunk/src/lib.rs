//! docsplit-chunk - Recursive separator-hierarchy text splitting
//!
//! This crate splits documents into bounded-size, overlapping chunks for
//! embedding, preferring natural boundaries: paragraphs over lines over
//! sentences over words over single characters.
//!
//! # Splitters
//!
//! - [`RecursiveSplitter`]: Splits on the configured separators in priority
//!   order, recursing into pieces that are still too long.
//!
//! - [`AdaptiveSplitter`]: Same algorithm with a separator preset chosen by
//!   content type.
//!
//! # Example
//!
//! ```rust
//! use docsplit_chunk::SplitConfig;
//!
//! let config = SplitConfig::new(10, 0).with_separators([". ", " ", ""]);
//! let chunks = docsplit_chunk::split("Hello world. This is a test.", &config).unwrap();
//! assert_eq!(chunks, vec!["Hello", "world", "This is a", "test."]);
//! ```

mod adaptive;
mod recursive;
mod separators;

pub use adaptive::AdaptiveSplitter;
pub use recursive::RecursiveSplitter;
pub use separators::{separators_for, CODE_SEPARATORS, DATA_SEPARATORS, MARKDOWN_SEPARATORS};

// Re-export types for convenience
pub use docsplit_core::{ContentType, KeepSeparator, Result, SplitConfig, Splitter};

/// Split text with a character-counting [`RecursiveSplitter`].
pub fn split(text: &str, config: &SplitConfig) -> Result<Vec<String>> {
    RecursiveSplitter::new().split(text, config)
}
