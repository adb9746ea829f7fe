//! Recursive separator-hierarchy splitter.
//!
//! Splits text on the highest-priority separator present, greedily packs the
//! pieces into chunks no longer than the configured maximum, and recurses
//! into any single piece that is still too long with the remaining
//! separators.

use std::collections::VecDeque;

use docsplit_core::{KeepSeparator, Result, SplitConfig, Splitter};

use crate::separators::split_on_separator;

type LengthFn = Box<dyn Fn(&str) -> usize + Send + Sync>;

/// Recursive splitter over an ordered separator list.
///
/// With the default configuration it tries, in order:
/// 1. Double newline (paragraph breaks)
/// 2. Single newline
/// 3. Sentence punctuation
/// 4. Word boundaries (space)
/// 5. Any character (last resort)
pub struct RecursiveSplitter {
    /// Measures text length. Counts characters if None.
    length_fn: Option<LengthFn>,
}

impl RecursiveSplitter {
    /// Create a splitter that measures length in characters.
    pub fn new() -> Self {
        Self { length_fn: None }
    }

    /// Create a splitter with a custom length function (bytes, tokens, ...).
    pub fn with_length_function<F>(length_fn: F) -> Self
    where
        F: Fn(&str) -> usize + Send + Sync + 'static,
    {
        Self {
            length_fn: Some(Box::new(length_fn)),
        }
    }

    /// Split one tier and recurse into oversized pieces.
    ///
    /// `separators` always ends with `""`, so the loop below always picks one.
    fn split_recursive(
        &self,
        text: &str,
        separators: &[String],
        config: &SplitConfig,
    ) -> Vec<String> {
        let mut separator: &str = "";
        let mut remaining: &[String] = &[];
        for (idx, candidate) in separators.iter().enumerate() {
            if candidate.is_empty() {
                break;
            }
            if text.contains(candidate.as_str()) {
                separator = candidate.as_str();
                remaining = &separators[idx + 1..];
                break;
            }
        }

        let pieces = split_on_separator(text, separator, config.keep_separator);
        let join_separator = match config.keep_separator {
            KeepSeparator::Discard => separator,
            KeepSeparator::Start | KeepSeparator::End => "",
        };

        let mut chunks = Vec::new();
        let mut fitting: Vec<&str> = Vec::new();

        for piece in pieces {
            if self.length(piece) <= config.max_chunk_size {
                fitting.push(piece);
                continue;
            }

            if !fitting.is_empty() {
                chunks.extend(self.merge_pieces(&fitting, join_separator, config));
                fitting.clear();
            }

            if remaining.is_empty() {
                // Indivisible unit: emitted whole, never truncated.
                chunks.extend(finish(piece, config.strip_whitespace));
            } else {
                chunks.extend(self.split_recursive(piece, remaining, config));
            }
        }

        if !fitting.is_empty() {
            chunks.extend(self.merge_pieces(&fitting, join_separator, config));
        }

        chunks
    }

    /// Greedily pack pieces into chunks, carrying a tail of whole pieces no
    /// longer than `chunk_overlap` into the next chunk.
    fn merge_pieces(&self, pieces: &[&str], separator: &str, config: &SplitConfig) -> Vec<String> {
        let separator_len = self.length(separator);
        let mut chunks = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        // Length of `current` joined with `separator`.
        let mut total = 0usize;

        for &piece in pieces {
            let piece_len = self.length(piece);
            let joint = if current.is_empty() { 0 } else { separator_len };

            if total + joint + piece_len > config.max_chunk_size && !current.is_empty() {
                chunks.extend(join(&current, separator, config.strip_whitespace));

                while let Some(&front) = current.front() {
                    let over_overlap = total > config.chunk_overlap;
                    let no_room = total + separator_len + piece_len > config.max_chunk_size;
                    if !over_overlap && !no_room {
                        break;
                    }

                    current.pop_front();
                    let front_joint = if current.is_empty() { 0 } else { separator_len };
                    total -= self.length(front) + front_joint;
                }
            }

            let joint = if current.is_empty() { 0 } else { separator_len };
            current.push_back(piece);
            total += piece_len + joint;
        }

        chunks.extend(join(&current, separator, config.strip_whitespace));
        chunks
    }
}

impl Default for RecursiveSplitter {
    fn default() -> Self {
        Self::new()
    }
}

impl Splitter for RecursiveSplitter {
    fn split(&self, text: &str, config: &SplitConfig) -> Result<Vec<String>> {
        config.validate()?;

        if text.is_empty() {
            return Ok(Vec::new());
        }

        Ok(self.split_recursive(text, &config.separators, config))
    }

    fn length(&self, text: &str) -> usize {
        match &self.length_fn {
            Some(length_fn) => length_fn(text),
            None => text.chars().count(),
        }
    }
}

/// Join pieces into a chunk, or None if nothing but whitespace is left.
fn join(pieces: &VecDeque<&str>, separator: &str, strip: bool) -> Option<String> {
    if pieces.is_empty() {
        return None;
    }

    let mut chunk = String::new();
    for (idx, piece) in pieces.iter().enumerate() {
        if idx > 0 {
            chunk.push_str(separator);
        }
        chunk.push_str(piece);
    }

    finish(&chunk, strip)
}

fn finish(chunk: &str, strip: bool) -> Option<String> {
    let chunk = if strip { chunk.trim() } else { chunk };
    if chunk.is_empty() {
        None
    } else {
        Some(chunk.to_string())
    }
}
