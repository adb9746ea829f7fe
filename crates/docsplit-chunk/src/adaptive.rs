//! Adaptive splitter that picks separators based on content type.

use docsplit_core::{ContentType, Result, SplitConfig, Splitter};

use crate::separators::separators_for;
use crate::RecursiveSplitter;

/// Splitter that swaps in the separator preset for a content type.
///
/// Size, overlap, separator placement and whitespace handling still come
/// from the caller's config.
pub struct AdaptiveSplitter {
    recursive: RecursiveSplitter,
    content_type: ContentType,
}

impl AdaptiveSplitter {
    /// Create an adaptive splitter for a content type.
    pub fn new(content_type: ContentType) -> Self {
        Self {
            recursive: RecursiveSplitter::new(),
            content_type,
        }
    }

    /// Create an adaptive splitter with a custom length function.
    pub fn with_length_function<F>(content_type: ContentType, length_fn: F) -> Self
    where
        F: Fn(&str) -> usize + Send + Sync + 'static,
    {
        Self {
            recursive: RecursiveSplitter::with_length_function(length_fn),
            content_type,
        }
    }

    /// Content type this splitter was built for.
    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    /// The config actually used for `config`.
    pub fn effective_config(&self, config: &SplitConfig) -> SplitConfig {
        SplitConfig {
            separators: separators_for(self.content_type),
            ..config.clone()
        }
    }
}

impl Splitter for AdaptiveSplitter {
    fn split(&self, text: &str, config: &SplitConfig) -> Result<Vec<String>> {
        self.recursive.split(text, &self.effective_config(config))
    }

    fn length(&self, text: &str) -> usize {
        self.recursive.length(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsplit_core::KeepSeparator;

    #[test]
    fn test_markdown_splits_on_headings() {
        let splitter = AdaptiveSplitter::new(ContentType::Markdown);
        let config = SplitConfig::new(40, 0).with_keep_separator(KeepSeparator::Start);

        let text = "# Intro\nShort intro text.\n## Usage\nRun the tool on a file.";
        let chunks = splitter.split(text, &config).unwrap();

        assert_eq!(chunks, vec!["# Intro\nShort intro text.", "## Usage\nRun the tool on a file."]);
    }

    #[test]
    fn test_code_keeps_definitions_together() {
        let splitter = AdaptiveSplitter::new(ContentType::Code);
        let config = SplitConfig::new(40, 0).with_keep_separator(KeepSeparator::Start);

        let code = "use std::io;\nfn main() {\n    run();\n}\nfn run() {\n    work();\n}";
        let chunks = splitter.split(code, &config).unwrap();

        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].contains("fn main()"));
        assert!(chunks[1].starts_with("fn run()"));
    }

    #[test]
    fn test_caller_settings_are_kept() {
        let splitter = AdaptiveSplitter::new(ContentType::Data);
        let config = SplitConfig::new(64, 8).with_strip_whitespace(false);

        assert_eq!(splitter.content_type(), ContentType::Data);
        let effective = splitter.effective_config(&config);
        assert_eq!(effective.max_chunk_size, 64);
        assert_eq!(effective.chunk_overlap, 8);
        assert!(!effective.strip_whitespace);
        assert_eq!(effective.separators, separators_for(ContentType::Data));
    }

    #[test]
    fn test_invalid_size_still_rejected() {
        let splitter = AdaptiveSplitter::new(ContentType::PlainText);
        let err = splitter.split("text", &SplitConfig::new(5, 5)).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_with_length_function() {
        // One unit per word.
        let splitter = AdaptiveSplitter::with_length_function(ContentType::PlainText, |s| {
            s.split_whitespace().count()
        });
        let config = SplitConfig::new(5, 0).with_keep_separator(KeepSeparator::Start);

        let text = "one two three four five six seven eight nine ten";
        let chunks = splitter.split(text, &config).unwrap();

        assert_eq!(chunks, vec!["one two three four five", "six seven eight nine ten"]);
    }
}
