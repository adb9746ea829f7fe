//! Separator presets and single-tier splitting.

use docsplit_core::{ContentType, KeepSeparator, INGEST_SEPARATORS};

/// Headings, paragraphs, lines, sentences, words, characters.
pub const MARKDOWN_SEPARATORS: &[&str] = &["\n# ", "\n## ", "\n### ", "\n\n", "\n", ". ", " ", ""];

/// Top-level definitions first, then blank lines, lines, tokens.
pub const CODE_SEPARATORS: &[&str] = &[
    "\nfn ", "\npub fn ", "\ndef ", "\nfunc ", "\nclass ", "\nimpl ", "\n\n", "\n", " ", "",
];

/// Records, lines, fields.
pub const DATA_SEPARATORS: &[&str] = &["\n\n", "\n", ", ", " ", ""];

/// Get the separator preset for a content type.
pub fn separators_for(content_type: ContentType) -> Vec<String> {
    let preset = match content_type {
        ContentType::Markdown => MARKDOWN_SEPARATORS,
        ContentType::Code => CODE_SEPARATORS,
        ContentType::Data => DATA_SEPARATORS,
        ContentType::PlainText | ContentType::Unknown => INGEST_SEPARATORS,
    };
    preset.iter().map(|s| s.to_string()).collect()
}

/// Split text at every occurrence of `separator`, dropping empty pieces.
///
/// The empty separator splits between every character. When the separator is
/// kept at the start, a cut is made wherever it begins, so overlapping runs
/// such as `"\n\n\n"` against `"\n\n"` cut twice.
pub(crate) fn split_on_separator<'a>(
    text: &'a str,
    separator: &str,
    keep: KeepSeparator,
) -> Vec<&'a str> {
    let pieces: Vec<&'a str> = if separator.is_empty() {
        text.char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect()
    } else {
        match keep {
            KeepSeparator::Discard => text.split(separator).collect(),
            KeepSeparator::End => text.split_inclusive(separator).collect(),
            KeepSeparator::Start => {
                let mut pieces = Vec::new();
                let mut start = 0;
                for (idx, _) in text.char_indices() {
                    if text[idx..].starts_with(separator) {
                        pieces.push(&text[start..idx]);
                        start = idx;
                    }
                }
                pieces.push(&text[start..]);
                pieces
            }
        }
    };

    pieces.into_iter().filter(|p| !p.is_empty()).collect()
}
