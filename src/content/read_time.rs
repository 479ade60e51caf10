//! Read-time estimation
//!
//! Word counts are whitespace-delimited, summed across every heading and
//! body fragment of a post, and divided by an assumed reading speed.

use super::ContentBlock;

/// Assumed reading speed in words per minute
pub const WORDS_PER_MINUTE: usize = 200;

/// Count the words in every non-empty heading and body fragment
pub fn word_count(blocks: &[ContentBlock]) -> usize {
    blocks
        .iter()
        .map(|block| {
            let heading_words = block
                .heading
                .as_deref()
                .map(count_words)
                .unwrap_or_default();
            let body_words: usize = block.body.iter().map(|text| count_words(text)).sum();
            heading_words + body_words
        })
        .sum()
}

/// Estimated read time in whole minutes, rounded up
pub fn estimate_read_time(blocks: &[ContentBlock]) -> usize {
    word_count(blocks).div_ceil(WORDS_PER_MINUTE)
}

fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}
