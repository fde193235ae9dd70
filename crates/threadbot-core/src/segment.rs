//! Reply segmentation for platforms with a message size limit.
//!
//! Uses the `text-splitter` crate, which prefers paragraph breaks, then line
//! breaks, then sentences and words, and only falls back to character
//! boundaries for a single oversized unit. Grapheme clusters are never
//! split. Trimming is off so the segments concatenate back to the input.

use text_splitter::{ChunkConfig, TextSplitter};

use threadbot_types::platform::Segment;

pub struct ResponseSegmenter {
    max_chars: usize,
    splitter: TextSplitter<text_splitter::Characters>,
}

impl ResponseSegmenter {
    /// Segments will hold at most `max_chars` characters (at least 1).
    pub fn new(max_chars: usize) -> Self {
        let max_chars = max_chars.max(1);
        Self {
            max_chars,
            splitter: TextSplitter::new(ChunkConfig::new(max_chars).with_trim(false)),
        }
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Split `text` into 1-indexed segments, lazily.
    ///
    /// Text that already fits (including empty text) yields exactly one
    /// segment equal to it.
    pub fn split<'a>(&'a self, text: &'a str) -> impl Iterator<Item = Segment> + 'a {
        let whole = (text.chars().count() <= self.max_chars).then_some(text);
        let chunks = whole
            .is_none()
            .then(|| self.splitter.chunks(text))
            .into_iter()
            .flatten();

        whole
            .into_iter()
            .chain(chunks)
            .enumerate()
            .map(|(i, chunk)| Segment {
                index: i + 1,
                text: chunk.to_string(),
            })
    }
}
