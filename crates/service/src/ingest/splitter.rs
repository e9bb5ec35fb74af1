//! Character-budgeted chunking on top of `text-splitter`.
//!
//! Text is cut at the coarsest semantic boundary that fits (paragraphs, then
//! lines, sentences, words and finally graphemes). Neighbouring chunks share up
//! to `chunk_overlap` characters.

use std::fmt;
use std::sync::Arc;

use docqa_core::{Chunk, Page};
use text_splitter::{Characters, ChunkConfig};

use super::IngestError;

#[derive(Clone)]
pub struct TextSplitter {
    inner: Arc<text_splitter::TextSplitter<Characters>>,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl fmt::Debug for TextSplitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextSplitter")
            .field("chunk_size", &self.chunk_size)
            .field("chunk_overlap", &self.chunk_overlap)
            .finish()
    }
}

impl TextSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, IngestError> {
        let invalid = || IngestError::InvalidSplitter { chunk_size, chunk_overlap };
        if chunk_size == 0 {
            return Err(invalid());
        }
        let config =
            ChunkConfig::new(chunk_size).with_overlap(chunk_overlap).map_err(|_| invalid())?;
        Ok(Self {
            inner: Arc::new(text_splitter::TextSplitter::new(config)),
            chunk_size,
            chunk_overlap,
        })
    }

    /// Splits every page separately; chunks never span pages.
    pub fn split_pages(&self, pages: &[Page], source: &str) -> Vec<Chunk> {
        pages
            .iter()
            .flat_map(|page| {
                self.split_text(&page.text).into_iter().map(move |text| Chunk {
                    text,
                    page: Some(page.number),
                    source: source.to_owned(),
                })
            })
            .collect()
    }

    /// Splits `text` into trimmed, non-empty chunks.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.inner
            .chunks(text)
            .map(str::trim)
            .filter(|chunk| !chunk.is_empty())
            .map(str::to_owned)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_overlap_not_smaller_than_size() {
        assert!(TextSplitter::new(100, 100).is_err());
        assert!(TextSplitter::new(0, 0).is_err());
        assert!(TextSplitter::new(100, 99).is_ok());
    }

    #[test]
    fn short_text_is_one_chunk() {
        let splitter = TextSplitter::new(1000, 150).unwrap();
        assert_eq!(splitter.split_text("  A short page.  "), ["A short page."]);
    }

    #[test]
    fn words_are_kept_whole_and_all_covered() {
        let splitter = TextSplitter::new(5, 2).unwrap();
        let chunks = splitter.split_text("a b c d e f g h i j");
        assert!(chunks.len() >= 3);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 5, "{chunk:?}");
        }
        for word in ["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"] {
            assert!(chunks.iter().any(|c| c.split(' ').any(|w| w == word)), "{word} missing");
        }
    }

    #[test]
    fn overlap_repeats_text_between_neighbours() {
        let text = (1..=20).map(|i| format!("w{i:02}")).collect::<Vec<_>>().join(" ");
        let without = TextSplitter::new(20, 0).unwrap().split_text(&text);
        let with = TextSplitter::new(20, 10).unwrap().split_text(&text);
        assert!(with.len() > without.len(), "{without:?} vs {with:?}");
    }

    #[test]
    fn chunks_never_exceed_size() {
        let splitter = TextSplitter::new(40, 10).unwrap();
        let text = "First paragraph talks about rivers and lakes.\n\nSecond paragraph is \
                    about mountains, valleys and the weather up high.\nA new line here.\n\n\
                    Averyveryveryverylongwordthatcannotbesplitonwhitespaceatallreally";
        let chunks = splitter.split_text(text);
        assert!(chunks.len() > 3);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 40, "{chunk:?}");
            assert!(!chunk.trim().is_empty());
        }
    }

    #[test]
    fn multibyte_text_is_split_on_char_boundaries() {
        let splitter = TextSplitter::new(4, 1).unwrap();
        let chunks = splitter.split_text("ééééééééé");
        assert!(chunks.len() >= 3);
        assert!(chunks.iter().all(|c| c.chars().count() <= 4));
    }

    #[test]
    fn whitespace_only_pages_produce_nothing() {
        let splitter = TextSplitter::new(100, 10).unwrap();
        let pages = vec![
            Page { number: 1, text: "   \n\n  ".to_owned() },
            Page { number: 2, text: "Content on page two.".to_owned() },
        ];
        let chunks = splitter.split_pages(&pages, "doc.pdf");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].page, Some(2));
        assert_eq!(chunks[0].source, "doc.pdf");
    }
}
