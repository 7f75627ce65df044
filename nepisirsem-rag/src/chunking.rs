//! Document chunking strategies.
//!
//! Both strategies measure length in characters (Unicode scalar values), so
//! multi-byte Turkish letters are never cut in half, and both honour the same
//! contract: every chunk holds at most `chunk_size` characters, consecutive
//! chunks share exactly `chunk_overlap` characters, and dropping that shared
//! prefix from every chunk but the first reassembles the original text.
//!
//! - [`FixedSizeChunker`]: plain windows with stride `chunk_size - chunk_overlap`
//! - [`RecursiveChunker`]: pulls each window end back to a paragraph, line,
//!   sentence or word boundary when one is close enough

use crate::document::{Chunk, Document};

/// A chunk boundary expressed in character offsets into the split text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSpan {
    /// Offset of the first character.
    pub start: usize,
    /// Offset one past the last character.
    pub end: usize,
    pub text: String,
}

/// A strategy for splitting documents into chunks.
pub trait Chunker: Send + Sync {
    /// Split one text into ordered, overlapping spans.
    ///
    /// Returns an empty `Vec` for empty text.
    fn split(&self, text: &str) -> Vec<TextSpan>;

    /// Split every page of a document. Chunks never cross page boundaries.
    ///
    /// Chunk IDs are `{document_id}_{chunk_index}` with the index running
    /// across the whole document. Each chunk inherits the document metadata
    /// plus `source`, `page`, `chunk_index` and `start_char`.
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        for page in &document.pages {
            for span in self.split(&page.text) {
                let chunk_index = chunks.len();
                let mut metadata = document.metadata.clone();
                metadata.insert("source".to_string(), document.source.clone());
                metadata.insert("page".to_string(), page.number.to_string());
                metadata.insert("chunk_index".to_string(), chunk_index.to_string());
                metadata.insert("start_char".to_string(), span.start.to_string());

                chunks.push(Chunk {
                    id: format!("{}_{chunk_index}", document.id),
                    text: span.text,
                    document_id: document.id.clone(),
                    metadata,
                });
            }
        }
        chunks
    }
}

/// Walk `chars` in windows of at most `chunk_size` characters. `choose_end`
/// picks the end of a window that does not reach the end of the text; it
/// receives the window start, the smallest end that still makes progress,
/// and the hard end, and must return a value in `(min_end, hard_end]`.
fn split_windows<F>(
    chars: &[char],
    chunk_size: usize,
    chunk_overlap: usize,
    choose_end: F,
) -> Vec<TextSpan>
where
    F: Fn(&[char], usize, usize, usize) -> usize,
{
    if chars.is_empty() || chunk_size == 0 {
        return Vec::new();
    }
    let overlap = chunk_overlap.min(chunk_size - 1);

    let mut spans = Vec::new();
    let mut start = 0;
    loop {
        let hard_end = (start + chunk_size).min(chars.len());
        let end = if hard_end == chars.len() {
            hard_end
        } else {
            let min_end = start + overlap;
            choose_end(chars, start, min_end, hard_end).clamp(min_end + 1, hard_end)
        };

        spans.push(TextSpan { start, end, text: chars[start..end].iter().collect() });

        if end == chars.len() {
            break;
        }
        start = end - overlap;
    }
    spans
}

/// Splits text into fixed-size character windows with configurable overlap.
///
/// ```rust
/// use nepisirsem_rag::{Chunker, FixedSizeChunker};
///
/// let spans = FixedSizeChunker::new(4, 1).split("abcdefg");
/// let texts: Vec<_> = spans.iter().map(|s| s.text.as_str()).collect();
/// assert_eq!(texts, ["abcd", "defg"]);
/// ```
#[derive(Debug, Clone)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl FixedSizeChunker {
    /// Create a new `FixedSizeChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size`: maximum number of characters per chunk
    /// * `chunk_overlap`: number of overlapping characters between consecutive chunks
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }
}

impl Chunker for FixedSizeChunker {
    fn split(&self, text: &str) -> Vec<TextSpan> {
        let chars: Vec<char> = text.chars().collect();
        split_windows(&chars, self.chunk_size, self.chunk_overlap, |_, _, _, hard_end| hard_end)
    }
}

/// Separators tried in order when looking for a natural chunk boundary.
const SEPARATORS: [&str; 4] = ["\n\n", "\n", ". ", " "];

/// Splits text at the most natural boundary available: paragraph breaks
/// first, then line breaks, sentence ends and finally spaces.
///
/// A boundary is only used when it keeps the chunk at least half of
/// `chunk_size` long; otherwise the window is cut hard at `chunk_size`.
/// The overlap contract is the same as [`FixedSizeChunker`]'s, so a recipe's
/// ingredient list and its steps stay together whenever they fit.
#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl RecursiveChunker {
    /// Create a new `RecursiveChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size`: maximum number of characters per chunk
    /// * `chunk_overlap`: number of overlapping characters between consecutive chunks
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }
}

/// Latest offset in `(lower, hard_end]` that directly follows `separator`.
fn boundary_after(
    chars: &[char],
    separator: &[char],
    lower: usize,
    hard_end: usize,
) -> Option<usize> {
    (lower + 1..=hard_end)
        .rev()
        .find(|&b| b >= separator.len() && chars[b - separator.len()..b] == *separator)
}

impl Chunker for RecursiveChunker {
    fn split(&self, text: &str) -> Vec<TextSpan> {
        let chars: Vec<char> = text.chars().collect();
        let separators: Vec<Vec<char>> = SEPARATORS.iter().map(|s| s.chars().collect()).collect();
        let half = self.chunk_size / 2;

        let choose_end = |chars: &[char], start: usize, min_end: usize, hard_end: usize| {
            let lower = min_end.max(start + half);
            separators
                .iter()
                .find_map(|sep| boundary_after(chars, sep, lower, hard_end))
                .unwrap_or(hard_end)
        };
        split_windows(&chars, self.chunk_size, self.chunk_overlap, choose_end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Page;

    fn texts(spans: &[TextSpan]) -> Vec<&str> {
        spans.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn fixed_size_windows_overlap_exactly() {
        let spans = FixedSizeChunker::new(5, 2).split("abcdefghij");
        assert_eq!(texts(&spans), ["abcde", "defgh", "ghij"]);
        assert_eq!(spans[1].start, 3);
    }

    #[test]
    fn text_shorter_than_chunk_is_single_chunk() {
        let spans = FixedSizeChunker::new(100, 10).split("Menemen");
        assert_eq!(texts(&spans), ["Menemen"]);
        assert!(FixedSizeChunker::new(100, 10).split("").is_empty());
    }

    #[test]
    fn counts_characters_not_bytes() {
        let spans = FixedSizeChunker::new(3, 1).split("çığöşü");
        assert_eq!(texts(&spans), ["çığ", "ğöş", "şü"]);
    }

    #[test]
    fn recursive_prefers_paragraph_boundary() {
        let text = "Menemen\nYumurta, domates.\n\nKısır\nBulgur, maydanoz.";
        let spans = RecursiveChunker::new(30, 0).split(text);
        assert_eq!(spans[0].text, "Menemen\nYumurta, domates.\n\n");
        assert_eq!(spans[1].text, "Kısır\nBulgur, maydanoz.");
    }

    #[test]
    fn recursive_falls_back_to_words_then_hard_cut() {
        let spans = RecursiveChunker::new(10, 0).split("tuz biber kimyon");
        assert_eq!(texts(&spans), ["tuz biber ", "kimyon"]);

        let spans = RecursiveChunker::new(4, 0).split("abcdefgh");
        assert_eq!(texts(&spans), ["abcd", "efgh"]);
    }

    #[test]
    fn recursive_ignores_boundaries_in_first_half() {
        let spans = RecursiveChunker::new(10, 0).split("ab\n\ncdefghijklmnop");
        assert_eq!(texts(&spans), ["ab\n\ncdefgh", "ijklmnop"]);
    }

    #[test]
    fn recursive_keeps_overlap_after_boundary() {
        let spans = RecursiveChunker::new(12, 3).split("bir iki üç dört beş altı");
        for pair in spans.windows(2) {
            let prev: Vec<char> = pair[0].text.chars().collect();
            let next: Vec<char> = pair[1].text.chars().collect();
            assert_eq!(prev[prev.len() - 3..], next[..3]);
        }
    }

    #[test]
    fn chunk_assigns_ids_and_page_metadata() {
        let document = Document::new(
            "tarifler",
            "tarifler.pdf",
            vec![
                Page { number: 1, text: "abcdef".to_string() },
                Page { number: 2, text: "".to_string() },
                Page { number: 3, text: "xyz".to_string() },
            ],
        )
        .with_metadata("corpus", "turk-mutfagi");

        let chunks = FixedSizeChunker::new(4, 1).chunk(&document);
        let ids: Vec<&str> = chunks.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["tarifler_0", "tarifler_1", "tarifler_2"]);
        assert_eq!(chunks[1].text, "def");
        assert_eq!(chunks[1].metadata["page"], "1");
        assert_eq!(chunks[1].metadata["start_char"], "3");
        assert_eq!(chunks[2].text, "xyz");
        assert_eq!(chunks[2].metadata["page"], "3");
        assert_eq!(chunks[2].metadata["source"], "tarifler.pdf");
        assert_eq!(chunks[2].metadata["corpus"], "turk-mutfagi");
        assert!(chunks.iter().all(|c| c.document_id == "tarifler"));
    }
}
