//! Recursive character text chunking with configurable size and overlap

use unicode_segmentation::UnicodeSegmentation;

use crate::error::{Error, Result};
use crate::types::document::char_len;
use crate::types::{Chunk, Document};

/// Separators tried coarsest-first; the empty string means
/// character-level splitting as the last resort.
const SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Text chunker with configurable size and overlap.
///
/// Splits on the coarsest separator that appears in the text and recursively
/// re-splits any piece still longer than `chunk_size` with the next finer
/// separator. Adjacent pieces are merged back up to `chunk_size`, carrying
/// `chunk_overlap` trailing characters of context into the next chunk. The
/// size bound is soft: a single unsplittable unit may overshoot it.
pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextChunker {
    /// Create a new chunker. `chunk_size` and `chunk_overlap` must both be
    /// positive, with the overlap strictly smaller than the size.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 || chunk_overlap == 0 {
            return Err(Error::chunking(
                "chunk_size and chunk_overlap must be positive",
            ));
        }
        if chunk_overlap >= chunk_size {
            return Err(Error::chunking(format!(
                "chunk_overlap ({chunk_overlap}) must be smaller than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    /// Split documents into ordered chunks.
    ///
    /// Chunks preserve document order; each carries a copy of its parent
    /// document's metadata plus its index within that document. An empty
    /// document yields zero chunks; a document no longer than `chunk_size`
    /// yields exactly one chunk equal to its content.
    pub fn split(&self, documents: &[Document]) -> Result<Vec<Chunk>> {
        let mut chunks = Vec::new();
        for document in documents {
            let pieces = self.split_text(&document.content);
            for (chunk_index, text) in pieces.into_iter().enumerate() {
                chunks.push(Chunk::new(text, document.metadata.clone(), chunk_index));
            }
        }
        tracing::debug!(
            documents = documents.len(),
            chunks = chunks.len(),
            "split documents"
        );
        Ok(chunks)
    }

    /// Split a single text into chunk strings.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }
        self.split_with(text, &SEPARATORS)
            .into_iter()
            .filter(|chunk| !chunk.is_empty())
            .collect()
    }

    fn split_with(&self, text: &str, separators: &[&'static str]) -> Vec<String> {
        let (separator, rest) = pick_separator(text, separators);
        let splits: Vec<&str> = if separator.is_empty() {
            text.graphemes(true).collect()
        } else {
            text.split(separator).collect()
        };

        let mut chunks = Vec::new();
        let mut good: Vec<&str> = Vec::new();
        for piece in splits {
            if char_len(piece) <= self.chunk_size {
                good.push(piece);
                continue;
            }
            if !good.is_empty() {
                chunks.extend(self.merge(&good, separator));
                good.clear();
            }
            if rest.is_empty() {
                // Nothing finer to split on; keep the oversized unit whole.
                chunks.push(piece.to_string());
            } else {
                chunks.extend(self.split_with(piece, rest));
            }
        }
        if !good.is_empty() {
            chunks.extend(self.merge(&good, separator));
        }
        chunks
    }

    /// Merge small pieces back into chunks up to `chunk_size`, re-seeding
    /// each new chunk with up to `chunk_overlap` trailing characters of the
    /// previous one. The overlap is measured on whole piece boundaries.
    fn merge(&self, pieces: &[&str], separator: &str) -> Vec<String> {
        let sep_len = char_len(separator);
        let mut chunks = Vec::new();
        let mut window: Vec<&str> = Vec::new();
        let mut total = 0usize;

        for &piece in pieces {
            let piece_len = char_len(piece);
            if !window.is_empty() && total + sep_len + piece_len > self.chunk_size {
                chunks.push(window.join(separator));
                while !window.is_empty()
                    && (total > self.chunk_overlap
                        || (total + sep_len + piece_len > self.chunk_size && total > 0))
                {
                    let first_len = char_len(window[0]);
                    total -= first_len + if window.len() > 1 { sep_len } else { 0 };
                    window.remove(0);
                }
            }
            total += if window.is_empty() {
                piece_len
            } else {
                sep_len + piece_len
            };
            window.push(piece);
        }
        if !window.is_empty() {
            chunks.push(window.join(separator));
        }
        chunks
    }
}

fn pick_separator<'a>(
    text: &str,
    separators: &'a [&'static str],
) -> (&'static str, &'a [&'static str]) {
    for (i, &separator) in separators.iter().enumerate() {
        if separator.is_empty() || text.contains(separator) {
            return (separator, &separators[i + 1..]);
        }
    }
    ("", &[])
}
