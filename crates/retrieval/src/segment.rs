//! Fixed-size character chunking with configurable overlap.
//!
//! Sizes are counted in `char`s so a chunk never splits a UTF-8 sequence.
//! Chunk text is kept verbatim (no trimming), which keeps every chunk an exact
//! substring of its document and makes the overlap exact.

use crate::types::{Chunk, Document};
use ragscope_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Validated chunk size and overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingParams {
    /// Maximum characters per chunk
    pub chunk_size: usize,

    /// Trailing characters of one chunk repeated at the start of the next
    pub overlap: usize,
}

impl ChunkingParams {
    /// Build and validate parameters.
    pub fn new(chunk_size: usize, overlap: usize) -> AppResult<Self> {
        let params = Self {
            chunk_size,
            overlap,
        };
        params.validate()?;
        Ok(params)
    }

    /// Require `chunk_size > 0` and `overlap < chunk_size`.
    pub fn validate(&self) -> AppResult<()> {
        if self.chunk_size == 0 {
            return Err(AppError::invalid_parameter(
                "chunk_size",
                self.chunk_size,
                "must be greater than 0",
            ));
        }
        if self.overlap >= self.chunk_size {
            return Err(AppError::invalid_parameter(
                "overlap",
                self.overlap,
                format!("must be smaller than chunk_size ({})", self.chunk_size),
            ));
        }
        Ok(())
    }

    /// Characters the window advances between chunks.
    pub fn stride(&self) -> usize {
        self.chunk_size - self.overlap
    }
}

/// A borrowed chunk of text with its offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSpan<'a> {
    pub text: &'a str,
    pub char_range: (usize, usize),
    pub byte_range: (usize, usize),
}

/// Split text into overlapping windows of at most `chunk_size` characters.
///
/// Windows start at `0, stride, 2 * stride, ...` while the start is inside the
/// text; the last window is clamped to the end and may be shorter. Empty text
/// yields no spans.
pub fn segment_text(text: &str, chunk_size: usize, overlap: usize) -> AppResult<Vec<TextSpan<'_>>> {
    let params = ChunkingParams::new(chunk_size, overlap)?;
    Ok(split_spans(text, params))
}

fn split_spans(text: &str, params: ChunkingParams) -> Vec<TextSpan<'_>> {
    // byte offset of every char start, plus the end of the text
    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let char_len = boundaries.len() - 1;

    (0..char_len)
        .step_by(params.stride())
        .map(|start| {
            let end = (start + params.chunk_size).min(char_len);
            let (byte_start, byte_end) = (boundaries[start], boundaries[end]);
            TextSpan {
                text: &text[byte_start..byte_end],
                char_range: (start, end),
                byte_range: (byte_start, byte_end),
            }
        })
        .collect()
}

/// Segment one document into chunks.
///
/// `document_index` is the document's position in the run and is carried on
/// each chunk for tie-breaking during ranking.
pub fn segment(
    document: &Document,
    document_index: usize,
    params: ChunkingParams,
) -> AppResult<Vec<Chunk>> {
    params.validate()?;

    let chunks: Vec<Chunk> = split_spans(&document.text, params)
        .into_iter()
        .enumerate()
        .map(|(chunk_index, span)| Chunk {
            document: document.name.clone(),
            document_index,
            chunk_index,
            text: span.text.to_string(),
            char_range: span.char_range,
            byte_range: span.byte_range,
        })
        .collect();

    tracing::debug!(
        "Segmented '{}' into {} chunks (size: {}, overlap: {})",
        document.name,
        chunks.len(),
        params.chunk_size,
        params.overlap
    );

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts<'a>(spans: &[TextSpan<'a>]) -> Vec<&'a str> {
        spans.iter().map(|s| s.text).collect()
    }

    /// Concatenate spans, dropping the first `overlap` chars of every span
    /// after the first.
    fn reconstruct(spans: &[TextSpan<'_>], overlap: usize) -> String {
        let mut out = String::new();
        for (i, span) in spans.iter().enumerate() {
            if i == 0 {
                out.push_str(span.text);
            } else {
                out.extend(span.text.chars().skip(overlap));
            }
        }
        out
    }

    #[test]
    fn test_segment_paris_sentence() {
        let spans = segment_text("Paris is the capital of France.", 20, 5).unwrap();
        assert_eq!(
            texts(&spans),
            vec!["Paris is the capital", "pital of France.", "."]
        );
        assert_eq!(spans[0].char_range, (0, 20));
        assert_eq!(spans[1].char_range, (15, 31));
        assert_eq!(spans[2].char_range, (30, 31));
    }

    #[test]
    fn test_segment_empty_text() {
        assert!(segment_text("", 10, 2).unwrap().is_empty());
    }

    #[test]
    fn test_segment_rejects_zero_chunk_size() {
        let err = segment_text("abc", 0, 0).unwrap_err();
        assert!(matches!(
            err,
            AppError::InvalidChunkingParameters {
                parameter: "chunk_size",
                value: 0,
                ..
            }
        ));
    }

    #[test]
    fn test_segment_rejects_overlap_not_smaller_than_size() {
        for (size, overlap) in [(10, 10), (10, 11), (1, 1), (5, 50)] {
            let err = segment_text("some text", size, overlap).unwrap_err();
            assert!(
                matches!(
                    err,
                    AppError::InvalidChunkingParameters {
                        parameter: "overlap",
                        ..
                    }
                ),
                "size {} overlap {} should be rejected",
                size,
                overlap
            );
        }
    }

    #[test]
    fn test_segment_no_overlap() {
        let text = "a".repeat(300);
        let spans = segment_text(&text, 100, 0).unwrap();
        assert_eq!(spans.len(), 3);
        assert!(spans.iter().all(|s| s.text.len() == 100));
    }

    #[test]
    fn test_segment_final_chunk_shorter() {
        let spans = segment_text("abcdefghij", 4, 1).unwrap();
        assert_eq!(texts(&spans), vec!["abcd", "defg", "ghij", "j"]);
    }

    #[test]
    fn test_consecutive_chunks_overlap_exactly() {
        let text = "abcdefghijklmnopqrstuvwxyz".repeat(10);
        let spans = segment_text(&text, 50, 10).unwrap();
        for pair in spans.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            if prev.char_range.1 - prev.char_range.0 < 50 {
                continue;
            }
            let tail: String = prev.text.chars().skip(40).collect();
            let head: String = next.text.chars().take(10).collect();
            assert_eq!(tail, head);
        }
    }

    #[test]
    fn test_reconstruction_round_trip() {
        let samples = [
            "Paris is the capital of France.",
            "short",
            "exactly twenty chars",
            "Gamedex é um aplicativo 🎮 brasileiro. Acentuação: ã, õ, ç, á, é. 🚀 🎯 💡",
            "line one\nline two\n\nline four\t tabbed  ",
        ];
        let params = [(1, 0), (3, 2), (5, 0), (7, 3), (20, 5), (20, 19), (64, 8), (500, 50)];

        for text in samples {
            for (size, overlap) in params {
                let spans = segment_text(text, size, overlap).unwrap();
                assert_eq!(
                    reconstruct(&spans, overlap),
                    text,
                    "round trip failed for size {} overlap {}",
                    size,
                    overlap
                );
            }
        }
    }

    #[test]
    fn test_spans_are_substrings_at_their_offsets() {
        let text = "Acentuação: ã, õ, ç 🎮 fim";
        for span in segment_text(text, 6, 2).unwrap() {
            assert_eq!(&text[span.byte_range.0..span.byte_range.1], span.text);
            assert!(span.text.chars().count() <= 6);
        }
    }

    #[test]
    fn test_segment_deterministic() {
        let text = "The quick brown fox jumps over the lazy dog. ".repeat(20);
        let first = segment_text(&text, 37, 11).unwrap();
        let second = segment_text(&text, 37, 11).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_segment_document_indexes() {
        let doc = Document::new("notes.md", "abcdefghij");
        let params = ChunkingParams::new(4, 1).unwrap();
        let chunks = segment(&doc, 2, params).unwrap();

        assert_eq!(chunks.len(), 4);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.chunk_index, i);
            assert_eq!(chunk.document_index, 2);
            assert_eq!(chunk.document, "notes.md");
        }
        assert_eq!(chunks[1].char_range, (3, 7));
    }

    #[test]
    fn test_params_stride() {
        assert_eq!(ChunkingParams::new(20, 5).unwrap().stride(), 15);
        assert!(ChunkingParams::new(20, 20).is_err());
    }
}
