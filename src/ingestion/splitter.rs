//! Recursive overlapping text splitter.
//!
//! Splitting prefers high-level boundaries before low-level ones: paragraph
//! breaks, then line breaks, then sentence ends, then spaces, then raw
//! character cuts. Produced pieces are exact substrings of the input, so a
//! chunk sequence covers the source text end to end, duplicating only the
//! configured overlap at chunk starts.

use tracing::debug;

/// A split piece: exact substring of the source plus its byte offset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Piece {
    /// Byte offset of `text` within the input passed to [`TextSplitter::split`].
    pub offset: usize,
    pub text: String,
}

/// Boundary cascade used when no separators are supplied explicitly.
/// The empty string is the character-level fallback and must come last.
pub const DEFAULT_SEPARATORS: &[&str] = &["\n\n", "\n", ". ", " ", ""];

/// Splits text into overlapping pieces of bounded character length.
#[derive(Clone, Debug)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl TextSplitter {
    /// Creates a splitter targeting `chunk_size` characters per piece with
    /// `chunk_overlap` characters carried between adjacent pieces.
    ///
    /// `chunk_overlap` is clamped below `chunk_size` so every flush makes
    /// forward progress.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            chunk_overlap: chunk_overlap.min(chunk_size.saturating_sub(1)),
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Splits `text` into pieces of at most `chunk_size` characters.
    ///
    /// Adjacent pieces overlap by up to `chunk_overlap` characters; pieces
    /// are contiguous substrings in source order.
    pub fn split(&self, text: &str) -> Vec<Piece> {
        if text.is_empty() {
            return Vec::new();
        }
        let separators: Vec<&str> = self.separators.iter().map(String::as_str).collect();
        let mut fragments = Vec::new();
        self.fragment(text, 0, &separators, &mut fragments);
        let pieces = self.merge(&fragments);
        debug!(
            fragments = fragments.len(),
            pieces = pieces.len(),
            "split complete"
        );
        pieces
    }

    /// Recursively cuts `text` into fragments no longer than `chunk_size`
    /// characters, preferring the earliest separator in the cascade.
    /// Separators stay attached to the fragment they terminate.
    fn fragment(&self, text: &str, offset: usize, separators: &[&str], out: &mut Vec<Piece>) {
        if text.chars().count() <= self.chunk_size {
            out.push(Piece {
                offset,
                text: text.to_string(),
            });
            return;
        }

        let Some((separator, rest)) = separators.split_first() else {
            // Cascade exhausted; should not happen because "" always splits.
            out.push(Piece {
                offset,
                text: text.to_string(),
            });
            return;
        };

        if separator.is_empty() {
            // Character-level fallback: hard cuts every chunk_size chars.
            let mut start = 0;
            let mut taken = 0;
            for (idx, _) in text.char_indices() {
                if taken == self.chunk_size {
                    out.push(Piece {
                        offset: offset + start,
                        text: text[start..idx].to_string(),
                    });
                    start = idx;
                    taken = 0;
                }
                taken += 1;
            }
            if start < text.len() {
                out.push(Piece {
                    offset: offset + start,
                    text: text[start..].to_string(),
                });
            }
            return;
        }

        if !text.contains(separator) {
            self.fragment(text, offset, rest, out);
            return;
        }

        let mut cursor = 0;
        for part in text.split_inclusive(separator) {
            self.fragment(part, offset + cursor, rest, out);
            cursor += part.len();
        }
    }

    /// Greedily merges fragments into pieces up to `chunk_size` characters,
    /// seeding each new piece with whole trailing fragments of the previous
    /// one totaling at most `chunk_overlap` characters.
    fn merge(&self, fragments: &[Piece]) -> Vec<Piece> {
        let mut pieces = Vec::new();
        let mut current: Vec<&Piece> = Vec::new();
        let mut current_len = 0usize;

        for fragment in fragments {
            let fragment_len = fragment.text.chars().count();
            if current_len + fragment_len > self.chunk_size && !current.is_empty() {
                pieces.push(Self::assemble(&current));

                let (tail, tail_len) = self.overlap_tail(&current);
                current = tail;
                current_len = tail_len;
                // Drop the overlap when it would push this fragment over the
                // limit again; progress beats continuity.
                if current_len + fragment_len > self.chunk_size {
                    current.clear();
                    current_len = 0;
                }
            }
            current.push(fragment);
            current_len += fragment_len;
        }

        if !current.is_empty() {
            pieces.push(Self::assemble(&current));
        }
        pieces
    }

    /// Whole trailing fragments of `current` totaling at most `chunk_overlap`
    /// characters, in source order.
    fn overlap_tail<'a>(&self, current: &[&'a Piece]) -> (Vec<&'a Piece>, usize) {
        let mut tail: Vec<&Piece> = Vec::new();
        let mut tail_len = 0usize;
        for fragment in current.iter().rev() {
            let len = fragment.text.chars().count();
            if tail_len + len > self.chunk_overlap {
                break;
            }
            tail.push(fragment);
            tail_len += len;
        }
        tail.reverse();
        (tail, tail_len)
    }

    fn assemble(fragments: &[&Piece]) -> Piece {
        let text: String = fragments.iter().map(|f| f.text.as_str()).collect();
        Piece {
            offset: fragments[0].offset,
            text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reconstructs(source: &str, pieces: &[Piece]) {
        assert!(!pieces.is_empty());
        // Every piece is an exact substring at its claimed offset.
        for piece in pieces {
            assert_eq!(
                &source[piece.offset..piece.offset + piece.text.len()],
                piece.text,
                "piece must be a substring at its offset"
            );
        }
        // Pieces appear in order and leave no gap: each piece starts at or
        // before the end of its predecessor, and the last one reaches the end.
        assert_eq!(pieces[0].offset, 0);
        let mut covered = pieces[0].offset + pieces[0].text.len();
        for piece in &pieces[1..] {
            assert!(piece.offset <= covered, "gap before offset {}", piece.offset);
            covered = covered.max(piece.offset + piece.text.len());
        }
        assert_eq!(covered, source.len());
    }

    #[test]
    fn short_text_is_single_piece() {
        let splitter = TextSplitter::new(800, 50);
        let pieces = splitter.split("A short resume line.");
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].text, "A short resume line.");
        assert_eq!(pieces[0].offset, 0);
    }

    #[test]
    fn empty_text_yields_no_pieces() {
        let splitter = TextSplitter::new(800, 50);
        assert!(splitter.split("").is_empty());
    }

    #[test]
    fn prefers_paragraph_boundaries() {
        let para_a = "alpha ".repeat(10);
        let para_b = "beta ".repeat(10);
        let source = format!("{}\n\n{}", para_a.trim_end(), para_b.trim_end());
        let splitter = TextSplitter::new(70, 0);

        let pieces = splitter.split(&source);
        reconstructs(&source, &pieces);
        assert!(pieces.len() >= 2);
        // The first break lands on the paragraph boundary, not mid-word.
        assert!(pieces[0].text.starts_with("alpha"));
        assert!(pieces[1].text.starts_with("beta"));
    }

    #[test]
    fn falls_back_to_word_and_char_cuts() {
        let source = "x".repeat(95);
        let splitter = TextSplitter::new(30, 0);
        let pieces = splitter.split(&source);
        reconstructs(&source, &pieces);
        assert!(pieces.iter().all(|p| p.text.chars().count() <= 30));
    }

    #[test]
    fn pieces_respect_size_and_overlap() {
        let source = "The quick brown fox jumps over the lazy dog. ".repeat(40);
        let splitter = TextSplitter::new(120, 30);
        let pieces = splitter.split(&source);
        reconstructs(&source, &pieces);

        for piece in &pieces {
            assert!(piece.text.chars().count() <= 120);
        }
        // Adjacent pieces actually overlap (or at worst touch).
        for pair in pieces.windows(2) {
            assert!(pair[1].offset <= pair[0].offset + pair[0].text.len());
        }
    }

    #[test]
    fn reconstruction_holds_for_mixed_content() {
        let source = "Summary\n\nEngineer with systems experience. Built storage \
                      engines and network services.\n\nEducation\n\nPenn State \
                      University, Computer Science. Graduated with honors.\n\n\
                      Skills\n\nRust, SQL, distributed systems, profiling."
            .to_string();
        let splitter = TextSplitter::new(60, 12);
        let pieces = splitter.split(&source);
        reconstructs(&source, &pieces);
    }

    #[test]
    fn overlap_clamped_below_chunk_size() {
        let splitter = TextSplitter::new(10, 50);
        assert!(splitter.chunk_overlap() < splitter.chunk_size());
        let source = "abcdefghij".repeat(5);
        let pieces = splitter.split(&source);
        reconstructs(&source, &pieces);
    }
}
