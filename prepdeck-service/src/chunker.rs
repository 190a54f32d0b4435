//! Text chunking for the generation pipeline.
//!
//! Splits arbitrary source text into bounded segments that each fit in a
//! single generation request. Boundaries prefer a sentence terminator or
//! newline near the target size so a chunk rarely ends mid-sentence.

/// A contiguous segment of source text processed as one generation unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// Position of this chunk in emission order
    pub index: usize,
    pub text: String,
}

impl TextChunk {
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Fragments shorter than this after trimming rarely contain enough content
/// to generate questions from and would waste a generation request.
const MIN_CHUNK_LEN: usize = 50;

/// Split `text` into chunks of roughly `target_size` characters.
///
/// Returns a lazy iterator over the chunks. When a window would cut
/// mid-sentence, the boundary backs up to the nearest `.` or newline,
/// provided that lands in the back half of the window. Whitespace-only
/// fragments are never emitted; an input that fits in one window is
/// emitted as a single trimmed chunk.
pub fn chunk_text(text: &str, target_size: usize) -> Chunks<'_> {
    Chunks {
        source: text,
        target: target_size.max(1),
        pos: 0,
        next_index: 0,
    }
}

/// Count the chunks `chunk_text` would emit for `text`.
pub fn chunk_count(text: &str, target_size: usize) -> usize {
    chunk_text(text, target_size).count()
}

/// Lazy chunk iterator returned by [`chunk_text`]
pub struct Chunks<'a> {
    source: &'a str,
    target: usize,
    pos: usize,
    next_index: usize,
}

impl Iterator for Chunks<'_> {
    type Item = TextChunk;

    fn next(&mut self) -> Option<TextChunk> {
        loop {
            if self.pos >= self.source.len() {
                return None;
            }

            let remaining = &self.source[self.pos..];
            let raw = if remaining.len() <= self.target {
                remaining
            } else {
                let mut end = floor_char_boundary(remaining, self.target);
                // Sentence terminators are single ASCII bytes, so a byte
                // search cannot land inside a multi-byte character.
                if let Some(cut) = remaining[..end].rfind(['.', '\n'])
                    && cut > self.target / 2
                {
                    end = cut + 1;
                }
                &remaining[..end]
            };

            let whole_input = self.pos == 0 && raw.len() == self.source.len();
            self.pos += raw.len();

            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }
            // Boundary slivers are discarded; a short input that is the
            // entire source still yields its single chunk.
            if trimmed.len() < MIN_CHUNK_LEN && !whole_input {
                continue;
            }

            let index = self.next_index;
            self.next_index += 1;
            return Some(TextChunk {
                index,
                text: trimmed.to_string(),
            });
        }
    }
}

/// Largest byte index `<= max` that falls on a char boundary of `s`.
fn floor_char_boundary(s: &str, max: usize) -> usize {
    if max >= s.len() {
        return s.len();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    end
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentences(n: usize) -> String {
        (0..n)
            .map(|i| format!("Sentence number {i} covers one more distinct fact for the quiz."))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn short_input_is_a_single_chunk() {
        let text = "  The Indus flows through Pakistan.  ";
        let chunks: Vec<_> = chunk_text(text, 4000).collect();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].index, 0);
        assert_eq!(chunks[0].text, text.trim());
    }

    #[test]
    fn short_input_below_minimum_still_emitted() {
        let chunks: Vec<_> = chunk_text("Tiny note.", 4000).collect();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "Tiny note.");
    }

    #[test]
    fn whitespace_input_yields_nothing() {
        assert_eq!(chunk_count("   \n\n  ", 4000), 0);
    }

    #[test]
    fn nine_thousand_chars_at_four_thousand_yields_three_chunks() {
        let mut text = sentences(200);
        text.truncate(9000);
        let chunks: Vec<_> = chunk_text(&text, 4000).collect();
        assert_eq!(chunks.len(), 3);
        for chunk in &chunks {
            assert!(!chunk.text.is_empty());
            assert!(chunk.len() <= 4001, "chunk overshot: {}", chunk.len());
        }
        // Full windows land close to the target; only the tail may run short
        assert!(chunks[0].len() >= 3000);
        assert!(chunks[1].len() >= 3000);
    }

    #[test]
    fn chunks_are_indexed_in_order() {
        let text = sentences(100);
        let indices: Vec<_> = chunk_text(&text, 4000).map(|c| c.index).collect();
        assert!(indices.len() > 1);
        let expected: Vec<_> = (0..indices.len()).collect();
        assert_eq!(indices, expected);
    }

    #[test]
    fn concatenation_reconstructs_source_modulo_trimming() {
        let text = sentences(100);
        let rebuilt: String = chunk_text(&text, 4000)
            .map(|c| c.text)
            .collect::<Vec<_>>()
            .join(" ");
        let normalize = |s: &str| s.split_whitespace().collect::<Vec<_>>().join(" ");
        assert_eq!(normalize(&rebuilt), normalize(&text));
    }

    #[test]
    fn boundary_prefers_sentence_break_in_back_half() {
        // One period placed past the midpoint of the window
        let text = format!("{}. {}", "a".repeat(3000), "b".repeat(3000));
        let chunks: Vec<_> = chunk_text(&text, 4000).collect();
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].text.ends_with('.'));
        assert_eq!(chunks[0].len(), 3001);
    }

    #[test]
    fn boundary_ignores_break_in_front_half() {
        // Period at 1000 of a 4000 window is too early to be worth a cut
        let text = format!("{}. {}", "a".repeat(1000), "b".repeat(5000));
        let chunks: Vec<_> = chunk_text(&text, 4000).collect();
        assert_eq!(chunks[0].len(), 4000);
    }

    #[test]
    fn trailing_sliver_is_discarded() {
        let text = format!("{}.zz", "a".repeat(999));
        let chunks: Vec<_> = chunk_text(&text, 1000).collect();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].len(), 1000);
        assert!(chunks[0].text.ends_with('.'));
    }

    #[test]
    fn multibyte_text_never_splits_a_character() {
        let text = "درس ".repeat(2000);
        let chunks: Vec<_> = chunk_text(&text, 4000).collect();
        assert!(chunks.len() >= 3);
        for chunk in &chunks {
            assert!(!chunk.text.is_empty());
            assert!(chunk.len() <= 4000);
        }
    }
}
