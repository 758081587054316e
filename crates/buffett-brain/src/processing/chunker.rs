use crate::config::CorpusConfig;

/// Splits document text into overlapping chunks, preferring natural break points.
pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
    min_chunk_size: usize,
}

impl TextChunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize, min_chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            chunk_overlap: chunk_overlap.min(chunk_size.saturating_sub(1)),
            min_chunk_size,
        }
    }

    pub fn from_config(config: &CorpusConfig) -> Self {
        Self::new(config.chunk_size, config.chunk_overlap, config.min_chunk_size)
    }

    pub fn chunk(&self, text: &str) -> Vec<String> {
        let text = text.trim();
        if text.len() <= self.chunk_size {
            if text.len() < self.min_chunk_size {
                return Vec::new();
            }
            return vec![text.to_string()];
        }

        let mut chunks = Vec::new();
        let mut start = 0;

        while start < text.len() {
            let raw_end = (start + self.chunk_size).min(text.len());
            let end = snap_to_char_boundary(text, raw_end);

            let actual_end = if end < text.len() {
                self.find_break_point(text, start, end)
            } else {
                end
            };

            let chunk_text = text[start..actual_end].trim();
            if chunk_text.len() >= self.min_chunk_size {
                chunks.push(chunk_text.to_string());
            }
            if actual_end >= text.len() {
                break;
            }

            // Move forward with overlap, always by at least one byte
            let span = actual_end - start;
            let step = if span > self.chunk_overlap {
                span - self.chunk_overlap
            } else {
                span
            };

            let mut next = snap_to_char_boundary(text, start + step.max(1));
            if next <= start {
                next = actual_end;
            }
            start = next;
        }

        chunks
    }

    /// Returns a break offset in `(start, preferred_end]`.
    fn find_break_point(&self, text: &str, start: usize, preferred_end: usize) -> usize {
        let search_start = snap_to_char_boundary(text, preferred_end.saturating_sub(200).max(start));
        let safe_end = snap_to_char_boundary(text, preferred_end);

        if search_start >= safe_end {
            return safe_end.max(next_char_boundary(text, start));
        }

        let search_region = &text[search_start..safe_end];

        // Priority: paragraph break > sentence end > line break > word break
        let candidate = search_region
            .rfind("\n\n")
            .map(|pos| pos + 2)
            .or_else(|| search_region.rfind(". ").map(|pos| pos + 2))
            .or_else(|| search_region.rfind(".\n").map(|pos| pos + 2))
            .or_else(|| search_region.rfind('\n').map(|pos| pos + 1))
            .or_else(|| search_region.rfind(' ').map(|pos| pos + 1))
            .map(|offset| search_start + offset);

        match candidate {
            Some(pos) if pos > start => pos,
            _ => safe_end,
        }
    }
}

/// Snap a byte offset to the nearest valid UTF-8 char boundary (rounding down).
fn snap_to_char_boundary(text: &str, pos: usize) -> usize {
    if pos >= text.len() {
        return text.len();
    }
    let mut p = pos;
    while p > 0 && !text.is_char_boundary(p) {
        p -= 1;
    }
    p
}

fn next_char_boundary(text: &str, pos: usize) -> usize {
    let mut p = pos + 1;
    while p < text.len() && !text.is_char_boundary(p) {
        p += 1;
    }
    p.min(text.len())
}
