//! ASCII word splitting used for directional-word detection.

use std::iter::FusedIterator;
use std::ops::Range;

/// A maximal run of ASCII letters inside some text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Word<'a> {
    start: usize,
    raw: &'a str,
}

impl<'a> Word<'a> {
    /// Byte offset of the word in the text it was split from.
    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.start + self.raw.len()
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }

    /// The word as it appears in the text.
    pub fn raw(&self) -> &'a str {
        self.raw
    }

    /// The word lowercased.
    pub fn folded(&self) -> String {
        self.raw.to_ascii_lowercase()
    }
}

/// Lazy iterator over the words of a string. Clone it to restart.
#[derive(Debug, Clone)]
pub struct Words<'a> {
    text: &'a str,
    pos: usize,
}

/// Split `text` into maximal runs of ASCII letters. Everything else is a separator.
pub fn words(text: &str) -> Words<'_> {
    Words { text, pos: 0 }
}

impl<'a> Iterator for Words<'a> {
    type Item = Word<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.text.as_bytes();
        while self.pos < bytes.len() && !bytes[self.pos].is_ascii_alphabetic() {
            self.pos += 1;
        }
        if self.pos >= bytes.len() {
            return None;
        }
        let start = self.pos;
        while self.pos < bytes.len() && bytes[self.pos].is_ascii_alphabetic() {
            self.pos += 1;
        }
        // ASCII bytes never fall inside a multi-byte char, so both ends are boundaries.
        Some(Word {
            start,
            raw: &self.text[start..self.pos],
        })
    }
}

impl FusedIterator for Words<'_> {}

#[cfg(test)]
mod tests {
    use super::words;

    fn folded(text: &str) -> Vec<String> {
        words(text).map(|w| w.folded()).collect()
    }

    #[test]
    fn splits_on_non_letters_and_folds_case() {
        assert_eq!(
            folded("Left-most cup, upperLeft!"),
            vec!["left", "most", "cup", "upperleft"]
        );
    }

    #[test]
    fn digits_and_non_ascii_separate_words() {
        assert_eq!(folded("cup2plate"), vec!["cup", "plate"]);
        assert_eq!(folded("café left"), vec!["caf", "left"]);
    }

    #[test]
    fn empty_and_separator_only_inputs_yield_nothing() {
        assert!(folded("").is_empty());
        assert!(folded(" ,.- 42 ").is_empty());
    }

    #[test]
    fn word_offsets_index_into_source() {
        let text = "the  right cup";
        let found: Vec<_> = words(text).collect();
        assert_eq!(found.len(), 3);
        assert_eq!(found[1].range(), 5..10);
        assert_eq!(&text[found[1].range()], "right");
        assert_eq!(found[1].raw(), "right");
    }

    #[test]
    fn iterator_restarts_from_clone() {
        let it = words("a b c");
        let first: Vec<_> = it.clone().map(|w| w.raw()).collect();
        let second: Vec<_> = it.map(|w| w.raw()).collect();
        assert_eq!(first, second);
    }
}
