//! Directional lexicon: the left/right word families and the stem swap that mirrors them.

use crate::types::LexiconError;
use std::collections::BTreeSet;

pub const DEFAULT_LEFT_STEM: &str = "left";
pub const DEFAULT_RIGHT_STEM: &str = "right";

pub const DEFAULT_LEFT_WORDS: &[&str] = &[
    "left",
    "leftmost",
    "bottomleft",
    "leftside",
    "farleft",
    "leftest",
    "leftiest",
    "upleft",
    "leftier",
    "upperleft",
    "topleft",
    "lefty",
    "leftmiddle",
];

pub const DEFAULT_RIGHT_WORDS: &[&str] = &[
    "right",
    "rightmost",
    "bottomright",
    "rightside",
    "farright",
    "rightest",
    "rightiest",
    "upright",
    "rightier",
    "upperright",
    "topright",
    "righty",
    "rightmiddle",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

/// Recognized directional words. Members are lowercase ASCII and always contain
/// their family's stem, so mirroring is a stem substitution rather than a lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectionalLexicon {
    left_stem: String,
    right_stem: String,
    left: BTreeSet<String>,
    right: BTreeSet<String>,
}

impl Default for DirectionalLexicon {
    fn default() -> Self {
        Self {
            left_stem: DEFAULT_LEFT_STEM.to_string(),
            right_stem: DEFAULT_RIGHT_STEM.to_string(),
            left: DEFAULT_LEFT_WORDS.iter().map(|w| w.to_string()).collect(),
            right: DEFAULT_RIGHT_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }
}

fn is_lower_word(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_lowercase())
}

impl DirectionalLexicon {
    pub fn new<L, R>(
        left_stem: &str,
        right_stem: &str,
        left: L,
        right: R,
    ) -> Result<Self, LexiconError>
    where
        L: IntoIterator,
        L::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        for stem in [left_stem, right_stem] {
            if !is_lower_word(stem) {
                return Err(LexiconError::BadStem(stem.to_string()));
            }
        }
        let left = collect_family(left, left_stem)?;
        let right = collect_family(right, right_stem)?;
        if let Some(word) = left.intersection(&right).next() {
            return Err(LexiconError::BothFamilies(word.clone()));
        }
        Ok(Self {
            left_stem: left_stem.to_string(),
            right_stem: right_stem.to_string(),
            left,
            right,
        })
    }

    pub fn left_stem(&self) -> &str {
        &self.left_stem
    }

    pub fn right_stem(&self) -> &str {
        &self.right_stem
    }

    pub fn left_words(&self) -> impl Iterator<Item = &str> {
        self.left.iter().map(String::as_str)
    }

    pub fn right_words(&self) -> impl Iterator<Item = &str> {
        self.right.iter().map(String::as_str)
    }

    /// Family of a lowercase word, if it is a member.
    pub fn direction(&self, word: &str) -> Option<Direction> {
        if self.left.contains(word) {
            Some(Direction::Left)
        } else if self.right.contains(word) {
            Some(Direction::Right)
        } else {
            None
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.direction(word).is_some()
    }

    /// Literal, case-sensitive check for either stem anywhere in `text`.
    pub fn mentions_stem(&self, text: &str) -> bool {
        text.contains(self.left_stem.as_str()) || text.contains(self.right_stem.as_str())
    }

    /// Mirror image of a lowercase member word; `None` for anything else.
    pub fn mirror(&self, word: &str) -> Option<String> {
        match self.direction(word)? {
            Direction::Left => Some(word.replace(&self.left_stem, &self.right_stem)),
            Direction::Right => Some(word.replace(&self.right_stem, &self.left_stem)),
        }
    }
}

fn collect_family<I>(words: I, stem: &str) -> Result<BTreeSet<String>, LexiconError>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    let mut out = BTreeSet::new();
    for word in words {
        let word: String = word.into();
        if !is_lower_word(&word) {
            return Err(LexiconError::BadEntry(word));
        }
        if !word.contains(stem) {
            return Err(LexiconError::MissingStem {
                word,
                stem: stem.to_string(),
            });
        }
        out.insert(word);
    }
    Ok(out)
}
