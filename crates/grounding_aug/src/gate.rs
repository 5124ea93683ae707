//! Decides which flip branch a caption allows.

use crate::lexicon::DirectionalLexicon;
use crate::types::FlipDecision;
use crate::words::words;

/// Raw, case-sensitive check for the left/right stems anywhere in the caption.
pub fn has_left_right(caption: &str, lexicon: &DirectionalLexicon) -> bool {
    lexicon.mentions_stem(caption)
}

/// True when at least one word of the caption (case-folded) is a lexicon member.
pub fn has_left_right_in_lexicon(caption: &str, lexicon: &DirectionalLexicon) -> bool {
    words(caption).any(|w| lexicon.contains(&w.folded()))
}

pub fn decide(caption: &str, lexicon: &DirectionalLexicon) -> FlipDecision {
    if !has_left_right(caption, lexicon) {
        FlipDecision::Plain
    } else if !has_left_right_in_lexicon(caption, lexicon) {
        FlipDecision::Skip
    } else {
        FlipDecision::Rewrite
    }
}
