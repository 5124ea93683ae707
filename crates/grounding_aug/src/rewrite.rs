//! Caption rewriting for mirrored samples.
//!
//! The caption is rebuilt in one left-to-right pass. Text between spans ("gaps") and
//! text inside spans are handled as separate regions; each region long enough to hold
//! a directional word gets at most one left/right swap. Because a swap changes length
//! ("left" -> "right"), every new span offset is read off the output buffer as it
//! grows instead of being shifted from the old one.

use crate::lexicon::DirectionalLexicon;
use crate::tokens::unique_groups;
use crate::types::RewriteError;
use crate::words::words;
use data_contracts::{Span, TokenGroup};
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};

/// Regions shorter than this many characters are copied without looking for words.
pub const DEFAULT_MIN_REWRITE_LEN: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewrittenCaption {
    pub caption: String,
    /// Original group -> the same group's spans in `caption`.
    pub offsets: BTreeMap<TokenGroup, TokenGroup>,
    /// Number of regions in which a word was swapped.
    pub substitutions: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct CaptionRewriter<'a> {
    lexicon: &'a DirectionalLexicon,
    min_len: usize,
}

impl<'a> CaptionRewriter<'a> {
    pub fn new(lexicon: &'a DirectionalLexicon, min_len: usize) -> Self {
        Self { lexicon, min_len }
    }

    /// Swap the first directional word of `region` for its mirror. Assumes a region
    /// holds at most one directional word; later ones are left as they are.
    pub fn flip_region<'r>(&self, region: &'r str) -> Cow<'r, str> {
        for word in words(region) {
            let Some(mirrored) = self.lexicon.mirror(&word.folded()) else {
                continue;
            };
            let replacement = match_case(word.raw(), &mirrored);
            let mut out = String::with_capacity(region.len() + replacement.len());
            out.push_str(&region[..word.start()]);
            out.push_str(&replacement);
            out.push_str(&region[word.end()..]);
            return Cow::Owned(out);
        }
        Cow::Borrowed(region)
    }

    fn push_region(&self, out: &mut String, region: &str, substitutions: &mut usize) {
        if region.chars().count() < self.min_len {
            out.push_str(region);
            return;
        }
        match self.flip_region(region) {
            Cow::Owned(flipped) => {
                *substitutions += 1;
                out.push_str(&flipped);
            }
            Cow::Borrowed(same) => out.push_str(same),
        }
    }

    /// Rebuild `caption` with directions mirrored and map every span of `groups` into it.
    ///
    /// `groups` is expected to come from [`unique_groups`]. The distinct spans of all
    /// groups are emitted in order of position, so groups may interleave in the caption
    /// and a span shared by several groups is emitted once. Spans that overlap are
    /// rejected, since the pass cannot move backwards.
    pub fn rewrite(
        &self,
        caption: &str,
        groups: &[&[Span]],
    ) -> Result<RewrittenCaption, RewriteError> {
        let len = caption.len();
        let mut spans = BTreeSet::new();
        for &span in groups.iter().flat_map(|group| group.iter()) {
            let (beg, end) = span;
            if beg > end
                || end > len
                || !caption.is_char_boundary(beg)
                || !caption.is_char_boundary(end)
            {
                return Err(RewriteError::SpanOutOfRange { span, len });
            }
            spans.insert(span);
        }

        let mut out = String::with_capacity(len + 8);
        let mut last_idx = 0;
        let mut substitutions = 0;
        let mut emitted: BTreeMap<Span, Span> = BTreeMap::new();
        for span in spans {
            let (beg, end) = span;
            if beg < last_idx {
                return Err(RewriteError::SpanOrder {
                    span,
                    consumed: last_idx,
                });
            }
            self.push_region(&mut out, &caption[last_idx..beg], &mut substitutions);
            let left = out.len();
            self.push_region(&mut out, &caption[beg..end], &mut substitutions);
            emitted.insert(span, (left, out.len()));
            last_idx = end;
        }
        if last_idx < len {
            self.push_region(&mut out, &caption[last_idx..], &mut substitutions);
        }

        let offsets: BTreeMap<TokenGroup, TokenGroup> = groups
            .iter()
            .map(|group| {
                let new_group: TokenGroup = group
                    .iter()
                    .map(|span| emitted.get(span).copied().unwrap_or(*span))
                    .collect();
                (group.to_vec(), new_group)
            })
            .collect();

        Ok(RewrittenCaption {
            caption: out,
            offsets,
            substitutions,
        })
    }

    /// Mirror `caption` and return it with `tokens_positive` remapped in original order.
    pub fn rewrite_tokens(
        &self,
        caption: &str,
        tokens_positive: &[TokenGroup],
    ) -> Result<(String, Vec<TokenGroup>), RewriteError> {
        let groups = unique_groups(tokens_positive);
        let rewritten = self.rewrite(caption, &groups)?;
        tracing::debug!(
            groups = groups.len(),
            substitutions = rewritten.substitutions,
            old_len = caption.len(),
            new_len = rewritten.caption.len(),
            "caption rewritten for hflip"
        );
        let tokens = remap_tokens(tokens_positive, &rewritten.offsets)?;
        Ok((rewritten.caption, tokens))
    }
}

/// Replace each non-empty group by its rewritten spans. Empty groups stay empty and
/// positions are preserved, so group `i` still belongs to box `i`.
pub fn remap_tokens(
    tokens_positive: &[TokenGroup],
    offsets: &BTreeMap<TokenGroup, TokenGroup>,
) -> Result<Vec<TokenGroup>, RewriteError> {
    tokens_positive
        .iter()
        .map(|group| {
            if group.is_empty() {
                return Ok(Vec::new());
            }
            offsets
                .get(group)
                .cloned()
                .ok_or_else(|| RewriteError::UnmappedGroup(group.clone()))
        })
        .collect()
}

/// Carry the casing of `raw` over to `replacement`: all caps or a leading capital.
fn match_case(raw: &str, replacement: &str) -> String {
    let first_upper = raw.bytes().next().is_some_and(|b| b.is_ascii_uppercase());
    if first_upper && raw.len() > 1 && raw.bytes().all(|b| b.is_ascii_uppercase()) {
        return replacement.to_ascii_uppercase();
    }
    if first_upper {
        let mut out = replacement.to_string();
        if let Some(head) = out.get_mut(..1) {
            head.make_ascii_uppercase();
        }
        return out;
    }
    replacement.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewrite(caption: &str, tokens: &[TokenGroup]) -> (String, Vec<TokenGroup>) {
        let lex = DirectionalLexicon::default();
        CaptionRewriter::new(&lex, DEFAULT_MIN_REWRITE_LEN)
            .rewrite_tokens(caption, tokens)
            .unwrap()
    }

    #[test]
    fn direction_in_gap_shifts_following_span() {
        let (caption, tokens) = rewrite("a cup to the left of a plate", &[vec![(2, 5)], vec![(23, 28)]]);
        assert_eq!(caption, "a cup to the right of a plate");
        assert_eq!(tokens, vec![vec![(2, 5)], vec![(24, 29)]]);
        assert_eq!(&caption[24..29], "plate");
    }

    #[test]
    fn direction_inside_token_grows_span() {
        let (caption, tokens) = rewrite("the left cup is red", &[vec![(0, 12)]]);
        assert_eq!(caption, "the right cup is red");
        assert_eq!(tokens, vec![vec![(0, 13)]]);
    }

    #[test]
    fn shared_group_is_mapped_once_for_both_boxes() {
        let (caption, tokens) = rewrite("a left cup", &[vec![(2, 6)], vec![(2, 6)]]);
        assert_eq!(caption, "a right cup");
        assert_eq!(tokens, vec![vec![(2, 7)], vec![(2, 7)]]);
    }

    #[test]
    fn span_reused_by_a_later_group_keeps_its_offsets() {
        let (caption, tokens) =
            rewrite("the left cup and the plate", &[vec![(4, 8)], vec![(4, 8), (21, 26)]]);
        assert_eq!(caption, "the right cup and the plate");
        assert_eq!(tokens, vec![vec![(4, 9)], vec![(4, 9), (22, 27)]]);
    }

    #[test]
    fn empty_groups_pass_through_in_place() {
        let (caption, tokens) = rewrite("a left cup", &[vec![], vec![(2, 6)], vec![]]);
        assert_eq!(caption, "a right cup");
        assert_eq!(tokens, vec![vec![], vec![(2, 7)], vec![]]);
    }

    #[test]
    fn trailing_text_is_kept_even_when_one_char() {
        let (caption, _) = rewrite("the left cup.", &[vec![(0, 12)]]);
        assert_eq!(caption, "the right cup.");
        let (caption, _) = rewrite("cup on the left.", &[vec![(0, 3)]]);
        assert_eq!(caption, "cup on the right.");
    }

    #[test]
    fn caption_without_tokens_is_one_region() {
        let (caption, tokens) = rewrite("woman on the right", &[]);
        assert_eq!(caption, "woman on the left");
        assert!(tokens.is_empty());
    }

    #[test]
    fn only_first_direction_per_region_is_swapped() {
        let (caption, _) = rewrite("left and right cups", &[]);
        assert_eq!(caption, "right and right cups");
    }

    #[test]
    fn unknown_compounds_are_not_touched() {
        let (caption, _) = rewrite("leftover on the left", &[]);
        assert_eq!(caption, "leftover on the right");
    }

    #[test]
    fn short_regions_are_copied_verbatim() {
        let lex = DirectionalLexicon::default();
        let rewriter = CaptionRewriter::new(&lex, 6);
        let (caption, tokens) = rewriter.rewrite_tokens("a left cup", &[vec![(2, 6)]]).unwrap();
        assert_eq!(caption, "a left cup");
        assert_eq!(tokens, vec![vec![(2, 6)]]);
    }

    #[test]
    fn casing_is_carried_over() {
        let lex = DirectionalLexicon::default();
        let rewriter = CaptionRewriter::new(&lex, DEFAULT_MIN_REWRITE_LEN);
        assert_eq!(rewriter.flip_region("Left cup"), "Right cup");
        assert_eq!(rewriter.flip_region("the LEFT cup"), "the RIGHT cup");
        assert_eq!(rewriter.flip_region("the upperLeft cup"), "the upperright cup");
        assert!(matches!(rewriter.flip_region("a red cup"), Cow::Borrowed(_)));
    }

    #[test]
    fn overlapping_spans_are_rejected() {
        let lex = DirectionalLexicon::default();
        let rewriter = CaptionRewriter::new(&lex, DEFAULT_MIN_REWRITE_LEN);
        let err = rewriter
            .rewrite_tokens("the left cup here", &[vec![(0, 8)], vec![(4, 12)]])
            .unwrap_err();
        assert_eq!(
            err,
            RewriteError::SpanOrder {
                span: (4, 12),
                consumed: 8
            }
        );
    }

    #[test]
    fn interleaved_groups_are_emitted_in_caption_order() {
        let (caption, tokens) =
            rewrite("a cup, a left mug, a plate", &[vec![(2, 5), (21, 26)], vec![(9, 17)]]);
        assert_eq!(caption, "a cup, a right mug, a plate");
        assert_eq!(tokens, vec![vec![(2, 5), (22, 27)], vec![(9, 18)]]);
        assert_eq!(&caption[22..27], "plate");
    }

    #[test]
    fn direction_after_an_interleaved_group_is_still_flipped() {
        let (caption, tokens) = rewrite(
            "a man and a woman, the man on the left",
            &[vec![(2, 5), (23, 26)], vec![(12, 17)]],
        );
        assert_eq!(caption, "a man and a woman, the man on the right");
        assert_eq!(tokens, vec![vec![(2, 5), (23, 26)], vec![(12, 17)]]);
    }

    #[test]
    fn direction_between_interleaved_spans_shifts_the_later_ones() {
        let (caption, tokens) = rewrite(
            "a man on the left and a woman, the man",
            &[vec![(2, 5), (35, 38)], vec![(24, 29)]],
        );
        assert_eq!(caption, "a man on the right and a woman, the man");
        assert_eq!(tokens, vec![vec![(2, 5), (36, 39)], vec![(25, 30)]]);
        assert_eq!(&caption[36..39], "man");
        assert_eq!(&caption[25..30], "woman");
    }

    #[test]
    fn nested_spans_are_rejected() {
        let lex = DirectionalLexicon::default();
        let rewriter = CaptionRewriter::new(&lex, DEFAULT_MIN_REWRITE_LEN);
        let err = rewriter
            .rewrite_tokens("the left cup here", &[vec![(0, 12)], vec![(4, 8)]])
            .unwrap_err();
        assert_eq!(
            err,
            RewriteError::SpanOrder {
                span: (4, 8),
                consumed: 12
            }
        );
    }

    #[test]
    fn out_of_range_span_is_rejected() {
        let lex = DirectionalLexicon::default();
        let rewriter = CaptionRewriter::new(&lex, DEFAULT_MIN_REWRITE_LEN);
        let err = rewriter.rewrite_tokens("a cup", &[vec![(2, 9)]]).unwrap_err();
        assert_eq!(err, RewriteError::SpanOutOfRange { span: (2, 9), len: 5 });
    }

    #[test]
    fn remap_reports_groups_missing_from_map() {
        let err = remap_tokens(&[vec![(0, 1)]], &BTreeMap::new()).unwrap_err();
        assert_eq!(err, RewriteError::UnmappedGroup(vec![(0, 1)]));
    }
}
