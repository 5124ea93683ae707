//! Token group normalization ahead of the caption rewrite.

use data_contracts::{Span, TokenGroup};
use std::collections::BTreeSet;

/// Distinct non-empty token groups in canonical (lexicographic) order.
///
/// Groups are compared by value, so two boxes pointing at the same spans share one
/// entry and the rewriter visits it once.
pub fn unique_groups(tokens_positive: &[TokenGroup]) -> Vec<&[Span]> {
    tokens_positive
        .iter()
        .filter(|group| !group.is_empty())
        .map(Vec::as_slice)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
