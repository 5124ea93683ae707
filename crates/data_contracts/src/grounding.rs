use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Half-open byte range `(start, end)` into a caption.
pub type Span = (usize, usize);

/// Spans of the caption that describe one box. May be empty.
pub type TokenGroup = Vec<Span>;

/// Target record of a grounding sample.
///
/// `tokens_positive[i]` holds the caption spans for `boxes[i]`. Any other field of
/// the serialized record lands in `extra` and is written back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundingTarget {
    pub caption: String,
    /// Pixel boxes: [x1, y1, x2, y2].
    pub boxes: Vec<[f32; 4]>,
    pub tokens_positive: Vec<TokenGroup>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("{boxes} boxes but {groups} token groups")]
    GroupCountMismatch { boxes: usize, groups: usize },
    #[error("tokens_positive[{group}] span {span:?} exceeds caption length {len}")]
    SpanOutOfRange { group: usize, span: Span, len: usize },
    #[error("tokens_positive[{group}] span {span:?} has start after end")]
    SpanInverted { group: usize, span: Span },
    #[error("tokens_positive[{group}] span {span:?} splits a UTF-8 character")]
    SpanNotCharBoundary { group: usize, span: Span },
    #[error("boxes[{index}] non-finite or min>max: {bbox:?}")]
    InvalidBox { index: usize, bbox: [f32; 4] },
}

impl GroundingTarget {
    pub fn new(
        caption: impl Into<String>,
        boxes: Vec<[f32; 4]>,
        tokens_positive: Vec<TokenGroup>,
    ) -> Self {
        Self {
            caption: caption.into(),
            boxes,
            tokens_positive,
            extra: serde_json::Map::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.boxes.len() != self.tokens_positive.len() {
            return Err(ValidationError::GroupCountMismatch {
                boxes: self.boxes.len(),
                groups: self.tokens_positive.len(),
            });
        }
        for (index, b) in self.boxes.iter().enumerate() {
            if b.iter().any(|v| !v.is_finite()) || b[0] > b[2] || b[1] > b[3] {
                return Err(ValidationError::InvalidBox { index, bbox: *b });
            }
        }
        let len = self.caption.len();
        for (group, spans) in self.tokens_positive.iter().enumerate() {
            for &span in spans {
                let (start, end) = span;
                if start > end {
                    return Err(ValidationError::SpanInverted { group, span });
                }
                if end > len {
                    return Err(ValidationError::SpanOutOfRange { group, span, len });
                }
                if !self.caption.is_char_boundary(start) || !self.caption.is_char_boundary(end) {
                    return Err(ValidationError::SpanNotCharBoundary { group, span });
                }
            }
        }
        Ok(())
    }

    /// Caption text referenced by every span, in group order. Empty groups contribute nothing.
    pub fn phrases(&self) -> Vec<&str> {
        self.tokens_positive
            .iter()
            .flatten()
            .filter_map(|&(start, end)| self.caption.get(start..end))
            .collect()
    }
}
