//! Error definitions and shared enums for grounding_aug.

use data_contracts::{GroundingTarget, Span, TokenGroup, ValidationError};
use std::path::PathBuf;
use thiserror::Error;

pub type AugResult<T> = Result<T, GroundingAugError>;

#[derive(Debug, Error)]
pub enum GroundingAugError {
    #[error("invalid target: {0}")]
    Validation(#[from] ValidationError),
    #[error("caption rewrite failed: {0}")]
    Rewrite(#[from] RewriteError),
    #[error("invalid lexicon: {0}")]
    Lexicon(#[from] LexiconError),
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("toml parse error at {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Config(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RewriteError {
    /// The span starts inside caption text the pass has already emitted.
    #[error("span {span:?} starts before already consumed offset {consumed}")]
    SpanOrder { span: Span, consumed: usize },
    #[error("span {span:?} does not fit caption of length {len}")]
    SpanOutOfRange { span: Span, len: usize },
    #[error("token group {0:?} has no rewritten spans")]
    UnmappedGroup(TokenGroup),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LexiconError {
    #[error("stem {0:?} must be a non-empty lowercase ASCII word")]
    BadStem(String),
    #[error("entry {0:?} must be a non-empty lowercase ASCII word")]
    BadEntry(String),
    #[error("entry {word:?} does not contain stem {stem:?}")]
    MissingStem { word: String, stem: String },
    #[error("entry {0:?} is listed in both families")]
    BothFamilies(String),
}

/// An image paired with its grounding target.
#[derive(Debug, Clone)]
pub struct GroundingSample<I = image::RgbImage> {
    pub image: I,
    pub target: GroundingTarget,
}

impl<I> GroundingSample<I> {
    pub fn new(image: I, target: GroundingTarget) -> Self {
        Self { image, target }
    }
}

/// Branch taken by the text-conditioned flip for one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlipDecision {
    /// No directional substring: flip image and boxes, caption untouched.
    Plain,
    /// Directional substring present but not as a recognized word: nothing flips.
    Skip,
    /// Flip image and boxes and rewrite caption spans.
    Rewrite,
}

impl FlipDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlipDecision::Plain => "plain",
            FlipDecision::Skip => "skip",
            FlipDecision::Rewrite => "rewrite",
        }
    }

    pub fn flips(&self) -> bool {
        !matches!(self, FlipDecision::Skip)
    }
}
