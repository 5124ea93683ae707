//! Label-preserving augmentations for grounding (image, caption, box) samples.
//!
//! This crate provides:
//! - A text-conditioned horizontal flip that mirrors left/right words in the caption
//!   and keeps `tokens_positive` spans pointing at the right text
//! - The directional lexicon, word splitter, and flip gate behind it
//! - Pixel-space wrappers (color jitter, block/pixel masking, blur) that leave targets alone
//! - TOML configuration for the lexicon and transform parameters

pub mod aug;
pub mod config;
pub mod flip;
pub mod gate;
pub mod lexicon;
pub mod rewrite;
pub mod tokens;
pub mod types;
pub mod words;

pub use aug::{Augmenter, AugmenterBuilder};
pub use config::AugConfig;
pub use flip::{flip_boxes, text_conditioned_hflip, MirrorImage};
pub use gate::decide;
pub use lexicon::{Direction, DirectionalLexicon};
pub use rewrite::{CaptionRewriter, RewrittenCaption, DEFAULT_MIN_REWRITE_LEN};
pub use tokens::unique_groups;
pub use types::*;
pub use words::{words, Word, Words};

pub use data_contracts::{GroundingTarget, Span, TokenGroup, ValidationError};
