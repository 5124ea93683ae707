//! Shared data contracts for grounding samples.

pub mod grounding;

pub use grounding::{GroundingTarget, Span, TokenGroup, ValidationError};
