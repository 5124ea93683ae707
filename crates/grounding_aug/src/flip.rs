//! Text-conditioned horizontal flip.

use crate::gate;
use crate::lexicon::DirectionalLexicon;
use crate::rewrite::CaptionRewriter;
use crate::types::{AugResult, FlipDecision, GroundingSample};
use image::{DynamicImage, GenericImageView, ImageBuffer, Pixel};

/// Pixel-level mirror used by the flip. Implemented for `image` buffers.
pub trait MirrorImage: Sized {
    fn width(&self) -> u32;
    /// Reverse every row.
    fn mirror(self) -> Self;
}

impl<P: Pixel> MirrorImage for ImageBuffer<P, Vec<P::Subpixel>> {
    fn width(&self) -> u32 {
        GenericImageView::width(self)
    }

    fn mirror(mut self) -> Self {
        image::imageops::flip_horizontal_in_place(&mut self);
        self
    }
}

impl MirrorImage for DynamicImage {
    fn width(&self) -> u32 {
        GenericImageView::width(self)
    }

    fn mirror(self) -> Self {
        self.fliph()
    }
}

/// Mirror pixel boxes about an image of the given width: x1' = W - x2, x2' = W - x1.
pub fn flip_boxes(boxes: &mut [[f32; 4]], width: f32) {
    for b in boxes.iter_mut() {
        let x1 = b[0];
        let x2 = b[2];
        b[0] = width - x2;
        b[2] = width - x1;
    }
}

/// Horizontally flip a sample, rewriting left/right words in the caption when needed.
///
/// The target is validated first. The gate then picks one of three branches:
/// [`FlipDecision::Plain`] mirrors image and boxes only, [`FlipDecision::Skip`] returns
/// the sample untouched, and [`FlipDecision::Rewrite`] additionally rebuilds the caption
/// and remaps `tokens_positive`.
pub fn text_conditioned_hflip<I: MirrorImage>(
    sample: GroundingSample<I>,
    lexicon: &DirectionalLexicon,
    min_rewrite_len: usize,
) -> AugResult<(GroundingSample<I>, FlipDecision)> {
    let GroundingSample { image, mut target } = sample;
    target.validate()?;

    let decision = gate::decide(&target.caption, lexicon);
    tracing::debug!(
        decision = decision.as_str(),
        boxes = target.boxes.len(),
        "text-conditioned hflip"
    );

    if decision == FlipDecision::Rewrite {
        let (caption, tokens) = CaptionRewriter::new(lexicon, min_rewrite_len)
            .rewrite_tokens(&target.caption, &target.tokens_positive)?;
        target.caption = caption;
        target.tokens_positive = tokens;
    }

    let image = if decision.flips() {
        let width = image.width() as f32;
        flip_boxes(&mut target.boxes, width);
        image.mirror()
    } else {
        image
    };

    Ok((GroundingSample { image, target }, decision))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewrite::DEFAULT_MIN_REWRITE_LEN;
    use data_contracts::GroundingTarget;
    use image::{Rgb, RgbImage};

    fn striped(width: u32) -> RgbImage {
        let mut img = RgbImage::new(width, 2);
        for (x, _y, p) in img.enumerate_pixels_mut() {
            *p = Rgb([x as u8, 0, 0]);
        }
        img
    }

    #[test]
    fn boxes_mirror_about_width() {
        let mut boxes = vec![[10.0, 5.0, 30.0, 25.0]];
        flip_boxes(&mut boxes, 100.0);
        assert_eq!(boxes, vec![[70.0, 5.0, 90.0, 25.0]]);
        flip_boxes(&mut boxes, 100.0);
        assert_eq!(boxes, vec![[10.0, 5.0, 30.0, 25.0]]);
    }

    #[test]
    fn mirror_reverses_rows() {
        let img = striped(4).mirror();
        let row: Vec<u8> = (0..4).map(|x| img.get_pixel(x, 0)[0]).collect();
        assert_eq!(row, vec![3, 2, 1, 0]);
    }

    #[test]
    fn dynamic_image_mirrors_too() {
        let img = DynamicImage::ImageRgb8(striped(3)).mirror();
        assert_eq!(img.to_rgb8().get_pixel(0, 1)[0], 2);
    }

    #[test]
    fn skip_branch_leaves_everything() {
        let lex = DirectionalLexicon::default();
        let target = GroundingTarget::new("a leftover sandwich", vec![[0.0, 0.0, 1.0, 1.0]], vec![vec![(2, 10)]]);
        let sample = GroundingSample::new(striped(4), target.clone());
        let (out, decision) = text_conditioned_hflip(sample, &lex, DEFAULT_MIN_REWRITE_LEN).unwrap();
        assert_eq!(decision, FlipDecision::Skip);
        assert_eq!(out.target, target);
        assert_eq!(out.image, striped(4));
    }

    #[test]
    fn invalid_target_is_rejected_before_flipping() {
        let lex = DirectionalLexicon::default();
        let target = GroundingTarget::new("a red car", vec![[0.0, 0.0, 1.0, 1.0]], vec![]);
        let err = text_conditioned_hflip(GroundingSample::new(striped(4), target), &lex, 4).unwrap_err();
        assert!(matches!(err, crate::types::GroundingAugError::Validation(_)));
    }
}
