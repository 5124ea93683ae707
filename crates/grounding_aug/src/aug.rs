//! Label-preserving augmentations for grounding samples.
//!
//! [`Augmenter`] owns the lexicon and every transform parameter. Each method applies
//! exactly one transform; deciding which to run and when is left to the caller.

use crate::config::AugConfig;
use crate::flip::{text_conditioned_hflip, MirrorImage};
use crate::lexicon::DirectionalLexicon;
use crate::types::{AugResult, FlipDecision, GroundingSample};
use image::RgbImage;
use rand::Rng;

pub const DEFAULT_COLOR_KEYWORDS: &[&str] = &[
    "white", "yellow", "blue", "red", "green", "black", "brown", "azure", "ivory", "teal",
    "silver", "purple", "gray", "orange", "maroon", "pink",
];

/// Max attempts to place an erase rectangle before giving up.
const ERASE_ATTEMPTS: usize = 10;

#[derive(Debug, Clone)]
pub struct Augmenter {
    cfg: AugConfig,
}

impl Default for Augmenter {
    fn default() -> Self {
        Self {
            cfg: AugConfig::default(),
        }
    }
}

impl Augmenter {
    /// Validate `cfg` and wrap it. Fails on ranges the samplers cannot draw from.
    pub fn from_config(cfg: AugConfig) -> AugResult<Self> {
        cfg.validate()?;
        let aug = Self { cfg };
        tracing::debug!(config = %aug.describe(), "augmenter ready");
        Ok(aug)
    }

    pub fn config(&self) -> &AugConfig {
        &self.cfg
    }

    pub fn lexicon(&self) -> &DirectionalLexicon {
        &self.cfg.lexicon
    }

    pub fn describe(&self) -> String {
        let c = &self.cfg;
        format!(
            "lexicon={}+{} min_rewrite_len={} jitter=[brightness {:.2} hue {:.2}] color_keywords={} erase=[scale {:.2}..{:.2} ratio {:.2}..{:.2}] pixel_mask={:.2} blur_sigma={:.2}..{:.2}",
            c.lexicon.left_words().count(),
            c.lexicon.right_words().count(),
            c.min_rewrite_len,
            c.jitter_brightness,
            c.jitter_hue,
            c.color_keywords.len(),
            c.erase_scale.0,
            c.erase_scale.1,
            c.erase_ratio.0,
            c.erase_ratio.1,
            c.pixel_mask_threshold,
            c.blur_sigma.0,
            c.blur_sigma.1,
        )
    }

    /// Text-conditioned horizontal flip; see [`text_conditioned_hflip`].
    pub fn hflip<I: MirrorImage>(
        &self,
        sample: GroundingSample<I>,
    ) -> AugResult<(GroundingSample<I>, FlipDecision)> {
        text_conditioned_hflip(sample, &self.cfg.lexicon, self.cfg.min_rewrite_len)
    }

    /// Brightness/hue jitter, skipped when the caption names a color. Returns whether
    /// the image was changed.
    pub fn color_jitter(&self, sample: &mut GroundingSample, rng: &mut dyn rand::RngCore) -> bool {
        if caption_names_color(&sample.target.caption, &self.cfg.color_keywords) {
            tracing::debug!("color jitter skipped: caption names a color");
            return false;
        }
        color_jitter(
            &mut sample.image,
            self.cfg.jitter_brightness,
            self.cfg.jitter_hue,
            rng,
        );
        true
    }

    /// Zero out one random rectangle. Returns whether a rectangle fit.
    pub fn block_mask(&self, sample: &mut GroundingSample, rng: &mut dyn rand::RngCore) -> bool {
        block_mask(
            &mut sample.image,
            self.cfg.erase_scale,
            self.cfg.erase_ratio,
            rng,
        )
    }

    pub fn pixel_mask(&self, sample: &mut GroundingSample, rng: &mut dyn rand::RngCore) {
        pixel_mask(&mut sample.image, self.cfg.pixel_mask_threshold, rng);
    }

    pub fn gaussian_blur(&self, sample: &mut GroundingSample, rng: &mut dyn rand::RngCore) {
        gaussian_blur(&mut sample.image, self.cfg.blur_sigma, rng);
    }
}

#[derive(Debug, Clone, Default)]
pub struct AugmenterBuilder {
    inner: AugConfig,
}

impl AugmenterBuilder {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn lexicon(mut self, lexicon: DirectionalLexicon) -> Self {
        self.inner.lexicon = lexicon;
        self
    }
    pub fn min_rewrite_len(mut self, len: usize) -> Self {
        self.inner.min_rewrite_len = len;
        self
    }
    pub fn color_jitter(mut self, brightness: f32, hue: f32) -> Self {
        self.inner.jitter_brightness = brightness;
        self.inner.jitter_hue = hue;
        self
    }
    pub fn color_keywords<S: Into<String>>(mut self, words: impl IntoIterator<Item = S>) -> Self {
        self.inner.color_keywords = words.into_iter().map(Into::into).collect();
        self
    }
    pub fn block_mask(mut self, scale: (f32, f32), ratio: (f32, f32)) -> Self {
        self.inner.erase_scale = scale;
        self.inner.erase_ratio = ratio;
        self
    }
    pub fn pixel_mask(mut self, scale_threshold: f32) -> Self {
        self.inner.pixel_mask_threshold = scale_threshold;
        self
    }
    pub fn blur_sigma(mut self, min: f32, max: f32) -> Self {
        self.inner.blur_sigma = (min, max);
        self
    }
    pub fn build(self) -> AugResult<Augmenter> {
        Augmenter::from_config(self.inner)
    }
}

/// Whitespace-separated, case-sensitive match against the color keywords.
pub fn caption_names_color(caption: &str, keywords: &[String]) -> bool {
    caption
        .split_whitespace()
        .any(|word| keywords.iter().any(|k| k == word))
}

/// Scale brightness by a factor in [1 - brightness, 1 + brightness] and rotate hue by
/// up to `hue` of a full turn.
pub fn color_jitter(img: &mut RgbImage, brightness: f32, hue: f32, rng: &mut dyn rand::RngCore) {
    let factor = if brightness > 0.0 {
        1.0 + rng.random_range(-brightness..=brightness)
    } else {
        1.0
    };
    let shift = if hue > 0.0 {
        rng.random_range(-hue..=hue)
    } else {
        0.0
    };
    for pixel in img.pixels_mut() {
        let rgb = [
            pixel[0] as f32 / 255.0,
            pixel[1] as f32 / 255.0,
            pixel[2] as f32 / 255.0,
        ];
        let (h, s, v) = rgb_to_hsv(rgb);
        let h = (h + shift).rem_euclid(1.0);
        let out = hsv_to_rgb(h, s, (v * factor).clamp(0.0, 1.0));
        for c in 0..3 {
            pixel[c] = (out[c] * 255.0).round() as u8;
        }
    }
}

/// Random erasing: one zero-filled rectangle covering `scale` of the area with aspect
/// ratio in `ratio` (sampled in log space).
pub fn block_mask(
    img: &mut RgbImage,
    scale: (f32, f32),
    ratio: (f32, f32),
    rng: &mut dyn rand::RngCore,
) -> bool {
    let (w, h) = img.dimensions();
    let area = pixel_area(w, h);
    let log_ratio = (ratio.0.ln(), ratio.1.ln());
    for _ in 0..ERASE_ATTEMPTS {
        let erase_area = area * rng.random_range(scale.0..=scale.1);
        let aspect = rng.random_range(log_ratio.0..=log_ratio.1).exp();
        let eh = (erase_area * aspect).sqrt().round() as u32;
        let ew = (erase_area / aspect).sqrt().round() as u32;
        if eh == 0 || ew == 0 || eh >= h || ew >= w {
            continue;
        }
        let top = rng.random_range(0..=h - eh);
        let left = rng.random_range(0..=w - ew);
        for y in top..top + eh {
            for x in left..left + ew {
                img.put_pixel(x, y, image::Rgb([0, 0, 0]));
            }
        }
        return true;
    }
    false
}

/// `w * h` without overflowing `u32` on very large images.
fn pixel_area(w: u32, h: u32) -> f32 {
    w as f32 * h as f32
}

/// Keep each channel value with probability `1 - scale_threshold`, zero it otherwise.
pub fn pixel_mask(img: &mut RgbImage, scale_threshold: f32, rng: &mut dyn rand::RngCore) {
    let keep = f64::from((1.0 - scale_threshold).clamp(0.0, 1.0));
    for v in img.iter_mut() {
        if !rng.random_bool(keep) {
            *v = 0;
        }
    }
}

pub fn gaussian_blur(img: &mut RgbImage, sigma: (f32, f32), rng: &mut dyn rand::RngCore) {
    let s = rng.random_range(sigma.0..=sigma.1);
    *img = image::imageops::blur(img, s);
}

fn rgb_to_hsv([r, g, b]: [f32; 3]) -> (f32, f32, f32) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;
    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        ((g - b) / delta).rem_euclid(6.0) / 6.0
    } else if max == g {
        ((b - r) / delta + 2.0) / 6.0
    } else {
        ((r - g) / delta + 4.0) / 6.0
    };
    let s = if max == 0.0 { 0.0 } else { delta / max };
    (h, s, max)
}

fn hsv_to_rgb(h: f32, s: f32, v: f32) -> [f32; 3] {
    let c = v * s;
    let hp = h * 6.0;
    let x = c * (1.0 - (hp.rem_euclid(2.0) - 1.0).abs());
    let (r, g, b) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = v - c;
    [r + m, g + m, b + m]
}
