use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::aug::DEFAULT_COLOR_KEYWORDS;
use crate::lexicon::{
    DirectionalLexicon, DEFAULT_LEFT_STEM, DEFAULT_LEFT_WORDS, DEFAULT_RIGHT_STEM,
    DEFAULT_RIGHT_WORDS,
};
use crate::rewrite::DEFAULT_MIN_REWRITE_LEN;
use crate::types::{AugResult, GroundingAugError};

const DEFAULT_CONFIG_NAME: &str = "grounding-aug.toml";
const CONFIG_ENV: &str = "GROUNDING_AUG_CONFIG";

/// Lexicon and transform parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct AugConfig {
    pub lexicon: DirectionalLexicon,
    /// Caption regions shorter than this (in chars) are never rewritten.
    pub min_rewrite_len: usize,
    /// Captions containing any of these words skip color jitter.
    pub color_keywords: Vec<String>,
    /// Brightness factor is drawn from [1 - b, 1 + b].
    pub jitter_brightness: f32,
    /// Hue shift is drawn from [-h, h], in turns.
    pub jitter_hue: f32,
    /// Erased area as a fraction of the image.
    pub erase_scale: (f32, f32),
    /// Aspect ratio range of the erased rectangle.
    pub erase_ratio: (f32, f32),
    /// Probability of zeroing each channel value.
    pub pixel_mask_threshold: f32,
    pub blur_sigma: (f32, f32),
}

impl Default for AugConfig {
    fn default() -> Self {
        Self {
            lexicon: DirectionalLexicon::default(),
            min_rewrite_len: DEFAULT_MIN_REWRITE_LEN,
            color_keywords: DEFAULT_COLOR_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            jitter_brightness: 0.5,
            jitter_hue: 0.3,
            erase_scale: (0.02, 0.33),
            erase_ratio: (0.3, 3.3),
            pixel_mask_threshold: 0.75,
            blur_sigma: (0.01, 1.0),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct AugConfigFile {
    lexicon: Option<LexiconSection>,
    flip: Option<FlipSection>,
    color_jitter: Option<ColorJitterSection>,
    block_mask: Option<BlockMaskSection>,
    pixel_mask: Option<PixelMaskSection>,
    blur: Option<BlurSection>,
}

#[derive(Debug, Deserialize, Default)]
struct LexiconSection {
    left_stem: Option<String>,
    right_stem: Option<String>,
    left: Option<Vec<String>>,
    right: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Default)]
struct FlipSection {
    min_rewrite_len: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
struct ColorJitterSection {
    brightness: Option<f32>,
    hue: Option<f32>,
    keywords: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Default)]
struct BlockMaskSection {
    scale: Option<[f32; 2]>,
    ratio: Option<[f32; 2]>,
}

#[derive(Debug, Deserialize, Default)]
struct PixelMaskSection {
    scale_threshold: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
struct BlurSection {
    sigma: Option<[f32; 2]>,
}

impl AugConfig {
    /// Load from `$GROUNDING_AUG_CONFIG`, else `grounding-aug.toml` in the working
    /// directory, else defaults.
    pub fn load() -> AugResult<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::from_path(Path::new(&path));
        }
        let path = Path::new(DEFAULT_CONFIG_NAME);
        if path.exists() {
            return Self::from_path(path);
        }
        tracing::debug!("no {DEFAULT_CONFIG_NAME} found; using defaults");
        Ok(Self::default())
    }

    pub fn from_path(path: &Path) -> AugResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| GroundingAugError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&raw, path)
    }

    pub fn from_toml_str(raw: &str) -> AugResult<Self> {
        Self::parse(raw, Path::new("<inline>"))
    }

    fn parse(raw: &str, path: &Path) -> AugResult<Self> {
        let file: AugConfigFile = toml::from_str(raw).map_err(|e| GroundingAugError::Toml {
            path: PathBuf::from(path),
            source: e,
        })?;
        let cfg = Self::from_file(file)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: AugConfigFile) -> AugResult<Self> {
        let defaults = Self::default();
        let lexicon = match file.lexicon {
            None => defaults.lexicon,
            Some(section) => {
                let owned = |words: &[&str]| words.iter().map(|w| w.to_string()).collect::<Vec<_>>();
                DirectionalLexicon::new(
                    section.left_stem.as_deref().unwrap_or(DEFAULT_LEFT_STEM),
                    section.right_stem.as_deref().unwrap_or(DEFAULT_RIGHT_STEM),
                    section.left.unwrap_or_else(|| owned(DEFAULT_LEFT_WORDS)),
                    section.right.unwrap_or_else(|| owned(DEFAULT_RIGHT_WORDS)),
                )?
            }
        };
        let flip = file.flip.unwrap_or_default();
        let jitter = file.color_jitter.unwrap_or_default();
        let erase = file.block_mask.unwrap_or_default();
        let mask = file.pixel_mask.unwrap_or_default();
        let blur = file.blur.unwrap_or_default();
        let pair = |v: Option<[f32; 2]>, d: (f32, f32)| v.map(|[a, b]| (a, b)).unwrap_or(d);

        Ok(Self {
            lexicon,
            min_rewrite_len: flip.min_rewrite_len.unwrap_or(defaults.min_rewrite_len),
            color_keywords: jitter.keywords.unwrap_or(defaults.color_keywords),
            jitter_brightness: jitter.brightness.unwrap_or(defaults.jitter_brightness),
            jitter_hue: jitter.hue.unwrap_or(defaults.jitter_hue),
            erase_scale: pair(erase.scale, defaults.erase_scale),
            erase_ratio: pair(erase.ratio, defaults.erase_ratio),
            pixel_mask_threshold: mask
                .scale_threshold
                .unwrap_or(defaults.pixel_mask_threshold),
            blur_sigma: pair(blur.sigma, defaults.blur_sigma),
        })
    }

    /// Reject parameter ranges the samplers cannot draw from.
    pub fn validate(&self) -> AugResult<()> {
        fn range(name: &str, (lo, hi): (f32, f32), min_exclusive: f32) -> AugResult<()> {
            if !(lo.is_finite() && hi.is_finite()) || lo <= min_exclusive || lo > hi {
                return Err(GroundingAugError::Config(format!(
                    "{name} range [{lo}, {hi}] must be finite, above {min_exclusive}, and ordered"
                )));
            }
            Ok(())
        }
        range("block_mask.scale", self.erase_scale, 0.0)?;
        range("block_mask.ratio", self.erase_ratio, 0.0)?;
        range("blur.sigma", self.blur_sigma, 0.0)?;
        if !(0.0..=1.0).contains(&self.pixel_mask_threshold) {
            return Err(GroundingAugError::Config(format!(
                "pixel_mask.scale_threshold {} outside [0, 1]",
                self.pixel_mask_threshold
            )));
        }
        if !(self.jitter_brightness.is_finite() && self.jitter_brightness >= 0.0)
            || !(self.jitter_hue.is_finite() && self.jitter_hue >= 0.0)
        {
            return Err(GroundingAugError::Config(
                "color_jitter brightness and hue must be finite and non-negative".to_string(),
            ));
        }
        Ok(())
    }
}
