//! Label text measurement and drawing

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Fonts tried, in order, when no font is configured
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "/Library/Fonts/Arial.ttf",
];

/// Font used for label plates.
///
/// Without glyphs the font still measures text (from fixed per-character
/// metrics) so plates keep a sensible size; only the text itself is skipped.
pub struct LabelFont {
    font: Option<FontVec>,
    size: f32,
}

impl LabelFont {
    /// Load `path`, or the first available system font when `path` is `None`
    pub fn load(path: Option<&Path>, size: f32) -> Self {
        let candidates: Vec<PathBuf> = match path {
            Some(p) => vec![p.to_path_buf()],
            None => SYSTEM_FONTS.iter().map(PathBuf::from).collect(),
        };

        for candidate in &candidates {
            let Ok(bytes) = std::fs::read(candidate) else {
                continue;
            };
            match FontVec::try_from_vec(bytes) {
                Ok(font) => {
                    info!("Label font loaded from {:?}", candidate);
                    return Self { font: Some(font), size };
                }
                Err(e) => warn!("{:?} is not a usable font: {}", candidate, e),
            }
        }

        Self::without_glyphs(size)
    }

    /// A font that only measures
    pub fn without_glyphs(size: f32) -> Self {
        Self { font: None, size }
    }

    pub fn has_glyphs(&self) -> bool {
        self.font.is_some()
    }

    fn scale(&self) -> PxScale {
        PxScale::from(self.size)
    }

    /// Rendered (width, height) of `text` in pixels
    pub fn measure(&self, text: &str) -> (u32, u32) {
        match &self.font {
            Some(font) => text_size(self.scale(), font, text),
            None => {
                let chars = text.chars().count() as f32;
                (
                    (chars * self.size * 0.55).round() as u32,
                    (self.size * 0.7).round().max(1.0) as u32,
                )
            }
        }
    }

    /// Draw `text` with its top-left corner at (x, y)
    pub fn draw(&self, image: &mut RgbImage, color: Rgb<u8>, x: i32, y: i32, text: &str) {
        if let Some(font) = &self.font {
            draw_text_mut(image, color, x, y, self.scale(), font, text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_metrics_grow_with_text() {
        let font = LabelFont::without_glyphs(20.0);
        assert!(!font.has_glyphs());

        let (short_w, short_h) = font.measure("MILKU");
        let (long_w, long_h) = font.measure("FRUIT TEA");
        assert_eq!((short_w, short_h), (55, 14));
        assert!(long_w > short_w);
        assert_eq!(long_h, short_h);
    }

    #[test]
    fn test_missing_font_path_degrades() {
        let font = LabelFont::load(Some(Path::new("/nonexistent/font.ttf")), 20.0);
        assert!(!font.has_glyphs());
        assert_eq!(font.measure("GOLDA"), (55, 14));
    }

    #[test]
    fn test_draw_without_glyphs_leaves_image_untouched() {
        let font = LabelFont::without_glyphs(20.0);
        let mut image = RgbImage::new(50, 50);
        font.draw(&mut image, Rgb([255, 255, 255]), 5, 5, "GOLDA");
        assert!(image.pixels().all(|p| *p == Rgb([0, 0, 0])));
    }
}
