//! Per-class color assignment

use anyhow::{ensure, Result};
use image::Rgb;

/// Fixed ordered list of class colors.
///
/// Class `i` always gets `colors[i % len]`, so classes congruent modulo the
/// palette length share a color.
#[derive(Debug, Clone)]
pub struct Palette {
    colors: Vec<Rgb<u8>>,
}

impl Palette {
    /// Build a palette; at least one color is required
    pub fn new(colors: Vec<Rgb<u8>>) -> Result<Self> {
        ensure!(!colors.is_empty(), "palette needs at least one color");
        Ok(Self { colors })
    }

    /// Build a palette from `[r, g, b]` triples
    pub fn from_rgb(colors: &[[u8; 3]]) -> Result<Self> {
        Self::new(colors.iter().map(|&c| Rgb(c)).collect())
    }

    /// Color for a class index
    pub fn color_for(&self, class_index: usize) -> Rgb<u8> {
        self.colors[class_index % self.colors.len()]
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }
}
