//! Marker state - per-point styling shared by the 2D and 3D plots
//!
//! Every point always carries a highlight (outline) color. When the point is
//! not selected by a slot the highlight equals the base color, so the outline
//! is invisible.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::dataset::Dataset;

/// Marker size of an unselected point
pub const DEFAULT_SIZE: f32 = 8.0;
/// Marker size of a point selected by either slot
pub const SELECTED_SIZE: f32 = 18.0;
/// Outline width drawn in the highlight color
pub const OUTLINE_WIDTH: f32 = 4.0;
pub const OPACITY: f32 = 1.0;

#[derive(Error, Debug, PartialEq)]
pub enum ColorError {
    #[error("Invalid color '{0}': expected #RRGGBB")]
    Invalid(String),
}

/// An opaque sRGB color written as `#RRGGBB`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl HexColor {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn parse(s: &str) -> Result<Self, ColorError> {
        let hex = s
            .strip_prefix('#')
            .filter(|h| h.len() == 6 && h.is_ascii())
            .ok_or_else(|| ColorError::Invalid(s.to_string()))?;
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| ColorError::Invalid(s.to_string()))
        };
        Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for HexColor {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<HexColor> for String {
    fn from(c: HexColor) -> Self {
        c.to_string()
    }
}

/// Parallel per-point style arrays for one series
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerStyle {
    size: Vec<f32>,
    base_color: Vec<HexColor>,
    highlight_color: Vec<HexColor>,
}

impl MarkerStyle {
    /// Uniform style: every point in `color`, default size, no visible highlight
    pub fn uniform(len: usize, color: HexColor) -> Self {
        Self {
            size: vec![DEFAULT_SIZE; len],
            base_color: vec![color; len],
            highlight_color: vec![color; len],
        }
    }

    pub fn len(&self) -> usize {
        self.size.len()
    }

    pub fn size(&self, point: usize) -> Option<f32> {
        self.size.get(point).copied()
    }

    pub fn base_color(&self, point: usize) -> Option<HexColor> {
        self.base_color.get(point).copied()
    }

    pub fn highlight_color(&self, point: usize) -> Option<HexColor> {
        self.highlight_color.get(point).copied()
    }

    pub fn sizes(&self) -> &[f32] {
        &self.size
    }

    pub fn base_colors(&self) -> &[HexColor] {
        &self.base_color
    }

    pub fn highlight_colors(&self) -> &[HexColor] {
        &self.highlight_color
    }

    /// Whether the outline of `point` is currently visible
    pub fn is_highlighted(&self, point: usize) -> bool {
        self.base_color.get(point) != self.highlight_color.get(point)
    }

    /// Outline `point` in `color` and enlarge it. Returns false if out of range.
    pub(crate) fn highlight(&mut self, point: usize, color: HexColor) -> bool {
        match (self.highlight_color.get_mut(point), self.size.get_mut(point)) {
            (Some(h), Some(s)) => {
                *h = color;
                *s = SELECTED_SIZE;
                true
            }
            _ => false,
        }
    }

    /// Hide the outline of `point` and restore the default size
    pub(crate) fn restore(&mut self, point: usize) -> bool {
        let base = match self.base_color.get(point) {
            Some(&c) => c,
            None => return false,
        };
        self.highlight_color[point] = base;
        self.size[point] = DEFAULT_SIZE;
        true
    }
}

/// Marker styles for every series of a dataset, indexed like the dataset
#[derive(Debug, Clone, PartialEq)]
pub struct Markers {
    series: Vec<MarkerStyle>,
}

impl Markers {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let series = dataset
            .series()
            .iter()
            .map(|s| MarkerStyle::uniform(s.len(), s.color))
            .collect();
        Self { series }
    }

    #[cfg(test)]
    pub fn get(&self, series: usize) -> Option<&MarkerStyle> {
        self.series.get(series)
    }

    pub(crate) fn get_mut(&mut self, series: usize) -> Option<&mut MarkerStyle> {
        self.series.get_mut(series)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MarkerStyle> {
        self.series.iter()
    }

    /// Count of points whose outline is currently visible
    pub fn highlighted_count(&self) -> usize {
        self.series
            .iter()
            .map(|m| (0..m.len()).filter(|&i| m.is_highlighted(i)).count())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(HexColor::parse("#1496BB").unwrap(), HexColor::rgb(0x14, 0x96, 0xBB));
        assert_eq!(HexColor::parse("#ff002b").unwrap(), HexColor::rgb(0xFF, 0x00, 0x2B));
        assert!(HexColor::parse("1496BB").is_err());
        assert!(HexColor::parse("#12345").is_err());
        assert!(HexColor::parse("#GG0000").is_err());
    }

    #[test]
    fn test_display_is_uppercase_hex() {
        assert_eq!(HexColor::rgb(0x32, 0xCD, 0x32).to_string(), "#32CD32");
    }

    #[test]
    fn test_highlight_then_restore() {
        let red = HexColor::rgb(255, 0, 0);
        let blue = HexColor::rgb(0, 0, 255);
        let mut style = MarkerStyle::uniform(3, red);
        assert!(!style.is_highlighted(1));

        assert!(style.highlight(1, blue));
        assert_eq!(style.highlight_color(1), Some(blue));
        assert_eq!(style.size(1), Some(SELECTED_SIZE));
        assert_eq!(style.base_color(1), Some(red));
        assert!(style.is_highlighted(1));

        assert!(style.restore(1));
        assert_eq!(style.highlight_color(1), Some(red));
        assert_eq!(style.size(1), Some(DEFAULT_SIZE));
        assert!(!style.is_highlighted(1));
    }

    #[test]
    fn test_out_of_range_is_rejected() {
        let mut style = MarkerStyle::uniform(2, HexColor::rgb(0, 0, 0));
        assert!(!style.highlight(2, HexColor::rgb(1, 1, 1)));
        assert!(!style.restore(5));
        assert_eq!(style.len(), 2);
    }
}
