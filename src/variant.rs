//! Variant descriptions: what each output image should look like.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::color::Color;

// ============================================================================
// Hue
// ============================================================================

/// A target hue in degrees, normalized to `[0, 360)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hue(f32);

impl Hue {
    /// Creates a hue, wrapping the angle into `[0, 360)`.
    pub fn new(degrees: f32) -> Self {
        let wrapped = degrees.rem_euclid(360.0);
        // rem_euclid can round up to exactly 360 for tiny negative inputs
        Self(if wrapped >= 360.0 { 0.0 } else { wrapped })
    }

    pub fn degrees(self) -> f32 {
        self.0
    }
}

impl From<f32> for Hue {
    fn from(degrees: f32) -> Self {
        Self::new(degrees)
    }
}

// ============================================================================
// VariantName
// ============================================================================

/// Identifies one output variant.
///
/// The name carries no meaning for the engine; it keys results and prior
/// images and appears in diagnostics. Integer names are kept in decimal form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariantName(String);

impl VariantName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for VariantName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for VariantName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl From<i64> for VariantName {
    fn from(index: i64) -> Self {
        Self(index.to_string())
    }
}

impl From<u32> for VariantName {
    fn from(index: u32) -> Self {
        Self(index.to_string())
    }
}

impl fmt::Display for VariantName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// VariantSpec
// ============================================================================

/// What a table entry maps a source color to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Target {
    /// Replace with this color, keeping the source pixel's alpha.
    Color(Color),
    /// Rotate the source pixel to this hue. Hue 0 rotates to red, it is not a no-op.
    Hue(Hue),
}

impl From<Color> for Target {
    fn from(color: Color) -> Self {
        Self::Color(color)
    }
}

impl From<Hue> for Target {
    fn from(hue: Hue) -> Self {
        Self::Hue(hue)
    }
}

/// The recoloring rule for one variant.
#[derive(Debug, Clone, PartialEq)]
pub enum VariantSpec {
    /// Rotate every non-static pixel to this hue. Hue 0 rotates to red, it is not a no-op.
    UniformHue(Hue),
    /// Remap listed source colors. Keys are matched on RGB only.
    ColorTable(HashMap<Color, Target>),
}

impl VariantSpec {
    pub fn uniform_hue(degrees: f32) -> Self {
        Self::UniformHue(Hue::new(degrees))
    }

    /// Builds a color table from `(source, target)` pairs.
    ///
    /// Later pairs win when two sources share the same RGB.
    pub fn table<T: Into<Target>>(entries: impl IntoIterator<Item = (Color, T)>) -> Self {
        Self::ColorTable(
            entries
                .into_iter()
                .map(|(source, target)| (source.with_alpha(255), target.into()))
                .collect(),
        )
    }
}

// ============================================================================
// StaticColors
// ============================================================================

/// Colors copied verbatim into every variant.
///
/// Supplying a set, even an empty one, also switches the engine from
/// passthrough to strict handling of colors no variant rule covers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticColors {
    keys: HashSet<u32>,
}

impl StaticColors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a color. Alpha is ignored.
    pub fn insert(&mut self, color: Color) -> bool {
        self.keys.insert(color.key())
    }

    /// Checks an RGB key as produced by [`Color::key`].
    pub fn contains_key(&self, key: u32) -> bool {
        self.keys.contains(&key)
    }

    pub fn contains(&self, color: Color) -> bool {
        self.contains_key(color.key())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl FromIterator<Color> for StaticColors {
    fn from_iter<I: IntoIterator<Item = Color>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().map(Color::key).collect(),
        }
    }
}
