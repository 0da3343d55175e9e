//! Color representation and color math.
//!
//! Colors are stored packed into a `u32` (red in the low byte, alpha in the
//! high byte) so table lookups and buffer writes stay cheap. HSL conversions
//! go through the `palette` crate and use the conventional external units:
//! hue in degrees, saturation and lightness in percent.

use std::fmt;
use std::str::FromStr;

use image::Rgba;
use palette::{Hsl, IntoColor, Srgb};

use crate::error::RecolorError;

// ============================================================================
// Color
// ============================================================================

/// A packed RGBA color.
///
/// Equality and hashing compare all four channels. Use [`Color::key`] when
/// alpha must be ignored, as palette lookups do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color(u32);

impl Color {
    /// Fully transparent black, the value of a freshly allocated pixel.
    pub const TRANSPARENT: Self = Self(0);

    /// Mask selecting the RGB bytes of a packed color.
    const RGB_MASK: u32 = 0x00ff_ffff;

    pub const fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(u32::from_le_bytes([r, g, b, a]))
    }

    /// Creates a fully opaque color.
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::from_rgba(r, g, b, 255)
    }

    pub const fn from_packed(packed: u32) -> Self {
        Self(packed)
    }

    pub const fn packed(self) -> u32 {
        self.0
    }

    /// Returns the `[r, g, b, a]` channels.
    pub const fn to_rgba(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }

    pub const fn r(self) -> u8 {
        self.to_rgba()[0]
    }

    pub const fn g(self) -> u8 {
        self.to_rgba()[1]
    }

    pub const fn b(self) -> u8 {
        self.to_rgba()[2]
    }

    pub const fn a(self) -> u8 {
        self.to_rgba()[3]
    }

    /// The RGB identity of this color with the alpha byte stripped.
    pub const fn key(self) -> u32 {
        self.0 & Self::RGB_MASK
    }

    /// Returns the same RGB with a different alpha.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self(self.key() | (a as u32) << 24)
    }

    /// Formats as `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(self) -> String {
        let [r, g, b, a] = self.to_rgba();
        rgb_to_hex(r.into(), g.into(), b.into(), Some(a.into()))
    }
}

impl From<Rgba<u8>> for Color {
    fn from(pixel: Rgba<u8>) -> Self {
        let [r, g, b, a] = pixel.0;
        Self::from_rgba(r, g, b, a)
    }
}

impl From<Color> for Rgba<u8> {
    fn from(color: Color) -> Self {
        Rgba(color.to_rgba())
    }
}

impl FromStr for Color {
    type Err = RecolorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        hex_to_color(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// ============================================================================
// Hex
// ============================================================================

/// Parses `#rrggbb` or `#rrggbbaa` into a color.
///
/// The leading `#` is optional. A missing alpha byte means fully opaque.
pub fn hex_to_color(hex: &str) -> Result<Color, RecolorError> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    let invalid = || RecolorError::InvalidColorFormat {
        input: hex.to_string(),
    };

    if !matches!(digits.len(), 6 | 8) || !digits.bytes().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let mut channels = [0, 0, 0, 255];
    for (i, channel) in channels.iter_mut().enumerate().take(digits.len() / 2) {
        *channel = u8::from_str_radix(&digits[i * 2..i * 2 + 2], 16).map_err(|_| invalid())?;
    }

    let [r, g, b, a] = channels;
    Ok(Color::from_rgba(r, g, b, a))
}

/// Formats channels as a lower-case hex string.
///
/// Channels are rounded to the nearest integer and clamped to a byte. The
/// alpha byte is appended only when present and not fully opaque.
pub fn rgb_to_hex(r: f32, g: f32, b: f32, a: Option<f32>) -> String {
    let mut hex = format!("#{:02x}{:02x}{:02x}", to_byte(r), to_byte(g), to_byte(b));
    if let Some(a) = a.map(to_byte).filter(|&a| a != 255) {
        hex.push_str(&format!("{a:02x}"));
    }
    hex
}

fn to_byte(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

// ============================================================================
// HSL
// ============================================================================

/// Converts RGB bytes to `(hue, saturation, lightness)`.
///
/// Hue is in degrees `[0, 360)`, saturation and lightness in percent. Grays
/// have hue 0 and saturation 0.
pub fn rgb_to_hsl(r: u8, g: u8, b: u8) -> (f32, f32, f32) {
    if r == g && g == b {
        return (0.0, 0.0, f32::from(r) / 255.0 * 100.0);
    }

    let rgb = Srgb::new(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
    );
    let hsl: Hsl = rgb.into_color();
    (
        hsl.hue.into_positive_degrees(),
        hsl.saturation * 100.0,
        hsl.lightness * 100.0,
    )
}

/// Converts `(hue, saturation, lightness)` back to RGB bytes.
///
/// Takes the same units as [`rgb_to_hsl`] returns. Channels are rounded to the
/// nearest byte.
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> (u8, u8, u8) {
    let hsl: Hsl = Hsl::new(
        h,
        (s / 100.0).clamp(0.0, 1.0),
        (l / 100.0).clamp(0.0, 1.0),
    );
    let rgb: Srgb = hsl.into_color();
    (
        to_byte(rgb.red * 255.0),
        to_byte(rgb.green * 255.0),
        to_byte(rgb.blue * 255.0),
    )
}

/// Replaces the hue of `color`, keeping its saturation, lightness and alpha.
///
/// Only the hue is discarded, so shading and highlights survive and a single
/// hue recolors a whole shaded sprite coherently.
pub fn rotate_hue(color: Color, hue: f32) -> Color {
    let [r, g, b, a] = color.to_rgba();
    let (_, s, l) = rgb_to_hsl(r, g, b);
    let (r, g, b) = hsl_to_rgb(hue, s, l);
    Color::from_rgba(r, g, b, a)
}

// ============================================================================
// Tests
// ============================================================================
