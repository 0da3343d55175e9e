//! Error types for recoloring.

use thiserror::Error;

/// Errors produced while parsing colors, compiling profiles or remapping images.
#[derive(Debug, Error)]
pub enum RecolorError {
    /// A hex string did not decompose into three or four whole byte-pairs.
    #[error("Invalid color format: {input:?} (expected #rrggbb or #rrggbbaa)")]
    InvalidColorFormat { input: String },

    /// One or more pixels had no applicable rule in one or more variants.
    ///
    /// Both lists are de-duplicated and keep first-seen order.
    #[error(
        "{}missing color mappings for {} in variants {}",
        .image.as_deref().map(|name| format!("{name}: ")).unwrap_or_default(),
        .colors.join(", "),
        .variants.join(", ")
    )]
    MissingColorMapping {
        image: Option<String>,
        colors: Vec<String>,
        variants: Vec<String>,
    },

    /// A profile variant is neither a uniform hue nor a color table.
    #[error("Invalid variant {name}: {reason}")]
    InvalidVariant { name: String, reason: &'static str },

    /// Profile JSON could not be parsed or produced.
    #[error("Profile error: {0}")]
    Profile(#[from] serde_json::Error),
}
