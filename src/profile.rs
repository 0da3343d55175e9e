//! Serializable recolor profiles.
//!
//! A [`RecolorProfile`] describes a whole variant set in a JSON-friendly form:
//! colors are hex strings, variant names may be strings or integers, and a
//! table entry maps to either a hex color or a hue number.
//!
//! # Example
//!
//! ```
//! use sprite_recolor::{RecolorProfile, VariantSettings};
//!
//! let profile = RecolorProfile::new()
//!     .with_static_colors(["#000000"])
//!     .with_variant(VariantSettings::uniform_hue("fire", 20.0))
//!     .with_variant(VariantSettings::table("ice", [("#ff0000", "#00ffff")]));
//!
//! let json = profile.to_json().unwrap();
//! let restored = RecolorProfile::from_json(&json).unwrap();
//! let recolorer = restored.recolorer().unwrap();
//! assert_eq!(recolorer.lookup().len(), 2);
//! ```

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::color::{Color, hex_to_color};
use crate::error::RecolorError;
use crate::recolorer::{Recolorer, RemapOptions};
use crate::variant::{Hue, StaticColors, Target, VariantName, VariantSpec};

// ============================================================================
// Serializable Pieces
// ============================================================================

/// A variant name as written in JSON: a string or an integer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(untagged)]
pub enum SerializableName {
    Number(i64),
    Text(String),
}

impl From<&SerializableName> for VariantName {
    fn from(name: &SerializableName) -> Self {
        match name {
            SerializableName::Number(n) => VariantName::from(*n),
            SerializableName::Text(s) => VariantName::from(s.as_str()),
        }
    }
}

impl From<&str> for SerializableName {
    fn from(name: &str) -> Self {
        Self::Text(name.to_string())
    }
}

impl From<i64> for SerializableName {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

/// A table target as written in JSON: a hue number or a hex color string.
///
/// ```json
/// { "#ff0000": "#00ffff", "#00ff00": 200 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(untagged)]
pub enum SerializableTarget {
    Hue(f32),
    Color(String),
}

impl SerializableTarget {
    fn to_target(&self) -> Result<Target, RecolorError> {
        Ok(match self {
            Self::Hue(degrees) => Target::Hue(Hue::new(*degrees)),
            Self::Color(hex) => Target::Color(hex_to_color(hex)?),
        })
    }
}

impl From<&str> for SerializableTarget {
    fn from(hex: &str) -> Self {
        Self::Color(hex.to_string())
    }
}

impl From<f32> for SerializableTarget {
    fn from(degrees: f32) -> Self {
        Self::Hue(degrees)
    }
}

impl From<Target> for SerializableTarget {
    fn from(target: Target) -> Self {
        match target {
            Target::Color(color) => Self::Color(color.to_hex()),
            Target::Hue(hue) => Self::Hue(hue.degrees()),
        }
    }
}

// ============================================================================
// VariantSettings
// ============================================================================

/// Serializable settings for one variant.
///
/// Exactly one of `hue` and `colors` must be set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct VariantSettings {
    /// Variant name, used to key outputs and prior images.
    pub name: SerializableName,

    /// Uniform hue in degrees applied to every non-static pixel.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hue: Option<f32>,

    /// Source hex color to target color or hue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colors: Option<BTreeMap<String, SerializableTarget>>,
}

impl VariantSettings {
    pub fn uniform_hue(name: impl Into<SerializableName>, degrees: f32) -> Self {
        Self {
            name: name.into(),
            hue: Some(degrees),
            colors: None,
        }
    }

    pub fn table<K, T>(
        name: impl Into<SerializableName>,
        entries: impl IntoIterator<Item = (K, T)>,
    ) -> Self
    where
        K: Into<String>,
        T: Into<SerializableTarget>,
    {
        Self {
            name: name.into(),
            hue: None,
            colors: Some(
                entries
                    .into_iter()
                    .map(|(source, target)| (source.into(), target.into()))
                    .collect(),
            ),
        }
    }

    /// Converts a typed spec back into settings.
    pub fn from_spec(name: &VariantName, spec: &VariantSpec) -> Self {
        let name = SerializableName::Text(name.to_string());
        match spec {
            VariantSpec::UniformHue(hue) => Self::uniform_hue(name, hue.degrees()),
            VariantSpec::ColorTable(table) => Self::table(
                name,
                table
                    .iter()
                    .map(|(source, target)| (source.with_alpha(255).to_hex(), *target)),
            ),
        }
    }

    /// Parses these settings into a typed name and spec.
    pub fn to_spec(&self) -> Result<(VariantName, VariantSpec), RecolorError> {
        let name = VariantName::from(&self.name);
        let spec = match (self.hue, &self.colors) {
            (Some(degrees), None) => VariantSpec::UniformHue(Hue::new(degrees)),
            (None, Some(colors)) => VariantSpec::ColorTable(
                colors
                    .iter()
                    .map(|(source, target)| {
                        Ok((hex_to_color(source)?.with_alpha(255), target.to_target()?))
                    })
                    .collect::<Result<_, RecolorError>>()?,
            ),
            (Some(_), Some(_)) => {
                return Err(RecolorError::InvalidVariant {
                    name: name.to_string(),
                    reason: "has both a hue and a color table",
                });
            }
            (None, None) => {
                return Err(RecolorError::InvalidVariant {
                    name: name.to_string(),
                    reason: "needs either a hue or a color table",
                });
            }
        };
        Ok((name, spec))
    }
}

// ============================================================================
// RecolorProfile
// ============================================================================

/// A serializable description of a full variant set.
///
/// # JSON Format
///
/// ```json
/// {
///   "staticColors": ["#000000", "#ffffff"],
///   "ignoreMissing": false,
///   "variants": [
///     { "name": "fire", "hue": 20 },
///     { "name": 2, "colors": { "#ff0000": "#00ffff", "#00ff00": 200 } }
///   ]
/// }
/// ```
///
/// Leaving out `staticColors` lets unmapped colors pass through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct RecolorProfile {
    /// Colors never remapped. `None` means no static set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_colors: Option<Vec<String>>,

    /// Leave unmapped pixels transparent instead of failing.
    #[serde(default, skip_serializing_if = "is_false")]
    pub ignore_missing: bool,

    /// Variants in output order.
    #[serde(default)]
    pub variants: Vec<VariantSettings>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl RecolorProfile {
    /// Creates an empty profile with no variants and no static set.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_static_colors<S: Into<String>>(
        mut self,
        colors: impl IntoIterator<Item = S>,
    ) -> Self {
        self.static_colors = Some(colors.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_ignore_missing(mut self, ignore: bool) -> Self {
        self.ignore_missing = ignore;
        self
    }

    pub fn with_variant(mut self, variant: VariantSettings) -> Self {
        self.variants.push(variant);
        self
    }

    /// Builds a profile from typed variants and static colors.
    pub fn from_specs(
        variants: &[(VariantName, VariantSpec)],
        static_colors: Option<&[Color]>,
    ) -> Self {
        Self {
            static_colors: static_colors
                .map(|colors| colors.iter().map(|c| c.with_alpha(255).to_hex()).collect()),
            ignore_missing: false,
            variants: variants
                .iter()
                .map(|(name, spec)| VariantSettings::from_spec(name, spec))
                .collect(),
        }
    }

    /// Parses all variants into typed specs, in order.
    ///
    /// Names must be unique: each one keys an output and its prior image.
    pub fn variant_specs(&self) -> Result<Vec<(VariantName, VariantSpec)>, RecolorError> {
        let mut seen = HashSet::new();
        self.variants
            .iter()
            .map(|settings| {
                let (name, spec) = settings.to_spec()?;
                if !seen.insert(name.clone()) {
                    return Err(RecolorError::InvalidVariant {
                        name: name.to_string(),
                        reason: "is declared more than once",
                    });
                }
                Ok((name, spec))
            })
            .collect()
    }

    /// Parses the static color list, if present.
    pub fn static_color_set(&self) -> Result<Option<StaticColors>, RecolorError> {
        self.static_colors
            .as_ref()
            .map(|colors| {
                colors
                    .iter()
                    .map(|hex| hex_to_color(hex))
                    .collect::<Result<StaticColors, _>>()
            })
            .transpose()
    }

    /// Compiles the profile into a ready-to-use [`Recolorer`].
    pub fn recolorer(&self) -> Result<Recolorer, RecolorError> {
        Ok(Recolorer::new(
            &self.variant_specs()?,
            self.static_color_set()?,
        ))
    }

    /// Remap options carrying this profile's missing-color policy.
    pub fn remap_options(&self) -> RemapOptions {
        RemapOptions::new().with_ignore_missing(self.ignore_missing)
    }

    /// Serializes the profile to a JSON string.
    pub fn to_json(&self) -> Result<String, RecolorError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serializes the profile to a pretty-printed JSON string.
    pub fn to_json_pretty(&self) -> Result<String, RecolorError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserializes a profile from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, RecolorError> {
        Ok(serde_json::from_str(json)?)
    }
}

// ============================================================================
// Tests
// ============================================================================
