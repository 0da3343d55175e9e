//! sprite-recolor: palette-driven recoloring of raster images
//!
//! This crate turns one source image into several recolored *variants*. Each
//! variant either rotates every pixel to a single hue, or remaps listed source
//! colors to fixed colors or hues. Static colors (outlines, highlights) are
//! protected in every variant, and variants identical to a previously
//! generated image are skipped.
//!
//! # Example
//!
//! ```
//! use image::{Rgba, RgbaImage};
//! use sprite_recolor::{
//!     remap, Color, RemapOptions, StaticColors, VariantName, VariantSpec,
//! };
//!
//! let mut sprite = RgbaImage::from_pixel(2, 1, Rgba([0, 0, 0, 255]));
//! sprite.put_pixel(1, 0, Rgba([0, 255, 0, 255]));
//!
//! let variants = vec![
//!     (VariantName::from("red"), VariantSpec::uniform_hue(0.0)),
//!     (
//!         VariantName::from("blue"),
//!         VariantSpec::table([(Color::from_rgb(0, 255, 0), Color::from_rgb(0, 0, 255))]),
//!     ),
//! ];
//! let outline: StaticColors = [Color::from_rgb(0, 0, 0)].into_iter().collect();
//!
//! let output = remap(&sprite, &variants, Some(&outline), None, &RemapOptions::new()).unwrap();
//!
//! assert_eq!(output.get("red").unwrap().get_pixel(1, 0).0, [255, 0, 0, 255]);
//! assert_eq!(output.get("blue").unwrap().get_pixel(1, 0).0, [0, 0, 255, 255]);
//! assert_eq!(output.get("blue").unwrap().get_pixel(0, 0).0, [0, 0, 0, 255]);
//! ```
//!
//! # Serializable Profiles
//!
//! Variant sets can also be described in JSON with [`RecolorProfile`]:
//!
//! ```
//! use sprite_recolor::RecolorProfile;
//!
//! let profile = RecolorProfile::from_json(
//!     r##"{ "variants": [ { "name": "ice", "colors": { "#ff0000": 190 } } ] }"##,
//! )
//! .unwrap();
//! let recolorer = profile.recolorer().unwrap();
//! assert!(recolorer.static_colors().is_none());
//! ```

mod buffer;
mod color;
mod error;
mod lookup;
mod profile;
mod recolorer;
mod variant;

pub use buffer::{blank_like, images_equal};
pub use color::{Color, hex_to_color, hsl_to_rgb, rgb_to_hex, rgb_to_hsl, rotate_hue};
pub use error::RecolorError;
pub use lookup::{PaletteLookup, Replacement};
pub use profile::{RecolorProfile, SerializableName, SerializableTarget, VariantSettings};
pub use recolorer::{Recolorer, RemapOptions, RemapOutput, remap};
pub use variant::{Hue, StaticColors, Target, VariantName, VariantSpec};
