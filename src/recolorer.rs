//! The remap engine: one source image in, one recolored image per variant out.

use std::collections::{HashMap, HashSet};

use image::RgbaImage;

use crate::buffer::{blank_like, images_equal};
use crate::color::{Color, rotate_hue};
use crate::error::RecolorError;
use crate::lookup::{PaletteLookup, Replacement};
use crate::variant::{StaticColors, VariantName, VariantSpec};

// ============================================================================
// Options and Output
// ============================================================================

/// Per-call options for [`Recolorer::remap`].
#[derive(Debug, Clone, Default)]
pub struct RemapOptions {
    /// Name of the image being remapped, used in diagnostics only.
    pub image_name: Option<String>,

    /// Leave unmapped pixels transparent black instead of failing.
    pub ignore_missing: bool,
}

impl RemapOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image_name(mut self, name: impl Into<String>) -> Self {
        self.image_name = Some(name.into());
        self
    }

    pub fn with_ignore_missing(mut self, ignore: bool) -> Self {
        self.ignore_missing = ignore;
        self
    }
}

/// Variants produced by a remap call, in variant order.
///
/// Variants whose output matched the supplied prior image are left out.
#[derive(Debug, Clone, Default)]
pub struct RemapOutput {
    images: Vec<(VariantName, RgbaImage)>,
}

impl RemapOutput {
    /// Returns the image for a variant, if it was produced.
    pub fn get(&self, name: &str) -> Option<&RgbaImage> {
        self.images
            .iter()
            .find(|(variant, _)| variant.as_str() == name)
            .map(|(_, image)| image)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &VariantName> {
        self.images.iter().map(|(name, _)| name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&VariantName, &RgbaImage)> {
        self.images.iter().map(|(name, image)| (name, image))
    }
}

impl IntoIterator for RemapOutput {
    type Item = (VariantName, RgbaImage);
    type IntoIter = std::vec::IntoIter<(VariantName, RgbaImage)>;

    fn into_iter(self) -> Self::IntoIter {
        self.images.into_iter()
    }
}

// ============================================================================
// Missing Mappings
// ============================================================================

/// Collects unmapped (variant, color) pairs across a whole image.
///
/// Colors are de-duplicated by RGB and variants by name, both in first-seen
/// order, so the final error names each one once.
#[derive(Default)]
struct MissingMappings {
    colors: Vec<String>,
    seen_colors: HashSet<u32>,
    variants: Vec<String>,
    seen_variants: HashSet<String>,
}

impl MissingMappings {
    fn record(&mut self, variant: &VariantName, color: Color) {
        if self.seen_colors.insert(color.key()) {
            self.colors.push(color.with_alpha(255).to_hex());
        }
        if !self.seen_variants.contains(variant.as_str()) {
            self.seen_variants.insert(variant.to_string());
            self.variants.push(variant.to_string());
        }
    }

    fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    fn into_error(self, image: Option<String>) -> RecolorError {
        RecolorError::MissingColorMapping {
            image,
            colors: self.colors,
            variants: self.variants,
        }
    }
}

// ============================================================================
// Recolorer
// ============================================================================

/// Recolors images into a fixed set of variants.
///
/// Compiles the variant specs once, so one `Recolorer` can remap any number
/// of images. It holds no mutable state and can be shared across threads.
///
/// # Pixel classification
///
/// For every pixel, in row-major order:
///
/// 1. Fully transparent pixels are copied unchanged into every variant.
/// 2. Pixels whose RGB is a static color are copied unchanged.
/// 3. Otherwise, per variant: a table entry (fixed color or hue) wins, then the
///    variant's uniform hue. Without a static color set the pixel passes
///    through; with one, the pixel is recorded as missing and left zeroed.
///
/// # Example
///
/// ```
/// use image::{Rgba, RgbaImage};
/// use sprite_recolor::{Recolorer, RemapOptions, VariantName, VariantSpec};
///
/// let sprite = RgbaImage::from_pixel(2, 2, Rgba([0, 255, 0, 255]));
/// let recolorer = Recolorer::new(
///     &[(VariantName::from("red"), VariantSpec::uniform_hue(0.0))],
///     None,
/// );
///
/// let output = recolorer.remap(&sprite, None, &RemapOptions::new()).unwrap();
/// assert_eq!(output.get("red").unwrap().get_pixel(0, 0).0, [255, 0, 0, 255]);
/// ```
#[derive(Debug, Clone)]
pub struct Recolorer {
    lookup: PaletteLookup,
    static_colors: Option<StaticColors>,
}

impl Recolorer {
    /// Creates a recolorer for the given variants.
    ///
    /// Passing `None` for `static_colors` makes every unmapped color pass
    /// through unchanged; passing a set makes unmapped colors an error.
    pub fn new(
        variants: &[(VariantName, VariantSpec)],
        static_colors: Option<StaticColors>,
    ) -> Self {
        Self::from_lookup(PaletteLookup::compile(variants), static_colors)
    }

    pub fn from_lookup(lookup: PaletteLookup, static_colors: Option<StaticColors>) -> Self {
        Self {
            lookup,
            static_colors,
        }
    }

    pub fn lookup(&self) -> &PaletteLookup {
        &self.lookup
    }

    pub fn static_colors(&self) -> Option<&StaticColors> {
        self.static_colors.as_ref()
    }

    /// Renders every variant of `source`, in variant order.
    ///
    /// Fails with [`RecolorError::MissingColorMapping`] if a pixel had no rule
    /// in some variant, unless `options.ignore_missing` is set.
    pub fn render(
        &self,
        source: &RgbaImage,
        options: &RemapOptions,
    ) -> Result<Vec<RgbaImage>, RecolorError> {
        let names = self.lookup.names();
        let mut outputs: Vec<RgbaImage> = names.iter().map(|_| blank_like(source)).collect();
        let mut missing = MissingMappings::default();

        for (x, y, pixel) in source.enumerate_pixels() {
            let color = Color::from(*pixel);

            if color.a() == 0 || self.is_static(color) {
                for output in &mut outputs {
                    output.put_pixel(x, y, *pixel);
                }
                continue;
            }

            let slots = self.lookup.slots(color.key());
            for (index, output) in outputs.iter_mut().enumerate() {
                let replacement = slots.and_then(|slots| slots[index]);
                if let Some(remapped) = self.remap_pixel(color, index, replacement) {
                    output.put_pixel(x, y, remapped.into());
                } else {
                    missing.record(&names[index], color);
                }
            }
        }

        if !missing.is_empty() {
            let error = missing.into_error(options.image_name.clone());
            if !options.ignore_missing {
                return Err(error);
            }
            tracing::warn!(%error, "ignoring missing color mappings");
        }

        Ok(outputs)
    }

    /// Renders every variant and keeps only those that differ from `priors`.
    ///
    /// A variant without a prior image is always included. A prior of a
    /// different size counts as changed.
    pub fn remap(
        &self,
        source: &RgbaImage,
        priors: Option<&HashMap<VariantName, RgbaImage>>,
        options: &RemapOptions,
    ) -> Result<RemapOutput, RecolorError> {
        let _span = tracing::debug_span!(
            "remap",
            image = options.image_name.as_deref().unwrap_or("<unnamed>"),
            width = source.width(),
            height = source.height(),
        )
        .entered();

        let outputs = self.render(source, options)?;

        let mut images = Vec::with_capacity(outputs.len());
        for (name, image) in self.lookup.names().iter().zip(outputs) {
            let unchanged = priors
                .and_then(|priors| priors.get(name))
                .is_some_and(|prior| images_equal(prior, &image));
            if unchanged {
                tracing::debug!(variant = %name, "variant unchanged, skipping");
                continue;
            }
            images.push((name.clone(), image));
        }

        tracing::debug!(
            produced = images.len(),
            skipped = self.lookup.len() - images.len(),
            "remap finished"
        );

        Ok(RemapOutput { images })
    }

    fn is_static(&self, color: Color) -> bool {
        self.static_colors
            .as_ref()
            .is_some_and(|set| set.contains_key(color.key()))
    }

    /// Applies one variant's rule to an opaque, non-static pixel.
    ///
    /// Returns `None` when the pixel has no rule and must be reported missing.
    fn remap_pixel(
        &self,
        color: Color,
        index: usize,
        replacement: Option<Replacement>,
    ) -> Option<Color> {
        match replacement {
            Some(Replacement::Color(target)) => Some(target.with_alpha(color.a())),
            Some(Replacement::Hue(hue)) => Some(rotate_hue(color, hue.degrees())),
            None => match self.lookup.uniform_hue(index) {
                Some(hue) => Some(rotate_hue(color, hue.degrees())),
                None if self.static_colors.is_none() => Some(color),
                None => None,
            },
        }
    }
}

/// Remaps `source` into the given variants in one call.
///
/// Convenience wrapper that compiles a [`Recolorer`] and runs
/// [`Recolorer::remap`]. Returns only the variants that changed relative to
/// `priors` or had no prior image.
pub fn remap(
    source: &RgbaImage,
    variants: &[(VariantName, VariantSpec)],
    static_colors: Option<&StaticColors>,
    priors: Option<&HashMap<VariantName, RgbaImage>>,
    options: &RemapOptions,
) -> Result<RemapOutput, RecolorError> {
    Recolorer::new(variants, static_colors.cloned()).remap(source, priors, options)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::{Hue, Target};
    use image::Rgba;

    const BLACK: [u8; 4] = [0, 0, 0, 255];
    const MAGENTA: [u8; 4] = [255, 0, 255, 255];
    const GREEN: [u8; 4] = [0, 255, 0, 255];

    fn name(s: &str) -> VariantName {
        VariantName::from(s)
    }

    fn rgb(c: [u8; 4]) -> Color {
        Color::from_rgba(c[0], c[1], c[2], c[3])
    }

    /// A 2x2 sprite: black outline pixel, magenta, half-transparent green,
    /// and a fully transparent pixel with leftover color bytes.
    fn create_test_sprite() -> RgbaImage {
        let mut img = RgbaImage::new(2, 2);
        img.put_pixel(0, 0, Rgba(BLACK));
        img.put_pixel(1, 0, Rgba(MAGENTA));
        img.put_pixel(0, 1, Rgba([0, 255, 0, 128]));
        img.put_pixel(1, 1, Rgba([12, 34, 56, 0]));
        img
    }

    fn black_static() -> StaticColors {
        [rgb(BLACK)].into_iter().collect()
    }

    #[test]
    fn table_maps_colors_and_keeps_alpha() {
        let variants = vec![(
            name("swap"),
            VariantSpec::table([
                (rgb(MAGENTA), Color::from_rgb(10, 20, 30)),
                (rgb(GREEN), Color::from_rgba(1, 2, 3, 77)),
            ]),
        )];

        let output = remap(
            &create_test_sprite(),
            &variants,
            Some(&black_static()),
            None,
            &RemapOptions::new(),
        )
        .unwrap();

        let img = output.get("swap").unwrap();
        assert_eq!(img.get_pixel(0, 0).0, BLACK);
        assert_eq!(img.get_pixel(1, 0).0, [10, 20, 30, 255]);
        assert_eq!(img.get_pixel(0, 1).0, [1, 2, 3, 128]);
        assert_eq!(img.get_pixel(1, 1).0, [12, 34, 56, 0]);
    }

    #[test]
    fn uniform_hue_rotates_non_static_pixels() {
        let variants = vec![(name("red"), VariantSpec::uniform_hue(0.0))];

        let output = remap(
            &create_test_sprite(),
            &variants,
            Some(&black_static()),
            None,
            &RemapOptions::new(),
        )
        .unwrap();

        let img = output.get("red").unwrap();
        assert_eq!(img.get_pixel(0, 0).0, BLACK);
        // magenta (300°) and green (120°) both become pure red
        assert_eq!(img.get_pixel(1, 0).0, [255, 0, 0, 255]);
        assert_eq!(img.get_pixel(0, 1).0, [255, 0, 0, 128]);
        assert_eq!(img.get_pixel(1, 1).0, [12, 34, 56, 0]);
    }

    #[test]
    fn table_entries_win_over_uniform_rotation_per_variant() {
        let variants = vec![
            (
                name("mixed"),
                VariantSpec::table([
                    (rgb(MAGENTA), Target::from(Color::from_rgb(9, 9, 9))),
                    (rgb(GREEN), Target::from(Hue::new(240.0))),
                ]),
            ),
            (name("shift"), VariantSpec::uniform_hue(240.0)),
        ];

        let output = remap(
            &create_test_sprite(),
            &variants,
            None,
            None,
            &RemapOptions::new(),
        )
        .unwrap();

        let mixed = output.get("mixed").unwrap();
        assert_eq!(mixed.get_pixel(1, 0).0, [9, 9, 9, 255]);
        assert_eq!(mixed.get_pixel(0, 1).0, [0, 0, 255, 128]);

        let shift = output.get("shift").unwrap();
        assert_eq!(shift.get_pixel(1, 0).0, [0, 0, 255, 255]);
        // black has no saturation, so rotating leaves it black
        assert_eq!(shift.get_pixel(0, 0).0, BLACK);
    }

    #[test]
    fn table_hue_zero_rotates_to_red() {
        let variants = vec![(
            name("zero"),
            VariantSpec::table([(rgb(GREEN), Hue::new(0.0))]),
        )];
        let sprite = RgbaImage::from_pixel(1, 1, Rgba([0, 255, 0, 9]));

        let output = remap(
            &sprite,
            &variants,
            Some(&black_static()),
            None,
            &RemapOptions::new(),
        )
        .unwrap();

        assert_eq!(output.get("zero").unwrap().get_pixel(0, 0).0, [255, 0, 0, 9]);
    }

    #[test]
    fn static_colors_are_never_remapped() {
        let variants = vec![
            (
                name("table"),
                VariantSpec::table([
                    (rgb(BLACK), Color::from_rgb(200, 0, 0)),
                    (rgb(GREEN), Color::from_rgb(0, 200, 0)),
                ]),
            ),
            (name("hue"), VariantSpec::uniform_hue(90.0)),
        ];

        let mut sprite = RgbaImage::from_pixel(2, 1, Rgba([0, 0, 0, 90]));
        sprite.put_pixel(1, 0, Rgba(GREEN));

        let output = remap(
            &sprite,
            &variants,
            Some(&black_static()),
            None,
            &RemapOptions::new(),
        )
        .unwrap();

        for (_, img) in output.iter() {
            assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 90]);
        }
    }

    #[test]
    fn missing_mapping_fails_with_color_and_variant() {
        let variants = vec![
            (name("empty"), VariantSpec::table::<Color>([])),
            (name("hue"), VariantSpec::uniform_hue(30.0)),
        ];
        let sprite = RgbaImage::from_pixel(1, 1, Rgba(MAGENTA));

        let err = remap(
            &sprite,
            &variants,
            Some(&black_static()),
            None,
            &RemapOptions::new().with_image_name("hero"),
        )
        .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("#ff00ff"), "{message}");
        assert!(message.contains("hero"), "{message}");
        match err {
            RecolorError::MissingColorMapping {
                colors, variants, ..
            } => {
                assert_eq!(colors, vec!["#ff00ff".to_string()]);
                assert_eq!(variants, vec!["empty".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn ignored_missing_mapping_leaves_transparent_black() {
        let variants = vec![(name("empty"), VariantSpec::table::<Color>([]))];
        let sprite = RgbaImage::from_pixel(1, 1, Rgba(MAGENTA));

        let output = remap(
            &sprite,
            &variants,
            Some(&black_static()),
            None,
            &RemapOptions::new().with_ignore_missing(true),
        )
        .unwrap();

        assert_eq!(output.get("empty").unwrap().get_pixel(0, 0).0, [0, 0, 0, 0]);
    }

    #[test]
    fn empty_static_set_is_still_strict() {
        let variants = vec![(name("empty"), VariantSpec::table::<Color>([]))];
        let sprite = RgbaImage::from_pixel(1, 1, Rgba(GREEN));

        let result = remap(
            &sprite,
            &variants,
            Some(&StaticColors::new()),
            None,
            &RemapOptions::new(),
        );
        assert!(matches!(
            result,
            Err(RecolorError::MissingColorMapping { .. })
        ));
    }

    #[test]
    fn missing_pairs_are_deduplicated_in_first_seen_order() {
        let variants = vec![
            (name("b"), VariantSpec::table::<Color>([])),
            (name("a"), VariantSpec::table::<Color>([])),
            (name("b"), VariantSpec::table::<Color>([])),
        ];
        let mut sprite = RgbaImage::new(4, 1);
        sprite.put_pixel(0, 0, Rgba(GREEN));
        sprite.put_pixel(1, 0, Rgba(MAGENTA));
        sprite.put_pixel(2, 0, Rgba([0, 255, 0, 10]));
        sprite.put_pixel(3, 0, Rgba(MAGENTA));

        let err = remap(
            &sprite,
            &variants,
            Some(&black_static()),
            None,
            &RemapOptions::new(),
        )
        .unwrap_err();

        let RecolorError::MissingColorMapping {
            image,
            colors,
            variants,
        } = err
        else {
            panic!("expected a missing mapping error");
        };
        assert_eq!(image, None);
        assert_eq!(colors, vec!["#00ff00".to_string(), "#ff00ff".to_string()]);
        assert_eq!(variants, vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn without_static_set_unmapped_colors_pass_through() {
        let variants = vec![(
            name("partial"),
            VariantSpec::table([(rgb(GREEN), Color::from_rgb(0, 0, 255))]),
        )];
        let sprite = create_test_sprite();

        let output = remap(&sprite, &variants, None, None, &RemapOptions::new()).unwrap();

        let img = output.get("partial").unwrap();
        assert_eq!(img.get_pixel(0, 0).0, BLACK);
        assert_eq!(img.get_pixel(1, 0).0, MAGENTA);
        assert_eq!(img.get_pixel(0, 1).0, [0, 0, 255, 128]);
    }

    #[test]
    fn transparent_pixels_skip_every_rule() {
        let variants = vec![
            (
                name("table"),
                VariantSpec::table([(Color::from_rgb(12, 34, 56), Color::from_rgb(1, 1, 1))]),
            ),
            (name("hue"), VariantSpec::uniform_hue(180.0)),
        ];
        let sprite = RgbaImage::from_pixel(1, 1, Rgba([12, 34, 56, 0]));

        // Strict mode would flag the color if it were classified at all
        let output = remap(
            &sprite,
            &variants,
            Some(&StaticColors::new()),
            None,
            &RemapOptions::new(),
        )
        .unwrap();

        for (_, img) in output.iter() {
            assert_eq!(img.get_pixel(0, 0).0, [12, 34, 56, 0]);
        }
    }

    #[test]
    fn identical_prior_suppresses_variant() {
        let variants = vec![
            (name("red"), VariantSpec::uniform_hue(0.0)),
            (name("blue"), VariantSpec::uniform_hue(240.0)),
        ];
        let sprite = RgbaImage::from_pixel(2, 2, Rgba(GREEN));
        let recolorer = Recolorer::new(&variants, None);

        let first = recolorer.remap(&sprite, None, &RemapOptions::new()).unwrap();
        assert_eq!(first.len(), 2);

        let priors: HashMap<VariantName, RgbaImage> = first.into_iter().collect();
        let second = recolorer
            .remap(&sprite, Some(&priors), &RemapOptions::new())
            .unwrap();
        assert!(second.is_empty());
    }

    #[test]
    fn single_differing_byte_keeps_variant() {
        let variants = vec![
            (name("red"), VariantSpec::uniform_hue(0.0)),
            (name("blue"), VariantSpec::uniform_hue(240.0)),
        ];
        let sprite = RgbaImage::from_pixel(2, 2, Rgba(GREEN));
        let recolorer = Recolorer::new(&variants, None);

        let mut priors: HashMap<VariantName, RgbaImage> = recolorer
            .remap(&sprite, None, &RemapOptions::new())
            .unwrap()
            .into_iter()
            .collect();
        priors.get_mut(&name("blue")).unwrap().get_pixel_mut(1, 1).0[3] = 254;

        let output = recolorer
            .remap(&sprite, Some(&priors), &RemapOptions::new())
            .unwrap();
        assert_eq!(output.names().collect::<Vec<_>>(), vec![&name("blue")]);
        assert!(!output.contains("red"));
    }

    #[test]
    fn prior_with_other_dimensions_counts_as_changed() {
        let variants = vec![(name("red"), VariantSpec::uniform_hue(0.0))];
        let sprite = RgbaImage::from_pixel(2, 2, Rgba(GREEN));
        let priors = HashMap::from([(
            name("red"),
            RgbaImage::from_pixel(4, 1, Rgba([255, 0, 0, 255])),
        )]);

        let output = remap(&sprite, &variants, None, Some(&priors), &RemapOptions::new()).unwrap();
        assert!(output.contains("red"));
    }

    #[test]
    fn render_does_not_touch_source() {
        let sprite = create_test_sprite();
        let before = sprite.clone();
        let recolorer = Recolorer::new(&[(name("hue"), VariantSpec::uniform_hue(60.0))], None);

        let outputs = recolorer.render(&sprite, &RemapOptions::new()).unwrap();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].dimensions(), sprite.dimensions());
        assert!(images_equal(&sprite, &before));
    }

    #[test]
    fn no_variants_yields_empty_output() {
        let output = remap(
            &create_test_sprite(),
            &[],
            Some(&StaticColors::new()),
            None,
            &RemapOptions::new(),
        )
        .unwrap();
        assert!(output.is_empty());
    }

    #[test]
    fn recolorer_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Recolorer>();
    }
}
