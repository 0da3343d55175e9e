//! Compiled per-color replacement tables.
//!
//! [`PaletteLookup`] flattens an ordered list of variant specs into one hash
//! table keyed by source RGB. Each entry holds one slot per variant position,
//! so the remap loop answers "what does variant `i` do with this color" with a
//! single hash probe per pixel. The structure is built once and only read
//! afterwards.

use std::collections::HashMap;

use crate::color::Color;
use crate::variant::{Hue, Target, VariantName, VariantSpec};

/// A compiled replacement for one source color in one variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Replacement {
    /// Write this color with the source pixel's alpha.
    Color(Color),
    /// Rotate the source pixel to this hue.
    Hue(Hue),
}

impl From<Target> for Replacement {
    fn from(target: Target) -> Self {
        match target {
            Target::Color(color) => Self::Color(color),
            Target::Hue(hue) => Self::Hue(hue),
        }
    }
}

/// Immutable lookup built from a set of variants.
#[derive(Debug, Clone, Default)]
pub struct PaletteLookup {
    names: Vec<VariantName>,
    uniform: Vec<Option<Hue>>,
    entries: HashMap<u32, Vec<Option<Replacement>>>,
}

impl PaletteLookup {
    /// Compiles the variants in order. Specs are only read.
    pub fn compile(variants: &[(VariantName, VariantSpec)]) -> Self {
        let count = variants.len();
        let mut names = Vec::with_capacity(count);
        let mut uniform = vec![None; count];
        let mut entries: HashMap<u32, Vec<Option<Replacement>>> = HashMap::new();

        for (index, (name, spec)) in variants.iter().enumerate() {
            names.push(name.clone());
            match spec {
                VariantSpec::UniformHue(hue) => uniform[index] = Some(*hue),
                VariantSpec::ColorTable(table) => {
                    for (source, target) in table {
                        let slots = entries
                            .entry(source.key())
                            .or_insert_with(|| vec![None; count]);
                        slots[index] = Some((*target).into());
                    }
                }
            }
        }

        tracing::debug!(
            variants = count,
            mapped_colors = entries.len(),
            "compiled palette lookup"
        );

        Self {
            names,
            uniform,
            entries,
        }
    }

    /// Variant names in compile order.
    pub fn names(&self) -> &[VariantName] {
        &self.names
    }

    /// Number of variants.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Per-variant slots for an RGB key, if any variant maps it.
    pub fn slots(&self, key: u32) -> Option<&[Option<Replacement>]> {
        self.entries.get(&key).map(Vec::as_slice)
    }

    /// The uniform hue of the variant at `index`, if it has one.
    pub fn uniform_hue(&self, index: usize) -> Option<Hue> {
        self.uniform.get(index).copied().flatten()
    }

    /// Number of distinct source colors with at least one table entry.
    pub fn mapped_colors(&self) -> usize {
        self.entries.len()
    }
}
