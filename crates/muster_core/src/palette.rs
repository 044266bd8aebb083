//! Player color remapping.
//!
//! Sprites reserve a run of 16 palette indices for the owning player's
//! colors. [`RemapTable`] substitutes those indices with shades derived
//! from a single base HSL color, so one sprite sheet serves every player.
//!
//! All color math is fixed-point: remap tables feed the renderer, but they
//! are derived from player state that must match across lockstep clients.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::math::Fixed;

/// An RGB color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RgbColor {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl RgbColor {
    /// Create a new RGB color.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Indicator green used for target lines.
    pub const GREEN: Self = Self { r: 0, g: 255, b: 0 };

    /// Interpolate between two colors.
    ///
    /// `t` = 0 yields `from`, `t` = 1 yields `to`. Out-of-range factors
    /// are tolerated; each channel clamps to 0..=255.
    #[must_use]
    pub fn lerp(t: Fixed, from: Self, to: Self) -> Self {
        Self {
            r: lerp_channel(t, from.r, to.r),
            g: lerp_channel(t, from.g, to.g),
            b: lerp_channel(t, from.b, to.b),
        }
    }
}

fn lerp_channel(t: Fixed, from: u8, to: u8) -> u8 {
    let a = Fixed::from_num(i32::from(from));
    let b = Fixed::from_num(i32::from(to));
    let v = a + (b - a) * t;
    v.round().to_num::<i64>().clamp(0, 255) as u8
}

/// An HSL color with 8-bit channels.
///
/// Hue, saturation and luminance all range over 0..=255; hue wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct HslColor {
    /// Hue channel.
    pub h: u8,
    /// Saturation channel.
    pub s: u8,
    /// Luminance channel.
    pub l: u8,
}

impl HslColor {
    /// Create a new HSL color.
    #[must_use]
    pub const fn new(h: u8, s: u8, l: u8) -> Self {
        Self { h, s, l }
    }

    /// Replace the luminance channel.
    #[must_use]
    pub const fn with_luminance(self, l: u8) -> Self {
        Self { l, ..self }
    }

    /// Convert to RGB.
    #[must_use]
    pub fn to_rgb(self) -> RgbColor {
        let h = Fixed::from_num(i32::from(self.h)) / Fixed::from_num(255);
        let s = Fixed::from_num(i32::from(self.s)) / Fixed::from_num(255);
        let l = Fixed::from_num(i32::from(self.l)) / Fixed::from_num(255);

        if s == Fixed::ZERO {
            let v = to_channel(l);
            return RgbColor::new(v, v, v);
        }

        let q = if l < Fixed::from_num(0.5) {
            l * (Fixed::ONE + s)
        } else {
            l + s - l * s
        };
        let p = Fixed::from_num(2) * l - q;
        let third = Fixed::ONE / Fixed::from_num(3);

        RgbColor::new(
            to_channel(hue_to_value(p, q, h + third)),
            to_channel(hue_to_value(p, q, h)),
            to_channel(hue_to_value(p, q, h - third)),
        )
    }
}

fn hue_to_value(p: Fixed, q: Fixed, t: Fixed) -> Fixed {
    let mut t = t;
    if t < Fixed::ZERO {
        t += Fixed::ONE;
    }
    if t > Fixed::ONE {
        t -= Fixed::ONE;
    }

    let six = Fixed::from_num(6);
    if t * six < Fixed::ONE {
        p + (q - p) * six * t
    } else if t * Fixed::from_num(2) < Fixed::ONE {
        q
    } else if t * Fixed::from_num(3) < Fixed::from_num(2) {
        p + (q - p) * (Fixed::from_num(2) / Fixed::from_num(3) - t) * six
    } else {
        p
    }
}

fn to_channel(v: Fixed) -> u8 {
    (v * Fixed::from_num(255))
        .round()
        .to_num::<i64>()
        .clamp(0, 255) as u8
}

/// Number of palette indices in a player color ramp.
pub const RAMP_LEN: usize = 16;

/// The 16 palette indices a sprite sheet reserves for player colors.
///
/// Entries run monotonically in one direction; a ramp whose first entry
/// exceeds its last is treated as descending and anchors at the far end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColorRamp {
    indices: [u8; RAMP_LEN],
}

impl ColorRamp {
    /// Create a ramp from 16 palette indices.
    #[must_use]
    pub const fn new(indices: [u8; RAMP_LEN]) -> Self {
        Self { indices }
    }

    /// The raw palette indices.
    #[must_use]
    pub const fn indices(&self) -> &[u8; RAMP_LEN] {
        &self.indices
    }

    /// Whether the ramp runs from high indices to low.
    #[must_use]
    pub const fn is_descending(&self) -> bool {
        self.indices[0] > self.indices[RAMP_LEN - 1]
    }

    /// The palette index remapped entries are keyed from.
    ///
    /// Descending ramps anchor at their last entry, ascending ramps at
    /// their first.
    #[must_use]
    pub const fn anchor(&self) -> u8 {
        if self.is_descending() {
            self.indices[RAMP_LEN - 1]
        } else {
            self.indices[0]
        }
    }
}

/// Palette substitution table for one player.
///
/// Built once from a ramp and the player's base color; immutable after
/// construction. Lookups for indices outside the table fall back to the
/// original palette color - absence is normal, never an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemapTable {
    // Keyed as u16: a ramp anchored near the top of the palette can
    // produce keys past 255, which simply never match a query.
    colors: HashMap<u16, RgbColor>,
}

impl RemapTable {
    /// Build a remap table from a ramp and a base color.
    ///
    /// `ramp_fraction` in `[0, 1]` describes how much of the ramp must
    /// stay visually distinguishable. The base luminance is spread into a
    /// light and a dark variant: headroom is `(1 - fraction) * luminance`
    /// truncated to a channel value, the light variant keeps at least the
    /// base luminance and the dark variant drops by the headroom, floored
    /// at zero. Entry `i` is keyed `anchor + i` and blends the two
    /// variants by `(ramp[i] - anchor) / 16`.
    ///
    /// Total for every 16-entry ramp and every in-range HSL input.
    #[must_use]
    pub fn new(ramp: &ColorRamp, base: HslColor, ramp_fraction: Fixed) -> Self {
        let fraction = ramp_fraction.clamp(Fixed::ZERO, Fixed::ONE);
        let luminance = Fixed::from_num(i32::from(base.l));
        let headroom = ((Fixed::ONE - fraction) * luminance)
            .to_num::<i64>()
            .clamp(0, 255) as u8;

        let light = base.with_luminance(base.l.max(headroom)).to_rgb();
        let dark = base
            .with_luminance(base.l.saturating_sub(headroom))
            .to_rgb();

        let anchor = ramp.anchor();
        let mut colors = HashMap::with_capacity(RAMP_LEN);
        for (i, &index) in ramp.indices().iter().enumerate() {
            let offset = i32::from(index) - i32::from(anchor);
            let t = Fixed::from_num(offset) / Fixed::from_num(RAMP_LEN as i32);
            colors.insert(u16::from(anchor) + i as u16, RgbColor::lerp(t, light, dark));
        }

        Self { colors }
    }

    /// Look up the remapped color for a palette index.
    ///
    /// Indices the table does not cover keep their original color.
    #[must_use]
    pub fn remapped_color(&self, original: RgbColor, index: u8) -> RgbColor {
        self.colors
            .get(&u16::from(index))
            .copied()
            .unwrap_or(original)
    }

    /// Whether the table covers a palette index.
    #[must_use]
    pub fn covers(&self, index: u8) -> bool {
        self.colors.contains_key(&u16::from(index))
    }

    /// Number of entries in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn ascending_ramp() -> ColorRamp {
        let mut indices = [0u8; RAMP_LEN];
        for (i, slot) in indices.iter_mut().enumerate() {
            *slot = 80 + i as u8;
        }
        ColorRamp::new(indices)
    }

    fn descending_ramp() -> ColorRamp {
        let mut indices = [0u8; RAMP_LEN];
        for (i, slot) in indices.iter_mut().enumerate() {
            *slot = 95 - i as u8;
        }
        ColorRamp::new(indices)
    }

    // Rough perceptual stand-in, good enough to compare shades of one hue.
    fn luminance(c: RgbColor) -> u32 {
        let max = c.r.max(c.g).max(c.b) as u32;
        let min = c.r.min(c.g).min(c.b) as u32;
        (max + min) / 2
    }

    #[test]
    fn test_hsl_to_rgb_primaries() {
        // Full-saturation red at half luminance
        assert_eq!(
            HslColor::new(0, 255, 128).to_rgb(),
            RgbColor::new(255, 1, 1)
        );
        // Black and white regardless of hue
        assert_eq!(HslColor::new(93, 255, 0).to_rgb(), RgbColor::new(0, 0, 0));
        assert_eq!(
            HslColor::new(93, 255, 255).to_rgb(),
            RgbColor::new(255, 255, 255)
        );
        // Zero saturation is gray
        assert_eq!(
            HslColor::new(200, 0, 128).to_rgb(),
            RgbColor::new(128, 128, 128)
        );
    }

    #[test]
    fn test_ascending_ramp_anchor() {
        let ramp = ascending_ramp();
        assert!(!ramp.is_descending());
        assert_eq!(ramp.anchor(), 80);
    }

    #[test]
    fn test_descending_ramp_anchor() {
        let ramp = descending_ramp();
        assert!(ramp.is_descending());
        assert_eq!(ramp.anchor(), 80);
    }

    #[test]
    fn test_table_covers_anchor_run() {
        let table = RemapTable::new(
            &ascending_ramp(),
            HslColor::new(0, 255, 128),
            Fixed::from_num(0.5),
        );

        assert_eq!(table.len(), RAMP_LEN);
        for i in 0..RAMP_LEN as u8 {
            assert!(table.covers(80 + i));
        }
        assert!(!table.covers(79));
        assert!(!table.covers(96));
    }

    #[test]
    fn test_uncovered_index_keeps_original() {
        let table = RemapTable::new(
            &ascending_ramp(),
            HslColor::new(0, 255, 128),
            Fixed::from_num(0.5),
        );
        let original = RgbColor::new(1, 2, 3);
        assert_eq!(table.remapped_color(original, 7), original);
        assert_ne!(table.remapped_color(original, 80), original);
    }

    #[test]
    fn test_blend_darkens_along_ascending_ramp() {
        // Worked example: ascending 16-entry ramp, red at half luminance,
        // fraction 0.5. Entry 0 sits at the light end of the blend and
        // entry 15 near the dark end.
        let table = RemapTable::new(
            &ascending_ramp(),
            HslColor::new(0, 255, 128),
            Fixed::from_num(0.5),
        );

        let fallback = RgbColor::default();
        let mut last = luminance(table.remapped_color(fallback, 80));
        for i in 1..RAMP_LEN as u8 {
            let next = luminance(table.remapped_color(fallback, 80 + i));
            assert!(next <= last, "luminance rose at ramp position {i}");
            last = next;
        }
    }

    #[test]
    fn test_descending_ramp_matches_reversed_ascending() {
        // A descending ramp keys from its far end; position i still maps
        // to anchor + i with the blend following the index offsets.
        let base = HslColor::new(170, 200, 100);
        let fraction = Fixed::from_num(0.7);
        let asc = RemapTable::new(&ascending_ramp(), base, fraction);
        let desc = RemapTable::new(&descending_ramp(), base, fraction);

        let fallback = RgbColor::default();
        for i in 0..RAMP_LEN as u8 {
            // Descending entry i carries offset ramp[i]-anchor = 15-i.
            assert_eq!(
                desc.remapped_color(fallback, 80 + i),
                asc.remapped_color(fallback, 80 + (15 - i)),
            );
        }
    }

    #[test]
    fn test_fraction_extremes() {
        let base = HslColor::new(40, 255, 120);

        // fraction 1: no headroom, both variants collapse to the base.
        let tight = RemapTable::new(&ascending_ramp(), base, Fixed::ONE);
        let fallback = RgbColor::default();
        let first = tight.remapped_color(fallback, 80);
        let last = tight.remapped_color(fallback, 95);
        assert_eq!(first, last);

        // fraction 0: maximum headroom, widest spread.
        let wide = RemapTable::new(&ascending_ramp(), base, Fixed::ZERO);
        let wide_first = wide.remapped_color(fallback, 80);
        let wide_last = wide.remapped_color(fallback, 95);
        assert!(luminance(wide_first) > luminance(wide_last));
    }

    #[test]
    fn test_light_variant_luminance_monotonic_in_fraction() {
        let base = HslColor::new(0, 255, 128);
        let at = |fraction: Fixed| {
            let table = RemapTable::new(&ascending_ramp(), base, fraction);
            luminance(table.remapped_color(RgbColor::default(), 80))
        };
        assert!(at(Fixed::ONE) >= at(Fixed::ZERO));
    }

    proptest! {
        #[test]
        fn remap_never_panics_and_keys_stay_in_run(
            indices in proptest::array::uniform16(0u8..=255),
            h in 0u8..=255,
            s in 0u8..=255,
            l in 0u8..=255,
            fraction_milli in 0u32..=1000,
        ) {
            let ramp = ColorRamp::new(indices);
            let fraction = Fixed::from_num(fraction_milli) / Fixed::from_num(1000);
            let table = RemapTable::new(&ramp, HslColor::new(h, s, l), fraction);

            // Key set is a subset of {anchor, .., anchor + 15}.
            let anchor = ramp.anchor();
            for index in 0u16..=255 {
                if table.covers(index as u8) {
                    let offset = index as i32 - i32::from(anchor);
                    prop_assert!((0..RAMP_LEN as i32).contains(&offset));
                }
            }
        }

        #[test]
        fn remap_lookup_total(
            indices in proptest::array::uniform16(0u8..=255),
            query in 0u8..=255,
        ) {
            let table = RemapTable::new(
                &ColorRamp::new(indices),
                HslColor::new(12, 200, 90),
                Fixed::from_num(0.5),
            );
            // Any query resolves to some color without panicking.
            let _ = table.remapped_color(RgbColor::new(9, 9, 9), query);
        }
    }
}
