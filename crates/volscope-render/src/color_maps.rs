//! Color maps and per-variable color tables.

use std::collections::HashMap;

use glam::Vec3;
use volscope_core::{MAX_INDEX, NO_CONTRIBUTION};

/// A color map for mapping normalized scalar values to colors.
#[derive(Debug, Clone)]
pub struct ColorMap {
    /// Color map name.
    pub name: String,
    /// Color samples (evenly spaced from 0 to 1).
    pub colors: Vec<Vec3>,
}

impl ColorMap {
    /// Creates a new color map.
    pub fn new(name: impl Into<String>, colors: Vec<Vec3>) -> Self {
        Self {
            name: name.into(),
            colors,
        }
    }

    /// Samples the color map at a given value (0 to 1).
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn sample(&self, t: f32) -> Vec3 {
        match self.colors.len() {
            0 => Vec3::ZERO,
            1 => self.colors[0],
            len => {
                let n = len - 1;
                let scaled = t.clamp(0.0, 1.0) * n as f32;
                let idx = (scaled.floor() as usize).min(n - 1);
                self.colors[idx].lerp(self.colors[idx + 1], scaled - idx as f32)
            }
        }
    }
}

/// Registry of named color maps.
#[derive(Default)]
pub struct ColorMapRegistry {
    color_maps: HashMap<String, ColorMap>,
}

impl ColorMapRegistry {
    /// Creates a registry holding the built-in color maps.
    pub fn new() -> Self {
        let mut registry = Self::default();
        registry.register_defaults();
        registry
    }

    fn register_defaults(&mut self) {
        self.register(ColorMap::new(
            "viridis",
            vec![
                Vec3::new(0.267, 0.004, 0.329),
                Vec3::new(0.253, 0.265, 0.529),
                Vec3::new(0.163, 0.471, 0.558),
                Vec3::new(0.134, 0.658, 0.517),
                Vec3::new(0.477, 0.821, 0.318),
                Vec3::new(0.993, 0.906, 0.144),
            ],
        ));

        // Cold water to warm water
        self.register(ColorMap::new(
            "coolwarm",
            vec![
                Vec3::new(0.230, 0.299, 0.754),
                Vec3::new(0.552, 0.690, 0.996),
                Vec3::new(0.866, 0.866, 0.866),
                Vec3::new(0.956, 0.604, 0.486),
                Vec3::new(0.706, 0.016, 0.150),
            ],
        ));

        // Thin cloud through to dense cloud
        self.register(ColorMap::new(
            "cloud",
            vec![
                Vec3::new(0.35, 0.45, 0.60),
                Vec3::new(0.70, 0.75, 0.82),
                Vec3::new(1.0, 1.0, 1.0),
            ],
        ));

        self.register(ColorMap::new(
            "rainbow",
            vec![
                Vec3::new(0.5, 0.0, 1.0),
                Vec3::new(0.0, 0.0, 1.0),
                Vec3::new(0.0, 1.0, 1.0),
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
            ],
        ));
    }

    /// Registers a color map, replacing any map of the same name.
    pub fn register(&mut self, color_map: ColorMap) {
        self.color_maps.insert(color_map.name.clone(), color_map);
    }

    /// Gets a color map by name.
    pub fn get(&self, name: &str) -> Option<&ColorMap> {
        self.color_maps.get(name)
    }
}

/// Number of entries in a [`ColorTable`].
pub const COLOR_TABLE_SIZE: usize = 256;

/// RGBA lookup table indexed by quantized values.
///
/// Entries `0..=254` color valid data. Entry 255 is the "no contribution"
/// slot and always stays fully transparent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorTable {
    entries: [[u8; 4]; COLOR_TABLE_SIZE],
}

impl ColorTable {
    /// Builds a table from a function of the normalized value in `[0, 1]`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_fn(mut color: impl FnMut(f32) -> [u8; 4]) -> Self {
        let mut entries = [[0u8; 4]; COLOR_TABLE_SIZE];
        let valid = usize::from(MAX_INDEX) + 1;
        for (i, entry) in entries.iter_mut().take(valid).enumerate() {
            *entry = color(f32::from(i as u8) / f32::from(MAX_INDEX));
        }
        Self { entries }
    }

    /// Samples a color map into a table with constant opacity.
    pub fn from_color_map(map: &ColorMap, alpha: u8) -> Self {
        Self::from_fn(|t| {
            let c = map.sample(t);
            [to_byte(c.x), to_byte(c.y), to_byte(c.z), alpha]
        })
    }

    /// Returns the RGBA color for a quantized index.
    #[inline]
    pub fn get(&self, index: u8) -> [u8; 4] {
        self.entries[usize::from(index)]
    }

    /// Overrides one entry. The "no contribution" entry cannot be changed.
    pub fn set(&mut self, index: u8, rgba: [u8; 4]) -> bool {
        if index == NO_CONTRIBUTION {
            return false;
        }
        self.entries[usize::from(index)] = rgba;
        true
    }

    /// All entries in index order.
    pub fn entries(&self) -> &[[u8; 4]; COLOR_TABLE_SIZE] {
        &self.entries
    }
}

impl Default for ColorTable {
    /// Gray ramp at half opacity.
    fn default() -> Self {
        Self::from_fn(|t| {
            let v = to_byte(t);
            [v, v, v, 128]
        })
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
