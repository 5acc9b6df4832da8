//! Color maps and level palettes.

use glam::Vec3;

/// A color map for mapping scalar values to colors.
#[derive(Debug, Clone, PartialEq)]
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
    #[must_use]
    pub fn sample(&self, t: f32) -> Vec3 {
        let t = t.clamp(0.0, 1.0);

        match self.colors.len() {
            0 => Vec3::ZERO,
            1 => self.colors[0],
            len => {
                let n = len - 1;
                let idx = ((t * n as f32).floor() as usize).min(n - 1);
                let frac = t * n as f32 - idx as f32;
                self.colors[idx].lerp(self.colors[idx + 1], frac)
            }
        }
    }
}

/// The viridis color map.
#[must_use]
pub fn viridis() -> ColorMap {
    ColorMap::new(
        "viridis",
        vec![
            Vec3::new(0.267, 0.004, 0.329),
            Vec3::new(0.282, 0.140, 0.457),
            Vec3::new(0.253, 0.265, 0.529),
            Vec3::new(0.206, 0.371, 0.553),
            Vec3::new(0.163, 0.471, 0.558),
            Vec3::new(0.127, 0.566, 0.550),
            Vec3::new(0.134, 0.658, 0.517),
            Vec3::new(0.266, 0.749, 0.440),
            Vec3::new(0.477, 0.821, 0.318),
            Vec3::new(0.741, 0.873, 0.150),
            Vec3::new(0.993, 0.906, 0.144),
        ],
    )
}

/// Source of contour levels and their colors.
pub trait LevelPalette {
    /// `count + 1` level boundaries spanning `[min, max]`.
    fn levels(&self, min: f64, max: f64, count: usize, log: bool) -> Vec<f64>;

    /// Number of distinct colors.
    fn color_count(&self) -> usize;

    /// Color with the given index, `0..color_count()`.
    fn color(&self, index: usize) -> Vec3;

    /// Color of band `level` out of `bands` bands.
    fn color_for_level(&self, level: usize, bands: usize) -> Vec3 {
        let len = self.color_count();
        if len == 0 || bands == 0 {
            return Vec3::ONE;
        }
        let idx = ((level as f64 + 0.99) * len as f64 / bands as f64).floor() as usize;
        self.color(idx.min(len - 1))
    }
}

/// A [`LevelPalette`] that samples a [`ColorMap`] at a fixed number of steps.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMapPalette {
    map: ColorMap,
    steps: usize,
}

impl ColorMapPalette {
    /// Samples `map` at `steps` evenly spaced points.
    pub fn new(map: ColorMap, steps: usize) -> Self {
        Self {
            map,
            steps: steps.max(1),
        }
    }
}

impl Default for ColorMapPalette {
    fn default() -> Self {
        Self::new(viridis(), 255)
    }
}

impl LevelPalette for ColorMapPalette {
    fn levels(&self, min: f64, max: f64, count: usize, log: bool) -> Vec<f64> {
        let count = count.max(1);
        if log && min > 0.0 && max > min {
            let (lmin, lmax) = (min.log10(), max.log10());
            (0..=count)
                .map(|i| 10f64.powf(lmin + (lmax - lmin) * i as f64 / count as f64))
                .collect()
        } else {
            (0..=count)
                .map(|i| min + (max - min) * i as f64 / count as f64)
                .collect()
        }
    }

    fn color_count(&self) -> usize {
        self.steps
    }

    fn color(&self, index: usize) -> Vec3 {
        if self.steps <= 1 {
            return self.map.sample(0.0);
        }
        self.map.sample(index as f32 / (self.steps - 1) as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_endpoints() {
        let map = viridis();
        assert_eq!(map.sample(0.0), map.colors[0]);
        assert_eq!(map.sample(2.0), *map.colors.last().unwrap());
        assert_eq!(ColorMap::new("empty", Vec::new()).sample(0.5), Vec3::ZERO);
    }

    #[test]
    fn test_linear_levels() {
        let palette = ColorMapPalette::default();
        let levels = palette.levels(0.0, 10.0, 5, false);
        assert_eq!(levels.len(), 6);
        assert!((levels[2] - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_log_levels() {
        let palette = ColorMapPalette::default();
        let levels = palette.levels(1.0, 1000.0, 3, true);
        assert!((levels[1] - 10.0).abs() < 1e-9);
        assert!((levels[3] - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_level_colors_span_palette() {
        let palette = ColorMapPalette::default();
        let first = palette.color_for_level(0, 4);
        let last = palette.color_for_level(3, 4);
        assert_ne!(first, last);
        assert_eq!(last, palette.color(254));
    }
}
