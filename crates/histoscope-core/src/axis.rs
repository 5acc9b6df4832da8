//! Axis ranges and data-to-draw mappings.
//!
//! An [`AxisScale`] maps the active (possibly zoomed) part of a data domain onto a
//! draw-space interval and back. Three kinds are supported: linear, logarithmic and
//! categorical labels, where category `i` sits at `i + 0.5`.

use serde::{Deserialize, Serialize};

use crate::error::{HistoscopeError, Result};

/// Identifies one of the three plot axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxisId {
    /// Horizontal axis.
    X,
    /// Depth axis.
    Y,
    /// Vertical (value) axis.
    Z,
}

impl AxisId {
    /// All axes in order.
    pub const ALL: [AxisId; 3] = [AxisId::X, AxisId::Y, AxisId::Z];

    /// Component index (0, 1, 2).
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            AxisId::X => 0,
            AxisId::Y => 1,
            AxisId::Z => 2,
        }
    }

    /// Lowercase axis name.
    #[must_use]
    pub fn name(self) -> char {
        match self {
            AxisId::X => 'x',
            AxisId::Y => 'y',
            AxisId::Z => 'z',
        }
    }
}

/// Kind of mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AxisKind {
    /// Affine mapping.
    #[default]
    Linear,
    /// Logarithmic mapping.
    Log,
    /// Categorical mapping.
    Labels,
}

/// Full data range of an axis plus an optional zoom window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    /// Lower bound of the full range.
    pub min: f64,
    /// Upper bound of the full range.
    pub max: f64,
    /// Lower bound of the zoom window.
    pub zoom_min: Option<f64>,
    /// Upper bound of the zoom window.
    pub zoom_max: Option<f64>,
    /// Mapping kind.
    pub kind: AxisKind,
}

impl AxisRange {
    /// Creates an unzoomed range.
    pub fn new(kind: AxisKind, min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            zoom_min: None,
            zoom_max: None,
            kind,
        }
    }

    /// Returns the range with a zoom window applied.
    #[must_use]
    pub fn with_zoom(mut self, min: f64, max: f64) -> Self {
        self.zoom_min = Some(min);
        self.zoom_max = Some(max);
        self
    }

    /// Whether a usable zoom window is present. Equal bounds count as unzoomed.
    pub fn is_zoomed(&self) -> bool {
        matches!((self.zoom_min, self.zoom_max), (Some(lo), Some(hi)) if lo != hi)
    }

    /// The active interval: the zoom window when zoomed, otherwise the full range.
    pub fn active(&self) -> (f64, f64) {
        match (self.zoom_min, self.zoom_max) {
            (Some(lo), Some(hi)) if lo != hi => (lo.min(hi), lo.max(hi)),
            _ => (self.min, self.max),
        }
    }

    /// Normalizes the range so it can be passed to [`AxisScale::configure`].
    ///
    /// Log ranges get `max = 1` when `max <= 0` and `min = 1e-4 * max` when
    /// `min <= 0`. Zero-width ranges are widened.
    #[must_use]
    pub fn sanitized(&self) -> Self {
        let mut out = *self;
        if out.kind == AxisKind::Log {
            (out.min, out.max) = clamp_log(out.min, out.max);
            if let (Some(lo), Some(hi)) = (out.zoom_min, out.zoom_max) {
                let (lo, hi) = clamp_log(lo, hi);
                out.zoom_min = Some(lo);
                out.zoom_max = Some(hi);
            }
        }
        if out.min > out.max {
            std::mem::swap(&mut out.min, &mut out.max);
        }
        if out.max - out.min <= 0.0 || !(out.max - out.min).is_finite() {
            (out.min, out.max) = widen(out.kind, out.min);
        }
        out
    }
}

fn clamp_log(min: f64, max: f64) -> (f64, f64) {
    let max = if max <= 0.0 { 1.0 } else { max };
    let min = if min <= 0.0 { 1e-4 * max } else { min };
    (min, max)
}

fn widen(kind: AxisKind, v: f64) -> (f64, f64) {
    match kind {
        AxisKind::Log => {
            let v = if v > 0.0 && v.is_finite() { v } else { 1.0 };
            (v * 0.5, v * 2.0)
        }
        AxisKind::Linear | AxisKind::Labels => {
            let v = if v.is_finite() { v } else { 0.0 };
            if v == 0.0 {
                (0.0, 1.0)
            } else {
                (v - 0.5 * v.abs(), v + 0.5 * v.abs())
            }
        }
    }
}

/// Mapping between a data domain and a draw-space interval.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisScale {
    kind: AxisKind,
    full_min: f64,
    full_max: f64,
    lo: f64,
    hi: f64,
    draw_min: f64,
    draw_max: f64,
    labels: Vec<String>,
}

impl AxisScale {
    /// Builds a mapping of `[zoom_min, zoom_max]` (or `[data_min, data_max]` when not
    /// zoomed) onto `[draw_min, draw_max]`.
    ///
    /// Log domains with `max <= 0` use `max = 1`; a non-positive minimum becomes
    /// `1e-4 * max`. A zero-width or inverted domain is rejected.
    pub fn configure(
        kind: AxisKind,
        data_min: f64,
        data_max: f64,
        draw_min: f64,
        draw_max: f64,
        zoom_min: Option<f64>,
        zoom_max: Option<f64>,
    ) -> Result<Self> {
        let (mut full_min, mut full_max) = (data_min, data_max);
        let (mut lo, mut hi) = match (zoom_min, zoom_max) {
            (Some(lo), Some(hi)) if lo != hi => (lo, hi),
            _ => (data_min, data_max),
        };
        if kind == AxisKind::Log {
            (full_min, full_max) = clamp_log(full_min, full_max);
            (lo, hi) = clamp_log(lo, hi);
        }
        if hi <= lo || !lo.is_finite() || !hi.is_finite() {
            return Err(HistoscopeError::DegenerateDomain { min: lo, max: hi });
        }
        if draw_max == draw_min {
            return Err(HistoscopeError::DegenerateDomain {
                min: draw_min,
                max: draw_max,
            });
        }
        Ok(Self {
            kind,
            full_min,
            full_max,
            lo,
            hi,
            draw_min,
            draw_max,
            labels: Vec::new(),
        })
    }

    /// Builds a mapping from a sanitized [`AxisRange`].
    pub fn from_range(range: &AxisRange, draw_min: f64, draw_max: f64) -> Result<Self> {
        let range = range.sanitized();
        Self::configure(
            range.kind,
            range.min,
            range.max,
            draw_min,
            draw_max,
            range.zoom_min,
            range.zoom_max,
        )
    }

    /// Attaches category names; only meaningful for [`AxisKind::Labels`].
    #[must_use]
    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = labels;
        self
    }

    /// Mapping kind.
    #[must_use]
    pub fn kind(&self) -> AxisKind {
        self.kind
    }

    /// Whether this is a logarithmic mapping.
    #[must_use]
    pub fn is_log(&self) -> bool {
        self.kind == AxisKind::Log
    }

    /// Active data domain.
    #[must_use]
    pub fn domain(&self) -> (f64, f64) {
        (self.lo, self.hi)
    }

    /// Full (unzoomed) data range.
    #[must_use]
    pub fn full_domain(&self) -> (f64, f64) {
        (self.full_min, self.full_max)
    }

    /// Draw-space interval.
    #[must_use]
    pub fn range(&self) -> (f64, f64) {
        (self.draw_min, self.draw_max)
    }

    /// Category names.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Maps a data value to draw space. Non-positive values on a log scale are
    /// clamped to the domain minimum.
    #[must_use]
    pub fn to_draw(&self, value: f64) -> f64 {
        self.draw_min + self.fraction(value) * (self.draw_max - self.draw_min)
    }

    /// Maps a draw-space position back to a data value.
    #[must_use]
    pub fn to_data(&self, draw: f64) -> f64 {
        let t = (draw - self.draw_min) / (self.draw_max - self.draw_min);
        self.from_fraction(t)
    }

    /// Position of `value` inside the active domain, 0 at the minimum and 1 at the
    /// maximum.
    #[must_use]
    pub fn fraction(&self, value: f64) -> f64 {
        match self.kind {
            AxisKind::Linear | AxisKind::Labels => (value - self.lo) / (self.hi - self.lo),
            AxisKind::Log => {
                let v = if value <= 0.0 { self.lo } else { value };
                (v.ln() - self.lo.ln()) / (self.hi.ln() - self.lo.ln())
            }
        }
    }

    /// Inverse of [`AxisScale::fraction`].
    #[must_use]
    pub fn from_fraction(&self, t: f64) -> f64 {
        match self.kind {
            AxisKind::Linear | AxisKind::Labels => self.lo + t * (self.hi - self.lo),
            AxisKind::Log => (self.lo.ln() + t * (self.hi.ln() - self.lo.ln())).exp(),
        }
    }

    /// Draw position of category `index`.
    #[must_use]
    pub fn label_position(&self, index: usize) -> f64 {
        self.to_draw(index as f64 + 0.5)
    }

    /// Computes the zoom window produced by one wheel step.
    ///
    /// `fraction` is the pointer position along the axis (0..1), `zoom_out` selects the
    /// direction. The result is clamped to the full range; `None` when nothing changes.
    #[must_use]
    pub fn wheel_zoom(&self, fraction: f64, zoom_out: bool) -> Option<(f64, f64)> {
        let delta: f64 = if zoom_out { 0.2 } else { -0.2 };
        let dmin = fraction.clamp(0.0, 1.0);
        let (mut min, mut max) = (self.lo, self.hi);

        if self.is_log() {
            let factor = if min > 0.0 {
                (max / min).log10().clamp(1.5, 10.0)
            } else {
                2.0
            };
            min /= factor.powf(delta * dmin);
            max *= factor.powf(delta * (1.0 - dmin));
        } else {
            let mut rx = max - min;
            if delta > 0.0 {
                rx = 1.001 * rx / (1.0 - delta);
            }
            min += -delta * dmin * rx;
            max -= -delta * (1.0 - dmin) * rx;
        }

        min = min.max(self.full_min);
        max = max.min(self.full_max);
        let unchanged = (min - self.lo).abs() < f64::EPSILON && (max - self.hi).abs() < f64::EPSILON;
        (min < max && !unchanged).then_some((min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn linear() -> AxisScale {
        AxisScale::configure(AxisKind::Linear, 0.0, 10.0, -100.0, 100.0, None, None).unwrap()
    }

    #[test]
    fn test_linear_mapping() {
        let scale = linear();
        assert!((scale.to_draw(0.0) + 100.0).abs() < 1e-9);
        assert!((scale.to_draw(5.0)).abs() < 1e-9);
        assert!((scale.to_draw(10.0) - 100.0).abs() < 1e-9);
        assert!((scale.to_data(40.0) - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_zoomed_mapping() {
        let scale = AxisScale::configure(
            AxisKind::Linear,
            0.0,
            10.0,
            0.0,
            200.0,
            Some(2.0),
            Some(4.0),
        )
        .unwrap();
        assert_eq!(scale.domain(), (2.0, 4.0));
        assert_eq!(scale.full_domain(), (0.0, 10.0));
        assert!((scale.to_draw(3.0) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_equal_zoom_bounds_ignored() {
        let range = AxisRange::new(AxisKind::Linear, 0.0, 10.0).with_zoom(3.0, 3.0);
        assert!(!range.is_zoomed());
        assert_eq!(range.active(), (0.0, 10.0));
    }

    #[test]
    fn test_log_clamps() {
        let scale =
            AxisScale::configure(AxisKind::Log, -5.0, 100.0, 0.0, 1.0, None, None).unwrap();
        assert!((scale.domain().0 - 0.01).abs() < 1e-12);

        let scale = AxisScale::configure(AxisKind::Log, -5.0, -1.0, 0.0, 1.0, None, None).unwrap();
        assert_eq!(scale.domain(), (1e-4, 1.0));
        // non-positive values sit at the bottom
        assert!((scale.to_draw(-3.0)).abs() < 1e-12);
    }

    #[test]
    fn test_log_mapping() {
        let scale = AxisScale::configure(AxisKind::Log, 1.0, 1000.0, 0.0, 3.0, None, None).unwrap();
        assert!((scale.to_draw(10.0) - 1.0).abs() < 1e-9);
        assert!((scale.to_draw(100.0) - 2.0).abs() < 1e-9);
        assert!((scale.to_data(2.0) - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_domain() {
        let err = AxisScale::configure(AxisKind::Linear, 1.0, 1.0, 0.0, 1.0, None, None);
        assert!(matches!(err, Err(HistoscopeError::DegenerateDomain { .. })));
    }

    #[test]
    fn test_sanitized_widens() {
        let range = AxisRange::new(AxisKind::Linear, 4.0, 4.0).sanitized();
        assert!(range.max > range.min);
        assert!(AxisScale::from_range(&range, 0.0, 1.0).is_ok());

        let range = AxisRange::new(AxisKind::Log, 0.0, 0.0).sanitized();
        assert!(range.min > 0.0 && range.max > range.min);
    }

    #[test]
    fn test_labels_position() {
        let scale = AxisScale::configure(AxisKind::Labels, 0.0, 4.0, 0.0, 100.0, None, None)
            .unwrap()
            .with_labels(vec!["a".into(), "b".into(), "c".into(), "d".into()]);
        assert!((scale.label_position(0) - 12.5).abs() < 1e-9);
        assert!((scale.label_position(3) - 87.5).abs() < 1e-9);
    }

    #[test]
    fn test_wheel_zoom_in_and_out() {
        let scale = AxisScale::configure(
            AxisKind::Linear,
            0.0,
            10.0,
            -100.0,
            100.0,
            Some(2.0),
            Some(8.0),
        )
        .unwrap();
        let (lo, hi) = scale.wheel_zoom(0.5, false).unwrap();
        assert!(lo > 2.0 && hi < 8.0);
        let (lo, hi) = scale.wheel_zoom(0.5, true).unwrap();
        assert!(lo < 2.0 && hi > 8.0);
        assert!(lo >= 0.0 && hi <= 10.0);
    }

    #[test]
    fn test_wheel_zoom_out_at_full_range() {
        assert!(linear().wheel_zoom(0.5, true).is_none());
    }

    #[test]
    fn test_wheel_zoom_log() {
        let scale = AxisScale::configure(AxisKind::Log, 1.0, 1e4, 0.0, 1.0, None, None).unwrap();
        let (lo, hi) = scale.wheel_zoom(0.0, false).unwrap();
        assert!((lo - 1.0).abs() < 1e-9);
        assert!(hi < 1e4);
    }

    proptest! {
        #[test]
        fn prop_linear_round_trip(lo in -1e6f64..1e6, width in 1e-3f64..1e6, t in 0.0f64..1.0) {
            let hi = lo + width;
            let scale = AxisScale::configure(AxisKind::Linear, lo, hi, -100.0, 100.0, None, None).unwrap();
            let v = lo + t * width;
            let back = scale.to_data(scale.to_draw(v));
            prop_assert!((back - v).abs() <= 1e-9 * (1.0 + v.abs().max(width)));
        }

        #[test]
        fn prop_log_round_trip(lo_exp in -6.0f64..3.0, decades in 0.1f64..8.0, t in 0.0f64..1.0) {
            let lo = 10f64.powf(lo_exp);
            let hi = lo * 10f64.powf(decades);
            let scale = AxisScale::configure(AxisKind::Log, lo, hi, 0.0, 200.0, None, None).unwrap();
            let v = lo * (hi / lo).powf(t);
            let back = scale.to_data(scale.to_draw(v));
            prop_assert!((back - v).abs() <= 1e-9 * v);
        }
    }
}
