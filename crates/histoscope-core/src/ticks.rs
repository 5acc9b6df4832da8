//! Tick generation and label fitting.
//!
//! A [`TickSet`] is a restartable description of the ticks of one axis; every call to
//! [`TickSet::iter`] produces a fresh, finite, lazily evaluated sequence ordered by
//! draw position.

use crate::axis::{AxisKind, AxisScale};

/// One tick mark.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    /// Position in draw space.
    pub draw_pos: f64,
    /// Data value at the tick.
    pub data_value: f64,
    /// Major ticks are longer and may carry a label.
    pub is_major: bool,
    /// Label text for major ticks.
    pub label: Option<String>,
}

impl Tick {
    /// Turns the tick into an unlabeled minor tick.
    pub fn downgrade(&mut self) {
        self.is_major = false;
        self.label = None;
    }
}

/// Measures rendered text.
pub trait TextMeasure {
    /// Returns `(width, height)` of `text` drawn at `font_size`.
    fn measure(&self, text: &str, font_size: f64) -> (f64, f64);
}

/// Fixed-advance measurement, used when no font metrics are available.
#[derive(Debug, Clone, Copy)]
pub struct MonospaceMeasure {
    /// Glyph advance as a fraction of the font size.
    pub advance: f64,
    /// Line height as a fraction of the font size.
    pub height: f64,
}

impl Default for MonospaceMeasure {
    fn default() -> Self {
        Self {
            advance: 0.6,
            height: 1.0,
        }
    }
}

impl TextMeasure for MonospaceMeasure {
    fn measure(&self, text: &str, font_size: f64) -> (f64, f64) {
        let n = text.chars().count() as f64;
        (n * self.advance * font_size, self.height * font_size)
    }
}

/// Default number of major divisions aimed for on linear axes.
pub const DEFAULT_DIVISIONS: usize = 8;

#[derive(Debug, Clone, PartialEq)]
enum Spacing {
    Linear {
        minor: f64,
        per_major: i64,
        first: i64,
        last: i64,
    },
    Log {
        first_decade: i32,
        last_decade: i32,
        decade_step: i32,
        majors: &'static [u32],
        minors: bool,
    },
    Labels {
        first: usize,
        last: usize,
    },
}

/// Restartable tick description for one axis.
#[derive(Debug, Clone, PartialEq)]
pub struct TickSet {
    scale: AxisScale,
    spacing: Spacing,
    major_step: f64,
}

impl TickSet {
    /// Creates ticks for the active domain of `scale` aiming at `divisions` majors.
    pub fn new(scale: &AxisScale, divisions: usize) -> Self {
        let (lo, hi) = scale.domain();
        let divisions = divisions.max(1);
        let (spacing, major_step) = match scale.kind() {
            AxisKind::Linear => {
                let major = nice_step((hi - lo) / divisions as f64);
                let mantissa = (major / 10f64.powf(major.log10().floor())).round();
                let per_major: i64 = if (mantissa - 2.0).abs() < 1e-9 { 4 } else { 5 };
                let minor = major / per_major as f64;
                let eps = 1e-9;
                let first = (lo / minor - eps).ceil() as i64;
                let last = (hi / minor + eps).floor() as i64;
                (
                    Spacing::Linear {
                        minor,
                        per_major,
                        first,
                        last,
                    },
                    major,
                )
            }
            AxisKind::Log => {
                let span = (hi / lo).log10();
                let first_decade = lo.log10().floor() as i32;
                let last_decade = hi.log10().ceil() as i32;
                let (majors, minors, decade_step): (&'static [u32], bool, i32) = if span < 1.0 {
                    (&[1, 2, 5], true, 1)
                } else if span <= 10.0 {
                    (&[1], true, 1)
                } else {
                    (&[1], false, (span / 10.0).ceil() as i32)
                };
                (
                    Spacing::Log {
                        first_decade,
                        last_decade,
                        decade_step: decade_step.max(1),
                        majors,
                        minors,
                    },
                    10.0,
                )
            }
            AxisKind::Labels => {
                let first = (lo - 0.5).ceil().max(0.0) as usize;
                let last = (hi - 0.5).floor().max(0.0) as usize;
                (Spacing::Labels { first, last }, 1.0)
            }
        };
        Self {
            scale: scale.clone(),
            spacing,
            major_step,
        }
    }

    /// Step between major ticks in data units (decade factor for log axes).
    #[must_use]
    pub fn major_step(&self) -> f64 {
        self.major_step
    }

    /// Starts a new pass over the ticks.
    #[must_use]
    pub fn iter(&self) -> TickIter<'_> {
        TickIter {
            set: self,
            cursor: 0,
        }
    }

    /// Collects the ticks with major labels fitted to the available space.
    pub fn fitted(
        &self,
        measure: &dyn TextMeasure,
        font_size: f64,
        vertical: bool,
        keep_last: bool,
    ) -> Vec<Tick> {
        let mut ticks: Vec<Tick> = self.iter().collect();
        fit_labels(&mut ticks, measure, font_size, vertical, keep_last);
        ticks
    }

    fn tick_at(&self, cursor: u64) -> Option<Option<Tick>> {
        let (lo, hi) = self.scale.domain();
        match &self.spacing {
            Spacing::Linear {
                minor,
                per_major,
                first,
                last,
            } => {
                let i = first + i64::try_from(cursor).ok()?;
                if i > *last {
                    return None;
                }
                let value = i as f64 * minor;
                let value = if value.abs() < minor * 1e-6 { 0.0 } else { value };
                let is_major = i.rem_euclid(*per_major) == 0;
                Some(Some(self.make(value, is_major)))
            }
            Spacing::Log {
                first_decade,
                last_decade,
                decade_step,
                majors,
                minors,
            } => {
                let slot = i32::try_from(cursor / 9).ok()?;
                let mantissa = u32::try_from(cursor % 9).ok()? + 1;
                let decade = first_decade + slot;
                if decade > *last_decade {
                    return None;
                }
                let decade_major = (decade - first_decade) % decade_step == 0;
                let is_major = decade_major && majors.contains(&mantissa);
                if !is_major && !*minors {
                    return Some(None);
                }
                let value = f64::from(mantissa) * 10f64.powi(decade);
                if value < lo * (1.0 - 1e-9) || value > hi * (1.0 + 1e-9) {
                    return Some(None);
                }
                Some(Some(self.make(value, is_major)))
            }
            Spacing::Labels { first, last } => {
                let index = first + usize::try_from(cursor).ok()?;
                if index > *last {
                    return None;
                }
                let value = index as f64 + 0.5;
                if value < lo || value > hi {
                    return Some(None);
                }
                let label = self
                    .scale
                    .labels()
                    .get(index)
                    .cloned()
                    .unwrap_or_else(|| (index + 1).to_string());
                Some(Some(Tick {
                    draw_pos: self.scale.to_draw(value),
                    data_value: value,
                    is_major: true,
                    label: Some(label),
                }))
            }
        }
    }

    fn make(&self, value: f64, is_major: bool) -> Tick {
        let label = is_major.then(|| match self.scale.kind() {
            AxisKind::Log => format_log_value(value),
            _ => format_value(value, self.major_step),
        });
        Tick {
            draw_pos: self.scale.to_draw(value),
            data_value: value,
            is_major,
            label,
        }
    }
}

/// Lazy pass over a [`TickSet`].
pub struct TickIter<'a> {
    set: &'a TickSet,
    cursor: u64,
}

impl Iterator for TickIter<'_> {
    type Item = Tick;

    fn next(&mut self) -> Option<Tick> {
        loop {
            let current = self.cursor;
            self.cursor += 1;
            match self.set.tick_at(current)? {
                Some(tick) => return Some(tick),
                None => continue,
            }
        }
    }
}

/// Rounds a raw step to 1, 2 or 5 times a power of ten.
#[must_use]
pub fn nice_step(raw: f64) -> f64 {
    if raw <= 0.0 || !raw.is_finite() {
        return 1.0;
    }
    let mag = 10f64.powf(raw.log10().floor());
    let normalized = raw / mag;
    if normalized < 1.5 {
        mag
    } else if normalized < 3.5 {
        mag * 2.0
    } else if normalized < 7.5 {
        mag * 5.0
    } else {
        mag * 10.0
    }
}

/// Formats a linear tick value with as many decimals as the step needs.
#[must_use]
pub fn format_value(v: f64, step: f64) -> String {
    let decimals = if step >= 0.95 {
        0
    } else {
        (-(step.log10()).floor()).clamp(1.0, 12.0) as usize
    };
    let text = format!("{v:.decimals$}");
    if text.starts_with('-') && text[1..].chars().all(|c| c == '0' || c == '.') {
        text[1..].to_string()
    } else {
        text
    }
}

/// Formats a log tick value, switching to exponent notation outside `1e-3..1e4`.
#[must_use]
pub fn format_log_value(v: f64) -> String {
    let exp = (v.log10() + 1e-9).floor() as i32;
    if (-3..=4).contains(&exp) {
        let decimals = usize::try_from(-exp).unwrap_or(0);
        format!("{v:.decimals$}")
    } else {
        let mantissa = (v / 10f64.powi(exp)).round();
        if (mantissa - 1.0).abs() < 1e-9 {
            format!("1e{exp}")
        } else {
            format!("{mantissa}e{exp}")
        }
    }
}

/// Downgrades major ticks whose label would not fit.
///
/// Each labeled major is compared with the gap to the next labeled major, and the
/// last one with the gap to the previous: when the label extent along the axis
/// exceeds 90% of that gap, the tick loses its label and becomes minor. Spacing of
/// the other ticks is left alone. A single labeled major is kept, and so is the
/// last one when `keep_last` is set, as for axes whose last major shows the title.
pub fn fit_labels(
    ticks: &mut [Tick],
    measure: &dyn TextMeasure,
    font_size: f64,
    vertical: bool,
    keep_last: bool,
) {
    let majors: Vec<usize> = ticks
        .iter()
        .enumerate()
        .filter(|(_, t)| t.is_major && t.label.is_some())
        .map(|(i, _)| i)
        .collect();
    if majors.len() < 2 {
        return;
    }

    let measured = if keep_last { majors.len() - 1 } else { majors.len() };
    for (k, &cur) in majors.iter().enumerate().take(measured) {
        let Some(&neighbor) = majors
            .get(k + 1)
            .or_else(|| k.checked_sub(1).and_then(|p| majors.get(p)))
        else {
            continue;
        };
        let space = (ticks[neighbor].draw_pos - ticks[cur].draw_pos).abs();
        let Some(label) = ticks[cur].label.as_deref() else {
            continue;
        };
        let (w, h) = measure.measure(label, font_size);
        let extent = if vertical { h } else { w };
        if extent > 0.9 * space {
            ticks[cur].downgrade();
        }
    }
}

/// Replaces the label of the last major tick with the axis title.
pub fn set_axis_title(ticks: &mut [Tick], title: &str) {
    if let Some(last) = ticks.iter_mut().rev().find(|t| t.is_major) {
        last.label = Some(title.to_string());
    }
}
