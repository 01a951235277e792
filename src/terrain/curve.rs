//! Height remapping curve.
//!
//! Keys are sorted once at construction and never mutated, so one curve can
//! be evaluated from every worker thread at the same time.

use serde::Deserialize;

/// Curve control point: maps `time` (normalized height) to `value`
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Keyframe {
    pub time: f32,
    pub value: f32,
}

impl Keyframe {
    pub const fn new(time: f32, value: f32) -> Self {
        Self { time, value }
    }
}

/// Blend between neighbouring keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    #[default]
    Linear,
    /// Smoothstep, flat at every key
    Smooth,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct HeightCurveDef {
    #[serde(default)]
    keys: Vec<Keyframe>,
    #[serde(default)]
    interpolation: Interpolation,
}

/// Piecewise curve applied to normalized heights before scaling
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "HeightCurveDef")]
pub struct HeightCurve {
    keys: Vec<Keyframe>,
    interpolation: Interpolation,
}

impl From<HeightCurveDef> for HeightCurve {
    fn from(def: HeightCurveDef) -> Self {
        Self::new(def.keys, def.interpolation)
    }
}

impl Default for HeightCurve {
    fn default() -> Self {
        Self::linear()
    }
}

impl HeightCurve {
    /// Build a curve; keys are sorted by time and NaN keys are dropped
    pub fn new(mut keys: Vec<Keyframe>, interpolation: Interpolation) -> Self {
        keys.retain(|k| !k.time.is_nan() && !k.value.is_nan());
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self {
            keys,
            interpolation,
        }
    }

    /// Identity over [0, 1]
    pub fn linear() -> Self {
        Self::new(
            vec![Keyframe::new(0.0, 0.0), Keyframe::new(1.0, 1.0)],
            Interpolation::Linear,
        )
    }

    /// Flat at zero up to `water_level`, then rising linearly to 1
    pub fn flat_below(water_level: f32) -> Self {
        Self::new(
            vec![
                Keyframe::new(0.0, 0.0),
                Keyframe::new(water_level, 0.0),
                Keyframe::new(1.0, 1.0),
            ],
            Interpolation::Linear,
        )
    }

    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    /// Evaluate at `t`. Outside the key range the nearest end value is held;
    /// a curve without keys passes `t` through.
    pub fn evaluate(&self, t: f32) -> f32 {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return t;
        };

        if t <= first.time {
            return first.value;
        }
        if t >= last.time {
            return last.value;
        }

        // first.time < t < last.time, so 1 <= upper < len
        let upper = self.keys.partition_point(|k| k.time <= t);
        let a = self.keys[upper - 1];
        let b = self.keys[upper];

        let span = b.time - a.time;
        let mut f = if span > 0.0 { (t - a.time) / span } else { 1.0 };
        if self.interpolation == Interpolation::Smooth {
            f = f * f * (3.0 - 2.0 * f);
        }

        a.value + (b.value - a.value) * f
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_curve_is_identity() {
        let curve = HeightCurve::linear();
        for i in 0..=10 {
            let t = i as f32 / 10.0;
            assert!((curve.evaluate(t) - t).abs() < 1e-6);
        }
    }

    #[test]
    fn test_curve_clamps_outside_keys() {
        let curve = HeightCurve::flat_below(0.4);
        assert_eq!(curve.evaluate(-2.0), 0.0);
        assert_eq!(curve.evaluate(0.2), 0.0);
        assert_eq!(curve.evaluate(3.0), 1.0);
        assert!((curve.evaluate(0.7) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_keys_are_sorted() {
        let curve = HeightCurve::new(
            vec![Keyframe::new(1.0, 10.0), Keyframe::new(0.0, 0.0)],
            Interpolation::Linear,
        );
        assert_eq!(curve.keys()[0].time, 0.0);
        assert!((curve.evaluate(0.5) - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_smooth_curve_eases_at_keys() {
        let curve = HeightCurve::new(
            vec![Keyframe::new(0.0, 0.0), Keyframe::new(1.0, 1.0)],
            Interpolation::Smooth,
        );
        assert!((curve.evaluate(0.5) - 0.5).abs() < 1e-6);
        assert!(curve.evaluate(0.1) < 0.1);
        assert!(curve.evaluate(0.9) > 0.9);
    }

    #[test]
    fn test_empty_curve_passes_through() {
        let curve = HeightCurve::new(Vec::new(), Interpolation::Linear);
        assert_eq!(curve.evaluate(0.25), 0.25);
    }

    #[test]
    fn test_curve_from_toml() {
        let curve: HeightCurve = toml::from_str(
            r#"
interpolation = "smooth"
keys = [{ time = 1.0, value = 2.0 }, { time = 0.0, value = 0.0 }]
"#,
        )
        .expect("parse curve");
        assert_eq!(curve.interpolation(), Interpolation::Smooth);
        assert_eq!(curve.keys()[1].value, 2.0);
    }
}
