//! Tweening
//!
//! Easing functions and a single-value tween driven by frame deltas.

use std::time::Duration;
use serde::{Deserialize, Serialize};

/// Maps elapsed fraction to eased fraction
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimingFunction {
    Linear,
    /// CSS `ease`
    Ease,
    /// CSS `ease-in`
    EaseIn,
    /// CSS `ease-out`
    EaseOut,
    /// CSS `ease-in-out`
    EaseInOut,
    /// `1 - (1 - t)^2`, decelerating to a stop
    #[default]
    QuadOut,
    /// Control points `(x1, y1, x2, y2)`; x values belong in [0, 1]
    CubicBezier(f32, f32, f32, f32),
}

impl TimingFunction {
    /// Eased value for `t`, clamped into [0, 1] first
    pub fn evaluate(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        let (x1, y1, x2, y2) = match *self {
            Self::Linear => return t,
            Self::QuadOut => return 1.0 - (1.0 - t) * (1.0 - t),
            Self::Ease => (0.25, 0.1, 0.25, 1.0),
            Self::EaseIn => (0.42, 0.0, 1.0, 1.0),
            Self::EaseOut => (0.0, 0.0, 0.58, 1.0),
            Self::EaseInOut => (0.42, 0.0, 0.58, 1.0),
            Self::CubicBezier(x1, y1, x2, y2) => (x1, y1, x2, y2),
        };
        let s = solve_curve_parameter(x1, x2, t);
        curve_axis(y1, y2, s)
    }
}

/// One axis of the curve from 0 to 1 with inner control points `p1`, `p2`,
/// in polynomial form
fn curve_axis(p1: f32, p2: f32, s: f32) -> f32 {
    let c = 3.0 * p1;
    let b = 3.0 * (p2 - p1) - c;
    let a = 1.0 - c - b;
    ((a * s + b) * s + c) * s
}

fn curve_axis_slope(p1: f32, p2: f32, s: f32) -> f32 {
    let c = 3.0 * p1;
    let b = 3.0 * (p2 - p1) - c;
    let a = 1.0 - c - b;
    (3.0 * a * s + 2.0 * b) * s + c
}

/// Curve parameter whose x coordinate is `x`
fn solve_curve_parameter(x1: f32, x2: f32, x: f32) -> f32 {
    const EPSILON: f32 = 1e-6;

    let mut s = x;
    for _ in 0..8 {
        let error = curve_axis(x1, x2, s) - x;
        if error.abs() < EPSILON {
            return s;
        }
        let slope = curve_axis_slope(x1, x2, s);
        if slope.abs() < EPSILON {
            break;
        }
        s = (s - error / slope).clamp(0.0, 1.0);
    }

    // Newton did not settle; x(s) is monotonic for x1, x2 in [0, 1]
    let (mut lo, mut hi) = (0.0f32, 1.0f32);
    s = x;
    for _ in 0..32 {
        let value = curve_axis(x1, x2, s);
        if (value - x).abs() < EPSILON {
            break;
        }
        if value < x {
            lo = s;
        } else {
            hi = s;
        }
        s = (lo + hi) / 2.0;
    }
    s
}

/// Tween lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweenStatus {
    Running,
    Finished,
    Cancelled,
}

/// Interpolates one value from `from` to `to` over `duration`
#[derive(Debug, Clone)]
pub struct Tween {
    from: f32,
    to: f32,
    duration: Duration,
    timing: TimingFunction,
    elapsed: Duration,
    status: TweenStatus,
}

impl Tween {
    pub fn new(from: f32, to: f32, duration: Duration) -> Self {
        Self {
            from,
            to,
            duration,
            timing: TimingFunction::default(),
            elapsed: Duration::ZERO,
            status: TweenStatus::Running,
        }
    }

    /// Set timing function
    pub fn with_timing(mut self, timing: TimingFunction) -> Self {
        self.timing = timing;
        self
    }

    pub fn status(&self) -> TweenStatus {
        self.status
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Fraction of the duration elapsed, in [0, 1]
    pub fn progress(&self) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    /// Current interpolated value
    pub fn value(&self) -> f32 {
        self.from + (self.to - self.from) * self.timing.evaluate(self.progress())
    }

    /// Advance by `dt` and hand the new value to `on_update`.
    ///
    /// The last update carries exactly `to` and returns `Finished`. A
    /// finished or cancelled tween ignores further calls. If `on_update`
    /// fails the error is returned and the tween stays where it was.
    pub fn advance<E>(
        &mut self,
        dt: Duration,
        on_update: impl FnOnce(f32) -> Result<(), E>,
    ) -> Result<TweenStatus, E> {
        if self.status != TweenStatus::Running {
            return Ok(self.status);
        }
        let elapsed = (self.elapsed + dt).min(self.duration);
        let previous = std::mem::replace(&mut self.elapsed, elapsed);
        let value = if elapsed >= self.duration { self.to } else { self.value() };

        if let Err(e) = on_update(value) {
            self.elapsed = previous;
            return Err(e);
        }
        if elapsed >= self.duration {
            self.status = TweenStatus::Finished;
        }
        Ok(self.status)
    }

    /// Stop without reaching the end; later `advance` calls do nothing
    pub fn cancel(&mut self) {
        if self.status == TweenStatus::Running {
            self.status = TweenStatus::Cancelled;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_curve_spans_zero_to_one() {
        let curves = [
            TimingFunction::Linear,
            TimingFunction::Ease,
            TimingFunction::EaseIn,
            TimingFunction::EaseOut,
            TimingFunction::EaseInOut,
            TimingFunction::QuadOut,
            TimingFunction::CubicBezier(0.3, 0.0, 0.7, 1.0),
        ];
        for curve in curves {
            assert!(curve.evaluate(0.0).abs() < 1e-4, "{:?}", curve);
            assert!((curve.evaluate(1.0) - 1.0).abs() < 1e-4, "{:?}", curve);
            // Out-of-range input is clamped
            assert_eq!(curve.evaluate(-1.0), curve.evaluate(0.0));
            assert_eq!(curve.evaluate(3.0), curve.evaluate(1.0));
        }
    }

    #[test]
    fn test_ease_in_lags_ease_out() {
        let t = 0.3;
        let slow_start = TimingFunction::EaseIn.evaluate(t);
        let fast_start = TimingFunction::EaseOut.evaluate(t);
        assert!(slow_start < t, "ease-in({}) = {}", t, slow_start);
        assert!(fast_start > t, "ease-out({}) = {}", t, fast_start);
    }

    #[test]
    fn test_linear_bezier_is_identity() {
        let curve = TimingFunction::CubicBezier(1.0 / 3.0, 1.0 / 3.0, 2.0 / 3.0, 2.0 / 3.0);
        for i in 0..=10 {
            let t = i as f32 / 10.0;
            assert!((curve.evaluate(t) - t).abs() < 1e-4, "t = {}", t);
        }
    }

    #[test]
    fn test_timing_functions_are_monotonic() {
        let functions = [
            TimingFunction::Linear,
            TimingFunction::Ease,
            TimingFunction::EaseIn,
            TimingFunction::EaseOut,
            TimingFunction::EaseInOut,
            TimingFunction::QuadOut,
        ];
        for timing in functions {
            let mut previous = timing.evaluate(0.0);
            for i in 1..=100 {
                let v = timing.evaluate(i as f32 / 100.0);
                assert!(v + 1e-3 >= previous, "{:?} decreased at {}", timing, i);
                previous = v;
            }
            assert!((previous - 1.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_quad_out() {
        assert_eq!(TimingFunction::QuadOut.evaluate(0.5), 0.75);
    }

    #[test]
    fn test_tween_updates_until_finished() {
        let mut tween = Tween::new(0.0, 1.0, Duration::from_millis(100)).with_timing(TimingFunction::Linear);
        let mut seen = Vec::new();
        for _ in 0..4 {
            let status = tween
                .advance(Duration::from_millis(40), |v| {
                    seen.push(v);
                    Ok::<_, ()>(())
                })
                .unwrap();
            if status == TweenStatus::Finished {
                break;
            }
        }
        assert_eq!(seen.len(), 3);
        assert!((seen[0] - 0.4).abs() < 1e-4);
        assert!((seen[1] - 0.8).abs() < 1e-4);
        assert_eq!(seen[2], 1.0);
        assert_eq!(tween.status(), TweenStatus::Finished);

        let status = tween.advance(Duration::from_millis(40), |_| Err("no more updates")).unwrap();
        assert_eq!(status, TweenStatus::Finished);
    }

    #[test]
    fn test_failed_update_keeps_position() {
        let mut tween = Tween::new(0.0, 1.0, Duration::from_secs(1));
        let err = tween.advance(Duration::from_millis(500), |_| Err("boom")).unwrap_err();
        assert_eq!(err, "boom");
        assert_eq!(tween.elapsed(), Duration::ZERO);
        assert_eq!(tween.status(), TweenStatus::Running);
    }

    #[test]
    fn test_cancel() {
        let mut tween = Tween::new(0.0, 1.0, Duration::from_secs(1));
        tween.cancel();
        assert_eq!(tween.status(), TweenStatus::Cancelled);
        let status = tween.advance(Duration::from_secs(2), |_| Err("cancelled")).unwrap();
        assert_eq!(status, TweenStatus::Cancelled);
    }

    #[test]
    fn test_zero_duration_finishes_at_once() {
        let mut tween = Tween::new(0.0, 1.0, Duration::ZERO);
        let mut last = None;
        let status = tween.advance(Duration::ZERO, |v| {
            last = Some(v);
            Ok::<_, ()>(())
        });
        assert_eq!(status, Ok(TweenStatus::Finished));
        assert_eq!(last, Some(1.0));
    }
}
