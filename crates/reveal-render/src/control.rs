//! Manual progress control
//!
//! A slider over [0, 1] that stays disabled until the reveal has completed.
//! Accepted values are forwarded to the driver as progress overrides.

use crate::driver::RevealDriver;

/// Default slider increment
pub const PROGRESS_STEP: f32 = 0.01;

/// Slider state for overriding reveal progress
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressControl {
    value: f32,
    step: f32,
    enabled: bool,
}

impl ProgressControl {
    pub fn new() -> Self {
        Self {
            value: 0.0,
            step: PROGRESS_STEP,
            enabled: false,
        }
    }

    pub fn with_step(mut self, step: f32) -> Self {
        if step > 0.0 {
            self.step = step;
        }
        self
    }

    /// Unlock the control; the slider jumps to the driver's progress
    pub fn enable(&mut self, driver: &RevealDriver) {
        self.value = driver.state().progress;
        self.enabled = true;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    /// Snap `value` to the step grid and forward it to the driver.
    ///
    /// Returns whether the driver accepted the override.
    pub fn set(&mut self, value: f32, driver: &mut RevealDriver) -> bool {
        if !self.enabled || value.is_nan() {
            return false;
        }
        let snapped = ((value / self.step).round() * self.step).clamp(0.0, 1.0);
        if !driver.override_progress(snapped) {
            return false;
        }
        self.value = snapped;
        tracing::debug!("Progress override {:.2}", snapped);
        true
    }

    pub fn step_up(&mut self, driver: &mut RevealDriver) -> bool {
        self.set(self.value + self.step, driver)
    }

    pub fn step_down(&mut self, driver: &mut RevealDriver) -> bool {
        self.set(self.value - self.step, driver)
    }
}

impl Default for ProgressControl {
    fn default() -> Self {
        Self::new()
    }
}
